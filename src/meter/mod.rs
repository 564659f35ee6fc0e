//! Level metering
//!
//! Measured levels flow through `MeterBallistics` into a `LevelSnapshot`,
//! which `MeterBarLevel` turns into the lighting of its segments. Levels are
//! on the crest-factor scale: 0 dB sits `crest_factor` dB below full scale,
//! so a full-scale peak reads exactly `crest_factor`.

mod ballistics;
mod bar;
mod segment;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SqueezeError};

pub use ballistics::MeterBallistics;
pub use bar::MeterBarLevel;
pub use segment::{ColorClass, MeterSegment};

/// Level reported before anything was measured, and the lowest level shown
pub const METER_FLOOR: f32 = -70.01;

/// Level forwarded to segments that must be fully off
pub const METER_OFF: f32 = -9999.9;

/// Height of one segment in dB
pub const SEGMENT_RANGE_DB: f32 = 2.0;

/// How far above the crest factor the overload segment is driven when lit
pub const OVERLOAD_OFFSET_DB: f32 = 0.01;

/// Latest meter levels in dB
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub peak: f32,
    pub average: f32,
    /// Held peak
    pub peak_of_peak: f32,
    /// Highest peak since the last reset
    pub maximum: f32,
}

impl Default for LevelSnapshot {
    fn default() -> Self {
        Self {
            peak: METER_FLOOR,
            average: METER_FLOOR,
            peak_of_peak: METER_FLOOR,
            maximum: METER_FLOOR,
        }
    }
}

/// Bar meter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    /// Headroom above 0 dB in dB (0 to 30)
    pub crest_factor: f32,
    /// Level segments, not counting the overload segment; the bottom
    /// segment may not sit below `METER_FLOOR`
    pub number_of_bars: usize,
    /// Pixel height of a segment; only the rendering layer reads this
    pub segment_height: u32,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            crest_factor: 20.0,
            number_of_bars: 20,
            segment_height: 5,
        }
    }
}

impl MeterConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=30.0).contains(&self.crest_factor) {
            return Err(SqueezeError::invalid_parameter(
                "crest_factor",
                self.crest_factor,
                "0 to 30 dB",
            ));
        }
        let max_bars = MeterBarLevel::max_bars(self.crest_factor);
        if !(1..=max_bars).contains(&self.number_of_bars) {
            return Err(SqueezeError::invalid_parameter(
                "number_of_bars",
                self.number_of_bars,
                &format!("1 to {} at a {} dB crest factor", max_bars, self.crest_factor),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_defaults_to_floor() {
        let snapshot = LevelSnapshot::default();
        assert_eq!(snapshot.peak, -70.01);
        assert_eq!(snapshot.average, -70.01);
        assert_eq!(snapshot.peak_of_peak, -70.01);
        assert_eq!(snapshot.maximum, -70.01);
    }

    #[test]
    fn test_meter_config_validation() {
        assert!(MeterConfig::default().validate().is_ok());

        let no_bars = MeterConfig {
            number_of_bars: 0,
            ..Default::default()
        };
        assert_eq!(no_bars.validate().unwrap_err().error_code(), "INVALID_PARAMETER");

        // 46 bars at 20 dB would put the bottom segment at -72 dB
        let longest = MeterConfig {
            number_of_bars: 45,
            ..Default::default()
        };
        assert!(longest.validate().is_ok());
        let too_long = MeterConfig {
            number_of_bars: 46,
            ..Default::default()
        };
        assert!(too_long.validate().is_err());
        let too_long = MeterConfig {
            number_of_bars: 64,
            ..Default::default()
        };
        assert!(too_long.validate().is_err());

        let nan = MeterConfig {
            crest_factor: f32::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }
}
