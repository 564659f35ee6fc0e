//! Meter ballistics
//!
//! Smooths per-block measurements into the four levels a bar meter shows.

use super::{LevelSnapshot, METER_FLOOR};

/// Peak fall-back speed
const PEAK_FALL_DB_PER_SEC: f32 = 26.0;
/// Integration time of the average meter
const AVERAGE_SECS: f32 = 0.3;
/// How long a held peak stays up
const PEAK_HOLD_SECS: f32 = 2.0;

/// Peak / average / held-peak / maximum ballistics for one meter
#[derive(Debug, Clone)]
pub struct MeterBallistics {
    crest_factor: f32,
    levels: LevelSnapshot,
    hold_remaining: f32,
}

impl MeterBallistics {
    pub fn new(crest_factor: f32) -> Self {
        Self {
            crest_factor,
            levels: LevelSnapshot::default(),
            hold_remaining: 0.0,
        }
    }

    pub fn crest_factor(&self) -> f32 {
        self.crest_factor
    }

    /// dBFS to meter scale, floored
    #[inline]
    pub fn to_display(&self, dbfs: f32) -> f32 {
        (dbfs + self.crest_factor).max(METER_FLOOR)
    }

    pub fn levels(&self) -> LevelSnapshot {
        self.levels
    }

    /// Advance by one block
    ///
    /// * `peak_dbfs` - block peak in dBFS
    /// * `rms_dbfs` - block RMS in dBFS
    /// * `block_secs` - block duration
    pub fn update(&mut self, peak_dbfs: f32, rms_dbfs: f32, block_secs: f32) -> LevelSnapshot {
        let peak = self.to_display(peak_dbfs);
        let average = self.to_display(rms_dbfs);
        let levels = &mut self.levels;

        // peak: instant rise, linear fall
        if peak >= levels.peak {
            levels.peak = peak;
        } else {
            levels.peak = (levels.peak - PEAK_FALL_DB_PER_SEC * block_secs).max(peak);
        }

        // average: one-pole in the dB domain
        let coeff = (-block_secs / AVERAGE_SECS).exp();
        levels.average = (average + coeff * (levels.average - average)).max(METER_FLOOR);

        // held peak
        if levels.peak >= levels.peak_of_peak {
            levels.peak_of_peak = levels.peak;
            self.hold_remaining = PEAK_HOLD_SECS;
        } else {
            self.hold_remaining -= block_secs;
            if self.hold_remaining <= 0.0 {
                levels.peak_of_peak = levels.peak;
            }
        }

        levels.maximum = levels.maximum.max(peak);
        self.levels
    }

    /// Back to the floor (transport restart)
    pub fn reset(&mut self) {
        self.levels = LevelSnapshot::default();
        self.hold_remaining = 0.0;
    }
}
