//! One segment of a bar meter

use serde::Serialize;

use super::METER_OFF;

/// Segment colour, counted from the top of the bar
///
/// The rendering layer maps classes to actual colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColorClass {
    /// Overload and the loudest segments
    Hot = 0,
    Warm = 1,
    Normal = 2,
}

impl ColorClass {
    pub fn index(self) -> u8 {
        self as u8
    }
}

/// A meter segment covering `[lower_threshold, lower_threshold + range)` dB
///
/// Holds the levels last forwarded to it and the lighting derived from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeterSegment {
    lower_threshold: f32,
    upper_threshold: f32,
    range: f32,
    display_peak: bool,
    color: ColorClass,

    peak_level: f32,
    average_level: f32,
    peak_level_peak: f32,
    maximum_level: f32,

    brightness: f32,
    peak_lit: bool,
    peak_marker: bool,
}

impl MeterSegment {
    pub fn new(threshold: f32, range: f32, display_peak: bool, color: ColorClass) -> Self {
        debug_assert!(range > 0.0);

        Self {
            lower_threshold: threshold,
            upper_threshold: threshold + range,
            range,
            display_peak,
            color,
            peak_level: METER_OFF,
            average_level: METER_OFF,
            peak_level_peak: METER_OFF,
            maximum_level: METER_OFF,
            brightness: 0.0,
            peak_lit: false,
            peak_marker: false,
        }
    }

    /// Store new levels and recompute lighting
    ///
    /// * average fills the segment proportionally across its range
    /// * peak lights the segment when it falls inside the range
    /// * the held peak draws a marker when it falls inside the range
    pub fn set_levels(&mut self, peak: f32, average: f32, peak_of_peak: f32, maximum: f32) {
        self.peak_level = peak;
        self.average_level = average;
        self.peak_level_peak = peak_of_peak;
        self.maximum_level = maximum;

        self.brightness = if average >= self.upper_threshold {
            1.0
        } else if average >= self.lower_threshold {
            (average - self.lower_threshold) / self.range
        } else {
            0.0
        };

        self.peak_lit = self.display_peak && self.contains(peak);
        self.peak_marker = self.contains(peak_of_peak);
    }

    #[inline]
    fn contains(&self, level: f32) -> bool {
        level >= self.lower_threshold && level < self.upper_threshold
    }

    /// Lower threshold in dB
    pub fn threshold(&self) -> f32 {
        self.lower_threshold
    }

    pub fn upper_threshold(&self) -> f32 {
        self.upper_threshold
    }

    pub fn color(&self) -> ColorClass {
        self.color
    }

    pub fn peak_level(&self) -> f32 {
        self.peak_level
    }

    pub fn average_level(&self) -> f32 {
        self.average_level
    }

    pub fn peak_level_peak(&self) -> f32 {
        self.peak_level_peak
    }

    pub fn maximum_level(&self) -> f32 {
        self.maximum_level
    }

    /// Fill from the average level, 0.0 to 1.0
    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn is_peak_lit(&self) -> bool {
        self.peak_lit
    }

    pub fn has_peak_marker(&self) -> bool {
        self.peak_marker
    }

    /// Anything to draw
    pub fn is_active(&self) -> bool {
        self.brightness > 0.0 || self.peak_lit || self.peak_marker
    }
}
