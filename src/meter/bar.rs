//! Bar meter level aggregation
//!
//! Turns a `LevelSnapshot` into the lighting of a fixed ladder of segments.
//! The ladder sits in 2 dB steps below the crest factor, with a dedicated
//! overload segment on top that only reacts to the maximum level.

use super::segment::{ColorClass, MeterSegment};
use super::{LevelSnapshot, METER_FLOOR, METER_OFF, OVERLOAD_OFFSET_DB, SEGMENT_RANGE_DB};

/// Thresholds are tracked in tenths of a decibel
const SEGMENT_STEP_TENTHS: i32 = 20;
/// Segments at or above this get `ColorClass::Hot`
const HOT_THRESHOLD_TENTHS: i32 = 160;
/// Segments at or above this get `ColorClass::Warm`
const WARM_THRESHOLD_TENTHS: i32 = 100;

/// Threshold of the first level segment, in tenths of a decibel
#[inline]
fn first_threshold_tenths(crest_factor: f32) -> i32 {
    10 * (crest_factor - SEGMENT_RANGE_DB).floor() as i32
}

/// Segmented level meter
///
/// Index 0 is the overload segment, indices `1..=number_of_bars` run from
/// loudest to quietest. The segment vector is sized once in `new` and never
/// resized, so `set_level` does not allocate.
#[derive(Debug, Clone)]
pub struct MeterBarLevel {
    crest_factor: f32,
    segments: Vec<MeterSegment>,
    levels: LevelSnapshot,
    update_count: u64,
}

impl MeterBarLevel {
    /// Build the ladder for `crest_factor` (dB) and `number_of_bars` level
    /// segments (the overload segment comes on top)
    pub fn new(crest_factor: f32, number_of_bars: usize) -> Self {
        debug_assert!(number_of_bars >= 1, "a bar meter needs at least one segment");
        debug_assert!(crest_factor.is_finite());

        let total = number_of_bars + 1;
        let mut segments = Vec::with_capacity(total);
        let mut threshold = first_threshold_tenths(crest_factor);

        for n in 0..total {
            let color = if n == 0 {
                threshold += SEGMENT_STEP_TENTHS;
                ColorClass::Hot
            } else if threshold >= HOT_THRESHOLD_TENTHS {
                ColorClass::Hot
            } else if threshold >= WARM_THRESHOLD_TENTHS {
                ColorClass::Warm
            } else {
                ColorClass::Normal
            };

            segments.push(MeterSegment::new(
                threshold as f32 * 0.1,
                SEGMENT_RANGE_DB,
                true,
                color,
            ));
            threshold -= SEGMENT_STEP_TENTHS;
        }

        log::debug!(
            "meter ladder: crest factor {} dB, {} segments, {:.1} .. {:.1} dB",
            crest_factor,
            total,
            segments[0].threshold(),
            segments[total - 1].threshold()
        );

        Self {
            crest_factor,
            segments,
            levels: LevelSnapshot::default(),
            update_count: 0,
        }
    }

    /// Longest ladder whose bottom segment stays at or above `METER_FLOOR`
    ///
    /// Segments below the floor would read silence as signal.
    pub fn max_bars(crest_factor: f32) -> usize {
        let floor_tenths = (METER_FLOOR * 10.0).ceil() as i32;
        let span = first_threshold_tenths(crest_factor) - floor_tenths;
        if span < 0 {
            0
        } else {
            (span / SEGMENT_STEP_TENTHS) as usize + 1
        }
    }

    pub fn crest_factor(&self) -> f32 {
        self.crest_factor
    }

    /// Level segments, excluding overload
    pub fn number_of_bars(&self) -> usize {
        self.segments.len() - 1
    }

    /// All segments, overload first
    pub fn segments(&self) -> &[MeterSegment] {
        &self.segments
    }

    pub fn overload_segment(&self) -> &MeterSegment {
        &self.segments[0]
    }

    /// Levels last accepted by `set_level`
    pub fn levels(&self) -> LevelSnapshot {
        self.levels
    }

    /// Number of times the level segments were recomputed
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Whether the overload segment is currently lit
    pub fn is_overloaded(&self) -> bool {
        self.segments[0].is_active()
    }

    /// Feed new levels (dB, crest-factor scale)
    ///
    /// Level segments are recomputed only when peak, average or held peak
    /// changed. The overload segment follows `maximum` alone and is only
    /// touched when `maximum` changed.
    pub fn set_level(&mut self, peak: f32, average: f32, peak_of_peak: f32, maximum: f32) {
        if peak != self.levels.peak
            || average != self.levels.average
            || peak_of_peak != self.levels.peak_of_peak
        {
            self.levels.peak = peak;
            self.levels.average = average;
            self.levels.peak_of_peak = peak_of_peak;

            for segment in &mut self.segments[1..] {
                segment.set_levels(peak, average, peak_of_peak, METER_OFF);
            }
            self.update_count += 1;
        }

        if maximum != self.levels.maximum {
            self.levels.maximum = maximum;

            let overload = &mut self.segments[0];
            if maximum >= self.crest_factor {
                let lit = self.crest_factor + OVERLOAD_OFFSET_DB;
                overload.set_levels(lit, METER_OFF, lit, METER_OFF);
            } else {
                overload.set_levels(METER_OFF, METER_OFF, METER_OFF, METER_OFF);
            }
        }
    }

    /// Convenience wrapper taking a whole snapshot
    pub fn set_snapshot(&mut self, snapshot: &LevelSnapshot) {
        self.set_level(
            snapshot.peak,
            snapshot.average,
            snapshot.peak_of_peak,
            snapshot.maximum,
        );
    }
}
