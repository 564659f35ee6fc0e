//! Side chain
//!
//! Level detection and the static compression curve. Produces the two
//! targets a gain stage consumes: the memoryless reduction of the current
//! sample and a steadier "ideal" reduction from a peak-hold detector.

use super::coefficients::time_to_coeff;
use crate::engine::buffer::linear_to_db;

/// Release of the peak-hold detector feeding the ideal reduction
const DETECTOR_RELEASE_SECS: f64 = 0.050;

/// Static curve plus detector state for one channel
#[derive(Debug, Clone)]
pub struct SideChain {
    threshold_db: f64,
    ratio: f64,
    knee_db: f64,
    detector_coeff: f64,
    /// peak envelope, linear
    detector: f64,
}

impl SideChain {
    pub fn new(threshold_db: f64, ratio: f64, knee_db: f64, sample_rate: f64) -> Self {
        debug_assert!(ratio >= 1.0, "ratio below 1:1 would expand");
        debug_assert!(knee_db >= 0.0);

        Self {
            threshold_db,
            ratio,
            knee_db,
            detector_coeff: time_to_coeff(DETECTOR_RELEASE_SECS, sample_rate),
            detector: 0.0,
        }
    }

    /// Static gain reduction in dB for an input level in dB
    ///
    /// Hard knee when `knee_db` is 0, otherwise a quadratic transition
    /// centred on the threshold. Never positive for ratios of 1:1 and above.
    pub fn gain_computer(&self, level_db: f64) -> f64 {
        let overshoot = level_db - self.threshold_db;
        let slope = 1.0 / self.ratio - 1.0;

        if 2.0 * overshoot <= -self.knee_db {
            0.0
        } else if 2.0 * overshoot.abs() < self.knee_db {
            let x = overshoot + self.knee_db / 2.0;
            slope * x * x / (2.0 * self.knee_db)
        } else {
            slope * overshoot
        }
    }

    /// Feed one sample; returns `(gain_reduction_new, gain_reduction_ideal)`
    #[inline]
    pub fn process(&mut self, sample: f32) -> (f64, f64) {
        let level = (sample as f64).abs();

        if level >= self.detector {
            self.detector = level;
        } else {
            self.detector = self.detector_coeff * self.detector
                + (1.0 - self.detector_coeff) * level;
        }

        let new = self.gain_computer(linear_to_db(level));
        let ideal = self.gain_computer(linear_to_db(self.detector));
        (new, ideal)
    }

    pub fn reset(&mut self) {
        self.detector = 0.0;
    }
}
