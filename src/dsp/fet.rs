//! FET gain stage
//!
//! Field-effect-transistor compressors clamp down within a millisecond and
//! recover in a program-dependent way: the deeper the current reduction,
//! the slower the recovery, speeding up as the gain returns.

use super::coefficients::{approach, CoefficientTable};
use super::gain_stage::GainStage;

/// Fastest attack, reached for very deep overshoot
const ATTACK_MIN_SECS: f64 = 0.0002;
/// Attack added at shallow depths
const ATTACK_SPREAD_SECS: f64 = 0.0006;
/// Release at 0 dB of reduction
const RELEASE_BASE_SECS: f64 = 0.050;
/// Release added per dB of current reduction
const RELEASE_PER_DB_SECS: f64 = 0.015;

/// FET-style gain stage
///
/// Attack is indexed by the depth of the ideal reduction, release by the
/// depth of the reduction currently applied.
#[derive(Debug, Clone)]
pub struct GainStageFet {
    coefficients: CoefficientTable,
    gain_reduction: f64,
}

impl GainStageFet {
    pub fn new(sample_rate: f64) -> Self {
        let coefficients = CoefficientTable::from_time_constants(sample_rate, |depth| {
            let attack = ATTACK_MIN_SECS + ATTACK_SPREAD_SECS * 6.0 / (6.0 + depth);
            let release = RELEASE_BASE_SECS + RELEASE_PER_DB_SECS * depth;
            (attack, release)
        });

        Self {
            coefficients,
            gain_reduction: 0.0,
        }
    }
}

impl GainStage for GainStageFet {
    fn reset(&mut self, current_gain_reduction: f64) {
        self.gain_reduction = current_gain_reduction;
    }

    #[inline]
    fn process_gain_reduction(
        &mut self,
        gain_reduction_new: f64,
        gain_reduction_ideal: f64,
    ) -> f64 {
        if gain_reduction_new == self.gain_reduction {
            return self.gain_reduction;
        }

        let coeff = if gain_reduction_new < self.gain_reduction {
            self.coefficients.attack(gain_reduction_ideal)
        } else {
            self.coefficients.release(self.gain_reduction)
        };

        self.gain_reduction = approach(self.gain_reduction, gain_reduction_new, coeff);
        self.gain_reduction
    }

    #[inline]
    fn gain_reduction(&self) -> f64 {
        self.gain_reduction
    }
}
