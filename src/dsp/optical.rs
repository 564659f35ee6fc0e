//! Optical gain stage
//!
//! An electro-optical cell (lamp plus photoresistor) reacts faster the
//! brighter it is driven and remembers how hard it was driven: after heavy
//! compression the resistance recovers slowly, giving the typical
//! two-stage release.

use super::coefficients::{approach, time_to_coeff, CoefficientTable};
use super::gain_stage::GainStage;

/// Attack at 0 dB of ideal reduction
const ATTACK_BASE_SECS: f64 = 0.010;
/// Release at 0 dB of remembered reduction
const RELEASE_BASE_SECS: f64 = 0.060;
/// Release added per dB of remembered reduction
const RELEASE_PER_DB_SECS: f64 = 0.040;
/// Discharge time of the cell memory
const MEMORY_SECS: f64 = 2.0;

/// Optical gain stage
#[derive(Debug, Clone)]
pub struct GainStageOptical {
    coefficients: CoefficientTable,
    memory_coeff: f64,
    gain_reduction: f64,
    /// deepest recent reduction, discharging toward the current one
    cell_memory: f64,
}

impl GainStageOptical {
    pub fn new(sample_rate: f64) -> Self {
        let coefficients = CoefficientTable::from_time_constants(sample_rate, |depth| {
            let attack = ATTACK_BASE_SECS * 6.0 / (6.0 + depth);
            let release = RELEASE_BASE_SECS + RELEASE_PER_DB_SECS * depth;
            (attack, release)
        });

        Self {
            coefficients,
            memory_coeff: time_to_coeff(MEMORY_SECS, sample_rate),
            gain_reduction: 0.0,
            cell_memory: 0.0,
        }
    }

    /// Remembered reduction driving the release time
    pub fn cell_memory(&self) -> f64 {
        self.cell_memory
    }

    #[inline]
    fn update_memory(&mut self) {
        if self.gain_reduction < self.cell_memory {
            self.cell_memory = self.gain_reduction;
        } else {
            self.cell_memory = approach(self.cell_memory, self.gain_reduction, self.memory_coeff);
        }
    }
}

impl GainStage for GainStageOptical {
    fn reset(&mut self, current_gain_reduction: f64) {
        self.gain_reduction = current_gain_reduction;
        self.cell_memory = current_gain_reduction;
    }

    #[inline]
    fn process_gain_reduction(
        &mut self,
        gain_reduction_new: f64,
        gain_reduction_ideal: f64,
    ) -> f64 {
        if gain_reduction_new != self.gain_reduction {
            let coeff = if gain_reduction_new < self.gain_reduction {
                self.coefficients.attack(gain_reduction_ideal)
            } else {
                self.coefficients.release(self.cell_memory)
            };
            self.gain_reduction = approach(self.gain_reduction, gain_reduction_new, coeff);
        }

        self.update_memory();
        self.gain_reduction
    }

    #[inline]
    fn gain_reduction(&self) -> f64 {
        self.gain_reduction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f64 = 48000.0;

    fn drive(stage: &mut GainStageOptical, target: f64, secs: f64) {
        for _ in 0..(secs * SAMPLE_RATE) as usize {
            stage.process_gain_reduction(target, target);
        }
    }

    #[test]
    fn test_memory_charges_instantly() {
        let mut stage = GainStageOptical::new(SAMPLE_RATE);
        drive(&mut stage, -12.0, 0.2);
        assert!((stage.cell_memory() - stage.gain_reduction()).abs() < 1e-9);
    }

    #[test]
    fn test_heavy_compression_slows_release() {
        let mut light = GainStageOptical::new(SAMPLE_RATE);
        let mut heavy = GainStageOptical::new(SAMPLE_RATE);

        drive(&mut light, -3.0, 0.5);
        drive(&mut heavy, -24.0, 0.5);
        drive(&mut heavy, -3.0, 0.3);
        assert!(heavy.cell_memory() < light.cell_memory());

        let light_before = light.gain_reduction();
        let heavy_before = heavy.gain_reduction();
        drive(&mut light, 0.0, 0.05);
        drive(&mut heavy, 0.0, 0.05);

        // fraction of the remaining reduction released
        let light_recovered = (light.gain_reduction() - light_before) / -light_before;
        let heavy_recovered = (heavy.gain_reduction() - heavy_before) / -heavy_before;
        assert!(light_recovered > heavy_recovered);
    }

    #[test]
    fn test_reset_sets_memory() {
        let mut stage = GainStageOptical::new(SAMPLE_RATE);
        drive(&mut stage, -30.0, 0.2);
        stage.reset(0.0);
        assert_eq!(stage.cell_memory(), 0.0);
        assert_eq!(stage.process_gain_reduction(0.0, 0.0), 0.0);
    }
}
