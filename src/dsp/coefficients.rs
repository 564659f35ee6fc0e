//! Smoothing coefficient tables for the gain stages
//!
//! Both gain stages look up their one-pole coefficients by gain-reduction
//! depth instead of calling `exp()` per sample. Tables are filled once at
//! construction and are plain arrays, so lookups never allocate.

/// Depth range covered by the tables (0 dB up to, not including, 37 dB)
pub const NUMBER_OF_DECIBELS: usize = 37;

/// Table resolution: one entry every half decibel
pub const COEFFICIENTS_PER_DECIBEL: usize = 2;

pub const NUMBER_OF_COEFFICIENTS: usize = NUMBER_OF_DECIBELS * COEFFICIENTS_PER_DECIBEL;

/// One-pole coefficient for a time constant in seconds
///
/// The filter reaches ~63% of a step after `time_secs`.
#[inline]
pub fn time_to_coeff(time_secs: f64, sample_rate: f64) -> f64 {
    let samples = time_secs * sample_rate;
    if samples > 0.0 {
        (-1.0 / samples).exp()
    } else {
        0.0
    }
}

/// Move `current` toward `target` by one filter step
///
/// Written as an increment so that `current == target` is an exact fixed
/// point and the result never passes `target`.
#[inline]
pub fn approach(current: f64, target: f64, coeff: f64) -> f64 {
    current + (1.0 - coeff) * (target - current)
}

/// Attack and release coefficients indexed by gain-reduction depth
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientTable {
    attack: [f64; NUMBER_OF_COEFFICIENTS],
    release: [f64; NUMBER_OF_COEFFICIENTS],
}

impl CoefficientTable {
    /// Build a table from a function of depth (positive dB) returning
    /// `(attack_secs, release_secs)`
    pub fn from_time_constants<F>(sample_rate: f64, time_constants: F) -> Self
    where
        F: Fn(f64) -> (f64, f64),
    {
        let mut attack = [0.0; NUMBER_OF_COEFFICIENTS];
        let mut release = [0.0; NUMBER_OF_COEFFICIENTS];

        for n in 0..NUMBER_OF_COEFFICIENTS {
            let depth_db = n as f64 / COEFFICIENTS_PER_DECIBEL as f64;
            let (attack_secs, release_secs) = time_constants(depth_db);
            attack[n] = time_to_coeff(attack_secs, sample_rate);
            release[n] = time_to_coeff(release_secs, sample_rate);
        }

        Self { attack, release }
    }

    /// Table index for a (non-positive) gain reduction in dB
    ///
    /// Depths beyond the table use the last entry.
    #[inline]
    pub fn index_for(gain_reduction_db: f64) -> usize {
        // saturating cast: positive input maps to 0, NaN to 0
        let index = (-gain_reduction_db * COEFFICIENTS_PER_DECIBEL as f64) as usize;
        index.min(NUMBER_OF_COEFFICIENTS - 1)
    }

    #[inline]
    pub fn attack(&self, gain_reduction_db: f64) -> f64 {
        self.attack[Self::index_for(gain_reduction_db)]
    }

    #[inline]
    pub fn release(&self, gain_reduction_db: f64) -> f64 {
        self.release[Self::index_for(gain_reduction_db)]
    }
}
