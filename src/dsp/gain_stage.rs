//! Gain stages
//!
//! A gain stage turns the memoryless gain reduction computed by the side
//! chain into the time-smoothed reduction that is actually applied. Each
//! stage models the attack/release behaviour of one kind of analog gain
//! cell. All values are in dB and non-positive (0 dB = no reduction).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::fet::GainStageFet;
use super::optical::GainStageOptical;
use crate::error::SqueezeError;

/// Per-sample gain-reduction state machine
///
/// Implementations must not allocate, lock or perform I/O: both methods are
/// called from the audio callback.
pub trait GainStage {
    /// Restart smoothing from `current_gain_reduction`
    ///
    /// The next `process_gain_reduction` call continues from this value
    /// without a jump. Used on transport restarts and bypass toggles.
    fn reset(&mut self, current_gain_reduction: f64);

    /// Advance one sample and return the applied gain reduction
    ///
    /// * `gain_reduction_new` - memoryless reduction for this sample
    /// * `gain_reduction_ideal` - steady target depth; stages use it to pick
    ///   time constants
    ///
    /// When `gain_reduction_new` equals the current state the state is
    /// returned unchanged.
    fn process_gain_reduction(&mut self, gain_reduction_new: f64, gain_reduction_ideal: f64)
        -> f64;

    /// Currently applied gain reduction without advancing
    fn gain_reduction(&self) -> f64;
}

/// Compressor character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GainStageVariant {
    /// Fast field-effect-transistor style with program-dependent release
    #[default]
    Fet,
    /// Slow electro-optical cell with level-dependent, two-stage release
    Optical,
}

impl GainStageVariant {
    pub const ALL: [GainStageVariant; 2] = [GainStageVariant::Fet, GainStageVariant::Optical];

    pub fn name(&self) -> &'static str {
        match self {
            GainStageVariant::Fet => "fet",
            GainStageVariant::Optical => "optical",
        }
    }
}

impl fmt::Display for GainStageVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GainStageVariant {
    type Err = SqueezeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fet" => Ok(GainStageVariant::Fet),
            "optical" | "opto" => Ok(GainStageVariant::Optical),
            _ => Err(SqueezeError::invalid_parameter(
                "variant",
                s,
                "\"fet\" or \"optical\"",
            )),
        }
    }
}

/// Gain stage selected once per session
///
/// A closed enum rather than `Box<dyn GainStage>` so the per-sample call is
/// a `match`, not a virtual call.
#[derive(Debug, Clone)]
pub enum GainStageModel {
    Fet(GainStageFet),
    Optical(GainStageOptical),
}

impl GainStageModel {
    /// Build the stage for `variant`
    ///
    /// `sample_rate` must be positive; it is fixed for the lifetime of the
    /// stage.
    pub fn new(variant: GainStageVariant, sample_rate: f64) -> Self {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        log::debug!("creating {} gain stage at {} Hz", variant, sample_rate);

        match variant {
            GainStageVariant::Fet => GainStageModel::Fet(GainStageFet::new(sample_rate)),
            GainStageVariant::Optical => {
                GainStageModel::Optical(GainStageOptical::new(sample_rate))
            }
        }
    }

    pub fn variant(&self) -> GainStageVariant {
        match self {
            GainStageModel::Fet(_) => GainStageVariant::Fet,
            GainStageModel::Optical(_) => GainStageVariant::Optical,
        }
    }
}

impl GainStage for GainStageModel {
    #[inline]
    fn reset(&mut self, current_gain_reduction: f64) {
        match self {
            GainStageModel::Fet(stage) => stage.reset(current_gain_reduction),
            GainStageModel::Optical(stage) => stage.reset(current_gain_reduction),
        }
    }

    #[inline]
    fn process_gain_reduction(
        &mut self,
        gain_reduction_new: f64,
        gain_reduction_ideal: f64,
    ) -> f64 {
        debug_assert!(gain_reduction_new.is_finite() && gain_reduction_new <= 0.0);
        debug_assert!(gain_reduction_ideal.is_finite() && gain_reduction_ideal <= 0.0);

        match self {
            GainStageModel::Fet(stage) => {
                stage.process_gain_reduction(gain_reduction_new, gain_reduction_ideal)
            }
            GainStageModel::Optical(stage) => {
                stage.process_gain_reduction(gain_reduction_new, gain_reduction_ideal)
            }
        }
    }

    #[inline]
    fn gain_reduction(&self) -> f64 {
        match self {
            GainStageModel::Fet(stage) => stage.gain_reduction(),
            GainStageModel::Optical(stage) => stage.gain_reduction(),
        }
    }
}
