//! Compressor channel
//!
//! One channel of the compressor: side chain, gain stage and the final gain
//! multiply. Each audio channel owns its own `Compressor`; gain stages are
//! never shared between channels.

use serde::{Deserialize, Serialize};

use super::gain_stage::{GainStage, GainStageModel, GainStageVariant};
use super::side_chain::SideChain;
use crate::engine::buffer::db_to_linear;
use crate::error::{Result, SqueezeError};

/// Compressor parameters with validation ranges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorParams {
    /// Gain stage character
    pub variant: GainStageVariant,
    /// Threshold level in dB (-60 to 0 dB)
    pub threshold_db: f64,
    /// Compression ratio (1.0 to 20.0, representing 1:1 to 20:1)
    pub ratio: f64,
    /// Knee width in dB (0 = hard knee, up to 12 dB for soft knee)
    pub knee_db: f64,
    /// Makeup gain in dB (0 to 24 dB)
    pub makeup_gain_db: f64,
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self {
            variant: GainStageVariant::Fet,
            threshold_db: -18.0,
            ratio: 4.0,
            knee_db: 0.0,
            makeup_gain_db: 0.0,
        }
    }
}

impl CompressorParams {
    /// Validate parameters against their ranges
    pub fn validate(&self) -> Result<()> {
        if !(-60.0..=0.0).contains(&self.threshold_db) {
            return Err(SqueezeError::invalid_parameter(
                "threshold_db",
                self.threshold_db,
                "-60 to 0 dB",
            ));
        }
        if !(1.0..=20.0).contains(&self.ratio) {
            return Err(SqueezeError::invalid_parameter("ratio", self.ratio, "1 to 20"));
        }
        if !(0.0..=12.0).contains(&self.knee_db) {
            return Err(SqueezeError::invalid_parameter(
                "knee_db",
                self.knee_db,
                "0 to 12 dB",
            ));
        }
        if !(0.0..=24.0).contains(&self.makeup_gain_db) {
            return Err(SqueezeError::invalid_parameter(
                "makeup_gain_db",
                self.makeup_gain_db,
                "0 to 24 dB",
            ));
        }
        Ok(())
    }

    /// Clamp parameters to valid ranges
    pub fn clamp(&mut self) {
        self.threshold_db = self.threshold_db.clamp(-60.0, 0.0);
        self.ratio = self.ratio.clamp(1.0, 20.0);
        self.knee_db = self.knee_db.clamp(0.0, 12.0);
        self.makeup_gain_db = self.makeup_gain_db.clamp(0.0, 24.0);
    }
}

/// Single-channel compressor
#[derive(Debug, Clone)]
pub struct Compressor {
    params: CompressorParams,
    side_chain: SideChain,
    gain_stage: GainStageModel,
    makeup_linear: f32,
    bypassed: bool,
}

impl Compressor {
    /// Build a compressor; out-of-range parameters are clamped
    pub fn new(mut params: CompressorParams, sample_rate: f64) -> Self {
        params.clamp();

        Self {
            side_chain: SideChain::new(
                params.threshold_db,
                params.ratio,
                params.knee_db,
                sample_rate,
            ),
            gain_stage: GainStageModel::new(params.variant, sample_rate),
            makeup_linear: db_to_linear(params.makeup_gain_db as f32),
            bypassed: false,
            params,
        }
    }

    pub fn params(&self) -> &CompressorParams {
        &self.params
    }

    pub fn variant(&self) -> GainStageVariant {
        self.gain_stage.variant()
    }

    /// Gain reduction currently applied, in dB (non-positive)
    pub fn gain_reduction_db(&self) -> f64 {
        self.gain_stage.gain_reduction()
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    /// Toggle bypass
    ///
    /// While bypassed no reduction is applied, so the stage restarts from
    /// 0 dB on either edge.
    pub fn set_bypass(&mut self, bypassed: bool) {
        if bypassed != self.bypassed {
            self.bypassed = bypassed;
            self.side_chain.reset();
            self.gain_stage.reset(0.0);
        }
    }

    /// Forget all smoothing history (transport stop/restart)
    pub fn reset(&mut self) {
        self.side_chain.reset();
        self.gain_stage.reset(0.0);
    }

    /// Process one sample
    #[inline]
    pub fn process_sample(&mut self, sample: f32) -> f32 {
        if self.bypassed {
            return sample;
        }

        let (new, ideal) = self.side_chain.process(sample);
        let applied = self.gain_stage.process_gain_reduction(new, ideal);
        sample * db_to_linear(applied as f32) * self.makeup_linear
    }

    /// Process a block in place
    pub fn process(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}
