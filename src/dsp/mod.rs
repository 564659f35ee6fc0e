//! DSP core
//!
//! Per-sample compressor processing: side chain, gain stages and the
//! compressor channel that ties them together. Nothing in here allocates
//! after construction.

mod coefficients;
mod compressor;
mod fet;
mod gain_stage;
mod optical;
mod side_chain;

pub use compressor::{Compressor, CompressorParams};
pub use fet::GainStageFet;
pub use gain_stage::{GainStage, GainStageModel, GainStageVariant};
pub use optical::GainStageOptical;
