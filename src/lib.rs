//! Squeeze - analog-modelled compressor with bar-meter metering
//!
//! Two parts carry the behaviour:
//! 1. Gain stages - per-sample gain-reduction state machines, one per
//!    compressor character (FET, Optical), behind the `GainStage` trait
//! 2. Metering - ballistics and a segmented bar meter with an overload
//!    indicator driven by a configurable crest factor
//!
//! # Architecture
//!
//! `MeteringPipeline` ties them together per block: each channel runs
//! through its own `Compressor`, the output is measured, and the levels are
//! handed to `MeterBarLevel`. Nothing allocates after construction.

pub mod cli;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod meter;
pub mod pipeline;

pub use config::ProcessorConfig;
pub use dsp::{Compressor, CompressorParams, GainStage, GainStageModel, GainStageVariant};
pub use error::{Result, SqueezeError};
pub use meter::{LevelSnapshot, MeterBarLevel, MeterConfig};
pub use pipeline::{MeteringPipeline, PipelineSnapshot};
