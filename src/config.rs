//! Processor configuration
//!
//! Everything the core reads at construction time, stored as JSON. Missing
//! fields fall back to defaults so partial files stay valid.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dsp::CompressorParams;
use crate::error::{Result, SqueezeError};
use crate::meter::MeterConfig;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Sample rate in Hz, fixed for the session
    pub sample_rate: u32,
    /// Number of audio channels (1 or 2)
    pub channels: usize,
    /// Frames per processing block for offline rendering
    pub block_size: usize,
    pub compressor: CompressorParams,
    pub meter: MeterConfig,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            channels: 2,
            block_size: 512,
            compressor: CompressorParams::default(),
            meter: MeterConfig::default(),
        }
    }
}

impl ProcessorConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        if !(8000..=384_000).contains(&self.sample_rate) {
            return Err(SqueezeError::invalid_parameter(
                "sample_rate",
                self.sample_rate,
                "8000 to 384000 Hz",
            ));
        }
        if !(1..=2).contains(&self.channels) {
            return Err(SqueezeError::invalid_parameter("channels", self.channels, "1 or 2"));
        }
        if !(1..=65536).contains(&self.block_size) {
            return Err(SqueezeError::invalid_parameter(
                "block_size",
                self.block_size,
                "1 to 65536 frames",
            ));
        }
        self.compressor.validate()?;
        self.meter.validate()
    }

    /// Load and validate a JSON configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SqueezeError::FileNotFound {
                    path: path.display().to_string(),
                    source: Some(e),
                }
            } else {
                SqueezeError::Io(e)
            }
        })?;

        let config: ProcessorConfig = serde_json::from_str(&text)?;
        config.validate()?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Write as pretty-printed JSON
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}
