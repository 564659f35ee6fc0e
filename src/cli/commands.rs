//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::config::ProcessorConfig;
use crate::dsp::GainStageVariant;
use crate::engine::{export_audio, import_audio, BitDepth};
use crate::meter::{ColorClass, MeterBarLevel, MeterConfig, MeterSegment};
use crate::pipeline::MeteringPipeline;

/// Command-line overrides applied on top of the configuration file
#[derive(Debug, Default, Clone)]
pub struct ProcessOverrides {
    pub variant: Option<GainStageVariant>,
    pub threshold_db: Option<f64>,
    pub ratio: Option<f64>,
    pub block_size: Option<usize>,
}

impl ProcessOverrides {
    fn apply(&self, config: &mut ProcessorConfig) {
        if let Some(variant) = self.variant {
            config.compressor.variant = variant;
        }
        if let Some(threshold) = self.threshold_db {
            config.compressor.threshold_db = threshold;
        }
        if let Some(ratio) = self.ratio {
            config.compressor.ratio = ratio;
        }
        if let Some(block_size) = self.block_size {
            config.block_size = block_size;
        }
    }
}

/// Compress a WAV file and print the final meter state.
pub fn process(
    input: &Path,
    output: &Path,
    config_path: Option<&Path>,
    overrides: &ProcessOverrides,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => ProcessorConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ProcessorConfig::default(),
    };
    overrides.apply(&mut config);

    let audio =
        import_audio(input).with_context(|| format!("reading {}", input.display()))?;

    // the file decides rate and channel count
    config.sample_rate = audio.sample_rate();
    config.channels = audio.num_channels();

    info!(
        "Processing {} ({:.2} s, {} Hz, {} ch) with {} stage",
        input.display(),
        audio.duration_secs(),
        config.sample_rate,
        config.channels,
        config.compressor.variant
    );

    let mut pipeline = MeteringPipeline::new(&config).context("invalid configuration")?;
    let rendered = pipeline.process_buffer(&audio, config.block_size);

    export_audio(&rendered, output, BitDepth::default())
        .with_context(|| format!("writing {}", output.display()))?;

    let snapshot = pipeline.snapshot();
    println!("=== Squeeze ===");
    println!("Input: {}", input.display());
    println!("Output: {}", output.display());
    println!(
        "Stage: {} | threshold {:.1} dB | ratio {:.1}:1",
        config.compressor.variant, config.compressor.threshold_db, config.compressor.ratio
    );
    println!("Peak in: {:.1} dBFS | peak out: {:.1} dBFS", audio.peak_db(), rendered.peak_db());
    println!();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    println!();
    println!("{}", render_bar(pipeline.segments()));

    Ok(())
}

/// Print the segment ladder for a crest factor.
pub fn ladder(crest_factor: f32, bars: usize) -> Result<()> {
    let meter_config = MeterConfig {
        crest_factor,
        number_of_bars: bars,
        ..Default::default()
    };
    meter_config.validate()?;

    let meter = MeterBarLevel::new(crest_factor, bars);

    println!("Crest factor: {:.1} dB, {} segments", crest_factor, bars + 1);
    println!("{:-<40}", "");
    for (index, segment) in meter.segments().iter().enumerate() {
        let role = if index == 0 { "overload" } else { "level" };
        println!(
            "{:>3}  {:>7.1} dB  {:<7} {}",
            index,
            segment.threshold(),
            color_name(segment.color()),
            role
        );
    }
    println!("{:-<40}", "");

    Ok(())
}

/// Write the default configuration.
pub fn init_config(path: &Path) -> Result<()> {
    info!("Writing default configuration: {}", path.display());

    ProcessorConfig::default()
        .to_file(path)
        .with_context(|| format!("writing {}", path.display()))?;

    println!("Configuration written: {}", path.display());
    Ok(())
}

fn color_name(color: ColorClass) -> &'static str {
    match color {
        ColorClass::Hot => "hot",
        ColorClass::Warm => "warm",
        ColorClass::Normal => "normal",
    }
}

/// One character per segment, loudest on the left
///
/// `!` overload, `#` lit by the average, `|` peak, `'` held peak, `.` off.
pub fn render_bar(segments: &[MeterSegment]) -> String {
    let mut bar = String::with_capacity(segments.len() + 2);
    bar.push('[');
    for (index, segment) in segments.iter().enumerate() {
        let c = if index == 0 {
            if segment.is_active() {
                '!'
            } else {
                ' '
            }
        } else if segment.brightness() > 0.5 {
            '#'
        } else if segment.is_peak_lit() {
            '|'
        } else if segment.has_peak_marker() {
            '\''
        } else {
            '.'
        };
        bar.push(c);
    }
    bar.push(']');
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{generate_test_tone, ChannelLayout};
    use tempfile::tempdir;

    #[test]
    fn test_overrides_apply_on_top_of_config() {
        let mut config = ProcessorConfig::default();
        let overrides = ProcessOverrides {
            variant: Some(GainStageVariant::Optical),
            ratio: Some(10.0),
            ..Default::default()
        };
        overrides.apply(&mut config);

        assert_eq!(config.compressor.variant, GainStageVariant::Optical);
        assert_eq!(config.compressor.ratio, 10.0);
        assert_eq!(config.compressor.threshold_db, -18.0);
        assert_eq!(config.block_size, 512);
    }

    #[test]
    fn test_render_bar_idle_and_full() {
        let mut meter = MeterBarLevel::new(20.0, 4);
        assert_eq!(render_bar(meter.segments()), "[ ....]");

        meter.set_level(30.0, 30.0, 30.0, 25.0);
        assert_eq!(render_bar(meter.segments()), "[!####]");
    }

    #[test]
    fn test_process_writes_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out.wav");

        let tone = generate_test_tone(440.0, 0.9, 0.2, ChannelLayout::Stereo, 44100);
        export_audio(&tone, &input, BitDepth::Float32).unwrap();

        process(&input, &output, None, &ProcessOverrides::default()).unwrap();

        let rendered = import_audio(&output).unwrap();
        assert_eq!(rendered.num_samples(), tone.num_samples());
        assert_eq!(rendered.sample_rate(), 44100);
    }

    #[test]
    fn test_process_missing_input_fails() {
        let dir = tempdir().unwrap();
        let result = process(
            &dir.path().join("missing.wav"),
            &dir.path().join("out.wav"),
            None,
            &ProcessOverrides::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_ladder_rejects_zero_bars() {
        assert!(ladder(20.0, 0).is_err());
        assert!(ladder(20.0, 5).is_ok());
    }

    #[test]
    fn test_init_config_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("squeeze.json");
        init_config(&path).unwrap();
        assert_eq!(ProcessorConfig::from_file(&path).unwrap(), ProcessorConfig::default());
    }
}
