//! Metering pipeline
//!
//! Per-block glue between the compressor channels and the bar meter: run
//! every channel through its compressor, measure the output, advance the
//! meter ballistics and hand the result to the bar meter. The latest state
//! is exposed as a `PipelineSnapshot`; moving it to a rendering thread is
//! up to the caller.

use serde::Serialize;

use crate::config::ProcessorConfig;
use crate::dsp::{Compressor, GainStageVariant};
use crate::engine::buffer::{linear_to_db, peak_db, sum_of_squares, AudioBuffer, ChannelLayout};
use crate::error::Result;
use crate::meter::{LevelSnapshot, MeterBallistics, MeterBarLevel, MeterSegment};

/// What the rendering layer reads after each block
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PipelineSnapshot {
    /// Output levels on the crest-factor scale
    pub levels: LevelSnapshot,
    /// Deepest gain reduction across channels at the end of the block (dB)
    pub gain_reduction_db: f64,
    /// Whether the overload segment is lit
    pub overload: bool,
}

/// Compressor channels plus output metering
///
/// All allocation happens in `new`; `process_block` is safe to call from
/// the audio callback.
#[derive(Debug, Clone)]
pub struct MeteringPipeline {
    compressors: Vec<Compressor>,
    ballistics: MeterBallistics,
    meter: MeterBarLevel,
    sample_rate: u32,
    bypassed: bool,
    gain_reduction_db: f64,
}

impl MeteringPipeline {
    /// Build a pipeline from a validated configuration
    pub fn new(config: &ProcessorConfig) -> Result<Self> {
        config.validate()?;

        let compressors = (0..config.channels)
            .map(|_| Compressor::new(config.compressor.clone(), config.sample_rate as f64))
            .collect();

        log::debug!(
            "metering pipeline: {} channel(s), {} stage, {} Hz, crest factor {} dB",
            config.channels,
            config.compressor.variant,
            config.sample_rate,
            config.meter.crest_factor
        );

        Ok(Self {
            compressors,
            ballistics: MeterBallistics::new(config.meter.crest_factor),
            meter: MeterBarLevel::new(config.meter.crest_factor, config.meter.number_of_bars),
            sample_rate: config.sample_rate,
            bypassed: false,
            gain_reduction_db: 0.0,
        })
    }

    pub fn num_channels(&self) -> usize {
        self.compressors.len()
    }

    pub fn variant(&self) -> GainStageVariant {
        self.compressors[0].variant()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    /// Bypass compression; metering keeps running
    pub fn set_bypass(&mut self, bypassed: bool) {
        if bypassed != self.bypassed {
            log::info!("compressor {}", if bypassed { "bypassed" } else { "engaged" });
            self.bypassed = bypassed;
            for compressor in &mut self.compressors {
                compressor.set_bypass(bypassed);
            }
            self.gain_reduction_db = 0.0;
        }
    }

    /// Transport stop/restart: drop all smoothing and meter history
    pub fn reset(&mut self) {
        log::info!("metering pipeline reset");
        for compressor in &mut self.compressors {
            compressor.reset();
        }
        self.ballistics.reset();
        self.meter.set_snapshot(&LevelSnapshot::default());
        self.gain_reduction_db = 0.0;
    }

    /// Process one block in place and update the meter
    ///
    /// Channels beyond the ones the pipeline was built for pass through
    /// untouched and are not metered.
    pub fn process_block(&mut self, buffer: &mut AudioBuffer) {
        let num_samples = buffer.num_samples();
        if num_samples == 0 {
            return;
        }

        let mut peak = f32::NEG_INFINITY;
        let mut squares = 0.0_f64;
        let mut gain_reduction = 0.0_f64;
        let mut metered = 0;

        for (channel, compressor) in buffer.channels_mut().zip(&mut self.compressors) {
            compressor.process(channel);

            peak = peak.max(peak_db(channel));
            squares += sum_of_squares(channel);
            gain_reduction = gain_reduction.min(compressor.gain_reduction_db());
            metered += 1;
        }

        let rms = (squares / (num_samples * metered) as f64).sqrt() as f32;
        let block_secs = num_samples as f32 / self.sample_rate as f32;

        let levels = self.ballistics.update(peak, linear_to_db(rms), block_secs);
        self.meter.set_snapshot(&levels);
        self.gain_reduction_db = gain_reduction;
    }

    /// Latest levels, reduction and overload state
    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            levels: self.meter.levels(),
            gain_reduction_db: self.gain_reduction_db,
            overload: self.meter.is_overloaded(),
        }
    }

    /// Per-segment state, overload segment first
    pub fn segments(&self) -> &[MeterSegment] {
        self.meter.segments()
    }

    pub fn meter(&self) -> &MeterBarLevel {
        &self.meter
    }

    /// Render a whole buffer block by block
    ///
    /// Offline helper for the CLI and tests; allocates the output.
    pub fn process_buffer(&mut self, input: &AudioBuffer, block_size: usize) -> AudioBuffer {
        let layout = ChannelLayout::from_count(input.num_channels()).unwrap_or_default();
        let mut output = AudioBuffer::new(0, layout, input.sample_rate());

        for mut block in input.blocks(block_size) {
            self.process_block(&mut block);
            output.append(&block);
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::generate_test_tone;
    use crate::meter::METER_FLOOR;
    use approx::assert_relative_eq;

    fn config(channels: usize) -> ProcessorConfig {
        ProcessorConfig {
            sample_rate: 48000,
            channels,
            ..Default::default()
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut bad = config(2);
        bad.meter.number_of_bars = 0;
        assert!(MeteringPipeline::new(&bad).is_err());
    }

    #[test]
    fn test_fresh_pipeline_reads_floor() {
        let pipeline = MeteringPipeline::new(&config(2)).unwrap();
        let snapshot = pipeline.snapshot();
        assert_eq!(snapshot.levels, LevelSnapshot::default());
        assert_eq!(snapshot.levels.peak, METER_FLOOR);
        assert_eq!(snapshot.gain_reduction_db, 0.0);
        assert!(!snapshot.overload);
        assert_eq!(pipeline.segments().len(), 21);
    }

    #[test]
    fn test_silence_keeps_meter_idle() {
        let mut pipeline = MeteringPipeline::new(&config(1)).unwrap();
        let mut block = AudioBuffer::new(480, ChannelLayout::Mono, 48000);
        pipeline.process_block(&mut block);

        assert_eq!(pipeline.snapshot().levels, LevelSnapshot::default());
        assert_eq!(pipeline.meter().update_count(), 0);
    }

    #[test]
    fn test_full_scale_lights_overload() {
        // 1:1 so the full-scale sample reaches the output untouched
        let mut unity = config(2);
        unity.compressor.ratio = 1.0;
        let mut pipeline = MeteringPipeline::new(&unity).unwrap();
        let mut block = AudioBuffer::new(64, ChannelLayout::Stereo, 48000);
        block.channel_mut(0)[0] = 1.0;

        pipeline.process_block(&mut block);

        let snapshot = pipeline.snapshot();
        assert!(snapshot.overload);
        assert_relative_eq!(snapshot.levels.maximum, 20.0);
    }

    #[test]
    fn test_compression_shows_in_snapshot() {
        let mut pipeline = MeteringPipeline::new(&config(2)).unwrap();
        let tone = generate_test_tone(220.0, 1.0, 0.5, ChannelLayout::Stereo, 48000);

        let output = pipeline.process_buffer(&tone, 512);

        assert_eq!(output.num_samples(), tone.num_samples());
        assert!(output.peak_db() < tone.peak_db());
        assert!(pipeline.snapshot().gain_reduction_db < -3.0);
    }

    #[test]
    fn test_bypass_keeps_metering() {
        let mut pipeline = MeteringPipeline::new(&config(1)).unwrap();
        pipeline.set_bypass(true);
        let tone = generate_test_tone(220.0, 0.5, 0.1, ChannelLayout::Mono, 48000);

        let output = pipeline.process_buffer(&tone, 256);

        assert_eq!(output, tone);
        assert_eq!(pipeline.snapshot().gain_reduction_db, 0.0);
        assert!(pipeline.snapshot().levels.peak > METER_FLOOR);
    }

    #[test]
    fn test_extra_channels_pass_through_unmetered() {
        let mut mono = MeteringPipeline::new(&config(1)).unwrap();
        let mut wide = MeteringPipeline::new(&config(1)).unwrap();

        let tone = generate_test_tone(220.0, 0.5, 0.05, ChannelLayout::Mono, 48000);
        let mut stereo = AudioBuffer::from_channels(
            vec![tone.channel(0).to_vec(), tone.channel(0).to_vec()],
            48000,
        )
        .unwrap();
        let mut mono_block = tone.clone();

        mono.process_block(&mut mono_block);
        wide.process_block(&mut stereo);

        assert_eq!(wide.snapshot(), mono.snapshot());
        assert_eq!(stereo.channel(0), mono_block.channel(0));
        assert_eq!(stereo.channel(1), tone.channel(0));
    }

    #[test]
    fn test_silence_after_signal_clears_longest_ladder() {
        let mut longest = config(1);
        longest.meter.number_of_bars = MeterBarLevel::max_bars(longest.meter.crest_factor);
        let mut pipeline = MeteringPipeline::new(&longest).unwrap();
        assert!(pipeline.segments().iter().all(|s| !s.is_active()));

        let tone = generate_test_tone(220.0, 0.5, 0.5, ChannelLayout::Mono, 48000);
        pipeline.process_buffer(&tone, 512);
        assert!(pipeline.segments().iter().any(|s| s.is_active()));

        let silence = AudioBuffer::new(480_000, ChannelLayout::Mono, 48000);
        pipeline.process_buffer(&silence, 512);

        let lit: Vec<f32> = pipeline
            .segments()
            .iter()
            .filter(|s| s.is_active())
            .map(|s| s.threshold())
            .collect();
        assert!(lit.is_empty(), "segments lit by silence: {:?}", lit);
    }

    #[test]
    fn test_reset_returns_to_floor() {
        let mut pipeline = MeteringPipeline::new(&config(1)).unwrap();
        let tone = generate_test_tone(220.0, 1.0, 0.1, ChannelLayout::Mono, 48000);
        pipeline.process_buffer(&tone, 256);
        assert!(pipeline.snapshot().levels.peak > METER_FLOOR);
        assert!(pipeline.snapshot().gain_reduction_db < 0.0);

        pipeline.reset();
        let snapshot = pipeline.snapshot();
        assert_eq!(snapshot.levels, LevelSnapshot::default());
        assert!(!snapshot.overload);
        assert_eq!(snapshot.gain_reduction_db, 0.0);
    }
}
