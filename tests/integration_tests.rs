//! Integration Tests
//!
//! End-to-end tests for the compressor, meter and pipeline through the
//! public API.

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use tempfile::tempdir;
use test_case::test_case;

use squeeze::engine::{export_audio, generate_test_tone, import_audio, BitDepth, ChannelLayout};
use squeeze::meter::{ColorClass, METER_FLOOR, METER_OFF};
use squeeze::{
    GainStage, GainStageModel, GainStageVariant, LevelSnapshot, MeterBarLevel, MeteringPipeline,
    ProcessorConfig,
};

const SAMPLE_RATE: f64 = 48000.0;

// === Gain stages ===

#[test_case(GainStageVariant::Fet ; "fet")]
#[test_case(GainStageVariant::Optical ; "optical")]
fn test_reset_has_no_discontinuity(variant: GainStageVariant) {
    let mut stage = GainStageModel::new(variant, SAMPLE_RATE);
    for x in [0.0, -3.0, -12.5, -36.0] {
        stage.reset(x);
        assert_eq!(stage.process_gain_reduction(x, x), x);
    }
}

#[test_case(GainStageVariant::Fet, 0.05 ; "fet settles within 50 ms")]
#[test_case(GainStageVariant::Optical, 0.2 ; "optical settles within 200 ms")]
fn test_step_converges_without_overshoot(variant: GainStageVariant, settle_secs: f64) {
    let mut stage = GainStageModel::new(variant, SAMPLE_RATE);
    stage.reset(0.0);

    let mut previous = 0.0;
    for _ in 0..(settle_secs * SAMPLE_RATE) as usize {
        let applied = stage.process_gain_reduction(-10.0, -10.0);
        assert!(applied <= previous, "attack must be monotonic");
        assert!(applied >= -10.0, "attack must not overshoot");
        previous = applied;
    }
    assert_relative_eq!(previous, -10.0, epsilon = 1e-3);
}

#[test_case(GainStageVariant::Fet ; "fet")]
#[test_case(GainStageVariant::Optical ; "optical")]
fn test_release_is_monotonic(variant: GainStageVariant) {
    let mut stage = GainStageModel::new(variant, SAMPLE_RATE);
    stage.reset(-12.0);

    let mut previous = -12.0;
    for _ in 0..SAMPLE_RATE as usize {
        let applied = stage.process_gain_reduction(0.0, 0.0);
        assert!(applied >= previous);
        assert!(applied <= 0.0);
        previous = applied;
    }
}

// === Meter aggregation ===

#[test]
fn test_ladder_for_crest_factor_20_and_5_bars() {
    let meter = MeterBarLevel::new(20.0, 5);
    let segments = meter.segments();

    assert_eq!(segments.len(), 6);
    assert_eq!(segments[0].color(), ColorClass::Hot);
    assert_eq!(segments[0].color().index(), 0);
    for pair in segments[1..].windows(2) {
        assert_relative_eq!(pair[0].threshold() - pair[1].threshold(), 2.0, epsilon = 1e-5);
    }
}

#[test]
fn test_overload_follows_maximum() {
    let mut meter = MeterBarLevel::new(20.0, 5);

    meter.set_level(0.0, 0.0, 0.0, 20.0);
    assert!(meter.is_overloaded());
    assert_relative_eq!(meter.overload_segment().peak_level(), 20.01, epsilon = 1e-5);

    meter.set_level(0.0, 0.0, 0.0, 19.99);
    assert!(!meter.is_overloaded());
    assert_eq!(meter.overload_segment().peak_level(), METER_OFF);
}

#[test]
fn test_repeated_set_level_is_a_no_op() {
    let mut meter = MeterBarLevel::new(20.0, 5);
    meter.set_level(12.0, 8.0, 14.0, 14.0);
    let segments = meter.segments().to_vec();
    let count = meter.update_count();

    meter.set_level(12.0, 8.0, 14.0, 14.0);
    assert_eq!(meter.update_count(), count);
    assert_eq!(meter.segments(), segments.as_slice());
}

#[test]
fn test_fresh_meter_reads_floor() {
    let meter = MeterBarLevel::new(20.0, 20);
    assert_eq!(meter.levels(), LevelSnapshot::default());
    assert_eq!(meter.levels().maximum, METER_FLOOR);
}

// === Pipeline ===

#[test_case(GainStageVariant::Fet ; "fet")]
#[test_case(GainStageVariant::Optical ; "optical")]
fn test_loud_tone_is_compressed_and_metered(variant: GainStageVariant) {
    let mut config = ProcessorConfig::default();
    config.compressor.variant = variant;
    let mut pipeline = MeteringPipeline::new(&config).unwrap();
    assert_eq!(pipeline.variant(), variant);

    let tone = generate_test_tone(100.0, 0.9, 1.0, ChannelLayout::Stereo, 48000);
    let output = pipeline.process_buffer(&tone, config.block_size);

    let snapshot = pipeline.snapshot();
    assert!(output.rms_db() < tone.rms_db() - 3.0);
    assert!(snapshot.gain_reduction_db < -3.0);
    assert!(snapshot.levels.average > METER_FLOOR);
    assert!(snapshot.levels.maximum >= snapshot.levels.peak);
    assert!(!snapshot.overload);
}

#[test]
fn test_quiet_tone_passes_untouched() {
    let config = ProcessorConfig {
        channels: 1,
        ..Default::default()
    };
    let mut pipeline = MeteringPipeline::new(&config).unwrap();

    // -40 dBFS, far below the -18 dB threshold
    let tone = generate_test_tone(1000.0, 0.01, 0.25, ChannelLayout::Mono, 48000);
    let output = pipeline.process_buffer(&tone, 128);

    assert_eq!(pipeline.snapshot().gain_reduction_db, 0.0);
    for (a, b) in output.channel(0).iter().zip(tone.channel(0)) {
        assert_relative_eq!(*a, *b, epsilon = 1e-6);
    }
}

#[test]
fn test_wav_render_round_trip() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");

    let tone = generate_test_tone(220.0, 0.8, 0.5, ChannelLayout::Stereo, 44100);
    export_audio(&tone, &input, BitDepth::Float32).unwrap();

    let audio = import_audio(&input).unwrap();
    let config = ProcessorConfig {
        sample_rate: audio.sample_rate(),
        channels: audio.num_channels(),
        ..Default::default()
    };
    let mut pipeline = MeteringPipeline::new(&config).unwrap();
    let rendered = pipeline.process_buffer(&audio, config.block_size);
    export_audio(&rendered, &output, BitDepth::Float32).unwrap();

    let reloaded = import_audio(&output).unwrap();
    assert_eq!(reloaded.num_samples(), tone.num_samples());
    assert_eq!(reloaded.num_channels(), 2);
    assert!(reloaded.peak_db() < tone.peak_db());
}

#[test]
fn test_config_file_drives_pipeline() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("squeeze.json");

    let mut config = ProcessorConfig::default();
    config.compressor.variant = GainStageVariant::Optical;
    config.meter.crest_factor = 14.0;
    config.meter.number_of_bars = 10;
    config.to_file(&path).unwrap();

    let loaded = ProcessorConfig::from_file(&path).unwrap();
    assert_eq!(loaded, config);

    let pipeline = MeteringPipeline::new(&loaded).unwrap();
    assert_eq!(pipeline.variant(), GainStageVariant::Optical);
    assert_eq!(pipeline.segments().len(), 11);
    assert_relative_eq!(pipeline.meter().crest_factor(), 14.0);
}
