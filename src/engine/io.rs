//! WAV file I/O
//!
//! Feeds offline renders of the compressor. Audio keeps its native sample
//! rate; the pipeline is built for whatever rate the file carries.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::engine::buffer::{AudioBuffer, ChannelLayout};
use crate::error::{Result, SqueezeError};

/// Export bit depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitDepth {
    /// 16-bit integer PCM
    Int16,
    /// 24-bit integer PCM
    #[default]
    Int24,
    /// 32-bit IEEE float
    Float32,
}

impl BitDepth {
    fn bits(self) -> u16 {
        match self {
            BitDepth::Int16 => 16,
            BitDepth::Int24 => 24,
            BitDepth::Float32 => 32,
        }
    }
}

fn hound_error(e: hound::Error) -> SqueezeError {
    match e {
        hound::Error::IoError(io) => SqueezeError::Io(io),
        other => SqueezeError::InvalidAudio {
            reason: other.to_string(),
            source: Some(Box::new(other)),
        },
    }
}

/// Import a WAV file as 32-bit float
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidAudio` - If the file is not a valid WAV file
/// * `UnsupportedFormat` - More than 2 channels or an exotic bit depth
/// * `EmptyAudio` - The file holds no frames
pub fn import_audio(path: &Path) -> Result<AudioBuffer> {
    if !path.exists() {
        return Err(SqueezeError::FileNotFound {
            path: path.display().to_string(),
            source: None,
        });
    }

    let reader = WavReader::open(path).map_err(|e| SqueezeError::InvalidAudio {
        reason: format!("Failed to open WAV file: {}", e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    let layout = ChannelLayout::from_count(spec.channels as usize).ok_or_else(|| {
        SqueezeError::UnsupportedFormat {
            format: format!("{}-channel audio (only mono/stereo supported)", spec.channels),
        }
    })?;

    let interleaved = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;
    let buffer = AudioBuffer::from_interleaved(&interleaved, layout, spec.sample_rate)?;
    if buffer.is_empty() {
        return Err(SqueezeError::EmptyAudio);
    }

    log::debug!(
        "imported {} ({} ch, {} Hz, {:.2}s)",
        path.display(),
        buffer.num_channels(),
        buffer.sample_rate(),
        buffer.duration_secs()
    );
    Ok(buffer)
}

/// Write a buffer to a WAV file at its own sample rate
pub fn export_audio(buffer: &AudioBuffer, path: &Path, depth: BitDepth) -> Result<()> {
    let spec = WavSpec {
        channels: buffer.num_channels() as u16,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: depth.bits(),
        sample_format: match depth {
            BitDepth::Float32 => SampleFormat::Float,
            _ => SampleFormat::Int,
        },
    };

    let mut writer = WavWriter::create(path, spec).map_err(hound_error)?;
    for sample in buffer.to_interleaved() {
        match depth {
            BitDepth::Int16 => {
                let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
                writer.write_sample(scaled).map_err(hound_error)?;
            }
            BitDepth::Int24 => {
                // 24-bit stored as i32 in hound
                let scaled = (sample * 8388607.0).clamp(-8388608.0, 8388607.0) as i32;
                writer.write_sample(scaled).map_err(hound_error)?;
            }
            BitDepth::Float32 => writer.write_sample(sample).map_err(hound_error)?,
        }
    }
    writer.finalize().map_err(hound_error)?;

    log::debug!("exported {} ({:?})", path.display(), depth);
    Ok(())
}

/// Generate a sine tone on every channel of the given layout
pub fn generate_test_tone(
    frequency: f32,
    amplitude: f32,
    duration_secs: f32,
    layout: ChannelLayout,
    sample_rate: u32,
) -> AudioBuffer {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let mut buffer = AudioBuffer::new(num_samples, layout, sample_rate);
    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;

    for channel in buffer.channels_mut() {
        for (i, sample) in channel.iter_mut().enumerate() {
            *sample = amplitude * (angular_freq * i as f32).sin();
        }
    }
    buffer
}

fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let scale = match (sample_format, bits_per_sample) {
        (SampleFormat::Float, _) => {
            return reader
                .samples::<f32>()
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(hound_error);
        }
        (SampleFormat::Int, 8) => 128.0,
        (SampleFormat::Int, 16) => 32768.0,
        (SampleFormat::Int, 24) => 8388608.0,
        (SampleFormat::Int, 32) => 2147483648.0,
        (SampleFormat::Int, bits) => {
            return Err(SqueezeError::UnsupportedFormat {
                format: format!("{}-bit integer audio", bits),
            });
        }
    };

    reader
        .samples::<i32>()
        .map(|s| s.map(|v| v as f32 / scale))
        .collect::<std::result::Result<Vec<f32>, _>>()
        .map_err(hound_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use tempfile::tempdir;

    #[test]
    fn test_import_missing_file() {
        let err = import_audio(Path::new("/definitely/not/here.wav")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }

    #[test]
    fn test_float_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let tone = generate_test_tone(440.0, 0.5, 0.05, ChannelLayout::Stereo, 44100);

        export_audio(&tone, &path, BitDepth::Float32).unwrap();
        let loaded = import_audio(&path).unwrap();

        assert_eq!(loaded, tone);
    }

    #[test]
    fn test_int16_round_trip_is_close() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone16.wav");
        let tone = generate_test_tone(1000.0, 0.8, 0.05, ChannelLayout::Mono, 48000);

        export_audio(&tone, &path, BitDepth::Int16).unwrap();
        let loaded = import_audio(&path).unwrap();

        assert_eq!(loaded.num_channels(), 1);
        assert_eq!(loaded.sample_rate(), 48000);
        for (a, b) in loaded.channel(0).iter().zip(tone.channel(0)) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-4);
        }
    }
}
