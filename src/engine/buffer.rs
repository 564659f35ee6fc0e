//! Audio Buffer Management
//!
//! Planar audio buffer plus the decibel helpers shared by the gain stages
//! and the meters.

use num_traits::Float;

use crate::error::{Result, SqueezeError};

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert decibels to linear amplitude
///
/// Generic over `f32` (meters, audio) and `f64` (gain stages).
#[inline]
pub fn db_to_linear<T: Float>(db: T) -> T {
    let ten = T::from(10.0).unwrap_or_else(T::one);
    let twenty = T::from(20.0).unwrap_or_else(T::one);
    ten.powf(db / twenty)
}

/// Convert linear amplitude to decibels
///
/// # Returns
/// Value in decibels. Returns negative infinity for zero (or negative) input.
#[inline]
pub fn linear_to_db<T: Float>(linear: T) -> T {
    if linear <= T::zero() {
        T::neg_infinity()
    } else {
        let twenty = T::from(20.0).unwrap_or_else(T::one);
        twenty * linear.log10()
    }
}

/// Peak absolute level of a slice in dBFS
pub fn peak_db(samples: &[f32]) -> f32 {
    let peak = samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max);
    linear_to_db(peak)
}

/// Sum of squares of a slice, accumulated in f64
#[inline]
pub(crate) fn sum_of_squares(samples: &[f32]) -> f64 {
    samples.iter().map(|&s| (s as f64) * (s as f64)).sum()
}

/// RMS level of a slice in dBFS
pub fn rms_db(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return f32::NEG_INFINITY;
    }
    let rms = (sum_of_squares(samples) / samples.len() as f64).sqrt() as f32;
    linear_to_db(rms)
}

// ============================================================================
// Channel Layout
// ============================================================================

/// Audio channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelLayout {
    /// Single channel (mono)
    Mono,
    /// Two channels (stereo: left, right)
    #[default]
    Stereo,
}

impl ChannelLayout {
    /// Returns the number of channels for this layout
    pub fn num_channels(&self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    /// Create a ChannelLayout from a channel count
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            _ => None,
        }
    }
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// Non-interleaved 32-bit float audio
///
/// Each channel is a separate `Vec<f32>`; all channels have the same length.
///
/// # Example
/// ```
/// use squeeze::engine::{AudioBuffer, ChannelLayout};
///
/// let buffer = AudioBuffer::new(44100, ChannelLayout::Stereo, 44100);
/// assert_eq!(buffer.num_channels(), 2);
/// assert_eq!(buffer.num_samples(), 44100);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a zeroed buffer
    pub fn new(num_samples: usize, layout: ChannelLayout, sample_rate: u32) -> Self {
        Self {
            samples: vec![vec![0.0_f32; num_samples]; layout.num_channels()],
            sample_rate,
        }
    }

    /// Create a buffer from planar channel data
    pub fn from_channels(samples: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if ChannelLayout::from_count(samples.len()).is_none() {
            return Err(SqueezeError::UnsupportedFormat {
                format: format!("{}-channel audio (only mono/stereo supported)", samples.len()),
            });
        }
        let len = samples[0].len();
        if samples.iter().any(|ch| ch.len() != len) {
            return Err(SqueezeError::InvalidAudio {
                reason: "channels have different lengths".to_string(),
                source: None,
            });
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Create a buffer from interleaved sample data (L, R, L, R, ...)
    pub fn from_interleaved(
        interleaved: &[f32],
        layout: ChannelLayout,
        sample_rate: u32,
    ) -> Result<Self> {
        let num_channels = layout.num_channels();

        if interleaved.len() % num_channels != 0 {
            return Err(SqueezeError::InvalidAudio {
                reason: format!(
                    "Interleaved data length {} is not divisible by channel count {}",
                    interleaved.len(),
                    num_channels
                ),
                source: None,
            });
        }

        let num_samples = interleaved.len() / num_channels;
        let mut samples = vec![Vec::with_capacity(num_samples); num_channels];
        for frame in interleaved.chunks_exact(num_channels) {
            for (ch, &sample) in frame.iter().enumerate() {
                samples[ch].push(sample);
            }
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Convert the buffer to interleaved format
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut interleaved = Vec::with_capacity(self.num_channels() * self.num_samples());
        for frame in 0..self.num_samples() {
            for channel in &self.samples {
                interleaved.push(channel[frame]);
            }
        }
        interleaved
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.samples.len()
    }

    /// Number of samples per channel
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.samples.first().map(|ch| ch.len()).unwrap_or(0)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_samples() == 0
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.num_samples() as f64 / self.sample_rate as f64
    }

    #[inline]
    pub fn channel(&self, channel: usize) -> &[f32] {
        &self.samples[channel]
    }

    #[inline]
    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        &mut self.samples[channel]
    }

    /// Iterate over mutable channel slices
    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        self.samples.iter_mut().map(|ch| ch.as_mut_slice())
    }

    /// Peak level across all channels in dBFS
    pub fn peak_db(&self) -> f32 {
        self.samples
            .iter()
            .map(|ch| peak_db(ch))
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// RMS level across all channels in dBFS
    pub fn rms_db(&self) -> f32 {
        let total = self.num_channels() * self.num_samples();
        if total == 0 {
            return f32::NEG_INFINITY;
        }
        let sum: f64 = self.samples.iter().map(|ch| sum_of_squares(ch)).sum();
        linear_to_db((sum / total as f64).sqrt() as f32)
    }

    /// Split into consecutive blocks of at most `block_size` frames
    ///
    /// Used by offline rendering to feed a real-time pipeline.
    pub fn blocks(&self, block_size: usize) -> Vec<AudioBuffer> {
        let block_size = block_size.max(1);
        let mut blocks = Vec::new();
        let mut start = 0;
        while start < self.num_samples() {
            let end = (start + block_size).min(self.num_samples());
            blocks.push(AudioBuffer {
                samples: self
                    .samples
                    .iter()
                    .map(|ch| ch[start..end].to_vec())
                    .collect(),
                sample_rate: self.sample_rate,
            });
            start = end;
        }
        blocks
    }

    /// Append another buffer with the same channel count
    pub fn append(&mut self, other: &AudioBuffer) {
        debug_assert_eq!(self.num_channels(), other.num_channels());
        for (dst, src) in self.samples.iter_mut().zip(&other.samples) {
            dst.extend_from_slice(src);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
