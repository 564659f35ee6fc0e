//! Audio Engine Module
//!
//! Offline plumbing around the real-time core:
//! - Audio buffer management and decibel helpers
//! - WAV file I/O

pub mod buffer;
pub mod io;

pub use buffer::{db_to_linear, linear_to_db, peak_db, rms_db, AudioBuffer, ChannelLayout};
pub use io::{export_audio, generate_test_tone, import_audio, BitDepth};
