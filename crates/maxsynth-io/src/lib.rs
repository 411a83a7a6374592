//! Audio file I/O for maxsynth renders.
//!
//! Rendered audio is held planar (one `Vec<f32>` per channel) and written
//! interleaved through [`hound`]:
//!
//! - [`write_wav`] - 16/24-bit PCM or 32-bit float output
//! - [`read_wav`] - Planar `f32` read-back
//! - [`read_wav_info`] - Header-only metadata
//!
//! ```rust,no_run
//! use maxsynth_io::{WavSpec, write_wav};
//!
//! let left = vec![0.0f32; 48000];
//! let right = vec![0.0f32; 48000];
//! let spec = WavSpec { channels: 2, ..Default::default() };
//! write_wav("silence.wav", &[&left[..], &right[..]], spec)?;
//! # Ok::<(), maxsynth_io::Error>(())
//! ```

mod wav;

pub use wav::{WavFormat, WavInfo, WavSpec, read_wav, read_wav_info, write_wav};

/// Error types for audio file operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Bit depth other than 16, 24 or 32.
    #[error("Unsupported bit depth: {0}")]
    UnsupportedBitDepth(u16),

    /// Planar channel count disagrees with the requested format.
    #[error("Channel mismatch: spec has {expected} channels, got {actual}")]
    ChannelMismatch {
        /// Channels declared in the [`WavSpec`].
        expected: u16,
        /// Planar buffers supplied.
        actual: usize,
    },

    /// Planar buffers of unequal length.
    #[error("Channel {channel} has {len} frames, expected {expected}")]
    RaggedChannels {
        /// Offending channel index.
        channel: usize,
        /// Its length.
        len: usize,
        /// Length of channel 0.
        expected: usize,
    },
}

/// Convenience result type for audio file operations.
pub type Result<T> = std::result::Result<T, Error>;
