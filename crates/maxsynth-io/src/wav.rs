//! WAV file reading and writing.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Sample frames per channel.
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// Output file format: channel count, sample rate and bit depth.
///
/// 32-bit files are written as IEEE float, 16 and 24-bit as PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample: 16, 24 or 32.
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl WavSpec {
    fn format(self) -> WavFormat {
        if self.bits_per_sample == 32 {
            WavFormat::IeeeFloat
        } else {
            WavFormat::Pcm
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: match spec.format() {
                WavFormat::IeeeFloat => SampleFormat::Float,
                WavFormat::Pcm => SampleFormat::Int,
            },
        }
    }
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let num_frames = u64::from(reader.duration());
    let duration_secs = num_frames as f64 / f64::from(spec.sample_rate);

    let format = match spec.sample_format {
        SampleFormat::Float => WavFormat::IeeeFloat,
        SampleFormat::Int => WavFormat::Pcm,
    };

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs,
        format,
    })
}

/// Read a WAV file into planar `f32` channels.
///
/// Integer files are scaled into [-1, 1).
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<Vec<f32>>, WavSpec)> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match reader.spec().sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let frames = interleaved.len() / channels;
    let mut planar = vec![Vec::with_capacity(frames); channels];
    for frame in interleaved.chunks_exact(channels) {
        for (channel, &sample) in planar.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }

    Ok((planar, spec))
}

/// Write planar channels to a WAV file.
///
/// `channels.len()` must equal `spec.channels` and every channel must have
/// the same length. Integer output is clamped to the format's range.
///
/// # Example
/// ```ignore
/// let mono = vec![0.0f32; 48000];
/// write_wav("out.wav", &[&mono[..]], WavSpec::default())?;
/// ```
pub fn write_wav<P: AsRef<Path>>(path: P, channels: &[&[f32]], spec: WavSpec) -> Result<()> {
    if !matches!(spec.bits_per_sample, 16 | 24 | 32) {
        return Err(Error::UnsupportedBitDepth(spec.bits_per_sample));
    }
    if channels.len() != usize::from(spec.channels) || channels.is_empty() {
        return Err(Error::ChannelMismatch {
            expected: spec.channels,
            actual: channels.len(),
        });
    }
    let frames = channels[0].len();
    if let Some((channel, ch)) = channels.iter().enumerate().find(|(_, c)| c.len() != frames) {
        return Err(Error::RaggedChannels {
            channel,
            len: ch.len(),
            expected: frames,
        });
    }

    let path = path.as_ref();
    tracing::debug!(
        path = %path.display(),
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        frames,
        "writing WAV"
    );

    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;
    match spec.format() {
        WavFormat::IeeeFloat => {
            for i in 0..frames {
                for channel in channels {
                    writer.write_sample(channel[i])?;
                }
            }
        }
        WavFormat::Pcm => {
            let max_val = (1i32 << (spec.bits_per_sample - 1)) as f32;
            for i in 0..frames {
                for channel in channels {
                    let int_sample = (channel[i] * max_val).clamp(-max_val, max_val - 1.0) as i32;
                    writer.write_sample(int_sample)?;
                }
            }
        }
    }

    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn ramp(len: usize, scale: f32) -> Vec<f32> {
        (0..len).map(|i| (i as f32 / len as f32).sin() * scale).collect()
    }

    #[test]
    fn test_float_stereo_preserves_channels() {
        let left = ramp(1000, 1.0);
        let right: Vec<f32> = left.iter().map(|s| -s).collect();
        let spec = WavSpec {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 32,
        };

        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &[&left[..], &right[..]], spec).unwrap();

        let (loaded, loaded_spec) = read_wav(file.path()).unwrap();
        assert_eq!(loaded_spec, spec);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], left);
        assert_eq!(loaded[1], right);
    }

    #[test]
    fn test_pcm16_precision() {
        let mono = ramp(1000, 0.9);
        let spec = WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
        };

        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &[&mono[..]], spec).unwrap();

        let (loaded, _) = read_wav(file.path()).unwrap();
        for (a, b) in mono.iter().zip(loaded[0].iter()) {
            assert!((a - b).abs() < 0.001);
        }
    }

    #[test]
    fn test_pcm24_precision() {
        let mono = ramp(500, 0.5);
        let spec = WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 24,
        };

        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &[&mono[..]], spec).unwrap();

        let (loaded, _) = read_wav(file.path()).unwrap();
        for (a, b) in mono.iter().zip(loaded[0].iter()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn test_pcm_clamps_full_scale() {
        let mono = [1.0f32, -1.0, 2.0];
        let spec = WavSpec {
            bits_per_sample: 16,
            ..Default::default()
        };

        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &[&mono[..]], spec).unwrap();

        let (loaded, _) = read_wav(file.path()).unwrap();
        assert!((loaded[0][0] - 32767.0 / 32768.0).abs() < 1e-6);
        assert_eq!(loaded[0][1], -1.0);
        assert!(loaded[0][2] < 1.0);
    }

    #[test]
    fn test_info_reports_frames_per_channel() {
        let left = vec![0.0f32; 4800];
        let right = vec![0.0f32; 4800];
        let spec = WavSpec {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 32,
        };

        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &[&left[..], &right[..]], spec).unwrap();

        let info = read_wav_info(file.path()).unwrap();
        assert_eq!(info.channels, 2);
        assert_eq!(info.num_frames, 4800);
        assert!((info.duration_secs - 0.1).abs() < 1e-9);
        assert_eq!(info.format, WavFormat::IeeeFloat);
    }

    #[test]
    fn test_rejects_bad_bit_depth() {
        let mono = [0.0f32; 8];
        let spec = WavSpec {
            bits_per_sample: 8,
            ..Default::default()
        };
        let file = NamedTempFile::new().unwrap();
        let err = write_wav(file.path(), &[&mono[..]], spec).unwrap_err();
        assert!(matches!(err, Error::UnsupportedBitDepth(8)));
    }

    #[test]
    fn test_rejects_channel_mismatch() {
        let mono = [0.0f32; 8];
        let spec = WavSpec {
            channels: 2,
            ..Default::default()
        };
        let file = NamedTempFile::new().unwrap();
        let err = write_wav(file.path(), &[&mono[..]], spec).unwrap_err();
        assert!(matches!(
            err,
            Error::ChannelMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_rejects_ragged_channels() {
        let left = [0.0f32; 8];
        let right = [0.0f32; 7];
        let spec = WavSpec {
            channels: 2,
            ..Default::default()
        };
        let file = NamedTempFile::new().unwrap();
        let err = write_wav(file.path(), &[&left[..], &right[..]], spec).unwrap_err();
        assert!(matches!(
            err,
            Error::RaggedChannels {
                channel: 1,
                len: 7,
                expected: 8
            }
        ));
    }
}
