//! RIFF/WAVE header parsing
//!
//! Layout: a 12-byte `RIFF` header naming the `WAVE` form, followed by
//! chunks of `[id: 4 bytes][size: u32 LE][payload]`. Only `fmt ` and `data`
//! are interpreted; any other chunk is skipped. Chunk payloads are padded to
//! an even length.

use super::AudioError;
use std::path::Path;

/// Decoded PCM clip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavData {
    /// Number of interleaved channels
    pub channels: u16,
    /// Samples per second per channel
    pub sample_rate: u32,
    /// Bits per sample (8 or 16 for PCM)
    pub bits_per_sample: u16,
    /// Raw little-endian sample bytes from the `data` chunk
    pub samples: Vec<u8>,
}

impl WavData {
    /// Playback length in seconds
    pub fn duration_secs(&self) -> f32 {
        let bytes_per_frame =
            u32::from(self.channels) * u32::from(self.bits_per_sample).div_ceil(8);
        if bytes_per_frame == 0 || self.sample_rate == 0 {
            return 0.0;
        }
        let frames = self.samples.len() as f32 / bytes_per_frame as f32;
        frames / self.sample_rate as f32
    }
}

/// Read and parse a `.wav` file
pub fn load(path: impl AsRef<Path>) -> Result<WavData, AudioError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|err| AudioError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    parse(&bytes)
}

/// Parse an in-memory `.wav` file
pub fn parse(bytes: &[u8]) -> Result<WavData, AudioError> {
    expect_tag(bytes, 0, b"RIFF")?;
    expect_tag(bytes, 8, b"WAVE")?;

    let mut format: Option<(u16, u32, u16)> = None;
    let mut samples: Option<Vec<u8>> = None;
    let mut offset = 12;

    while offset + 8 <= bytes.len() {
        let id = &bytes[offset..offset + 4];
        let size = read_u32(bytes, offset + 4)? as usize;
        let body_start = offset + 8;
        let body_end = body_start
            .checked_add(size)
            .filter(|end| *end <= bytes.len())
            .ok_or_else(|| {
                AudioError::InvalidWav(format!(
                    "chunk {:?} claims {} bytes but only {} remain",
                    String::from_utf8_lossy(id),
                    size,
                    bytes.len() - body_start
                ))
            })?;

        match id {
            b"fmt " => {
                if size < 16 {
                    return Err(AudioError::InvalidWav(format!("fmt chunk too short: {size} bytes")));
                }
                let channels = read_u16(bytes, body_start + 2)?;
                let sample_rate = read_u32(bytes, body_start + 4)?;
                let bits_per_sample = read_u16(bytes, body_start + 14)?;
                format = Some((channels, sample_rate, bits_per_sample));
            }
            b"data" => samples = Some(bytes[body_start..body_end].to_vec()),
            _ => {}
        }

        offset = body_end + (size & 1);
    }

    let (channels, sample_rate, bits_per_sample) =
        format.ok_or_else(|| AudioError::InvalidWav("missing fmt chunk".to_string()))?;
    let samples = samples.ok_or_else(|| AudioError::InvalidWav("missing data chunk".to_string()))?;

    if channels == 0 || sample_rate == 0 {
        return Err(AudioError::InvalidWav(format!(
            "unsupported format: {channels} channels at {sample_rate} Hz"
        )));
    }

    Ok(WavData {
        channels,
        sample_rate,
        bits_per_sample,
        samples,
    })
}

fn expect_tag(bytes: &[u8], offset: usize, tag: &[u8; 4]) -> Result<(), AudioError> {
    match bytes.get(offset..offset + 4) {
        Some(found) if found == tag => Ok(()),
        Some(found) => Err(AudioError::InvalidWav(format!(
            "expected {:?} at byte {}, found {:?}",
            String::from_utf8_lossy(tag),
            offset,
            String::from_utf8_lossy(found)
        ))),
        None => Err(AudioError::InvalidWav(format!(
            "file truncated before {:?} signature",
            String::from_utf8_lossy(tag)
        ))),
    }
}

fn read_u16(bytes: &[u8], offset: usize) -> Result<u16, AudioError> {
    bytes
        .get(offset..offset + 2)
        .map(|raw| u16::from_le_bytes([raw[0], raw[1]]))
        .ok_or_else(|| AudioError::InvalidWav(format!("truncated u16 at byte {offset}")))
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32, AudioError> {
    bytes
        .get(offset..offset + 4)
        .map(|raw| u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
        .ok_or_else(|| AudioError::InvalidWav(format!("truncated u32 at byte {offset}")))
}

/// Build a PCM `.wav` file in memory
#[cfg(test)]
pub(crate) fn encode_pcm(channels: u16, sample_rate: u32, bits_per_sample: u16, samples: &[u8]) -> Vec<u8> {
    let block_align = channels * bits_per_sample / 8;
    let byte_rate = sample_rate * u32::from(block_align);
    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + samples.len() as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(samples.len() as u32).to_le_bytes());
    out.extend_from_slice(samples);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_header_fields() {
        let bytes = encode_pcm(2, 44_100, 16, &[0u8; 16]);
        let wav = parse(&bytes).unwrap();
        assert_eq!(wav.channels, 2);
        assert_eq!(wav.sample_rate, 44_100);
        assert_eq!(wav.bits_per_sample, 16);
        assert_eq!(wav.samples.len(), 16);
    }

    #[test]
    fn test_duration() {
        let bytes = encode_pcm(1, 8_000, 8, &vec![128u8; 4_000]);
        assert_relative_eq!(parse(&bytes).unwrap().duration_secs(), 0.5);
    }

    #[test]
    fn test_rejects_bad_signatures() {
        let mut bytes = encode_pcm(1, 8_000, 8, &[0u8; 4]);
        bytes[0..4].copy_from_slice(b"RIFX");
        assert!(matches!(parse(&bytes), Err(AudioError::InvalidWav(_))));

        let mut bytes = encode_pcm(1, 8_000, 8, &[0u8; 4]);
        bytes[8..12].copy_from_slice(b"AVI ");
        assert!(matches!(parse(&bytes), Err(AudioError::InvalidWav(_))));

        assert!(matches!(parse(b"RIF"), Err(AudioError::InvalidWav(_))));
    }

    #[test]
    fn test_skips_unknown_chunks() {
        let plain = encode_pcm(1, 22_050, 16, &[1, 2, 3, 4]);
        let mut bytes = plain[..12].to_vec();
        bytes.extend_from_slice(b"LIST");
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(&[9, 9, 9, 0]);
        bytes.extend_from_slice(&plain[12..]);

        let wav = parse(&bytes).unwrap();
        assert_eq!(wav.samples, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_missing_data_chunk() {
        let bytes = encode_pcm(1, 8_000, 8, &[]);
        let truncated = &bytes[..36];
        assert!(matches!(parse(truncated), Err(AudioError::InvalidWav(_))));
    }

    #[test]
    fn test_truncated_chunk_is_rejected() {
        let mut bytes = encode_pcm(1, 8_000, 8, &[0u8; 8]);
        bytes.truncate(bytes.len() - 4);
        assert!(matches!(parse(&bytes), Err(AudioError::InvalidWav(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load(dir.path().join("missing.wav"));
        assert!(matches!(result, Err(AudioError::Io { .. })));
    }
}
