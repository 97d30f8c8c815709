//! WAV (RIFF) container parsing and streaming header synthesis.
//!
//! Upstream audio fragments may arrive as complete single-fragment WAV files,
//! each carrying its own 44-byte-class header. The gateway strips those
//! per-fragment headers and emits exactly one header for the whole response,
//! with the RIFF and data length fields set to the streaming sentinel
//! `0xFFFFFFFF` because the total length of a live stream cannot be known in
//! advance. Streaming consumers tolerate the sentinel; a real length is
//! impossible here.

use thiserror::Error;

/// Length sentinel written into the RIFF and data size fields of the
/// synthesized header to signal "length unknown at time of writing".
pub const STREAMING_LENGTH_SENTINEL: u32 = 0xFFFF_FFFF;

/// Size of the synthesized header: RIFF descriptor + 16-byte fmt chunk +
/// data chunk header.
pub const STREAMING_HEADER_LEN: usize = 44;

const RIFF_MAGIC: &[u8; 4] = b"RIFF";
const WAVE_MAGIC: &[u8; 4] = b"WAVE";
const FMT_CHUNK_ID: &[u8; 4] = b"fmt ";
const DATA_CHUNK_ID: &[u8; 4] = b"data";

/// Uncompressed PCM, the only format tag the upstream produces.
const FORMAT_TAG_PCM: u16 = 1;

/// Errors raised while parsing a fragment that claims to be a WAV container.
///
/// All of these are fatal to the request: a fragment starting with `RIFF`
/// that fails to parse means the stream format can no longer be trusted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WavParseError {
    #[error("container truncated ({0} bytes)")]
    Truncated(usize),
    #[error("RIFF form type is not WAVE")]
    NotWave,
    #[error("unsupported audio format tag {0} (only PCM is supported)")]
    UnsupportedFormat(u16),
    #[error("fmt chunk is malformed")]
    MalformedFmt,
    #[error("data chunk appears before fmt chunk")]
    DataBeforeFmt,
    #[error("container has no data chunk")]
    MissingData,
}

/// Audio parameters captured from the fmt chunk of the first WAV-bearing
/// fragment. Immutable for the lifetime of one request once captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavParameters {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl WavParameters {
    /// Bytes per sample frame across all channels.
    pub fn block_align(&self) -> u16 {
        self.channels * (self.bits_per_sample / 8)
    }

    /// Bytes per second of audio.
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * u32::from(self.block_align())
    }

    /// Builds the single 44-byte header emitted ahead of all PCM data.
    ///
    /// The RIFF size (offset 4) and data size (offset 40) fields carry
    /// [`STREAMING_LENGTH_SENTINEL`] instead of real lengths.
    pub fn streaming_header(&self) -> [u8; STREAMING_HEADER_LEN] {
        let mut header = [0u8; STREAMING_HEADER_LEN];
        header[0..4].copy_from_slice(RIFF_MAGIC);
        header[4..8].copy_from_slice(&STREAMING_LENGTH_SENTINEL.to_le_bytes());
        header[8..12].copy_from_slice(WAVE_MAGIC);
        header[12..16].copy_from_slice(FMT_CHUNK_ID);
        header[16..20].copy_from_slice(&16u32.to_le_bytes());
        header[20..22].copy_from_slice(&FORMAT_TAG_PCM.to_le_bytes());
        header[22..24].copy_from_slice(&self.channels.to_le_bytes());
        header[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        header[28..32].copy_from_slice(&self.byte_rate().to_le_bytes());
        header[32..34].copy_from_slice(&self.block_align().to_le_bytes());
        header[34..36].copy_from_slice(&self.bits_per_sample.to_le_bytes());
        header[36..40].copy_from_slice(DATA_CHUNK_ID);
        header[40..44].copy_from_slice(&STREAMING_LENGTH_SENTINEL.to_le_bytes());
        header
    }
}

/// Detection rule for self-contained WAV fragments: the first four bytes are
/// the ASCII literal `RIFF`. Anything else is treated as raw PCM.
pub fn is_wav_container(bytes: &[u8]) -> bool {
    bytes.starts_with(RIFF_MAGIC)
}

/// Parses a single-fragment WAV container, returning the captured parameters
/// and the raw PCM payload of its data chunk (container metadata excluded).
///
/// The caller must have established `is_wav_container` first; a non-RIFF
/// prefix here is reported as truncation. A declared data size larger than
/// the remaining bytes is clamped to what is actually present, matching how
/// lenient decoders read truncated files.
pub fn parse_wav_container(bytes: &[u8]) -> Result<(WavParameters, &[u8]), WavParseError> {
    if bytes.len() < 12 || !is_wav_container(bytes) {
        return Err(WavParseError::Truncated(bytes.len()));
    }
    if &bytes[8..12] != WAVE_MAGIC {
        return Err(WavParseError::NotWave);
    }

    let mut params: Option<WavParameters> = None;
    let mut offset = 12usize;
    while offset + 8 <= bytes.len() {
        let chunk_id: [u8; 4] = bytes[offset..offset + 4].try_into().unwrap();
        let declared = read_u32(bytes, offset + 4) as usize;
        let body_start = offset + 8;
        let body_end = (body_start + declared).min(bytes.len());
        let body = &bytes[body_start..body_end];

        match &chunk_id {
            FMT_CHUNK_ID => params = Some(parse_fmt_chunk(body)?),
            DATA_CHUNK_ID => {
                return match params {
                    Some(params) => Ok((params, body)),
                    None => Err(WavParseError::DataBeforeFmt),
                };
            }
            _ => {}
        }

        // Chunks are word-aligned; odd sizes carry a pad byte.
        offset = body_start + declared + (declared & 1);
    }

    Err(WavParseError::MissingData)
}

fn parse_fmt_chunk(body: &[u8]) -> Result<WavParameters, WavParseError> {
    if body.len() < 16 {
        return Err(WavParseError::MalformedFmt);
    }
    let format_tag = read_u16(body, 0);
    if format_tag != FORMAT_TAG_PCM {
        return Err(WavParseError::UnsupportedFormat(format_tag));
    }
    let channels = read_u16(body, 2);
    let sample_rate = read_u32(body, 4);
    let bits_per_sample = read_u16(body, 14);
    if channels == 0 || sample_rate == 0 || bits_per_sample == 0 || bits_per_sample % 8 != 0 {
        return Err(WavParseError::MalformedFmt);
    }
    // The derived block_align and byte_rate must fit their header fields;
    // values that would overflow cannot describe real audio.
    let block_align = channels
        .checked_mul(bits_per_sample / 8)
        .ok_or(WavParseError::MalformedFmt)?;
    if sample_rate.checked_mul(u32::from(block_align)).is_none() {
        return Err(WavParseError::MalformedFmt);
    }
    Ok(WavParameters {
        channels,
        sample_rate,
        bits_per_sample,
    })
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}


#[cfg(test)]
mod tests {
    use super::test_support::build_wav;
    use super::*;

    const PARAMS: WavParameters = WavParameters {
        channels: 1,
        sample_rate: 24000,
        bits_per_sample: 16,
    };

    #[test]
    fn test_detection_rule() {
        assert!(is_wav_container(b"RIFF\x00\x00\x00\x00WAVE"));
        assert!(!is_wav_container(b"RIFX1234"));
        assert!(!is_wav_container(b"RI"));
        assert!(!is_wav_container(&[0x01, 0x02, 0x03, 0x04]));
    }

    #[test]
    fn test_parse_round_trip() {
        let pcm: Vec<u8> = (0u8..=99).collect();
        let wav = build_wav(PARAMS, &pcm);

        let (params, payload) = parse_wav_container(&wav).unwrap();
        assert_eq!(params, PARAMS);
        assert_eq!(payload, &pcm[..]);
    }

    #[test]
    fn test_parse_stereo_parameters() {
        let params = WavParameters {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 16,
        };
        let wav = build_wav(params, &[0u8; 8]);
        let (parsed, _) = parse_wav_container(&wav).unwrap();
        assert_eq!(parsed.channels, 2);
        assert_eq!(parsed.block_align(), 4);
        assert_eq!(parsed.byte_rate(), 176_400);
    }

    #[test]
    fn test_parse_skips_unknown_chunks() {
        // LIST chunk between fmt and data must be ignored.
        let mut wav = build_wav(PARAMS, b"PCMDATA!");
        let mut with_list = wav[..36].to_vec();
        with_list.extend_from_slice(b"LIST");
        with_list.extend_from_slice(&4u32.to_le_bytes());
        with_list.extend_from_slice(b"INFO");
        with_list.extend_from_slice(&wav.split_off(36));

        let (params, payload) = parse_wav_container(&with_list).unwrap();
        assert_eq!(params, PARAMS);
        assert_eq!(payload, b"PCMDATA!");
    }

    #[test]
    fn test_parse_clamps_overlong_data_size() {
        let mut wav = build_wav(PARAMS, b"1234");
        // Declare far more data than is present.
        wav[40..44].copy_from_slice(&1_000_000u32.to_le_bytes());
        let (_, payload) = parse_wav_container(&wav).unwrap();
        assert_eq!(payload, b"1234");
    }

    #[test]
    fn test_parse_truncated_container() {
        assert_eq!(
            parse_wav_container(b"RIFF\x04\x00"),
            Err(WavParseError::Truncated(6))
        );
    }

    #[test]
    fn test_parse_not_wave() {
        assert_eq!(
            parse_wav_container(b"RIFF\x04\x00\x00\x00AVI LIST"),
            Err(WavParseError::NotWave)
        );
    }

    #[test]
    fn test_parse_rejects_non_pcm() {
        let mut wav = build_wav(PARAMS, &[0u8; 4]);
        // Format tag 3 = IEEE float.
        wav[20..22].copy_from_slice(&3u16.to_le_bytes());
        assert_eq!(
            parse_wav_container(&wav),
            Err(WavParseError::UnsupportedFormat(3))
        );
    }

    /// Parameters whose derived block_align or byte_rate would overflow
    /// their header fields are malformed, not a panic in header synthesis.
    #[test]
    fn test_parse_rejects_overflowing_parameters() {
        // 40000 channels at 16 bits: block_align exceeds u16.
        let mut wav = build_wav(PARAMS, &[0u8; 4]);
        wav[22..24].copy_from_slice(&40000u16.to_le_bytes());
        assert_eq!(parse_wav_container(&wav), Err(WavParseError::MalformedFmt));

        // Stereo at an absurd sample rate: byte_rate exceeds u32.
        let mut wav = build_wav(PARAMS, &[0u8; 4]);
        wav[22..24].copy_from_slice(&2u16.to_le_bytes());
        wav[24..28].copy_from_slice(&0xF000_0000u32.to_le_bytes());
        assert_eq!(parse_wav_container(&wav), Err(WavParseError::MalformedFmt));
    }

    #[test]
    fn test_parse_missing_data_chunk() {
        let wav = build_wav(PARAMS, &[]);
        let headerless = &wav[..36];
        assert_eq!(
            parse_wav_container(headerless),
            Err(WavParseError::MissingData)
        );
    }

    #[test]
    fn test_parse_data_before_fmt() {
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&12u32.to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&2u32.to_le_bytes());
        wav.extend_from_slice(&[0, 0]);
        assert_eq!(parse_wav_container(&wav), Err(WavParseError::DataBeforeFmt));
    }

    #[test]
    fn test_streaming_header_layout() {
        let header = PARAMS.streaming_header();
        assert_eq!(header.len(), STREAMING_HEADER_LEN);
        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(&header[8..12], b"WAVE");
        assert_eq!(&header[12..16], b"fmt ");
        assert_eq!(&header[36..40], b"data");
        // Both length fields carry the streaming sentinel bytes.
        assert_eq!(&header[4..8], &[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(&header[40..44], &[0xFF, 0xFF, 0xFF, 0xFF]);
        // Captured parameters are encoded little-endian.
        assert_eq!(u16::from_le_bytes([header[22], header[23]]), 1);
        assert_eq!(
            u32::from_le_bytes([header[24], header[25], header[26], header[27]]),
            24000
        );
        assert_eq!(u16::from_le_bytes([header[34], header[35]]), 16);
    }

    #[test]
    fn test_streaming_header_parses_as_container_prefix() {
        // A consumer clamping the sentinel length must still see valid params.
        let mut stream = PARAMS.streaming_header().to_vec();
        stream.extend_from_slice(&[1, 2, 3, 4]);
        let (params, payload) = parse_wav_container(&stream).unwrap();
        assert_eq!(params, PARAMS);
        assert_eq!(payload, &[1, 2, 3, 4]);
    }
}
