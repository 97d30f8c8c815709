//! Audio fragment normalization and WAV re-framing.

mod stream;
pub mod wav;

pub use stream::{StreamState, wav_stream};
pub use wav::{STREAMING_HEADER_LEN, STREAMING_LENGTH_SENTINEL, WavParameters, WavParseError};
