//! Line framing over an arbitrary chunked byte stream.
//!
//! The upstream SSE transport delivers opaque byte chunks with no relationship
//! to line boundaries: one network read may carry half a line, several lines,
//! or a line split across three reads. This module re-frames those chunks into
//! a lazy sequence of trimmed text lines so the event decoder never has to
//! care where the chunk boundaries fell.

use async_stream::try_stream;
use bytes::Bytes;
use futures::Stream;

/// Turns a stream of raw byte chunks into a stream of trimmed, non-empty
/// UTF-8 lines.
///
/// An unterminated tail is buffered across chunk boundaries and flushed as one
/// final line when the upstream stream ends. Lines are yielded strictly in
/// arrival order; an empty upstream stream yields no lines. Invalid UTF-8 is
/// replaced lossily rather than aborting the stream.
pub fn event_lines<S, E>(upstream: S) -> impl Stream<Item = Result<String, E>>
where
    S: Stream<Item = Result<Bytes, E>>,
{
    try_stream! {
        let mut buffer: Vec<u8> = Vec::new();
        for await chunk in upstream {
            let chunk = chunk?;
            buffer.extend_from_slice(&chunk);
            if !chunk.contains(&b'\n') {
                continue;
            }
            while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                let line = trim_line(&buffer[..pos]);
                if !line.is_empty() {
                    yield line;
                }
                buffer.drain(..=pos);
            }
        }
        if !buffer.is_empty() {
            let line = trim_line(&buffer);
            if !line.is_empty() {
                yield line;
            }
        }
    }
}

fn trim_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}
