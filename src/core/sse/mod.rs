//! Server-sent-event framing for the upstream synthesis stream.

mod event;
mod lines;

pub use event::{DONE_SENTINEL, SseEvent, audio_payload, classify};
pub use lines::event_lines;
