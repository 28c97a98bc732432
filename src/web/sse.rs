//! Server-Sent Event frames written to chat clients.

use bytes::Bytes;
use serde_json::json;

pub const CONTENT_TYPE: &str = "text/event-stream";

/// `data: {"response": "<delta>"}`
pub fn delta_frame(delta: &str) -> Bytes {
    Bytes::from(format!("data: {}\n\n", json!({ "response": delta })))
}

/// Terminates a successful stream.
pub fn done_frame() -> Bytes {
    Bytes::from_static(b"data: [DONE]\n\n")
}

/// In-band failure once the status line is already on the wire.
pub fn error_frame(message: &str) -> Bytes {
    Bytes::from(format!(
        "event: error\ndata: {}\n\n",
        json!({ "error": message })
    ))
}
