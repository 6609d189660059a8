// src/net/response.rs

use serde::{Deserialize, Serialize};

use crate::errors::{JunknetError, Result};
use crate::types::OutputStream;

/// A frame streamed back by a daemon while it runs a job.
///
/// Any number of `Output` frames, interleaved across both streams, are
/// followed by exactly one `Exit` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Response {
    Output { stream: OutputStream, data: String },
    Exit { status: i32 },
}

impl Response {
    /// Serialize as a single JSON line, including the trailing newline.
    pub fn to_line(&self) -> Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// Parse one response frame.
pub fn parse_response(line: &str) -> Result<Response> {
    serde_json::from_str(line.trim_end())
        .map_err(|e| JunknetError::Protocol(format!("malformed daemon frame: {e}")))
}
