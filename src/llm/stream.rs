//! Reassembles streamed chat-completion deltas.
//!
//! Each event payload (or raw `data: <json>` line) that decodes and carries
//! `choices[0].delta.content` contributes that text, minus any
//! `<think>`..`</think>` reasoning block. Anything else (keep-alive comments,
//! `[DONE]`, torn chunks) is skipped.

use serde::Deserialize;
use tracing::debug;

const DATA_PREFIX: &str = "data: ";
const THINK_OPEN: &str = "<think>";
const THINK_CLOSE: &str = "</think>";

#[derive(Deserialize)]
struct Chunk {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    delta: Option<Delta>,
}

#[derive(Deserialize)]
struct Delta {
    content: Option<String>,
}

/// Accumulates text from a line-oriented completion stream.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    text: String,
    /// Inside an unclosed `<think>` block.
    in_think: bool,
    /// Text seen inside the current reasoning block.
    hidden: String,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes one event payload. A leading `data: ` is stripped if present.
    pub fn push_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        let payload = line.strip_prefix(DATA_PREFIX).unwrap_or(line);

        let chunk: Chunk = match serde_json::from_str(payload) {
            Ok(chunk) => chunk,
            Err(e) => {
                debug!("Skipping undecodable stream line {:?}: {}", payload, e);
                return;
            }
        };

        let content = chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta)
            .and_then(|delta| delta.content);
        if let Some(content) = content {
            self.append(&content);
        }
    }

    /// Appends one increment, dropping reasoning blocks that may span
    /// several increments. A stray `</think>` is removed on its own.
    fn append(&mut self, mut content: &str) {
        loop {
            if self.in_think {
                match content.find(THINK_CLOSE) {
                    Some(i) => {
                        content = &content[i + THINK_CLOSE.len()..];
                        self.in_think = false;
                        self.hidden.clear();
                    }
                    None => {
                        self.hidden.push_str(content);
                        return;
                    }
                }
            } else {
                match content.find(THINK_OPEN) {
                    Some(i) => {
                        self.text.push_str(&content[..i].replace(THINK_CLOSE, ""));
                        content = &content[i + THINK_OPEN.len()..];
                        self.in_think = true;
                    }
                    None => {
                        self.text.push_str(&content.replace(THINK_CLOSE, ""));
                        return;
                    }
                }
            }
        }
    }

    /// Returns the collected text.
    pub fn finish(mut self) -> String {
        // A block that never closed was not reasoning after all.
        if self.in_think {
            self.text.push_str(&self.hidden);
        }
        self.text
    }
}
