use log::debug;
use serde_json::Value;

use crate::error::GenerationError;
use crate::schema::{parse_artifact, Artifact, ArtifactKind};

/// Accumulates streamed model text and picks out each top-level array
/// element as soon as its closing bracket arrives.
///
/// Items handed out by [`push`](Self::push) are only for progress display;
/// the collection is trusted once [`finish`](Self::finish) validates it.
#[derive(Debug, Default)]
pub struct StreamAssembler {
    buffer: String,
    scanned: usize,
    depth: usize,
    in_string: bool,
    escaped: bool,
    item_start: Option<usize>,
    array_start: Option<usize>,
    array_span: Option<(usize, usize)>,
    emitted: usize,
}

impl StreamAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return the items it completed, in order
    pub fn push(&mut self, chunk: &str) -> Vec<Value> {
        self.buffer.push_str(chunk);
        let mut items = Vec::new();

        // Only ASCII delimiters are inspected; UTF-8 continuation bytes never
        // collide with them.
        let bytes = self.buffer.as_bytes();
        for (i, &b) in bytes.iter().enumerate().skip(self.scanned) {
            if self.in_string {
                match (self.escaped, b) {
                    (true, _) => self.escaped = false,
                    (false, b'\\') => self.escaped = true,
                    (false, b'"') => self.in_string = false,
                    _ => {}
                }
                continue;
            }

            match b {
                b'"' => self.in_string = true,
                b'{' | b'[' => {
                    if self.depth == 0 && b == b'[' {
                        self.array_start = Some(i);
                    }
                    if self.depth == 1 && self.item_start.is_none() {
                        self.item_start = Some(i);
                    }
                    self.depth += 1;
                }
                b'}' | b']' => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 1 {
                        if let Some(start) = self.item_start.take() {
                            match serde_json::from_slice::<Value>(&bytes[start..=i]) {
                                Ok(item) => items.push(item),
                                Err(e) => debug!("skipping unparsable item at byte {start}: {e}"),
                            }
                        }
                    }
                    if self.depth == 0 && b == b']' {
                        if let Some(start) = self.array_start.take() {
                            let longest = self.array_span.map_or(0, |(s, e)| e - s);
                            if i - start > longest {
                                self.array_span = Some((start, i));
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        self.scanned = bytes.len();
        self.emitted += items.len();
        items
    }

    /// Number of items handed out so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Validate everything received as one collection of `kind`
    pub fn finish(self, kind: ArtifactKind) -> Result<Artifact, GenerationError> {
        parse_artifact(kind, self.array_body())
    }

    /// The longest complete top-level array, dropping whatever the model
    /// wrapped around it such as code fences or a sentence of prose
    fn array_body(&self) -> &str {
        match (self.array_span, self.array_start) {
            (Some((start, end)), _) => &self.buffer[start..=end],
            (None, Some(start)) => &self.buffer[start..],
            (None, None) => self.buffer.trim(),
        }
    }
}
