//! Incremental decoder for `text/event-stream` bytes.
//!
//! Frames arrive as `event: <name>\ndata: <json>\n\n` but chunk boundaries
//! fall anywhere, so the decoder buffers a partial line across pushes.
//! Multi-line `data:` fields are joined with `\n`, comment lines (leading
//! `:`) and unknown fields are ignored.

/// One decoded event frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Event name from the `event:` field, if any.
    pub event: Option<String>,
    /// Payload from the `data:` field(s).
    pub data: String,
}

#[derive(Debug, Default)]
struct FrameBuilder {
    event: Option<String>,
    data_lines: Vec<String>,
}

impl FrameBuilder {
    fn has_data(&self) -> bool {
        !self.data_lines.is_empty()
    }

    fn build(&mut self) -> SseFrame {
        let frame = SseFrame {
            event: self.event.take(),
            data: self.data_lines.join("\n"),
        };
        self.data_lines.clear();
        frame
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            // Frame boundary.
            return self.has_data().then(|| self.build());
        }
        if line.starts_with(':') {
            return None;
        }
        if let Some((field, value)) = parse_field(line) {
            match field {
                "data" => self.data_lines.push(value.to_string()),
                "event" => self.event = Some(value.to_string()),
                _ => {}
            }
        }
        None
    }
}

/// Split `field: value`, stripping the single optional space after the colon.
fn parse_field(line: &str) -> Option<(&str, &str)> {
    let colon = line.find(':')?;
    let field = &line[..colon];
    let value = line[colon + 1..].strip_prefix(' ').unwrap_or(&line[colon + 1..]);
    Some((field, value))
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    line_buffer: String,
    builder: FrameBuilder,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes; returns every frame completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        let text = String::from_utf8_lossy(chunk);
        let mut frames = Vec::new();

        for ch in text.chars() {
            if ch == '\n' {
                let line = std::mem::take(&mut self.line_buffer);
                let line = line.strip_suffix('\r').unwrap_or(&line);
                if let Some(frame) = self.builder.process_line(line) {
                    frames.push(frame);
                }
            } else {
                self.line_buffer.push(ch);
            }
        }

        frames
    }
}
