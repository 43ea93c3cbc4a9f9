//! Incremental server-sent-events frame parser.

/// One dispatched event: the `event:` name (defaulting to `message`) and the
/// joined `data:` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Accumulates raw transport chunks and yields complete events. Chunks may
/// split lines, or even UTF-8 sequences, at arbitrary byte boundaries;
/// partial input stays buffered until its terminating newline arrives.
pub struct EventParser {
    buf: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl EventParser {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            event: None,
            data: Vec::new(),
        }
    }

    /// Feed one chunk, returning every event completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buf.extend_from_slice(chunk);
        let mut out = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches('\n').trim_end_matches('\r');
            self.line(line, &mut out);
        }
        out
    }

    fn line(&mut self, line: &str, out: &mut Vec<SseEvent>) {
        if line.is_empty() {
            // Blank line dispatches the pending event; nothing buffered means
            // nothing to dispatch.
            if self.data.is_empty() {
                self.event = None;
                return;
            }
            out.push(SseEvent {
                event: self
                    .event
                    .take()
                    .unwrap_or_else(|| "message".to_string()),
                data: self.data.join("\n"),
            });
            self.data.clear();
            return;
        }
        if line.starts_with(':') {
            // Comment line (keep-alive), ignore.
            return;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            // "id" and "retry" carry no meaning for this feed.
            _ => {}
        }
    }
}

impl Default for EventParser {
    fn default() -> Self {
        Self::new()
    }
}
