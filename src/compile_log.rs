//! Compile log — bounded buffer of what the compiler did, for `--verbose`.

use std::collections::VecDeque;
use std::time::SystemTime;

/// One progress message tied to the source line that caused it.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: SystemTime,
    pub line: usize,
    pub message: String,
}

/// Ring buffer of the most recent compiler messages.
#[derive(Debug, Clone)]
pub struct CompileLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    dropped: usize,
}

impl CompileLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            dropped: 0,
        }
    }

    /// Record a message, evicting the oldest one when full.
    pub fn record(&mut self, line: usize, message: impl Into<String>) {
        if self.capacity == 0 {
            self.dropped += 1;
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
            self.dropped += 1;
        }
        self.entries.push_back(LogEntry {
            timestamp: SystemTime::now(),
            line,
            message: message.into(),
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Messages evicted (or refused) because the buffer was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// One `line N: message` string per entry, oldest first.
    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.entries.len() + 1);
        if self.dropped > 0 {
            lines.push(format!("({} earlier messages dropped)", self.dropped));
        }
        lines.extend(
            self.entries
                .iter()
                .map(|e| format!("line {}: {}", e.line, e.message)),
        );
        lines
    }
}

impl Default for CompileLog {
    fn default() -> Self {
        Self::new(256)
    }
}
