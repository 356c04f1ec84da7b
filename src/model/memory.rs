use std::collections::VecDeque;
use std::fmt;

pub const MEMORY_CAPACITY: usize = 10;
pub const PROMPT_MEMORY_LINES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEntry {
    /// Wall-clock stamp, `HH:MM`.
    pub stamp: String,
    pub text: String,
}

impl fmt::Display for MemoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.stamp, self.text)
    }
}

/// Bounded recent-history log. Pushing past capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct MemoryLog {
    entries: VecDeque<MemoryEntry>,
    capacity: usize,
}

impl Default for MemoryLog {
    fn default() -> Self {
        Self::with_capacity(MEMORY_CAPACITY)
    }
}

impl MemoryLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, text: impl Into<String>) {
        let stamp = chrono::Local::now().format("%H:%M").to_string();
        self.push(MemoryEntry {
            stamp,
            text: text.into(),
        });
    }

    pub fn push(&mut self, entry: MemoryEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemoryEntry> {
        self.entries.iter()
    }

    /// The newest `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &MemoryEntry> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }

    pub fn count_matching(&self, text: &str) -> usize {
        self.entries.iter().filter(|e| e.text == text).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_first() {
        let mut log = MemoryLog::default();
        for i in 0..13 {
            log.record(format!("event {i}"));
        }
        assert_eq!(log.len(), MEMORY_CAPACITY);
        let texts: Vec<_> = log.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts.first(), Some(&"event 3"));
        assert_eq!(texts.last(), Some(&"event 12"));
    }

    #[test]
    fn recent_returns_tail_in_order() {
        let mut log = MemoryLog::default();
        for text in ["a", "b", "c", "d"] {
            log.record(text);
        }
        let recent: Vec<_> = log
            .recent(PROMPT_MEMORY_LINES)
            .map(|e| e.text.clone())
            .collect();
        assert_eq!(recent, vec!["b", "c", "d"]);
    }

    #[test]
    fn recent_on_short_log_returns_everything() {
        let mut log = MemoryLog::default();
        log.record("only");
        assert_eq!(log.recent(3).count(), 1);
    }

    #[test]
    fn display_prefixes_stamp() {
        let entry = MemoryEntry {
            stamp: "09:30".into(),
            text: "Arrived at destination".into(),
        };
        assert_eq!(entry.to_string(), "09:30 - Arrived at destination");
    }
}
