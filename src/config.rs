//! Display configuration handed to the interactive session

use std::time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 200;
pub const DEFAULT_MAX_LINES_PER_FILE: usize = 5;

/// Settings that shape the debounce loop and the rendered frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Quiet period after the last keystroke before a search fires
    pub debounce_ms: u64,
    /// Matched lines shown under an open file
    pub max_lines_per_file: usize,
    /// Truncate long lines around the first match instead of wrapping them
    pub truncate_lines: bool,
}

impl Config {
    pub fn debounce_duration(&self) -> Duration {
        Duration::from_millis(self.debounce_ms.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            max_lines_per_file: DEFAULT_MAX_LINES_PER_FILE,
            truncate_lines: true,
        }
    }
}

/// Terminal dimensions in character cells, read once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermSize {
    pub height: usize,
    pub width: usize,
}

impl TermSize {
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }
}
