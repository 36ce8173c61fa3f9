//! Utility functions shared by the search and UI layers.
//!
//! - [`files`] - Candidate file discovery (ignore globs, shebang filter)
//! - [`progress`] - Startup spinner, no-op without the `progress` feature
//! - [`text`] - Binary sniffing and first-line extraction

pub mod files;
pub mod progress;
pub mod text;

pub use files::{collect_candidates, WalkOptions, DEFAULT_IGNORE_PATTERNS};
pub use text::{first_line, is_binary};
