//! Query matching over the candidate file set

pub mod matcher;
pub mod types;

pub use matcher::{search_files, search_files_with, LineMatcher};
pub use types::{MatchSpan, MatchedFile, MatchedLine};
