//! Per-line query matching over the candidate files

use crate::search::types::{MatchSpan, MatchedFile, MatchedLine};
use crate::utils::is_binary;
use memchr::memmem;
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Matches a single query against lines of text.
///
/// A line is considered only if it contains the query as a literal
/// substring; the query is then run as a regex over that line to find every
/// span. Lines where the regex yields no non-empty span are dropped.
pub struct LineMatcher {
    finder: memmem::Finder<'static>,
    regex: Regex,
}

impl LineMatcher {
    /// Compile `query`. Fails when the query is not a valid pattern.
    pub fn new(query: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(query)?;
        Ok(Self {
            finder: memmem::Finder::new(query.as_bytes()).into_owned(),
            regex,
        })
    }

    /// Find matching lines in `text`
    pub fn match_text(&self, text: &str) -> Vec<MatchedLine> {
        let mut lines = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            if self.finder.find(line.as_bytes()).is_none() {
                continue;
            }

            let matches: Vec<MatchSpan> = self
                .regex
                .find_iter(line)
                .filter(|m| !m.is_empty())
                .map(|m| MatchSpan::new(m.start(), m.end()))
                .collect();

            if matches.is_empty() {
                continue;
            }

            lines.push(MatchedLine {
                line_number: (idx + 1) as u32,
                text: line.to_string(),
                matches,
            });
        }

        lines
    }

    /// Read `path` and find matching lines. Binary files yield no lines.
    pub fn match_file(&self, path: &Path) -> io::Result<Vec<MatchedLine>> {
        let content = fs::read(path)?;
        if is_binary(&content) {
            return Ok(Vec::new());
        }
        Ok(self.match_text(&String::from_utf8_lossy(&content)))
    }
}

/// Run `query` over every candidate, keeping candidate order.
///
/// An empty query matches nothing. An invalid pattern is logged and treated
/// as zero matches. Files that cannot be read are skipped.
pub fn search_files(candidates: &[PathBuf], query: &str) -> Vec<MatchedFile> {
    search_files_with(candidates, query, || {})
}

/// Like [`search_files`], calling `on_file` before each candidate is scanned
pub fn search_files_with<F>(candidates: &[PathBuf], query: &str, mut on_file: F) -> Vec<MatchedFile>
where
    F: FnMut(),
{
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = match LineMatcher::new(query) {
        Ok(m) => m,
        Err(e) => {
            warn!(query, error = %e, "query is not a valid pattern");
            return Vec::new();
        }
    };

    let mut files = Vec::new();
    for path in candidates {
        on_file();
        match matcher.match_file(path) {
            Ok(lines) if !lines.is_empty() => files.push(MatchedFile::new(path.clone(), lines)),
            Ok(_) => {}
            Err(e) => debug!(path = %path.display(), error = %e, "skipping unreadable file"),
        }
    }

    debug!(query, files = files.len(), "search complete");
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(line: &MatchedLine) -> Vec<(usize, usize)> {
        line.matches.iter().map(|m| (m.start, m.end)).collect()
    }

    #[test]
    fn test_match_text_records_every_span() {
        let matcher = LineMatcher::new("foo").unwrap();
        let lines = matcher.match_text("nofoo\nbar\nfoofoo\n");

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line_number, 1);
        assert_eq!(spans(&lines[0]), vec![(2, 5)]);
        assert_eq!(lines[1].line_number, 3);
        assert_eq!(spans(&lines[1]), vec![(0, 3), (3, 6)]);
    }

    #[test]
    fn test_literal_prefilter_gates_regex() {
        // "a.c" as a regex would match "abc", but the line must contain the
        // literal query first.
        let matcher = LineMatcher::new("a.c").unwrap();
        assert!(matcher.match_text("abc").is_empty());

        let lines = matcher.match_text("a.c and abc");
        assert_eq!(spans(&lines[0]), vec![(0, 3), (8, 11)]);
    }

    #[test]
    fn test_empty_spans_dropped() {
        // Contains the literal "x*" but every non-empty regex match is an
        // "x" run; a line of just "*" contains no literal "x*".
        let matcher = LineMatcher::new("x*").unwrap();
        let lines = matcher.match_text("ax*b");
        assert_eq!(spans(&lines[0]), vec![(1, 2)]);
    }

    #[test]
    fn test_anchored_pattern_without_regex_match_is_dropped() {
        let matcher = LineMatcher::new("^foo").unwrap();
        assert!(matcher.match_text("x^foo").is_empty());
    }

    #[test]
    fn test_crlf_lines() {
        let matcher = LineMatcher::new("end").unwrap();
        let lines = matcher.match_text("the end\r\nstart\r\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "the end");
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        assert!(LineMatcher::new("foo(").is_err());
    }

    #[test]
    fn test_search_files_empty_query() {
        assert!(search_files(&[PathBuf::from("does-not-matter")], "").is_empty());
    }

    #[test]
    fn test_search_files_invalid_pattern_matches_nothing() {
        assert!(search_files(&[PathBuf::from("does-not-matter")], "[").is_empty());
    }

    #[test]
    fn test_search_files_skips_missing() {
        let files = search_files(&[PathBuf::from("/nonexistent/dgrep/file.txt")], "foo");
        assert!(files.is_empty());
    }

    #[test]
    fn test_search_files_with_calls_hook_per_candidate() {
        let candidates = vec![
            PathBuf::from("/nonexistent/dgrep/a.txt"),
            PathBuf::from("/nonexistent/dgrep/b.txt"),
            PathBuf::from("/nonexistent/dgrep/c.txt"),
        ];

        let mut calls = 0;
        search_files_with(&candidates, "foo", || calls += 1);
        assert_eq!(calls, 3);

        let mut calls = 0;
        search_files_with(&candidates, "", || calls += 1);
        assert_eq!(calls, 0);
    }
}
