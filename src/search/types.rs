use std::path::PathBuf;

/// Half-open byte range of one occurrence of the query within a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

impl MatchSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A line that contained at least one match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedLine {
    /// 1-based line number
    pub line_number: u32,
    pub text: String,
    /// Non-empty, non-overlapping, ascending
    pub matches: Vec<MatchSpan>,
}

/// A candidate file with at least one matching line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedFile {
    pub path: PathBuf,
    /// Ascending by line number
    pub lines: Vec<MatchedLine>,
    pub is_open: bool,
}

impl MatchedFile {
    pub fn new(path: PathBuf, mut lines: Vec<MatchedLine>) -> Self {
        lines.sort_by_key(|l| l.line_number);
        Self {
            path,
            lines,
            is_open: false,
        }
    }

    /// Total number of match spans across all lines
    pub fn match_count(&self) -> usize {
        self.lines.iter().map(|l| l.matches.len()).sum()
    }

    /// Terminal rows this file occupies: the path line alone when closed,
    /// otherwise path line + shown lines + one blank separator.
    pub fn rendered_rows(&self, max_lines_per_file: usize) -> usize {
        if self.is_open {
            self.lines.len().min(max_lines_per_file) + 2
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: u32, spans: &[(usize, usize)]) -> MatchedLine {
        MatchedLine {
            line_number: n,
            text: "x".repeat(20),
            matches: spans.iter().map(|&(s, e)| MatchSpan::new(s, e)).collect(),
        }
    }

    #[test]
    fn test_lines_sorted_on_construction() {
        let file = MatchedFile::new(
            PathBuf::from("a.txt"),
            vec![line(9, &[(0, 1)]), line(2, &[(0, 1)]), line(5, &[(0, 1)])],
        );
        let numbers: Vec<u32> = file.lines.iter().map(|l| l.line_number).collect();
        assert_eq!(numbers, vec![2, 5, 9]);
    }

    #[test]
    fn test_rendered_rows() {
        let mut file = MatchedFile::new(
            PathBuf::from("a.txt"),
            (1..=7).map(|n| line(n, &[(0, 1)])).collect(),
        );
        assert_eq!(file.rendered_rows(5), 1);

        file.is_open = true;
        assert_eq!(file.rendered_rows(5), 7);
        assert_eq!(file.rendered_rows(10), 9);
    }

    #[test]
    fn test_match_count() {
        let file = MatchedFile::new(
            PathBuf::from("a.txt"),
            vec![line(1, &[(0, 1), (3, 4)]), line(2, &[(5, 6)])],
        );
        assert_eq!(file.match_count(), 3);
    }
}
