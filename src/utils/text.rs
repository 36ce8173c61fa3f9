//! Content sniffing helpers

/// Bytes inspected when deciding whether a file is text
const SNIFF_LEN: usize = 8192;

/// Check if content is likely binary
pub fn is_binary(content: &[u8]) -> bool {
    let sample = &content[..content.len().min(SNIFF_LEN)];
    if sample.is_empty() {
        return false;
    }

    // Any meaningful run of NULs means this is not text we can show
    let null_count = memchr::memchr_iter(0, sample).count();
    if null_count > sample.len() / 10 {
        return true;
    }

    let non_text_count = sample
        .iter()
        .filter(|&&b| b < 0x20 && b != b'\n' && b != b'\r' && b != b'\t' && b != 0x1b)
        .count();

    non_text_count > sample.len() / 8
}

/// First line of `content`, without its terminator
pub fn first_line(content: &[u8]) -> &[u8] {
    let end = memchr::memchr(b'\n', content).unwrap_or(content.len());
    let line = &content[..end];
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_not_binary() {
        assert!(!is_binary(b"fn main() {\n\tprintln!(\"hi\");\r\n}\n"));
        assert!(!is_binary(b""));
    }

    #[test]
    fn test_nul_heavy_is_binary() {
        let mut content = vec![0u8; 64];
        content.extend_from_slice(b"ELF");
        assert!(is_binary(&content));
    }

    #[test]
    fn test_control_heavy_is_binary() {
        let content: Vec<u8> = (1u8..8).cycle().take(100).collect();
        assert!(is_binary(&content));
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line(b"#!/bin/sh\necho hi\n"), b"#!/bin/sh");
        assert_eq!(first_line(b"#!/usr/bin/env python\r\nprint()"), b"#!/usr/bin/env python");
        assert_eq!(first_line(b"no newline"), b"no newline");
    }
}
