//! Text layout for matched lines.
//!
//! A matched line is turned into one or more display rows that fit the
//! terminal width. Matches are wrapped in highlight markers which are real
//! SGR escapes, so every width computation strips them first.
//!
//! Two policies:
//! - truncate: keep a single row centred on the first match, growing context
//!   alternately left and right, ending in an ellipsis
//! - whole lines: wrap at word boundaries onto as many rows as needed

use crate::search::MatchedLine;
use unicode_width::UnicodeWidthChar;

/// Indent between the left border and the line number
pub const INDENT: &str = "   ";
/// Room reserved for the line number in front of the text
pub const LINE_NO_BUFFER: &str = "   ";
pub const SCROLL_BAR_WIDTH: usize = 1;
pub const ELLIPSIS: &str = "...";
pub const HIGHLIGHT_START: &str = "\x1b[33m";
pub const HIGHLIGHT_END: &str = "\x1b[0m";

/// Columns available for line text at terminal width `width`
pub fn room_for_text(width: usize) -> usize {
    width.saturating_sub(1 + INDENT.len() + LINE_NO_BUFFER.len() + SCROLL_BAR_WIDTH)
}

/// Display width of `s`, ignoring highlight markers
pub fn visible_width(s: &str) -> usize {
    let mut width = 0;
    let mut rest = s;
    while let Some(c) = rest.chars().next() {
        if let Some(marker) = marker_at(rest) {
            rest = &rest[marker.len()..];
            continue;
        }
        width += c.width().unwrap_or(0);
        rest = &rest[c.len_utf8()..];
    }
    width
}

fn marker_at(s: &str) -> Option<&'static str> {
    if s.starts_with(HIGHLIGHT_START) {
        Some(HIGHLIGHT_START)
    } else if s.starts_with(HIGHLIGHT_END) {
        Some(HIGHLIGHT_END)
    } else {
        None
    }
}

/// Longest prefix of `s` whose visible width is at most `max`.
/// Markers are copied through without counting. Returns the prefix and its
/// width.
pub fn truncate_visible(s: &str, max: usize) -> (String, usize) {
    let mut out = String::with_capacity(s.len());
    let mut width = 0;
    let mut rest = s;
    while let Some(c) = rest.chars().next() {
        if let Some(marker) = marker_at(rest) {
            out.push_str(marker);
            rest = &rest[marker.len()..];
            continue;
        }
        let w = c.width().unwrap_or(0);
        if width + w > max {
            break;
        }
        out.push(c);
        width += w;
        rest = &rest[c.len_utf8()..];
    }
    (out, width)
}

/// Line text with markers around every span. Tabs become spaces and other
/// control characters are replaced so file content cannot emit escapes.
pub fn mark_matches(line: &MatchedLine) -> String {
    let mut out = String::with_capacity(line.text.len() + line.matches.len() * 9);
    let mut spans = line.matches.iter().peekable();

    for (idx, c) in line.text.char_indices() {
        if spans.peek().is_some_and(|s| s.start == idx) {
            out.push_str(HIGHLIGHT_START);
        }
        out.push(match c {
            '\t' => ' ',
            c if c.is_control() => char::REPLACEMENT_CHARACTER,
            c => c,
        });
        if spans.peek().is_some_and(|s| s.end == idx + c.len_utf8()) {
            out.push_str(HIGHLIGHT_END);
            spans.next();
        }
    }

    out
}

/// Display rows for `line` without indent or line number
pub fn layout_content(line: &MatchedLine, room: usize, truncate: bool) -> Vec<String> {
    let marked = mark_matches(line);
    let words: Vec<&str> = marked.split(' ').collect();

    if truncate {
        vec![truncate_around_match(&words, room)]
    } else {
        wrap_words(&words, room)
    }
}

/// Rows ready to print: indent, line number on the first row, text, and a
/// colour reset so a cut highlight never bleeds into the next row.
pub fn layout_line(line: &MatchedLine, width: usize, truncate: bool) -> Vec<String> {
    let room = room_for_text(width);
    let number_width = LINE_NO_BUFFER.len() - 1;
    let mut highlighted = false;

    layout_content(line, room, truncate)
        .into_iter()
        .enumerate()
        .map(|(i, content)| {
            let mut row = String::from(INDENT);
            if i == 0 {
                row.push_str(&format!("{:<number_width$} ", line.line_number));
            } else {
                row.push_str(LINE_NO_BUFFER);
            }
            if highlighted {
                row.push_str(HIGHLIGHT_START);
            }
            highlighted = ends_highlighted(&content, highlighted);
            row.push_str(&content);
            row.push_str(HIGHLIGHT_END);
            row
        })
        .collect()
}

/// Whether a highlight is still open at the end of `content`
fn ends_highlighted(content: &str, open_at_start: bool) -> bool {
    match (content.rfind(HIGHLIGHT_START), content.rfind(HIGHLIGHT_END)) {
        (Some(start), Some(end)) => start > end,
        (Some(_), None) => true,
        (None, Some(_)) => false,
        (None, None) => open_at_start,
    }
}

fn truncate_around_match(words: &[&str], room: usize) -> String {
    let widths: Vec<usize> = words.iter().map(|w| visible_width(w)).collect();
    let total = widths.iter().sum::<usize>() + words.len().saturating_sub(1);
    if total <= room {
        return words.join(" ");
    }

    let anchor = words
        .iter()
        .position(|w| w.contains(HIGHLIGHT_START))
        .unwrap_or(0);

    // The matched word alone does not fit: cut it and show as much of the
    // ellipsis as there is room for
    if widths[anchor] + ELLIPSIS.len() > room {
        let (mut out, used) = truncate_visible(words[anchor], room.saturating_sub(ELLIPSIS.len()));
        let dots = ELLIPSIS.len().min(room - used);
        close_highlight(&mut out);
        out.push_str(&ELLIPSIS[..dots]);
        return out;
    }

    let mut left = anchor;
    let mut right = anchor + 1;
    let mut used = widths[anchor] + ELLIPSIS.len();
    let mut left_turn = true;

    loop {
        let next = if left_turn {
            left.checked_sub(1)
        } else {
            (right < words.len()).then_some(right)
        };

        let Some(idx) = next else {
            if left == 0 && right == words.len() {
                break;
            }
            left_turn = !left_turn;
            continue;
        };

        let cost = 1 + widths[idx];
        if used + cost > room {
            break;
        }
        used += cost;
        if left_turn {
            left -= 1;
        } else {
            right += 1;
        }
        left_turn = !left_turn;
    }

    let mut out = words[left..right].join(" ").trim_matches(' ').to_string();
    close_highlight(&mut out);
    out.push_str(ELLIPSIS);
    out
}

/// End a highlight left open by a cut so the ellipsis is not coloured
fn close_highlight(out: &mut String) {
    if ends_highlighted(out, false) {
        out.push_str(HIGHLIGHT_END);
    }
}

fn wrap_words(words: &[&str], room: usize) -> Vec<String> {
    if room == 0 {
        return vec![String::new()];
    }

    let mut rows = Vec::new();
    let mut row = String::new();
    let mut row_width = 0;
    let mut row_started = false;

    for word in words {
        let width = visible_width(word);

        if row_started && row_width + 1 + width > room {
            rows.push(std::mem::take(&mut row));
            row_width = 0;
            row_started = false;
        }

        if row_started {
            row.push(' ');
            row.push_str(word);
            row_width += 1 + width;
            continue;
        }

        if width <= room {
            row.push_str(word);
            row_width = width;
        } else {
            let mut chunks = split_visible(word, room);
            let last = chunks.pop().unwrap_or_default();
            rows.extend(chunks);
            row_width = visible_width(&last);
            row = last;
        }
        row_started = true;
    }

    rows.push(row);
    rows
}

/// Split a word into chunks of at most `room` visible columns
fn split_visible(word: &str, room: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut chunk = String::new();
    let mut width = 0;
    let mut rest = word;

    while let Some(c) = rest.chars().next() {
        if let Some(marker) = marker_at(rest) {
            chunk.push_str(marker);
            rest = &rest[marker.len()..];
            continue;
        }
        rest = &rest[c.len_utf8()..];

        let w = c.width().unwrap_or(0);
        if w > room {
            // A double-width glyph cannot be shown on a single-column row
            continue;
        }
        if width + w > room {
            chunks.push(std::mem::take(&mut chunk));
            width = 0;
        }
        chunk.push(c);
        width += w;
    }

    chunks.push(chunk);
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{LineMatcher, MatchSpan};

    fn matched(text: &str, query: &str) -> MatchedLine {
        LineMatcher::new(query)
            .unwrap()
            .match_text(text)
            .into_iter()
            .next()
            .expect("query should match")
    }

    fn strip(s: &str) -> String {
        s.replace(HIGHLIGHT_START, "").replace(HIGHLIGHT_END, "")
    }

    #[test]
    fn test_cut_match_closes_highlight_before_ellipsis() {
        let line = matched("foobarbaz qux", "foobarbaz");
        assert_eq!(
            layout_content(&line, 6, true),
            vec![format!("{HIGHLIGHT_START}foo{HIGHLIGHT_END}...")]
        );
    }

    #[test]
    fn test_match_spanning_words_closes_before_ellipsis() {
        let line = matched("foo bar baz", "foo bar");
        assert_eq!(
            layout_content(&line, 9, true),
            vec![format!("{HIGHLIGHT_START}foo{HIGHLIGHT_END}...")]
        );
    }

    #[test]
    fn test_room_for_text() {
        assert_eq!(room_for_text(80), 72);
        assert_eq!(room_for_text(8), 0);
        assert_eq!(room_for_text(3), 0);
    }

    #[test]
    fn test_visible_width_ignores_markers() {
        let s = format!("a{HIGHLIGHT_START}foo{HIGHLIGHT_END}b");
        assert_eq!(visible_width(&s), 5);
        assert_eq!(visible_width("日本"), 4);
    }

    #[test]
    fn test_mark_matches_adjacent_spans() {
        let line = matched("foofoo", "foo");
        assert_eq!(
            mark_matches(&line),
            format!("{HIGHLIGHT_START}foo{HIGHLIGHT_END}{HIGHLIGHT_START}foo{HIGHLIGHT_END}")
        );
    }

    #[test]
    fn test_mark_matches_neutralizes_control_chars() {
        let line = MatchedLine {
            line_number: 1,
            text: "a\tb\x1bc".to_string(),
            matches: vec![MatchSpan::new(0, 1)],
        };
        let marked = mark_matches(&line);
        assert_eq!(strip(&marked), "a b\u{FFFD}c");
        assert_eq!(marked.matches('\x1b').count(), 2);
    }

    #[test]
    fn test_short_line_fits_whole() {
        let line = matched("let foo = bar;", "foo");
        let rows = layout_content(&line, 72, true);
        assert_eq!(rows.len(), 1);
        assert_eq!(strip(&rows[0]), "let foo = bar;");
    }

    #[test]
    fn test_truncate_grows_context_left_first() {
        let line = matched("aa bb cc foo dd ee ff", "foo");
        // foo(3) + ...(3) = 6; " cc" -> 9; " dd" -> 12; " bb" -> 15
        let rows = layout_content(&line, 14, true);
        assert_eq!(strip(&rows[0]), "cc foo dd...");

        let rows = layout_content(&line, 15, true);
        assert_eq!(strip(&rows[0]), "bb cc foo dd...");
    }

    #[test]
    fn test_truncate_hard_cuts_long_match_word() {
        let line = matched("xxxxxxxxxxfooxxxxxxxxxx rest", "foo");
        let rows = layout_content(&line, 10, true);
        assert_eq!(strip(&rows[0]), "xxxxxxx...");
        assert_eq!(visible_width(&rows[0]), 10);
    }

    #[test]
    fn test_truncate_degrades_on_tiny_room() {
        let line = matched("some foo text that is long", "foo");
        assert_eq!(strip(&layout_content(&line, 2, true)[0]), "..");
        assert_eq!(strip(&layout_content(&line, 0, true)[0]), "");
    }

    #[test]
    fn test_truncate_trims_stray_spaces() {
        let line = matched("  foo  bar baz qux quux", "foo");
        let rows = layout_content(&line, 10, true);
        let text = strip(&rows[0]);
        assert!(!text.starts_with(' '));
        assert!(!text.contains(" ..."));
        assert!(visible_width(&rows[0]) <= 10);
    }

    #[test]
    fn test_wrap_breaks_at_words() {
        let line = matched("one two three foo four five", "foo");
        let rows = layout_content(&line, 10, false);
        let rows: Vec<String> = rows.iter().map(|r| strip(r)).collect();
        assert_eq!(rows, vec!["one two", "three foo", "four five"]);
    }

    #[test]
    fn test_wrap_splits_overlong_word() {
        let line = matched("abcdefghijfoo end", "foo");
        let rows = layout_content(&line, 5, false);
        let rows: Vec<String> = rows.iter().map(|r| strip(r)).collect();
        assert_eq!(rows, vec!["abcde", "fghij", "foo", "end"]);
    }

    #[test]
    fn test_wrap_zero_room() {
        let line = matched("foo", "foo");
        assert_eq!(layout_content(&line, 0, false), vec![String::new()]);
    }

    #[test]
    fn test_rows_never_exceed_room() {
        let texts = [
            "fn main() { let foo = compute(foo_bar, baz); println!(\"{}\", foo); }",
            "foo",
            "   leading   spaces foo   and   gaps   ",
            "averyveryveryverylongwordwithfooinsideitthatneverends and more",
            "日本語 foo テキスト 幅",
            "foo foo foo foo foo foo foo foo foo foo foo foo foo foo foo",
        ];

        for text in texts {
            let line = matched(text, "foo");
            for width in 8..100 {
                let room = room_for_text(width);
                for truncate in [true, false] {
                    for row in layout_content(&line, room, truncate) {
                        assert!(
                            visible_width(&row) <= room,
                            "row {row:?} wider than {room} (truncate={truncate})"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_layout_line_prefixes() {
        let line = MatchedLine {
            line_number: 7,
            ..matched("one two three foo four five", "foo")
        };
        // width 18 -> room 10
        let rows = layout_line(&line, 18, false);
        assert_eq!(rows.len(), 3);
        assert!(rows[0].starts_with("   7  one two"));
        assert!(rows[1].starts_with("      three "));
        assert!(rows.iter().all(|r| r.ends_with(HIGHLIGHT_END)));
    }

    #[test]
    fn test_layout_line_reopens_split_highlight() {
        let line = matched("xx foo bar yy", "foo bar");
        // room 5: "xx", "foo", "bar", "yy" on separate rows
        let rows = layout_line(&line, 13, false);
        assert!(rows[2].contains(&format!("{HIGHLIGHT_START}bar")));
    }
}
