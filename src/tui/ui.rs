use crate::search::MatchedFile;
use crate::tui::layout::{layout_line, truncate_visible, SCROLL_BAR_WIDTH};
use crate::tui::session::{Redraw, SearchState, Session};
use crate::tui::viewport::{scrollbar, FIRST_MATCH_ROW, QUERY_ROW};
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// One row of the match region
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// File path with its match count
    Path { text: String, selected: bool },
    /// Laid-out matched line, highlight escapes included
    Line(String),
    Notice(String),
    Blank,
}

/// Rows of the match region for the current window, top to bottom.
/// May be longer than the screen when a lone open file overflows.
pub fn frame_rows(session: &Session) -> Vec<Row> {
    if session.matches.is_empty() {
        if session.query.is_empty() {
            return vec![Row::Notice(format!(
                "Ready to search {} files",
                session.candidates().len()
            ))];
        }
        return Vec::new();
    }

    let width = session.size.width;
    let max_lines = session.config.max_lines_per_file;
    let mut rows = Vec::new();

    for idx in session.window().files {
        let file = &session.matches[idx];
        rows.push(Row::Path {
            text: path_label(file),
            selected: idx == session.selected,
        });

        if file.is_open {
            for line in file.lines.iter().take(max_lines) {
                rows.extend(
                    layout_line(line, width, session.config.truncate_lines)
                        .into_iter()
                        .map(Row::Line),
                );
            }
            rows.push(Row::Blank);
        }
    }

    rows
}

/// `"{path} - N matches"`, plus `"on M lines"` when the file is open
pub fn path_label(file: &MatchedFile) -> String {
    let path: String = file
        .path
        .display()
        .to_string()
        .chars()
        .map(|c| if c.is_control() { char::REPLACEMENT_CHARACTER } else { c })
        .collect();
    let count = file.match_count();
    let mut label = format!("{} - {} {}", path, count, plural(count, "match", "matches"));
    if file.is_open {
        let lines = file.lines.len();
        label.push_str(&format!(" on {} {}", lines, plural(lines, "line", "lines")));
    }
    label
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}

fn query_color(state: SearchState) -> Color {
    match state {
        SearchState::Typing => Color::Blue,
        SearchState::Positive => Color::Green,
        SearchState::Negative => Color::Red,
    }
}

/// Columns usable for text; the last one belongs to the scrollbar
fn text_width(session: &Session) -> usize {
    session.size.width.saturating_sub(SCROLL_BAR_WIDTH)
}

/// Write the parts of the screen named by `redraw`, then flush
pub fn draw<W: Write>(out: &mut W, session: &Session, redraw: Redraw) -> io::Result<()> {
    match redraw {
        Redraw::None => return Ok(()),
        Redraw::QueryLine => {
            draw_query_line(out, session)?;
            draw_scrollbar(out, session)?;
        }
        Redraw::Matches | Redraw::Full => {
            if redraw == Redraw::Full {
                queue!(out, Clear(ClearType::All))?;
            }
            draw_query_line(out, session)?;
            draw_matches(out, session)?;
            draw_scrollbar(out, session)?;
        }
    }

    place_cursor(out, session)?;
    out.flush()
}

fn draw_query_line<W: Write>(out: &mut W, session: &Session) -> io::Result<()> {
    let (query, _) = truncate_visible(&session.query, text_width(session));
    queue!(
        out,
        MoveTo(0, row_offset(QUERY_ROW)),
        SetForegroundColor(query_color(session.state)),
        Print(query),
        ResetColor,
        Clear(ClearType::UntilNewLine)
    )
}

fn draw_matches<W: Write>(out: &mut W, session: &Session) -> io::Result<()> {
    let region = session.size.height.saturating_sub(QUERY_ROW);
    let mut rows = frame_rows(session).into_iter();
    let width = text_width(session);

    for screen_row in FIRST_MATCH_ROW..FIRST_MATCH_ROW + region {
        queue!(out, MoveTo(0, row_offset(screen_row)))?;
        match rows.next() {
            Some(Row::Path { text, selected }) => {
                let (text, _) = truncate_visible(&text, width);
                if selected {
                    queue!(out, SetForegroundColor(Color::Magenta), Print(text), ResetColor)?;
                } else {
                    queue!(out, Print(text))?;
                }
            }
            Some(Row::Line(text)) => {
                // Line numbers past two digits push the row right
                let (text, _) = truncate_visible(&text, width);
                queue!(out, Print(text), ResetColor)?;
            }
            Some(Row::Notice(text)) => {
                let (text, _) = truncate_visible(&text, width);
                queue!(out, Print(text))?;
            }
            Some(Row::Blank) | None => {}
        }
        queue!(out, Clear(ClearType::UntilNewLine))?;
    }

    Ok(())
}

fn draw_scrollbar<W: Write>(out: &mut W, session: &Session) -> io::Result<()> {
    let height = session.size.height;
    let Some(bar) = scrollbar(session.matches.len(), session.scroll_top, height) else {
        return Ok(());
    };
    let column = session.size.width.saturating_sub(SCROLL_BAR_WIDTH) as u16;

    queue!(out, SetBackgroundColor(Color::Green))?;
    for row in bar.rows().take_while(|&r| r <= height) {
        queue!(out, MoveTo(column, row_offset(row)), Print(' '))?;
    }
    queue!(out, ResetColor)
}

fn place_cursor<W: Write>(out: &mut W, session: &Session) -> io::Result<()> {
    let column = session.cursor.min(text_width(session).saturating_sub(1));
    queue!(out, MoveTo(column as u16, row_offset(QUERY_ROW)))
}

/// Shown on the query line while a search is scanning files
pub const SEARCH_MESSAGE: &str = "Searching files";
const SEARCH_MESSAGE_INTERVAL: Duration = Duration::from_millis(150);

/// Animated "Searching files..." on the query line during a search.
///
/// Redraws at most once per interval, cycling zero to three dots. The next
/// regular draw puts the query back.
pub struct SearchProgress<'a, W: Write> {
    out: &'a mut W,
    width: usize,
    interval: Duration,
    last_printed: Instant,
    dots: Option<usize>,
    error: Option<io::Error>,
}

impl<'a, W: Write> SearchProgress<'a, W> {
    pub fn new(out: &'a mut W, width: usize) -> Self {
        Self {
            out,
            width,
            interval: SEARCH_MESSAGE_INTERVAL,
            last_printed: Instant::now(),
            dots: None,
            error: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Called between files; prints the next frame once the interval passed
    pub fn tick(&mut self) {
        if self.error.is_some() || self.last_printed.elapsed() < self.interval {
            return;
        }

        let dots = match self.dots {
            Some(n) if n < 3 => n + 1,
            _ => 0,
        };
        let message = format!("{}{}", SEARCH_MESSAGE, &"..."[..dots]);
        let (message, _) = truncate_visible(&message, self.width.saturating_sub(SCROLL_BAR_WIDTH));

        let written = queue!(
            self.out,
            MoveTo(0, row_offset(QUERY_ROW)),
            ResetColor,
            Print(message),
            Clear(ClearType::UntilNewLine)
        )
        .and_then(|_| self.out.flush());
        if let Err(e) = written {
            self.error = Some(e);
        }

        self.dots = Some(dots);
        self.last_printed = Instant::now();
    }

    /// First write error hit while ticking, if any
    pub fn finish(self) -> io::Result<()> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// 1-based terminal row to a crossterm 0-based offset
fn row_offset(row: usize) -> u16 {
    row.saturating_sub(1) as u16
}
