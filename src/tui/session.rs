use crate::config::{Config, TermSize};
use crate::search::{search_files_with, MatchedFile};
use crate::tui::viewport::{select_window, Window, FIRST_MATCH_ROW};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Visual feedback for the query line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// Query edited since the last search
    Typing,
    /// Last search found matches
    Positive,
    /// Last search found nothing
    Negative,
}

/// A single-byte input command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Insert(u8),
    DeleteForward,
    DeleteBackward,
    CursorForward,
    CursorBackward,
    SelectNext,
    SelectPrev,
    ToggleOpen,
    Quit,
}

impl Command {
    /// Decode a raw input byte; unrecognized bytes yield `None`
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x20..=0x7e => Some(Command::Insert(byte)),
            0x00 => Some(Command::ToggleOpen),          // Ctrl+Space
            0x02 => Some(Command::CursorBackward),      // Ctrl+B
            0x03 | 0x11 => Some(Command::Quit),         // Ctrl+C, Ctrl+Q
            0x04 => Some(Command::DeleteForward),       // Ctrl+D
            0x06 => Some(Command::CursorForward),       // Ctrl+F
            0x08 | 0x7f => Some(Command::DeleteBackward), // Ctrl+H, Backspace
            0x0a => Some(Command::SelectNext),          // Ctrl+J
            0x0b => Some(Command::SelectPrev),          // Ctrl+K
            _ => None,
        }
    }
}

/// How much of the screen an event invalidated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redraw {
    None,
    QueryLine,
    Matches,
    Full,
}

/// Interactive search session state
pub struct Session {
    pub query: String,
    /// Byte index into `query`; always a valid insertion point
    pub cursor: usize,
    pub state: SearchState,
    candidates: Vec<PathBuf>,
    pub matches: Vec<MatchedFile>,
    pub selected: usize,
    /// Indices into `matches` in the order they were opened
    pub open_history: Vec<usize>,
    /// First closed file eligible for the top of the closed region
    pub scroll_top: usize,
    /// 1-based terminal row of the selection
    pub cursor_row: usize,
    pub config: Config,
    pub size: TermSize,
}

impl Session {
    pub fn new(candidates: Vec<PathBuf>, config: Config, size: TermSize) -> Self {
        Self {
            query: String::new(),
            cursor: 0,
            state: SearchState::Typing,
            candidates,
            matches: Vec::new(),
            selected: 0,
            open_history: Vec::new(),
            scroll_top: 0,
            cursor_row: FIRST_MATCH_ROW,
            config,
            size,
        }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Apply one input command
    pub fn apply(&mut self, command: Command) -> Redraw {
        match command {
            Command::Insert(byte) => {
                self.query.insert(self.cursor, byte as char);
                self.cursor += 1;
                self.state = SearchState::Typing;
                Redraw::QueryLine
            }
            Command::DeleteForward => {
                if self.cursor >= self.query.len() {
                    return Redraw::None;
                }
                self.query.remove(self.cursor);
                self.state = SearchState::Typing;
                Redraw::QueryLine
            }
            Command::DeleteBackward => {
                if self.cursor == 0 {
                    return Redraw::None;
                }
                self.cursor -= 1;
                self.query.remove(self.cursor);
                self.state = SearchState::Typing;
                Redraw::QueryLine
            }
            Command::CursorForward => {
                if self.cursor >= self.query.len() {
                    return Redraw::None;
                }
                self.cursor += 1;
                Redraw::QueryLine
            }
            Command::CursorBackward => {
                if self.cursor == 0 {
                    return Redraw::None;
                }
                self.cursor -= 1;
                Redraw::QueryLine
            }
            Command::SelectNext => self.select_next(),
            Command::SelectPrev => self.select_prev(),
            Command::ToggleOpen => self.toggle_selected(),
            Command::Quit => Redraw::None,
        }
    }

    /// Move the selection down, scrolling when the cursor is on the last row
    pub fn select_next(&mut self) -> Redraw {
        if self.selected + 1 >= self.matches.len() {
            return Redraw::None;
        }
        self.selected += 1;
        if self.cursor_row >= self.size.height {
            self.scroll_top += 1;
        } else {
            self.cursor_row += 1;
        }
        Redraw::Matches
    }

    /// Move the selection up, scrolling when the cursor is on the first row
    pub fn select_prev(&mut self) -> Redraw {
        if self.selected == 0 {
            return Redraw::None;
        }
        self.selected -= 1;
        if self.cursor_row <= FIRST_MATCH_ROW {
            self.scroll_top = self.scroll_top.saturating_sub(1);
        } else {
            self.cursor_row -= 1;
        }
        Redraw::Matches
    }

    /// Expand or collapse the selected file
    pub fn toggle_selected(&mut self) -> Redraw {
        let idx = self.selected;
        let Some(file) = self.matches.get_mut(idx) else {
            return Redraw::None;
        };

        file.is_open = !file.is_open;
        if file.is_open {
            self.open_history.push(idx);
        } else {
            self.open_history.retain(|&i| i != idx);
        }
        Redraw::Matches
    }

    /// Search the candidates with the current query.
    ///
    /// An empty query runs nothing: results are cleared and the query line
    /// goes back to the typing colour.
    pub fn run_search(&mut self) -> Redraw {
        self.run_search_with(|| {})
    }

    /// [`Session::run_search`], calling `on_file` before each candidate
    pub fn run_search_with<F: FnMut()>(&mut self, on_file: F) -> Redraw {
        if self.query.is_empty() {
            self.matches.clear();
            self.open_history.clear();
            self.state = SearchState::Typing;
            self.reset_view();
            return Redraw::Full;
        }

        let matches = search_files_with(&self.candidates, &self.query, on_file);
        debug!(query = %self.query, files = matches.len(), "search fired");
        self.replace_matches(matches);
        Redraw::Full
    }

    /// Install a fresh result set, keeping files open by path
    pub fn replace_matches(&mut self, mut matches: Vec<MatchedFile>) {
        let open_paths: Vec<&Path> = self
            .open_history
            .iter()
            .filter_map(|&i| self.matches.get(i))
            .map(|f| f.path.as_path())
            .collect();

        let reopened: Vec<usize> = {
            let by_path: HashMap<&Path, usize> = matches
                .iter()
                .enumerate()
                .map(|(i, f)| (f.path.as_path(), i))
                .collect();
            open_paths
                .iter()
                .filter_map(|p| by_path.get(p).copied())
                .collect()
        };

        for &i in &reopened {
            matches[i].is_open = true;
        }

        self.matches = matches;
        self.open_history = reopened;
        self.state = if self.matches.is_empty() {
            SearchState::Negative
        } else {
            SearchState::Positive
        };
        self.reset_view();
    }

    fn reset_view(&mut self) {
        self.selected = 0;
        self.scroll_top = 0;
        self.cursor_row = FIRST_MATCH_ROW;
    }

    /// Files visible for the current scroll position
    pub fn window(&self) -> Window {
        select_window(
            &self.matches,
            &self.open_history,
            self.scroll_top,
            self.size.height,
            self.config.max_lines_per_file,
        )
    }
}
