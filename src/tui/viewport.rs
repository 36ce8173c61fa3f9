//! Viewport windowing: which matched files are visible this frame.
//!
//! Open files are placed first, most recently opened first, so the file the
//! user just expanded is never pushed off screen by older ones. The rows left
//! over are filled with closed files starting at the scroll offset. The
//! chosen indices are then shown in file order.

use crate::search::MatchedFile;

/// Terminal row (1-based) of the query line
pub const QUERY_ROW: usize = 1;
/// Terminal row (1-based) of the first match row
pub const FIRST_MATCH_ROW: usize = 2;

/// Files selected for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    /// Indices into the matched files, ascending
    pub files: Vec<usize>,
    /// Rows left after placing the files; negative when a lone open file
    /// overflows the screen
    pub remaining_rows: isize,
}

/// Position of the scrollbar thumb in 1-based terminal rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scrollbar {
    /// Rows above the thumb
    pub start: usize,
    pub height: usize,
}

impl Scrollbar {
    /// 1-based terminal rows covered by the thumb
    pub fn rows(&self) -> std::ops::RangeInclusive<usize> {
        self.start + 1..=self.start + self.height
    }
}

/// Choose the files visible in a terminal of `height` rows.
pub fn select_window(
    files: &[MatchedFile],
    open_history: &[usize],
    scroll_top: usize,
    height: usize,
    max_lines_per_file: usize,
) -> Window {
    let mut budget = height.saturating_sub(1) as isize;
    let mut chosen = Vec::new();

    for &idx in open_history.iter().rev() {
        let Some(file) = files.get(idx) else {
            continue;
        };
        let rows = file.rendered_rows(max_lines_per_file) as isize;
        if rows <= budget {
            chosen.push(idx);
            budget -= rows;
        } else {
            // A lone open file is shown even when it overflows
            if open_history.len() == 1 {
                chosen.push(idx);
                budget -= rows;
            }
            break;
        }
    }

    let bottom = (scroll_top + height.saturating_sub(1)).min(files.len());
    for idx in scroll_top..bottom {
        if budget <= 0 {
            break;
        }
        if !files[idx].is_open {
            chosen.push(idx);
            budget -= 1;
        }
    }

    chosen.sort_unstable();
    Window {
        files: chosen,
        remaining_rows: budget,
    }
}

/// Scrollbar geometry, or `None` when every file fits on one screen
pub fn scrollbar(total: usize, scroll_top: usize, height: usize) -> Option<Scrollbar> {
    if total == 0 || total < height {
        return None;
    }

    let fraction_shown = height as f64 / total as f64;
    let bar_height = (fraction_shown * height as f64).round() as usize;
    let start = ((scroll_top as f64 / total as f64) * height as f64).floor() as usize;

    Some(Scrollbar {
        start,
        height: bar_height,
    })
}
