//! # dgrep - Interactive Debounced Grep
//!
//! dgrep is a terminal search tool that re-runs a regex search over a fixed
//! set of files each time the user stops typing, and shows the matching files
//! in a scrollable list whose entries expand to show highlighted lines.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`config`] - Display settings handed to the session
//! - [`search`] - Line matching over candidate files
//! - [`tui`] - Debounced input loop, session state, windowing, text layout and drawing
//! - [`utils`] - File enumeration, binary detection, startup progress
//!
//! ## Quick Start
//!
//! ```ignore
//! use dgrep::config::{Config, TermSize};
//! use dgrep::tui::session::Session;
//! use dgrep::utils::{collect_candidates, WalkOptions};
//!
//! let options = WalkOptions {
//!     dirs: vec![".".into()],
//!     ..Default::default()
//! };
//! let files = collect_candidates(&options, false)?;
//!
//! let mut session = Session::new(files, Config::default(), TermSize::new(24, 80));
//! session.query = "fn main".to_string();
//! session.run_search();
//!
//! for file in &session.matches {
//!     println!("{} ({} matches)", file.path.display(), file.match_count());
//! }
//! ```
//!
//! ## Rendering
//!
//! The screen is drawn directly with ANSI commands. Row 1 holds the query,
//! rows below it hold the visible files, and the rightmost column holds the
//! scrollbar. Only the rows affected by an input are redrawn.

pub mod config;
pub mod search;
pub mod tui;
pub mod utils;
