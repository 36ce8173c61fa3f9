pub mod layout;
pub mod session;
pub mod ui;
pub mod viewport;

use crate::config::{Config, TermSize};
use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use session::{Command, Redraw, Session};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError, SyncSender};
use std::thread;
use tracing::{debug, info, trace, warn};

/// Take over the terminal and run the interactive search until quit or end
/// of input
pub fn run(candidates: Vec<PathBuf>, config: Config) -> Result<()> {
    let (width, height) = terminal::size().context("Failed to read terminal size")?;
    let size = TermSize::new(height as usize, width as usize);
    info!(height, width, files = candidates.len(), "starting session");

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e).context("Failed to enter alternate screen");
    }

    let session = Session::new(candidates, config, size);
    let result = run_loop(session, io::stdin(), &mut stdout);

    // Restore terminal
    let restored = restore_terminal(&mut stdout);
    result.context("Terminal I/O failed")?;
    restored
}

fn restore_terminal<W: Write>(out: &mut W) -> Result<()> {
    let raw = disable_raw_mode();
    execute!(out, LeaveAlternateScreen, Show).context("Failed to leave alternate screen")?;
    raw.context("Failed to disable raw mode")
}

/// Drive `session` from raw input bytes.
///
/// Bytes are applied one at a time as they arrive. A search fires once the
/// input has been quiet for the debounce period, and only when the query
/// changed since the previous search. Returns on a quit command or when the
/// input ends.
pub fn run_loop<R, W>(mut session: Session, input: R, out: &mut W) -> io::Result<Session>
where
    R: Read + Send + 'static,
    W: Write,
{
    let (tx, rx) = mpsc::sync_channel(1);
    thread::spawn(move || read_input(input, tx));

    let debounce = session.config.debounce_duration();
    let mut last_searched = String::new();
    ui::draw(out, &session, Redraw::Full)?;

    loop {
        match rx.recv_timeout(debounce) {
            Ok(byte) => {
                let Some(command) = Command::from_byte(byte) else {
                    trace!(byte, "ignoring unbound byte");
                    continue;
                };
                if command == Command::Quit {
                    debug!("quit requested");
                    break;
                }
                let redraw = session.apply(command);
                ui::draw(out, &session, redraw)?;
            }
            Err(RecvTimeoutError::Timeout) => {
                if session.query == last_searched {
                    continue;
                }
                let mut progress = ui::SearchProgress::new(&mut *out, session.size.width);
                let redraw = session.run_search_with(|| progress.tick());
                progress.finish()?;
                last_searched.clone_from(&session.query);
                ui::draw(out, &session, redraw)?;
            }
            Err(RecvTimeoutError::Disconnected) => {
                debug!("input closed");
                break;
            }
        }
    }

    Ok(session)
}

/// Blocking one-byte reads forwarded to the main loop
fn read_input<R: Read>(mut input: R, tx: SyncSender<u8>) {
    let mut byte = [0u8; 1];
    loop {
        match input.read(&mut byte) {
            Ok(0) => return,
            Ok(_) => {
                if tx.send(byte[0]).is_err() {
                    return;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(error = %e, "failed to read input");
                return;
            }
        }
    }
}
