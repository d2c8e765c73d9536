// ABOUTME: Full-screen terminal session guard for the viewer
// ABOUTME: Enters the alternate screen in raw mode and restores the terminal on drop

use anyhow::{Context, Result};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::Print,
    terminal::{
        self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, Stdout, Write};

pub struct TerminalGuard {
    stdout: Stdout,
}

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(e).context("Failed to enter alternate screen");
        }

        install_panic_hook();
        Ok(Self { stdout })
    }

    pub fn writer(&mut self) -> &mut Stdout {
        &mut self.stdout
    }

    /// Current height of the terminal in rows
    pub fn rows() -> Result<u16> {
        let (_, rows) = terminal::size().context("Failed to get terminal size")?;
        Ok(rows)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore();
    }
}

fn restore() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, Show, LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

/// Leave the alternate screen before the default hook prints a panic message
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore();
        default_hook(info);
    }));
}

/// Replace the whole screen with `text`, one terminal row per line
pub fn draw<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    queue!(out, Clear(ClearType::All))?;
    for (row, line) in text.lines().enumerate() {
        let row = u16::try_from(row).unwrap_or(u16::MAX);
        queue!(out, MoveTo(0, row), Print(line))?;
    }
    out.flush()
}
