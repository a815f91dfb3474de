use std::io::{self, Write};

use anyhow::{bail, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal,
};

/// The two kinds of operator input the moderation loop needs: one
/// constrained character per item, and one free line for the batch
/// confirmation.
pub trait Prompter {
    fn choose(&mut self, prompt: &str, allowed: &[char]) -> Result<char>;
    fn read_line(&mut self, prompt: &str) -> Result<String>;
}

/// Prompter over the controlling terminal. Characters are read in raw mode
/// without waiting for a line terminator; anything outside the allowed set
/// is discarded and re-read, and the accepted character is echoed once.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn choose(&mut self, prompt: &str, allowed: &[char]) -> Result<char> {
        print!("{prompt} ");
        io::stdout().flush()?;
        let choice = read_constrained_char(allowed)?;
        println!("{choice}");
        Ok(choice)
    }

    fn read_line(&mut self, prompt: &str) -> Result<String> {
        print!("{prompt} ");
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        Ok(answer)
    }
}

/// Raw mode is held for the duration of one read and released by Drop, so
/// the terminal is restored on every exit path, errors and Ctrl-C included.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn read_constrained_char(allowed: &[char]) -> Result<char> {
    let _guard = RawModeGuard::enable()?;
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            // Raw mode swallows the interrupt signal, so the key itself has
            // to end the run.
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                bail!("interrupted")
            }
            KeyCode::Char(ch) => {
                let ch = ch.to_ascii_lowercase();
                if allowed.contains(&ch) {
                    return Ok(ch);
                }
            }
            _ => {}
        }
    }
}
