//! Startup prompts for the player's name and icon. Runs before the terminal
//! leaves cooked mode, so plain line reads are fine.

use std::io::{self, BufRead, Write};

use crate::core::config::parse_icon;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub icon: char,
}

/// Fill in whichever of `name`/`icon` is missing by asking on `output`.
pub fn identify<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    name: Option<String>,
    icon: Option<char>,
) -> io::Result<Identity> {
    let name = match name {
        Some(name) => name,
        None => ask(input, output, "Enter player name: ", |line| {
            let trimmed = line.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })?,
    };
    let icon = match icon {
        Some(icon) => icon,
        None => ask(input, output, "Choose icon (1 char): ", parse_icon)?,
    };
    Ok(Identity { name, icon })
}

/// Repeat `question` until `accept` takes the answer.
fn ask<R: BufRead, W: Write, T>(
    input: &mut R,
    output: &mut W,
    question: &str,
    accept: impl Fn(&str) -> Option<T>,
) -> io::Result<T> {
    loop {
        write!(output, "{question}")?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before startup prompts were answered",
            ));
        }
        if let Some(value) = accept(&line) {
            return Ok(value);
        }
    }
}
