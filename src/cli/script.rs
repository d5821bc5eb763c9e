//! Paint script parsing
//!
//! One command per line; blank lines and `#` comments are ignored:
//!
//! ```text
//! paint <layer> <col> <row>
//! erase <layer> <col> <row>
//! special
//! undo
//! redo
//! brush up|down|<size>
//! ```

use crate::error::{PaintError, Result};

/// Brush adjustment requested by a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushChange {
    Up,
    Down,
    Set(usize),
}

/// One parsed script command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    Paint {
        layer: String,
        column: usize,
        row: usize,
    },
    Erase {
        layer: String,
        column: usize,
        row: usize,
    },
    Special,
    Undo,
    Redo,
    Brush(BrushChange),
}

/// A command together with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub line: usize,
    pub command: ScriptCommand,
}

/// Parse a whole script
pub fn parse_script(text: &str) -> Result<Vec<ScriptLine>> {
    let mut commands = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        if let Some(command) = parse_line(line, raw)? {
            commands.push(ScriptLine { line, command });
        }
    }
    Ok(commands)
}

fn parse_line(line: usize, raw: &str) -> Result<Option<ScriptCommand>> {
    let content = raw.split('#').next().unwrap_or_default().trim();
    if content.is_empty() {
        return Ok(None);
    }

    let error = |reason: String| PaintError::ScriptParse { line, reason };
    let words: Vec<&str> = content.split_whitespace().collect();

    let command = match words.as_slice() {
        ["paint", layer, column, row] => ScriptCommand::Paint {
            layer: layer.to_string(),
            column: parse_index(column).map_err(error)?,
            row: parse_index(row).map_err(error)?,
        },
        ["erase", layer, column, row] => ScriptCommand::Erase {
            layer: layer.to_string(),
            column: parse_index(column).map_err(error)?,
            row: parse_index(row).map_err(error)?,
        },
        ["special"] => ScriptCommand::Special,
        ["undo"] => ScriptCommand::Undo,
        ["redo"] => ScriptCommand::Redo,
        ["brush", "up"] => ScriptCommand::Brush(BrushChange::Up),
        ["brush", "down"] => ScriptCommand::Brush(BrushChange::Down),
        ["brush", size] => {
            ScriptCommand::Brush(BrushChange::Set(parse_index(size).map_err(error)?))
        }
        [verb @ ("paint" | "erase"), ..] => {
            return Err(error(format!("'{}' takes <layer> <col> <row>", verb)));
        }
        [verb, ..] => return Err(error(format!("unknown command '{}'", verb))),
        [] => return Ok(None),
    };
    Ok(Some(command))
}

fn parse_index(word: &str) -> std::result::Result<usize, String> {
    word.parse()
        .map_err(|_| format!("'{}' is not a non-negative integer", word))
}
