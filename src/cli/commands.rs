//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::Path;

use log::{info, warn};

use super::script::{parse_script, BrushChange, ScriptCommand, ScriptLine};
use super::RunArgs;
use crate::brush::Brush;
use crate::canvas::Frame;
use crate::config::SessionConfig;
use crate::error::{PaintError, Result};
use crate::history::UndoManager;
use crate::layer::global_catalog;
use crate::session::PaintSession;

/// Counters collected while executing a script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub performed: usize,
    pub unchanged: usize,
    pub undone: usize,
    pub redone: usize,
    pub skipped: usize,
}

/// Print the layer catalog in application order.
pub fn list_layers() -> Result<()> {
    info!("Listing layer catalog");

    let catalog = global_catalog();
    println!("Layers ({}):", catalog.len());
    for (index, layer) in catalog.iter().enumerate() {
        println!("  {:>2}. {}", index, layer);
    }

    Ok(())
}

/// Run a script file against a fresh session and print the result.
pub fn run_script(args: &RunArgs) -> Result<()> {
    info!("Running script: {}", args.script.display());

    let config = resolve_config(args)?;
    let text = fs::read_to_string(&args.script).map_err(|e| PaintError::FileReadError {
        path: args.script.clone(),
        source: e,
    })?;
    let lines = parse_script(&text)?;

    let mut session = PaintSession::new(&config)?;
    let summary = execute_script(&mut session, &lines)?;

    println!(
        "Canvas {}x{} ({})",
        session.canvas().width(),
        session.canvas().height(),
        session.canvas().policy()
    );
    print_frame(&session.render(args.timestamp));
    println!(
        "Actions: {} performed, {} unchanged, {} undone, {} redone, {} skipped",
        summary.performed, summary.unchanged, summary.undone, summary.redone, summary.skipped
    );
    println!(
        "History: {} undoable, {} redoable",
        session.history().undo_count(),
        session.history().redo_count()
    );
    if args.show_history {
        for line in history_lines(session.history()) {
            println!("  {}", line);
        }
    }
    println!("Replay log: {} entries", session.replay_log().len());

    let fingerprint = session.canvas().fingerprint();
    println!("Fingerprint: {}", fingerprint);

    if args.verify_replay {
        let mut replayed = session.canvas().blank_like();
        let played = session.play_back_onto(&mut replayed);
        let matches = replayed.fingerprint() == fingerprint;
        if !matches {
            warn!("Replay of {} entries diverged from the live canvas", played);
        }
        println!(
            "Replay: {} entries, {}",
            played,
            if matches { "matches" } else { "MISMATCH" }
        );
    }

    Ok(())
}

/// Start from the config file (or defaults) and apply command-line overrides.
fn resolve_config(args: &RunArgs) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };

    if let Some(policy) = args.policy {
        config.policy = policy;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }

    config.validate()?;
    Ok(config)
}

/// Execute parsed commands in order.
///
/// Recoverable errors (bad cells, unknown layers, bad brush sizes) skip the
/// offending line; anything else stops the run.
pub fn execute_script(session: &mut PaintSession, lines: &[ScriptLine]) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for ScriptLine { line, command } in lines {
        match execute_command(session, command, &mut summary) {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => {
                warn!("Skipping line {}: {}", line, e);
                summary.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(summary)
}

fn execute_command(
    session: &mut PaintSession,
    command: &ScriptCommand,
    summary: &mut RunSummary,
) -> Result<()> {
    match command {
        ScriptCommand::Paint { layer, column, row } => {
            count_stroke(session.paint(layer, *column, *row)?.is_some(), summary)
        }
        ScriptCommand::Erase { layer, column, row } => {
            count_stroke(session.erase(layer, *column, *row)?.is_some(), summary)
        }
        ScriptCommand::Special => {
            session.special();
            summary.performed += 1;
        }
        ScriptCommand::Undo => match session.undo() {
            Some(_) => summary.undone += 1,
            None => info!("Nothing to undo"),
        },
        ScriptCommand::Redo => match session.redo() {
            Some(_) => summary.redone += 1,
            None => info!("Nothing to redo"),
        },
        ScriptCommand::Brush(change) => {
            let size = match change {
                BrushChange::Up => session.brush_mut().increase(),
                BrushChange::Down => session.brush_mut().decrease(),
                BrushChange::Set(size) => {
                    *session.brush_mut() = Brush::new(*size)?;
                    *size
                }
            };
            info!("Brush size: {}", size);
        }
    }
    Ok(())
}

fn count_stroke(changed: bool, summary: &mut RunSummary) {
    if changed {
        summary.performed += 1;
    } else {
        summary.unchanged += 1;
    }
}

/// One line per history entry, undo stack first, most recent at the top.
fn history_lines(history: &UndoManager) -> Vec<String> {
    let undo = history
        .undo_stack_summary()
        .into_iter()
        .map(|entry| ("undo", entry));
    let redo = history
        .redo_stack_summary()
        .into_iter()
        .map(|entry| ("redo", entry));

    undo.chain(redo)
        .map(|(stack, (id, recorded_at, description))| {
            format!(
                "{} {} {} [{}]",
                stack,
                recorded_at.format("%H:%M:%S%.3f"),
                description,
                id
            )
        })
        .collect()
}

fn print_frame(frame: &Frame) {
    for row in frame.rows() {
        let line: Vec<String> = row.iter().map(|color| color.to_hex()).collect();
        println!("{}", line.join(" "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CompositionPolicy;
    use std::path::PathBuf;

    fn session() -> PaintSession {
        let config = SessionConfig {
            brush_size: 0,
            ..Default::default()
        };
        PaintSession::new(&config).unwrap()
    }

    fn args(config: Option<PathBuf>) -> RunArgs {
        RunArgs {
            script: PathBuf::from("unused.txt"),
            config,
            policy: None,
            width: None,
            height: None,
            timestamp: 0,
            verify_replay: false,
            show_history: false,
        }
    }

    #[test]
    fn test_execute_counts() {
        let lines = parse_script(
            "paint red 0 0\npaint red 0 0\nundo\nredo\nredo\nbrush up\nspecial",
        )
        .unwrap();
        let mut session = session();

        let summary = execute_script(&mut session, &lines).unwrap();
        assert_eq!(
            summary,
            RunSummary {
                performed: 2,
                unchanged: 1,
                undone: 1,
                redone: 1,
                skipped: 0,
            }
        );
        assert_eq!(session.brush().size(), 1);
    }

    #[test]
    fn test_recoverable_errors_skip_line() {
        let lines =
            parse_script("paint glitter 0 0\npaint red 9 9\nbrush 8\npaint red 1 1").unwrap();
        let mut session = session();

        let summary = execute_script(&mut session, &lines).unwrap();
        assert_eq!(summary.skipped, 3);
        assert_eq!(summary.performed, 1);
        assert_eq!(session.brush().size(), 0);
    }

    #[test]
    fn test_history_lines_show_recording_time() {
        let mut session = session();
        let first = session.paint("red", 0, 0).unwrap().unwrap();
        let second = session.paint("invert", 1, 1).unwrap().unwrap();
        session.undo().unwrap();

        let lines = history_lines(session.history());
        assert_eq!(lines.len(), 2);
        let first_at = first.recorded_at().format("%H:%M:%S%.3f");
        let second_at = second.recorded_at().format("%H:%M:%S%.3f");
        assert_eq!(
            lines[0],
            format!("undo {} paint red in 1 cells [{}]", first_at, first.id())
        );
        assert!(lines[1].starts_with(&format!("redo {} ", second_at)));
        assert!(lines[1].ends_with(&format!("[{}]", second.id())));
    }

    #[test]
    fn test_resolve_config_overrides() {
        let mut run = args(None);
        run.policy = Some(CompositionPolicy::Sequence);
        run.height = Some(3);

        let config = resolve_config(&run).unwrap();
        assert_eq!(config.policy, CompositionPolicy::Sequence);
        assert_eq!(config.width, 5);
        assert_eq!(config.height, 3);
    }

    #[test]
    fn test_resolve_config_rejects_zero_width() {
        let mut run = args(None);
        run.width = Some(0);
        assert_eq!(
            resolve_config(&run).unwrap_err().error_code(),
            "INVALID_CONFIG"
        );
    }

    #[test]
    fn test_run_script_missing_file() {
        let err = run_script(&args(None)).unwrap_err();
        assert_eq!(err.error_code(), "FILE_READ_ERROR");
    }
}
