//! CLI interface for Aegis.
//!
//! Bare `aegis` opens the interactive companion. The `log` subcommands
//! inspect archived reports non-interactively: arguments in, plain text out.
//!
//! Report IDs are accepted as full UUIDs or unambiguous prefixes
//! (e.g. `a3b`).

mod format;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::storage::Storage;

use format::{format_report_line, format_transcript};

/// Aegis — personal safety companion.
#[derive(Debug, Parser)]
#[command(name = "aegis")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect archived incident reports.
    Log {
        #[command(subcommand)]
        command: LogCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum LogCommand {
    /// List archived reports, oldest first.
    List,

    /// Print one report's transcript.
    Show {
        /// Report ID: full UUID or unambiguous prefix.
        id: String,
    },
}

pub fn run(command: Command, storage: &Storage) -> Result<(), String> {
    match command {
        Command::Log {
            command: LogCommand::List,
        } => {
            let reports = storage.list_reports().map_err(|e| e.to_string())?;
            if reports.is_empty() {
                println!("No archived reports.");
                return Ok(());
            }
            for report in &reports {
                println!("{}", format_report_line(report));
            }
            Ok(())
        }
        Command::Log {
            command: LogCommand::Show { id },
        } => {
            let id = resolve_report_id(storage, &id)?;
            let report = storage.load_report(id).map_err(|e| e.to_string())?;
            let messages = storage.load_transcript(id).map_err(|e| e.to_string())?;
            print!("{}", format_transcript(&report, &messages));
            Ok(())
        }
    }
}

/// Resolves a full UUID or unambiguous prefix against the archive.
fn resolve_report_id(storage: &Storage, input: &str) -> Result<Uuid, String> {
    if let Ok(id) = input.parse::<Uuid>() {
        return Ok(id);
    }

    let reports = storage.list_reports().map_err(|e| e.to_string())?;
    let matches: Vec<Uuid> = reports
        .iter()
        .map(|r| r.id)
        .filter(|id| id.to_string().starts_with(input))
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(format!("no report matches '{input}'")),
        _ => Err(format!(
            "'{input}' is ambiguous: {} reports match",
            matches.len()
        )),
    }
}
