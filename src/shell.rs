//! Line-oriented interactive session
//!
//! Each line is split into words (double quotes group words with spaces)
//! and parsed with clap. A failing command prints its error and leaves
//! the session as it was.

use std::fs;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use chrono::Local;
use clap::{Parser, Subcommand};

use crate::cli::QuoteArgs;
use crate::config::Settings;
use crate::export::{catalog_csv, quote_csv, quote_file_name};
use crate::models::MaterialDraft;
use crate::report::{CatalogReport, HistoryReport, QuoteReport};
use crate::session::Session;

#[derive(Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand)]
enum ShellCommand {
    /// Replace the price list from a CSV or spreadsheet file
    Import { path: PathBuf },

    /// Show the price list, optionally filtered by name
    List { keyword: Option<String> },

    /// Change a material's cost
    SetCost {
        name: String,
        #[arg(allow_negative_numbers = true)]
        cost: f64,
    },

    /// Change a material's unit of measure
    SetUnit { name: String, unit: String },

    /// Rename a material
    Rename { name: String, new_name: String },

    /// Add a material at the end of the price list
    Add {
        name: String,
        #[arg(allow_negative_numbers = true)]
        cost: f64,
        unit: String,
    },

    /// Delete a material
    Remove { name: String },

    /// Calculate a quote and add it to the history
    Quote {
        #[command(flatten)]
        args: QuoteArgs,
    },

    /// Show all quotes calculated in this session
    History,

    /// Write the history as CSV
    ExportHistory { path: PathBuf },

    /// Write the last quote's cost lines as CSV
    ExportQuote {
        /// Defaults to repair_<job order>.csv
        path: Option<PathBuf>,
    },

    /// Write the price list as CSV, optionally filtered by name
    ExportCatalog {
        path: PathBuf,
        keyword: Option<String>,
    },

    /// End the session
    #[command(alias = "exit")]
    Quit,
}

enum Flow {
    Continue,
    Quit,
}

/// Run commands from `input` until it ends or `quit` is entered
pub fn run<R: BufRead, W: Write>(
    session: &mut Session,
    settings: &Settings,
    input: R,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Type 'help' for commands, 'quit' to leave.")?;
    write!(out, "> ")?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        match execute(session, settings, &line, out) {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => writeln!(out, "Error: {:#}", e)?,
        }
        write!(out, "> ")?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}

fn execute<W: Write>(
    session: &mut Session,
    settings: &Settings,
    line: &str,
    out: &mut W,
) -> Result<Flow> {
    let words = split_words(line)?;
    if words.is_empty() {
        return Ok(Flow::Continue);
    }

    let command = match ShellLine::try_parse_from(&words) {
        Ok(parsed) => parsed.command,
        Err(e) => {
            // help and usage errors are rendered by clap
            write!(out, "{}", e.render())?;
            return Ok(Flow::Continue);
        }
    };

    match command {
        ShellCommand::Import { path } => {
            let rows = session
                .import_file(&path)
                .with_context(|| format!("Failed to import {}", path.display()))?;
            writeln!(out, "Loaded {} materials from {}", rows, path.display())?;
        }

        ShellCommand::List { keyword } => {
            let rows = session.catalog().matching(keyword.as_deref());
            if rows.is_empty() {
                writeln!(out, "No materials to show")?;
            } else {
                write!(out, "{}", CatalogReport(&rows))?;
            }
            if let Some(at) = session.last_upload() {
                writeln!(out, "Last upload: {}", at.format("%d.%m.%Y %H:%M"))?;
            }
        }

        ShellCommand::SetCost { name, cost } => {
            check_cost(cost)?;
            edit_row(session, &name, |row| row.cost = cost)?;
            writeln!(out, "Updated {}", name)?;
        }

        ShellCommand::SetUnit { name, unit } => {
            edit_row(session, &name, |row| row.unit = unit)?;
            writeln!(out, "Updated {}", name)?;
        }

        ShellCommand::Rename { name, new_name } => {
            edit_row(session, &name, |row| row.name = new_name.clone())?;
            writeln!(out, "Renamed {} to {}", name, new_name)?;
        }

        ShellCommand::Add { name, cost, unit } => {
            check_cost(cost)?;
            let mut rows = session.catalog().drafts();
            rows.push(MaterialDraft {
                name: name.clone(),
                cost,
                unit,
            });
            session.save_edits(rows);
            writeln!(out, "Added {}", name)?;
        }

        ShellCommand::Remove { name } => {
            session.remove_material(&name)?;
            writeln!(out, "Removed {}", name)?;
        }

        ShellCommand::Quote { args } => {
            let request = args.to_request(settings);
            let quote = session.calculate(&request)?;
            write!(out, "{}", QuoteReport(&quote))?;
        }

        ShellCommand::History => {
            if session.history().is_empty() {
                writeln!(out, "Repair history is empty")?;
            } else {
                write!(out, "{}", HistoryReport(session.history()))?;
            }
        }

        ShellCommand::ExportHistory { path } => {
            let bytes = session.history().export_csv()?;
            fs::write(&path, bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            writeln!(
                out,
                "Wrote {} entries to {}",
                session.history().len(),
                path.display()
            )?;
        }

        ShellCommand::ExportQuote { path } => {
            let quote = session
                .last_quote()
                .ok_or_else(|| anyhow!("no quote calculated yet"))?;
            let path = path.unwrap_or_else(|| {
                PathBuf::from(quote_file_name(
                    &quote.request.job.job_order,
                    Local::now().naive_local(),
                ))
            });
            fs::write(&path, quote_csv(quote)?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            writeln!(out, "Wrote {}", path.display())?;
        }

        ShellCommand::ExportCatalog { path, keyword } => {
            let rows = session.catalog().matching(keyword.as_deref());
            fs::write(&path, catalog_csv(&rows)?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            writeln!(out, "Wrote {} materials to {}", rows.len(), path.display())?;
        }

        ShellCommand::Quit => return Ok(Flow::Quit),
    }

    Ok(Flow::Continue)
}

fn check_cost(cost: f64) -> Result<()> {
    if !cost.is_finite() {
        bail!("cost must be a finite number");
    }
    if cost < 0.0 {
        bail!("cost cannot be negative");
    }
    Ok(())
}

/// Edit the first row named `name` through a full-table save
fn edit_row(
    session: &mut Session,
    name: &str,
    change: impl FnOnce(&mut MaterialDraft),
) -> Result<()> {
    let mut rows = session.catalog().drafts();
    let row = rows
        .iter_mut()
        .find(|r| r.name == name)
        .ok_or_else(|| anyhow!("unknown material: {}", name))?;
    change(row);
    session.save_edits(rows);
    Ok(())
}

/// Split a command line on whitespace, keeping "quoted text" together
fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quoted {
        bail!("unterminated quote");
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
