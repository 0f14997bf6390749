//! Cylinder repair quote CLI

use std::fs;
use std::io;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::info;

use cylinder_quote::catalog::PriceCatalog;
use cylinder_quote::cli::{Cli, Commands};
use cylinder_quote::config::load_settings;
use cylinder_quote::export::{catalog_csv, quote_csv};
use cylinder_quote::report::{CatalogReport, QuoteReport};
use cylinder_quote::session::Session;
use cylinder_quote::{init_tracing, shell};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref())?;
    init_tracing(&settings.log_level);

    let mut session = match cli.catalog.as_ref().or(settings.catalog.as_ref()) {
        Some(path) => {
            let mut session = Session::default();
            session
                .import_file(path)
                .with_context(|| format!("Failed to load price list {}", path.display()))?;
            session
        }
        None => Session::new(PriceCatalog::with_defaults(Local::now().date_naive())),
    };
    info!(materials = session.catalog().len(), "Session started");

    match cli.command {
        Commands::Catalog { keyword, export } => {
            let rows = session.catalog().matching(keyword.as_deref());
            if let Some(path) = export {
                fs::write(&path, catalog_csv(&rows)?)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("{} materials written to {}", rows.len(), path.display());
            } else if rows.is_empty() {
                println!("No materials in the price list.");
            } else {
                print!("{}", CatalogReport(&rows));
            }
        }

        Commands::Quote { args, export } => {
            let request = args.to_request(&settings);
            let quote = session.calculate(&request)?;
            print!("{}", QuoteReport(&quote));

            if let Some(path) = export {
                fs::write(&path, quote_csv(&quote)?)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("\nQuote written to {}", path.display());
            }
        }

        Commands::Shell => {
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            shell::run(&mut session, &settings, stdin.lock(), &mut stdout)?;
        }
    }

    Ok(())
}
