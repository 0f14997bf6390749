//! Hydraulic cylinder repair calculator
//!
//! Prices a cylinder repair from a material price list, labor hours and
//! margin/VAT/currency parameters, and keeps a log of the session's quotes.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod import;
pub mod models;
pub mod pricing;
pub mod report;
pub mod session;
pub mod shell;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize logging to stderr; `RUST_LOG` overrides `default_level`
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}
