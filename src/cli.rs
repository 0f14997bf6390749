//! Command-line arguments

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Settings;
use crate::models::{FinancialParams, JobInfo, LaborHours, QuoteRequest, Quantities};

#[derive(Parser)]
#[command(name = "cylinder-quote")]
#[command(about = "Repair cost calculator for hydraulic cylinders")]
pub struct Cli {
    /// Path to a TOML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Price list to start from (CSV, XLSX or ODS) instead of the built-in one
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show or export the price list
    Catalog {
        /// Only show materials whose name contains this text
        #[arg(short, long)]
        keyword: Option<String>,

        /// Write the price list as CSV instead of printing it
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// Calculate a single repair quote
    Quote {
        #[command(flatten)]
        args: QuoteArgs,

        /// Write the cost lines as CSV to this file
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// Interactive session with editable prices and a repair log
    Shell,
}

/// Repair job inputs; unset hours and rates come from the settings
#[derive(Args, Debug, Clone)]
pub struct QuoteArgs {
    #[arg(long, default_value = "")]
    pub job_order: String,
    #[arg(long, default_value = "")]
    pub brand: String,
    #[arg(long, default_value = "")]
    pub machine_model: String,
    #[arg(long, default_value = "")]
    pub machine_serial: String,
    #[arg(long, default_value = "")]
    pub customer_prefix: String,
    #[arg(long, default_value = "")]
    pub cylinder_name: String,
    #[arg(long, default_value = "")]
    pub cylinder_serial: String,
    #[arg(long, default_value = "")]
    pub pipe_number: String,
    #[arg(long, default_value = "")]
    pub rod_number: String,
    #[arg(long, default_value = "")]
    pub piston_number: String,
    #[arg(long, default_value = "")]
    pub head_number: String,

    /// Pipe material name (default: first pipe in the price list)
    #[arg(long)]
    pub pipe: Option<String>,
    /// Rod material name (default: first rod in the price list)
    #[arg(long)]
    pub rod: Option<String>,
    /// Piston round stock name (default: smallest diameter)
    #[arg(long)]
    pub round_stock: Option<String>,

    /// Pipe length in meters
    #[arg(long, default_value_t = 1.0)]
    pub pipe_length: f64,
    /// Rod length in meters
    #[arg(long, default_value_t = 1.0)]
    pub rod_length: f64,
    /// Piston length in millimeters
    #[arg(long, default_value_t = 100.0)]
    pub piston_length: f64,
    #[arg(long, default_value_t = 1)]
    pub piston_quantity: u32,

    /// Hours for intake and disassembly
    #[arg(long)]
    pub hours_inspection: Option<f64>,
    /// Hours for making the liner
    #[arg(long)]
    pub hours_liner: Option<f64>,
    #[arg(long)]
    pub hours_rod: Option<f64>,
    #[arg(long)]
    pub hours_piston: Option<f64>,
    /// Hours for assembly and dispatch
    #[arg(long)]
    pub hours_assembly: Option<f64>,

    /// Local currency per USD
    #[arg(long)]
    pub usd_rate: Option<f64>,
    #[arg(long)]
    pub vat: Option<f64>,
    /// Labor cost per hour
    #[arg(long)]
    pub workshop_rate: Option<f64>,
    #[arg(long)]
    pub margin: Option<f64>,
}

impl QuoteArgs {
    pub fn to_request(&self, settings: &Settings) -> QuoteRequest {
        let labor = LaborHours::from(&settings.labor);
        let financial = FinancialParams::from(&settings.financial);

        QuoteRequest {
            job: JobInfo {
                job_order: self.job_order.clone(),
                brand: self.brand.clone(),
                machine_model: self.machine_model.clone(),
                machine_serial: self.machine_serial.clone(),
                customer_prefix: self.customer_prefix.clone(),
                cylinder_name: self.cylinder_name.clone(),
                cylinder_serial: self.cylinder_serial.clone(),
                pipe_number: self.pipe_number.clone(),
                rod_number: self.rod_number.clone(),
                piston_number: self.piston_number.clone(),
                head_number: self.head_number.clone(),
            },
            pipe: self.pipe.clone(),
            rod: self.rod.clone(),
            round_stock: self.round_stock.clone(),
            quantities: Quantities {
                pipe_length_m: self.pipe_length,
                rod_length_m: self.rod_length,
                piston_length_mm: self.piston_length,
                piston_quantity: self.piston_quantity,
            },
            labor: LaborHours {
                inspection: self.hours_inspection.unwrap_or(labor.inspection),
                liner: self.hours_liner.unwrap_or(labor.liner),
                rod: self.hours_rod.unwrap_or(labor.rod),
                piston: self.hours_piston.unwrap_or(labor.piston),
                assembly: self.hours_assembly.unwrap_or(labor.assembly),
            },
            financial: FinancialParams {
                usd_rate: self.usd_rate.unwrap_or(financial.usd_rate),
                vat_percent: self.vat.unwrap_or(financial.vat_percent),
                workshop_rate: self.workshop_rate.unwrap_or(financial.workshop_rate),
                margin_percent: self.margin.unwrap_or(financial.margin_percent),
            },
        }
    }
}
