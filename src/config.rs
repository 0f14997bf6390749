//! Settings: default form values, logging level and startup price list

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::models::{FinancialParams, LaborHours};

pub const DEFAULT_CONFIG_FILE: &str = "cylinder-quote.toml";
pub const ENV_PREFIX: &str = "CYLINDER_QUOTE";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_level: String,
    /// Price list loaded when a session starts, instead of the built-in one
    pub catalog: Option<PathBuf>,
    pub financial: FinancialSettings,
    pub labor: LaborSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            catalog: None,
            financial: FinancialSettings::default(),
            labor: LaborSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FinancialSettings {
    pub usd_rate: f64,
    pub vat_percent: f64,
    pub workshop_rate: f64,
    pub margin_percent: f64,
}

impl Default for FinancialSettings {
    fn default() -> Self {
        let p = FinancialParams::default();
        Self {
            usd_rate: p.usd_rate,
            vat_percent: p.vat_percent,
            workshop_rate: p.workshop_rate,
            margin_percent: p.margin_percent,
        }
    }
}

impl From<&FinancialSettings> for FinancialParams {
    fn from(s: &FinancialSettings) -> Self {
        Self {
            usd_rate: s.usd_rate,
            vat_percent: s.vat_percent,
            workshop_rate: s.workshop_rate,
            margin_percent: s.margin_percent,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LaborSettings {
    pub inspection: f64,
    pub liner: f64,
    pub rod: f64,
    pub piston: f64,
    pub assembly: f64,
}

impl Default for LaborSettings {
    fn default() -> Self {
        let h = LaborHours::default();
        Self {
            inspection: h.inspection,
            liner: h.liner,
            rod: h.rod,
            piston: h.piston,
            assembly: h.assembly,
        }
    }
}

impl From<&LaborSettings> for LaborHours {
    fn from(s: &LaborSettings) -> Self {
        Self {
            inspection: s.inspection,
            liner: s.liner,
            rod: s.rod,
            piston: s.piston,
            assembly: s.assembly,
        }
    }
}

/// Load settings from an optional TOML file and `CYLINDER_QUOTE__*` variables
///
/// An explicitly given file must exist; the default file is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let file = match path {
        Some(path) => ::config::File::from(path).required(true),
        None => ::config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let config = ::config::Config::builder()
        .add_source(file)
        .add_source(::config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let settings: Settings = config.try_deserialize()?;
    validate_settings(&settings)?;

    Ok(settings)
}

fn validate_settings(settings: &Settings) -> anyhow::Result<()> {
    let f = &settings.financial;
    let l = &settings.labor;
    for (name, value) in [
        ("financial.usd_rate", f.usd_rate),
        ("financial.vat_percent", f.vat_percent),
        ("financial.workshop_rate", f.workshop_rate),
        ("financial.margin_percent", f.margin_percent),
        ("labor.inspection", l.inspection),
        ("labor.liner", l.liner),
        ("labor.rod", l.rod),
        ("labor.piston", l.piston),
        ("labor.assembly", l.assembly),
    ] {
        if !value.is_finite() {
            anyhow::bail!("{} must be a finite number", name);
        }
    }

    if !(1.0..).contains(&f.usd_rate) {
        anyhow::bail!("financial.usd_rate must be at least 1, got {}", f.usd_rate);
    }
    if !(0.0..=20.0).contains(&f.vat_percent) {
        anyhow::bail!("financial.vat_percent must be between 0 and 20");
    }
    if !(1000.0..).contains(&f.workshop_rate) {
        anyhow::bail!("financial.workshop_rate must be at least 1000");
    }
    if !(0.0..=100.0).contains(&f.margin_percent) {
        anyhow::bail!("financial.margin_percent must be between 0 and 100");
    }

    for (name, hours) in [
        ("inspection", l.inspection),
        ("liner", l.liner),
        ("rod", l.rod),
        ("piston", l.piston),
        ("assembly", l.assembly),
    ] {
        if !(0.5..).contains(&hours) {
            anyhow::bail!("labor.{} must be at least 0.5 hours", name);
        }
    }

    if settings.log_level.trim().is_empty() {
        anyhow::bail!("log_level cannot be empty");
    }

    Ok(())
}
