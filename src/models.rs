//! Data models for materials, quotes and history entries

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{QuoteError, Result};

/// A priced material in the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialRecord {
    pub name: String,
    pub cost: f64, // local currency per `unit`
    pub unit: String,
    pub last_updated: NaiveDate,
}

/// A catalog row as typed by the operator
///
/// Carries no date: `PriceCatalog::apply_edits` decides which rows get
/// stamped.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDraft {
    pub name: String,
    pub cost: f64,
    pub unit: String,
}

impl From<&MaterialRecord> for MaterialDraft {
    fn from(record: &MaterialRecord) -> Self {
        Self {
            name: record.name.clone(),
            cost: record.cost,
            unit: record.unit.clone(),
        }
    }
}

/// Material categories a cylinder repair draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Pipe,
    Rod,
    RoundStock,
}

impl Category {
    /// Lowercase name fragments identifying the category
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Category::Pipe => &["труба", "pipe"],
            Category::Rod => &["шток", "rod"],
            Category::RoundStock => &["кругляк", "round-stock"],
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Pipe => "pipe",
            Category::Rod => "rod",
            Category::RoundStock => "round-stock",
        };
        f.write_str(name)
    }
}

/// Free-text identifiers of the job and the cylinder being repaired
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobInfo {
    pub job_order: String,
    pub brand: String,
    pub machine_model: String,
    pub machine_serial: String,
    pub customer_prefix: String,
    pub cylinder_name: String,
    pub cylinder_serial: String,
    pub pipe_number: String,
    pub rod_number: String,
    pub piston_number: String,
    pub head_number: String,
}

/// Hours per labor category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaborHours {
    pub inspection: f64,
    pub liner: f64,
    pub rod: f64,
    pub piston: f64,
    pub assembly: f64,
}

impl LaborHours {
    pub fn total(&self) -> f64 {
        self.inspection + self.liner + self.rod + self.piston + self.assembly
    }
}

impl Default for LaborHours {
    fn default() -> Self {
        Self {
            inspection: 2.0,
            liner: 4.0,
            rod: 3.0,
            piston: 3.5,
            assembly: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinancialParams {
    pub usd_rate: f64,       // local currency per USD
    pub vat_percent: f64,
    pub workshop_rate: f64,  // local currency per labor hour
    pub margin_percent: f64,
}

impl Default for FinancialParams {
    fn default() -> Self {
        Self {
            usd_rate: 450.0,
            vat_percent: 12.0,
            workshop_rate: 5000.0,
            margin_percent: 25.0,
        }
    }
}

/// Quantities consumed from each selected material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantities {
    pub pipe_length_m: f64,
    pub rod_length_m: f64,
    pub piston_length_mm: f64,
    pub piston_quantity: u32,
}

impl Default for Quantities {
    fn default() -> Self {
        Self {
            pipe_length_m: 1.0,
            rod_length_m: 1.0,
            piston_length_mm: 100.0,
            piston_quantity: 1,
        }
    }
}

/// Everything the operator enters for one calculation
///
/// Material names are optional; an absent name selects the first
/// candidate of that category from the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteRequest {
    pub job: JobInfo,
    pub pipe: Option<String>,
    pub rod: Option<String>,
    pub round_stock: Option<String>,
    pub quantities: Quantities,
    pub labor: LaborHours,
    pub financial: FinancialParams,
}

impl QuoteRequest {
    /// Check numeric inputs against the bounds of the entry form
    pub fn validate(&self) -> Result<()> {
        let q = &self.quantities;
        let l = &self.labor;
        let f = &self.financial;
        for (label, value) in [
            ("pipe length", q.pipe_length_m),
            ("rod length", q.rod_length_m),
            ("piston length", q.piston_length_mm),
            ("inspection hours", l.inspection),
            ("liner hours", l.liner),
            ("rod hours", l.rod),
            ("piston hours", l.piston),
            ("assembly hours", l.assembly),
            ("USD rate", f.usd_rate),
            ("VAT", f.vat_percent),
            ("workshop rate", f.workshop_rate),
            ("margin", f.margin_percent),
        ] {
            check(value.is_finite(), &format!("{} must be a finite number", label))?;
        }

        check(q.pipe_length_m >= 0.1, "pipe length must be at least 0.1 m")?;
        check(q.rod_length_m >= 0.1, "rod length must be at least 0.1 m")?;
        check(q.piston_length_mm >= 10.0, "piston length must be at least 10 mm")?;
        check(q.piston_quantity >= 1, "piston quantity must be at least 1")?;

        for (label, hours) in [
            ("inspection", l.inspection),
            ("liner", l.liner),
            ("rod", l.rod),
            ("piston", l.piston),
            ("assembly", l.assembly),
        ] {
            check(hours >= 0.5, &format!("{} hours must be at least 0.5", label))?;
        }

        check(f.usd_rate >= 1.0, "USD rate must be at least 1")?;
        check(
            (0.0..=20.0).contains(&f.vat_percent),
            "VAT must be between 0 and 20 percent",
        )?;
        check(f.workshop_rate >= 1000.0, "workshop rate must be at least 1000")?;
        check(
            (0.0..=100.0).contains(&f.margin_percent),
            "margin must be between 0 and 100 percent",
        )?;
        Ok(())
    }
}

fn check(ok: bool, message: &str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(QuoteError::InvalidParameter(message.to_string()))
    }
}

/// Cost breakdown of one calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteResult {
    pub pipe_cost: f64,
    pub rod_cost: f64,
    pub piston_cost: f64,
    pub materials_cost: f64,
    pub labor_hours: f64,
    pub labor_cost: f64,
    pub subtotal: f64,
    pub price_with_margin: f64,
    pub final_price_local: f64,
    pub final_price_usd: f64,
}

/// A successful calculation with the catalog rows it was priced from
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub request: QuoteRequest,
    pub pipe: MaterialRecord,
    pub rod: MaterialRecord,
    pub round_stock: MaterialRecord,
    pub result: QuoteResult,
}

/// One line of the repair log
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub timestamp: NaiveDateTime,
    pub job: JobInfo,
    pub materials_cost: f64,
    pub labor_cost: f64,
    pub final_price_local: f64,
    pub final_price_usd: f64,
}

impl HistoryEntry {
    pub fn new(timestamp: NaiveDateTime, job: &JobInfo, result: &QuoteResult) -> Self {
        Self {
            timestamp,
            job: job.clone(),
            materials_cost: result.materials_cost,
            labor_cost: result.labor_cost,
            final_price_local: result.final_price_local,
            final_price_usd: result.final_price_usd,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_request_is_valid() {
        assert!(QuoteRequest::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_piston() {
        let mut request = QuoteRequest::default();
        request.quantities.piston_length_mm = 5.0;
        let err = request.validate().unwrap_err();
        assert!(matches!(err, QuoteError::InvalidParameter(_)));
    }

    #[test]
    fn test_validate_rejects_vat_above_limit() {
        let mut request = QuoteRequest::default();
        request.financial.vat_percent = 21.0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nan_hours() {
        let mut request = QuoteRequest::default();
        request.labor.rod = f64::NAN;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_infinite_values() {
        let mut request = QuoteRequest::default();
        request.quantities.pipe_length_m = f64::INFINITY;
        let err = request.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid parameter: pipe length must be a finite number"
        );

        let mut request = QuoteRequest::default();
        request.financial.usd_rate = f64::INFINITY;
        assert!(request.validate().is_err());

        let mut request = QuoteRequest::default();
        request.labor.liner = f64::INFINITY;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_labor_total() {
        assert_eq!(LaborHours::default().total(), 14.0);
    }
}
