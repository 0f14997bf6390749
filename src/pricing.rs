//! Repair cost calculation

use tracing::debug;

use crate::error::{QuoteError, Result};
use crate::models::{Category, FinancialParams, LaborHours, MaterialRecord, QuoteResult, Quantities};

/// The three materials a repair consumes, each possibly unresolved
#[derive(Debug, Clone, Copy)]
pub struct MaterialSelection<'a> {
    pub pipe: Option<&'a MaterialRecord>,
    pub rod: Option<&'a MaterialRecord>,
    pub round_stock: Option<&'a MaterialRecord>,
}

impl<'a> MaterialSelection<'a> {
    /// The pipe, rod and round stock, or the first category left unresolved
    pub fn resolve(&self) -> Result<(&'a MaterialRecord, &'a MaterialRecord, &'a MaterialRecord)> {
        let pipe = self.pipe.ok_or(QuoteError::MissingSelection(Category::Pipe))?;
        let rod = self.rod.ok_or(QuoteError::MissingSelection(Category::Rod))?;
        let round_stock = self
            .round_stock
            .ok_or(QuoteError::MissingSelection(Category::RoundStock))?;
        Ok((pipe, rod, round_stock))
    }
}

/// Price a repair job
///
/// Margin is applied to the cost subtotal first, VAT on top of the
/// margined price. Nothing is rounded.
pub fn calculate_quote(
    selection: &MaterialSelection<'_>,
    quantities: &Quantities,
    labor: &LaborHours,
    financial: &FinancialParams,
) -> Result<QuoteResult> {
    let (pipe, rod, round_stock) = selection.resolve()?;

    if financial.usd_rate.is_nan() || financial.usd_rate <= 0.0 {
        return Err(QuoteError::InvalidParameter(format!(
            "USD rate must be positive, got {}",
            financial.usd_rate
        )));
    }

    let pipe_cost = pipe.cost * quantities.pipe_length_m;
    let rod_cost = rod.cost * quantities.rod_length_m;
    // round stock is priced per meter, piston length comes in mm
    let piston_cost =
        round_stock.cost * (quantities.piston_length_mm / 1000.0) * f64::from(quantities.piston_quantity);
    let materials_cost = pipe_cost + rod_cost + piston_cost;

    let labor_hours = labor.total();
    let labor_cost = labor_hours * financial.workshop_rate;

    let subtotal = materials_cost + labor_cost;
    let price_with_margin = subtotal * (1.0 + financial.margin_percent / 100.0);
    let final_price_local = price_with_margin * (1.0 + financial.vat_percent / 100.0);
    let final_price_usd = final_price_local / financial.usd_rate;

    debug!(
        materials_cost,
        labor_cost, subtotal, final_price_local, final_price_usd, "Calculated quote"
    );

    Ok(QuoteResult {
        pipe_cost,
        rod_cost,
        piston_cost,
        materials_cost,
        labor_hours,
        labor_cost,
        subtotal,
        price_with_margin,
        final_price_local,
        final_price_usd,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn material(name: &str, cost: f64) -> MaterialRecord {
        MaterialRecord {
            name: name.to_string(),
            cost,
            unit: "m".to_string(),
            last_updated: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_end_to_end_example() {
        let pipe = material("Pipe", 5400.0);
        let rod = material("Rod", 9200.0);
        let stock = material("Round-stock ⌀60", 3000.0);
        let selection = MaterialSelection {
            pipe: Some(&pipe),
            rod: Some(&rod),
            round_stock: Some(&stock),
        };
        let quantities = Quantities {
            pipe_length_m: 2.0,
            rod_length_m: 1.5,
            piston_length_mm: 150.0,
            piston_quantity: 3,
        };

        let result = calculate_quote(
            &selection,
            &quantities,
            &LaborHours::default(),
            &FinancialParams::default(),
        )
        .unwrap();

        assert!(close(result.pipe_cost, 10800.0));
        assert!(close(result.rod_cost, 13800.0));
        assert!(close(result.piston_cost, 1350.0));
        assert!(close(result.materials_cost, 25950.0));
        assert!(close(result.labor_hours, 14.0));
        assert!(close(result.labor_cost, 70000.0));
        assert!(close(result.subtotal, 95950.0));
        assert!(close(result.price_with_margin, 119937.5));
        assert!(close(result.final_price_local, 134330.0));
        assert!((result.final_price_usd - 298.51).abs() < 0.005);
    }

    #[test]
    fn test_piston_length_converted_to_meters() {
        let pipe = material("Pipe", 0.0);
        let rod = material("Rod", 0.0);
        let stock = material("Round-stock ⌀40", 2000.0);
        let selection = MaterialSelection {
            pipe: Some(&pipe),
            rod: Some(&rod),
            round_stock: Some(&stock),
        };
        let quantities = Quantities {
            piston_length_mm: 100.0,
            piston_quantity: 2,
            ..Quantities::default()
        };

        let result = calculate_quote(
            &selection,
            &quantities,
            &LaborHours::default(),
            &FinancialParams::default(),
        )
        .unwrap();
        assert!(close(result.piston_cost, 400.0));
    }

    #[test]
    fn test_pipe_cost_scales_with_length() {
        let pipe = material("Pipe", 5400.0);
        let rod = material("Rod", 9200.0);
        let stock = material("Round-stock ⌀40", 2000.0);
        let selection = MaterialSelection {
            pipe: Some(&pipe),
            rod: Some(&rod),
            round_stock: Some(&stock),
        };

        for length in [0.1, 0.75, 1.0, 3.3] {
            let single = Quantities {
                pipe_length_m: length,
                ..Quantities::default()
            };
            let double = Quantities {
                pipe_length_m: length * 2.0,
                ..Quantities::default()
            };
            let labor = LaborHours::default();
            let financial = FinancialParams::default();
            let a = calculate_quote(&selection, &single, &labor, &financial).unwrap();
            let b = calculate_quote(&selection, &double, &labor, &financial).unwrap();
            assert!(close(b.pipe_cost, a.pipe_cost * 2.0));
            assert!(close(a.pipe_cost, 5400.0 * length));
        }
    }

    #[test]
    fn test_missing_selection() {
        let pipe = material("Pipe", 5400.0);
        let stock = material("Round-stock ⌀40", 2000.0);
        let selection = MaterialSelection {
            pipe: Some(&pipe),
            rod: None,
            round_stock: Some(&stock),
        };

        let err = calculate_quote(
            &selection,
            &Quantities::default(),
            &LaborHours::default(),
            &FinancialParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, QuoteError::MissingSelection(Category::Rod)));
    }

    #[test]
    fn test_resolve_reports_first_unresolved_category() {
        let rod = material("Rod", 9200.0);
        let selection = MaterialSelection {
            pipe: None,
            rod: Some(&rod),
            round_stock: None,
        };
        assert!(matches!(
            selection.resolve(),
            Err(QuoteError::MissingSelection(Category::Pipe))
        ));

        let pipe = material("Pipe", 5400.0);
        let stock = material("Round-stock ⌀40", 2000.0);
        let selection = MaterialSelection {
            pipe: Some(&pipe),
            rod: Some(&rod),
            round_stock: Some(&stock),
        };
        let (p, r, s) = selection.resolve().unwrap();
        assert_eq!((p.cost, r.cost, s.cost), (5400.0, 9200.0, 2000.0));
    }

    #[test]
    fn test_zero_usd_rate_rejected() {
        let m = material("Any", 1.0);
        let selection = MaterialSelection {
            pipe: Some(&m),
            rod: Some(&m),
            round_stock: Some(&m),
        };
        let financial = FinancialParams {
            usd_rate: 0.0,
            ..FinancialParams::default()
        };

        let result = calculate_quote(
            &selection,
            &Quantities::default(),
            &LaborHours::default(),
            &financial,
        );
        assert!(matches!(result, Err(QuoteError::InvalidParameter(_))));
    }
}
