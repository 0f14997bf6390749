//! Human-readable quote breakdown
//!
//! Values are rounded here for display only; the stored quote keeps full
//! precision.

use std::fmt;

use crate::catalog::extract_diameter;
use crate::history::RepairHistory;
use crate::models::{MaterialRecord, Quote};

pub struct QuoteReport<'a>(pub &'a Quote);

impl fmt::Display for QuoteReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quote = self.0;
        let q = &quote.request.quantities;
        let fin = &quote.request.financial;
        let r = &quote.result;

        writeln!(f, "=== Repair Quote ===")?;
        if !quote.request.job.job_order.is_empty() {
            writeln!(f, "Job order: {}", quote.request.job.job_order)?;
        }
        writeln!(f)?;

        writeln!(f, "Materials:")?;
        write_material(f, &quote.pipe, &format!("{} m", q.pipe_length_m), r.pipe_cost)?;
        write_material(f, &quote.rod, &format!("{} m", q.rod_length_m), r.rod_cost)?;
        let diameter = extract_diameter(&quote.round_stock.name)
            .map(|d| format!("{} mm", d))
            .unwrap_or_else(|| "unknown".to_string());
        write_material(
            f,
            &quote.round_stock,
            &format!(
                "{} mm x {} pcs, diameter {}",
                q.piston_length_mm, q.piston_quantity, diameter
            ),
            r.piston_cost,
        )?;
        writeln!(f, "  Materials total: {:.0}", r.materials_cost)?;
        writeln!(f)?;

        writeln!(f, "Labor:")?;
        writeln!(f, "  Hours: {:.1} h", r.labor_hours)?;
        writeln!(f, "  Rate:  {} /h", fin.workshop_rate)?;
        writeln!(f, "  Cost:  {:.0}", r.labor_cost)?;
        writeln!(f)?;

        writeln!(f, "Final:")?;
        writeln!(f, "  Cost price:     {:.0}", r.subtotal)?;
        writeln!(
            f,
            "  + Margin {}%:   x{:.2}",
            fin.margin_percent,
            1.0 + fin.margin_percent / 100.0
        )?;
        writeln!(
            f,
            "  + VAT {}%:      x{:.2}",
            fin.vat_percent,
            1.0 + fin.vat_percent / 100.0
        )?;
        writeln!(
            f,
            "  Total:          {:.0} = {:.2} USD",
            r.final_price_local, r.final_price_usd
        )?;

        Ok(())
    }
}

fn write_material(
    f: &mut fmt::Formatter<'_>,
    material: &MaterialRecord,
    amount: &str,
    cost: f64,
) -> fmt::Result {
    writeln!(
        f,
        "  {:<28} {:<32} {:>10} /{:<3} {:>12.0}",
        material.name, amount, material.cost, material.unit, cost
    )
}

/// Price list rows for the terminal
pub struct CatalogReport<'a>(pub &'a [&'a MaterialRecord]);

impl fmt::Display for CatalogReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<32} {:>10} {:<6} {:<10}", "Material", "Cost", "Unit", "Updated")?;
        writeln!(f, "{}", "-".repeat(61))?;
        for r in self.0 {
            writeln!(
                f,
                "{:<32} {:>10.0} {:<6} {}",
                r.name,
                r.cost,
                r.unit,
                r.last_updated.format("%d.%m.%Y")
            )?;
        }
        Ok(())
    }
}

/// Table of past quotes for the terminal
pub struct HistoryReport<'a>(pub &'a RepairHistory);

impl fmt::Display for HistoryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<17} {:<12} {:<14} {:>12} {:>12} {:>14} {:>10}",
            "Date", "Job order", "Brand", "Materials", "Labor", "Total", "USD"
        )?;
        writeln!(f, "{}", "-".repeat(97))?;
        for e in self.0.all() {
            writeln!(
                f,
                "{:<17} {:<12} {:<14} {:>12.0} {:>12.0} {:>14.0} {:>10.2}",
                e.timestamp.format("%d.%m.%Y %H:%M"),
                e.job.job_order,
                e.job.brand,
                e.materials_cost,
                e.labor_cost,
                e.final_price_local,
                e.final_price_usd
            )?;
        }
        Ok(())
    }
}
