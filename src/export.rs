//! CSV downloads for quotes and the price list
//!
//! Every file starts with a UTF-8 byte-order mark so spreadsheet tools
//! open Cyrillic material names correctly.

use chrono::NaiveDateTime;

use crate::catalog::{COST_COLUMN, LAST_UPDATED_COLUMN, NAME_COLUMN, UNITS_COLUMN};
use crate::error::Result;
use crate::models::{MaterialRecord, Quote};

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const QUOTE_COLUMNS: [&str; 4] = ["Position", "CostLocal", "CostUsd", "LastUpdatedDate"];

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Serialize a header and rows as BOM-prefixed CSV
pub(crate) fn write_csv(headers: &[&str], records: Vec<Vec<String>>) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(headers)?;
    for record in records {
        writer.write_record(&record)?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(bytes)
}

/// Cost lines of one quote: pipe, rod, piston, labor and total
pub fn quote_csv(quote: &Quote) -> Result<Vec<u8>> {
    let usd_rate = quote.request.financial.usd_rate;
    let r = &quote.result;

    let material_line = |position: &str, cost: f64, material: &MaterialRecord| {
        vec![
            position.to_string(),
            cost.to_string(),
            (cost / usd_rate).to_string(),
            material.last_updated.format(DATE_FORMAT).to_string(),
        ]
    };

    let records = vec![
        material_line("Pipe", r.pipe_cost, &quote.pipe),
        material_line("Rod", r.rod_cost, &quote.rod),
        material_line("Piston", r.piston_cost, &quote.round_stock),
        vec![
            "Labor".to_string(),
            r.labor_cost.to_string(),
            (r.labor_cost / usd_rate).to_string(),
            "-".to_string(),
        ],
        vec![
            "Total".to_string(),
            r.final_price_local.to_string(),
            r.final_price_usd.to_string(),
            "-".to_string(),
        ],
    ];

    write_csv(&QUOTE_COLUMNS, records)
}

/// Download name for a quote, falling back to the calculation time
pub fn quote_file_name(job_order: &str, at: NaiveDateTime) -> String {
    let job_order = job_order.trim();
    if job_order.is_empty() {
        format!("repair_{}.csv", at.format("%Y%m%d_%H%M"))
    } else {
        format!("repair_{}.csv", job_order)
    }
}

/// The price list in the same layout the importer reads
pub fn catalog_csv(rows: &[&MaterialRecord]) -> Result<Vec<u8>> {
    let records = rows
        .iter()
        .map(|r| {
            vec![
                r.name.clone(),
                r.cost.to_string(),
                r.unit.clone(),
                r.last_updated.format(DATE_FORMAT).to_string(),
            ]
        })
        .collect();

    write_csv(
        &[NAME_COLUMN, COST_COLUMN, UNITS_COLUMN, LAST_UPDATED_COLUMN],
        records,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PriceCatalog;
    use crate::import::parse_csv;
    use chrono::NaiveDate;

    #[test]
    fn test_catalog_csv_starts_with_bom_and_reimports() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let mut catalog = PriceCatalog::with_defaults(today);
        let mut drafts = catalog.drafts();
        drafts[0].name = "Труба E355 40x50".to_string();
        catalog.apply_edits(drafts, today);

        let bytes = catalog_csv(&catalog.matching(None)).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes).unwrap();
        let table = parse_csv(&text).unwrap();
        let mut reloaded = PriceCatalog::default();
        reloaded.replace(&table, NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()).unwrap();
        assert_eq!(reloaded, catalog);
    }

    #[test]
    fn test_catalog_csv_writes_only_given_rows() {
        let catalog = PriceCatalog::with_defaults(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        let bytes = catalog_csv(&catalog.matching(Some("pipe"))).unwrap();

        let text = String::from_utf8(bytes).unwrap();
        let table = parse_csv(&text).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][0], "Pipe E355 40x50");
    }

    #[test]
    fn test_quote_file_name() {
        let at = NaiveDate::from_ymd_opt(2024, 5, 2)
            .unwrap()
            .and_hms_opt(14, 7, 0)
            .unwrap();
        assert_eq!(quote_file_name("JO-15", at), "repair_JO-15.csv");
        assert_eq!(quote_file_name("  ", at), "repair_20240502_1407.csv");
    }
}
