//! Reading price lists from CSV and spreadsheet files
//!
//! Produces a plain [`Table`] of strings; column validation and typing
//! happen in [`crate::catalog::PriceCatalog::replace`].

use std::fs;
use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Reader};
use tracing::{debug, info};

use crate::catalog::REQUIRED_COLUMNS;
use crate::error::{QuoteError, Result};

/// Untyped tabular data: a header row and string cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Index of a column by exact (trimmed) header name
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    fn has_required_columns(&self) -> bool {
        REQUIRED_COLUMNS.iter().all(|c| self.column(c).is_some())
    }
}

/// Load a price list file, picking the reader from the extension
pub fn read_table(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let table = match ext.as_str() {
        "csv" | "txt" => {
            let bytes = fs::read(path)?;
            let text = String::from_utf8(bytes).map_err(|e| {
                QuoteError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            })?;
            parse_csv(&text)?
        }
        "xlsx" | "xlsm" | "xls" | "ods" => read_spreadsheet(path)?,
        _ => return Err(QuoteError::UnsupportedFormat(path.display().to_string())),
    };

    info!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "Read price list file"
    );
    Ok(table)
}

/// Parse CSV text, comma-separated first and semicolon-separated second
///
/// The semicolon reading is used when the comma reading fails or lacks a
/// required column while the semicolon one has them all. Otherwise the
/// comma reading is returned so that validation can name the missing
/// columns.
pub fn parse_csv(text: &str) -> Result<Table> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let comma = parse_delimited(text, b',');
    if let Ok(table) = &comma {
        if table.has_required_columns() {
            return comma;
        }
    }

    debug!("Comma-separated reading incomplete, trying semicolons");
    match parse_delimited(text, b';') {
        Ok(table) if table.has_required_columns() => Ok(table),
        semicolon => match comma {
            Ok(table) => Ok(table),
            Err(_) => semicolon,
        },
    }
}

fn parse_delimited(text: &str, delimiter: u8) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table { headers, rows })
}

fn read_spreadsheet(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok(Table::default()),
    };

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header) => header.iter().map(|c| cell_text(c).trim().to_string()).collect(),
        None => return Ok(Table::default()),
    };
    let rows = rows.map(|r| r.iter().map(cell_text).collect()).collect();

    Ok(Table { headers, rows })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::DateTime(_) => cell
            .as_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_comma_csv() {
        let table = parse_csv("MaterialName,Cost,Units\nPipe A,100,m\n").unwrap();
        assert_eq!(table.headers, ["MaterialName", "Cost", "Units"]);
        assert_eq!(table.rows, vec![vec!["Pipe A", "100", "m"]]);
    }

    #[test]
    fn test_parse_semicolon_csv_with_decimal_comma() {
        let table = parse_csv("MaterialName;Cost;Units\nRod B;9200,5;m\n").unwrap();
        assert_eq!(table.column("Cost"), Some(1));
        assert_eq!(table.rows[0][1], "9200,5");
    }

    #[test]
    fn test_parse_strips_bom() {
        let table = parse_csv("\u{feff}MaterialName,Cost,Units\n").unwrap();
        assert_eq!(table.column("MaterialName"), Some(0));
    }

    #[test]
    fn test_incomplete_header_falls_back_to_comma_reading() {
        let table = parse_csv("MaterialName,Units\nPipe A,m\n").unwrap();
        assert_eq!(table.headers, ["MaterialName", "Units"]);
    }

    #[test]
    fn test_read_table_rejects_unknown_extension() {
        let err = read_table(Path::new("prices.json")).unwrap_err();
        assert!(matches!(err, QuoteError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_cell_text_renders_spreadsheet_values() {
        use calamine::{ExcelDateTime, ExcelDateTimeType};

        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("Pipe E355".into())), "Pipe E355");
        assert_eq!(cell_text(&Data::Float(5400.0)), "5400");
        assert_eq!(cell_text(&Data::Float(9200.5)), "9200.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");

        // 45306 is 2024-01-15 in the 1900 date system
        let serial = ExcelDateTime::new(45306.0, ExcelDateTimeType::DateTime, false);
        assert_eq!(cell_text(&Data::DateTime(serial)), "2024-01-15");
        assert_eq!(cell_text(&Data::DateTimeIso("2024-01-15".into())), "2024-01-15");
    }

    #[test]
    fn test_read_table_sends_spreadsheets_to_calamine() {
        for suffix in [".xlsx", ".ods", ".XLS"] {
            let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
            write!(file, "MaterialName,Cost,Units\nPipe A,100,m\n").unwrap();

            let err = read_table(file.path()).unwrap_err();
            assert!(matches!(err, QuoteError::Spreadsheet(_)), "{}: {:?}", suffix, err);
        }
    }

    #[test]
    fn test_read_table_from_csv_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "MaterialName;Cost;Units;LastUpdated\nТруба E355;5400;м;01.02.2024\n").unwrap();

        let table = read_table(file.path()).unwrap();
        assert_eq!(table.rows[0][0], "Труба E355");
        assert_eq!(table.column("LastUpdated"), Some(3));
    }
}
