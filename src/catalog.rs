//! Material price list: import, manual edits and category lookup

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::{info, warn};

use crate::error::{QuoteError, Result};
use crate::import::Table;
use crate::models::{Category, MaterialDraft, MaterialRecord};

pub const NAME_COLUMN: &str = "MaterialName";
pub const COST_COLUMN: &str = "Cost";
pub const UNITS_COLUMN: &str = "Units";
pub const LAST_UPDATED_COLUMN: &str = "LastUpdated";

/// Columns an imported price list must carry
pub const REQUIRED_COLUMNS: [&str; 3] = [NAME_COLUMN, COST_COLUMN, UNITS_COLUMN];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceCatalog {
    rows: Vec<MaterialRecord>,
}

impl PriceCatalog {
    pub fn new(rows: Vec<MaterialRecord>) -> Self {
        Self { rows }
    }

    /// Built-in price list used when no file has been imported
    pub fn with_defaults(today: NaiveDate) -> Self {
        let items: [(&str, f64); 9] = [
            ("Pipe E355 40x50", 5400.0),
            ("Rod 42CrMo4 ⌀20", 9200.0),
            ("Round-stock 45 ⌀40", 2000.0),
            ("Round-stock 45 ⌀50", 2500.0),
            ("Round-stock 45 ⌀60", 3000.0),
            ("Round-stock 45 ⌀70", 3500.0),
            ("Round-stock 45 ⌀80", 4000.0),
            ("Round-stock 45 ⌀90", 4500.0),
            ("Round-stock 45 ⌀100", 5000.0),
        ];

        let rows = items
            .iter()
            .map(|(name, cost)| MaterialRecord {
                name: name.to_string(),
                cost: *cost,
                unit: "m".to_string(),
                last_updated: today,
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[MaterialRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Current rows in editable form
    pub fn drafts(&self) -> Vec<MaterialDraft> {
        self.rows.iter().map(MaterialDraft::from).collect()
    }

    /// Replace the whole catalog with imported tabular data
    ///
    /// Fails without touching the current rows if a required column is
    /// missing or a cell cannot be read. Rows without a `LastUpdated`
    /// value are stamped with `today`. Returns the new row count.
    pub fn replace(&mut self, table: &Table, today: NaiveDate) -> Result<usize> {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| table.column(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            warn!(missing = ?missing, "Rejected price list import");
            return Err(QuoteError::MissingColumns(missing));
        }

        let name_idx = table.column(NAME_COLUMN).unwrap_or_default();
        let cost_idx = table.column(COST_COLUMN).unwrap_or_default();
        let unit_idx = table.column(UNITS_COLUMN).unwrap_or_default();
        let date_idx = table.column(LAST_UPDATED_COLUMN);

        let mut rows = Vec::with_capacity(table.rows.len());
        for (i, raw) in table.rows.iter().enumerate() {
            if raw.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            let row = i + 1;

            let cost_text = cell(raw, cost_idx);
            let cost = parse_cost(cost_text).ok_or_else(|| QuoteError::InvalidField {
                row,
                column: COST_COLUMN,
                value: cost_text.to_string(),
            })?;

            let last_updated = match date_idx.map(|idx| cell(raw, idx).trim()) {
                Some(text) if !text.is_empty() => {
                    parse_date(text).ok_or_else(|| QuoteError::InvalidField {
                        row,
                        column: LAST_UPDATED_COLUMN,
                        value: text.to_string(),
                    })?
                }
                _ => today,
            };

            rows.push(MaterialRecord {
                name: cell(raw, name_idx).trim().to_string(),
                cost,
                unit: cell(raw, unit_idx).trim().to_string(),
                last_updated,
            });
        }

        info!(rows = rows.len(), "Replaced price list");
        self.rows = rows;
        Ok(self.rows.len())
    }

    /// Apply an edited copy of the catalog
    ///
    /// Rows are compared by position. A row whose name, cost or unit
    /// differs from the current row at the same position, or that has no
    /// counterpart, gets `today` as its date; unchanged rows keep theirs.
    /// Returns the number of stamped rows.
    pub fn apply_edits(&mut self, new_rows: Vec<MaterialDraft>, today: NaiveDate) -> usize {
        let mut changed = 0;
        let rows: Vec<MaterialRecord> = new_rows
            .into_iter()
            .enumerate()
            .map(|(i, draft)| {
                let unchanged = self.rows.get(i).filter(|current| {
                    current.name == draft.name
                        && current.cost == draft.cost
                        && current.unit == draft.unit
                });
                let last_updated = match unchanged {
                    Some(current) => current.last_updated,
                    None => {
                        changed += 1;
                        today
                    }
                };
                MaterialRecord {
                    name: draft.name,
                    cost: draft.cost,
                    unit: draft.unit,
                    last_updated,
                }
            })
            .collect();

        info!(rows = rows.len(), changed, "Saved price list edits");
        self.rows = rows;
        changed
    }

    /// Delete the first row with this name, leaving other rows' dates alone
    pub fn remove(&mut self, name: &str) -> Result<MaterialRecord> {
        let idx = self
            .rows
            .iter()
            .position(|r| r.name == name)
            .ok_or_else(|| QuoteError::UnknownMaterial(name.to_string()))?;
        info!(material = name, "Removed material");
        Ok(self.rows.remove(idx))
    }

    /// Case-insensitive substring match on material names
    pub fn filter_by_keyword(&self, keyword: &str) -> Vec<&MaterialRecord> {
        let needle = keyword.to_lowercase();
        self.rows
            .iter()
            .filter(|r| r.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Rows matching `keyword`, or every row when there is none
    pub fn matching(&self, keyword: Option<&str>) -> Vec<&MaterialRecord> {
        match keyword {
            Some(k) => self.filter_by_keyword(k),
            None => self.rows.iter().collect(),
        }
    }
}

/// All materials of a category, in catalog order
///
/// Round stock is ordered by diameter so the thinnest bar comes first.
pub fn resolve_category(catalog: &PriceCatalog, category: Category) -> Vec<&MaterialRecord> {
    let keywords = category.keywords();
    let matches: Vec<&MaterialRecord> = catalog
        .rows()
        .iter()
        .filter(|r| {
            let name = r.name.to_lowercase();
            keywords.iter().any(|k| name.contains(k))
        })
        .collect();

    match category {
        Category::RoundStock => sorted_by_diameter(matches),
        _ => matches,
    }
}

/// Order rows by ascending diameter
///
/// Rows whose name has no diameter go last, keeping their relative order.
pub fn sorted_by_diameter(rows: Vec<&MaterialRecord>) -> Vec<&MaterialRecord> {
    let mut keyed: Vec<(Option<u32>, &MaterialRecord)> = rows
        .into_iter()
        .map(|r| {
            let diameter = extract_diameter(&r.name);
            if diameter.is_none() {
                warn!(material = %r.name, "No diameter in material name");
            }
            (diameter, r)
        })
        .collect();

    keyed.sort_by_key(|(diameter, _)| (diameter.is_none(), diameter.unwrap_or_default()));
    keyed.into_iter().map(|(_, r)| r).collect()
}

/// Diameter in mm from names like "Round-stock 45 ⌀80"
pub fn extract_diameter(name: &str) -> Option<u32> {
    let re = Regex::new(r"[⌀Øø](\d+)").ok()?;
    let cap = re.captures(name)?;
    cap[1].parse().ok()
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Accepts "5400", "5400.5", "5 400,5" and similar spreadsheet renderings
pub(crate) fn parse_cost(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
                .map(|dt| dt.date())
        })
}
