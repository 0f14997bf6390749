//! One operator session: the price list, the repair log and the last quote

use std::path::Path;

use chrono::{Local, NaiveDateTime};
use tracing::info;

use crate::catalog::{PriceCatalog, resolve_category};
use crate::error::{QuoteError, Result};
use crate::history::RepairHistory;
use crate::import::{Table, read_table};
use crate::models::{Category, HistoryEntry, MaterialDraft, MaterialRecord, Quote, QuoteRequest};
use crate::pricing::{MaterialSelection, calculate_quote};

/// State owned by a single interactive session
///
/// Nothing here outlives the process; a new session starts from the
/// catalog it is constructed with and an empty history.
#[derive(Debug, Clone, Default)]
pub struct Session {
    catalog: PriceCatalog,
    history: RepairHistory,
    last_upload: Option<NaiveDateTime>,
    last_quote: Option<Quote>,
}

impl Session {
    pub fn new(catalog: PriceCatalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    pub fn catalog(&self) -> &PriceCatalog {
        &self.catalog
    }

    pub fn history(&self) -> &RepairHistory {
        &self.history
    }

    /// When the price list was last replaced from a file
    pub fn last_upload(&self) -> Option<NaiveDateTime> {
        self.last_upload
    }

    pub fn last_quote(&self) -> Option<&Quote> {
        self.last_quote.as_ref()
    }

    /// Replace the price list from a CSV or spreadsheet file
    pub fn import_file(&mut self, path: &Path) -> Result<usize> {
        let table = read_table(path)?;
        self.import_table_at(&table, Local::now().naive_local())
    }

    pub fn import_table_at(&mut self, table: &Table, now: NaiveDateTime) -> Result<usize> {
        let rows = self.catalog.replace(table, now.date())?;
        self.last_upload = Some(now);
        Ok(rows)
    }

    /// Save an edited copy of the price list, stamping changed rows today
    pub fn save_edits(&mut self, rows: Vec<MaterialDraft>) -> usize {
        self.catalog.apply_edits(rows, Local::now().date_naive())
    }

    pub fn remove_material(&mut self, name: &str) -> Result<MaterialRecord> {
        self.catalog.remove(name)
    }

    /// Resolve the request's materials against the catalog
    ///
    /// A named material must belong to its category. An unnamed one
    /// defaults to the first candidate; an empty category stays unresolved.
    pub fn select(&self, request: &QuoteRequest) -> Result<MaterialSelection<'_>> {
        Ok(MaterialSelection {
            pipe: self.pick(Category::Pipe, request.pipe.as_deref())?,
            rod: self.pick(Category::Rod, request.rod.as_deref())?,
            round_stock: self.pick(Category::RoundStock, request.round_stock.as_deref())?,
        })
    }

    fn pick(&self, category: Category, name: Option<&str>) -> Result<Option<&MaterialRecord>> {
        let candidates = resolve_category(&self.catalog, category);
        match name {
            Some(name) => candidates
                .into_iter()
                .find(|r| r.name == name)
                .map(Some)
                .ok_or_else(|| QuoteError::UnknownMaterial(format!("{} ({})", name, category))),
            None => Ok(candidates.into_iter().next()),
        }
    }

    /// Price a repair and record it in the history
    pub fn calculate(&mut self, request: &QuoteRequest) -> Result<Quote> {
        self.calculate_at(request, Local::now().naive_local())
    }

    /// Like [`Session::calculate`] with an explicit timestamp
    ///
    /// The history is only touched when the whole calculation succeeds.
    pub fn calculate_at(&mut self, request: &QuoteRequest, now: NaiveDateTime) -> Result<Quote> {
        request.validate()?;

        let selection = self.select(request)?;
        let (pipe, rod, round_stock) = selection.resolve()?;
        let result = calculate_quote(
            &selection,
            &request.quantities,
            &request.labor,
            &request.financial,
        )?;

        let quote = Quote {
            request: request.clone(),
            pipe: pipe.clone(),
            rod: rod.clone(),
            round_stock: round_stock.clone(),
            result,
        };

        self.history
            .append(HistoryEntry::new(now, &request.job, &quote.result));
        info!(entries = self.history.len(), "Quote calculated");
        self.last_quote = Some(quote.clone());
        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 2)
            .unwrap()
            .and_hms_opt(11, 15, 0)
            .unwrap()
    }

    fn session() -> Session {
        Session::new(PriceCatalog::with_defaults(now().date()))
    }

    #[test]
    fn test_calculate_appends_one_entry() {
        let mut session = session();
        let request = QuoteRequest::default();

        session.calculate_at(&request, now()).unwrap();
        session.calculate_at(&request, now()).unwrap();

        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history().all()[0], session.history().all()[1]);
        assert!(session.last_quote().is_some());
    }

    #[test]
    fn test_default_selection_takes_thinnest_round_stock() {
        let session = session();
        let selection = session.select(&QuoteRequest::default()).unwrap();
        assert_eq!(selection.round_stock.unwrap().name, "Round-stock 45 ⌀40");
        assert_eq!(selection.pipe.unwrap().name, "Pipe E355 40x50");
    }

    #[test]
    fn test_named_material_must_match_category() {
        let mut session = session();
        let request = QuoteRequest {
            pipe: Some("Rod 42CrMo4 ⌀20".to_string()),
            ..QuoteRequest::default()
        };

        let err = session.calculate_at(&request, now()).unwrap_err();
        assert!(matches!(err, QuoteError::UnknownMaterial(_)));
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_missing_category_blocks_calculation() {
        let mut session = session();
        session.remove_material("Rod 42CrMo4 ⌀20").unwrap();

        let err = session
            .calculate_at(&QuoteRequest::default(), now())
            .unwrap_err();
        assert!(matches!(err, QuoteError::MissingSelection(Category::Rod)));
        assert!(session.history().is_empty());
        assert!(session.last_quote().is_none());
    }

    #[test]
    fn test_invalid_parameters_block_calculation() {
        let mut session = session();
        let mut request = QuoteRequest::default();
        request.financial.usd_rate = 0.5;

        assert!(session.calculate_at(&request, now()).is_err());
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_import_records_upload_time() {
        let mut session = session();
        let table = Table {
            headers: vec!["MaterialName".into(), "Cost".into(), "Units".into()],
            rows: vec![vec!["Pipe X".into(), "100".into(), "m".into()]],
        };

        assert_eq!(session.import_table_at(&table, now()).unwrap(), 1);
        assert_eq!(session.last_upload(), Some(now()));
        assert_eq!(session.catalog().rows()[0].last_updated, now().date());
    }

    #[test]
    fn test_failed_import_keeps_upload_time_unset() {
        let mut session = session();
        let table = Table {
            headers: vec!["MaterialName".into()],
            rows: vec![],
        };

        assert!(session.import_table_at(&table, now()).is_err());
        assert_eq!(session.last_upload(), None);
        assert_eq!(session.catalog().len(), 9);
    }
}
