//! Error types for catalog, pricing and export operations

use thiserror::Error;

use crate::models::Category;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("No {0} material selected")]
    MissingSelection(Category),

    #[error("Unknown material: {0}")]
    UnknownMaterial(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Row {row}: invalid {column} value '{value}'")]
    InvalidField {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, QuoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_lists_every_name() {
        let err = QuoteError::MissingColumns(vec!["Cost".into(), "Units".into()]);
        assert_eq!(err.to_string(), "Missing columns: Cost, Units");
    }

    #[test]
    fn test_missing_selection_names_category() {
        let err = QuoteError::MissingSelection(Category::RoundStock);
        assert_eq!(err.to_string(), "No round-stock material selected");
    }
}
