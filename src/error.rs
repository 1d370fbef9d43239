//! Error types shared across the crate.

use thiserror::Error;

use crate::model::{LogbookId, ValidationError};

/// Failures while loading records or producing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The mandatory font could not be loaded; no report can be typeset.
    #[error("failed to load report font: {0}")]
    FontLoad(#[source] genpdf::error::Error),
    /// `genpdf` failed while laying out or writing the document.
    #[error("failed to render logbook {logbook}: {source}")]
    Render {
        logbook: LogbookId,
        #[source]
        source: genpdf::error::Error,
    },
    /// The requested logbook does not exist.
    #[error("logbook {0} not found")]
    NotFound(LogbookId),
    /// The record store could not be read.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The apprenticeship year cannot be placed on the calendar.
    #[error("year {year_number} of an apprenticeship starting in {start_year} has no calendar date")]
    Calendar { start_year: i32, year_number: u8 },
}

/// Failures while reading a record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read record store {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse record store: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid record: {0}")]
    Invalid(#[from] ValidationError),
}
