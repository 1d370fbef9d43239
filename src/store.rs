//! Read access to logbook records.
//!
//! Records are created and edited elsewhere; the report only needs to fetch one logbook with its
//! complete year/week/task tree.  [`JsonRecordStore`] reads such trees from a JSON export.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::error::{ReportError, StoreError};
use crate::model::{Logbook, LogbookId};

/// Source of fully materialized logbooks.
pub trait RecordStore {
    /// Fetches the logbook with the given id together with all of its descendants.
    ///
    /// Years, weeks and tasks are returned ordered by their keys.
    fn logbook(&self, id: LogbookId) -> Result<Logbook, ReportError>;

    /// Lists the ids of all stored logbooks in ascending order.
    fn logbook_ids(&self) -> Vec<LogbookId>;
}

#[derive(Deserialize)]
struct StoreDocument {
    logbooks: Vec<Logbook>,
}

/// Record store backed by a JSON document of the form `{"logbooks": [...]}`.
///
/// Every logbook is validated and its children sorted while loading, so lookups hand out
/// ready-to-render trees.
#[derive(Clone, Debug, Default)]
pub struct JsonRecordStore {
    logbooks: BTreeMap<LogbookId, Logbook>,
}

impl JsonRecordStore {
    /// Parses a store from JSON text.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let document: StoreDocument = serde_json::from_str(json)?;
        Self::from_logbooks(document.logbooks)
    }

    /// Reads and parses the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let store = Self::from_json(&json)?;
        debug!(
            "Loaded {} logbooks from {}",
            store.logbooks.len(),
            path.display()
        );
        Ok(store)
    }

    /// Builds a store from already constructed logbooks.
    ///
    /// A later logbook replaces an earlier one with the same id.
    pub fn from_logbooks(logbooks: impl IntoIterator<Item = Logbook>) -> Result<Self, StoreError> {
        let mut store = Self::default();
        for mut logbook in logbooks {
            logbook.validate()?;
            logbook.sort_children();
            store.logbooks.insert(logbook.id, logbook);
        }
        Ok(store)
    }
}

impl RecordStore for JsonRecordStore {
    fn logbook(&self, id: LogbookId) -> Result<Logbook, ReportError> {
        self.logbooks
            .get(&id)
            .cloned()
            .ok_or(ReportError::NotFound(id))
    }

    fn logbook_ids(&self) -> Vec<LogbookId> {
        self.logbooks.keys().copied().collect()
    }
}
