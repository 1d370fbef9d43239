//! PDF reports for German apprenticeship training logbooks ("Berichtsheft").
//!
//! A [`model::Logbook`] holds the apprenticeship years, their reported weeks and the tasks of each
//! week.  [`report::ReportGenerator`] turns a logbook into a paginated PDF: a cover page followed by
//! one page per week with the task table, the confirmation statement and the signature block.

pub mod builder;
pub mod calendar;
pub mod config;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod model;
pub mod normalize;
pub mod render;
pub mod report;
pub mod store;

pub use error::{ReportError, StoreError};
pub use report::{generate_logbook_pdf, render_logbook, LogbookPdf, ReportGenerator};
