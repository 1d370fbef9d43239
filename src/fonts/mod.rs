//! Font loading for the report generator.
//!
//! The report is typeset with a single regular font shipped under the static root.  A bold cut is
//! picked up for titles when it is present next to it; otherwise the regular face stands in for
//! every style of the family.

use std::io;
use std::path::Path;

use genpdf::error::Error;
use genpdf::fonts::{FontData, FontFamily};
use log::{debug, warn};

use crate::config::ReportConfig;

const REPORT_FONT_FAMILY_NAME: &str = "Roboto";

fn load_font(path: &Path, style: &str) -> Result<FontData, Error> {
    if !path.is_file() {
        return Err(Error::new(
            format!(
                "{} {} font missing at {}",
                REPORT_FONT_FAMILY_NAME,
                style,
                path.display()
            ),
            io::Error::new(io::ErrorKind::NotFound, "report font not found"),
        ));
    }

    FontData::load(path, None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load {} {} font from {}: {}",
                REPORT_FONT_FAMILY_NAME,
                style,
                path.display(),
                err
            ),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

fn load_optional_bold(path: &Path) -> Option<FontData> {
    if !path.is_file() {
        debug!(
            "No bold font at {}; titles use the regular face",
            path.display()
        );
        return None;
    }

    match load_font(path, "bold") {
        Ok(font) => Some(font),
        Err(err) => {
            warn!("Ignoring unusable bold font: {}", err);
            None
        }
    }
}

/// Loads the report font family from the static root of `config`.
///
/// The regular font is mandatory; its absence is returned as an error so the caller can refuse to
/// start.
pub fn report_font_family(config: &ReportConfig) -> Result<FontFamily<FontData>, Error> {
    let regular = load_font(&config.regular_font(), "regular")?;
    let bold = load_optional_bold(&config.bold_font()).unwrap_or_else(|| regular.clone());

    Ok(FontFamily {
        italic: regular.clone(),
        bold_italic: bold.clone(),
        regular,
        bold,
    })
}

/// Indicates whether the mandatory report font is present under the configured static root.
pub fn report_font_available(config: &ReportConfig) -> bool {
    config.regular_font().is_file()
}
