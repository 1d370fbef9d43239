//! Static asset locations and the fixed report styling.

use std::env;
use std::path::{Path, PathBuf};

use genpdf::style::Color;
use genpdf::Margins;

/// Environment variable that overrides the static assets root.
pub const STATIC_ROOT_ENV: &str = "BERICHTSHEFT_STATIC_ROOT";

/// Static assets root used when neither a path nor the environment variable is given.
pub const DEFAULT_STATIC_ROOT: &str = "static";

/// Mandatory regular font, relative to the static root.
pub const REGULAR_FONT: &str = "fonts/Roboto-Regular.ttf";
/// Optional bold font used for titles, relative to the static root.
pub const BOLD_FONT: &str = "fonts/Roboto-Bold.ttf";
/// Optional company logo, relative to the static root.
pub const LOGO_IMAGE: &str = "images/logo.png";
/// Optional signature of the apprentice, relative to the static root.
pub const STUDENT_SIGNATURE_IMAGE: &str = "images/signature_student.png";
/// Optional signature of the trainer, relative to the static root.
pub const TRAINER_SIGNATURE_IMAGE: &str = "images/signature_trainer.png";

/// Location of the assets a report is typeset with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportConfig {
    static_root: PathBuf,
}

impl ReportConfig {
    /// Creates a configuration reading assets from `static_root`.
    pub fn new(static_root: impl Into<PathBuf>) -> Self {
        Self {
            static_root: static_root.into(),
        }
    }

    /// Resolves the static root from [`STATIC_ROOT_ENV`], falling back to [`DEFAULT_STATIC_ROOT`].
    pub fn from_env() -> Self {
        let root = env::var_os(STATIC_ROOT_ENV)
            .map(PathBuf::from)
            .filter(|path| !path.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_ROOT));
        Self::new(root)
    }

    /// Uses `explicit` when given and the environment otherwise.
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        explicit.map(Self::new).unwrap_or_else(Self::from_env)
    }

    pub fn static_root(&self) -> &Path {
        &self.static_root
    }

    pub fn regular_font(&self) -> PathBuf {
        self.static_root.join(REGULAR_FONT)
    }

    pub fn bold_font(&self) -> PathBuf {
        self.static_root.join(BOLD_FONT)
    }

    /// Returns the logo path if the file exists.
    pub fn logo(&self) -> Option<PathBuf> {
        self.optional_asset(LOGO_IMAGE)
    }

    /// Returns the apprentice signature path if the file exists.
    pub fn student_signature(&self) -> Option<PathBuf> {
        self.optional_asset(STUDENT_SIGNATURE_IMAGE)
    }

    /// Returns the trainer signature path if the file exists.
    pub fn trainer_signature(&self) -> Option<PathBuf> {
        self.optional_asset(TRAINER_SIGNATURE_IMAGE)
    }

    fn optional_asset(&self, relative: &str) -> Option<PathBuf> {
        let path = self.static_root.join(relative);
        path.is_file().then_some(path)
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Box an image is stretched into, in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageBox {
    pub width_mm: f64,
    pub height_mm: f64,
}

/// Typographic settings of the report.
///
/// Built once together with the generator and handed to every layout function; nothing in the
/// crate changes styles globally.
#[derive(Clone, Debug)]
pub struct ReportStyles {
    pub page_margins: Margins,
    pub footer_height_mm: f64,
    pub page_number_size: u8,
    pub base_size: u8,
    pub line_spacing: f64,

    pub cover_title_size: u8,
    pub cover_table_size: u8,
    pub cover_columns: [usize; 2],

    pub header_title_size: u8,
    pub header_row_size: u8,
    pub header_columns: [usize; 2],

    pub task_table_size: u8,
    pub task_columns: [usize; 2],
    pub section_shade: Color,

    pub disclaimer_size: u8,

    pub signature_date_size: u8,
    pub signature_caption_size: u8,
    pub signature_caption_color: Color,
    pub signature_rule_color: Color,
    pub signature_columns: [usize; 3],
    pub signature_date_columns: [usize; 2],

    pub rule_color: Color,
    pub cell_padding_mm: f64,

    pub logo: ImageBox,
    pub signature: ImageBox,
}

impl Default for ReportStyles {
    fn default() -> Self {
        Self {
            page_margins: Margins::trbl(21.2, 14.1, 21.2, 14.1),
            footer_height_mm: 10.0,
            page_number_size: 12,
            base_size: 10,
            line_spacing: 1.2,

            cover_title_size: 22,
            cover_table_size: 12,
            cover_columns: [2, 3],

            header_title_size: 18,
            header_row_size: 12,
            header_columns: [7, 3],

            task_table_size: 10,
            task_columns: [4, 1],
            section_shade: Color::Greyscale(211),

            disclaimer_size: 11,

            signature_date_size: 10,
            signature_caption_size: 11,
            signature_caption_color: Color::Greyscale(128),
            signature_rule_color: Color::Greyscale(128),
            signature_columns: [9, 2, 9],
            signature_date_columns: [3, 2],

            rule_color: Color::Greyscale(0),
            cell_padding_mm: 1.8,

            logo: ImageBox {
                width_mm: 52.9,
                height_mm: 14.1,
            },
            signature: ImageBox {
                width_mm: 42.3,
                height_mm: 10.6,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_optional_assets_resolve_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig::new(dir.path());
        assert_eq!(config.logo(), None);
        assert_eq!(config.student_signature(), None);
        assert_eq!(config.trainer_signature(), None);
    }

    #[test]
    fn present_assets_are_returned() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join(LOGO_IMAGE), b"not really a png").unwrap();

        let config = ReportConfig::new(dir.path());
        assert_eq!(config.logo(), Some(dir.path().join(LOGO_IMAGE)));
        assert_eq!(config.trainer_signature(), None);
    }

    #[test]
    fn explicit_root_wins_over_environment() {
        let config = ReportConfig::resolve(Some(PathBuf::from("/srv/berichtsheft/static")));
        assert_eq!(
            config.regular_font(),
            PathBuf::from("/srv/berichtsheft/static/fonts/Roboto-Regular.ttf")
        );
    }
}
