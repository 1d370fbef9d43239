//! The logbook report generator.
//!
//! A [`ReportGenerator`] is created once per process: it loads the font and fixes the styles up
//! front, so a missing font surfaces at startup instead of on the first request.  Generating a
//! report afterwards only reads the records and the optional images.

use genpdf::elements::Paragraph;
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::Style;
use genpdf::{Alignment, Element as _, PaperSize};
use log::{debug, info};

use crate::builder::DocumentBuilder;
use crate::config::{ReportConfig, ReportStyles};
use crate::error::ReportError;
use crate::fonts;
use crate::layout::{ReportLayout, COVER_TITLE};
use crate::model::{Logbook, LogbookId};
use crate::normalize::normalize_metadata;
use crate::render;
use crate::store::RecordStore;

/// Media type of generated reports.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Renders logbooks into PDF documents.
pub struct ReportGenerator {
    config: ReportConfig,
    styles: ReportStyles,
    font_family: FontFamily<FontData>,
}

impl ReportGenerator {
    /// Creates a generator with the default styles.
    pub fn new(config: ReportConfig) -> Result<Self, ReportError> {
        Self::with_styles(config, ReportStyles::default())
    }

    /// Creates a generator with custom styles.
    ///
    /// Fails with [`ReportError::FontLoad`] when the regular font is missing or unusable.
    pub fn with_styles(config: ReportConfig, styles: ReportStyles) -> Result<Self, ReportError> {
        let font_family = fonts::report_font_family(&config).map_err(ReportError::FontLoad)?;
        info!(
            "Report generator ready, assets under {}",
            config.static_root().display()
        );
        Ok(Self {
            config,
            styles,
            font_family,
        })
    }

    /// Lays out the report for `logbook` without rendering it.
    pub fn layout(&self, logbook: &Logbook) -> Result<ReportLayout, ReportError> {
        ReportLayout::build(logbook, &self.config)
    }

    /// Renders `logbook` into PDF bytes.
    ///
    /// The output depends only on the records and the asset files; generating the same logbook
    /// twice yields identical bytes.
    pub fn generate(&self, logbook: &Logbook) -> Result<Vec<u8>, ReportError> {
        let render_error = |source| ReportError::Render {
            logbook: logbook.id,
            source,
        };

        let layout = self.layout(logbook)?;
        debug!(
            "Rendering logbook {} with {} week pages",
            logbook.id,
            layout.weeks.len()
        );

        let page_number_size = self.styles.page_number_size;
        let mut document = DocumentBuilder::new(self.font_family.clone())
            .with_title(format!("{} {}", COVER_TITLE, logbook.student_name))
            .with_paper_size(PaperSize::A4)
            .with_margins(self.styles.page_margins)
            .with_font_size(self.styles.base_size)
            .with_line_spacing(self.styles.line_spacing)
            .with_footer(self.styles.footer_height_mm, move |page| {
                let label = if page > 1 {
                    page.to_string()
                } else {
                    String::new()
                };
                Paragraph::new(label)
                    .aligned(Alignment::Right)
                    .styled(Style::new().with_font_size(page_number_size))
            })
            .build();

        render::push_report(&mut document, &layout, &self.styles).map_err(render_error)?;

        let mut bytes = Vec::new();
        document.render(&mut bytes).map_err(render_error)?;
        normalize_metadata(&mut bytes);

        info!(
            "Rendered logbook {} ({} bytes)",
            logbook.id,
            bytes.len()
        );
        Ok(bytes)
    }
}

/// Renders `logbook` with `generator`.
pub fn generate_logbook_pdf(
    generator: &ReportGenerator,
    logbook: &Logbook,
) -> Result<Vec<u8>, ReportError> {
    generator.generate(logbook)
}

/// A rendered report ready to be served or saved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogbookPdf {
    pub bytes: Vec<u8>,
    pub filename: String,
}

impl LogbookPdf {
    pub fn content_type(&self) -> &'static str {
        PDF_CONTENT_TYPE
    }

    /// Value of the `Content-Disposition` header for inline display.
    pub fn content_disposition(&self) -> String {
        format!("inline; filename=\"{}\"", self.filename)
    }
}

/// File name a logbook report is offered under.
pub fn report_filename(logbook: &Logbook) -> String {
    format!("Berichtsheft_{}.pdf", logbook.student_name.replace(' ', "_"))
}

/// Fetches logbook `id` from `store` and renders it.
pub fn render_logbook(
    store: &dyn RecordStore,
    generator: &ReportGenerator,
    id: LogbookId,
) -> Result<LogbookPdf, ReportError> {
    let logbook = store.logbook(id)?;
    let bytes = generator.generate(&logbook)?;
    Ok(LogbookPdf {
        bytes,
        filename: report_filename(&logbook),
    })
}
