//! Logical content of a logbook report.
//!
//! The types here describe what ends up on every page without referencing the rendering crate,
//! which keeps the calendar and grouping rules testable on their own.  [`crate::render`] turns a
//! [`ReportLayout`] into `genpdf` elements.

use std::path::PathBuf;

use chrono::NaiveDate;
use log::debug;

use crate::calendar::{self, WeekRange, DATE_FORMAT};
use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::model::{Category, Logbook, Week};

/// Title of the cover page.
pub const COVER_TITLE: &str = "Ausbildungsnachweis";
/// Title printed at the top of every week page.
pub const WEEK_TITLE: &str = "Ausbildungsnachweis (wöchentlich)";
/// Header of the hours column in the task table.
pub const HOURS_COLUMN: &str = "Stunden";
/// Statement printed above the signatures.
pub const DISCLAIMER: &str = "Durch die nachfolgende Unterschrift wird die Richtigkeit und Vollständigkeit der obigen Angaben bestätigt.";

/// The complete content of one report.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportLayout {
    pub cover: CoverPage,
    pub weeks: Vec<WeekPage>,
}

impl ReportLayout {
    /// Lays out the report for `logbook`, resolving optional images through `config`.
    pub fn build(logbook: &Logbook, config: &ReportConfig) -> Result<Self, ReportError> {
        let assets = Assets {
            logo: config.logo(),
            student_signature: config.student_signature(),
            trainer_signature: config.trainer_signature(),
        };

        let mut weeks = Vec::new();
        for year in &logbook.years {
            let mapped = calendar::map_weeks(logbook.start_year, year).ok_or(
                ReportError::Calendar {
                    start_year: logbook.start_year,
                    year_number: year.year_number,
                },
            )?;

            for (week, range) in mapped {
                debug!(
                    "Logbook {}: year {} week {} covers {}",
                    logbook.id,
                    year.year_number,
                    week.week_number,
                    range.label()
                );
                weeks.push(WeekPage {
                    header: WeekHeader {
                        logo: assets.logo.clone(),
                        student_name: logbook.student_name.clone(),
                        year_number: year.year_number,
                        range,
                    },
                    tasks: TaskTable::for_week(week),
                    signature: SignatureBlock {
                        date: range.signature_date(),
                        student_signature: assets.student_signature.clone(),
                        trainer_signature: assets.trainer_signature.clone(),
                    },
                });
            }
        }

        Ok(Self {
            cover: CoverPage::for_logbook(logbook, assets.logo),
            weeks,
        })
    }

    /// Number of pages the report starts new pages for: the cover plus one per week.
    pub fn page_count(&self) -> usize {
        1 + self.weeks.len()
    }
}

struct Assets {
    logo: Option<PathBuf>,
    student_signature: Option<PathBuf>,
    trainer_signature: Option<PathBuf>,
}

/// Content of the first page.
#[derive(Clone, Debug, PartialEq)]
pub struct CoverPage {
    pub logo: Option<PathBuf>,
    pub fields: Vec<CoverField>,
}

impl CoverPage {
    /// Lists every filled-in attribute of the logbook followed by the apprenticeship period.
    pub fn for_logbook(logbook: &Logbook, logo: Option<PathBuf>) -> Self {
        let attributes = [
            ("Name", &logbook.student_name),
            ("Adresse", &logbook.student_address),
            ("Ausbildungsberuf", &logbook.profession),
            ("Fachrichtung/Schwerpunkt", &logbook.specialty),
            ("Ausbildungsbetrieb", &logbook.company),
            ("Verantwortliche/r Ausbilder/in", &logbook.trainer_name),
        ];

        let mut fields: Vec<CoverField> = attributes
            .into_iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(label, value)| CoverField::new(label, value.as_str()))
            .collect();

        fields.push(CoverField::new(
            "Beginn der Ausbildung",
            format!("01.09.{}", logbook.start_year),
        ));
        fields.push(CoverField::new(
            "Ende der Ausbildung",
            format!("30.08.{}", logbook.start_year + 3),
        ));

        Self { logo, fields }
    }
}

/// A labelled row of the cover table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoverField {
    pub label: &'static str,
    pub value: String,
}

impl CoverField {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// Content of one week page.
#[derive(Clone, Debug, PartialEq)]
pub struct WeekPage {
    pub header: WeekHeader,
    pub tasks: TaskTable,
    pub signature: SignatureBlock,
}

/// The header table identifying the apprentice and the reported week.
#[derive(Clone, Debug, PartialEq)]
pub struct WeekHeader {
    pub logo: Option<PathBuf>,
    pub student_name: String,
    pub year_number: u8,
    pub range: WeekRange,
}

impl WeekHeader {
    /// Label/value rows printed below the title.
    pub fn rows(&self) -> [(&'static str, String); 3] {
        [
            ("Name des Auszubildenden:", self.student_name.clone()),
            ("Ausbildungsjahr", self.year_number.to_string()),
            ("Ausbildungswoche vom:", self.range.label()),
        ]
    }
}

/// Tasks of one week grouped by category.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskTable {
    pub sections: Vec<TaskSection>,
}

impl TaskTable {
    /// Groups the tasks of `week`, leaving out categories without any entries.
    pub fn for_week(week: &Week) -> Self {
        let sections = Category::ALL
            .into_iter()
            .filter_map(|category| {
                let rows: Vec<TaskRow> = week
                    .tasks_in(category)
                    .map(|task| TaskRow {
                        description: task.name.clone(),
                        hours: task.hours.to_string(),
                    })
                    .collect();
                (!rows.is_empty()).then_some(TaskSection { category, rows })
            })
            .collect();

        Self { sections }
    }

    /// Flattens the sections into the rows of the rendered table.
    pub fn rows(&self) -> Vec<TableRow<'_>> {
        let mut rows = Vec::new();
        for (index, section) in self.sections.iter().enumerate() {
            rows.push(TableRow::SectionHeader {
                title: section.title(),
                separated: index > 0,
            });
            rows.extend(section.rows.iter().map(TableRow::Entry));
        }
        rows
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Tasks of a single category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskSection {
    pub category: Category,
    pub rows: Vec<TaskRow>,
}

impl TaskSection {
    pub fn title(&self) -> &'static str {
        self.category.section_title()
    }
}

/// A task as printed: description and formatted hours.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskRow {
    pub description: String,
    pub hours: String,
}

/// A row of the rendered task table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableRow<'a> {
    /// Shaded header opening a section; `separated` sections get a rule above them.
    SectionHeader { title: &'static str, separated: bool },
    Entry(&'a TaskRow),
}

/// The signature block closing every week page.
#[derive(Clone, Debug, PartialEq)]
pub struct SignatureBlock {
    pub date: NaiveDate,
    pub student_signature: Option<PathBuf>,
    pub trainer_signature: Option<PathBuf>,
}

impl SignatureBlock {
    pub const STUDENT_CAPTION: &'static str = "Datum, Unterschrift Auszubildende/r";
    pub const TRAINER_CAPTION: &'static str =
        "Datum, Unterschrift Ausbildende/r oder Ausbilder/in";
    pub const ACKNOWLEDGED: &'static str = "Zur Kenntnis genommen:";
    pub const OTHER_REMARKS: &'static str = "Sonstige Sichtvermerke:";
    pub const GUARDIAN_CAPTION: &'static str = "Datum, Unterschrift gesetzliche/r Vertreter/in";
    pub const WORKS_COUNCIL_CAPTION: &'static str = "Datum, Unterschrift Betriebsrat";
    pub const SCHOOL_CAPTION: &'static str = "Datum, Unterschrift Berufsschule";

    pub fn date_label(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Task, Year};

    fn config() -> (tempfile::TempDir, ReportConfig) {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig::new(dir.path());
        (dir, config)
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn logbook_without_years_has_only_a_cover() {
        let (_dir, config) = config();
        let layout = ReportLayout::build(&Logbook::new(1, "Max Mustermann", 2024), &config).unwrap();

        assert!(layout.weeks.is_empty());
        assert_eq!(layout.page_count(), 1);
    }

    #[test]
    fn cover_lists_filled_attributes_and_period() {
        let mut logbook = Logbook::new(1, "Max Mustermann", 2024);
        logbook.profession = "Fachinformatiker".into();
        logbook.company = "Muster GmbH".into();
        logbook.student_address = "   ".into();

        let cover = CoverPage::for_logbook(&logbook, None);
        let labels: Vec<_> = cover.fields.iter().map(|field| field.label).collect();
        assert_eq!(
            labels,
            [
                "Name",
                "Ausbildungsberuf",
                "Ausbildungsbetrieb",
                "Beginn der Ausbildung",
                "Ende der Ausbildung"
            ]
        );
        assert_eq!(cover.fields[3].value, "01.09.2024");
        assert_eq!(cover.fields[4].value, "30.08.2027");
    }

    #[test]
    fn vocational_only_week_has_one_unseparated_section() {
        let week = Week::new(1)
            .with_task(Task::new(Category::Vocat, "Datenbanken", 6.0))
            .with_task(Task::new(Category::Vocat, "Englisch", 2.0));
        let table = TaskTable::for_week(&week);

        assert_eq!(table.sections.len(), 1);
        let rows = table.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            TableRow::SectionHeader {
                title: "Berufsschulthemen",
                separated: false
            }
        );
        assert!(matches!(rows[1], TableRow::Entry(row) if row.hours == "6.0"));
    }

    #[test]
    fn sections_follow_the_category_order() {
        let week = Week::new(1)
            .with_task(Task::new(Category::Vocat, "Netzwerke", 4.0))
            .with_task(Task::new(Category::Ops, "Krank", 8.0))
            .with_task(Task::new(Category::Train, "Arbeitssicherheit", 1.5));
        let table = TaskTable::for_week(&week);

        let headers: Vec<_> = table
            .rows()
            .into_iter()
            .filter_map(|row| match row {
                TableRow::SectionHeader { title, separated } => Some((title, separated)),
                TableRow::Entry(_) => None,
            })
            .collect();
        assert_eq!(
            headers,
            [
                ("Betriebliche Tätigkeiten", false),
                ("Unterweisungen / Schulungen", true),
                ("Berufsschulthemen", true)
            ]
        );
        assert_eq!(table.sections[0].rows[0].hours, "1 Tag");
    }

    #[test]
    fn week_without_tasks_has_an_empty_table() {
        assert!(TaskTable::for_week(&Week::new(4)).is_empty());
    }

    #[test]
    fn week_pages_carry_dates_and_signature_day() {
        let (_dir, config) = config();
        let logbook = Logbook::new(1, "Max Mustermann", 2024)
            .with_year(Year::new(1).with_week(Week::new(1)).with_week(Week::new(2)))
            .with_year(Year::new(2).with_week(Week::new(1)));

        let layout = ReportLayout::build(&logbook, &config).unwrap();
        assert_eq!(layout.page_count(), 4);

        let second = &layout.weeks[1];
        assert_eq!(second.header.range.start, date(2024, 9, 9));
        assert_eq!(second.signature.date, date(2024, 9, 15));
        assert_eq!(second.signature.date_label(), "15.09.2024");
        assert_eq!(
            second.header.rows()[2].1,
            "09.09.2024 bis 13.09.2024"
        );

        let next_year = &layout.weeks[2];
        assert_eq!(next_year.header.year_number, 2);
        assert_eq!(next_year.header.range.start, date(2025, 9, 1));
    }

    #[test]
    fn missing_images_leave_empty_slots() {
        let (_dir, config) = config();
        let logbook =
            Logbook::new(1, "Max Mustermann", 2024).with_year(Year::new(1).with_week(Week::new(1)));
        let layout = ReportLayout::build(&logbook, &config).unwrap();

        assert_eq!(layout.cover.logo, None);
        assert_eq!(layout.weeks[0].header.logo, None);
        assert_eq!(layout.weeks[0].signature.student_signature, None);
    }
}
