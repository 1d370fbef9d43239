//! Records describing an apprentice's training logbook.
//!
//! A [`Logbook`] owns its [`Year`]s, every year owns its [`Week`]s and every week owns the
//! [`Task`]s reported for it.  The types are read-only views of what the record store holds: the
//! report generator walks them but never changes them.
//!
//! Task hours are classified once while a task is ingested (see [`Hours`]), so rendering code never
//! has to guess whether a value counts hours or days.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Identifier of a logbook inside the record store.
pub type LogbookId = u64;

/// Earliest apprenticeship start year accepted by the store.
pub const MIN_START_YEAR: i32 = 2000;
/// Latest apprenticeship start year accepted by the store.
pub const MAX_START_YEAR: i32 = 2050;
/// Highest apprenticeship year number.
pub const MAX_YEAR_NUMBER: u8 = 4;
/// Highest week number inside an apprenticeship year.
pub const MAX_WEEK_NUMBER: u8 = 53;

/// Working hours that make up one day for absence entries.
pub const HOURS_PER_DAY: f64 = 8.0;

/// Task names that are always reported in days.
const ABSENCE_NAMES: &[&str] = &["Krank", "Urlaub", "Frei"];
/// Fragments that turn any task name containing them into a day count.
const ABSENCE_FRAGMENTS: &[&str] = &["Feiertag", "Abschlussprüfung"];

/// The apprenticeship logbook of a single student.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Logbook {
    pub id: LogbookId,
    pub student_name: String,
    /// Calendar year in which the apprenticeship begins.
    pub start_year: i32,
    #[serde(default)]
    pub student_address: String,
    #[serde(default)]
    pub profession: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub trainer_name: String,
    #[serde(default)]
    pub years: Vec<Year>,
}

impl Logbook {
    /// Creates an empty logbook without any years.
    pub fn new(id: LogbookId, student_name: impl Into<String>, start_year: i32) -> Self {
        Self {
            id,
            student_name: student_name.into(),
            start_year,
            student_address: String::new(),
            profession: String::new(),
            specialty: String::new(),
            company: String::new(),
            trainer_name: String::new(),
            years: Vec::new(),
        }
    }

    /// Appends a year and returns the updated logbook.
    pub fn with_year(mut self, year: Year) -> Self {
        self.years.push(year);
        self
    }

    /// Checks the declared ranges of the logbook and all of its descendants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_START_YEAR..=MAX_START_YEAR).contains(&self.start_year) {
            return Err(ValidationError::StartYear {
                logbook: self.id,
                start_year: self.start_year,
            });
        }

        for year in &self.years {
            if !(1..=MAX_YEAR_NUMBER).contains(&year.year_number) {
                return Err(ValidationError::YearNumber {
                    logbook: self.id,
                    year_number: year.year_number,
                });
            }
            for week in &year.weeks {
                if !(1..=MAX_WEEK_NUMBER).contains(&week.week_number) {
                    return Err(ValidationError::WeekNumber {
                        logbook: self.id,
                        year_number: year.year_number,
                        week_number: week.week_number,
                    });
                }
            }
        }

        Ok(())
    }

    /// Sorts years, weeks and tasks by their record keys.
    ///
    /// All sorts are stable, so records sharing a key keep the order they were loaded in.
    pub fn sort_children(&mut self) {
        self.years.sort_by_key(|year| year.year_number);
        for year in &mut self.years {
            year.weeks.sort_by_key(|week| week.week_number);
            for week in &mut year.weeks {
                week.tasks
                    .sort_by(|a, b| (a.category, &a.name).cmp(&(b.category, &b.name)));
            }
        }
    }
}

impl fmt::Display for Logbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.student_name, self.start_year)
    }
}

/// One apprenticeship year of a logbook.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Year {
    /// Position of the year within the apprenticeship, starting at 1.
    pub year_number: u8,
    #[serde(default)]
    pub weeks: Vec<Week>,
}

impl Year {
    pub fn new(year_number: u8) -> Self {
        Self {
            year_number,
            weeks: Vec::new(),
        }
    }

    pub fn with_week(mut self, week: Week) -> Self {
        self.weeks.push(week);
        self
    }
}

/// One reported week inside an apprenticeship year.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Week {
    pub week_number: u8,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Week {
    pub fn new(week_number: u8) -> Self {
        Self {
            week_number,
            tasks: Vec::new(),
        }
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Returns the tasks of the given category in their stored order.
    pub fn tasks_in(&self, category: Category) -> impl Iterator<Item = &Task> + '_ {
        self.tasks
            .iter()
            .filter(move |task| task.category == category)
    }
}

/// The kind of activity a task was reported under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    /// Operational work in the company.
    Ops,
    /// Internal instruction and training courses.
    Train,
    /// Topics covered at vocational school.
    Vocat,
}

impl Category {
    /// All categories in the order their sections appear in the report.
    pub const ALL: [Category; 3] = [Category::Ops, Category::Train, Category::Vocat];

    /// German section title used in the task table.
    pub fn section_title(self) -> &'static str {
        match self {
            Category::Ops => "Betriebliche Tätigkeiten",
            Category::Train => "Unterweisungen / Schulungen",
            Category::Vocat => "Berufsschulthemen",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Ops => "Operational",
            Category::Train => "Training",
            Category::Vocat => "Vocational School",
        };
        f.write_str(label)
    }
}

/// Reported effort of a task.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Hours {
    /// Plain working hours.
    Decimal(f64),
    /// Whole days of a named absence such as sickness or vacation.
    DayCount(u32),
}

impl Hours {
    /// Classifies the raw hours of a task with the given name.
    ///
    /// Absence entries are converted to days by dividing by [`HOURS_PER_DAY`] and rounding half to
    /// even, which is how the values have always been printed.
    pub fn for_task(name: &str, hours: f64) -> Self {
        if is_absence(name) {
            Hours::DayCount((hours / HOURS_PER_DAY).round_ties_even() as u32)
        } else {
            Hours::Decimal(hours)
        }
    }
}

impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Hours::Decimal(hours) if hours.fract() == 0.0 => write!(f, "{:.1}", hours),
            Hours::Decimal(hours) => write!(f, "{}", hours),
            Hours::DayCount(1) => f.write_str("1 Tag"),
            Hours::DayCount(days) => write!(f, "{} Tage", days),
        }
    }
}

/// Returns whether a task name denotes an absence that is counted in days.
///
/// Exact names and substring fragments are matched differently: "Urlaubstag" is a
/// regular task, while "Feiertag (Ostern)" is an absence.
pub fn is_absence(name: &str) -> bool {
    ABSENCE_NAMES.contains(&name)
        || ABSENCE_FRAGMENTS
            .iter()
            .any(|fragment| name.contains(fragment))
}

/// A single reported activity.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "TaskRecord")]
pub struct Task {
    pub category: Category,
    pub name: String,
    pub hours: Hours,
}

impl Task {
    /// Creates a task, classifying the raw hours by the task name.
    pub fn new(category: Category, name: impl Into<String>, hours: f64) -> Self {
        let name = name.into();
        let hours = Hours::for_task(&name, hours);
        Self {
            category,
            name,
            hours,
        }
    }
}

/// Task as stored, before the hours are classified.
#[derive(Deserialize)]
struct TaskRecord {
    category: Category,
    name: String,
    hours: f64,
}

impl TryFrom<TaskRecord> for Task {
    type Error = ValidationError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        if !record.hours.is_finite() || record.hours < 0.0 {
            return Err(ValidationError::Hours {
                task: record.name,
                hours: record.hours,
            });
        }
        Ok(Task::new(record.category, record.name, record.hours))
    }
}

/// A record value outside of its declared range.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ValidationError {
    #[error("logbook {logbook}: start year {start_year} is outside of 2000..=2050")]
    StartYear { logbook: LogbookId, start_year: i32 },
    #[error("logbook {logbook}: year number {year_number} is outside of 1..=4")]
    YearNumber { logbook: LogbookId, year_number: u8 },
    #[error("logbook {logbook}, year {year_number}: week number {week_number} is outside of 1..=53")]
    WeekNumber {
        logbook: LogbookId,
        year_number: u8,
        week_number: u8,
    },
    #[error("task '{task}': hours {hours} must be a finite, non-negative number")]
    Hours { task: String, hours: f64 },
}
