use std::error::Error;
use std::fs;
use std::path::PathBuf;

use berichtsheft::calendar;
use berichtsheft::config::ReportConfig;
use berichtsheft::store::{JsonRecordStore, RecordStore};
use berichtsheft::{render_logbook, ReportError, ReportGenerator};
use clap::{Parser, Subcommand};
use log::info;
use tracing_subscriber::EnvFilter;

/// Renders Berichtsheft logbooks from a JSON record export.
///
/// The report font is read from `fonts/Roboto-Regular.ttf` below the static root, which defaults
/// to `./static` and can be set with `--static-root` or `BERICHTSHEFT_STATIC_ROOT`.
#[derive(Parser)]
#[command(author, version, about = "Berichtsheft PDF generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one logbook to a PDF file.
    Render {
        /// JSON file holding the logbook records.
        #[arg(long)]
        store: PathBuf,
        /// Id of the logbook to render.
        #[arg(long)]
        id: u64,
        /// Directory containing the fonts and images.
        #[arg(long)]
        static_root: Option<PathBuf>,
        /// Output file; defaults to `Berichtsheft_<name>.pdf` in the current directory.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Print the date range and signature date of every reported week.
    Weeks {
        /// JSON file holding the logbook records.
        #[arg(long)]
        store: PathBuf,
        /// Id of the logbook to list.
        #[arg(long)]
        id: u64,
    },

    /// List the logbooks contained in a record file.
    List {
        /// JSON file holding the logbook records.
        #[arg(long)]
        store: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            store,
            id,
            static_root,
            output,
        } => render(store, id, static_root, output),
        Commands::Weeks { store, id } => weeks(store, id),
        Commands::List { store } => list(store),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn render(
    store: PathBuf,
    id: u64,
    static_root: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let generator = ReportGenerator::new(ReportConfig::resolve(static_root))?;
    let store = JsonRecordStore::open(store)?;

    let pdf = render_logbook(&store, &generator, id)?;
    let output = output.unwrap_or_else(|| PathBuf::from(&pdf.filename));
    fs::write(&output, &pdf.bytes)?;
    info!("Generated {} ({} bytes)", output.display(), pdf.bytes.len());
    Ok(())
}

fn weeks(store: PathBuf, id: u64) -> Result<(), Box<dyn Error>> {
    let logbook = JsonRecordStore::open(store)?.logbook(id)?;

    println!("{}", logbook);
    for year in &logbook.years {
        let mapped =
            calendar::map_weeks(logbook.start_year, year).ok_or(ReportError::Calendar {
                start_year: logbook.start_year,
                year_number: year.year_number,
            })?;
        for (week, range) in mapped {
            println!(
                "  Jahr {} Woche {:>2}: {} (Unterschrift {})",
                year.year_number,
                week.week_number,
                range.label(),
                range.signature_date().format(calendar::DATE_FORMAT)
            );
        }
    }
    Ok(())
}

fn list(store: PathBuf) -> Result<(), Box<dyn Error>> {
    let store = JsonRecordStore::open(store)?;
    for id in store.logbook_ids() {
        let logbook = store.logbook(id)?;
        let weeks: usize = logbook.years.iter().map(|year| year.weeks.len()).sum();
        println!("{:>4}  {}  {} weeks", id, logbook, weeks);
    }
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
