use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use berichtsheft::config::{
    ReportConfig, LOGO_IMAGE, REGULAR_FONT, STUDENT_SIGNATURE_IMAGE, TRAINER_SIGNATURE_IMAGE,
};
use berichtsheft::model::{Category, Logbook, Task, Week, Year};
use berichtsheft::store::JsonRecordStore;
use berichtsheft::{render_logbook, ReportGenerator};
use image::{ImageBuffer, Rgb, Rgba};
use sha2::{Digest, Sha256};
use tempfile::TempDir;

/// Fonts tried when `BERICHTSHEFT_TEST_FONT` is not set.
const FONT_CANDIDATES: &[&str] = &[
    "assets/fonts/Roboto-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

fn find_font() -> Option<PathBuf> {
    if let Some(path) = env::var_os("BERICHTSHEFT_TEST_FONT") {
        return Some(PathBuf::from(path)).filter(|path| path.is_file());
    }

    FONT_CANDIDATES
        .iter()
        .map(|candidate| {
            let path = Path::new(candidate);
            if path.is_relative() {
                Path::new(env!("CARGO_MANIFEST_DIR")).join(path)
            } else {
                path.to_path_buf()
            }
        })
        .find(|path| path.is_file())
}

/// Creates a static root containing a usable font, or `None` when no font can be found.
fn static_root() -> Option<TempDir> {
    let Some(font) = find_font() else {
        eprintln!(
            "Skipping rendering test: no TrueType font found. Set BERICHTSHEFT_TEST_FONT to run it."
        );
        return None;
    };

    let dir = tempfile::tempdir().expect("create static root");
    let target = dir.path().join(REGULAR_FONT);
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::copy(&font, &target).expect("copy font into static root");
    Some(dir)
}

fn write_asset(root: &Path, relative: &str, bytes: &[u8]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

fn sample_logbook() -> Logbook {
    let mut logbook = Logbook::new(1, "Max Mustermann", 2024);
    logbook.profession = "Fachinformatiker".into();
    logbook.specialty = "Anwendungsentwicklung".into();
    logbook.company = "Muster GmbH".into();
    logbook.trainer_name = "Erika Musterfrau".into();

    logbook
        .with_year(
            Year::new(1)
                .with_week(
                    Week::new(1)
                        .with_task(Task::new(Category::Ops, "Einrichtung Arbeitsplatz", 6.5))
                        .with_task(Task::new(Category::Ops, "Krank", 8.0))
                        .with_task(Task::new(Category::Train, "Arbeitssicherheit", 1.5))
                        .with_task(Task::new(Category::Vocat, "Netzwerktechnik", 6.0)),
                )
                .with_week(
                    Week::new(2).with_task(Task::new(Category::Vocat, "Datenbanken", 8.0)),
                )
                .with_week(Week::new(3)),
        )
        .with_year(Year::new(2).with_week(
            Week::new(1).with_task(Task::new(Category::Ops, "Feiertag (Tag der Einheit)", 8.0)),
        ))
}

fn page_count(bytes: &[u8]) -> usize {
    lopdf::Document::load_mem(bytes)
        .expect("generated PDF parses")
        .get_pages()
        .len()
}

#[test]
fn logbook_without_years_renders_only_the_cover() {
    let Some(root) = static_root() else {
        return;
    };
    let generator = ReportGenerator::new(ReportConfig::new(root.path())).unwrap();

    let bytes = generator
        .generate(&Logbook::new(1, "Max Mustermann", 2024))
        .expect("render cover only");

    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(page_count(&bytes), 1);
}

#[test]
fn every_week_gets_its_own_page() {
    let Some(root) = static_root() else {
        return;
    };
    let generator = ReportGenerator::new(ReportConfig::new(root.path())).unwrap();

    let bytes = generator.generate(&sample_logbook()).expect("render logbook");
    assert_eq!(page_count(&bytes), 5);
}

#[test]
fn regenerating_yields_identical_bytes() {
    let Some(root) = static_root() else {
        return;
    };
    let generator = ReportGenerator::new(ReportConfig::new(root.path())).unwrap();
    let logbook = sample_logbook();

    let first = generator.generate(&logbook).unwrap();
    let second = generator.generate(&logbook).unwrap();

    assert_eq!(Sha256::digest(&first), Sha256::digest(&second));
    assert_eq!(first, second);
}

#[test]
fn images_with_transparency_are_embedded() {
    let Some(root) = static_root() else {
        return;
    };

    fs::create_dir_all(root.path().join("images")).unwrap();
    let logo = ImageBuffer::from_fn(300, 80, |x, _| Rgb([(x % 256) as u8, 60u8, 120u8]));
    logo.save(root.path().join(LOGO_IMAGE)).unwrap();

    let signature = ImageBuffer::from_fn(240, 60, |x, y| {
        let ink: u8 = if (x + y) % 7 == 0 { 255 } else { 0 };
        Rgba([20, 20, 80, ink])
    });
    signature
        .save(root.path().join(STUDENT_SIGNATURE_IMAGE))
        .unwrap();
    signature
        .save(root.path().join(TRAINER_SIGNATURE_IMAGE))
        .unwrap();

    let generator = ReportGenerator::new(ReportConfig::new(root.path())).unwrap();
    let without_images = {
        let bare = static_root().unwrap();
        ReportGenerator::new(ReportConfig::new(bare.path()))
            .unwrap()
            .generate(&sample_logbook())
            .unwrap()
    };
    let with_images = generator.generate(&sample_logbook()).unwrap();

    assert_eq!(page_count(&with_images), 5);
    assert!(with_images.len() > without_images.len());
}

#[test]
fn undecodable_images_are_left_out() {
    let Some(root) = static_root() else {
        return;
    };
    write_asset(root.path(), LOGO_IMAGE, b"definitely not a png");
    write_asset(root.path(), TRAINER_SIGNATURE_IMAGE, b"");

    let generator = ReportGenerator::new(ReportConfig::new(root.path())).unwrap();
    let bytes = generator
        .generate(&sample_logbook())
        .expect("broken optional images must not fail the report");
    assert_eq!(page_count(&bytes), 5);
}

#[test]
fn store_lookup_produces_named_report() {
    let Some(root) = static_root() else {
        return;
    };
    let generator = ReportGenerator::new(ReportConfig::new(root.path())).unwrap();
    let store = JsonRecordStore::from_logbooks([sample_logbook()]).unwrap();

    let pdf = render_logbook(&store, &generator, 1).unwrap();
    assert_eq!(pdf.filename, "Berichtsheft_Max_Mustermann.pdf");
    assert_eq!(pdf.bytes, generator.generate(&sample_logbook()).unwrap());

    assert!(render_logbook(&store, &generator, 2).is_err());
}
