//! `.mclib` export roundtrip tests.
//!
//! These tests import the fixture drawings, write them as `.mclib` documents
//! and verify that reading the documents back yields the same object graph.

use std::path::{Path, PathBuf};

use eagle_mclib::eagle::mclib::{self, ExportOptions};
use eagle_mclib::eagle::{Drawing, EagleError, ErrorKind, FileKind};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn roundtrip(name: &str) -> (Drawing, Drawing, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let original = Drawing::open(fixture(name)).expect("Failed to read fixture");

    let target = mclib::output_path(&fixture(name), Some(temp_dir.path()), mclib::EXTENSION);
    let backup = mclib::save(&original, &target, &ExportOptions::default())
        .expect("Failed to write mclib");
    assert!(backup.is_none());

    let reread = Drawing::open(&target).expect("Failed to read mclib");
    (original, reread, temp_dir)
}

#[test]
fn library_roundtrip() {
    let (original, reread, _dir) = roundtrip("demo.lbr");
    assert_eq!(reread.kind(), FileKind::Library);
    assert_eq!(reread, original);

    // First-wins lookup survives because order is preserved.
    let lib = reread.library().unwrap();
    assert_eq!(lib.packages().len(), 3);
    assert!(lib.package("R0603").unwrap().description.is_some());
}

#[test]
fn schematic_roundtrip() {
    let (original, reread, _dir) = roundtrip("demo.sch");
    assert_eq!(reread, original);
    assert_eq!(reread.approved, original.approved);
    assert!(reread.schematic().unwrap().sheets[0].nets[0].is_bus());
}

#[test]
fn board_roundtrip() {
    let (original, reread, _dir) = roundtrip("demo.brd");
    assert_eq!(reread, original);
    assert_eq!(reread.layers(), original.layers());
}

#[test]
fn document_layout() {
    let drawing = Drawing::open(fixture("demo.lbr")).unwrap();
    let yaml = mclib::to_yaml(&drawing).unwrap();

    assert!(yaml.starts_with("format: mclib\nversion: 1\ndrawing:\n"));
    assert!(yaml.contains("type: library"));
    assert!(yaml.contains("type: smd"));
    assert!(yaml.contains("type: pin"));
    // Undefined layers are not written.
    assert_eq!(yaml.matches("- number: ").count(), drawing.layers().len());
}

#[test]
fn mclib_opened_as_expected_kind() {
    let (_, _, dir) = roundtrip("demo.brd");
    let target = dir.path().join("demo.mclib");

    assert!(Drawing::open_board(&target).is_ok());
    let err = Drawing::open_schematic(&target).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn unsupported_document_names_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.mclib");
    std::fs::write(&path, "format: mclib\nversion: 7\ndrawing: {}\n").unwrap();

    let err = Drawing::open(&path).unwrap_err();
    let EagleError::InFile { source, .. } = &err else {
        panic!("expected error wrapped with path, got {err:?}");
    };
    assert!(matches!(**source, EagleError::UnsupportedDocument { .. }));
    assert!(err.to_string().contains("future.mclib"));
}

#[test]
fn save_keeps_backup_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("demo.mclib");
    let drawing = Drawing::open(fixture("demo.lbr")).unwrap();
    let options = ExportOptions {
        backup_existing: true,
    };

    std::fs::write(&target, "old contents").unwrap();
    let backup = mclib::save(&drawing, &target, &options)
        .unwrap()
        .expect("Existing file should be backed up");

    assert_eq!(std::fs::read_to_string(&backup).unwrap(), "old contents");
    assert_eq!(backup.extension().and_then(|e| e.to_str()), Some("bak"));
    assert_eq!(Drawing::open(&target).unwrap(), drawing);
}

#[test]
fn save_to_missing_directory_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("no").join("such").join("dir.mclib");
    let err = mclib::save(&Drawing::new_board(), &target, &ExportOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

const GRID: &str = "  grid:
    distance: 0.1
    unitdist: inch
    unit: inch
    altdistance: 0.01
    altunitdist: inch
    altunit: inch
";

#[test]
fn missing_layers_are_seeded_on_load() {
    let yaml = format!(
        "format: mclib\nversion: 1\ndrawing:\n  version: '9.6.2'\n{GRID}  layers: []\n  design:\n    type: schematic\n"
    );
    let drawing = mclib::from_yaml(&yaml).unwrap();

    assert_eq!(drawing.kind(), FileKind::Schematic);
    assert_eq!(drawing.layers().get(91).map(|l| l.name.as_str()), Some("Nets"));
    assert_eq!(drawing.layers(), Drawing::new_schematic().layers());
}

#[test]
fn pin_rotation_must_be_orthogonal() {
    let document = |rot: &str| {
        format!(
            "format: mclib\nversion: 1\ndrawing:\n  version: '9.6.2'\n{GRID}  layers: []\n  design:\n    type: library\n    symbols:\n    - name: TILT\n      graphics:\n      - type: pin\n        name: '1'\n        x: 0.0\n        y: 0.0\n        rot: {rot}\n"
        )
    };

    let lib = mclib::from_yaml(&document("R270")).unwrap();
    assert_eq!(lib.library().unwrap().symbol("TILT").unwrap().pins().count(), 1);

    let err = mclib::from_yaml(&document("R45")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(matches!(
        err,
        EagleError::InvalidAttribute { ref value, .. } if value == "R45"
    ));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tilt.mclib");
    std::fs::write(&path, document("R45")).unwrap();
    let err = Drawing::open(&path).unwrap_err();
    assert!(err.to_string().contains("tilt.mclib"));
}
