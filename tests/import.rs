//! Import tests against the fixture library, schematic and board.
//!
//! These tests read complete EAGLE files from `tests/fixtures/` and verify
//! the resulting object graph, grammar defaults and cross-references.

use std::path::{Path, PathBuf};

use eagle_mclib::eagle::board::SignalItem;
use eagle_mclib::eagle::enums::{
    AttributeDisplay, DesignRule, GateAddLevel, GridStyle, GridUnit, PadShape, PinDirection,
    PinLength, PinVisible, PolygonPour, Severity, VerticalText,
};
use eagle_mclib::eagle::primitives::PadFlags;
use eagle_mclib::eagle::schematic::SegmentItem;
use eagle_mclib::eagle::{
    Drawing, EagleError, ErrorKind, FileKind, Graphic, Named, ReadOptions,
};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Helper to compare floats with tolerance.
fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// =============================================================================
// Library
// =============================================================================

#[test]
fn library_fixture_structure() {
    let drawing = Drawing::open_library(fixture("demo.lbr")).expect("Failed to read demo.lbr");
    assert_eq!(drawing.kind(), FileKind::Library);
    assert_eq!(drawing.version, "9.6.2");
    assert_eq!(drawing.vertical_text(), VerticalText::Up);
    assert!(!drawing.always_vector_font());

    let lib = drawing.library().expect("Not a library");
    assert_eq!(
        lib.description().map(|d| d.text.as_str()),
        Some("<b>Resistors and Capacitors</b>")
    );
    assert_eq!(lib.packages().len(), 3);
    assert_eq!(lib.symbols().len(), 2);
    assert_eq!(lib.device_sets().len(), 2);
    assert_eq!(lib.packages3d().len(), 1);
}

#[test]
fn duplicate_names_resolve_to_first() {
    let drawing = Drawing::open_library(fixture("demo.lbr")).unwrap();
    let lib = drawing.library().unwrap();

    let first = lib.package("R0603").unwrap();
    assert_eq!(
        first.description.as_ref().map(|d| d.text.as_str()),
        Some("Chip resistor 0603")
    );
    assert_eq!(first.graphics.len(), 5);
    assert_eq!(
        lib.duplicate_names(),
        vec![("package", "R0603".to_string())]
    );
}

#[test]
fn pad_and_smd_defaults() {
    let drawing = Drawing::open_library(fixture("demo.lbr")).unwrap();
    let lib = drawing.library().unwrap();

    let smds: Vec<_> = lib
        .package("R0603")
        .unwrap()
        .graphics
        .iter()
        .filter_map(|g| match g {
            Graphic::Smd(smd) => Some(smd),
            _ => None,
        })
        .collect();
    assert_eq!(smds.len(), 2);
    assert_eq!(smds[0].roundness, 0);
    assert_eq!(smds[1].roundness, 25);
    assert_eq!(smds[0].flags, PadFlags::SMD_DEFAULT);

    let tht = lib.package("0207/10").unwrap();
    let pads: Vec<_> = tht
        .graphics
        .iter()
        .filter_map(|g| match g {
            Graphic::Pad(pad) => Some(pad),
            _ => None,
        })
        .collect();
    assert_eq!(pads[0].shape, PadShape::Octagon);
    assert!(approx_eq(pads[0].diameter, 0.0));
    assert!(approx_eq(pads[0].derived_diameter(), 0.8128 + 0.3));
    assert_eq!(pads[1].shape, PadShape::Round);
    assert!(approx_eq(pads[1].derived_diameter(), 1.6));
    assert!(!pads[1].flags.contains(PadFlags::STOP));
    assert!(pads[1].flags.contains(PadFlags::THERMALS));
    assert!(tht.graphics.iter().any(|g| matches!(g, Graphic::Hole(_))));
}

#[test]
fn pin_attributes_and_rotation() {
    let drawing = Drawing::open_library(fixture("demo.lbr")).unwrap();
    let lib = drawing.library().unwrap();

    let res = lib.symbol("R-EU").unwrap();
    let pin = res.pin("2").unwrap();
    assert_eq!(pin.visible, PinVisible::Off);
    assert_eq!(pin.length, PinLength::Short);
    assert_eq!(pin.direction, PinDirection::Pas);
    assert_eq!(pin.swaplevel, 1);
    assert!(approx_eq(pin.rot.angle, 180.0));
    assert!(res.pin("1").unwrap().rot.is_identity());

    let gnd = lib.symbol("GND").unwrap().pin("GND").unwrap();
    assert_eq!(gnd.direction, PinDirection::Sup);
    assert_eq!(gnd.rot.code(), "R270");
}

#[test]
fn device_cross_references() {
    let drawing = Drawing::open_library(fixture("demo.lbr")).unwrap();
    let lib = drawing.library().unwrap();

    let set = lib.device_set("R-EU_").unwrap();
    assert_eq!(set.prefix, "R");
    assert!(set.uservalue);
    assert_eq!(set.devices.len(), 2);

    let device = set.device("R0603").unwrap();
    assert_eq!(lib.device_package(device).unwrap().name, "R0603");
    let models = lib.device_packages3d(device);
    assert_eq!(models.len(), 1);
    assert_eq!(lib.packages_for_3d(models[0]).len(), 1);
    assert_eq!(
        device.technology("").unwrap().attributes[0].value,
        "1%"
    );

    let resolved = lib.resolved_symbol("R-EU_", "0207/10", "G$1").unwrap();
    assert_eq!(resolved.pin("1").unwrap().pad.as_deref(), Some("1"));
    assert_eq!(resolved.pin("2").unwrap().pad.as_deref(), Some("2"));
    // The stored symbol is left untouched.
    assert!(lib.symbol("R-EU").unwrap().pin("1").unwrap().pad.is_none());

    let supply = lib.device_set("GND").unwrap();
    assert_eq!(supply.gates[0].addlevel, GateAddLevel::Request);
    assert!(supply.device("").unwrap().package.is_none());
    assert!(lib.device_package(supply.device("").unwrap()).is_none());
}

#[test]
fn library_layers_seeded_and_overridden() {
    let drawing = Drawing::open_library(fixture("demo.lbr")).unwrap();
    let layers = drawing.layers();

    // Defaults the file does not list.
    assert_eq!(layers.get(91).unwrap().name, "Nets");
    assert_eq!(layers.get(16).unwrap().name, "Bottom");
    // Custom layer from the file.
    let descript = layers.get(250).unwrap();
    assert!(!descript.visible);
    assert!(!descript.active);
    assert_eq!(layers.by_name("Descript").unwrap().number, 250);
    assert!(layers.get(200).is_none());
}

// =============================================================================
// Schematic
// =============================================================================

#[test]
fn schematic_fixture_structure() {
    let drawing = Drawing::open_schematic(fixture("demo.sch")).unwrap();
    assert_eq!(drawing.kind(), FileKind::Schematic);
    assert!(drawing.grid().display);
    assert_eq!(drawing.approved.len(), 1);
    assert_eq!(drawing.notes.len(), 1);
    assert_eq!(drawing.notes[0].severity, Severity::Warning);
    assert!(drawing.notes[0].text.starts_with("Since Version 8.2"));

    let sch = drawing.schematic().unwrap();
    assert_eq!(sch.xrefpart.as_deref(), Some("/%S.%C%R"));
    assert_eq!(sch.attributes[0].value.as_deref(), Some("B"));
    assert!(sch.variant_defs[0].current);
    assert_eq!(sch.class(1).unwrap().name, "power");
    assert_eq!(sch.class(1).unwrap().clearances.len(), 1);

    let rcl = sch.library("rcl").unwrap();
    assert!(rcl.is_managed());
    let r1 = sch.part("R1").unwrap();
    assert_eq!(r1.value.as_deref(), Some("10k"));
    assert_eq!(sch.part_device_set(r1).unwrap().prefix, "R");
    assert!(sch.part("R3").is_none());
}

#[test]
fn schematic_sheet_contents() {
    let drawing = Drawing::open_schematic(fixture("demo.sch")).unwrap();
    let sheet = &drawing.schematic().unwrap().sheets[0];

    assert_eq!(sheet.plain.len(), 2);
    assert_eq!(sheet.instances.len(), 2);
    let r2 = &sheet.instances[1];
    assert!(r2.smashed);
    assert!(r2.rot.mirrored);
    assert_eq!(r2.attributes[0].name, "VALUE");

    // Busses are listed first.
    assert_eq!(sheet.nets.len(), 3);
    assert!(sheet.nets[0].is_bus());
    assert_eq!(sheet.busses().count(), 1);

    let mid = sheet.net("MID").unwrap();
    assert_eq!(mid.net_class(), 1);
    assert_eq!(mid.pin_refs().count(), 2);
    let items = &mid.segments[0].items;
    assert!(items
        .iter()
        .any(|i| matches!(i, SegmentItem::Label(label) if label.xref)));
    assert!(items.iter().any(|i| matches!(i, SegmentItem::Junction(_))));

    assert_eq!(sheet.net("VCC").unwrap().net_class(), 0);
    assert!(sheet.net_only("DATA[0..7]").is_none());
    assert!(sheet.net("DATA[0..7]").unwrap().is_bus());
}

#[test]
fn schematic_layers_exclude_board_defaults() {
    let drawing = Drawing::open_schematic(fixture("demo.sch")).unwrap();
    assert!(drawing.layers().get(94).is_some());
    assert!(drawing.layers().get(95).is_some());
    assert!(drawing.layers().get(1).is_none());
}

// =============================================================================
// Board
// =============================================================================

#[test]
fn board_fixture_structure() {
    let drawing = Drawing::open_board(fixture("demo.brd")).unwrap();
    assert_eq!(drawing.kind(), FileKind::Board);
    assert_eq!(drawing.grid().unit, GridUnit::Mm);
    assert_eq!(drawing.grid().style, GridStyle::Dots);
    assert!(approx_eq(drawing.grid().distance_mm(), 0.05));
    assert_eq!(drawing.layers().get(20).unwrap().color, 24);
    assert!(drawing.layers().get(91).is_none());

    let board = drawing.board().unwrap();
    assert_eq!(board.plain.len(), 5);
    assert_eq!(board.libraries[0].name(), "rcl");

    let r2 = board.element("R2").unwrap();
    assert!(!r2.populate);
    assert!(approx_eq(r2.rot.angle, 90.0));
    assert_eq!(r2.attributes[0].display, AttributeDisplay::Off);
    assert!(board.element("R1").unwrap().populate);
    assert_eq!(
        board.element_package(r2).map(|p| p.name.as_str()),
        Some("R0603")
    );
}

#[test]
fn board_signals() {
    let drawing = Drawing::open_board(fixture("demo.brd")).unwrap();
    let board = drawing.board().unwrap();

    let mid = board.signal("MID").unwrap();
    assert_eq!(mid.contacts().count(), 2);
    let via = mid.vias().next().unwrap();
    assert_eq!(via.extent, "1-16");
    assert!(approx_eq(via.drill, 0.35));
    assert!(!mid.airwires_hidden);

    let gnd = board.signal("GND").unwrap();
    assert!(gnd.airwires_hidden);
    let SignalItem::Polygon(polygon) = &gnd.items[0] else {
        panic!("expected polygon");
    };
    assert_eq!(polygon.pour, PolygonPour::Solid);
    assert_eq!(polygon.isolate, Some(0.3));
    assert!(polygon.thermals);
    assert!(approx_eq(polygon.vertices[2].curve, -90.0));
}

#[test]
fn board_design_rules() {
    let drawing = Drawing::open_board(fixture("demo.brd")).unwrap();
    let rules = drawing.board().unwrap().design_rules.as_ref().unwrap();

    assert_eq!(rules.name, "default");
    assert_eq!(rules.get(DesignRule::MdWireWire), "8mil");
    assert_eq!(rules.get(DesignRule::MdPadPad), "");

    let width = rules.real_param(DesignRule::MsWidth).unwrap();
    assert!(approx_eq(width.value, 0.254));
    assert!(width.is_in_range());
    let via = rules.real_param(DesignRule::RlMinViaOuter).unwrap();
    assert!(approx_eq(via.value, 0.2));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn wrong_file_type() {
    let err = Drawing::open_library(fixture("demo.brd")).unwrap_err();
    let EagleError::InFile { source, .. } = &err else {
        panic!("expected error wrapped with path, got {err:?}");
    };
    assert!(matches!(**source, EagleError::WrongFileType { .. }));
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(err.to_string().contains("demo.brd"));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Drawing::open(dir.path().join("absent.lbr")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!err.is_format_error());
}

#[test]
fn malformed_file_names_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.sch");
    std::fs::write(&path, "<eagle><drawing><schematic>").unwrap();

    let err = Drawing::open(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(err.to_string().contains("broken.sch"));
}

#[test]
fn strict_mode_rejects_unknown_elements() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("odd.lbr");
    let text = std::fs::read_to_string(fixture("demo.lbr"))
        .unwrap()
        .replace("<symbols>", "<symbols><widget/>");
    std::fs::write(&path, text).unwrap();

    assert!(Drawing::open_with(&path, &ReadOptions::default()).is_ok());
    let err = Drawing::open_with(&path, &ReadOptions::strict()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(err.to_string().contains("widget"));
}

#[test]
fn kind_is_taken_from_payload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.xml");
    std::fs::copy(fixture("demo.brd"), &path).unwrap();

    let drawing = Drawing::open(&path).unwrap();
    assert_eq!(drawing.kind(), FileKind::Board);
    assert_eq!(FileKind::from_path(&path), None);
    assert_eq!(FileKind::from_path(Path::new("X.LBR")), Some(FileKind::Library));
}
