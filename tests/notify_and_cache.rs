//! Change notification and shared-instance cache tests.
//!
//! These tests load fixture drawings through the public API and verify that
//! edits reach listeners and that cached drawings are shared per path.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use eagle_mclib::eagle::enums::GridUnit;
use eagle_mclib::eagle::{
    ChangeEvent, DeviceSet, Drawing, DrawingCache, ErrorKind, FieldValue, ReadOptions, Symbol,
};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn record(drawing: &mut Drawing) -> Rc<RefCell<Vec<ChangeEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    drawing.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

// =============================================================================
// Change notification
// =============================================================================

#[test]
fn layer_and_grid_edits_notify() {
    let mut drawing = Drawing::open_schematic(fixture("demo.sch")).unwrap();
    let events = record(&mut drawing);

    assert!(drawing.set_layer_color(91, 5));
    assert!(drawing.set_layer_visible(91, false));
    assert!(!drawing.set_layer_color(1, 5), "board layer is not defined");
    drawing.set_grid_unit(GridUnit::Mm);

    let events = events.borrow();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].target, "layer 91");
    assert_eq!(events[0].field, "color");
    assert_eq!(events[0].old, FieldValue::Int(2));
    assert_eq!(events[0].new, FieldValue::Int(5));
    assert_eq!(events[1].new, FieldValue::Bool(false));
    assert_eq!(events[2].target, "grid");
    assert_eq!(events[2].new, FieldValue::Text("mm".into()));
    assert_eq!(drawing.color_index(91), 5);
}

#[test]
fn unchanged_values_are_silent() {
    let mut drawing = Drawing::open_schematic(fixture("demo.sch")).unwrap();
    let events = record(&mut drawing);

    assert!(drawing.set_layer_name(91, "Nets"));
    drawing.set_grid_distance(drawing.grid().distance);
    assert!(events.borrow().is_empty());
}

#[test]
fn library_editor_notifies() {
    let mut drawing = Drawing::open_library(fixture("demo.lbr")).unwrap();
    let events = record(&mut drawing);

    let mut editor = drawing.library_editor().expect("library drawing");
    editor.add_symbol(Symbol::new("C-EU"));
    editor.add_device_set(DeviceSet::new("C-EU", "C"));
    assert!(editor.set_device_set_prefix("R-EU_", "RES"));
    assert!(!editor.set_device_set_prefix("NOPE", "X"));
    assert!(editor.remove_package("0207/10").is_some());
    assert!(editor.remove_package("0207/10").is_none());
    editor.set_description("Passives");

    let fields: Vec<_> = events.borrow().iter().map(|e| e.field).collect();
    assert_eq!(
        fields,
        ["symbols", "device_sets", "prefix", "packages", "description"]
    );

    let lib = drawing.library().unwrap();
    assert_eq!(lib.device_set("R-EU_").unwrap().prefix, "RES");
    assert!(lib.symbol("C-EU").is_some());
    assert!(lib.package("0207/10").is_none());
    assert_eq!(lib.description().unwrap().text, "Passives");
}

#[test]
fn unsubscribed_listener_is_not_called() {
    let mut drawing = Drawing::new_board();
    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    let id = drawing.subscribe(move |_| *counter.borrow_mut() += 1);

    drawing.set_layer_fill(1, 3);
    assert!(drawing.unsubscribe(id));
    assert!(!drawing.unsubscribe(id));
    drawing.set_layer_fill(1, 4);
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn schematic_has_no_library_editor() {
    let mut drawing = Drawing::open_schematic(fixture("demo.sch")).unwrap();
    assert!(drawing.library_editor().is_none());
}

#[test]
fn listeners_do_not_affect_equality() {
    let plain = Drawing::open_board(fixture("demo.brd")).unwrap();
    let mut observed = plain.clone();
    observed.subscribe(|_| {});
    assert_eq!(plain, observed);
}

// =============================================================================
// Cache
// =============================================================================

#[test]
fn cache_shares_instances_per_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("demo.lbr");
    std::fs::copy(fixture("demo.lbr"), &path).unwrap();

    let mut cache = DrawingCache::with_options(ReadOptions::default());
    let first = cache.get_or_load(&path).unwrap();
    let second = cache
        .get_or_load(dir.path().join("..").join(dir.path().file_name().unwrap()).join("demo.lbr"))
        .unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);

    first
        .borrow_mut()
        .library_editor()
        .unwrap()
        .remove_symbol("GND");
    assert!(second.borrow().library().unwrap().symbol("GND").is_none());

    // A fresh open is an independent copy.
    let fresh = Drawing::open(&path).unwrap();
    assert!(fresh.library().unwrap().symbol("GND").is_some());
}

#[test]
fn cache_holds_each_kind() {
    let mut cache = DrawingCache::new();
    for name in ["demo.lbr", "demo.sch", "demo.brd"] {
        assert!(cache.load_or_none(fixture(name)).is_some());
    }
    assert_eq!(cache.len(), 3);
    assert!(cache.contains(fixture("demo.sch")));

    let missing = fixture("missing.lbr");
    assert!(cache.load_or_none(&missing).is_none());
    assert_eq!(cache.get_or_load(&missing).unwrap_err().kind(), ErrorKind::Io);
    assert_eq!(cache.len(), 3);
}
