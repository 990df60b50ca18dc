//! The drawing root shared by libraries, schematics and boards.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::board::Board;
use super::enums::{
    parse_yes_no, yes_no, GridStyle, GridUnit, Palette, Severity, VerticalText,
};
use super::error::{EagleError, EagleResult};
use super::events::{ChangeEvent, ChangeNotifier, FieldValue, ListenerId};
use super::layers::{LayerContext, LayerElement, LayerTable};
use super::library::{Description, DeviceSet, Library, Package, Symbol};
use super::mclib;
use super::primitives::find_by_name_mut;
use super::reader::{self, ReadOptions};
use super::schematic::Schematic;

/// File format version written into new drawings.
pub const DRAWING_VERSION: &str = "9.6.2";

/// Kind of file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// `.lbr`
    Library,
    /// `.sch`
    Schematic,
    /// `.brd`
    Board,
    /// `.mclib` interchange document.
    Mclib,
}

impl FileKind {
    /// Classifies a path by extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "lbr" => Some(Self::Library),
            "sch" => Some(Self::Schematic),
            "brd" => Some(Self::Board),
            "mclib" => Some(Self::Mclib),
            _ => None,
        }
    }

    /// Extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Library => "lbr",
            Self::Schematic => "sch",
            Self::Board => "brd",
            Self::Mclib => "mclib",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Library => "library",
            Self::Schematic => "schematic",
            Self::Board => "board",
            Self::Mclib => "mclib",
        }
    }
}

/// Editor grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    /// Grid step in `unitdist`.
    pub distance: f64,
    /// Unit of `distance`.
    pub unitdist: GridUnit,
    /// Display unit.
    pub unit: GridUnit,
    /// Dots or lines.
    #[serde(default)]
    pub style: GridStyle,
    /// Draw every n-th step.
    #[serde(default = "default_multiple")]
    pub multiple: u32,
    /// Shown.
    #[serde(default)]
    pub display: bool,
    /// Alternate step (Alt key).
    pub altdistance: f64,
    /// Unit of `altdistance`.
    pub altunitdist: GridUnit,
    /// Alternate display unit.
    pub altunit: GridUnit,
}

const fn default_multiple() -> u32 {
    1
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            distance: 0.1,
            unitdist: GridUnit::Inch,
            unit: GridUnit::Inch,
            style: GridStyle::Lines,
            multiple: 1,
            display: false,
            altdistance: 0.01,
            altunitdist: GridUnit::Inch,
            altunit: GridUnit::Inch,
        }
    }
}

impl Grid {
    /// Grid step in millimetres.
    #[must_use]
    pub fn distance_mm(&self) -> f64 {
        self.distance * self.unitdist.to_mm()
    }
}

/// A named selection filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Filter name.
    pub name: String,
    /// Filter expression.
    pub expression: String,
}

/// A compatibility note left by the writing application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Version that wrote the note.
    pub version: String,
    /// Oldest version the note applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minversion: Option<String>,
    /// Severity.
    #[serde(default)]
    pub severity: Severity,
    /// Message.
    #[serde(default)]
    pub text: String,
}

/// The design payload of a drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Design {
    /// Standalone library.
    Library(Library),
    /// Schematic.
    Schematic(Schematic),
    /// Board.
    Board(Board),
}

impl Design {
    /// File kind this payload is stored as.
    #[must_use]
    pub const fn file_kind(&self) -> FileKind {
        match self {
            Self::Library(_) => FileKind::Library,
            Self::Schematic(_) => FileKind::Schematic,
            Self::Board(_) => FileKind::Board,
        }
    }

    /// Default layer set for this payload.
    #[must_use]
    pub const fn layer_context(&self) -> LayerContext {
        match self {
            Self::Library(_) => LayerContext::Library,
            Self::Schematic(_) => LayerContext::Schematic,
            Self::Board(_) => LayerContext::Board,
        }
    }
}

/// Root of every drawing file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    /// File format version.
    pub version: String,
    /// Global settings in file order (`alwaysvectorfont`, `verticaltext`, ...).
    #[serde(default)]
    pub settings: IndexMap<String, String>,
    grid: Grid,
    /// Selection filters.
    #[serde(default)]
    pub filters: Vec<Filter>,
    layers: LayerTable,
    /// Background palette.
    #[serde(default)]
    pub palette: Palette,
    /// Payload.
    pub design: Design,
    /// Compatibility notes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,
    /// Approved DRC/ERC error hashes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub approved: Vec<String>,
    #[serde(skip)]
    notifier: ChangeNotifier,
}

impl Drawing {
    /// Creates a drawing around a payload with its default layers seeded.
    #[must_use]
    pub fn from_design(design: Design) -> Self {
        let layers = LayerTable::with_defaults(design.layer_context());
        Self {
            version: DRAWING_VERSION.to_string(),
            settings: IndexMap::new(),
            grid: Grid::default(),
            filters: Vec::new(),
            layers,
            palette: Palette::default(),
            design,
            notes: Vec::new(),
            approved: Vec::new(),
            notifier: ChangeNotifier::new(),
        }
    }

    /// Creates an empty standalone library drawing.
    #[must_use]
    pub fn new_library() -> Self {
        Self::from_design(Design::Library(Library::new()))
    }

    /// Creates an empty schematic drawing.
    #[must_use]
    pub fn new_schematic() -> Self {
        Self::from_design(Design::Schematic(Schematic::default()))
    }

    /// Creates an empty board drawing.
    #[must_use]
    pub fn new_board() -> Self {
        Self::from_design(Design::Board(Board::default()))
    }

    /// Opens a drawing with default import options.
    ///
    /// `.mclib` files are read as interchange documents; anything else is
    /// read as EAGLE XML and classified by its payload element.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a format error
    /// (wrapped with the path) if it does not parse.
    pub fn open(path: impl AsRef<Path>) -> EagleResult<Self> {
        Self::open_with(path, &ReadOptions::default())
    }

    /// Opens a drawing with explicit import options.
    ///
    /// # Errors
    ///
    /// See [`Drawing::open`].
    pub fn open_with(path: impl AsRef<Path>, options: &ReadOptions) -> EagleResult<Self> {
        let path = path.as_ref();
        let result = match FileKind::from_path(path) {
            Some(FileKind::Mclib) => mclib::load(path),
            _ => reader::read_file(path, options),
        };
        result.map_err(|e| e.with_path(path))
    }

    /// Opens a drawing and checks its payload kind.
    ///
    /// # Errors
    ///
    /// Returns [`EagleError::WrongFileType`] if the payload is not `expected`,
    /// plus everything [`Drawing::open`] can return.
    pub fn open_expecting(
        path: impl AsRef<Path>,
        expected: FileKind,
        options: &ReadOptions,
    ) -> EagleResult<Self> {
        let path = path.as_ref();
        let drawing = Self::open_with(path, options)?;
        let actual = drawing.kind();
        if actual != expected {
            return Err(
                EagleError::wrong_file_type(expected.as_str(), actual.as_str()).with_path(path)
            );
        }
        Ok(drawing)
    }

    /// Opens a `.lbr` (or library `.mclib`).
    ///
    /// # Errors
    ///
    /// See [`Drawing::open_expecting`].
    pub fn open_library(path: impl AsRef<Path>) -> EagleResult<Self> {
        Self::open_expecting(path, FileKind::Library, &ReadOptions::default())
    }

    /// Opens a `.sch`.
    ///
    /// # Errors
    ///
    /// See [`Drawing::open_expecting`].
    pub fn open_schematic(path: impl AsRef<Path>) -> EagleResult<Self> {
        Self::open_expecting(path, FileKind::Schematic, &ReadOptions::default())
    }

    /// Opens a `.brd`.
    ///
    /// # Errors
    ///
    /// See [`Drawing::open_expecting`].
    pub fn open_board(path: impl AsRef<Path>) -> EagleResult<Self> {
        Self::open_expecting(path, FileKind::Board, &ReadOptions::default())
    }

    /// Payload kind.
    #[must_use]
    pub const fn kind(&self) -> FileKind {
        self.design.file_kind()
    }

    /// The library payload, if this is a library drawing.
    #[must_use]
    pub const fn library(&self) -> Option<&Library> {
        match &self.design {
            Design::Library(lib) => Some(lib),
            _ => None,
        }
    }

    /// The schematic payload, if any.
    #[must_use]
    pub const fn schematic(&self) -> Option<&Schematic> {
        match &self.design {
            Design::Schematic(sch) => Some(sch),
            _ => None,
        }
    }

    /// The board payload, if any.
    #[must_use]
    pub const fn board(&self) -> Option<&Board> {
        match &self.design {
            Design::Board(brd) => Some(brd),
            _ => None,
        }
    }

    /// Every library in the drawing: the payload itself for a library
    /// drawing, the embedded libraries otherwise.
    #[must_use]
    pub fn libraries(&self) -> Vec<&Library> {
        match &self.design {
            Design::Library(lib) => vec![lib],
            Design::Schematic(sch) => sch.libraries.iter().collect(),
            Design::Board(brd) => brd.libraries.iter().collect(),
        }
    }

    /// Fills layer slots the file left empty from the defaults for this
    /// payload.
    pub fn seed_default_layers(&mut self) {
        self.layers.seed_defaults(self.design.layer_context());
    }

    /// Editor grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable grid.
    ///
    /// Changes made through this reference are not announced to listeners.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Layer table.
    #[must_use]
    pub const fn layers(&self) -> &LayerTable {
        &self.layers
    }

    /// Mutable layer table.
    ///
    /// Changes made through this reference are not announced to listeners.
    pub fn layers_mut(&mut self) -> &mut LayerTable {
        &mut self.layers
    }

    /// Palette colour index of a layer, or `-1` if undefined.
    #[must_use]
    pub fn color_index(&self, layer: u8) -> i32 {
        self.layers.get_index_for_layer(layer)
    }

    /// Registers a change listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&ChangeEvent) + 'static) -> ListenerId {
        self.notifier.subscribe(listener)
    }

    /// Removes a change listener.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.notifier.unsubscribe(id)
    }

    fn edit_layer(
        &mut self,
        number: u8,
        field: &'static str,
        apply: impl FnOnce(&mut LayerElement) -> (FieldValue, FieldValue),
    ) -> bool {
        let Some(layer) = self.layers.get_mut(number) else {
            return false;
        };
        let (old, new) = apply(layer);
        self.notifier.notify(format!("layer {number}"), field, old, new);
        true
    }

    /// Renames a layer. Returns false if the layer is undefined.
    pub fn set_layer_name(&mut self, number: u8, name: impl Into<String>) -> bool {
        let name = name.into();
        self.edit_layer(number, "name", |layer| {
            let old = std::mem::replace(&mut layer.name, name);
            (FieldValue::Text(old), FieldValue::Text(layer.name.clone()))
        })
    }

    /// Sets a layer's palette colour index.
    pub fn set_layer_color(&mut self, number: u8, color: u8) -> bool {
        self.edit_layer(number, "color", |layer| {
            let old = std::mem::replace(&mut layer.color, color);
            (FieldValue::Int(old.into()), FieldValue::Int(color.into()))
        })
    }

    /// Sets a layer's fill pattern index.
    pub fn set_layer_fill(&mut self, number: u8, fill: u8) -> bool {
        self.edit_layer(number, "fill", |layer| {
            let old = std::mem::replace(&mut layer.fill, fill);
            (FieldValue::Int(old.into()), FieldValue::Int(fill.into()))
        })
    }

    /// Shows or hides a layer.
    pub fn set_layer_visible(&mut self, number: u8, visible: bool) -> bool {
        self.edit_layer(number, "visible", |layer| {
            let old = std::mem::replace(&mut layer.visible, visible);
            (old.into(), visible.into())
        })
    }

    /// Activates or deactivates a layer.
    pub fn set_layer_active(&mut self, number: u8, active: bool) -> bool {
        self.edit_layer(number, "active", |layer| {
            let old = std::mem::replace(&mut layer.active, active);
            (old.into(), active.into())
        })
    }

    /// Sets the grid step (in the grid's distance unit).
    pub fn set_grid_distance(&mut self, distance: f64) {
        let old = std::mem::replace(&mut self.grid.distance, distance);
        self.notifier
            .notify("grid", "distance", old.into(), distance.into());
    }

    /// Sets the grid display unit.
    pub fn set_grid_unit(&mut self, unit: GridUnit) {
        let old = std::mem::replace(&mut self.grid.unit, unit);
        self.notifier
            .notify("grid", "unit", old.code().into(), unit.code().into());
    }

    /// Reading direction of vertical text (`verticaltext` setting).
    #[must_use]
    pub fn vertical_text(&self) -> VerticalText {
        self.settings
            .get("verticaltext")
            .and_then(|code| VerticalText::from_code(code))
            .unwrap_or_default()
    }

    /// Sets the `verticaltext` setting.
    pub fn set_vertical_text(&mut self, direction: VerticalText) {
        self.set_setting("verticaltext", direction.code());
    }

    /// Whether texts are always drawn with the vector font
    /// (`alwaysvectorfont` setting).
    #[must_use]
    pub fn always_vector_font(&self) -> bool {
        self.settings
            .get("alwaysvectorfont")
            .and_then(|code| parse_yes_no(code))
            .unwrap_or(false)
    }

    /// Sets the `alwaysvectorfont` setting.
    pub fn set_always_vector_font(&mut self, always: bool) {
        self.set_setting("alwaysvectorfont", yes_no(always));
    }

    fn set_setting(&mut self, name: &'static str, value: &str) {
        let old = self
            .settings
            .insert(name.to_string(), value.to_string())
            .map_or(FieldValue::None, FieldValue::Text);
        self.notifier.notify("settings", name, old, value.into());
    }

    /// Notifying editor over the library payload, if this is a library drawing.
    pub fn library_editor(&mut self) -> Option<LibraryEditor<'_>> {
        match &mut self.design {
            Design::Library(library) => Some(LibraryEditor {
                library,
                notifier: &mut self.notifier,
            }),
            _ => None,
        }
    }
}

/// Edits a library and announces each change to the drawing's listeners.
pub struct LibraryEditor<'a> {
    library: &'a mut Library,
    notifier: &'a mut ChangeNotifier,
}

impl LibraryEditor<'_> {
    /// The library being edited.
    #[must_use]
    pub fn library(&self) -> &Library {
        self.library
    }

    fn added(&mut self, field: &'static str, name: &str) {
        self.notifier
            .notify("library", field, FieldValue::None, name.into());
    }

    fn removed(&mut self, field: &'static str, name: &str) {
        self.notifier
            .notify("library", field, name.into(), FieldValue::None);
    }

    /// Appends a symbol.
    pub fn add_symbol(&mut self, symbol: Symbol) {
        let name = symbol.name.clone();
        self.library.add_symbol(symbol);
        self.added("symbols", &name);
    }

    /// Removes the first symbol with the given name.
    pub fn remove_symbol(&mut self, name: &str) -> Option<Symbol> {
        let removed = self.library.remove_symbol(name)?;
        self.removed("symbols", name);
        Some(removed)
    }

    /// Appends a package.
    pub fn add_package(&mut self, package: Package) {
        let name = package.name.clone();
        self.library.add_package(package);
        self.added("packages", &name);
    }

    /// Removes the first package with the given name.
    pub fn remove_package(&mut self, name: &str) -> Option<Package> {
        let removed = self.library.remove_package(name)?;
        self.removed("packages", name);
        Some(removed)
    }

    /// Appends a device set.
    pub fn add_device_set(&mut self, device_set: DeviceSet) {
        let name = device_set.name.clone();
        self.library.add_device_set(device_set);
        self.added("device_sets", &name);
    }

    /// Removes the first device set with the given name.
    pub fn remove_device_set(&mut self, name: &str) -> Option<DeviceSet> {
        let removed = self.library.remove_device_set(name)?;
        self.removed("device_sets", name);
        Some(removed)
    }

    /// Sets a device set's reference prefix. Returns false if it does not exist.
    pub fn set_device_set_prefix(&mut self, name: &str, prefix: impl Into<String>) -> bool {
        let Some(set) = find_by_name_mut(self.library.device_sets_mut(), name) else {
            return false;
        };
        let old = std::mem::replace(&mut set.prefix, prefix.into());
        let new = set.prefix.clone();
        self.notifier
            .notify(format!("deviceset {name}"), "prefix", old.into(), new.into());
        true
    }

    /// Sets whether a device set takes a user value.
    pub fn set_device_set_uservalue(&mut self, name: &str, uservalue: bool) -> bool {
        let Some(set) = find_by_name_mut(self.library.device_sets_mut(), name) else {
            return false;
        };
        let old = std::mem::replace(&mut set.uservalue, uservalue);
        self.notifier.notify(
            format!("deviceset {name}"),
            "uservalue",
            old.into(),
            uservalue.into(),
        );
        true
    }

    /// Replaces the default description text.
    pub fn set_description(&mut self, text: impl Into<String>) {
        let text = text.into();
        let descriptions = &mut self.library.descriptions;
        let old = if descriptions.is_empty() {
            descriptions.push(Description::new(text.clone()));
            FieldValue::None
        } else {
            FieldValue::Text(std::mem::replace(&mut descriptions[0].text, text.clone()))
        };
        self.notifier
            .notify("library", "description", old, FieldValue::Text(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(drawing: &mut Drawing) -> Rc<RefCell<Vec<ChangeEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        drawing.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        events
    }

    #[test]
    fn fresh_schematic_has_nets_layer() {
        let drawing = Drawing::new_schematic();
        let nets = drawing.layers().get(91).unwrap();
        assert_eq!(nets.name, "Nets");
        assert_eq!((nets.color, nets.fill), (2, 1));
        assert!(drawing.layers().get(1).is_none());
        assert_eq!(drawing.color_index(1), -1);
    }

    #[test]
    fn file_kind_from_extension() {
        assert_eq!(FileKind::from_path(Path::new("a/b.LBR")), Some(FileKind::Library));
        assert_eq!(FileKind::from_path(Path::new("x.brd")), Some(FileKind::Board));
        assert_eq!(FileKind::from_path(Path::new("x.mclib")), Some(FileKind::Mclib));
        assert_eq!(FileKind::from_path(Path::new("x.txt")), None);
        assert_eq!(FileKind::from_path(Path::new("noext")), None);
    }

    #[test]
    fn layer_mutators_notify() {
        let mut drawing = Drawing::new_board();
        let events = recorder(&mut drawing);

        assert!(drawing.set_layer_name(1, "Copper"));
        assert!(drawing.set_layer_visible(1, false));
        assert!(!drawing.set_layer_name(200, "nope"));

        let events = events.borrow();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].target, "layer 1");
        assert_eq!(events[0].old, FieldValue::Text("Top".into()));
        assert_eq!(events[0].new, FieldValue::Text("Copper".into()));
        assert_eq!(events[1].field, "visible");
    }

    #[test]
    fn unchanged_value_emits_nothing() {
        let mut drawing = Drawing::new_board();
        let events = recorder(&mut drawing);
        drawing.set_layer_color(1, 4);
        drawing.set_grid_unit(GridUnit::Inch);
        assert!(events.borrow().is_empty());
        drawing.set_grid_distance(0.05);
        assert_eq!(events.borrow().len(), 1);
    }

    #[test]
    fn library_editor_notifies() {
        let mut drawing = Drawing::new_library();
        let events = recorder(&mut drawing);
        {
            let mut editor = drawing.library_editor().unwrap();
            editor.add_device_set(DeviceSet::new("RES", "R"));
            assert!(editor.set_device_set_prefix("RES", "RN"));
            assert!(!editor.set_device_set_prefix("CAP", "C"));
            editor.set_description("Passives");
            assert!(editor.remove_symbol("missing").is_none());
        }
        let fields: Vec<_> = events.borrow().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["device_sets", "prefix", "description"]);
        assert_eq!(
            drawing.library().unwrap().device_set("RES").unwrap().prefix,
            "RN"
        );
        assert!(Drawing::new_board().library_editor().is_none());
    }

    #[test]
    fn clone_does_not_carry_listeners() {
        let mut drawing = Drawing::new_board();
        let events = recorder(&mut drawing);
        let mut copy = drawing.clone();
        copy.set_layer_name(1, "X");
        assert!(events.borrow().is_empty());
        assert_ne!(copy, drawing);
    }

    #[test]
    fn settings_accessors() {
        let mut drawing = Drawing::new_library();
        assert_eq!(drawing.vertical_text(), VerticalText::Up);
        assert!(!drawing.always_vector_font());

        let events = recorder(&mut drawing);
        drawing.set_vertical_text(VerticalText::Down);
        drawing.set_always_vector_font(true);
        drawing.set_always_vector_font(true);

        assert_eq!(drawing.settings["verticaltext"], "down");
        assert_eq!(drawing.settings["alwaysvectorfont"], "yes");
        assert_eq!(drawing.vertical_text(), VerticalText::Down);
        assert!(drawing.always_vector_font());

        let events = events.borrow();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].old, FieldValue::None);
        assert_eq!(events[1].field, "alwaysvectorfont");
    }
}
