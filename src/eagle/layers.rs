//! The 256-slot layer table and the fixed default layer sets.
//!
//! Layers are addressed by number (0-255). A slot may be empty; an empty slot
//! means "undefined", never layer 0. Slot 0 always exists.

use serde::{Deserialize, Serialize};

/// Number of layer slots.
pub const LAYER_SLOTS: usize = 256;

/// Returned by [`LayerTable::get_index_for_layer`] for an undefined layer.
pub const UNDEFINED_COLOR_INDEX: i32 = -1;

const fn default_true() -> bool {
    true
}

/// One drawing layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerElement {
    /// Layer number.
    pub number: u8,
    /// Display name.
    pub name: String,
    /// Palette colour index.
    pub color: u8,
    /// Fill pattern index.
    pub fill: u8,
    /// Shown in the editor.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Usable in the current editor.
    #[serde(default = "default_true")]
    pub active: bool,
}

impl LayerElement {
    /// Creates a visible, active layer.
    #[must_use]
    pub fn new(number: u8, name: impl Into<String>, color: u8, fill: u8) -> Self {
        Self {
            number,
            name: name.into(),
            color,
            fill,
            visible: true,
            active: true,
        }
    }
}

/// The kind of design a default layer set is seeded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerContext {
    /// Standalone library: board and schematic layers.
    Library,
    /// Schematic: schematic layers.
    Schematic,
    /// Board: copper, mask and documentation layers.
    Board,
}

/// `(number, name, color, fill)` of the layers every board-capable drawing starts with.
const BOARD_LAYERS: &[(u8, &str, u8, u8)] = &[
    (1, "Top", 4, 1),
    (16, "Bottom", 1, 1),
    (17, "Pads", 2, 1),
    (18, "Vias", 2, 1),
    (19, "Unrouted", 6, 1),
    (20, "Dimension", 15, 1),
    (21, "tPlace", 7, 1),
    (22, "bPlace", 7, 1),
    (23, "tOrigins", 15, 1),
    (24, "bOrigins", 15, 1),
    (25, "tNames", 7, 1),
    (26, "bNames", 7, 1),
    (27, "tValues", 7, 1),
    (28, "bValues", 7, 1),
    (29, "tStop", 7, 3),
    (30, "bStop", 7, 6),
    (31, "tCream", 7, 4),
    (32, "bCream", 7, 5),
    (33, "tFinish", 6, 3),
    (34, "bFinish", 6, 6),
    (35, "tGlue", 7, 4),
    (36, "bGlue", 7, 5),
    (37, "tTest", 7, 1),
    (38, "bTest", 7, 1),
    (39, "tKeepout", 4, 11),
    (40, "bKeepout", 1, 11),
    (41, "tRestrict", 4, 10),
    (42, "bRestrict", 1, 10),
    (43, "vRestrict", 2, 10),
    (44, "Drills", 7, 1),
    (45, "Holes", 7, 1),
    (46, "Milling", 3, 1),
    (47, "Measures", 7, 1),
    (48, "Document", 7, 1),
    (49, "Reference", 7, 1),
    (51, "tDocu", 7, 1),
    (52, "bDocu", 7, 1),
];

/// `(number, name, color, fill)` of the layers every schematic-capable drawing starts with.
const SCHEMATIC_LAYERS: &[(u8, &str, u8, u8)] = &[
    (88, "SimResults", 9, 1),
    (89, "SimProbes", 9, 1),
    (90, "Modules", 5, 1),
    (91, "Nets", 2, 1),
    (92, "Busses", 1, 1),
    (93, "Pins", 2, 1),
    (94, "Symbols", 4, 1),
    (95, "Names", 7, 1),
    (96, "Values", 7, 1),
    (97, "Info", 7, 1),
    (98, "Guide", 6, 1),
    (99, "SpiceOrder", 7, 1),
];

/// Returns the default layers for a context, in ascending number order.
#[must_use]
pub fn default_layers(context: LayerContext) -> Vec<LayerElement> {
    let sets: &[&[(u8, &str, u8, u8)]] = match context {
        LayerContext::Library => &[BOARD_LAYERS, SCHEMATIC_LAYERS],
        LayerContext::Schematic => &[SCHEMATIC_LAYERS],
        LayerContext::Board => &[BOARD_LAYERS],
    };
    sets.iter()
        .flat_map(|set| set.iter())
        .map(|&(number, name, color, fill)| LayerElement::new(number, name, color, fill))
        .collect()
}

/// Looks up a layer number in any of the fixed default tables.
#[must_use]
pub fn default_layer(number: u8) -> Option<LayerElement> {
    BOARD_LAYERS
        .iter()
        .chain(SCHEMATIC_LAYERS)
        .find(|entry| entry.0 == number)
        .map(|&(number, name, color, fill)| LayerElement::new(number, name, color, fill))
}

/// Number-indexed layer table.
///
/// Serialised as the sparse list of defined layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<LayerElement>", into = "Vec<LayerElement>")]
pub struct LayerTable {
    slots: Vec<Option<LayerElement>>,
}

impl Default for LayerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerTable {
    /// Creates a table holding only the reserved layer 0.
    #[must_use]
    pub fn new() -> Self {
        let mut slots = vec![None; LAYER_SLOTS];
        slots[0] = Some(LayerElement::new(0, "", 0, 0));
        Self { slots }
    }

    /// Creates a table seeded with the defaults for `context`.
    #[must_use]
    pub fn with_defaults(context: LayerContext) -> Self {
        let mut table = Self::new();
        table.seed_defaults(context);
        table
    }

    /// Fills empty slots from the default set; defined layers are left alone.
    pub fn seed_defaults(&mut self, context: LayerContext) {
        for layer in default_layers(context) {
            let slot = &mut self.slots[usize::from(layer.number)];
            if slot.is_none() {
                *slot = Some(layer);
            }
        }
    }

    /// Stores a layer at its number, replacing whatever was there.
    pub fn insert(&mut self, layer: LayerElement) -> Option<LayerElement> {
        self.slots[usize::from(layer.number)].replace(layer)
    }

    /// Returns the layer with the given number, if defined.
    #[must_use]
    pub fn get(&self, number: u8) -> Option<&LayerElement> {
        self.slots[usize::from(number)].as_ref()
    }

    /// Mutable access to a defined layer.
    pub fn get_mut(&mut self, number: u8) -> Option<&mut LayerElement> {
        self.slots[usize::from(number)].as_mut()
    }

    /// True if the layer is defined.
    #[must_use]
    pub fn contains(&self, number: u8) -> bool {
        self.slots[usize::from(number)].is_some()
    }

    /// Palette colour index of a layer, or [`UNDEFINED_COLOR_INDEX`].
    #[must_use]
    pub fn get_index_for_layer(&self, number: u8) -> i32 {
        self.get(number)
            .map_or(UNDEFINED_COLOR_INDEX, |layer| i32::from(layer.color))
    }

    /// Finds a layer by name (first match in number order).
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&LayerElement> {
        self.iter().find(|layer| layer.name == name)
    }

    /// Defined layers in ascending number order.
    pub fn iter(&self) -> impl Iterator<Item = &LayerElement> {
        self.slots.iter().flatten()
    }

    /// Number of defined layers, including layer 0.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Always false: layer 0 is always defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl From<Vec<LayerElement>> for LayerTable {
    fn from(layers: Vec<LayerElement>) -> Self {
        let mut table = Self::new();
        for layer in layers {
            table.insert(layer);
        }
        table
    }
}

impl From<LayerTable> for Vec<LayerElement> {
    fn from(table: LayerTable) -> Self {
        table.slots.into_iter().flatten().collect()
    }
}
