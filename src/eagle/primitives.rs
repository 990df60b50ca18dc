//! Leaf graphic primitives shared by symbols, packages, sheets and boards.
//!
//! Coordinates and sizes are millimetres. Primitives carry a layer *number*;
//! the owning drawing's [`LayerTable`](super::layers::LayerTable) resolves it.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::enums::{
    Align, DimensionType, GridUnit, PadShape, PinDirection, PinFunction, PinLength, PinVisible,
    PolygonPour, TextFont, ViaShape, WireCap, WireStyle,
};
use super::rotation::Rotation;

/// Common access to the layer a primitive is drawn on.
pub trait Layered {
    /// Layer number, or `None` for primitives that span layers (pads, holes, pins).
    fn layer(&self) -> Option<u8>;
}

/// Common access to the name of a named record.
pub trait Named {
    /// The record's name.
    fn name(&self) -> &str;
}

/// Returns the first item with the given name.
///
/// Duplicate names shadow: later entries with the same name are unreachable.
pub fn find_by_name<'a, T: Named>(items: &'a [T], name: &str) -> Option<&'a T> {
    items.iter().find(|item| item.name() == name)
}

/// Mutable variant of [`find_by_name`].
pub fn find_by_name_mut<'a, T: Named>(items: &'a mut [T], name: &str) -> Option<&'a mut T> {
    items.iter_mut().find(|item| item.name() == name)
}

const fn default_true() -> bool {
    true
}

const fn default_ratio() -> u8 {
    8
}

const fn default_distance() -> u16 {
    50
}

const fn default_precision() -> u8 {
    2
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires reference
fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires reference
fn is_identity(rot: &Rotation) -> bool {
    rot.is_identity()
}

/// A straight or arc-shaped line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wire {
    /// Start X.
    pub x1: f64,
    /// Start Y.
    pub y1: f64,
    /// End X.
    pub x2: f64,
    /// End Y.
    pub y2: f64,
    /// Line width.
    pub width: f64,
    /// Layer number.
    pub layer: u8,
    /// Layer span for wires in signals (e.g. `1-16`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent: Option<String>,
    /// Dash pattern.
    #[serde(default)]
    pub style: WireStyle,
    /// Arc angle in degrees; 0 for a straight line.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub curve: f64,
    /// End cap (only meaningful for arcs).
    #[serde(default)]
    pub cap: WireCap,
}

impl Wire {
    /// Creates a straight continuous wire.
    #[must_use]
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64, width: f64, layer: u8) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            width,
            layer,
            extent: None,
            style: WireStyle::Continuous,
            curve: 0.0,
            cap: WireCap::Round,
        }
    }

    /// Straight-line length of the wire (chord length for arcs).
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.x2 - self.x1).hypot(self.y2 - self.y1)
    }
}

/// A polygon corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// X position.
    pub x: f64,
    /// Y position.
    pub y: f64,
    /// Arc angle towards the next vertex.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub curve: f64,
}

impl Vertex {
    /// Creates a straight-edged vertex.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, curve: 0.0 }
    }
}

/// A closed polygon (copper pour in signals, filled area elsewhere).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Outline width.
    pub width: f64,
    /// Layer number.
    pub layer: u8,
    /// Hatch spacing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<f64>,
    /// Fill mode.
    #[serde(default)]
    pub pour: PolygonPour,
    /// Isolation distance from other signals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isolate: Option<f64>,
    /// Keep unconnected islands.
    #[serde(default)]
    pub orphans: bool,
    /// Thermal relief connections.
    #[serde(default = "default_true")]
    pub thermals: bool,
    /// Pour priority.
    #[serde(default)]
    pub rank: u8,
    /// Corners in order.
    #[serde(default)]
    pub vertices: Vec<Vertex>,
}

impl Polygon {
    /// Creates a solid polygon from its corners.
    #[must_use]
    pub fn new(width: f64, layer: u8, vertices: Vec<Vertex>) -> Self {
        Self {
            width,
            layer,
            spacing: None,
            pour: PolygonPour::Solid,
            isolate: None,
            orphans: false,
            thermals: true,
            rank: 0,
            vertices,
        }
    }
}

/// A circle outline or disc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Centre X.
    pub x: f64,
    /// Centre Y.
    pub y: f64,
    /// Radius.
    pub radius: f64,
    /// Line width; 0 draws a filled disc.
    pub width: f64,
    /// Layer number.
    pub layer: u8,
}

/// A filled rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    /// First corner X.
    pub x1: f64,
    /// First corner Y.
    pub y1: f64,
    /// Opposite corner X.
    pub x2: f64,
    /// Opposite corner Y.
    pub y2: f64,
    /// Layer number.
    pub layer: u8,
    /// Rotation about the centre.
    #[serde(default, skip_serializing_if = "is_identity")]
    pub rot: Rotation,
}

/// A text string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    /// Anchor X.
    pub x: f64,
    /// Anchor Y.
    pub y: f64,
    /// Character height.
    pub size: f64,
    /// Layer number.
    pub layer: u8,
    /// Font.
    #[serde(default)]
    pub font: TextFont,
    /// Stroke width as percent of the size (vector font).
    #[serde(default = "default_ratio")]
    pub ratio: u8,
    /// Orientation.
    #[serde(default, skip_serializing_if = "is_identity")]
    pub rot: Rotation,
    /// Anchor alignment.
    #[serde(default)]
    pub align: Align,
    /// Line spacing in percent.
    #[serde(default = "default_distance")]
    pub distance: u16,
    /// Content; `>NAME` and `>VALUE` are placeholders.
    pub text: String,
}

impl Text {
    /// Creates a text with grammar defaults.
    #[must_use]
    pub fn new(text: impl Into<String>, x: f64, y: f64, size: f64, layer: u8) -> Self {
        Self {
            x,
            y,
            size,
            layer,
            font: TextFont::Proportional,
            ratio: default_ratio(),
            rot: Rotation::R0,
            align: Align::BottomLeft,
            distance: default_distance(),
            text: text.into(),
        }
    }
}

/// A dimension annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// First measured point X.
    pub x1: f64,
    /// First measured point Y.
    pub y1: f64,
    /// Second measured point X.
    pub x2: f64,
    /// Second measured point Y.
    pub y2: f64,
    /// Text/line placement X.
    pub x3: f64,
    /// Text/line placement Y.
    pub y3: f64,
    /// Layer number.
    pub layer: u8,
    /// Dimension kind.
    #[serde(default)]
    pub dtype: DimensionType,
    /// Line width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Extension line width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extwidth: Option<f64>,
    /// Extension line length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extlength: Option<f64>,
    /// Extension line offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extoffset: Option<f64>,
    /// Text size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textsize: Option<f64>,
    /// Text ratio.
    #[serde(default = "default_ratio")]
    pub textratio: u8,
    /// Unit the value is displayed in.
    #[serde(default = "default_dimension_unit")]
    pub unit: GridUnit,
    /// Decimal places shown.
    #[serde(default = "default_precision")]
    pub precision: u8,
    /// Show the unit suffix.
    #[serde(default)]
    pub visible: bool,
}

const fn default_dimension_unit() -> GridUnit {
    GridUnit::Mm
}

/// A drawing frame with row/column labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)] // One flag per border, as in the file format
pub struct Frame {
    /// First corner X.
    pub x1: f64,
    /// First corner Y.
    pub y1: f64,
    /// Opposite corner X.
    pub x2: f64,
    /// Opposite corner Y.
    pub y2: f64,
    /// Number of columns.
    pub columns: i32,
    /// Number of rows.
    pub rows: i32,
    /// Layer number.
    pub layer: u8,
    /// Draw left border.
    #[serde(default = "default_true")]
    pub border_left: bool,
    /// Draw top border.
    #[serde(default = "default_true")]
    pub border_top: bool,
    /// Draw right border.
    #[serde(default = "default_true")]
    pub border_right: bool,
    /// Draw bottom border.
    #[serde(default = "default_true")]
    pub border_bottom: bool,
}

/// A non-plated drill hole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    /// Centre X.
    pub x: f64,
    /// Centre Y.
    pub y: f64,
    /// Drill diameter.
    pub drill: f64,
}

bitflags! {
    /// Mask and connection flags of pads and SMDs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct PadFlags: u8 {
        /// Generate a solder stop mask opening.
        const STOP = 0b0001;
        /// Connect to polygons with thermals.
        const THERMALS = 0b0010;
        /// Marks pin 1 (special shape in the first-pad style).
        const FIRST = 0b0100;
        /// Generate a cream (paste) mask opening (SMD only).
        const CREAM = 0b1000;
    }
}

impl PadFlags {
    /// Defaults for a through-hole pad.
    pub const THD_DEFAULT: Self = Self::STOP.union(Self::THERMALS);
    /// Defaults for an SMD.
    pub const SMD_DEFAULT: Self = Self::STOP.union(Self::THERMALS).union(Self::CREAM);
}

fn default_thd_flags() -> PadFlags {
    PadFlags::THD_DEFAULT
}

fn default_smd_flags() -> PadFlags {
    PadFlags::SMD_DEFAULT
}

/// A plated through-hole pad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PadThd {
    /// Pad name, referenced by device connects.
    pub name: String,
    /// Centre X.
    pub x: f64,
    /// Centre Y.
    pub y: f64,
    /// Drill diameter.
    pub drill: f64,
    /// Outer diameter; 0 means "derive from drill".
    #[serde(default, skip_serializing_if = "is_zero")]
    pub diameter: f64,
    /// Copper shape.
    #[serde(default)]
    pub shape: PadShape,
    /// Orientation.
    #[serde(default, skip_serializing_if = "is_identity")]
    pub rot: Rotation,
    /// Mask/thermal flags.
    #[serde(default = "default_thd_flags")]
    pub flags: PadFlags,
}

impl PadThd {
    /// Creates a round pad with an automatic diameter.
    #[must_use]
    pub fn new(name: impl Into<String>, x: f64, y: f64, drill: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            drill,
            diameter: 0.0,
            shape: PadShape::Round,
            rot: Rotation::R0,
            flags: PadFlags::THD_DEFAULT,
        }
    }

    /// Outer diameter actually used for the copper.
    ///
    /// An explicit diameter wins; otherwise `max(drill + 0.3, drill * 1.25)`.
    #[must_use]
    pub fn derived_diameter(&self) -> f64 {
        if self.diameter > 0.0 {
            self.diameter
        } else {
            (self.drill + 0.3).max(self.drill * 1.25)
        }
    }
}

/// A surface-mount pad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Smd {
    /// Pad name, referenced by device connects.
    pub name: String,
    /// Centre X.
    pub x: f64,
    /// Centre Y.
    pub y: f64,
    /// Width.
    pub dx: f64,
    /// Height.
    pub dy: f64,
    /// Copper layer (1 or 16).
    pub layer: u8,
    /// Corner roundness in percent.
    #[serde(default)]
    pub roundness: u8,
    /// Orientation.
    #[serde(default, skip_serializing_if = "is_identity")]
    pub rot: Rotation,
    /// Mask/thermal/cream flags.
    #[serde(default = "default_smd_flags")]
    pub flags: PadFlags,
}

impl Smd {
    /// Creates a rectangular SMD on the top layer.
    #[must_use]
    pub fn new(name: impl Into<String>, x: f64, y: f64, dx: f64, dy: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            dx,
            dy,
            layer: 1,
            roundness: 0,
            rot: Rotation::R0,
            flags: PadFlags::SMD_DEFAULT,
        }
    }
}

/// A plated via.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Via {
    /// Centre X.
    pub x: f64,
    /// Centre Y.
    pub y: f64,
    /// Layer span, e.g. `1-16`.
    pub extent: String,
    /// Drill diameter.
    pub drill: f64,
    /// Outer diameter; 0 means "from design rules".
    #[serde(default, skip_serializing_if = "is_zero")]
    pub diameter: f64,
    /// Copper shape.
    #[serde(default)]
    pub shape: ViaShape,
    /// Always open the stop mask.
    #[serde(default)]
    pub always_stop: bool,
}

/// A symbol pin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    /// Pin name, referenced by device connects.
    pub name: String,
    /// Connection point X.
    pub x: f64,
    /// Connection point Y.
    pub y: f64,
    /// Which labels are shown.
    #[serde(default)]
    pub visible: PinVisible,
    /// Drawn length.
    #[serde(default)]
    pub length: PinLength,
    /// Electrical direction.
    #[serde(default)]
    pub direction: PinDirection,
    /// Root decoration.
    #[serde(default)]
    pub function: PinFunction,
    /// Pins with equal non-zero level are swappable.
    #[serde(default)]
    pub swaplevel: u8,
    /// Orientation; angle is always 0, 90, 180 or 270.
    #[serde(default, skip_serializing_if = "is_identity")]
    pub rot: Rotation,
    /// Pad name(s) after resolving against a device's connects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pad: Option<String>,
}

impl Pin {
    /// Creates a pin with grammar defaults.
    #[must_use]
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            visible: PinVisible::Both,
            length: PinLength::Long,
            direction: PinDirection::Io,
            function: PinFunction::None,
            swaplevel: 0,
            rot: Rotation::R0,
            pad: None,
        }
    }
}

impl Named for Pin {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for PadThd {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Smd {
    fn name(&self) -> &str {
        &self.name
    }
}

/// One graphic primitive of a symbol, package or plain section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Graphic {
    /// Line or arc.
    Wire(Wire),
    /// Polygon.
    Polygon(Polygon),
    /// Circle.
    Circle(Circle),
    /// Rectangle.
    Rectangle(Rectangle),
    /// Text.
    Text(Text),
    /// Dimension.
    Dimension(Dimension),
    /// Frame.
    Frame(Frame),
    /// Drill hole.
    Hole(Hole),
    /// Through-hole pad (packages only).
    Pad(PadThd),
    /// SMD (packages only).
    Smd(Smd),
    /// Pin (symbols only).
    Pin(Pin),
}

impl Graphic {
    /// Element name used in the file grammar.
    #[must_use]
    pub const fn element_name(&self) -> &'static str {
        match self {
            Self::Wire(_) => "wire",
            Self::Polygon(_) => "polygon",
            Self::Circle(_) => "circle",
            Self::Rectangle(_) => "rectangle",
            Self::Text(_) => "text",
            Self::Dimension(_) => "dimension",
            Self::Frame(_) => "frame",
            Self::Hole(_) => "hole",
            Self::Pad(_) => "pad",
            Self::Smd(_) => "smd",
            Self::Pin(_) => "pin",
        }
    }
}

impl Layered for Graphic {
    fn layer(&self) -> Option<u8> {
        match self {
            Self::Wire(w) => Some(w.layer),
            Self::Polygon(p) => Some(p.layer),
            Self::Circle(c) => Some(c.layer),
            Self::Rectangle(r) => Some(r.layer),
            Self::Text(t) => Some(t.layer),
            Self::Dimension(d) => Some(d.layer),
            Self::Frame(f) => Some(f.layer),
            Self::Smd(s) => Some(s.layer),
            Self::Hole(_) | Self::Pad(_) | Self::Pin(_) => None,
        }
    }
}

impl Layered for Wire {
    fn layer(&self) -> Option<u8> {
        Some(self.layer)
    }
}

impl Layered for Polygon {
    fn layer(&self) -> Option<u8> {
        Some(self.layer)
    }
}
