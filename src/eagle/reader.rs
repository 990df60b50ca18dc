//! EAGLE XML import.
//!
//! The reader walks the element tree top-down, one function per element.
//! Required attributes that are missing or malformed fail the whole file;
//! optional attributes take the defaults of the EAGLE DTD. References by name
//! (gate → symbol, device → package, ...) are stored as strings and resolved
//! later through the lookup methods, so forward references are fine.
//!
//! # Unknown elements
//!
//! Elements the model deliberately does not carry (autorouter passes, SPICE
//! data, modules, groups, splines, ...) are skipped silently. Anything else
//! that is not part of the grammar is rejected in strict mode and skipped
//! with a warning otherwise.

use std::borrow::Cow;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use roxmltree::{Document, Node, ParsingOptions};

use super::board::{Board, ContactRef, DesignRules, Element, Param, Signal, SignalItem};
use super::design::{Attribute, Clearance, NetClass, VariantDef};
use super::drawing::{Design, Drawing, Filter, Grid, Note, DRAWING_VERSION};
use super::enums::{
    parse_yes_no, Align, AttributeDisplay, ContactRoute, DimensionType, GateAddLevel, GridStyle,
    GridUnit, PadShape, PinDirection, PinFunction, PinLength, PinVisible, PolygonPour, Severity,
    TextFont, ViaShape, WireCap, WireStyle,
};
use super::error::{EagleError, EagleResult};
use super::layers::LayerElement;
use super::library::{
    Connect, Description, Device, DeviceSet, Gate, Library, ManagedInfo, Package, Package3d,
    Package3dInstance, PackageInstance, Symbol, Technology, TechnologyAttribute,
};
use super::primitives::{
    Circle, Dimension, Frame, Graphic, Hole, PadFlags, PadThd, Pin, Polygon, Rectangle, Smd, Text,
    Vertex, Via, Wire,
};
use super::rotation::Rotation;
use super::schematic::{
    Instance, Junction, Label, Net, Part, PinRef, PortRef, Schematic, Segment, SegmentItem, Sheet,
};

/// Elements that are valid EAGLE but have no counterpart in the model.
const UNMODELED: &[&str] = &[
    "autorouter",
    "spice",
    "modules",
    "moduleinsts",
    "groups",
    "grouprefs",
    "spline",
    "variant",
    "palette",
    "mfgpreviewcolors",
    "pinmapping",
    "schematic_group",
];

const SYMBOL_GRAPHICS: &[&str] = &[
    "polygon",
    "wire",
    "text",
    "dimension",
    "pin",
    "circle",
    "rectangle",
    "frame",
];

const PACKAGE_GRAPHICS: &[&str] = &[
    "polygon",
    "wire",
    "text",
    "dimension",
    "circle",
    "rectangle",
    "frame",
    "hole",
    "pad",
    "smd",
];

const PLAIN_GRAPHICS: &[&str] = &[
    "polygon",
    "wire",
    "text",
    "dimension",
    "circle",
    "rectangle",
    "frame",
    "hole",
];

/// Import settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Reject elements outside the supported grammar instead of skipping them.
    pub strict: bool,
}

impl ReadOptions {
    /// Strict import.
    #[must_use]
    pub const fn strict() -> Self {
        Self { strict: true }
    }
}

/// Reads an EAGLE file from disk.
///
/// # Errors
///
/// Returns [`EagleError::FileRead`] if the file cannot be read, or a format
/// error if the content does not follow the grammar.
pub fn read_file(path: &Path, options: &ReadOptions) -> EagleResult<Drawing> {
    let bytes = std::fs::read(path).map_err(|e| EagleError::file_read(path, e))?;
    let drawing = read_bytes(&bytes, options)?;

    tracing::info!(
        path = %path.display(),
        kind = drawing.kind().as_str(),
        layers = drawing.layers().len(),
        "Read drawing"
    );

    Ok(drawing)
}

/// Reads an EAGLE document from raw bytes (UTF-8, falling back to Windows-1252).
///
/// # Errors
///
/// Returns a format error if the content does not follow the grammar.
pub fn read_bytes(bytes: &[u8], options: &ReadOptions) -> EagleResult<Drawing> {
    let text = decode(bytes);
    read_str(&text, options)
}

/// Reads an EAGLE document from a string.
///
/// # Errors
///
/// Returns a format error if the content does not follow the grammar.
pub fn read_str(text: &str, options: &ReadOptions) -> EagleResult<Drawing> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let doc = Document::parse_with_options(
        text,
        ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        },
    )?;
    Reader { options }.read_document(&doc)
}

fn decode(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            tracing::debug!("Input is not UTF-8, decoding as Windows-1252");
            encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes).0
        }
    }
}

// Attribute helpers

fn tag<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

fn elements<'a, 'i>(node: Node<'a, 'i>) -> impl Iterator<Item = Node<'a, 'i>> {
    node.children().filter(Node::is_element)
}

fn text_of(node: Node<'_, '_>) -> String {
    node.children()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect()
}

fn req<'a>(node: Node<'a, '_>, attr: &str) -> EagleResult<&'a str> {
    node.attribute(attr)
        .ok_or_else(|| EagleError::missing_attribute(tag(node), attr))
}

fn req_string(node: Node<'_, '_>, attr: &str) -> EagleResult<String> {
    req(node, attr).map(str::to_string)
}

fn opt_string(node: Node<'_, '_>, attr: &str) -> Option<String> {
    node.attribute(attr).map(str::to_string)
}

fn parse_with<T>(
    node: Node<'_, '_>,
    attr: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> EagleResult<Option<T>> {
    match node.attribute(attr) {
        None => Ok(None),
        Some(raw) => parse(raw)
            .map(Some)
            .ok_or_else(|| EagleError::invalid_attribute(tag(node), attr, raw)),
    }
}

fn number<T: FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}

fn opt_num<T: FromStr>(node: Node<'_, '_>, attr: &str) -> EagleResult<Option<T>> {
    parse_with(node, attr, number::<T>)
}

fn req_num<T: FromStr>(node: Node<'_, '_>, attr: &str) -> EagleResult<T> {
    opt_num(node, attr)?.ok_or_else(|| EagleError::missing_attribute(tag(node), attr))
}

fn num_or<T: FromStr>(node: Node<'_, '_>, attr: &str, default: T) -> EagleResult<T> {
    Ok(opt_num(node, attr)?.unwrap_or(default))
}

fn flag(node: Node<'_, '_>, attr: &str, default: bool) -> EagleResult<bool> {
    Ok(parse_with(node, attr, parse_yes_no)?.unwrap_or(default))
}

fn code<T: Default>(
    node: Node<'_, '_>,
    attr: &str,
    from_code: fn(&str) -> Option<T>,
) -> EagleResult<T> {
    Ok(parse_with(node, attr, from_code)?.unwrap_or_default())
}

fn rot(node: Node<'_, '_>) -> EagleResult<Rotation> {
    Ok(parse_with(node, "rot", Rotation::from_code)?.unwrap_or(Rotation::R0))
}

fn managed(node: Node<'_, '_>) -> EagleResult<Option<ManagedInfo>> {
    let Some(urn) = node.attribute("urn") else {
        return Ok(None);
    };
    Ok(Some(ManagedInfo {
        urn: urn.to_string(),
        library_version: opt_num(node, "library_version")?,
        locally_modified: flag(node, "locally_modified", false)?,
        library_locally_modified: flag(node, "library_locally_modified", false)?,
    }))
}

// Leaf elements

fn read_description(node: Node<'_, '_>) -> Description {
    Description {
        language: node.attribute("language").unwrap_or("en").to_string(),
        text: text_of(node),
    }
}

fn read_layer(node: Node<'_, '_>) -> EagleResult<LayerElement> {
    Ok(LayerElement {
        number: req_num(node, "number")?,
        name: req_string(node, "name")?,
        color: req_num(node, "color")?,
        fill: req_num(node, "fill")?,
        visible: flag(node, "visible", true)?,
        active: flag(node, "active", true)?,
    })
}

fn read_grid(node: Node<'_, '_>) -> EagleResult<Grid> {
    let defaults = Grid::default();
    let unit = |attr, default| -> EagleResult<GridUnit> {
        Ok(parse_with(node, attr, GridUnit::from_code)?.unwrap_or(default))
    };
    Ok(Grid {
        distance: num_or(node, "distance", defaults.distance)?,
        unitdist: unit("unitdist", defaults.unitdist)?,
        unit: unit("unit", defaults.unit)?,
        style: code(node, "style", GridStyle::from_code)?,
        multiple: num_or(node, "multiple", defaults.multiple)?,
        display: flag(node, "display", false)?,
        altdistance: num_or(node, "altdistance", defaults.altdistance)?,
        altunitdist: unit("altunitdist", defaults.altunitdist)?,
        altunit: unit("altunit", defaults.altunit)?,
    })
}

fn read_note(node: Node<'_, '_>) -> EagleResult<Note> {
    Ok(Note {
        version: node.attribute("version").unwrap_or_default().to_string(),
        minversion: opt_string(node, "minversion"),
        severity: code(node, "severity", Severity::from_code)?,
        text: text_of(node).trim().to_string(),
    })
}

fn read_wire(node: Node<'_, '_>) -> EagleResult<Wire> {
    Ok(Wire {
        x1: req_num(node, "x1")?,
        y1: req_num(node, "y1")?,
        x2: req_num(node, "x2")?,
        y2: req_num(node, "y2")?,
        width: req_num(node, "width")?,
        layer: req_num(node, "layer")?,
        extent: opt_string(node, "extent"),
        style: code(node, "style", WireStyle::from_code)?,
        curve: num_or(node, "curve", 0.0)?,
        cap: code(node, "cap", WireCap::from_code)?,
    })
}

fn read_circle(node: Node<'_, '_>) -> EagleResult<Circle> {
    Ok(Circle {
        x: req_num(node, "x")?,
        y: req_num(node, "y")?,
        radius: req_num(node, "radius")?,
        width: req_num(node, "width")?,
        layer: req_num(node, "layer")?,
    })
}

fn read_rectangle(node: Node<'_, '_>) -> EagleResult<Rectangle> {
    Ok(Rectangle {
        x1: req_num(node, "x1")?,
        y1: req_num(node, "y1")?,
        x2: req_num(node, "x2")?,
        y2: req_num(node, "y2")?,
        layer: req_num(node, "layer")?,
        rot: rot(node)?,
    })
}

fn read_text(node: Node<'_, '_>) -> EagleResult<Text> {
    Ok(Text {
        x: req_num(node, "x")?,
        y: req_num(node, "y")?,
        size: req_num(node, "size")?,
        layer: req_num(node, "layer")?,
        font: code(node, "font", TextFont::from_code)?,
        ratio: num_or(node, "ratio", 8)?,
        rot: rot(node)?,
        align: code(node, "align", Align::from_code)?,
        distance: num_or(node, "distance", 50)?,
        text: text_of(node),
    })
}

fn read_dimension(node: Node<'_, '_>) -> EagleResult<Dimension> {
    Ok(Dimension {
        x1: req_num(node, "x1")?,
        y1: req_num(node, "y1")?,
        x2: req_num(node, "x2")?,
        y2: req_num(node, "y2")?,
        x3: req_num(node, "x3")?,
        y3: req_num(node, "y3")?,
        layer: req_num(node, "layer")?,
        dtype: code(node, "dtype", DimensionType::from_code)?,
        width: opt_num(node, "width")?,
        extwidth: opt_num(node, "extwidth")?,
        extlength: opt_num(node, "extlength")?,
        extoffset: opt_num(node, "extoffset")?,
        textsize: opt_num(node, "textsize")?,
        textratio: num_or(node, "textratio", 8)?,
        unit: parse_with(node, "unit", GridUnit::from_code)?.unwrap_or(GridUnit::Mm),
        precision: num_or(node, "precision", 2)?,
        visible: flag(node, "visible", false)?,
    })
}

fn read_frame(node: Node<'_, '_>) -> EagleResult<Frame> {
    Ok(Frame {
        x1: req_num(node, "x1")?,
        y1: req_num(node, "y1")?,
        x2: req_num(node, "x2")?,
        y2: req_num(node, "y2")?,
        columns: req_num(node, "columns")?,
        rows: req_num(node, "rows")?,
        layer: req_num(node, "layer")?,
        border_left: flag(node, "border-left", true)?,
        border_top: flag(node, "border-top", true)?,
        border_right: flag(node, "border-right", true)?,
        border_bottom: flag(node, "border-bottom", true)?,
    })
}

fn read_hole(node: Node<'_, '_>) -> EagleResult<Hole> {
    Ok(Hole {
        x: req_num(node, "x")?,
        y: req_num(node, "y")?,
        drill: req_num(node, "drill")?,
    })
}

fn read_pad(node: Node<'_, '_>) -> EagleResult<PadThd> {
    let mut flags = PadFlags::empty();
    flags.set(PadFlags::STOP, flag(node, "stop", true)?);
    flags.set(PadFlags::THERMALS, flag(node, "thermals", true)?);
    flags.set(PadFlags::FIRST, flag(node, "first", false)?);
    Ok(PadThd {
        name: req_string(node, "name")?,
        x: req_num(node, "x")?,
        y: req_num(node, "y")?,
        drill: req_num(node, "drill")?,
        diameter: num_or(node, "diameter", 0.0)?,
        shape: code(node, "shape", PadShape::from_code)?,
        rot: rot(node)?,
        flags,
    })
}

fn read_smd(node: Node<'_, '_>) -> EagleResult<Smd> {
    let mut flags = PadFlags::empty();
    flags.set(PadFlags::STOP, flag(node, "stop", true)?);
    flags.set(PadFlags::THERMALS, flag(node, "thermals", true)?);
    flags.set(PadFlags::CREAM, flag(node, "cream", true)?);
    Ok(Smd {
        name: req_string(node, "name")?,
        x: req_num(node, "x")?,
        y: req_num(node, "y")?,
        dx: req_num(node, "dx")?,
        dy: req_num(node, "dy")?,
        layer: req_num(node, "layer")?,
        roundness: num_or(node, "roundness", 0)?,
        rot: rot(node)?,
        flags,
    })
}

fn read_via(node: Node<'_, '_>) -> EagleResult<Via> {
    Ok(Via {
        x: req_num(node, "x")?,
        y: req_num(node, "y")?,
        extent: req_string(node, "extent")?,
        drill: req_num(node, "drill")?,
        diameter: num_or(node, "diameter", 0.0)?,
        shape: code(node, "shape", ViaShape::from_code)?,
        always_stop: flag(node, "alwaysstop", false)?,
    })
}

fn read_pin(node: Node<'_, '_>) -> EagleResult<Pin> {
    let rot = rot(node)?;
    if !rot.is_orthogonal() {
        return Err(EagleError::invalid_attribute("pin", "rot", rot.code()));
    }
    Ok(Pin {
        name: req_string(node, "name")?,
        x: req_num(node, "x")?,
        y: req_num(node, "y")?,
        visible: code(node, "visible", PinVisible::from_code)?,
        length: code(node, "length", PinLength::from_code)?,
        direction: code(node, "direction", PinDirection::from_code)?,
        function: code(node, "function", PinFunction::from_code)?,
        swaplevel: num_or(node, "swaplevel", 0)?,
        rot,
        pad: None,
    })
}

fn read_attribute(node: Node<'_, '_>) -> EagleResult<Attribute> {
    Ok(Attribute {
        name: req_string(node, "name")?,
        value: opt_string(node, "value"),
        x: opt_num(node, "x")?,
        y: opt_num(node, "y")?,
        size: opt_num(node, "size")?,
        layer: opt_num(node, "layer")?,
        font: parse_with(node, "font", TextFont::from_code)?,
        ratio: opt_num(node, "ratio")?,
        rot: parse_with(node, "rot", Rotation::from_code)?,
        display: code(node, "display", AttributeDisplay::from_code)?,
        constant: flag(node, "constant", false)?,
    })
}

fn read_label(node: Node<'_, '_>) -> EagleResult<Label> {
    Ok(Label {
        x: req_num(node, "x")?,
        y: req_num(node, "y")?,
        size: req_num(node, "size")?,
        layer: req_num(node, "layer")?,
        font: code(node, "font", TextFont::from_code)?,
        ratio: num_or(node, "ratio", 8)?,
        rot: rot(node)?,
        xref: flag(node, "xref", false)?,
        align: parse_with(node, "align", Align::from_code)?,
    })
}

fn read_contactref(node: Node<'_, '_>) -> EagleResult<ContactRef> {
    Ok(ContactRef {
        element: req_string(node, "element")?,
        pad: req_string(node, "pad")?,
        route: code(node, "route", ContactRoute::from_code)?,
        routetag: node.attribute("routetag").unwrap_or_default().to_string(),
    })
}

struct Reader<'o> {
    options: &'o ReadOptions,
}

impl Reader<'_> {
    /// Handles an element that is not read at this position.
    fn skip(&self, node: Node<'_, '_>, parent: Node<'_, '_>) -> EagleResult<()> {
        let element = tag(node);
        let parent = tag(parent);
        if UNMODELED.contains(&element) {
            tracing::debug!(element, parent, "Skipping unmodeled element");
            Ok(())
        } else if self.options.strict {
            Err(EagleError::unexpected_element(element, parent))
        } else {
            tracing::warn!(element, parent, "Skipping unknown element");
            Ok(())
        }
    }

    /// Calls `f` for every `<name>` child; other children are skipped.
    fn each<'a, 'i>(
        &self,
        node: Node<'a, 'i>,
        name: &str,
        mut f: impl FnMut(Node<'a, 'i>) -> EagleResult<()>,
    ) -> EagleResult<()> {
        for child in elements(node) {
            if child.has_tag_name(name) {
                f(child)?;
            } else {
                self.skip(child, node)?;
            }
        }
        Ok(())
    }

    fn read_document(&self, doc: &Document<'_>) -> EagleResult<Drawing> {
        let root = doc.root_element();
        if !root.has_tag_name("eagle") {
            return Err(EagleError::unexpected_element(tag(root), "document"));
        }

        let mut notes = Vec::new();
        let mut drawing = None;
        for child in elements(root) {
            match tag(child) {
                "compatibility" => self.each(child, "note", |n| {
                    notes.push(read_note(n)?);
                    Ok(())
                })?,
                "drawing" => drawing = Some(self.read_drawing(child)?),
                _ => self.skip(child, root)?,
            }
        }

        let mut drawing = drawing.ok_or_else(|| EagleError::missing_element("drawing", "eagle"))?;
        drawing.version = root
            .attribute("version")
            .unwrap_or(DRAWING_VERSION)
            .to_string();
        drawing.notes = notes;
        Ok(drawing)
    }

    fn read_drawing(&self, node: Node<'_, '_>) -> EagleResult<Drawing> {
        let mut settings = IndexMap::new();
        let mut grid = Grid::default();
        let mut filters = Vec::new();
        let mut layers = Vec::new();
        let mut approved = Vec::new();
        let mut design = None;

        for child in elements(node) {
            match tag(child) {
                "settings" => self.each(child, "setting", |s| {
                    for attr in s.attributes() {
                        settings.insert(attr.name().to_string(), attr.value().to_string());
                    }
                    Ok(())
                })?,
                "grid" => grid = read_grid(child)?,
                "filters" => self.each(child, "filter", |f| {
                    filters.push(Filter {
                        name: req_string(f, "name")?,
                        expression: req_string(f, "expression")?,
                    });
                    Ok(())
                })?,
                "layers" => self.each(child, "layer", |l| {
                    layers.push(read_layer(l)?);
                    Ok(())
                })?,
                "library" => design = Some(Design::Library(self.read_library(child)?)),
                "schematic" => {
                    design = Some(Design::Schematic(
                        self.read_schematic(child, &mut approved)?,
                    ));
                }
                "board" => design = Some(Design::Board(self.read_board(child, &mut approved)?)),
                _ => self.skip(child, node)?,
            }
        }

        let design =
            design.ok_or_else(|| EagleError::missing_element("library|schematic|board", "drawing"))?;

        // Defaults are seeded by the constructor; file layers override them.
        let mut drawing = Drawing::from_design(design);
        for layer in layers {
            drawing.layers_mut().insert(layer);
        }
        *drawing.grid_mut() = grid;
        drawing.settings = settings;
        drawing.filters = filters;
        drawing.approved = approved;
        Ok(drawing)
    }

    // Graphics

    fn read_graphic(&self, node: Node<'_, '_>) -> EagleResult<Graphic> {
        Ok(match tag(node) {
            "wire" => Graphic::Wire(read_wire(node)?),
            "polygon" => Graphic::Polygon(self.read_polygon(node)?),
            "circle" => Graphic::Circle(read_circle(node)?),
            "rectangle" => Graphic::Rectangle(read_rectangle(node)?),
            "text" => Graphic::Text(read_text(node)?),
            "dimension" => Graphic::Dimension(read_dimension(node)?),
            "frame" => Graphic::Frame(read_frame(node)?),
            "hole" => Graphic::Hole(read_hole(node)?),
            "pad" => Graphic::Pad(read_pad(node)?),
            "smd" => Graphic::Smd(read_smd(node)?),
            "pin" => Graphic::Pin(read_pin(node)?),
            other => {
                let parent = node.parent_element().map_or("", tag);
                return Err(EagleError::unexpected_element(other, parent));
            }
        })
    }

    /// Reads the graphic children of `node` that `allowed` names.
    fn read_graphics(
        &self,
        node: Node<'_, '_>,
        allowed: &[&str],
        graphics: &mut Vec<Graphic>,
        description: &mut Option<Description>,
    ) -> EagleResult<()> {
        for child in elements(node) {
            let name = tag(child);
            if name == "description" {
                if description.is_none() {
                    *description = Some(read_description(child));
                }
            } else if allowed.contains(&name) {
                graphics.push(self.read_graphic(child)?);
            } else {
                self.skip(child, node)?;
            }
        }
        Ok(())
    }

    fn read_plain(&self, node: Node<'_, '_>) -> EagleResult<Vec<Graphic>> {
        let mut graphics = Vec::new();
        let mut ignored = None;
        self.read_graphics(node, PLAIN_GRAPHICS, &mut graphics, &mut ignored)?;
        Ok(graphics)
    }

    fn read_polygon(&self, node: Node<'_, '_>) -> EagleResult<Polygon> {
        let mut vertices = Vec::new();
        self.each(node, "vertex", |v| {
            vertices.push(Vertex {
                x: req_num(v, "x")?,
                y: req_num(v, "y")?,
                curve: num_or(v, "curve", 0.0)?,
            });
            Ok(())
        })?;
        Ok(Polygon {
            width: req_num(node, "width")?,
            layer: req_num(node, "layer")?,
            spacing: opt_num(node, "spacing")?,
            pour: code(node, "pour", PolygonPour::from_code)?,
            isolate: opt_num(node, "isolate")?,
            orphans: flag(node, "orphans", false)?,
            thermals: flag(node, "thermals", true)?,
            rank: num_or(node, "rank", 0)?,
            vertices,
        })
    }

    // Libraries

    fn read_library(&self, node: Node<'_, '_>) -> EagleResult<Library> {
        let mut library = match node.attribute("name") {
            Some(name) => Library::embedded(name, opt_string(node, "urn")),
            None => Library::new(),
        };

        for child in elements(node) {
            match tag(child) {
                "description" => library.descriptions.push(read_description(child)),
                "packages" => self.each(child, "package", |n| {
                    library.add_package(self.read_package(n)?);
                    Ok(())
                })?,
                "packages3d" => self.each(child, "package3d", |n| {
                    library.add_package3d(self.read_package3d(n)?);
                    Ok(())
                })?,
                "symbols" => self.each(child, "symbol", |n| {
                    library.add_symbol(self.read_symbol(n)?);
                    Ok(())
                })?,
                "devicesets" => self.each(child, "deviceset", |n| {
                    library.add_device_set(self.read_device_set(n)?);
                    Ok(())
                })?,
                _ => self.skip(child, node)?,
            }
        }

        for (collection, name) in library.duplicate_names() {
            tracing::warn!(
                library = library.name.as_deref().unwrap_or("<standalone>"),
                collection,
                name = %name,
                "Duplicate name, first definition wins"
            );
        }

        Ok(library)
    }

    fn read_package(&self, node: Node<'_, '_>) -> EagleResult<Package> {
        let mut package = Package::new(req(node, "name")?);
        package.managed = managed(node)?;
        self.read_graphics(
            node,
            PACKAGE_GRAPHICS,
            &mut package.graphics,
            &mut package.description,
        )?;
        Ok(package)
    }

    fn read_symbol(&self, node: Node<'_, '_>) -> EagleResult<Symbol> {
        let mut symbol = Symbol::new(req(node, "name")?);
        symbol.managed = managed(node)?;
        self.read_graphics(
            node,
            SYMBOL_GRAPHICS,
            &mut symbol.graphics,
            &mut symbol.description,
        )?;
        Ok(symbol)
    }

    fn read_package3d(&self, node: Node<'_, '_>) -> EagleResult<Package3d> {
        let mut description = None;
        let mut instances = Vec::new();
        for child in elements(node) {
            match tag(child) {
                "description" => description = Some(read_description(child)),
                "packageinstances" => self.each(child, "packageinstance", |n| {
                    instances.push(PackageInstance {
                        name: req_string(n, "name")?,
                    });
                    Ok(())
                })?,
                _ => self.skip(child, node)?,
            }
        }
        Ok(Package3d {
            name: req_string(node, "name")?,
            urn: req_string(node, "urn")?,
            package_type: node.attribute("type").unwrap_or_default().to_string(),
            description,
            instances,
            managed: managed(node)?,
        })
    }

    fn read_device_set(&self, node: Node<'_, '_>) -> EagleResult<DeviceSet> {
        let mut set = DeviceSet::new(
            req(node, "name")?,
            node.attribute("prefix").unwrap_or_default(),
        );
        set.uservalue = flag(node, "uservalue", false)?;
        set.managed = managed(node)?;

        for child in elements(node) {
            match tag(child) {
                "description" => set.description = Some(read_description(child)),
                "gates" => self.each(child, "gate", |n| {
                    let mut gate = Gate::new(
                        req(n, "name")?,
                        req(n, "symbol")?,
                        req_num(n, "x")?,
                        req_num(n, "y")?,
                    );
                    gate.addlevel = code(n, "addlevel", GateAddLevel::from_code)?;
                    gate.swaplevel = num_or(n, "swaplevel", 0)?;
                    set.gates.push(gate);
                    Ok(())
                })?,
                "devices" => self.each(child, "device", |n| {
                    set.devices.push(self.read_device(n)?);
                    Ok(())
                })?,
                _ => self.skip(child, node)?,
            }
        }
        Ok(set)
    }

    fn read_device(&self, node: Node<'_, '_>) -> EagleResult<Device> {
        let mut device = Device {
            name: node.attribute("name").unwrap_or_default().to_string(),
            package: opt_string(node, "package"),
            connects: Vec::new(),
            technologies: Vec::new(),
            package3d_instances: Vec::new(),
        };

        for child in elements(node) {
            match tag(child) {
                "connects" => self.each(child, "connect", |n| {
                    let mut connect = Connect::new(req(n, "gate")?, req(n, "pin")?, req(n, "pad")?);
                    connect.route = code(n, "route", ContactRoute::from_code)?;
                    device.connects.push(connect);
                    Ok(())
                })?,
                "package3dinstances" => self.each(child, "package3dinstance", |n| {
                    device.package3d_instances.push(Package3dInstance {
                        package3d_urn: req_string(n, "package3d_urn")?,
                    });
                    Ok(())
                })?,
                "technologies" => self.each(child, "technology", |n| {
                    device.technologies.push(self.read_technology(n)?);
                    Ok(())
                })?,
                _ => self.skip(child, node)?,
            }
        }
        Ok(device)
    }

    fn read_technology(&self, node: Node<'_, '_>) -> EagleResult<Technology> {
        let mut attributes = Vec::new();
        self.each(node, "attribute", |n| {
            attributes.push(TechnologyAttribute {
                name: req_string(n, "name")?,
                value: n.attribute("value").unwrap_or_default().to_string(),
                constant: flag(n, "constant", false)?,
            });
            Ok(())
        })?;
        Ok(Technology {
            name: req_string(node, "name")?,
            attributes,
        })
    }

    // Sections shared by schematics and boards

    fn read_libraries(&self, node: Node<'_, '_>) -> EagleResult<Vec<Library>> {
        let mut libraries = Vec::new();
        self.each(node, "library", |n| {
            libraries.push(self.read_library(n)?);
            Ok(())
        })?;
        Ok(libraries)
    }

    fn read_attributes(&self, node: Node<'_, '_>) -> EagleResult<Vec<Attribute>> {
        let mut attributes = Vec::new();
        self.each(node, "attribute", |n| {
            attributes.push(read_attribute(n)?);
            Ok(())
        })?;
        Ok(attributes)
    }

    fn read_variant_defs(&self, node: Node<'_, '_>) -> EagleResult<Vec<VariantDef>> {
        let mut defs = Vec::new();
        self.each(node, "variantdef", |n| {
            defs.push(VariantDef {
                name: req_string(n, "name")?,
                current: flag(n, "current", false)?,
            });
            Ok(())
        })?;
        Ok(defs)
    }

    fn read_classes(&self, node: Node<'_, '_>) -> EagleResult<Vec<NetClass>> {
        let mut classes = Vec::new();
        self.each(node, "class", |n| {
            let mut clearances = Vec::new();
            self.each(n, "clearance", |c| {
                clearances.push(Clearance {
                    class: req_num(c, "class")?,
                    value: num_or(c, "value", 0.0)?,
                });
                Ok(())
            })?;
            classes.push(NetClass {
                number: req_num(n, "number")?,
                name: req_string(n, "name")?,
                width: num_or(n, "width", 0.0)?,
                drill: num_or(n, "drill", 0.0)?,
                clearances,
            });
            Ok(())
        })?;
        Ok(classes)
    }

    fn read_errors(&self, node: Node<'_, '_>, approved: &mut Vec<String>) -> EagleResult<()> {
        self.each(node, "approved", |n| {
            approved.push(req_string(n, "hash")?);
            Ok(())
        })
    }

    // Schematics

    fn read_schematic(
        &self,
        node: Node<'_, '_>,
        approved: &mut Vec<String>,
    ) -> EagleResult<Schematic> {
        let mut schematic = Schematic {
            xreflabel: opt_string(node, "xreflabel"),
            xrefpart: opt_string(node, "xrefpart"),
            ..Schematic::default()
        };

        for child in elements(node) {
            match tag(child) {
                "description" => schematic.description = Some(read_description(child)),
                "libraries" => schematic.libraries = self.read_libraries(child)?,
                "attributes" => schematic.attributes = self.read_attributes(child)?,
                "variantdefs" => schematic.variant_defs = self.read_variant_defs(child)?,
                "classes" => schematic.classes = self.read_classes(child)?,
                "parts" => self.each(child, "part", |n| {
                    schematic.parts.push(self.read_part(n)?);
                    Ok(())
                })?,
                "sheets" => self.each(child, "sheet", |n| {
                    schematic.sheets.push(self.read_sheet(n)?);
                    Ok(())
                })?,
                "errors" => self.read_errors(child, approved)?,
                _ => self.skip(child, node)?,
            }
        }
        Ok(schematic)
    }

    fn read_part(&self, node: Node<'_, '_>) -> EagleResult<Part> {
        let mut attributes = Vec::new();
        self.each(node, "attribute", |n| {
            attributes.push(read_attribute(n)?);
            Ok(())
        })?;
        Ok(Part {
            name: req_string(node, "name")?,
            library: req_string(node, "library")?,
            library_urn: opt_string(node, "library_urn"),
            deviceset: req_string(node, "deviceset")?,
            device: req_string(node, "device")?,
            package3d_urn: opt_string(node, "package3d_urn"),
            technology: node.attribute("technology").unwrap_or_default().to_string(),
            value: opt_string(node, "value"),
            attributes,
        })
    }

    fn read_sheet(&self, node: Node<'_, '_>) -> EagleResult<Sheet> {
        let mut sheet = Sheet::default();
        let mut busses = Vec::new();
        let mut nets = Vec::new();

        for child in elements(node) {
            match tag(child) {
                "description" => sheet.description = Some(read_description(child)),
                "plain" => sheet.plain = self.read_plain(child)?,
                "instances" => self.each(child, "instance", |n| {
                    sheet.instances.push(Instance {
                        part: req_string(n, "part")?,
                        gate: req_string(n, "gate")?,
                        x: req_num(n, "x")?,
                        y: req_num(n, "y")?,
                        smashed: flag(n, "smashed", false)?,
                        rot: rot(n)?,
                        attributes: self.read_attributes(n)?,
                    });
                    Ok(())
                })?,
                "busses" => self.each(child, "bus", |n| {
                    let mut bus = Net::bus(req(n, "name")?);
                    bus.segments = self.read_segments(n)?;
                    busses.push(bus);
                    Ok(())
                })?,
                "nets" => self.each(child, "net", |n| {
                    let mut net = Net::net(req(n, "name")?, num_or(n, "class", 0)?);
                    net.segments = self.read_segments(n)?;
                    nets.push(net);
                    Ok(())
                })?,
                _ => self.skip(child, node)?,
            }
        }

        busses.append(&mut nets);
        sheet.nets = busses;
        Ok(sheet)
    }

    fn read_segments(&self, node: Node<'_, '_>) -> EagleResult<Vec<Segment>> {
        let mut segments = Vec::new();
        self.each(node, "segment", |seg| {
            let mut items = Vec::new();
            for child in elements(seg) {
                let item = match tag(child) {
                    "pinref" => SegmentItem::PinRef(PinRef {
                        part: req_string(child, "part")?,
                        gate: req_string(child, "gate")?,
                        pin: req_string(child, "pin")?,
                    }),
                    "portref" => SegmentItem::PortRef(PortRef {
                        moduleinst: req_string(child, "moduleinst")?,
                        port: req_string(child, "port")?,
                    }),
                    "wire" => SegmentItem::Wire(read_wire(child)?),
                    "junction" => SegmentItem::Junction(Junction {
                        x: req_num(child, "x")?,
                        y: req_num(child, "y")?,
                    }),
                    "label" => SegmentItem::Label(read_label(child)?),
                    "probe" => SegmentItem::Probe(read_label(child)?),
                    _ => {
                        self.skip(child, seg)?;
                        continue;
                    }
                };
                items.push(item);
            }
            segments.push(Segment { items });
            Ok(())
        })?;
        Ok(segments)
    }

    // Boards

    fn read_board(&self, node: Node<'_, '_>, approved: &mut Vec<String>) -> EagleResult<Board> {
        let mut board = Board::default();

        for child in elements(node) {
            match tag(child) {
                "description" => board.description = Some(read_description(child)),
                "plain" => board.plain = self.read_plain(child)?,
                "libraries" => board.libraries = self.read_libraries(child)?,
                "attributes" => board.attributes = self.read_attributes(child)?,
                "variantdefs" => board.variant_defs = self.read_variant_defs(child)?,
                "classes" => board.classes = self.read_classes(child)?,
                "designrules" => board.design_rules = Some(self.read_design_rules(child)?),
                "elements" => self.each(child, "element", |n| {
                    board.elements.push(self.read_element(n)?);
                    Ok(())
                })?,
                "signals" => self.each(child, "signal", |n| {
                    board.signals.push(self.read_signal(n)?);
                    Ok(())
                })?,
                "errors" => self.read_errors(child, approved)?,
                _ => self.skip(child, node)?,
            }
        }
        Ok(board)
    }

    fn read_design_rules(&self, node: Node<'_, '_>) -> EagleResult<DesignRules> {
        let mut rules = DesignRules {
            name: req_string(node, "name")?,
            ..DesignRules::default()
        };
        for child in elements(node) {
            match tag(child) {
                "description" => rules.descriptions.push(read_description(child)),
                "param" => rules.params.push(Param {
                    name: req_string(child, "name")?,
                    value: req_string(child, "value")?,
                }),
                _ => self.skip(child, node)?,
            }
        }
        Ok(rules)
    }

    fn read_element(&self, node: Node<'_, '_>) -> EagleResult<Element> {
        Ok(Element {
            name: req_string(node, "name")?,
            library: req_string(node, "library")?,
            library_urn: opt_string(node, "library_urn"),
            package: req_string(node, "package")?,
            package3d_urn: opt_string(node, "package3d_urn"),
            value: node.attribute("value").unwrap_or_default().to_string(),
            x: req_num(node, "x")?,
            y: req_num(node, "y")?,
            locked: flag(node, "locked", false)?,
            populate: flag(node, "populate", true)?,
            smashed: flag(node, "smashed", false)?,
            rot: rot(node)?,
            attributes: self.read_attributes(node)?,
        })
    }

    fn read_signal(&self, node: Node<'_, '_>) -> EagleResult<Signal> {
        let mut signal = Signal::new(req(node, "name")?);
        signal.class = num_or(node, "class", 0)?;
        signal.airwires_hidden = flag(node, "airwireshidden", false)?;

        for child in elements(node) {
            let item = match tag(child) {
                "contactref" => SignalItem::ContactRef(read_contactref(child)?),
                "polygon" => SignalItem::Polygon(self.read_polygon(child)?),
                "wire" => SignalItem::Wire(read_wire(child)?),
                "via" => SignalItem::Via(read_via(child)?),
                _ => {
                    self.skip(child, node)?;
                    continue;
                }
            };
            signal.items.push(item);
        }
        Ok(signal)
    }
}
