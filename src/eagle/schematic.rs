//! Schematic designs: parts, sheets, instances and nets.

use serde::{Deserialize, Serialize};

use super::design::{Attribute, NetClass, VariantDef};
use super::enums::{Align, TextFont};
use super::library::{Description, DeviceSet, Library};
use super::primitives::{find_by_name, Graphic, Named, Wire};
use super::rotation::Rotation;

const fn default_ratio() -> u8 {
    8
}

/// Electrical role of a schematic net.
///
/// A bus bundles nets by name and carries no net class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Electrical {
    /// Ordinary net of a net class.
    Net {
        /// Net class number.
        class: u32,
    },
    /// Bus.
    Bus,
}

/// A net or bus of one sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Net {
    /// Net or bus name (bus names list members, e.g. `D[0..7]`).
    pub name: String,
    /// Net or bus.
    pub electrical: Electrical,
    /// Connected segments.
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl Net {
    /// Creates a net of a class.
    #[must_use]
    pub fn net(name: impl Into<String>, class: u32) -> Self {
        Self {
            name: name.into(),
            electrical: Electrical::Net { class },
            segments: Vec::new(),
        }
    }

    /// Creates a bus.
    #[must_use]
    pub fn bus(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            electrical: Electrical::Bus,
            segments: Vec::new(),
        }
    }

    /// True for a bus.
    #[must_use]
    pub const fn is_bus(&self) -> bool {
        matches!(self.electrical, Electrical::Bus)
    }

    /// Net class number, or `-1` for a bus.
    #[must_use]
    pub fn net_class(&self) -> i64 {
        match self.electrical {
            Electrical::Net { class } => i64::from(class),
            Electrical::Bus => -1,
        }
    }

    /// All pin references across segments.
    pub fn pin_refs(&self) -> impl Iterator<Item = &PinRef> {
        self.segments
            .iter()
            .flat_map(|s| s.items.iter())
            .filter_map(|item| match item {
                SegmentItem::PinRef(pin_ref) => Some(pin_ref),
                _ => None,
            })
    }
}

/// A connected piece of a net.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Items in file order.
    #[serde(default)]
    pub items: Vec<SegmentItem>,
}

/// Reference to a pin of a placed gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinRef {
    /// Part name.
    pub part: String,
    /// Gate name.
    pub gate: String,
    /// Pin name.
    pub pin: String,
}

/// Reference to a port of a module instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRef {
    /// Module instance name.
    pub moduleinst: String,
    /// Port name.
    pub port: String,
}

/// A junction dot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Junction {
    /// X position.
    pub x: f64,
    /// Y position.
    pub y: f64,
}

/// A net label or probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// X position.
    pub x: f64,
    /// Y position.
    pub y: f64,
    /// Text size.
    pub size: f64,
    /// Layer number.
    pub layer: u8,
    /// Font.
    #[serde(default)]
    pub font: TextFont,
    /// Text ratio.
    #[serde(default = "default_ratio")]
    pub ratio: u8,
    /// Orientation.
    #[serde(default)]
    pub rot: Rotation,
    /// Cross-reference label.
    #[serde(default)]
    pub xref: bool,
    /// Anchor alignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
}

/// One item of a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentItem {
    /// Pin reference.
    PinRef(PinRef),
    /// Module port reference.
    PortRef(PortRef),
    /// Net wire.
    Wire(Wire),
    /// Junction.
    Junction(Junction),
    /// Label.
    Label(Label),
    /// Simulation probe.
    Probe(Label),
}

/// A placed part (one per reference designator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Reference designator.
    pub name: String,
    /// Embedded library name.
    pub library: String,
    /// Embedded library URN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_urn: Option<String>,
    /// Device set name.
    pub deviceset: String,
    /// Device name.
    pub device: String,
    /// Selected 3D package.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package3d_urn: Option<String>,
    /// Technology suffix.
    #[serde(default)]
    pub technology: String,
    /// Value (for user-value device sets).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Attributes.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

/// A placed gate of a part on a sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// Part name.
    pub part: String,
    /// Gate name.
    pub gate: String,
    /// X position.
    pub x: f64,
    /// Y position.
    pub y: f64,
    /// Name/value texts detached from the symbol.
    #[serde(default)]
    pub smashed: bool,
    /// Orientation.
    #[serde(default)]
    pub rot: Rotation,
    /// Placed attributes.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

/// One schematic page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
    /// Free graphics.
    #[serde(default)]
    pub plain: Vec<Graphic>,
    /// Placed gates.
    #[serde(default)]
    pub instances: Vec<Instance>,
    /// Busses and nets (busses first, as in the file).
    #[serde(default)]
    pub nets: Vec<Net>,
}

impl Sheet {
    /// First net or bus with the given name.
    ///
    /// Busses precede nets, so a bus shadows a net of the same name; use
    /// [`Sheet::net_only`] to skip busses.
    #[must_use]
    pub fn net(&self, name: &str) -> Option<&Net> {
        find_by_name(&self.nets, name)
    }

    /// First net (not bus) with the given name.
    #[must_use]
    pub fn net_only(&self, name: &str) -> Option<&Net> {
        self.nets.iter().find(|n| !n.is_bus() && n.name == name)
    }

    /// Busses on this sheet.
    pub fn busses(&self) -> impl Iterator<Item = &Net> {
        self.nets.iter().filter(|n| n.is_bus())
    }
}

/// A schematic design.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schematic {
    /// Cross-reference label format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xreflabel: Option<String>,
    /// Cross-reference part format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xrefpart: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
    /// Embedded libraries.
    #[serde(default)]
    pub libraries: Vec<Library>,
    /// Global attributes.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Assembly variants.
    #[serde(default)]
    pub variant_defs: Vec<VariantDef>,
    /// Net classes.
    #[serde(default)]
    pub classes: Vec<NetClass>,
    /// Parts.
    #[serde(default)]
    pub parts: Vec<Part>,
    /// Sheets.
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

impl Schematic {
    /// First part with the given name.
    #[must_use]
    pub fn part(&self, name: &str) -> Option<&Part> {
        find_by_name(&self.parts, name)
    }

    /// First embedded library with the given name.
    #[must_use]
    pub fn library(&self, name: &str) -> Option<&Library> {
        find_by_name(&self.libraries, name)
    }

    /// Device set a part was placed from.
    #[must_use]
    pub fn part_device_set(&self, part: &Part) -> Option<&DeviceSet> {
        self.library(&part.library)?.device_set(&part.deviceset)
    }

    /// Net class by number.
    #[must_use]
    pub fn class(&self, number: u32) -> Option<&NetClass> {
        self.classes.iter().find(|c| c.number == number)
    }

    /// Every net segment of a name across all sheets.
    pub fn nets_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Net> + 'a {
        self.sheets
            .iter()
            .flat_map(|sheet| sheet.nets.iter())
            .filter(move |net| net.name == name)
    }
}

impl Named for Net {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Part {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_net_duality() {
        let bus = Net::bus("D[0..7]");
        assert!(bus.is_bus());
        assert!(bus.net_class() < 0);

        let net = Net::net("GND", 1);
        assert!(!net.is_bus());
        assert_eq!(net.net_class(), 1);
    }

    #[test]
    fn pin_refs_across_segments() {
        let mut net = Net::net("VCC", 0);
        net.segments.push(Segment {
            items: vec![
                SegmentItem::PinRef(PinRef {
                    part: "R1".to_string(),
                    gate: "G$1".to_string(),
                    pin: "1".to_string(),
                }),
                SegmentItem::Junction(Junction { x: 0.0, y: 0.0 }),
            ],
        });
        net.segments.push(Segment {
            items: vec![SegmentItem::PinRef(PinRef {
                part: "C1".to_string(),
                gate: "G$1".to_string(),
                pin: "2".to_string(),
            })],
        });
        let parts: Vec<_> = net.pin_refs().map(|p| p.part.as_str()).collect();
        assert_eq!(parts, vec!["R1", "C1"]);
    }

    #[test]
    fn nets_named_spans_sheets() {
        let mut sch = Schematic::default();
        for _ in 0..2 {
            sch.sheets.push(Sheet {
                nets: vec![Net::net("GND", 0), Net::bus("B")],
                ..Sheet::default()
            });
        }
        assert_eq!(sch.nets_named("GND").count(), 2);
        assert_eq!(sch.sheets[0].busses().count(), 1);
        assert!(sch.part("R1").is_none());
    }

    #[test]
    fn bus_shadows_net_of_same_name() {
        let sheet = Sheet {
            nets: vec![Net::bus("CLK"), Net::net("CLK", 2)],
            ..Sheet::default()
        };
        assert!(sheet.net("CLK").unwrap().is_bus());
        assert_eq!(sheet.net_only("CLK").unwrap().net_class(), 2);
        assert!(sheet.net_only("DATA").is_none());
    }
}
