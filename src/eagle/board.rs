//! Board designs: placed elements, routed signals and design rules.

use serde::{Deserialize, Serialize};

use super::design::{Attribute, NetClass, VariantDef};
use super::enums::{ContactRoute, DesignRule};
use super::library::{Description, Library, Package};
use super::primitives::{find_by_name, Graphic, Named, Polygon, Via, Wire};
use super::rotation::Rotation;
use super::values::{parse_length_mm, RealValue};

const fn default_true() -> bool {
    true
}

/// A placed package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Reference designator.
    pub name: String,
    /// Embedded library name.
    pub library: String,
    /// Embedded library URN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_urn: Option<String>,
    /// Package name.
    pub package: String,
    /// Selected 3D package.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package3d_urn: Option<String>,
    /// Value text.
    #[serde(default)]
    pub value: String,
    /// X position.
    pub x: f64,
    /// Y position.
    pub y: f64,
    /// Position locked.
    #[serde(default)]
    pub locked: bool,
    /// Populated in assembly.
    #[serde(default = "default_true")]
    pub populate: bool,
    /// Name/value texts detached.
    #[serde(default)]
    pub smashed: bool,
    /// Orientation (mirrored = bottom side).
    #[serde(default)]
    pub rot: Rotation,
    /// Attributes.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

/// Connection of a signal to an element pad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRef {
    /// Element name.
    pub element: String,
    /// Pad name.
    pub pad: String,
    /// Routing requirement.
    #[serde(default)]
    pub route: ContactRoute,
    /// Route tag.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub routetag: String,
}

/// One item of a signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalItem {
    /// Pad connection.
    ContactRef(ContactRef),
    /// Copper pour.
    Polygon(Polygon),
    /// Track.
    Wire(Wire),
    /// Via.
    Via(Via),
}

/// A routed electrical connection on a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Signal name.
    pub name: String,
    /// Net class number.
    #[serde(default)]
    pub class: u32,
    /// Airwires hidden.
    #[serde(default)]
    pub airwires_hidden: bool,
    /// Items in file order.
    #[serde(default)]
    pub items: Vec<SignalItem>,
}

impl Signal {
    /// Creates an empty signal.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: 0,
            airwires_hidden: false,
            items: Vec::new(),
        }
    }

    /// Pad connections.
    pub fn contacts(&self) -> impl Iterator<Item = &ContactRef> {
        self.items.iter().filter_map(|item| match item {
            SignalItem::ContactRef(c) => Some(c),
            _ => None,
        })
    }

    /// Vias.
    pub fn vias(&self) -> impl Iterator<Item = &Via> {
        self.items.iter().filter_map(|item| match item {
            SignalItem::Via(v) => Some(v),
            _ => None,
        })
    }
}

/// One design rule parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name.
    pub name: String,
    /// Raw value (may carry a unit suffix).
    pub value: String,
}

/// A named design rule set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignRules {
    /// Rule set name.
    pub name: String,
    /// Descriptions per language.
    #[serde(default)]
    pub descriptions: Vec<Description>,
    /// Parameters in file order.
    #[serde(default)]
    pub params: Vec<Param>,
}

impl DesignRules {
    /// Raw value of a rule, or an empty string when the set lacks it.
    #[must_use]
    pub fn get(&self, rule: DesignRule) -> &str {
        if let Some(param) = self.params.iter().find(|p| p.name == rule.code()) {
            &param.value
        } else {
            tracing::warn!(rules = %self.name, rule = %rule, "Design rule not found");
            ""
        }
    }

    /// Value of a length rule in millimetres with its allowed bounds.
    ///
    /// Returns `None` when the rule is missing, is not a length, or holds a
    /// list (layer-dependent rules).
    #[must_use]
    pub fn real_param(&self, rule: DesignRule) -> Option<RealValue> {
        let (min, max) = length_bounds(rule)?;
        let value = parse_length_mm(self.get(rule))?;
        Some(RealValue::new(value, min, max))
    }

    /// Sets or adds a parameter.
    pub fn set(&mut self, rule: DesignRule, value: impl Into<String>) {
        let value = value.into();
        if let Some(param) = self.params.iter_mut().find(|p| p.name == rule.code()) {
            param.value = value;
        } else {
            self.params.push(Param {
                name: rule.code().to_string(),
                value,
            });
        }
    }
}

/// Exclusive bounds (mm) of rules that hold a single length.
const fn length_bounds(rule: DesignRule) -> Option<(f64, f64)> {
    match rule {
        DesignRule::MdWireWire
        | DesignRule::MdWirePad
        | DesignRule::MdWireVia
        | DesignRule::MdPadPad
        | DesignRule::MdPadVia
        | DesignRule::MdViaVia
        | DesignRule::MdSmdPad
        | DesignRule::MdSmdVia
        | DesignRule::MdSmdSmd
        | DesignRule::MdCopperDimension
        | DesignRule::MdDrill
        | DesignRule::MdSmdStop
        | DesignRule::SlThermalIsolate => Some((-0.000_001, 100.0)),
        DesignRule::MsWidth | DesignRule::MsDrill | DesignRule::MsMicroVia => Some((0.0, 100.0)),
        DesignRule::RlMinPadTop
        | DesignRule::RlMaxPadTop
        | DesignRule::RlMinViaOuter
        | DesignRule::RlMaxViaOuter
        | DesignRule::MlMinStopFrame
        | DesignRule::MlMaxStopFrame
        | DesignRule::MlMinCreamFrame
        | DesignRule::MlMaxCreamFrame
        | DesignRule::MlViaStopLimit => Some((-0.000_001, 10.0)),
        _ => None,
    }
}

/// A board design.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
    /// Free graphics (outline, documentation).
    #[serde(default)]
    pub plain: Vec<Graphic>,
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
    /// Design rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_rules: Option<DesignRules>,
    /// Placed elements.
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Signals.
    #[serde(default)]
    pub signals: Vec<Signal>,
}

impl Board {
    /// First element with the given name.
    #[must_use]
    pub fn element(&self, name: &str) -> Option<&Element> {
        find_by_name(&self.elements, name)
    }

    /// First signal with the given name.
    #[must_use]
    pub fn signal(&self, name: &str) -> Option<&Signal> {
        find_by_name(&self.signals, name)
    }

    /// First embedded library with the given name.
    #[must_use]
    pub fn library(&self, name: &str) -> Option<&Library> {
        find_by_name(&self.libraries, name)
    }

    /// Package an element was placed from.
    #[must_use]
    pub fn element_package(&self, element: &Element) -> Option<&Package> {
        self.library(&element.library)?.package(&element.package)
    }

    /// Signal connected to an element pad.
    #[must_use]
    pub fn signal_at(&self, element: &str, pad: &str) -> Option<&Signal> {
        self.signals
            .iter()
            .find(|s| s.contacts().any(|c| c.element == element && c.pad == pad))
    }
}

impl Named for Element {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Signal {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> DesignRules {
        let mut rules = DesignRules {
            name: "default".to_string(),
            ..DesignRules::default()
        };
        rules.set(DesignRule::MdWireWire, "8mil");
        rules.set(DesignRule::MsDrill, "0.35mm");
        rules.set(DesignRule::LayerSetup, "(1*16)");
        rules
    }

    #[test]
    fn lookup_hit_and_miss() {
        let rules = rules();
        assert_eq!(rules.get(DesignRule::LayerSetup), "(1*16)");
        assert_eq!(rules.get(DesignRule::MaxErrors), "");
    }

    #[test]
    fn real_param_converts_units() {
        let rules = rules();
        let clearance = rules.real_param(DesignRule::MdWireWire).unwrap();
        assert!((clearance.value - 0.2032).abs() < 1e-9);
        assert!(clearance.is_in_range());
        assert!(rules.real_param(DesignRule::LayerSetup).is_none());
        assert!(rules.real_param(DesignRule::MdPadPad).is_none());
    }

    #[test]
    fn set_replaces_existing() {
        let mut rules = rules();
        rules.set(DesignRule::MsDrill, "0.3mm");
        assert_eq!(rules.params.len(), 3);
        assert_eq!(rules.get(DesignRule::MsDrill), "0.3mm");
    }

    #[test]
    fn signal_at_finds_contact() {
        let mut board = Board::default();
        let mut sig = Signal::new("GND");
        sig.items.push(SignalItem::ContactRef(ContactRef {
            element: "C1".to_string(),
            pad: "2".to_string(),
            route: ContactRoute::All,
            routetag: String::new(),
        }));
        board.signals.push(sig);
        assert_eq!(board.signal_at("C1", "2").unwrap().name, "GND");
        assert!(board.signal_at("C1", "1").is_none());
        assert!(board.element("C1").is_none());
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn lookup_miss_logs_a_warning() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            assert_eq!(rules().get(DesignRule::MaxErrors), "");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Design rule not found"), "{output}");
        assert!(output.contains("WARN"), "{output}");
        assert!(!output.contains("ERROR"), "{output}");
    }
}
