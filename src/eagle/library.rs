//! Library records: symbols, packages, 3D packages and device sets.
//!
//! Cross references (gate → symbol, device → package, package instance →
//! package) are plain names resolved on demand against the owning
//! [`Library`], so a reference may point at a record defined later in the
//! file.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::enums::{ContactRoute, GateAddLevel};
use super::primitives::{find_by_name, Graphic, Named, PadThd, Pin, Smd};

fn default_language() -> String {
    "en".to_string()
}

/// Localised description text (may contain HTML).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    /// Language code.
    #[serde(default = "default_language")]
    pub language: String,
    /// Text.
    pub text: String,
}

impl Description {
    /// Creates an English description.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            language: default_language(),
            text: text.into(),
        }
    }
}

/// Managed-library tracking data carried by records of an embedded library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedInfo {
    /// Unique resource name of the record.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub urn: String,
    /// Version of the managed library the record came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_version: Option<u32>,
    /// Record edited inside this design.
    #[serde(default)]
    pub locally_modified: bool,
    /// Record edited in the local copy of the library.
    #[serde(default)]
    pub library_locally_modified: bool,
}

/// A schematic symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Symbol name, referenced by gates.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
    /// Graphic primitives in drawing order.
    #[serde(default)]
    pub graphics: Vec<Graphic>,
    /// Managed-library data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed: Option<ManagedInfo>,
}

impl Symbol {
    /// Creates an empty symbol.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            graphics: Vec::new(),
            managed: None,
        }
    }

    /// Pins in drawing order.
    pub fn pins(&self) -> impl Iterator<Item = &Pin> {
        self.graphics.iter().filter_map(|g| match g {
            Graphic::Pin(pin) => Some(pin),
            _ => None,
        })
    }

    /// First pin with the given name.
    #[must_use]
    pub fn pin(&self, name: &str) -> Option<&Pin> {
        self.pins().find(|pin| pin.name == name)
    }

    /// Appends a primitive.
    pub fn add(&mut self, graphic: Graphic) {
        self.graphics.push(graphic);
    }
}

/// A pad of either technology.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PadRef<'a> {
    /// Through-hole pad.
    Thd(&'a PadThd),
    /// SMD.
    Smd(&'a Smd),
}

impl PadRef<'_> {
    /// Pad name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Thd(pad) => &pad.name,
            Self::Smd(smd) => &smd.name,
        }
    }

    /// Pad centre.
    #[must_use]
    pub const fn position(&self) -> (f64, f64) {
        match self {
            Self::Thd(pad) => (pad.x, pad.y),
            Self::Smd(smd) => (smd.x, smd.y),
        }
    }
}

/// A board footprint ("package").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Package name, referenced by devices and package instances.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
    /// Graphic primitives in drawing order.
    #[serde(default)]
    pub graphics: Vec<Graphic>,
    /// Managed-library data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed: Option<ManagedInfo>,
}

impl Package {
    /// Creates an empty package.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            graphics: Vec::new(),
            managed: None,
        }
    }

    /// Pads and SMDs in drawing order.
    pub fn pads(&self) -> impl Iterator<Item = PadRef<'_>> {
        self.graphics.iter().filter_map(|g| match g {
            Graphic::Pad(pad) => Some(PadRef::Thd(pad)),
            Graphic::Smd(smd) => Some(PadRef::Smd(smd)),
            _ => None,
        })
    }

    /// First pad or SMD with the given name.
    #[must_use]
    pub fn pad(&self, name: &str) -> Option<PadRef<'_>> {
        self.pads().find(|pad| pad.name() == name)
    }

    /// Appends a primitive.
    pub fn add(&mut self, graphic: Graphic) {
        self.graphics.push(graphic);
    }
}

/// Name of a package using a 3D package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInstance {
    /// Package name.
    pub name: String,
}

/// A 3D package model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package3d {
    /// Model name.
    pub name: String,
    /// Unique resource name, referenced by devices.
    #[serde(default)]
    pub urn: String,
    /// Model type tag (e.g. `model`, `box`).
    #[serde(default)]
    pub package_type: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
    /// Packages using this model.
    #[serde(default)]
    pub instances: Vec<PackageInstance>,
    /// Managed-library data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed: Option<ManagedInfo>,
}

/// A logical gate of a device set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// Gate name (e.g. `A`, `G$1`).
    pub name: String,
    /// Symbol name.
    pub symbol: String,
    /// Placement X inside the device set.
    pub x: f64,
    /// Placement Y inside the device set.
    pub y: f64,
    /// When the gate is added.
    #[serde(default)]
    pub addlevel: GateAddLevel,
    /// Gates with equal non-zero level are swappable.
    #[serde(default)]
    pub swaplevel: u8,
}

impl Gate {
    /// Creates a gate at a position.
    #[must_use]
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            x,
            y,
            addlevel: GateAddLevel::Next,
            swaplevel: 0,
        }
    }
}

/// Pin-to-pad mapping of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connect {
    /// Gate name.
    pub gate: String,
    /// Pin name within the gate's symbol.
    pub pin: String,
    /// Space-separated pad names.
    pub pad: String,
    /// Routing requirement for multiple pads.
    #[serde(default)]
    pub route: ContactRoute,
}

impl Connect {
    /// Creates a single-pad connect.
    #[must_use]
    pub fn new(gate: impl Into<String>, pin: impl Into<String>, pad: impl Into<String>) -> Self {
        Self {
            gate: gate.into(),
            pin: pin.into(),
            pad: pad.into(),
            route: ContactRoute::All,
        }
    }

    /// Individual pad names.
    pub fn pads(&self) -> impl Iterator<Item = &str> {
        self.pad.split_whitespace()
    }
}

/// Attribute of a technology variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnologyAttribute {
    /// Attribute name.
    pub name: String,
    /// Value.
    #[serde(default)]
    pub value: String,
    /// Not editable in the design.
    #[serde(default)]
    pub constant: bool,
}

/// Part-number suffix variant of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technology {
    /// Suffix (may be empty).
    pub name: String,
    /// Attributes.
    #[serde(default)]
    pub attributes: Vec<TechnologyAttribute>,
}

/// Reference from a device to a 3D package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package3dInstance {
    /// URN of the [`Package3d`].
    pub package3d_urn: String,
}

/// One package variant of a device set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Variant name (may be empty).
    #[serde(default)]
    pub name: String,
    /// Package name; `None` for symbol-only devices (e.g. supply).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Pin-to-pad mappings.
    #[serde(default)]
    pub connects: Vec<Connect>,
    /// Technology variants.
    #[serde(default)]
    pub technologies: Vec<Technology>,
    /// 3D models.
    #[serde(default)]
    pub package3d_instances: Vec<Package3dInstance>,
}

impl Device {
    /// Creates a device bound to a package.
    #[must_use]
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: Some(package.into()),
            ..Self::default()
        }
    }

    /// All pads connected to a gate pin.
    #[must_use]
    pub fn pads_for(&self, gate: &str, pin: &str) -> Vec<&str> {
        self.connects
            .iter()
            .filter(|c| c.gate == gate && c.pin == pin)
            .flat_map(Connect::pads)
            .collect()
    }

    /// First technology with the given suffix.
    #[must_use]
    pub fn technology(&self, name: &str) -> Option<&Technology> {
        self.technologies.iter().find(|t| t.name == name)
    }
}

/// A purchasable part independent of package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSet {
    /// Device set name.
    pub name: String,
    /// Reference designator prefix (e.g. `R`).
    #[serde(default)]
    pub prefix: String,
    /// The value is user-assignable.
    #[serde(default)]
    pub uservalue: bool,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
    /// Gates.
    #[serde(default)]
    pub gates: Vec<Gate>,
    /// Package variants.
    #[serde(default)]
    pub devices: Vec<Device>,
    /// Managed-library data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed: Option<ManagedInfo>,
}

impl DeviceSet {
    /// Creates an empty device set.
    #[must_use]
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            uservalue: false,
            description: None,
            gates: Vec::new(),
            devices: Vec::new(),
            managed: None,
        }
    }

    /// First gate with the given name.
    #[must_use]
    pub fn gate(&self, name: &str) -> Option<&Gate> {
        find_by_name(&self.gates, name)
    }

    /// First device with the given name.
    #[must_use]
    pub fn device(&self, name: &str) -> Option<&Device> {
        find_by_name(&self.devices, name)
    }
}

macro_rules! impl_named {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Named for $ty {
                fn name(&self) -> &str {
                    &self.name
                }
            }
        )+
    };
}

impl_named!(Symbol, Package, Package3d, Gate, Device, DeviceSet, Technology);

/// A named collection of reusable parts.
///
/// Standalone `.lbr` files have no name or URN. Libraries embedded in a
/// schematic or board carry both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    /// Library name (embedded libraries only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Managed-library URN (embedded libraries only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urn: Option<String>,
    /// Descriptions per language; the first is the default.
    #[serde(default)]
    pub descriptions: Vec<Description>,
    /// Footprints.
    #[serde(default)]
    packages: Vec<Package>,
    /// 3D packages.
    #[serde(default)]
    packages3d: Vec<Package3d>,
    /// Symbols.
    #[serde(default)]
    symbols: Vec<Symbol>,
    /// Device sets.
    #[serde(default)]
    device_sets: Vec<DeviceSet>,
}

impl Library {
    /// Creates an empty standalone library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty embedded library.
    #[must_use]
    pub fn embedded(name: impl Into<String>, urn: Option<String>) -> Self {
        Self {
            name: Some(name.into()),
            urn,
            ..Self::default()
        }
    }

    /// True if this library is tracked against a managed library.
    #[must_use]
    pub const fn is_managed(&self) -> bool {
        self.urn.is_some()
    }

    /// Default (first) description.
    #[must_use]
    pub fn description(&self) -> Option<&Description> {
        self.descriptions.first()
    }

    /// Description in a language, falling back to the default.
    #[must_use]
    pub fn description_for(&self, language: &str) -> Option<&Description> {
        self.descriptions
            .iter()
            .find(|d| d.language.eq_ignore_ascii_case(language))
            .or_else(|| self.description())
    }

    /// Footprints in file order.
    #[must_use]
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// 3D packages in file order.
    #[must_use]
    pub fn packages3d(&self) -> &[Package3d] {
        &self.packages3d
    }

    /// Symbols in file order.
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Device sets in file order.
    #[must_use]
    pub fn device_sets(&self) -> &[DeviceSet] {
        &self.device_sets
    }

    /// Live, editable footprint list.
    ///
    /// Edits through this accessor bypass change notification; prefer the
    /// [`LibraryEditor`](super::drawing::LibraryEditor) operations.
    pub fn packages_mut(&mut self) -> &mut Vec<Package> {
        &mut self.packages
    }

    /// Live, editable 3D package list. Bypasses change notification.
    pub fn packages3d_mut(&mut self) -> &mut Vec<Package3d> {
        &mut self.packages3d
    }

    /// Live, editable symbol list. Bypasses change notification.
    pub fn symbols_mut(&mut self) -> &mut Vec<Symbol> {
        &mut self.symbols
    }

    /// Live, editable device set list. Bypasses change notification.
    pub fn device_sets_mut(&mut self) -> &mut Vec<DeviceSet> {
        &mut self.device_sets
    }

    /// First symbol with the given name.
    #[must_use]
    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        find_by_name(&self.symbols, name)
    }

    /// First package with the given name.
    #[must_use]
    pub fn package(&self, name: &str) -> Option<&Package> {
        find_by_name(&self.packages, name)
    }

    /// First 3D package with the given name.
    #[must_use]
    pub fn package3d(&self, name: &str) -> Option<&Package3d> {
        find_by_name(&self.packages3d, name)
    }

    /// First 3D package with the given URN.
    #[must_use]
    pub fn package3d_by_urn(&self, urn: &str) -> Option<&Package3d> {
        self.packages3d.iter().find(|p| p.urn == urn)
    }

    /// First device set with the given name.
    #[must_use]
    pub fn device_set(&self, name: &str) -> Option<&DeviceSet> {
        find_by_name(&self.device_sets, name)
    }

    /// Symbol a gate refers to.
    #[must_use]
    pub fn gate_symbol(&self, gate: &Gate) -> Option<&Symbol> {
        self.symbol(&gate.symbol)
    }

    /// Package a device refers to.
    #[must_use]
    pub fn device_package(&self, device: &Device) -> Option<&Package> {
        device.package.as_deref().and_then(|name| self.package(name))
    }

    /// 3D packages a device refers to; unresolved URNs are skipped.
    #[must_use]
    pub fn device_packages3d(&self, device: &Device) -> Vec<&Package3d> {
        device
            .package3d_instances
            .iter()
            .filter_map(|inst| self.package3d_by_urn(&inst.package3d_urn))
            .collect()
    }

    /// Packages listed as instances of a 3D package; unresolved names are skipped.
    #[must_use]
    pub fn packages_for_3d(&self, package3d: &Package3d) -> Vec<&Package> {
        package3d
            .instances
            .iter()
            .filter_map(|inst| self.package(&inst.name))
            .collect()
    }

    /// Copy of a gate's symbol with every pin's `pad` resolved through a device.
    ///
    /// Pins with several pads get the names joined by a space; unconnected
    /// pins keep `pad = None`.
    #[must_use]
    pub fn resolved_symbol(&self, device_set: &str, device: &str, gate: &str) -> Option<Symbol> {
        let ds = self.device_set(device_set)?;
        let gate = ds.gate(gate)?;
        let device = ds.device(device)?;
        let mut symbol = self.gate_symbol(gate)?.clone();
        for graphic in &mut symbol.graphics {
            if let Graphic::Pin(pin) = graphic {
                let pads = device.pads_for(&gate.name, &pin.name);
                pin.pad = if pads.is_empty() {
                    None
                } else {
                    Some(pads.join(" "))
                };
            }
        }
        Some(symbol)
    }

    /// Adds a footprint.
    pub fn add_package(&mut self, package: Package) {
        self.packages.push(package);
    }

    /// Adds a 3D package.
    pub fn add_package3d(&mut self, package3d: Package3d) {
        self.packages3d.push(package3d);
    }

    /// Adds a symbol.
    pub fn add_symbol(&mut self, symbol: Symbol) {
        self.symbols.push(symbol);
    }

    /// Adds a device set.
    pub fn add_device_set(&mut self, device_set: DeviceSet) {
        self.device_sets.push(device_set);
    }

    /// Removes the first footprint with the given name.
    pub fn remove_package(&mut self, name: &str) -> Option<Package> {
        remove_by_name(&mut self.packages, name)
    }

    /// Removes the first symbol with the given name.
    pub fn remove_symbol(&mut self, name: &str) -> Option<Symbol> {
        remove_by_name(&mut self.symbols, name)
    }

    /// Removes the first device set with the given name.
    pub fn remove_device_set(&mut self, name: &str) -> Option<DeviceSet> {
        remove_by_name(&mut self.device_sets, name)
    }

    /// Names that occur more than once, as `(collection, name)`.
    ///
    /// Lookups return the first record, so later duplicates are shadowed.
    #[must_use]
    pub fn duplicate_names(&self) -> Vec<(&'static str, String)> {
        let mut duplicates = Vec::new();
        collect_duplicates("package", &self.packages, &mut duplicates);
        collect_duplicates("package3d", &self.packages3d, &mut duplicates);
        collect_duplicates("symbol", &self.symbols, &mut duplicates);
        collect_duplicates("deviceset", &self.device_sets, &mut duplicates);
        duplicates
    }

    /// Total number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len() + self.packages3d.len() + self.symbols.len() + self.device_sets.len()
    }

    /// True if the library holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Named for Library {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

fn remove_by_name<T: Named>(items: &mut Vec<T>, name: &str) -> Option<T> {
    let index = items.iter().position(|item| item.name() == name)?;
    Some(items.remove(index))
}

fn collect_duplicates<T: Named>(
    collection: &'static str,
    items: &[T],
    out: &mut Vec<(&'static str, String)>,
) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for item in items {
        let name = item.name();
        if !seen.insert(name) && reported.insert(name) {
            out.push((collection, name.to_string()));
        }
    }
}
