//! Records shared by schematics and boards.

use serde::{Deserialize, Serialize};

use super::enums::{AttributeDisplay, TextFont};
use super::primitives::Named;
use super::rotation::Rotation;

/// A named attribute, optionally placed on the drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Value; `None` inherits from the library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Placement X.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Placement Y.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Text size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    /// Layer number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<u8>,
    /// Font.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<TextFont>,
    /// Text ratio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<u8>,
    /// Orientation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rot: Option<Rotation>,
    /// What is shown.
    #[serde(default)]
    pub display: AttributeDisplay,
    /// Not editable.
    #[serde(default)]
    pub constant: bool,
}

impl Attribute {
    /// Creates an unplaced attribute.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            x: None,
            y: None,
            size: None,
            layer: None,
            font: None,
            ratio: None,
            rot: None,
            display: AttributeDisplay::Value,
            constant: false,
        }
    }
}

/// An assembly variant definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDef {
    /// Variant name.
    pub name: String,
    /// Currently selected variant.
    #[serde(default)]
    pub current: bool,
}

/// Clearance between two net classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clearance {
    /// Other class number.
    pub class: u32,
    /// Minimum clearance.
    #[serde(default)]
    pub value: f64,
}

/// A net class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetClass {
    /// Class number, referenced by nets and signals.
    pub number: u32,
    /// Class name.
    pub name: String,
    /// Minimum wire width.
    #[serde(default)]
    pub width: f64,
    /// Minimum via drill.
    #[serde(default)]
    pub drill: f64,
    /// Class-to-class clearances.
    #[serde(default)]
    pub clearances: Vec<Clearance>,
}

impl Named for Attribute {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for VariantDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for NetClass {
    fn name(&self) -> &str {
        &self.name
    }
}
