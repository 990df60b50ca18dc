//! Range-checked numeric values.
//!
//! Bounds are exclusive: a value equal to `min` or `max` is out of range.

use serde::{Deserialize, Serialize};

/// An integer with an allowed open interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntValue {
    /// Current value.
    pub value: i64,
    /// Exclusive lower bound.
    pub min: i64,
    /// Exclusive upper bound.
    pub max: i64,
}

impl IntValue {
    /// Creates a bounded integer.
    #[must_use]
    pub const fn new(value: i64, min: i64, max: i64) -> Self {
        Self { value, min, max }
    }

    /// True if `min < value < max`.
    #[must_use]
    pub const fn is_in_range(&self) -> bool {
        self.value > self.min && self.value < self.max
    }
}

/// A real number with an allowed open interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RealValue {
    /// Current value.
    pub value: f64,
    /// Exclusive lower bound.
    pub min: f64,
    /// Exclusive upper bound.
    pub max: f64,
}

impl RealValue {
    /// Creates a bounded real.
    #[must_use]
    pub const fn new(value: f64, min: f64, max: f64) -> Self {
        Self { value, min, max }
    }

    /// True if `min < value < max`.
    #[must_use]
    pub fn is_in_range(&self) -> bool {
        self.value > self.min && self.value < self.max
    }
}

/// Parses a length such as `0.6096mm`, `10mil`, `0.1inch`, `25mic` or `0.25`
/// (bare numbers are millimetres) into millimetres.
#[must_use]
pub fn parse_length_mm(text: &str) -> Option<f64> {
    let text = text.trim();
    let split = text
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);
    let number: f64 = number.trim().parse().ok()?;
    let factor = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "mm" => 1.0,
        "mil" => 0.0254,
        "inch" | "in" => 25.4,
        "mic" => 0.001,
        _ => return None,
    };
    Some(number * factor)
}
