//! Rotation codes (`R90`, `MR180`, `SR0`, `SMR270`).

use std::fmt;
use std::str::FromStr;

/// Orientation of a placed primitive.
///
/// Codes are `[S][M]R<angle>`: `S` spins text so it never reads upside down,
/// `M` mirrors before rotating.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    /// Angle in degrees, `0.0 <= angle < 360.0`.
    pub angle: f64,
    /// Mirrored about the Y axis.
    pub mirrored: bool,
    /// Spin flag.
    pub spin: bool,
}

impl Rotation {
    /// No rotation.
    pub const R0: Self = Self::degrees(0.0);

    /// Creates an unmirrored rotation.
    #[must_use]
    pub const fn degrees(angle: f64) -> Self {
        Self {
            angle,
            mirrored: false,
            spin: false,
        }
    }

    /// Parses a rotation code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let mut rest = code.trim();
        let mut spin = false;
        let mut mirrored = false;
        if let Some(r) = rest.strip_prefix(['S', 's']) {
            spin = true;
            rest = r;
        }
        if let Some(r) = rest.strip_prefix(['M', 'm']) {
            mirrored = true;
            rest = r;
        }
        let angle: f64 = rest.strip_prefix(['R', 'r'])?.parse().ok()?;
        if !angle.is_finite() || !(0.0..360.0).contains(&angle) {
            return None;
        }
        Some(Self {
            angle,
            mirrored,
            spin,
        })
    }

    /// Returns the rotation code.
    #[must_use]
    pub fn code(&self) -> String {
        format!(
            "{}{}R{}",
            if self.spin { "S" } else { "" },
            if self.mirrored { "M" } else { "" },
            self.angle
        )
    }

    /// True for 0, 90, 180 and 270 degrees.
    #[must_use]
    pub fn is_orthogonal(&self) -> bool {
        [0.0, 90.0, 180.0, 270.0].contains(&self.angle)
    }

    /// True for `R0` without flags.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::R0
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

impl FromStr for Rotation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| format!("invalid rotation '{s}'"))
    }
}

impl serde::Serialize for Rotation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.code())
    }
}

impl<'de> serde::Deserialize<'de> for Rotation {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        code.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain() {
        let rot = Rotation::from_code("R90").unwrap();
        assert!((rot.angle - 90.0).abs() < f64::EPSILON);
        assert!(!rot.mirrored);
        assert!(!rot.spin);
    }

    #[test]
    fn parse_flags() {
        let rot = Rotation::from_code("SMR270").unwrap();
        assert!(rot.spin);
        assert!(rot.mirrored);
        assert_eq!(rot.code(), "SMR270");
    }

    #[test]
    fn fractional_angle() {
        let rot = Rotation::from_code("R22.5").unwrap();
        assert_eq!(rot.code(), "R22.5");
        assert!(!rot.is_orthogonal());
    }

    #[test]
    fn rejects_garbage() {
        assert!(Rotation::from_code("90").is_none());
        assert!(Rotation::from_code("R360").is_none());
        assert!(Rotation::from_code("Rabc").is_none());
    }
}
