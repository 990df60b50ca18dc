//! Enumerated attribute vocabularies of the EAGLE grammar.
//!
//! Every type here is a closed set of string codes. `from_code` matches
//! case-insensitively and returns `None` for anything outside the table;
//! `code` is its exact inverse. The interchange format stores the same codes.

use std::fmt;

macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident (default $default:ident) {
            $( $(#[$vmeta:meta])* $variant:ident => $code:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[ $( Self::$variant, )+ ];

            /// Every code, in declaration order.
            pub const CODES: &'static [&'static str] = &[ $( $code, )+ ];

            /// Looks up a variant by its code (case-insensitive).
            #[must_use]
            pub fn from_code(code: &str) -> Option<Self> {
                let code = code.trim();
                $(
                    if code.eq_ignore_ascii_case($code) {
                        return Some(Self::$variant);
                    }
                )+
                None
            }

            /// Returns the code used in files.
            #[must_use]
            pub const fn code(self) -> &'static str {
                match self {
                    $( Self::$variant => $code, )+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.code())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.code())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let code = String::deserialize(deserializer)?;
                Self::from_code(&code)
                    .ok_or_else(|| serde::de::Error::unknown_variant(&code, Self::CODES))
            }
        }
    };
}

code_enum! {
    /// Electrical direction of a symbol pin.
    pub enum PinDirection (default Io) {
        /// Not connected.
        Nc => "nc",
        /// Input.
        In => "in",
        /// Output (totem-pole).
        Out => "out",
        /// Input/output.
        Io => "io",
        /// Open collector / open drain.
        Oc => "oc",
        /// Power input.
        Pwr => "pwr",
        /// Passive.
        Pas => "pas",
        /// High-impedance output.
        Hiz => "hiz",
        /// Supply (implicitly connects to a net of the same name).
        Sup => "sup",
    }
}

code_enum! {
    /// Drawn length of a symbol pin.
    pub enum PinLength (default Long) {
        /// No line, connection point only.
        Point => "point",
        /// 0.1 inch.
        Short => "short",
        /// 0.2 inch.
        Middle => "middle",
        /// 0.3 inch.
        Long => "long",
    }
}

code_enum! {
    /// Which labels of a pin are shown.
    pub enum PinVisible (default Both) {
        /// Neither pin nor pad name.
        Off => "off",
        /// Pad name only.
        Pad => "pad",
        /// Pin name only.
        Pin => "pin",
        /// Pin and pad names.
        Both => "both",
    }
}

code_enum! {
    /// Graphic decoration at the pin root.
    pub enum PinFunction (default None) {
        /// Plain pin.
        None => "none",
        /// Inverter bubble.
        Dot => "dot",
        /// Clock wedge.
        Clk => "clk",
        /// Inverted clock.
        DotClk => "dotclk",
    }
}

code_enum! {
    /// Text anchor alignment.
    pub enum Align (default BottomLeft) {
        /// Bottom left.
        BottomLeft => "bottom-left",
        /// Bottom centre.
        BottomCenter => "bottom-center",
        /// Bottom right.
        BottomRight => "bottom-right",
        /// Centre left.
        CenterLeft => "center-left",
        /// Centre.
        Center => "center",
        /// Centre right.
        CenterRight => "center-right",
        /// Top left.
        TopLeft => "top-left",
        /// Top centre.
        TopCenter => "top-center",
        /// Top right.
        TopRight => "top-right",
    }
}

code_enum! {
    /// Dash pattern of a wire.
    pub enum WireStyle (default Continuous) {
        /// Solid line.
        Continuous => "continuous",
        /// Long dashes.
        LongDash => "longdash",
        /// Short dashes.
        ShortDash => "shortdash",
        /// Dash-dot.
        DashDot => "dashdot",
    }
}

code_enum! {
    /// End cap of an arc-shaped wire.
    pub enum WireCap (default Round) {
        /// Flat ends.
        Flat => "flat",
        /// Round ends.
        Round => "round",
    }
}

code_enum! {
    /// Copper shape of a through-hole pad.
    pub enum PadShape (default Round) {
        /// Square.
        Square => "square",
        /// Circle.
        Round => "round",
        /// Octagon.
        Octagon => "octagon",
        /// Oblong, hole centred.
        Long => "long",
        /// Oblong, hole at one end.
        Offset => "offset",
    }
}

code_enum! {
    /// Copper shape of a via.
    pub enum ViaShape (default Round) {
        /// Square.
        Square => "square",
        /// Circle.
        Round => "round",
        /// Octagon.
        Octagon => "octagon",
    }
}

code_enum! {
    /// How the grid is drawn.
    pub enum GridStyle (default Lines) {
        /// Full lines.
        Lines => "lines",
        /// Dots at intersections.
        Dots => "dots",
    }
}

code_enum! {
    /// Length unit used by the grid.
    pub enum GridUnit (default Inch) {
        /// Micrometre.
        Mic => "mic",
        /// Millimetre.
        Mm => "mm",
        /// Thousandth of an inch.
        Mil => "mil",
        /// Inch.
        Inch => "inch",
    }
}

impl GridUnit {
    /// Millimetres per unit.
    #[must_use]
    pub const fn to_mm(self) -> f64 {
        match self {
            Self::Mic => 0.001,
            Self::Mm => 1.0,
            Self::Mil => 0.0254,
            Self::Inch => 25.4,
        }
    }
}

code_enum! {
    /// Severity of a compatibility note.
    pub enum Severity (default Info) {
        /// Informational.
        Info => "info",
        /// Warning.
        Warning => "warning",
        /// Error.
        Error => "error",
    }
}

code_enum! {
    /// Kind of dimension annotation.
    pub enum DimensionType (default Parallel) {
        /// Aligned with the measured points.
        Parallel => "parallel",
        /// Horizontal distance.
        Horizontal => "horizontal",
        /// Vertical distance.
        Vertical => "vertical",
        /// Radius.
        Radius => "radius",
        /// Diameter.
        Diameter => "diameter",
        /// Angle.
        Angle => "angle",
        /// Leader line without value.
        Leader => "leader",
    }
}

code_enum! {
    /// Font of a text primitive.
    pub enum TextFont (default Proportional) {
        /// Built-in vector font.
        Vector => "vector",
        /// Proportional system font.
        Proportional => "proportional",
        /// Fixed-width system font.
        Fixed => "fixed",
    }
}

code_enum! {
    /// Fill mode of a polygon.
    pub enum PolygonPour (default Solid) {
        /// Solid copper.
        Solid => "solid",
        /// Hatched.
        Hatch => "hatch",
        /// Cutout of other polygons.
        Cutout => "cutout",
    }
}

code_enum! {
    /// When a gate is added to a schematic.
    pub enum GateAddLevel (default Next) {
        /// Always placed with the part.
        Must => "must",
        /// Only on explicit request.
        Can => "can",
        /// Placed with the next ADD.
        Next => "next",
        /// Power gates, placed on request.
        Request => "request",
        /// Placed with the first gate.
        Always => "always",
    }
}

code_enum! {
    /// Routing requirement when one pin connects to several pads.
    pub enum ContactRoute (default All) {
        /// Every pad must be routed.
        All => "all",
        /// Any pad suffices.
        Any => "any",
    }
}

code_enum! {
    /// What an attribute shows on the drawing.
    pub enum AttributeDisplay (default Value) {
        /// Hidden.
        Off => "off",
        /// Value only.
        Value => "value",
        /// Name only.
        Name => "name",
        /// Name and value.
        Both => "both",
    }
}

code_enum! {
    /// Reading direction of vertical text.
    pub enum VerticalText (default Up) {
        /// Bottom to top.
        Up => "up",
        /// Top to bottom.
        Down => "down",
    }
}

code_enum! {
    /// Background palette a layer colour index is resolved against.
    pub enum Palette (default White) {
        /// Black background.
        Black => "black",
        /// White background.
        White => "white",
        /// Coloured background.
        Colored => "colored",
    }
}

code_enum! {
    /// Parameter names of a design rule set.
    pub enum DesignRule (default LayerSetup) {
        /// Copper layer stack expression.
        LayerSetup => "layerSetup",
        /// Copper thickness per layer.
        MtCopper => "mtCopper",
        /// Isolation thickness per layer.
        MtIsolate => "mtIsolate",
        /// Minimum wire-to-wire clearance.
        MdWireWire => "mdWireWire",
        /// Minimum wire-to-pad clearance.
        MdWirePad => "mdWirePad",
        /// Minimum wire-to-via clearance.
        MdWireVia => "mdWireVia",
        /// Minimum pad-to-pad clearance.
        MdPadPad => "mdPadPad",
        /// Minimum pad-to-via clearance.
        MdPadVia => "mdPadVia",
        /// Minimum via-to-via clearance.
        MdViaVia => "mdViaVia",
        /// Minimum SMD-to-pad clearance.
        MdSmdPad => "mdSmdPad",
        /// Minimum SMD-to-via clearance.
        MdSmdVia => "mdSmdVia",
        /// Minimum SMD-to-SMD clearance.
        MdSmdSmd => "mdSmdSmd",
        /// Minimum copper-to-dimension distance.
        MdCopperDimension => "mdCopperDimension",
        /// Minimum drill-to-drill distance.
        MdDrill => "mdDrill",
        /// Minimum SMD-to-stop distance.
        MdSmdStop => "mdSmdStop",
        /// Minimum wire width.
        MsWidth => "msWidth",
        /// Minimum drill diameter.
        MsDrill => "msDrill",
        /// Minimum micro via drill.
        MsMicroVia => "msMicroVia",
        /// Blind via aspect ratio.
        MsBlindViaRatio => "msBlindViaRatio",
        /// Pad restring (top), percent of drill.
        RvPadTop => "rvPadTop",
        /// Pad restring (inner).
        RvPadInner => "rvPadInner",
        /// Pad restring (bottom).
        RvPadBottom => "rvPadBottom",
        /// Via restring (outer).
        RvViaOuter => "rvViaOuter",
        /// Via restring (inner).
        RvViaInner => "rvViaInner",
        /// Minimum pad restring (top).
        RlMinPadTop => "rlMinPadTop",
        /// Maximum pad restring (top).
        RlMaxPadTop => "rlMaxPadTop",
        /// Minimum via restring (outer).
        RlMinViaOuter => "rlMinViaOuter",
        /// Maximum via restring (outer).
        RlMaxViaOuter => "rlMaxViaOuter",
        /// Pad shape (top).
        PsTop => "psTop",
        /// Pad shape (bottom).
        PsBottom => "psBottom",
        /// First pad shape.
        PsFirst => "psFirst",
        /// Stop mask frame.
        MvStopFrame => "mvStopFrame",
        /// Cream mask frame.
        MvCreamFrame => "mvCreamFrame",
        /// Minimum stop mask frame.
        MlMinStopFrame => "mlMinStopFrame",
        /// Maximum stop mask frame.
        MlMaxStopFrame => "mlMaxStopFrame",
        /// Minimum cream frame.
        MlMinCreamFrame => "mlMinCreamFrame",
        /// Maximum cream frame.
        MlMaxCreamFrame => "mlMaxCreamFrame",
        /// Vias up to this drill are covered by stop mask.
        MlViaStopLimit => "mlViaStopLimit",
        /// SMD roundness in percent.
        SrRoundness => "srRoundness",
        /// Thermal isolation distance.
        SlThermalIsolate => "slThermalIsolate",
        /// Generate thermals for vias.
        SlThermalsForVias => "slThermalsForVias",
        /// Check that objects are on grid.
        CheckGrid => "checkGrid",
        /// Check wire angles.
        CheckAngle => "checkAngle",
        /// Check for non-vector fonts.
        CheckFont => "checkFont",
        /// Check restrict layers.
        CheckRestrict => "checkRestrict",
        /// Maximum number of reported errors.
        MaxErrors => "maxErrors",
    }
}

/// Parses an EAGLE boolean (`yes` / `no`).
#[must_use]
pub fn parse_yes_no(code: &str) -> Option<bool> {
    let code = code.trim();
    if code.eq_ignore_ascii_case("yes") {
        Some(true)
    } else if code.eq_ignore_ascii_case("no") {
        Some(false)
    } else {
        None
    }
}

/// Formats an EAGLE boolean.
#[must_use]
pub const fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
