use egui::ecolor::HexColor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// An sRGB color with alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid color '{0}': expected #RGB, #RGBA, #RRGGBB or #RRGGBBAA")]
pub struct ParseColorError(String);

impl FromStr for Color {
    type Err = ParseColorError;

    /// Accepts the CSS hex forms egui parses; the leading `#` is optional.
    ///
    /// Translucent colors keep their exact alpha, but their channels go
    /// through egui's premultiplied form and can drift by a step or two.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        // from_str_radix would also take a sign
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }

        let c = HexColor::from_str_without_hash(hex)
            .map_err(|_| err())?
            .color();
        if c.is_opaque() {
            return Ok(Color::rgb(c.r(), c.g(), c.b()));
        }
        let [r, g, b, _] = c.to_srgba_unmultiplied();
        Ok(Color { r, g, b, a: c.a() })
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Status tag to color mapping for nodes and edges
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColorPolicy {
    pub node_colors: HashMap<String, Color>,
    pub edge_colors: HashMap<String, Color>,
    pub default_node_color: Color,
    pub default_edge_color: Color,
    pub selected_stroke: Color,
    pub unselected_stroke: Color,
    pub label_color: Color,

    /// Opacity of nodes that are disabled
    pub disabled_opacity: f32,
}

impl Default for ColorPolicy {
    fn default() -> Self {
        Self {
            node_colors: HashMap::new(),
            edge_colors: HashMap::new(),
            default_node_color: Color::rgb(0x22, 0x22, 0x22),
            default_edge_color: Color::rgb(0x00, 0x00, 0x00),
            selected_stroke: Color::rgb(0xFF, 0xFF, 0x00),
            unselected_stroke: Color::rgb(0xDD, 0xDD, 0xDD),
            label_color: Color::rgb(0xDD, 0xDD, 0xDD),
            disabled_opacity: 0.5,
        }
    }
}

impl ColorPolicy {
    pub fn map_node_status(&mut self, status: impl Into<String>, color: Color) {
        self.node_colors.insert(status.into(), color);
    }

    pub fn map_edge_status(&mut self, status: impl Into<String>, color: Color) {
        self.edge_colors.insert(status.into(), color);
    }

    /// Fill color for a node status, falling back to the default
    pub fn node_color(&self, status: &str) -> Color {
        self.node_colors
            .get(status)
            .copied()
            .unwrap_or(self.default_node_color)
    }

    /// Stroke color for an edge status, falling back to the default
    pub fn edge_color(&self, status: &str) -> Color {
        self.edge_colors
            .get(status)
            .copied()
            .unwrap_or(self.default_edge_color)
    }
}
