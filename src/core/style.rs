//! Colours and drawing preferences.
//!
//! Defaults reproduce the classic look: dark green sensory neurons, dark
//! blue interneurons, dark red motor neurons, green inbound and red outbound
//! synapses, gold gap junctions. Any field can be overridden from a JSON
//! file; missing fields keep their default.

use std::fmt;
#[cfg(feature = "serde")]
use std::fs;
#[cfg(feature = "serde")]
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "serde")]
use serde_json::Value;

use crate::category::Category;
#[cfg(feature = "serde")]
use crate::error::{ConnectomeError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// 0..=1
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const RED: Rgba = Rgba::rgb(0xff, 0, 0);
    pub const GREEN: Rgba = Rgba::rgb(0, 0x80, 0);
    pub const GOLD: Rgba = Rgba::rgb(0xff, 0xd7, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let h = s.strip_prefix('#')?;
        if !h.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(h.get(i..i + 2)?, 16).ok();
        match h.len() {
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?).with_alpha(byte(6)? as f32 / 255.0)),
            _ => None,
        }
    }

    /// Hex, or one of a handful of colour names.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.starts_with('#') {
            return Self::from_hex(s);
        }
        match s.to_ascii_lowercase().as_str() {
            "white" | "w" => Some(Self::WHITE),
            "black" | "k" => Some(Self::BLACK),
            "red" | "r" => Some(Self::RED),
            "green" | "g" => Some(Self::GREEN),
            "gold" => Some(Self::GOLD),
            _ => None,
        }
    }

    /// `#rrggbb`, with an alpha byte only when not opaque.
    pub fn to_hex(self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            let a = (self.a * 255.0).round() as u8;
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, a)
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Rgba {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        Rgba::parse(&s).ok_or_else(|| format!("not a colour: {s:?}"))
    }
}

impl From<Rgba> for String {
    fn from(c: Rgba) -> Self {
        c.to_hex()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ArrowHead {
    /// Filled tapering wedge.
    Wedge,
    /// Two open strokes (`->`).
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeStyle {
    pub color: Rgba,
    pub alpha: f32,
    /// Stroke width = weight * width_scale.
    pub width_scale: f32,
    pub arrow: ArrowHead,
    pub curved: bool,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Preferences {
    pub sensory_color: Rgba,
    pub interneuron_color: Rgba,
    pub motor_color: Rgba,
    /// Marker area in pt^2.
    pub node_size: f32,
    pub node_alpha: f32,
    pub label_color: Rgba,
    pub label_size: f32,
    /// Bend of curved edges, as a fraction of the edge length.
    pub curve_radius: f32,

    pub synapse_in: EdgeStyle,
    pub synapse_out: EdgeStyle,
    pub gap: EdgeStyle,

    pub whole_synapse: EdgeStyle,
    pub whole_gap: EdgeStyle,
    /// Ring drawn behind every node in the whole view.
    pub backing_color: Rgba,

    pub halo_outer: Rgba,
    pub halo_middle: Rgba,
    pub halo_inner: Rgba,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sensory_color: Rgba::rgb(0x00, 0x60, 0x00),
            interneuron_color: Rgba::rgb(0x00, 0x00, 0x60),
            motor_color: Rgba::rgb(0x60, 0x00, 0x00),
            node_size: 2500.0,
            node_alpha: 0.9,
            label_color: Rgba::WHITE,
            label_size: 12.0,
            curve_radius: 0.3,

            synapse_in: EdgeStyle {
                color: Rgba::GREEN,
                alpha: 0.7,
                width_scale: 1.0,
                arrow: ArrowHead::Wedge,
                curved: true,
            },
            synapse_out: EdgeStyle {
                color: Rgba::RED,
                alpha: 0.5,
                width_scale: 1.0,
                arrow: ArrowHead::Wedge,
                curved: true,
            },
            gap: EdgeStyle {
                color: Rgba::GOLD,
                alpha: 0.8,
                width_scale: 0.1,
                arrow: ArrowHead::Wedge,
                curved: false,
            },

            whole_synapse: EdgeStyle {
                color: Rgba::rgb(0x30, 0x30, 0x60),
                alpha: 0.6,
                width_scale: 1.0,
                arrow: ArrowHead::Open,
                curved: true,
            },
            whole_gap: EdgeStyle {
                color: Rgba::rgb(0x50, 0x50, 0x20),
                alpha: 0.6,
                width_scale: 1.0,
                arrow: ArrowHead::Open,
                curved: false,
            },
            backing_color: Rgba::WHITE,

            halo_outer: Rgba::WHITE,
            halo_middle: Rgba::RED,
            halo_inner: Rgba::GOLD,
        }
    }
}

impl Preferences {
    pub fn category_color(&self, cat: Category) -> Rgba {
        match cat {
            Category::Sensory => self.sensory_color,
            Category::Interneuron => self.interneuron_color,
            Category::Motor => self.motor_color,
        }
    }

    /// Defaults overlaid with whatever fields the file sets.
    #[cfg(feature = "serde")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConnectomeError::io(path, e))?;
        Self::from_json(&text)
    }

    /// Objects merge key by key, so `{"gap": {"color": "red"}}` keeps the
    /// rest of the gap style. Anything else replaces the default.
    #[cfg(feature = "serde")]
    pub fn from_json(text: &str) -> Result<Self> {
        let overrides: Value = serde_json::from_str(text)?;
        let mut merged = serde_json::to_value(Self::default())?;
        merge_json(&mut merged, overrides);
        Ok(serde_json::from_value(merged)?)
    }
}

#[cfg(feature = "serde")]
fn merge_json(base: &mut Value, over: Value) {
    match (base, over) {
        (Value::Object(base), Value::Object(over)) => {
            for (key, v) in over {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, v),
                    None => {
                        base.insert(key, v);
                    }
                }
            }
        }
        (slot, v) => *slot = v,
    }
}
