//! Property Values
//!
//! Closed set of typed property values. Every value carries its kind as the
//! enum discriminant, so type checks are a plain `kind()` comparison and
//! interpolation is an exhaustive match.

use std::fmt;

use serde::{Deserialize, Serialize};

/// RGBA color, channels in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create from 8-bit channels
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    pub fn lerp(self, other: Color, t: f32) -> Color {
        Color {
            r: lerp(self.r, other.r, t),
            g: lerp(self.g, other.g, t),
            b: lerp(self.b, other.b, t),
            a: lerp(self.a, other.a, t),
        }
    }
}

/// 2D vector
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2::new(0.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, other: Vec2, t: f32) -> Vec2 {
        Vec2::new(lerp(self.x, other.x, t), lerp(self.y, other.y, t))
    }
}

/// Endpoint-exact linear interpolation: t = 0 gives `a`, t = 1 gives `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Property kind discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKind {
    Color,
    Float,
    Int,
    Vector2,
    Bool,
    Enum,
    Sprite,
    Font,
    Text,
}

impl PropertyKind {
    /// Whether values of this kind blend continuously
    pub fn is_interpolatable(self) -> bool {
        matches!(
            self,
            PropertyKind::Color | PropertyKind::Float | PropertyKind::Int | PropertyKind::Vector2
        )
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyKind::Color => "color",
            PropertyKind::Float => "float",
            PropertyKind::Int => "int",
            PropertyKind::Vector2 => "vector2",
            PropertyKind::Bool => "bool",
            PropertyKind::Enum => "enum",
            PropertyKind::Sprite => "sprite",
            PropertyKind::Font => "font",
            PropertyKind::Text => "text",
        };
        f.write_str(name)
    }
}

/// A typed property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyValue {
    Color(Color),
    Float(f32),
    Int(i32),
    Vector2(Vec2),
    Bool(bool),
    /// Keyword out of a closed set (e.g. `flex-start`)
    Enum(String),
    /// Sprite asset path
    Sprite(String),
    /// Font asset name
    Font(String),
    Text(String),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Color(_) => PropertyKind::Color,
            PropertyValue::Float(_) => PropertyKind::Float,
            PropertyValue::Int(_) => PropertyKind::Int,
            PropertyValue::Vector2(_) => PropertyKind::Vector2,
            PropertyValue::Bool(_) => PropertyKind::Bool,
            PropertyValue::Enum(_) => PropertyKind::Enum,
            PropertyValue::Sprite(_) => PropertyKind::Sprite,
            PropertyValue::Font(_) => PropertyKind::Font,
            PropertyValue::Text(_) => PropertyKind::Text,
        }
    }

    /// Interpolate towards `other`
    ///
    /// Returns `None` when the kinds differ or the kind has no continuous
    /// interpolation; callers switch discretely in that case.
    pub fn interpolate(&self, other: &PropertyValue, t: f32) -> Option<PropertyValue> {
        if self.kind() != other.kind() || !self.kind().is_interpolatable() {
            return None;
        }
        // Exact endpoints
        if t.is_nan() || t <= 0.0 {
            return Some(self.clone());
        }
        if t >= 1.0 {
            return Some(other.clone());
        }

        match (self, other) {
            (PropertyValue::Color(a), PropertyValue::Color(b)) => {
                Some(PropertyValue::Color(a.lerp(*b, t)))
            }
            (PropertyValue::Float(a), PropertyValue::Float(b)) => {
                Some(PropertyValue::Float(lerp(*a, *b, t)))
            }
            (PropertyValue::Int(a), PropertyValue::Int(b)) => {
                let t = f64::from(t);
                let value = f64::from(*a) * (1.0 - t) + f64::from(*b) * t;
                Some(PropertyValue::Int(value.round() as i32))
            }
            (PropertyValue::Vector2(a), PropertyValue::Vector2(b)) => {
                Some(PropertyValue::Vector2(a.lerp(*b, t)))
            }
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            PropertyValue::Float(v) => Some(*v),
            PropertyValue::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            PropertyValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Enum(s)
            | PropertyValue::Sprite(s)
            | PropertyValue::Font(s)
            | PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f32> for PropertyValue {
    fn from(v: f32) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<Color> for PropertyValue {
    fn from(v: Color) -> Self {
        PropertyValue::Color(v)
    }
}

impl From<Vec2> for PropertyValue {
    fn from(v: Vec2) -> Self {
        PropertyValue::Vector2(v)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Color(c) => write!(f, "rgba({}, {}, {}, {})", c.r, c.g, c.b, c.a),
            PropertyValue::Float(v) => write!(f, "{v}"),
            PropertyValue::Int(v) => write!(f, "{v}"),
            PropertyValue::Vector2(v) => write!(f, "({}, {})", v.x, v.y),
            PropertyValue::Bool(v) => write!(f, "{v}"),
            PropertyValue::Enum(s) => f.write_str(s),
            PropertyValue::Sprite(s) => write!(f, "sprite({s})"),
            PropertyValue::Font(s) => write!(f, "font({s})"),
            PropertyValue::Text(s) => write!(f, "\"{s}\""),
        }
    }
}
