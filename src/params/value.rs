use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single parameter value.
///
/// Colors are carried as packed `0xRRGGBB` integers, categorical values as
/// text. The untagged representation keeps TOML presets and UI payloads
/// natural (`scale = 1.5`, `colorScheme = "element"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ParamValue {
    /// Boolean flag.
    Bool(bool),
    /// Integer (also packed colors).
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text or categorical option.
    Text(String),
}

impl ParamValue {
    /// Numeric view of the value. Text is parsed.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }

    /// Integer view of the value, truncating floats and parsing the
    /// leading integer of text (`"3.7"` gives `3`).
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Self::Text(s) => parse_leading_int(s),
            _ => None,
        }
    }

    /// Boolean view of the value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Text(s) => match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Text view of the value (no conversion).
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Packed color, accepting integers and `#rrggbb` / `0xrrggbb` text.
    #[must_use]
    pub fn as_color(&self) -> Option<u32> {
        match self {
            Self::Int(i) => u32::try_from(*i).ok().filter(|c| *c <= 0x00FF_FFFF),
            Self::Float(f) if f.is_finite() && *f >= 0.0 => {
                let c = f.trunc() as u32;
                (c <= 0x00FF_FFFF).then_some(c)
            }
            Self::Text(s) => {
                let s = s.trim();
                let hex = s
                    .strip_prefix('#')
                    .or_else(|| s.strip_prefix("0x"))
                    .or_else(|| s.strip_prefix("0X"))?;
                if hex.len() != 6 {
                    return None;
                }
                u32::from_str_radix(hex, 16).ok()
            }
            Self::Float(_) | Self::Bool(_) => None,
        }
    }
}

/// `parseInt`-style parsing: optional sign followed by leading digits.
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|v| v * sign)
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}
