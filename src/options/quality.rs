use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::params::ParamSet;

/// Quality shorthand level.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    /// Coarse geometry.
    Low,
    /// Default geometry detail.
    Medium,
    /// Fine geometry.
    High,
}

impl QualityLevel {
    /// Parse a level name; anything else is not a quality level.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Concrete parameters one style uses for each quality level.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct StyleQuality {
    /// Parameters for [`QualityLevel::Low`].
    pub low: ParamSet,
    /// Parameters for [`QualityLevel::Medium`].
    pub medium: ParamSet,
    /// Parameters for [`QualityLevel::High`].
    pub high: ParamSet,
}

impl StyleQuality {
    /// Parameters for `level`.
    #[must_use]
    pub const fn level(&self, level: QualityLevel) -> &ParamSet {
        match level {
            QualityLevel::Low => &self.low,
            QualityLevel::Medium => &self.medium,
            QualityLevel::High => &self.high,
        }
    }
}

/// Per-style quality shorthand mappings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Quality", inline)]
#[serde(default)]
pub struct QualityOptions {
    /// Mapping keyed by style name.
    pub styles: BTreeMap<String, StyleQuality>,
}

fn detail(sphere: [i64; 3], segments: Option<[i64; 3]>) -> StyleQuality {
    let level = |i: usize| {
        let mut set = ParamSet::new().with("sphereDetail", sphere[i]);
        if let Some(seg) = segments {
            drop(set.insert("radiusSegments", seg[i]));
        }
        set
    };
    StyleQuality {
        low: level(0),
        medium: level(1),
        high: level(2),
    }
}

impl Default for QualityOptions {
    fn default() -> Self {
        let mut styles = BTreeMap::new();
        let spheres = detail([0, 1, 2], None);
        let sticks = detail([0, 1, 2], Some([5, 10, 20]));
        drop(styles.insert("spacefill".to_owned(), spheres));
        drop(styles.insert("ball+stick".to_owned(), sticks.clone()));
        drop(styles.insert("licorice".to_owned(), sticks));
        Self { styles }
    }
}

impl QualityOptions {
    /// Concrete parameters for `style` at `level`, if the style maps
    /// quality at all.
    #[must_use]
    pub fn expand(&self, style: &str, level: QualityLevel) -> Option<&ParamSet> {
        self.styles.get(style).map(|q| q.level(level))
    }
}
