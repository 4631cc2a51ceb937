use serde::{Deserialize, Serialize};

/// Names of the color schemes known to the coloring backend.
///
/// Used by the `color` parameter shorthand: a known scheme name selects
/// that scheme, anything else is read as a uniform color value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ColorOptions {
    /// Known scheme names.
    pub schemes: Vec<String>,
}

impl Default for ColorOptions {
    fn default() -> Self {
        let schemes = [
            "atomindex",
            "bfactor",
            "chainid",
            "chainindex",
            "chainname",
            "density",
            "electrostatic",
            "element",
            "hydrophobicity",
            "modelindex",
            "moleculetype",
            "occupancy",
            "random",
            "residueindex",
            "resname",
            "sstruc",
            "uniform",
            "value",
            "volume",
        ];
        Self {
            schemes: schemes.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

impl ColorOptions {
    /// Whether `name` is a known scheme.
    #[must_use]
    pub fn is_scheme(&self, name: &str) -> bool {
        self.schemes.iter().any(|s| s == name)
    }
}
