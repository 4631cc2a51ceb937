use std::collections::BTreeMap;

use glam::Mat4;

/// One part of a symmetry assembly: a sub-selection of the source drawn
/// once per transform.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyPart {
    /// Selection string restricting the base view to this part.
    pub selection: String,
    /// Instance transforms.
    pub matrices: Vec<Mat4>,
}

impl AssemblyPart {
    /// Part with the given selection and transforms.
    #[must_use]
    pub fn new(selection: impl Into<String>, matrices: Vec<Mat4>) -> Self {
        Self {
            selection: selection.into(),
            matrices,
        }
    }
}

/// A named symmetry expansion.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Assembly {
    /// Parts in declaration order. Part indices are positions in this list.
    pub parts: Vec<AssemblyPart>,
}

impl Assembly {
    /// Builder-style part append.
    #[must_use]
    pub fn with_part(mut self, part: AssemblyPart) -> Self {
        self.parts.push(part);
        self
    }

    /// Total number of instances over all parts.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.parts.iter().map(|p| p.matrices.len()).sum()
    }
}

/// Assemblies keyed by name.
pub type AssemblyDict = BTreeMap<String, Assembly>;
