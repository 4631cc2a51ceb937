//! Contracts with the data sources representations are drawn from.
//!
//! A [`Source`] hands out filtered [`DataView`]s for selection strings and
//! may declare symmetry [`Assembly`] expansions. Views of molecular
//! structures additionally implement [`AtomView`].

mod assembly;
mod atoms;
mod selection;

pub use assembly::{Assembly, AssemblyDict, AssemblyPart};
pub use atoms::{
    AtomData, AtomRequest, AtomView, BondData, ColorParams, RadiusParams,
    RadiusType,
};
pub use selection::Selection;

/// A filtered slice of a source.
pub trait DataView: Clone {
    /// Number of elements (atoms, voxels, ...) in the view.
    fn element_count(&self) -> usize;

    /// Selection string this view was derived from.
    fn selection(&self) -> &str;

    /// Narrow further by an assembly part's selection.
    #[must_use]
    fn restrict(&self, selection: &str) -> Self;

    /// Whether the view holds no elements.
    fn is_empty(&self) -> bool {
        self.element_count() == 0
    }
}

/// A data object representations are built from.
pub trait Source {
    /// Filtered view type.
    type View: DataView + 'static;

    /// View of the elements matching a selection string.
    fn view(&self, selection: &str) -> Self::View;

    /// Declared assemblies, empty when the source has none.
    fn assemblies(&self) -> &AssemblyDict;

    /// Assembly used when a representation asks for `"default"` without
    /// naming one itself; empty means no expansion.
    fn default_assembly(&self) -> &str {
        ""
    }
}
