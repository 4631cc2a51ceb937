//! Built-in visual styles.
//!
//! Each style pairs a parameter table from [`crate::params::styles`] with a
//! [`SourceAdapter`](crate::repr::SourceAdapter) that turns atom views into
//! geometry buffers.

mod atom_bond;
mod common;
mod point;
mod sphere;
pub mod surface;

pub use atom_bond::{AtomBondAdapter, AtomBondStrategy};
pub use point::PointAdapter;
pub use sphere::SphereAdapter;
pub use surface::{
    SurfaceAdapter, SurfaceExtractor, SurfaceInput, SurfaceMesh, SurfaceParams,
    SurfaceWorker,
};
