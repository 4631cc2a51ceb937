// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Function signature hygiene
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Representation lifecycle and update scheduling for molecular
//! visualization.
//!
//! A representation is a managed, rebuildable set of geometry buffers
//! derived from a data source (a structure, a volume, a trajectory frame)
//! plus a live parameter set. Molrepr keeps that geometry consistent while
//! parameters change, always choosing the cheapest sufficient refresh:
//!
//! - **buffer-mutable** parameters are pushed straight into the existing
//!   buffers,
//! - **recompute** parameters regenerate named data channels (position,
//!   color, radius, ...) in place,
//! - **rebuild** parameters discard and recreate all geometry.
//!
//! # Key entry points
//!
//! - [`repr::Representation`] - the build/update/attach/dispose state machine
//! - [`params::ParamTable`] - per-style declarative parameter metadata
//! - [`schedule::BuildQueue`] - single-slot coalescing build queue
//! - [`registry::StyleRegistry`] - style name to adapter factory lookup
//! - [`options::Options`] - runtime configuration with TOML presets
//!
//! # Architecture
//!
//! Scheduling is single-threaded and cooperative. The only true parallelism
//! is inside a style adapter's optional `prepare` step (for example the
//! molecular surface offloads extraction to a [`styles::SurfaceWorker`]
//! thread). The host calls [`repr::Representation::poll`] once per frame to
//! advance outstanding work, the same way a render loop drains finished
//! geometry from a background processor.

pub mod error;
pub mod options;
pub mod params;
pub mod registry;
pub mod repr;
pub mod scene;
pub mod schedule;
pub mod source;
pub mod styles;
pub mod util;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{AdapterError, ReprError};
