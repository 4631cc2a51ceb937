//! Declarative parameter model.
//!
//! Every settable property of a representation style has exactly one
//! [`ParamSpec`] entry in the style's [`ParamTable`]: its value kind, its
//! numeric coercion and its [`Effect`] (metadata only, buffer-mutable,
//! recompute a data channel, or rebuild). Unknown properties are ignored,
//! never an error.

mod channel;
mod classify;
mod set;
mod spec;
pub mod styles;
mod value;

pub use channel::{Channel, ChannelSet};
pub use classify::{apply_changes, impostor_active, ChangeSet, DISABLE_IMPOSTOR};
pub use set::ParamSet;
pub use spec::{
    Classification, Coercion, Effect, Entry, ParamKind, ParamSpec, ParamTable,
    RefreshPath,
};
pub use value::ParamValue;
