//! Batch classification of a partial parameter change set.

use log::trace;

use super::{ChannelSet, ParamSet, ParamTable, RefreshPath};
use crate::options::CapabilityOptions;

/// Name of the parameter that opts a representation out of impostors.
pub const DISABLE_IMPOSTOR: &str = "disableImpostor";

/// The cheapest sufficient refresh for a batch of parameter changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    /// Buffer-mutable values keyed by buffer-side name.
    pub buffer: ParamSet,
    /// Stale data channels.
    pub channels: ChannelSet,
    /// Whether a full rebuild is required.
    pub rebuild: bool,
    /// Names whose live value changed, in application order.
    pub changed: Vec<&'static str>,
}

impl ChangeSet {
    /// Whether nothing needs refreshing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.rebuild && self.channels.is_empty() && self.buffer.is_empty()
    }
}

/// Whether impostor geometry is in effect for a live parameter set.
#[must_use]
pub fn impostor_active(live: &ParamSet, caps: &CapabilityOptions) -> bool {
    caps.impostor && !live.flag(DISABLE_IMPOSTOR)
}

/// Apply `partial` to `live` through `table` and classify the result.
///
/// Unknown and removed names are ignored, as are values that fail to
/// coerce or that equal the live value. Values are applied before effects
/// are resolved, so a `disableImpostor` change in the same batch already
/// counts for its siblings.
pub fn apply_changes(
    table: &ParamTable,
    live: &mut ParamSet,
    partial: &ParamSet,
    caps: &CapabilityOptions,
) -> ChangeSet {
    let mut accepted = Vec::new();
    for (name, value) in partial {
        let Some(c) = table.classify(name, value, live.get(name), true) else {
            continue;
        };
        let Some((key, _)) = table.get_key_value(name) else {
            continue;
        };
        drop(live.insert(key, c.value));
        accepted.push(key);
    }

    let impostor = impostor_active(live, caps);
    let mut changes = ChangeSet::default();
    for key in accepted {
        let Some(spec) = table.get(key) else {
            continue;
        };
        let (path, _) = spec.effect.resolve(key, impostor);
        trace!("param {key} -> {path:?}");
        match path {
            RefreshPath::None => {}
            RefreshPath::Buffer(target) => {
                if let Some(value) = live.get(key) {
                    drop(changes.buffer.insert(target, value.clone()));
                }
            }
            RefreshPath::Recompute(channel) => changes.channels.insert(channel),
            RefreshPath::Rebuild => changes.rebuild = true,
        }
        changes.changed.push(key);
    }
    changes
}
