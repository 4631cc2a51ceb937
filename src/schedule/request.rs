use super::Coalesce;
use crate::params::{ChannelSet, ParamSet};

/// A queued build: a full parameter snapshot plus, for in-place updates,
/// the set of stale channels.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildRequest {
    /// Snapshot of the live parameters at submission time.
    pub params: ParamSet,
    /// `Some` for a channel recompute, `None` for a full rebuild.
    pub update: Option<ChannelSet>,
}

impl BuildRequest {
    /// Full rebuild request.
    #[must_use]
    pub const fn full(params: ParamSet) -> Self {
        Self {
            params,
            update: None,
        }
    }

    /// In-place recompute of `channels`.
    #[must_use]
    pub const fn update(params: ParamSet, channels: ChannelSet) -> Self {
        Self {
            params,
            update: Some(channels),
        }
    }

    /// Whether this is a recompute rather than a rebuild.
    #[must_use]
    pub const fn is_update(&self) -> bool {
        self.update.is_some()
    }

    /// Overlay values that were applied directly to buffers after this
    /// request was snapshotted, so running it does not revert them.
    pub fn patch(&mut self, values: &ParamSet) {
        self.params.merge(values);
    }
}

impl Coalesce for BuildRequest {
    /// The newer snapshot always wins. A rebuild on either side absorbs a
    /// recompute; two recomputes merge their channels.
    fn coalesce(self, newer: Self) -> Self {
        let update = match (self.update, newer.update) {
            (Some(a), Some(b)) => Some(a.union(b)),
            _ => None,
        };
        Self {
            params: newer.params,
            update,
        }
    }
}
