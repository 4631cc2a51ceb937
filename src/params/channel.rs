//! Recompute channels.
//!
//! A channel names one independently regenerable per-element attribute of
//! a representation's geometry. Marking a channel stale asks the style
//! adapter to regenerate that channel's values and push them into the
//! existing buffers without reallocating them.

use std::fmt;

/// One regenerable data channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    /// Element positions (and anything derived from them, e.g. normals of
    /// a tube).
    Position,
    /// Per-element colors.
    Color,
    /// Per-element radii / sizes.
    Radius,
    /// Index lists (e.g. the triangles kept by a surface filter).
    Index,
    /// Per-vertex normals.
    Normal,
}

impl Channel {
    /// All channels in bit order.
    pub const ALL: [Self; 5] = [
        Self::Position,
        Self::Color,
        Self::Radius,
        Self::Index,
        Self::Normal,
    ];

    const fn bit(self) -> u8 {
        1 << self as u8
    }

    /// Lower-case channel name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Color => "color",
            Self::Radius => "radius",
            Self::Index => "index",
            Self::Normal => "normal",
        }
    }
}

/// Small set of [`Channel`]s.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChannelSet(u8);

impl ChannelSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Every channel.
    #[must_use]
    pub fn all() -> Self {
        Channel::ALL.into_iter().collect()
    }

    /// Add a channel.
    pub fn insert(&mut self, channel: Channel) {
        self.0 |= channel.bit();
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub const fn with(self, channel: Channel) -> Self {
        Self(self.0 | channel.bit())
    }

    /// Whether the channel is in the set.
    #[must_use]
    pub const fn contains(self, channel: Channel) -> bool {
        self.0 & channel.bit() != 0
    }

    /// Whether no channel is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Set union.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Channels in bit order.
    pub fn iter(self) -> impl Iterator<Item = Channel> {
        Channel::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Channel> for ChannelSet {
    fn from_iter<I: IntoIterator<Item = Channel>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for channel in iter {
            set.insert(channel);
        }
        set
    }
}

impl fmt::Debug for ChannelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(Channel::name)).finish()
    }
}
