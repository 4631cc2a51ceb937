use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::params::{Channel, ParamSet};

/// Attribute name for vertex or instance positions.
pub const POSITION: &str = "position";
/// Attribute name for the second endpoint of cylinders and lines.
pub const POSITION2: &str = "position2";
/// Attribute name for colors.
pub const COLOR: &str = "color";
/// Attribute name for the second endpoint color of cylinders and lines.
pub const COLOR2: &str = "color2";
/// Attribute name for radii.
pub const RADIUS: &str = "radius";
/// Attribute name for triangle indices.
pub const INDEX: &str = "index";
/// Attribute name for vertex normals.
pub const NORMAL: &str = "normal";

/// Stable identity of a geometry buffer for the lifetime of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

/// One attribute channel's values.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeData {
    /// Per-element 3-vectors (positions, normals, RGB colors).
    Vec3(Vec<Vec3>),
    /// Per-element scalars (radii).
    Scalar(Vec<f32>),
    /// Triangle or element indices.
    Index(Vec<u32>),
}

impl AttributeData {
    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Vec3(v) => v.len(),
            Self::Scalar(v) => v.len(),
            Self::Index(v) => v.len(),
        }
    }

    /// Whether there are no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Named attribute channels, full (creation) or partial (in-place update).
pub type AttributeMap = FxHashMap<&'static str, AttributeData>;

/// Attribute names a recompute of `channel` rewrites.
#[must_use]
pub const fn channel_attributes(channel: Channel) -> &'static [&'static str] {
    match channel {
        Channel::Position => &[POSITION, POSITION2],
        Channel::Color => &[COLOR, COLOR2],
        Channel::Radius => &[RADIUS],
        Channel::Index => &[INDEX],
        Channel::Normal => &[NORMAL],
    }
}

/// Primitive a buffer draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Spheres at positions with radii.
    Sphere,
    /// Cylinders between two endpoint lists.
    Cylinder,
    /// Point sprites.
    Point,
    /// Line segments between two endpoint lists.
    Line,
    /// Indexed triangle mesh.
    Mesh,
}

/// Everything the backend needs to allocate one buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferSpec {
    /// Primitive type.
    pub kind: BufferKind,
    /// Draw spheres and cylinders as impostors instead of tessellated
    /// meshes.
    pub impostor: bool,
    /// Initial attribute channels.
    pub attributes: AttributeMap,
    /// Initial buffer-level parameters (opacity, side, detail, ...).
    pub params: ParamSet,
}

impl BufferSpec {
    /// Spec with no attributes or parameters yet.
    #[must_use]
    pub fn new(kind: BufferKind, impostor: bool) -> Self {
        Self {
            kind,
            impostor,
            attributes: AttributeMap::default(),
            params: ParamSet::new(),
        }
    }

    /// Builder-style attribute insert.
    #[must_use]
    pub fn attribute(mut self, name: &'static str, data: AttributeData) -> Self {
        drop(self.attributes.insert(name, data));
        self
    }

    /// Builder-style parameter overlay.
    #[must_use]
    pub fn params(mut self, params: &ParamSet) -> Self {
        self.params.merge(params);
        self
    }
}
