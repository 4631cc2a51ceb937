//! Contracts with the rendering backend.
//!
//! A representation owns every [`GeometryBuffer`] it creates. The
//! [`SceneGraph`] only ever holds non-owning references, added on attach and
//! removed on clear, and is asked to redraw after any visible change.

mod buffer;

pub use buffer::{
    channel_attributes, AttributeData, AttributeMap, BufferId, BufferKind,
    BufferSpec, COLOR, COLOR2, INDEX, NORMAL, POSITION, POSITION2, RADIUS,
};
use glam::Mat4;

use crate::error::AdapterError;
use crate::params::ParamSet;

// ---------------------------------------------------------------------------
// GeometryBuffer
// ---------------------------------------------------------------------------

/// A backend geometry buffer.
pub trait GeometryBuffer {
    /// Identity, stable until [`dispose`](Self::dispose).
    fn id(&self) -> BufferId;

    /// Overwrite the named attribute channels in place.
    fn set_attributes(&mut self, attributes: &AttributeMap);

    /// Apply buffer-level parameters (opacity, side, wireframe, ...).
    fn set_parameters(&mut self, params: &ParamSet);

    /// Show or hide.
    fn set_visibility(&mut self, visible: bool);

    /// Release backend resources. Called exactly once, after removal from
    /// the scene.
    fn dispose(&mut self);
}

// ---------------------------------------------------------------------------
// SceneGraph
// ---------------------------------------------------------------------------

/// The external scene a representation attaches its buffers to.
pub trait SceneGraph {
    /// Allocate a buffer. The caller owns the result.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Backend`] if the backend rejects the spec.
    fn create_buffer(
        &mut self,
        spec: BufferSpec,
    ) -> Result<Box<dyn GeometryBuffer>, AdapterError>;

    /// Start drawing `buffer`, once per instance transform when given.
    fn add(&mut self, buffer: &dyn GeometryBuffer, instances: Option<&[Mat4]>);

    /// Stop drawing a buffer.
    fn remove(&mut self, id: BufferId);

    /// Ask for a redraw on the next frame.
    fn request_render(&mut self);
}
