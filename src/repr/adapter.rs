use log::trace;

use super::{DataUnit, PartView, UnitData};
use crate::error::AdapterError;
use crate::params::{ChannelSet, ParamSet};
use crate::scene::{BufferSpec, GeometryBuffer, SceneGraph};
use crate::schedule::Prepare;

/// Result of an in-place channel refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The channels were pushed into the existing buffers.
    Updated,
    /// The change cannot be applied in place (for example new positions
    /// invalidate a cached surface); the representation schedules a full
    /// rebuild instead.
    NeedsRebuild,
}

/// Inputs to an adapter's prepare step.
#[derive(Debug)]
pub struct PrepareContext<'a, V> {
    /// Parameter snapshot of the request being executed.
    pub params: &'a ParamSet,
    /// Views the request will create or update data for.
    pub parts: &'a [PartView<V>],
    /// Stale channels for an update, `None` for a full rebuild.
    pub update: Option<ChannelSet>,
}

/// Inputs to data creation, including the only way to allocate buffers.
pub struct BuildContext<'a> {
    params: &'a ParamSet,
    buffer_params: &'a ParamSet,
    impostor: bool,
    scene: &'a mut dyn SceneGraph,
}

impl<'a> BuildContext<'a> {
    pub(crate) fn new(
        params: &'a ParamSet,
        buffer_params: &'a ParamSet,
        impostor: bool,
        scene: &'a mut dyn SceneGraph,
    ) -> Self {
        Self {
            params,
            buffer_params,
            impostor,
            scene,
        }
    }

    /// Parameter snapshot of the request being executed.
    #[must_use]
    pub const fn params(&self) -> &ParamSet {
        self.params
    }

    /// Buffer-mutable values to seed new buffers with.
    #[must_use]
    pub const fn buffer_params(&self) -> &ParamSet {
        self.buffer_params
    }

    /// Whether impostor geometry is in effect.
    #[must_use]
    pub const fn impostor(&self) -> bool {
        self.impostor
    }

    /// Allocate a buffer, seeded with the buffer-mutable parameters.
    ///
    /// # Errors
    ///
    /// Propagates the backend's rejection.
    pub fn create_buffer(
        &mut self,
        spec: BufferSpec,
    ) -> Result<Box<dyn GeometryBuffer>, AdapterError> {
        let mut spec = spec;
        for (name, value) in self.buffer_params {
            if !spec.params.contains(name) {
                drop(spec.params.insert(name.as_str(), value.clone()));
            }
        }
        trace!("create {:?} buffer (impostor: {})", spec.kind, spec.impostor);
        self.scene.create_buffer(spec)
    }
}

/// Inputs to an in-place channel refresh. There is no way to allocate
/// buffers from here.
#[derive(Debug, Clone, Copy)]
pub struct UpdateContext<'a> {
    params: &'a ParamSet,
    impostor: bool,
}

impl<'a> UpdateContext<'a> {
    pub(crate) const fn new(params: &'a ParamSet, impostor: bool) -> Self {
        Self { params, impostor }
    }

    /// Parameter snapshot of the request being executed.
    #[must_use]
    pub const fn params(&self) -> &ParamSet {
        self.params
    }

    /// Whether impostor geometry is in effect.
    #[must_use]
    pub const fn impostor(&self) -> bool {
        self.impostor
    }
}

/// The seam a visual style implements: turn data views into geometry.
pub trait SourceAdapter<V> {
    /// Optional asynchronous precomputation that must finish before data
    /// can be created or updated for `ctx.parts`.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] if the work cannot be started.
    fn prepare(
        &mut self,
        ctx: &PrepareContext<'_, V>,
    ) -> Result<Prepare, AdapterError> {
        let _ = ctx;
        Ok(Prepare::Ready)
    }

    /// Produce geometry for one part, or `None` when there is nothing to
    /// draw.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] if geometry cannot be created. Buffers
    /// the adapter allocated but does not return are its own to dispose.
    fn create_data(
        &mut self,
        ctx: &mut BuildContext<'_>,
        view: &V,
        part: usize,
    ) -> Result<Option<UnitData>, AdapterError>;

    /// Regenerate `channels` and push them into `unit`'s existing buffers.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] if the channels cannot be computed.
    fn update_data(
        &mut self,
        ctx: &UpdateContext<'_>,
        channels: ChannelSet,
        unit: &mut DataUnit<V>,
    ) -> Result<UpdateOutcome, AdapterError>;

    /// Release adapter-held resources (caches, workers). Called once when
    /// the representation is disposed.
    fn dispose(&mut self) {}
}
