use std::fmt;

use glam::Mat4;

use super::fanout::PartView;
use crate::params::ParamSet;
use crate::scene::{AttributeMap, BufferId, GeometryBuffer, SceneGraph};

/// Geometry produced by an adapter for one part, before it is bound to
/// its data slice.
pub struct UnitData {
    /// Buffers in draw order.
    pub buffers: Vec<Box<dyn GeometryBuffer>>,
}

impl UnitData {
    /// Wrap freshly created buffers.
    #[must_use]
    pub fn new(buffers: Vec<Box<dyn GeometryBuffer>>) -> Self {
        Self { buffers }
    }
}

impl fmt::Debug for UnitData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitData")
            .field("buffers", &ids(&self.buffers))
            .finish()
    }
}

/// One produced geometry bundle plus the data slice and instance
/// transforms it came from.
pub struct DataUnit<V> {
    /// Owned buffers.
    pub buffers: Vec<Box<dyn GeometryBuffer>>,
    /// The exact view the buffers were derived from.
    pub view: V,
    /// Per-instance transforms, `None` for a single untransformed copy.
    pub instances: Option<Vec<Mat4>>,
    /// Assembly part index.
    pub part: usize,
}

impl<V: Clone> DataUnit<V> {
    pub(crate) fn new(data: UnitData, part: PartView<V>) -> Self {
        Self {
            buffers: data.buffers,
            view: part.view,
            instances: part.instances,
            part: part.index,
        }
    }

    pub(crate) fn part_view(&self) -> PartView<V> {
        PartView {
            index: self.part,
            view: self.view.clone(),
            instances: self.instances.clone(),
        }
    }
}

impl<V> DataUnit<V> {
    /// Identities of the owned buffers.
    #[must_use]
    pub fn buffer_ids(&self) -> Vec<BufferId> {
        ids(&self.buffers)
    }

    /// Push attribute channels into every buffer.
    pub fn set_attributes(&mut self, attributes: &AttributeMap) {
        for buffer in &mut self.buffers {
            buffer.set_attributes(attributes);
        }
    }

    pub(crate) fn set_parameters(&mut self, params: &ParamSet) {
        for buffer in &mut self.buffers {
            buffer.set_parameters(params);
        }
    }

    pub(crate) fn set_visibility(&mut self, visible: bool) {
        for buffer in &mut self.buffers {
            buffer.set_visibility(visible);
        }
    }

    pub(crate) fn attach(&mut self, scene: &mut dyn SceneGraph, visible: bool) {
        for buffer in &mut self.buffers {
            buffer.set_visibility(visible);
            scene.add(&**buffer, self.instances.as_deref());
        }
    }

    /// Detach from the scene and release.
    pub(crate) fn release(self, scene: &mut dyn SceneGraph) {
        for mut buffer in self.buffers {
            scene.remove(buffer.id());
            buffer.dispose();
        }
    }

    /// Release buffers that were never attached.
    pub(crate) fn discard(self) {
        for mut buffer in self.buffers {
            buffer.dispose();
        }
    }
}

impl<V> fmt::Debug for DataUnit<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataUnit")
            .field("buffers", &ids(&self.buffers))
            .field("instances", &self.instances.as_ref().map(Vec::len))
            .field("part", &self.part)
            .finish_non_exhaustive()
    }
}

fn ids(buffers: &[Box<dyn GeometryBuffer>]) -> Vec<BufferId> {
    buffers.iter().map(|b| b.id()).collect()
}
