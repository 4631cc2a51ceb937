//! Space-filling spheres, one per atom.

use super::common::{atom_attributes, detail_params, supported};
use crate::error::AdapterError;
use crate::params::{Channel, ChannelSet};
use crate::repr::{
    BuildContext, DataUnit, SourceAdapter, UnitData, UpdateContext,
    UpdateOutcome,
};
use crate::scene::{BufferKind, BufferSpec};
use crate::source::{AtomRequest, AtomView};

/// Adapter for the `spacefill` style.
#[derive(Debug, Default)]
pub struct SphereAdapter;

impl SphereAdapter {
    const CHANNELS: ChannelSet = ChannelSet::EMPTY
        .with(Channel::Position)
        .with(Channel::Color)
        .with(Channel::Radius);
}

impl<V: AtomView> SourceAdapter<V> for SphereAdapter {
    fn create_data(
        &mut self,
        ctx: &mut BuildContext<'_>,
        view: &V,
        _part: usize,
    ) -> Result<Option<UnitData>, AdapterError> {
        if view.is_empty() {
            return Ok(None);
        }
        let mut request = AtomRequest::all(ctx.params());
        request.index = false;
        let impostor = ctx.impostor();
        let mut spec = BufferSpec::new(BufferKind::Sphere, impostor)
            .params(&detail_params(ctx.params(), impostor));
        spec.attributes = atom_attributes(view.atom_data(&request));
        let buffer = ctx.create_buffer(spec)?;
        Ok(Some(UnitData::new(vec![buffer])))
    }

    fn update_data(
        &mut self,
        ctx: &UpdateContext<'_>,
        channels: ChannelSet,
        unit: &mut DataUnit<V>,
    ) -> Result<UpdateOutcome, AdapterError> {
        let channels = supported(channels, Self::CHANNELS);
        if channels.is_empty() {
            return Ok(UpdateOutcome::Updated);
        }
        let request = AtomRequest::channels(channels, ctx.params());
        let attributes = atom_attributes(unit.view.atom_data(&request));
        unit.set_attributes(&attributes);
        Ok(UpdateOutcome::Updated)
    }
}
