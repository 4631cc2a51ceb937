//! Point sprites at atom positions.

use super::common::{atom_attributes, supported};
use crate::error::AdapterError;
use crate::params::{Channel, ChannelSet};
use crate::repr::{
    BuildContext, DataUnit, SourceAdapter, UnitData, UpdateContext,
    UpdateOutcome,
};
use crate::scene::{BufferKind, BufferSpec};
use crate::source::{AtomRequest, AtomView};

/// Adapter for the `point` style. Sprites are sized by `pointSize` on the
/// buffer, so no radii are produced.
#[derive(Debug, Default)]
pub struct PointAdapter;

impl PointAdapter {
    const CHANNELS: ChannelSet =
        ChannelSet::EMPTY.with(Channel::Position).with(Channel::Color);
}

impl<V: AtomView> SourceAdapter<V> for PointAdapter {
    fn create_data(
        &mut self,
        ctx: &mut BuildContext<'_>,
        view: &V,
        _part: usize,
    ) -> Result<Option<UnitData>, AdapterError> {
        if view.is_empty() {
            return Ok(None);
        }
        let request = AtomRequest::channels(Self::CHANNELS, ctx.params());
        let mut spec = BufferSpec::new(BufferKind::Point, false);
        spec.attributes = atom_attributes(view.atom_data(&request));
        Ok(Some(UnitData::new(vec![ctx.create_buffer(spec)?])))
    }

    fn update_data(
        &mut self,
        ctx: &UpdateContext<'_>,
        channels: ChannelSet,
        unit: &mut DataUnit<V>,
    ) -> Result<UpdateOutcome, AdapterError> {
        let channels = supported(channels, Self::CHANNELS);
        if !channels.is_empty() {
            let request = AtomRequest::channels(channels, ctx.params());
            unit.set_attributes(&atom_attributes(unit.view.atom_data(&request)));
        }
        Ok(UpdateOutcome::Updated)
    }
}
