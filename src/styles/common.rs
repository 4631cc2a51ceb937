//! Attribute packing shared by the atom-based styles.

use crate::params::{ChannelSet, ParamSet};
use crate::scene::{
    AttributeData, AttributeMap, COLOR, COLOR2, POSITION, POSITION2, RADIUS,
};
use crate::source::{AtomData, BondData};

/// Tessellation parameters forwarded to non-impostor buffers.
pub(crate) const DETAIL_PARAMS: &[&str] = &["sphereDetail", "radiusSegments"];

/// Pack the non-empty atom channels.
pub(crate) fn atom_attributes(data: AtomData) -> AttributeMap {
    let mut attributes = AttributeMap::default();
    if !data.position.is_empty() {
        drop(attributes.insert(POSITION, AttributeData::Vec3(data.position)));
    }
    if !data.color.is_empty() {
        drop(attributes.insert(COLOR, AttributeData::Vec3(data.color)));
    }
    if !data.radius.is_empty() {
        drop(attributes.insert(RADIUS, AttributeData::Scalar(data.radius)));
    }
    attributes
}

/// Pack the non-empty bond channels as two-endpoint attributes.
pub(crate) fn bond_attributes(data: BondData) -> AttributeMap {
    let mut attributes = AttributeMap::default();
    if !data.position1.is_empty() {
        drop(attributes.insert(POSITION, AttributeData::Vec3(data.position1)));
        drop(attributes.insert(POSITION2, AttributeData::Vec3(data.position2)));
    }
    if !data.color1.is_empty() {
        drop(attributes.insert(COLOR, AttributeData::Vec3(data.color1)));
        drop(attributes.insert(COLOR2, AttributeData::Vec3(data.color2)));
    }
    if !data.radius.is_empty() {
        drop(attributes.insert(RADIUS, AttributeData::Scalar(data.radius)));
    }
    attributes
}

/// Tessellation values for mesh-based spheres and cylinders; impostors
/// take none.
pub(crate) fn detail_params(params: &ParamSet, impostor: bool) -> ParamSet {
    if impostor {
        return ParamSet::new();
    }
    DETAIL_PARAMS
        .iter()
        .filter_map(|name| Some((*name, params.get(name)?.clone())))
        .collect()
}

/// Channels an adapter knows how to refresh; the rest are ignored.
pub(crate) fn supported(channels: ChannelSet, known: ChannelSet) -> ChannelSet {
    channels.iter().filter(|c| known.contains(*c)).fold(
        ChannelSet::EMPTY,
        ChannelSet::with,
    )
}
