//! Atom and bond geometry: ball+stick, licorice and line.
//!
//! One adapter draws all three; an [`AtomBondStrategy`] picks which
//! layers exist and how atom radii relate to bond radii.

use log::trace;

use super::common::{atom_attributes, bond_attributes, detail_params, supported};
use crate::error::AdapterError;
use crate::params::{Channel, ChannelSet, ParamSet};
use crate::repr::{
    BuildContext, DataUnit, SourceAdapter, UnitData, UpdateContext,
    UpdateOutcome,
};
use crate::scene::{AttributeMap, BufferKind, BufferSpec};
use crate::source::{AtomRequest, AtomView};

/// How atoms and bonds are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomBondStrategy {
    /// Spheres `aspectRatio` times wider than the bond cylinders.
    BallAndStick,
    /// Spheres as wide as the bonds, capping them.
    Licorice,
    /// Bonds as line segments, no atoms.
    Line,
}

/// One buffer of a unit, in draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Atoms,
    Bonds(BufferKind),
}

impl AtomBondStrategy {
    /// Style name this strategy is registered under.
    #[must_use]
    pub const fn style(self) -> &'static str {
        match self {
            Self::BallAndStick => "ball+stick",
            Self::Licorice => "licorice",
            Self::Line => "line",
        }
    }

    fn layers(self, params: &ParamSet) -> &'static [Layer] {
        const STICKS: &[Layer] = &[Layer::Atoms, Layer::Bonds(BufferKind::Cylinder)];
        const CYLINDERS: &[Layer] = &[Layer::Bonds(BufferKind::Cylinder)];
        const LINES: &[Layer] = &[Layer::Bonds(BufferKind::Line)];
        if self == Self::Line || params.flag("lineOnly") {
            LINES
        } else if params.flag("cylinderOnly") {
            CYLINDERS
        } else {
            STICKS
        }
    }

    fn aspect_ratio(self, params: &ParamSet) -> f32 {
        match self {
            Self::BallAndStick => params.f64("aspectRatio").unwrap_or(2.0) as f32,
            Self::Licorice | Self::Line => 1.0,
        }
    }
}

/// Adapter for the atom/bond styles.
#[derive(Debug)]
pub struct AtomBondAdapter {
    strategy: AtomBondStrategy,
}

impl AtomBondAdapter {
    /// Adapter drawing with `strategy`.
    #[must_use]
    pub const fn new(strategy: AtomBondStrategy) -> Self {
        Self { strategy }
    }

    /// Attributes for one layer. Lines never carry radii.
    fn layer_attributes<V: AtomView>(
        &self,
        layer: Layer,
        view: &V,
        channels: ChannelSet,
        params: &ParamSet,
    ) -> AttributeMap {
        let request = AtomRequest::channels(channels, params);
        match layer {
            Layer::Atoms => {
                let aspect = self.strategy.aspect_ratio(params);
                let request = request.map_radius(|r| r.scaled(aspect));
                atom_attributes(view.atom_data(&request))
            }
            Layer::Bonds(BufferKind::Line) => {
                let request = AtomRequest {
                    radius: None,
                    ..request
                };
                bond_attributes(view.bond_data(&request))
            }
            Layer::Bonds(_) => bond_attributes(view.bond_data(&request)),
        }
    }
}

const CHANNELS: ChannelSet = ChannelSet::EMPTY
    .with(Channel::Position)
    .with(Channel::Color)
    .with(Channel::Radius);

impl<V: AtomView> SourceAdapter<V> for AtomBondAdapter {
    fn create_data(
        &mut self,
        ctx: &mut BuildContext<'_>,
        view: &V,
        part: usize,
    ) -> Result<Option<UnitData>, AdapterError> {
        if view.is_empty() {
            return Ok(None);
        }
        let layers = self.strategy.layers(ctx.params());
        let mut buffers = Vec::with_capacity(layers.len());
        for &layer in layers {
            let kind = match layer {
                Layer::Atoms => BufferKind::Sphere,
                Layer::Bonds(kind) => kind,
            };
            let impostor = ctx.impostor() && kind != BufferKind::Line;
            let attributes =
                self.layer_attributes(layer, view, CHANNELS, ctx.params());
            let mut spec = BufferSpec::new(kind, impostor)
                .params(&detail_params(ctx.params(), impostor));
            spec.attributes = attributes;
            match ctx.create_buffer(spec) {
                Ok(buffer) => buffers.push(buffer),
                Err(e) => {
                    for mut buffer in buffers {
                        buffer.dispose();
                    }
                    return Err(e);
                }
            }
        }
        trace!(
            "{} part {part}: {} buffers",
            self.strategy.style(),
            buffers.len()
        );
        Ok(Some(UnitData::new(buffers)))
    }

    fn update_data(
        &mut self,
        ctx: &UpdateContext<'_>,
        channels: ChannelSet,
        unit: &mut DataUnit<V>,
    ) -> Result<UpdateOutcome, AdapterError> {
        let channels = supported(channels, CHANNELS);
        if channels.is_empty() {
            return Ok(UpdateOutcome::Updated);
        }
        let layers = self.strategy.layers(ctx.params());
        if layers.len() != unit.buffers.len() {
            return Ok(UpdateOutcome::NeedsRebuild);
        }
        for (&layer, buffer) in layers.iter().zip(unit.buffers.iter_mut()) {
            let attributes =
                self.layer_attributes(layer, &unit.view, channels, ctx.params());
            if !attributes.is_empty() {
                buffer.set_attributes(&attributes);
            }
        }
        Ok(UpdateOutcome::Updated)
    }
}
