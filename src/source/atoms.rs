//! Per-atom and per-bond data requests for structure views.
//!
//! Color themes and radius tables live behind the view; a request only
//! names which channels to produce and with which color/radius settings.

use glam::Vec3;

use super::DataView;
use crate::params::{Channel, ChannelSet, ParamSet};

/// Color theme settings, read from the `color*` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorParams {
    /// Scheme name (`element`, `chainid`, `uniform`, ...).
    pub scheme: String,
    /// Color scale name for graded schemes.
    pub scale: String,
    /// Packed `0xRRGGBB` color for the uniform scheme.
    pub value: u32,
    /// Value domain for graded schemes.
    pub domain: String,
    /// Interpolation color space.
    pub mode: String,
}

impl ColorParams {
    /// Read from a parameter snapshot, falling back to uniform grey.
    #[must_use]
    pub fn from_params(params: &ParamSet) -> Self {
        let text = |name, default: &str| {
            params.text(name).unwrap_or(default).to_owned()
        };
        Self {
            scheme: text("colorScheme", "uniform"),
            scale: text("colorScale", ""),
            value: params.color("colorValue").unwrap_or(0x0090_9090),
            domain: text("colorDomain", ""),
            mode: text("colorMode", "hcl"),
        }
    }
}

/// Where atom radii come from.
#[derive(Debug, Clone, PartialEq)]
pub enum RadiusType {
    /// A named radius table (`vdw`, `covalent`, `bfactor`, ...).
    Named(String),
    /// The same explicit size for every atom.
    Size(f32),
}

/// Radius settings, read from the `radius` and `scale` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusParams {
    /// Radius source.
    pub radius: RadiusType,
    /// Multiplier applied to every radius.
    pub scale: f32,
}

impl RadiusParams {
    /// Read from a parameter snapshot.
    #[must_use]
    pub fn from_params(params: &ParamSet) -> Self {
        let radius = match (params.text("radius"), params.f64("radius")) {
            (Some(name), _) => RadiusType::Named(name.to_owned()),
            (None, Some(size)) => RadiusType::Size(size as f32),
            (None, None) => RadiusType::Named("vdw".to_owned()),
        };
        Self {
            radius,
            scale: params.f64("scale").unwrap_or(1.0) as f32,
        }
    }

    /// Same radii scaled by an extra factor.
    #[must_use]
    pub fn scaled(mut self, factor: f32) -> Self {
        self.scale *= factor;
        self
    }
}

/// Which per-atom (or per-bond) channels to produce.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AtomRequest {
    /// Produce positions.
    pub position: bool,
    /// Produce colors with these settings.
    pub color: Option<ColorParams>,
    /// Produce radii with these settings.
    pub radius: Option<RadiusParams>,
    /// Produce source atom indices.
    pub index: bool,
}

impl AtomRequest {
    /// Every channel.
    #[must_use]
    pub fn all(params: &ParamSet) -> Self {
        Self {
            position: true,
            color: Some(ColorParams::from_params(params)),
            radius: Some(RadiusParams::from_params(params)),
            index: true,
        }
    }

    /// Only the given channels.
    #[must_use]
    pub fn channels(channels: ChannelSet, params: &ParamSet) -> Self {
        Self {
            position: channels.contains(Channel::Position),
            color: channels
                .contains(Channel::Color)
                .then(|| ColorParams::from_params(params)),
            radius: channels
                .contains(Channel::Radius)
                .then(|| RadiusParams::from_params(params)),
            index: channels.contains(Channel::Index),
        }
    }

    /// Override the radius settings (when radii are requested at all).
    #[must_use]
    pub fn map_radius(
        mut self,
        f: impl FnOnce(RadiusParams) -> RadiusParams,
    ) -> Self {
        self.radius = self.radius.map(f);
        self
    }
}

/// Per-atom channel values. Channels that were not requested are empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AtomData {
    /// Atom positions.
    pub position: Vec<Vec3>,
    /// RGB colors.
    pub color: Vec<Vec3>,
    /// Radii.
    pub radius: Vec<f32>,
    /// Source atom indices.
    pub index: Vec<u32>,
}

/// Per-bond channel values, one entry per bond. Channels that were not
/// requested are empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BondData {
    /// First endpoint.
    pub position1: Vec<Vec3>,
    /// Second endpoint.
    pub position2: Vec<Vec3>,
    /// Color at the first endpoint.
    pub color1: Vec<Vec3>,
    /// Color at the second endpoint.
    pub color2: Vec<Vec3>,
    /// Bond radii.
    pub radius: Vec<f32>,
}

/// A filtered view of a molecular structure.
pub trait AtomView: DataView {
    /// Atom channels for the atoms in this view.
    fn atom_data(&self, request: &AtomRequest) -> AtomData;

    /// Bond channels for bonds with both atoms in this view.
    fn bond_data(&self, request: &AtomRequest) -> BondData;
}
