//! Built-in parameter tables, composed from a base table with per-style
//! overrides.

use super::{Channel, Effect, ParamKind, ParamSpec, ParamTable};

const BUFFER: Effect = Effect::Buffer { rename: None };
const COLOR: Effect = Effect::Recompute {
    channel: Channel::Color,
    needs_impostor: false,
};
const RADIUS: Effect = Effect::Recompute {
    channel: Channel::Radius,
    needs_impostor: true,
};

/// Face culling options.
pub const SIDE_OPTIONS: &[&str] = &["front", "back", "double"];
/// Color interpolation modes.
pub const COLOR_MODES: &[&str] = &["rgb", "hsv", "hsl", "hsi", "lab", "hcl"];
/// Molecular surface algorithms.
pub const SURFACE_TYPES: &[&str] = &["vws", "sas", "ms", "ses"];

/// Parameters shared by every style.
#[must_use]
pub fn base() -> ParamTable {
    ParamTable::new()
        .with("clipNear", ParamSpec::float(BUFFER, 0.0))
        .with("flatShaded", ParamSpec::boolean(BUFFER, false))
        .with("opacity", ParamSpec::float(BUFFER, 1.0))
        .with(
            "side",
            ParamSpec::new(ParamKind::Select(SIDE_OPTIONS), BUFFER, "double"),
        )
        .with("wireframe", ParamSpec::boolean(BUFFER, false))
        .with("linewidth", ParamSpec::integer(BUFFER, 2))
        .with(
            "colorScheme",
            ParamSpec::new(ParamKind::Text, COLOR, "uniform"),
        )
        .with("colorScale", ParamSpec::new(ParamKind::Text, COLOR, ""))
        .with(
            "colorValue",
            ParamSpec::new(ParamKind::Color, COLOR, 0x0090_9090_u32),
        )
        .with("colorDomain", ParamSpec::new(ParamKind::Text, COLOR, ""))
        .with(
            "colorMode",
            ParamSpec::new(ParamKind::Select(COLOR_MODES), COLOR, "hcl"),
        )
        .with("roughness", ParamSpec::float(BUFFER, 0.4))
        .with("metalness", ParamSpec::float(BUFFER, 0.0))
        .with(
            "diffuse",
            ParamSpec::new(ParamKind::Color, BUFFER, 0x00FF_FFFF_u32),
        )
}

/// Parameters shared by styles drawn from a structure.
///
/// `assembly` starts out removed; it becomes settable only for sources
/// that declare assemblies (see [`with_assembly`]).
#[must_use]
pub fn structure() -> ParamTable {
    base()
        .extend(
            ParamTable::new()
                .with("radius", ParamSpec::new(ParamKind::Radius, RADIUS, "vdw"))
                .with("scale", ParamSpec::float(RADIUS, 1.0))
                .without("assembly"),
        )
        .with_default("colorScheme", "element")
}

/// Make `assembly` and `defaultAssembly` settable (both rebuild) on a
/// composed table.
#[must_use]
pub fn with_assembly(table: ParamTable) -> ParamTable {
    table
        .with(
            "assembly",
            ParamSpec::new(ParamKind::Text, Effect::Rebuild, "default"),
        )
        .with(
            "defaultAssembly",
            ParamSpec::new(ParamKind::Text, Effect::Rebuild, ""),
        )
}

/// Space-filling spheres.
#[must_use]
pub fn spacefill() -> ParamTable {
    structure().extend(
        ParamTable::new()
            .with(
                "sphereDetail",
                ParamSpec::integer(Effect::RebuildUnlessImpostor, 1),
            )
            .with(
                "disableImpostor",
                ParamSpec::boolean(Effect::Rebuild, false),
            ),
    )
}

/// Point sprites.
#[must_use]
pub fn point() -> ParamTable {
    structure().extend(
        ParamTable::new()
            .with("pointSize", ParamSpec::float(BUFFER, 1.0))
            .with("sizeAttenuation", ParamSpec::boolean(BUFFER, true))
            .with("sortParticles", ParamSpec::boolean(Effect::Rebuild, false))
            .with("useTexture", ParamSpec::boolean(BUFFER, false))
            .with("alphaTest", ParamSpec::float(BUFFER, 0.5))
            .with("forceTransparent", ParamSpec::boolean(BUFFER, false))
            .with("edgeBleach", ParamSpec::float(BUFFER, 0.0))
            .without("radius")
            .without("scale")
            .without("flatShaded")
            .without("wireframe")
            .without("linewidth")
            .without("roughness")
            .without("metalness"),
    )
}

/// Spheres for atoms, cylinders for bonds.
#[must_use]
pub fn ball_and_stick() -> ParamTable {
    structure()
        .extend(
            ParamTable::new()
                .with(
                    "sphereDetail",
                    ParamSpec::integer(Effect::RebuildUnlessImpostor, 1),
                )
                .with(
                    "radiusSegments",
                    ParamSpec::integer(Effect::RebuildUnlessImpostor, 10),
                )
                .with(
                    "disableImpostor",
                    ParamSpec::boolean(Effect::Rebuild, false),
                )
                .with("aspectRatio", ParamSpec::float(RADIUS, 2.0))
                .with("lineOnly", ParamSpec::boolean(Effect::Rebuild, false))
                .with(
                    "cylinderOnly",
                    ParamSpec::boolean(Effect::Rebuild, false),
                ),
        )
        .with_default("radius", 0.15)
}

/// Ball-and-stick with equal atom and bond radii.
#[must_use]
pub fn licorice() -> ParamTable {
    ball_and_stick().without("aspectRatio")
}

/// Bonds as lines.
#[must_use]
pub fn line() -> ParamTable {
    structure().extend(
        ParamTable::new()
            .without("radius")
            .without("scale")
            .without("flatShaded")
            .without("side")
            .without("wireframe")
            .without("roughness")
            .without("metalness"),
    )
}

/// Molecular surface.
#[must_use]
pub fn surface() -> ParamTable {
    structure()
        .extend(
            ParamTable::new()
                .with(
                    "surfaceType",
                    ParamSpec::new(
                        ParamKind::Select(SURFACE_TYPES),
                        Effect::Rebuild,
                        "ms",
                    ),
                )
                .with("probeRadius", ParamSpec::float(Effect::Rebuild, 1.4))
                .with("smooth", ParamSpec::integer(Effect::Rebuild, 2))
                .with("scaleFactor", ParamSpec::float(Effect::Rebuild, 2.0))
                .with("cutoff", ParamSpec::float(Effect::Rebuild, 0.0))
                .with("background", ParamSpec::boolean(Effect::Rebuild, false))
                .with("opaqueBack", ParamSpec::boolean(BUFFER, true))
                .with(
                    "lowResolution",
                    ParamSpec::boolean(Effect::Rebuild, false),
                )
                .with(
                    "filterSele",
                    ParamSpec::new(
                        ParamKind::Text,
                        Effect::Recompute {
                            channel: Channel::Index,
                            needs_impostor: false,
                        },
                        "",
                    ),
                )
                .without("radius")
                .without("scale"),
        )
        .with_default("colorScheme", "uniform")
        .with_default("colorValue", 0x00DD_DDDD_u32)
}
