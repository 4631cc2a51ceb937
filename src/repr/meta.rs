//! Parameter names handled by the representation itself rather than by
//! the style's table.

use crate::options::{Options, QualityLevel};
use crate::params::{ParamSet, ParamValue};

pub(crate) const VISIBLE: &str = "visible";
pub(crate) const QUALITY: &str = "quality";
pub(crate) const SELE: &str = "sele";
pub(crate) const COLOR: &str = "color";
pub(crate) const DEFAULT_ASSEMBLY_KEY: &str = "defaultAssembly";
pub(crate) const ASSEMBLY_KEY: &str = "assembly";

/// Meta values pulled out of a parameter set.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Meta {
    pub visible: Option<bool>,
    pub quality: Option<String>,
    pub sele: Option<String>,
}

/// Split meta keys off `params` and expand the `color` and `quality`
/// shorthands into concrete table parameters.
///
/// A known scheme name in `color` selects that scheme; any other color
/// value selects the uniform scheme with that color. A recognised quality
/// level overrides the detail parameters it maps to for `style`.
pub(crate) fn split(
    params: &ParamSet,
    style: &str,
    options: &Options,
) -> (ParamSet, Meta) {
    let mut values = params.clone();
    let meta = Meta {
        visible: values.remove(VISIBLE).and_then(|v| v.as_bool()),
        quality: values.remove(QUALITY).map(|v| match v {
            ParamValue::Text(s) => s,
            other => other.to_string(),
        }),
        sele: values.remove(SELE).map(|v| match v {
            ParamValue::Text(s) => s,
            other => other.to_string(),
        }),
    };

    if let Some(color) = values.remove(COLOR) {
        match color.as_str() {
            Some(name) if options.colors.is_scheme(name) => {
                drop(values.insert("colorScheme", name));
            }
            _ => {
                if let Some(packed) = color.as_color() {
                    drop(values.insert("colorScheme", "uniform"));
                    drop(values.insert("colorValue", packed));
                }
            }
        }
    }

    let expanded = meta
        .quality
        .as_deref()
        .and_then(QualityLevel::parse)
        .and_then(|level| options.quality.expand(style, level));
    if let Some(detail) = expanded {
        values.merge(detail);
    }

    (values, meta)
}
