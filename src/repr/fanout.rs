//! Assembly expansion: one logical build fanned out into per-part views.

use glam::Mat4;
use log::trace;

use crate::source::{DataView, Source};

/// Name of the assembly choice that defers to the configured default.
pub const DEFAULT_ASSEMBLY: &str = "default";

/// One part's data view and instance transforms.
#[derive(Debug, Clone, PartialEq)]
pub struct PartView<V> {
    /// Part index within the assembly (0 without expansion).
    pub index: usize,
    /// View restricted to the part.
    pub view: V,
    /// Instance transforms, `None` without expansion.
    pub instances: Option<Vec<Mat4>>,
}

/// Resolve which assembly a build draws.
///
/// `"default"` picks `default_assembly`, or the source's own default when
/// that is empty. The empty name (the asymmetric unit) means no expansion.
#[must_use]
pub fn resolve_assembly<'a, S: Source>(
    source: &'a S,
    assembly: &'a str,
    default_assembly: &'a str,
) -> &'a str {
    if assembly != DEFAULT_ASSEMBLY {
        assembly
    } else if default_assembly.is_empty() {
        source.default_assembly()
    } else {
        default_assembly
    }
}

/// Views to build for `base`, one per non-empty part.
///
/// An empty base view yields nothing. A name with no matching assembly
/// yields the base view alone, untransformed.
#[must_use]
pub fn part_views<S: Source>(
    source: &S,
    base: &S::View,
    assembly: &str,
    default_assembly: &str,
) -> Vec<PartView<S::View>> {
    if base.is_empty() {
        return Vec::new();
    }
    let name = resolve_assembly(source, assembly, default_assembly);
    let Some(assembly) = source.assemblies().get(name) else {
        return vec![PartView {
            index: 0,
            view: base.clone(),
            instances: None,
        }];
    };
    assembly
        .parts
        .iter()
        .enumerate()
        .filter_map(|(index, part)| {
            let view = base.restrict(&part.selection);
            if view.is_empty() {
                trace!("assembly {name} part {index} is empty, skipped");
                return None;
            }
            Some(PartView {
                index,
                view,
                instances: Some(part.matrices.clone()),
            })
        })
        .collect()
}
