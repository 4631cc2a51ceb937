use std::collections::BTreeMap;

use super::{Channel, ParamSet, ParamValue};

/// Allowed value kind of a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    /// Integer value.
    Integer,
    /// Floating point value.
    Float,
    /// Boolean flag.
    Boolean,
    /// Packed `0xRRGGBB` color.
    Color,
    /// Free text.
    Text,
    /// One of a fixed list of options.
    Select(&'static [&'static str]),
    /// A radius type name (`"vdw"`, `"covalent"`, ...) or an explicit size.
    Radius,
}

impl ParamKind {
    /// Validate and normalize a (coerced) value for this kind.
    #[must_use]
    pub fn accept(&self, value: ParamValue) -> Option<ParamValue> {
        match (self, value) {
            (Self::Integer, v @ ParamValue::Int(_))
            | (Self::Float, v @ ParamValue::Float(_))
            | (Self::Boolean, v @ ParamValue::Bool(_))
            | (Self::Text, v @ ParamValue::Text(_)) => Some(v),
            (Self::Float, ParamValue::Int(i)) => {
                Some(ParamValue::Float(i as f64))
            }
            (Self::Boolean, v @ ParamValue::Text(_)) => {
                v.as_bool().map(ParamValue::Bool)
            }
            (Self::Color, v) => {
                v.as_color().map(|c| ParamValue::Int(i64::from(c)))
            }
            (Self::Select(options), ParamValue::Text(s)) => {
                options.contains(&s.as_str()).then_some(ParamValue::Text(s))
            }
            (Self::Radius, ParamValue::Text(s)) => match s.trim().parse() {
                Ok(size) => Some(ParamValue::Float(size)),
                Err(_) => Some(ParamValue::Text(s)),
            },
            (Self::Radius, ParamValue::Int(i)) => {
                Some(ParamValue::Float(i as f64))
            }
            (Self::Radius, v @ ParamValue::Float(_)) => Some(v),
            _ => None,
        }
    }
}

/// Numeric coercion applied to incoming values before comparison with the
/// previous value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Coercion {
    /// Keep the value as given.
    #[default]
    None,
    /// Truncate to an integer (`parseInt` semantics).
    Int,
    /// Parse as a float.
    Float,
}

impl Coercion {
    fn apply(self, value: &ParamValue) -> Option<ParamValue> {
        match self {
            Self::None => Some(value.clone()),
            Self::Int => value.as_i64().map(ParamValue::Int),
            Self::Float => value.as_f64().map(ParamValue::Float),
        }
    }
}

/// What changing a parameter requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Metadata only; stored but nothing is refreshed.
    None,
    /// Pushed straight into the existing buffers' parameters, optionally
    /// under a different buffer key.
    Buffer {
        /// Buffer-side key when it differs from the parameter name.
        rename: Option<&'static str>,
    },
    /// Marks a data channel stale; the adapter regenerates it in place.
    Recompute {
        /// The stale channel.
        channel: Channel,
        /// The in-place refresh only works for impostor geometry; without
        /// impostors the change escalates to a rebuild.
        needs_impostor: bool,
    },
    /// Discards and recreates all geometry.
    Rebuild,
    /// Geometry detail that only matters for mesh geometry: skipped when
    /// impostors are active, a rebuild otherwise.
    RebuildUnlessImpostor,
}

/// The refresh path an effect resolves to under the current capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPath {
    /// Nothing to refresh.
    None,
    /// Push to buffers under the given key.
    Buffer(&'static str),
    /// Regenerate the channel in place.
    Recompute(Channel),
    /// Full rebuild.
    Rebuild,
}

impl Effect {
    /// Resolve against the impostor capability. The flag reports whether
    /// the path differs from the effect's nominal class.
    #[must_use]
    pub fn resolve(
        self,
        name: &'static str,
        impostor_active: bool,
    ) -> (RefreshPath, bool) {
        match self {
            Self::None => (RefreshPath::None, false),
            Self::Buffer { rename } => {
                (RefreshPath::Buffer(rename.unwrap_or(name)), false)
            }
            Self::Recompute {
                channel,
                needs_impostor,
            } => {
                if needs_impostor && !impostor_active {
                    (RefreshPath::Rebuild, true)
                } else {
                    (RefreshPath::Recompute(channel), false)
                }
            }
            Self::Rebuild => (RefreshPath::Rebuild, false),
            Self::RebuildUnlessImpostor => {
                if impostor_active {
                    (RefreshPath::None, true)
                } else {
                    (RefreshPath::Rebuild, false)
                }
            }
        }
    }
}

/// Immutable metadata for one settable parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    /// Allowed value kind.
    pub kind: ParamKind,
    /// Coercion applied before comparison.
    pub coerce: Coercion,
    /// What a change requires.
    pub effect: Effect,
    /// Initial value.
    pub default: ParamValue,
}

impl ParamSpec {
    /// Spec with no coercion.
    #[must_use]
    pub fn new(
        kind: ParamKind,
        effect: Effect,
        default: impl Into<ParamValue>,
    ) -> Self {
        Self {
            kind,
            coerce: Coercion::None,
            effect,
            default: default.into(),
        }
    }

    /// Integer parameter (truncating coercion).
    #[must_use]
    pub fn integer(effect: Effect, default: i64) -> Self {
        Self {
            kind: ParamKind::Integer,
            coerce: Coercion::Int,
            effect,
            default: ParamValue::Int(default),
        }
    }

    /// Float parameter (parsing coercion).
    #[must_use]
    pub fn float(effect: Effect, default: f64) -> Self {
        Self {
            kind: ParamKind::Float,
            coerce: Coercion::Float,
            effect,
            default: ParamValue::Float(default),
        }
    }

    /// Boolean parameter.
    #[must_use]
    pub fn boolean(effect: Effect, default: bool) -> Self {
        Self::new(ParamKind::Boolean, effect, default)
    }

    /// Coerce and validate an incoming value.
    #[must_use]
    pub fn coerce(&self, value: &ParamValue) -> Option<ParamValue> {
        self.coerce
            .apply(value)
            .and_then(|v| self.kind.accept(v))
    }
}

/// A slot in a composed [`ParamTable`].
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// A settable parameter.
    Spec(ParamSpec),
    /// An inherited parameter that this style explicitly does not support.
    Removed,
}

/// Outcome of classifying one parameter change.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// The coerced value.
    pub value: ParamValue,
    /// The effect class from the table.
    pub effect: Effect,
    /// The path actually required under the current capabilities.
    pub path: RefreshPath,
    /// Whether the capabilities changed the path away from the nominal
    /// effect class.
    pub adjusted: bool,
}

/// Per-style declarative parameter table.
///
/// Tables are composed at construction time from a base table plus
/// style-specific overrides. Overrides that drop an inherited parameter
/// leave an [`Entry::Removed`] marker so the composed table states
/// explicitly what the style does not support.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamTable {
    entries: BTreeMap<&'static str, Entry>,
}

impl ParamTable {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a parameter.
    #[must_use]
    pub fn with(mut self, name: &'static str, spec: ParamSpec) -> Self {
        drop(self.entries.insert(name, Entry::Spec(spec)));
        self
    }

    /// Mark a parameter as removed.
    #[must_use]
    pub fn without(mut self, name: &'static str) -> Self {
        drop(self.entries.insert(name, Entry::Removed));
        self
    }

    /// Change the default of an existing parameter; no-op when absent.
    #[must_use]
    pub fn with_default(
        mut self,
        name: &'static str,
        default: impl Into<ParamValue>,
    ) -> Self {
        if let Some(Entry::Spec(spec)) = self.entries.get_mut(name) {
            spec.default = default.into();
        }
        self
    }

    /// Compose `overrides` on top of `self`: override entries (including
    /// removal markers) win.
    #[must_use]
    pub fn extend(mut self, overrides: Self) -> Self {
        self.entries.extend(overrides.entries);
        self
    }

    /// Active spec by name (`None` for unknown or removed parameters).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        match self.entries.get(name) {
            Some(Entry::Spec(spec)) => Some(spec),
            _ => None,
        }
    }

    /// Name with `'static` lifetime and active spec.
    #[must_use]
    pub fn get_key_value(
        &self,
        name: &str,
    ) -> Option<(&'static str, &ParamSpec)> {
        match self.entries.get_key_value(name) {
            Some((key, Entry::Spec(spec))) => Some((*key, spec)),
            _ => None,
        }
    }

    /// Whether the table carries an explicit removal marker for `name`.
    #[must_use]
    pub fn is_removed(&self, name: &str) -> bool {
        matches!(self.entries.get(name), Some(Entry::Removed))
    }

    /// Active parameters in name order.
    pub fn specs(&self) -> impl Iterator<Item = (&'static str, &ParamSpec)> {
        self.entries.iter().filter_map(|(name, entry)| match entry {
            Entry::Spec(spec) => Some((*name, spec)),
            Entry::Removed => None,
        })
    }

    /// Number of active parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs().count()
    }

    /// Whether the table has no active parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Defaults of all active parameters.
    #[must_use]
    pub fn defaults(&self) -> ParamSet {
        self.specs()
            .map(|(name, spec)| (name, spec.default.clone()))
            .collect()
    }

    /// Buffer-mutable values of `live`, keyed by their buffer-side names.
    #[must_use]
    pub fn buffer_params(&self, live: &ParamSet) -> ParamSet {
        self.specs()
            .filter_map(|(name, spec)| match spec.effect {
                Effect::Buffer { rename } => live
                    .get(name)
                    .map(|v| (rename.unwrap_or(name), v.clone())),
                _ => None,
            })
            .collect()
    }

    /// Coerce every known entry of `values` into `live` without classifying
    /// effects. Returns the names that were accepted.
    pub fn assign(
        &self,
        live: &mut ParamSet,
        values: &ParamSet,
    ) -> Vec<&'static str> {
        let mut accepted = Vec::new();
        for (name, value) in values {
            if let Some((key, spec)) = self.get_key_value(name) {
                if let Some(v) = spec.coerce(value) {
                    drop(live.insert(key, v));
                    accepted.push(key);
                }
            }
        }
        accepted
    }

    /// Classify a change of `name` from `previous` to `value`.
    ///
    /// Returns `None` when the parameter is unknown or removed, the value
    /// does not coerce to the parameter's kind, or the coerced value equals
    /// the previous one.
    #[must_use]
    pub fn classify(
        &self,
        name: &str,
        value: &ParamValue,
        previous: Option<&ParamValue>,
        impostor_active: bool,
    ) -> Option<Classification> {
        let (key, spec) = self.get_key_value(name)?;
        let value = spec.coerce(value)?;
        if previous == Some(&value) {
            return None;
        }
        let (path, adjusted) = spec.effect.resolve(key, impostor_active);
        Some(Classification {
            value,
            effect: spec.effect,
            path,
            adjusted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ParamTable {
        ParamTable::new()
            .with("opacity", ParamSpec::float(Effect::Buffer { rename: None }, 1.0))
            .with("sphereDetail", ParamSpec::integer(Effect::RebuildUnlessImpostor, 1))
            .with(
                "scale",
                ParamSpec::float(
                    Effect::Recompute {
                        channel: Channel::Radius,
                        needs_impostor: true,
                    },
                    1.0,
                ),
            )
            .with("wireframe", ParamSpec::boolean(Effect::Buffer { rename: None }, false))
    }

    #[test]
    fn unchanged_value_is_a_no_op() {
        let t = table();
        let prev = ParamValue::Float(1.0);
        assert!(t.classify("scale", &1.0.into(), Some(&prev), true).is_none());
        // Integer input coerces to the same float.
        assert!(t.classify("scale", &1.into(), Some(&prev), true).is_none());
    }

    #[test]
    fn integer_coercion_truncates_before_compare() {
        let t = table();
        let prev = ParamValue::Int(2);
        assert!(t
            .classify("sphereDetail", &2.7.into(), Some(&prev), false)
            .is_none());
        let c = t
            .classify("sphereDetail", &"3".into(), Some(&prev), false)
            .unwrap();
        assert_eq!(c.value, ParamValue::Int(3));
        assert_eq!(c.path, RefreshPath::Rebuild);
    }

    #[test]
    fn impostor_capability_adjusts_paths() {
        let t = table();
        let prev = ParamValue::Int(1);
        let c = t.classify("sphereDetail", &3.into(), Some(&prev), true).unwrap();
        assert_eq!(c.path, RefreshPath::None);
        assert!(c.adjusted);

        let prev = ParamValue::Float(1.0);
        let c = t.classify("scale", &1.5.into(), Some(&prev), true).unwrap();
        assert_eq!(c.path, RefreshPath::Recompute(Channel::Radius));
        let c = t.classify("scale", &1.5.into(), Some(&prev), false).unwrap();
        assert_eq!(c.path, RefreshPath::Rebuild);
        assert!(c.adjusted);
    }

    #[test]
    fn unknown_removed_and_invalid_are_ignored() {
        let t = table().without("wireframe");
        assert!(t.classify("nope", &1.into(), None, true).is_none());
        assert!(t.classify("wireframe", &true.into(), None, true).is_none());
        assert!(t.is_removed("wireframe"));
        assert!(t.classify("opacity", &true.into(), None, true).is_none());
    }

    #[test]
    fn composition_keeps_removal_markers() {
        let base = table();
        let composed = base
            .clone()
            .extend(ParamTable::new().without("opacity"))
            .with_default("scale", 0.7);
        assert!(composed.get("opacity").is_none());
        assert!(composed.is_removed("opacity"));
        assert_eq!(composed.defaults().f64("scale"), Some(0.7));
        assert_eq!(composed.len(), base.len() - 1);
    }

    #[test]
    fn buffer_params_follow_renames() {
        let t = table().with(
            "opaqueBack",
            ParamSpec::boolean(
                Effect::Buffer {
                    rename: Some("backOpaque"),
                },
                true,
            ),
        );
        let mut live = t.defaults();
        let accepted = t.assign(
            &mut live,
            &ParamSet::new().with("opacity", "0.25").with("nope", 1),
        );
        assert_eq!(accepted, vec!["opacity"]);
        let buffer = t.buffer_params(&live);
        assert_eq!(buffer.f64("opacity"), Some(0.25));
        assert!(buffer.flag("backOpaque"));
        assert!(!buffer.contains("opaqueBack"));
        assert!(!buffer.contains("scale"));
    }

    #[test]
    fn select_and_radius_kinds() {
        let side = ParamSpec::new(
            ParamKind::Select(&["front", "back", "double"]),
            Effect::Buffer { rename: None },
            "double",
        );
        assert_eq!(side.coerce(&"front".into()), Some("front".into()));
        assert_eq!(side.coerce(&"left".into()), None);

        let radius = ParamSpec::new(ParamKind::Radius, Effect::None, "vdw");
        assert_eq!(radius.coerce(&"0.5".into()), Some(ParamValue::Float(0.5)));
        assert_eq!(radius.coerce(&2.into()), Some(ParamValue::Float(2.0)));
        assert_eq!(radius.coerce(&"covalent".into()), Some("covalent".into()));
    }
}
