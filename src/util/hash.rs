//! Change-detection fingerprints for cached geometry.

use std::hash::{Hash, Hasher};

use glam::Vec3;
use rustc_hash::FxHasher;

use crate::params::{ParamSet, ParamValue};

/// Hash a single [`Vec3`] by converting each component to bits.
pub fn hash_vec3(v: Vec3, hasher: &mut impl Hasher) {
    for c in v.to_array() {
        c.to_bits().hash(hasher);
    }
}

/// Hash a coordinate list by its length and a handful of sampled points
/// (first, quartiles, last).
///
/// Cheap enough to run every build; misses edits that leave every sampled
/// point in place.
pub fn hash_positions_summary(positions: &[Vec3], hasher: &mut impl Hasher) {
    let n = positions.len();
    n.hash(hasher);
    if n == 0 {
        return;
    }
    let mut last = usize::MAX;
    for i in [0, n / 4, n / 2, 3 * n / 4, n - 1] {
        if i != last {
            hash_vec3(positions[i], hasher);
            last = i;
        }
    }
}

/// Hash one parameter value. Floats hash by bit pattern.
pub fn hash_param(value: &ParamValue, hasher: &mut impl Hasher) {
    std::mem::discriminant(value).hash(hasher);
    match value {
        ParamValue::Bool(b) => b.hash(hasher),
        ParamValue::Int(i) => i.hash(hasher),
        ParamValue::Float(f) => f.to_bits().hash(hasher),
        ParamValue::Text(s) => s.hash(hasher),
    }
}

/// Hash the named parameters of a snapshot. Missing names hash as absent,
/// so adding a value changes the digest.
pub fn hash_params(params: &ParamSet, names: &[&str], hasher: &mut impl Hasher) {
    for name in names {
        name.hash(hasher);
        match params.get(name) {
            Some(value) => {
                true.hash(hasher);
                hash_param(value, hasher);
            }
            None => false.hash(hasher),
        }
    }
}

/// Fresh hasher for fingerprints. Digests are only compared within one
/// process.
#[must_use]
pub fn fingerprint_hasher() -> FxHasher {
    FxHasher::default()
}
