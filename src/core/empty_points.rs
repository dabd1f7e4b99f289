use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Substitution policy for missing (NaN) Y samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EmptyPointPolicy {
    #[default]
    Zero,
    Average,
}

/// Filled values plus the indices that were synthesized.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedEmptyPoints {
    pub filled: Vec<f64>,
    pub synthetic_indices: BTreeSet<usize>,
}

/// Replaces every NaN in `values` according to `policy`.
///
/// Resolution runs strictly left to right: an index sees the already resolved
/// value on its left and the raw value on its right, with an unresolved (NaN)
/// neighbor read as `0`.
#[must_use]
pub fn resolve_empty_points(values: &[f64], policy: EmptyPointPolicy) -> ResolvedEmptyPoints {
    let mut filled = values.to_vec();
    let synthetic_indices = resolve_empty_points_in_place(&mut filled, policy);
    ResolvedEmptyPoints {
        filled,
        synthetic_indices,
    }
}

/// In-place variant of [`resolve_empty_points`]; returns synthesized indices.
pub fn resolve_empty_points_in_place(
    values: &mut [f64],
    policy: EmptyPointPolicy,
) -> BTreeSet<usize> {
    let mut synthetic = BTreeSet::new();
    let len = values.len();
    for index in 0..len {
        if !values[index].is_nan() {
            continue;
        }
        values[index] = match policy {
            EmptyPointPolicy::Zero => 0.0,
            EmptyPointPolicy::Average => {
                let left = index.checked_sub(1).map(|i| values[i]);
                let right = values.get(index + 1).copied();
                match (left, right) {
                    (Some(left), Some(right)) => (or_zero(left) + or_zero(right)) / 2.0,
                    (None, Some(right)) => or_zero(right) / 2.0,
                    (Some(left), None) => or_zero(left) / 2.0,
                    (None, None) => 0.0,
                }
            }
        };
        synthetic.insert(index);
    }
    synthetic
}

fn or_zero(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value }
}
