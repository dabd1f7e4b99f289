use std::collections::BTreeSet;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::point_store::{PointSeries, YChannels};
use crate::error::{ChartError, ChartResult};

/// Value a sorted projection orders by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    X,
    Y(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    #[must_use]
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Rejects keys that name a Y channel the series does not have.
    pub fn validate(self, y_channel_count: usize) -> ChartResult<Self> {
        if let SortKey::Y(channel) = self.key {
            if channel >= y_channel_count {
                return Err(ChartError::InvalidConfig(format!(
                    "sort channel {channel} does not exist (series has {y_channel_count})"
                )));
            }
        }
        Ok(self)
    }
}

/// Y channel counts the projector supports.
pub const SUPPORTED_SORT_ARITIES: [usize; 4] = [1, 2, 4, 5];

type Row = (OrderedFloat<f64>, SmallVec<[OrderedFloat<f64>; 5]>);

/// Builds a sorted copy of `series`; the canonical arrays are never touched.
///
/// Rows are stable-sorted by the key and reversed when descending. Items are
/// then re-matched against the sorted rows by value, earliest unused
/// insertion index first.
///
/// # Panics
///
/// Panics when the series carries a Y channel count outside
/// [`SUPPORTED_SORT_ARITIES`].
pub fn project_sorted<I: Clone>(
    series: &PointSeries<I>,
    spec: SortSpec,
) -> ChartResult<PointSeries<I>> {
    let arity = series.y_channel_count();
    assert!(
        SUPPORTED_SORT_ARITIES.contains(&arity),
        "sorting projection does not support {arity} y channels"
    );
    let spec = spec.validate(arity)?;

    let rows: Vec<Row> = (0..series.len())
        .map(|index| {
            let ys = series
                .y_channels()
                .iter()
                .map(|values| OrderedFloat(values[index]))
                .collect();
            (OrderedFloat(series.x_values()[index]), ys)
        })
        .collect();

    let mut sorted = rows.clone();
    match spec.key {
        SortKey::X => sorted.sort_by(|a, b| a.0.cmp(&b.0)),
        SortKey::Y(channel) => sorted.sort_by(|a, b| a.1[channel].cmp(&b.1[channel])),
    }
    if spec.direction == SortDirection::Descending {
        sorted.reverse();
    }

    let mut used = vec![false; rows.len()];
    let mut order = Vec::with_capacity(rows.len());
    for row in &sorted {
        let source = rows
            .iter()
            .enumerate()
            .position(|(index, candidate)| !used[index] && candidate == row)
            .unwrap_or_else(|| unreachable!("sorted row without a source row"));
        used[source] = true;
        order.push(source);
    }

    Ok(permute(series, &order))
}

/// Reorders every parallel array of `series` so that position `i` holds the
/// point previously at `order[i]`.
fn permute<I: Clone>(series: &PointSeries<I>, order: &[usize]) -> PointSeries<I> {
    let mut target_of = vec![0; order.len()];
    for (target, &source) in order.iter().enumerate() {
        target_of[source] = target;
    }

    let is_category = !series.x_labels().is_empty();
    let x_values = if is_category {
        (0..order.len()).map(|position| position as f64).collect()
    } else {
        order.iter().map(|&i| series.x_values()[i]).collect()
    };
    let x_labels = if is_category {
        order.iter().map(|&i| series.x_labels()[i].clone()).collect()
    } else {
        Vec::new()
    };
    let y_values: YChannels = series
        .y_channels()
        .iter()
        .map(|values| order.iter().map(|&i| values[i]).collect())
        .collect();
    let items = order.iter().map(|&i| series.items()[i].clone()).collect();
    let empty_indices = (0..series.y_channel_count())
        .map(|channel| {
            series
                .empty_indices(channel)
                .map(|set| set.iter().map(|&i| target_of[i]).collect())
                .unwrap_or_else(BTreeSet::new)
        })
        .collect();

    PointSeries::from_parts(
        series.is_x_type_decided().then(|| series.x_type()),
        x_values,
        x_labels,
        y_values,
        items,
        empty_indices,
    )
}
