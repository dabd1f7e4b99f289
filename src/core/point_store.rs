use std::cmp::Ordering;
use std::collections::BTreeSet;

use smallvec::{SmallVec, smallvec};
use tracing::trace;

use crate::core::empty_points::{EmptyPointPolicy, resolve_empty_points_in_place};
use crate::core::types::{ChartPoint, XValueType};
use crate::core::values::DataValue;
use crate::error::{ChartError, ChartResult};

/// Per-channel Y arrays. Most series carry one channel.
pub type YChannels = SmallVec<[Vec<f64>; 2]>;

/// Outcome of an in-place point replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaceOutcome {
    /// The new X equals the replaced X.
    pub repeat_point: bool,
}

/// Canonical, insertion-ordered data of one series.
///
/// `x_values`, `items` and every Y channel are index-aligned after each
/// completed mutation; a mismatch is an internal consistency failure and
/// panics.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSeries<I> {
    x_type: Option<XValueType>,
    x_values: Vec<f64>,
    x_labels: Vec<String>,
    y_values: YChannels,
    items: Vec<I>,
    is_monotonic_x: bool,
    empty_indices: SmallVec<[BTreeSet<usize>; 2]>,
}

impl<I> PointSeries<I> {
    /// Creates an empty series with `y_channel_count` Y channels.
    pub fn new(y_channel_count: usize) -> ChartResult<Self> {
        if y_channel_count == 0 {
            return Err(ChartError::InvalidConfig(
                "series needs at least one y channel".to_owned(),
            ));
        }
        Ok(Self {
            x_type: None,
            x_values: Vec::new(),
            x_labels: Vec::new(),
            y_values: smallvec![Vec::new(); y_channel_count],
            items: Vec::new(),
            is_monotonic_x: true,
            empty_indices: smallvec![BTreeSet::new(); y_channel_count],
        })
    }

    pub(crate) fn from_parts(
        x_type: Option<XValueType>,
        x_values: Vec<f64>,
        x_labels: Vec<String>,
        y_values: YChannels,
        items: Vec<I>,
        empty_indices: SmallVec<[BTreeSet<usize>; 2]>,
    ) -> Self {
        let mut series = Self {
            x_type,
            x_values,
            x_labels,
            y_values,
            items,
            is_monotonic_x: true,
            empty_indices,
        };
        series.is_monotonic_x = !series.x_type().is_ordered()
            || series
                .x_values
                .windows(2)
                .all(|pair| pair[1].partial_cmp(&pair[0]) != Some(Ordering::Less));
        series.assert_aligned();
        series
    }

    /// Fixes the X type ahead of ingestion; ignored once points exist.
    pub(crate) fn decide_x_type(&mut self, x_type: XValueType) {
        if self.is_empty() {
            self.x_type = Some(x_type);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.x_values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x_values.is_empty()
    }

    /// Active X type; `Double` until the first non-null X decides it.
    #[must_use]
    pub fn x_type(&self) -> XValueType {
        self.x_type.unwrap_or_default()
    }

    #[must_use]
    pub fn is_x_type_decided(&self) -> bool {
        self.x_type.is_some()
    }

    #[must_use]
    pub fn x_values(&self) -> &[f64] {
        &self.x_values
    }

    /// Category labels; empty unless the X type is `String`.
    #[must_use]
    pub fn x_labels(&self) -> &[String] {
        &self.x_labels
    }

    #[must_use]
    pub fn y_channel_count(&self) -> usize {
        self.y_values.len()
    }

    #[must_use]
    pub fn y_values(&self, channel: usize) -> Option<&[f64]> {
        self.y_values.get(channel).map(Vec::as_slice)
    }

    #[must_use]
    pub fn y_channels(&self) -> &[Vec<f64>] {
        &self.y_values
    }

    #[must_use]
    pub fn items(&self) -> &[I] {
        &self.items
    }

    #[must_use]
    pub fn is_monotonic_x(&self) -> bool {
        self.is_monotonic_x
    }

    /// Indices of `channel` whose Y was missing at ingestion.
    #[must_use]
    pub fn empty_indices(&self, channel: usize) -> Option<&BTreeSet<usize>> {
        self.empty_indices.get(channel)
    }

    /// Point `index` against the first Y channel.
    #[must_use]
    pub fn point(&self, index: usize) -> Option<ChartPoint> {
        Some(ChartPoint::new(
            *self.x_values.get(index)?,
            *self.y_values[0].get(index)?,
        ))
    }

    /// Appends a point.
    pub fn push(&mut self, x: &DataValue, ys: &[f64], item: I) -> ChartResult<()> {
        self.insert_at(self.len(), x, ys, item)
    }

    /// Inserts a point at `index`, appending when `index == len()`.
    pub fn insert_at(
        &mut self,
        index: usize,
        x: &DataValue,
        ys: &[f64],
        item: I,
    ) -> ChartResult<()> {
        let len = self.len();
        if index > len {
            return Err(ChartError::IndexOutOfRange { index, len });
        }
        self.check_arity(ys)?;
        let (x_value, label) = self.coerce_x(x)?;

        if self.x_type().is_ordered() && self.breaks_order(index, x_value, index) {
            self.is_monotonic_x = false;
        }

        self.x_values.insert(index, x_value);
        if let Some(label) = label {
            self.x_labels.insert(index, label);
            self.renumber_categories(index);
        }
        for (channel, value) in ys.iter().enumerate() {
            self.y_values[channel].insert(index, *value);
            let shifted: BTreeSet<usize> = self.empty_indices[channel]
                .iter()
                .map(|&i| if i >= index { i + 1 } else { i })
                .collect();
            self.empty_indices[channel] = shifted;
            if value.is_nan() {
                self.empty_indices[channel].insert(index);
            }
        }
        self.items.insert(index, item);

        trace!(index, len = self.len(), monotonic = self.is_monotonic_x, "insert point");
        self.assert_aligned();
        Ok(())
    }

    /// Overwrites the point at `index` in place.
    pub fn replace_at(
        &mut self,
        index: usize,
        x: &DataValue,
        ys: &[f64],
        item: I,
    ) -> ChartResult<ReplaceOutcome> {
        let len = self.len();
        if index >= len {
            return Err(ChartError::IndexOutOfRange { index, len });
        }
        self.check_arity(ys)?;
        let (x_value, label) = self.coerce_x(x)?;

        let repeat_point = match &label {
            Some(label) => self.x_labels[index] == *label,
            None => self.x_values[index].total_cmp(&x_value) == Ordering::Equal,
        };

        if self.x_type().is_ordered() && self.breaks_order(index, x_value, index + 1) {
            self.is_monotonic_x = false;
        }

        match label {
            Some(label) => self.x_labels[index] = label,
            None => self.x_values[index] = x_value,
        }
        for (channel, value) in ys.iter().enumerate() {
            self.y_values[channel][index] = *value;
            if value.is_nan() {
                self.empty_indices[channel].insert(index);
            } else {
                self.empty_indices[channel].remove(&index);
            }
        }
        self.items[index] = item;

        trace!(index, repeat_point, "replace point");
        self.assert_aligned();
        Ok(ReplaceOutcome { repeat_point })
    }

    /// Removes the point at `index`, returning its item.
    pub fn remove_at(&mut self, index: usize) -> ChartResult<I> {
        let len = self.len();
        if index >= len {
            return Err(ChartError::IndexOutOfRange { index, len });
        }

        self.x_values.remove(index);
        if self.x_type() == XValueType::String {
            self.x_labels.remove(index);
            self.renumber_categories(index);
        }
        for channel in 0..self.y_values.len() {
            self.y_values[channel].remove(index);
            let shifted: BTreeSet<usize> = self.empty_indices[channel]
                .iter()
                .filter(|&&i| i != index)
                .map(|&i| if i > index { i - 1 } else { i })
                .collect();
            self.empty_indices[channel] = shifted;
        }
        let item = self.items.remove(index);

        trace!(index, len = self.len(), "remove point");
        self.assert_aligned();
        Ok(item)
    }

    /// Fills missing Y samples of every channel in place.
    ///
    /// Returns how many samples were synthesized by this pass.
    pub fn resolve_empty_points(&mut self, policy: EmptyPointPolicy) -> usize {
        let mut synthesized = 0;
        for (values, empty) in self.y_values.iter_mut().zip(self.empty_indices.iter_mut()) {
            let resolved = resolve_empty_points_in_place(values, policy);
            synthesized += resolved.len();
            empty.extend(resolved);
        }
        synthesized
    }

    /// Drops all points and forgets the decided X type.
    pub fn clear(&mut self) {
        self.x_type = None;
        self.x_values.clear();
        self.x_labels.clear();
        for values in &mut self.y_values {
            values.clear();
        }
        for empty in &mut self.empty_indices {
            empty.clear();
        }
        self.items.clear();
        self.is_monotonic_x = true;
    }

    fn check_arity(&self, ys: &[f64]) -> ChartResult<()> {
        if ys.len() != self.y_values.len() {
            return Err(ChartError::InvalidData(format!(
                "expected {} y values, got {}",
                self.y_values.len(),
                ys.len()
            )));
        }
        Ok(())
    }

    fn coerce_x(&mut self, x: &DataValue) -> ChartResult<(f64, Option<String>)> {
        if self.x_type.is_none() && !x.is_null() {
            let x_type = x.x_value_type();
            self.x_type = Some(x_type);
            if x_type == XValueType::String && !self.x_values.is_empty() {
                // Earlier points arrived with null X while the type was undecided.
                self.x_labels = vec![String::new(); self.x_values.len()];
                self.renumber_categories(0);
            }
        }
        match self.x_type() {
            XValueType::String => {
                let label = x.label().ok_or_else(|| {
                    ChartError::InvalidData("category x value must not be null".to_owned())
                })?;
                Ok((f64::NAN, Some(label)))
            }
            x_type => Ok((x.to_x(x_type), None)),
        }
    }

    /// Whether `x` placed between `previous - 1` and `next` breaks ascending order.
    ///
    /// NaN on either side never breaks order, matching [`Self::from_parts`].
    fn breaks_order(&self, previous: usize, x: f64, next: usize) -> bool {
        let before = previous
            .checked_sub(1)
            .and_then(|i| self.x_values.get(i))
            .is_some_and(|&prev| x < prev);
        let after = self.x_values.get(next).is_some_and(|&next| x > next);
        before || after
    }

    fn renumber_categories(&mut self, from: usize) {
        for (position, value) in self.x_values.iter_mut().enumerate().skip(from) {
            *value = position as f64;
        }
    }

    fn assert_aligned(&self) {
        let len = self.x_values.len();
        let labels_aligned = match self.x_type() {
            XValueType::String => self.x_labels.len() == len,
            _ => self.x_labels.is_empty(),
        };
        assert!(
            labels_aligned
                && self.items.len() == len
                && self.y_values.iter().all(|values| values.len() == len),
            "point series arrays lost alignment: x={len}, items={}, labels={}",
            self.items.len(),
            self.x_labels.len(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(values: &[(f64, f64)]) -> PointSeries<usize> {
        let mut series = PointSeries::new(1).expect("series");
        for (item, (x, y)) in values.iter().enumerate() {
            series.push(&DataValue::Number(*x), &[*y], item).expect("push");
        }
        series
    }

    #[test]
    fn zero_channels_is_a_config_error() {
        assert!(matches!(
            PointSeries::<()>::new(0),
            Err(ChartError::InvalidConfig(_))
        ));
    }

    #[test]
    fn insert_in_the_middle_keeps_arrays_aligned() {
        let mut series = numeric(&[(1.0, 10.0), (3.0, 30.0)]);
        series
            .insert_at(1, &DataValue::Number(2.0), &[20.0], 9)
            .expect("insert");
        assert_eq!(series.x_values(), &[1.0, 2.0, 3.0]);
        assert_eq!(series.y_values(0).unwrap(), &[10.0, 20.0, 30.0]);
        assert_eq!(series.items(), &[0, 9, 1]);
        assert!(series.is_monotonic_x());
    }

    #[test]
    fn out_of_order_insert_clears_monotonic_flag_for_good() {
        let mut series = numeric(&[(1.0, 1.0), (2.0, 2.0)]);
        series.push(&DataValue::Number(0.5), &[3.0], 2).expect("push");
        assert!(!series.is_monotonic_x());
        series.push(&DataValue::Number(10.0), &[4.0], 3).expect("push");
        assert!(!series.is_monotonic_x());
    }

    #[test]
    fn replace_flags_repeat_point_when_x_is_unchanged() {
        let mut series = numeric(&[(1.0, 1.0), (2.0, 2.0)]);
        let same = series
            .replace_at(1, &DataValue::Number(2.0), &[5.0], 7)
            .expect("replace");
        assert!(same.repeat_point);
        let moved = series
            .replace_at(1, &DataValue::Number(2.5), &[5.0], 7)
            .expect("replace");
        assert!(!moved.repeat_point);
        assert_eq!(series.items(), &[0, 7]);
    }

    #[test]
    fn empty_indices_shift_with_inserts_and_removals() {
        let mut series = numeric(&[(0.0, f64::NAN), (1.0, 1.0), (2.0, f64::NAN)]);
        assert_eq!(series.empty_indices(0).unwrap(), &BTreeSet::from([0, 2]));

        series
            .insert_at(0, &DataValue::Number(-1.0), &[4.0], 3)
            .expect("insert");
        assert_eq!(series.empty_indices(0).unwrap(), &BTreeSet::from([1, 3]));

        series.remove_at(1).expect("remove");
        assert_eq!(series.empty_indices(0).unwrap(), &BTreeSet::from([2]));
    }

    #[test]
    fn replacing_a_synthetic_point_keeps_the_given_value() {
        let mut series = numeric(&[(0.0, 2.0), (1.0, f64::NAN), (2.0, 4.0)]);
        assert_eq!(series.resolve_empty_points(EmptyPointPolicy::Average), 1);
        assert_eq!(series.y_values(0).unwrap(), &[2.0, 3.0, 4.0]);

        series
            .replace_at(1, &DataValue::Number(1.0), &[9.0], 1)
            .expect("replace");
        assert!(series.empty_indices(0).unwrap().is_empty());
        assert_eq!(series.y_values(0).unwrap(), &[2.0, 9.0, 4.0]);
    }

    #[test]
    fn category_x_uses_positions_and_keeps_labels() {
        let mut series = PointSeries::new(1).expect("series");
        for (item, label) in ["a", "b", "c"].into_iter().enumerate() {
            series.push(&DataValue::from(label), &[1.0], item).expect("push");
        }
        series.remove_at(0).expect("remove");
        assert_eq!(series.x_type(), XValueType::String);
        assert_eq!(series.x_values(), &[0.0, 1.0]);
        assert_eq!(series.x_labels(), &["b".to_owned(), "c".to_owned()]);
        assert!(series.push(&DataValue::Null, &[1.0], 3).is_err());
    }

    #[test]
    fn nan_x_never_breaks_order_for_inserts_or_rebuilt_series() {
        let inserted = numeric(&[(1.0, 0.0), (f64::NAN, 0.0), (0.5, 0.0)]);
        assert!(inserted.is_monotonic_x());

        let rebuilt = PointSeries::from_parts(
            Some(XValueType::Double),
            inserted.x_values().to_vec(),
            Vec::new(),
            inserted.y_channels().iter().cloned().collect(),
            inserted.items().to_vec(),
            smallvec![BTreeSet::new()],
        );
        assert_eq!(rebuilt.is_monotonic_x(), inserted.is_monotonic_x());

        let descending = numeric(&[(2.0, 0.0), (1.0, 0.0), (f64::NAN, 0.0)]);
        assert!(!descending.is_monotonic_x());
    }

    #[test]
    fn out_of_range_and_arity_errors_leave_store_untouched() {
        let mut series = numeric(&[(0.0, 0.0)]);
        assert_eq!(
            series.remove_at(3),
            Err(ChartError::IndexOutOfRange { index: 3, len: 1 })
        );
        assert!(series.push(&DataValue::Number(1.0), &[1.0, 2.0], 1).is_err());
        assert_eq!(series.len(), 1);
    }
}
