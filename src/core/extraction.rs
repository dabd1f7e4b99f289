use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::core::point_store::PointSeries;
use crate::core::types::XValueType;
use crate::core::values::{DataValue, ValueExtractor};
use crate::error::{ChartError, ChartResult};

/// Reads the X value and every Y value of one record.
///
/// Unresolved bindings read as null X / NaN Y.
pub fn extract_point<R: ?Sized>(
    record: &R,
    x: &dyn ValueExtractor<R>,
    ys: &[&dyn ValueExtractor<R>],
) -> (DataValue, SmallVec<[f64; 4]>) {
    let x_value = x.extract(record).unwrap_or(DataValue::Null);
    let y_values = ys
        .iter()
        .map(|extractor| extractor.extract(record).map_or(f64::NAN, |value| value.to_f64()))
        .collect();
    (x_value, y_values)
}

/// Turns `records` into a point series through the given bindings.
///
/// The X type is decided by the first non-null X. When a binding does not
/// resolve on the record shape the result is an empty series rather than an
/// error, so heterogeneous sources degrade to "nothing plottable". Records
/// with a null X are dropped under a category X and read as NaN otherwise.
///
/// Fails only when no Y binding is given.
pub fn extract_series<R: Clone>(
    records: &[R],
    x: &dyn ValueExtractor<R>,
    ys: &[&dyn ValueExtractor<R>],
) -> ChartResult<PointSeries<R>> {
    if ys.is_empty() {
        return Err(ChartError::InvalidConfig(
            "extraction needs at least one y binding".to_owned(),
        ));
    }
    let mut series = PointSeries::new(ys.len())?;

    let Some(first) = records.first() else {
        return Ok(series);
    };
    let x_resolved = x.extract(first).is_some();
    let unresolved_y = ys.iter().position(|y| y.extract(first).is_none());
    if !x_resolved || unresolved_y.is_some() {
        warn!(
            records = records.len(),
            x_resolved,
            unresolved_y,
            "binding path does not resolve on source records, series left empty"
        );
        return Ok(series);
    }

    let x_type = records
        .iter()
        .filter_map(|record| x.extract(record))
        .find(|value| !value.is_null())
        .map(|value| value.x_value_type());
    if let Some(x_type) = x_type {
        series.decide_x_type(x_type);
    }

    let mut skipped = 0_usize;
    for record in records {
        let (x_value, y_values) = extract_point(record, x, ys);
        if x_value.is_null() && series.x_type() == XValueType::String {
            skipped += 1;
            continue;
        }
        if let Err(err) = series.push(&x_value, &y_values, record.clone()) {
            trace!(error = %err, "skipping record during extraction");
            skipped += 1;
        }
    }

    debug!(
        records = records.len(),
        points = series.len(),
        skipped,
        x_type = ?series.x_type(),
        monotonic = series.is_monotonic_x(),
        "extracted series"
    );
    Ok(series)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::core::values::BindingPath;

    fn path(text: &str) -> BindingPath {
        BindingPath::parse(text).expect("path")
    }

    #[test]
    fn numeric_records_become_parallel_arrays() {
        let records = vec![
            json!({"x": 1, "y": 10}),
            json!({"x": 2, "y": 20}),
            json!({"x": 3, "y": 15}),
        ];
        let (x, y) = (path("x"), path("y"));
        let series = extract_series(&records, &x, &[&y]).expect("extract");
        assert_eq!(series.x_values(), &[1.0, 2.0, 3.0]);
        assert_eq!(series.y_values(0).unwrap(), &[10.0, 20.0, 15.0]);
        assert_eq!(series.items(), records.as_slice());
        assert!(series.is_monotonic_x());
    }

    #[test]
    fn unresolved_path_degrades_to_empty_series() {
        let records = vec![json!({"x": 1, "value": 10})];
        let (x, y) = (path("x"), path("y"));
        let series = extract_series(&records, &x, &[&y]).expect("extract");
        assert!(series.is_empty());
    }

    #[test]
    fn null_category_x_drops_only_that_record() {
        let records = vec![
            json!({"x": null, "y": 1}),
            json!({"x": "a", "y": 2}),
            json!({"x": "b", "y": "oops"}),
        ];
        let (x, y) = (path("x"), path("y"));
        let series = extract_series(&records, &x, &[&y]).expect("extract");
        assert_eq!(series.x_type(), XValueType::String);
        assert_eq!(series.x_labels(), &["a".to_owned(), "b".to_owned()]);
        assert!(series.y_values(0).unwrap()[1].is_nan());
    }

    #[test]
    fn null_numeric_x_reads_as_nan() {
        let records: Vec<Value> = vec![json!({"x": 1, "y": 1}), json!({"x": null, "y": 2})];
        let (x, y) = (path("x"), path("y"));
        let series = extract_series(&records, &x, &[&y]).expect("extract");
        assert_eq!(series.len(), 2);
        assert!(series.x_values()[1].is_nan());
    }

    #[test]
    fn no_y_binding_is_a_config_error() {
        let x = path("x");
        assert!(extract_series(&[json!({"x": 1})], &x, &[]).is_err());
    }
}
