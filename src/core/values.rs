use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::core::primitives::{datetime_to_ole_days, decimal_to_f64, duration_to_millis};
use crate::core::types::XValueType;

/// Loosely typed value pulled out of a source record.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    Null,
    Bool(bool),
    Number(f64),
    Decimal(Decimal),
    Text(String),
    DateTime(DateTime<Utc>),
    Duration(TimeDelta),
}

impl DataValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// X semantic type implied by this value.
    #[must_use]
    pub fn x_value_type(&self) -> XValueType {
        match self {
            Self::Number(_) | Self::Decimal(_) => XValueType::Double,
            Self::DateTime(_) => XValueType::DateTime,
            Self::Duration(_) => XValueType::TimeSpan,
            Self::Null | Self::Bool(_) | Self::Text(_) => XValueType::String,
        }
    }

    /// Numeric reading of the value; `NaN` when it has none.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        match self {
            Self::Number(value) => *value,
            Self::Decimal(value) => decimal_to_f64(*value, "value").unwrap_or(f64::NAN),
            Self::DateTime(time) => datetime_to_ole_days(*time),
            Self::Duration(duration) => duration_to_millis(*duration),
            Self::Bool(flag) => f64::from(u8::from(*flag)),
            Self::Text(text) => text.trim().parse().unwrap_or(f64::NAN),
            Self::Null => f64::NAN,
        }
    }

    /// Reading of the value as an X coordinate of the given type.
    #[must_use]
    pub fn to_x(&self, x_type: XValueType) -> f64 {
        match (x_type, self) {
            (XValueType::DateTime, Self::Text(text)) => text
                .parse::<DateTime<Utc>>()
                .map_or(f64::NAN, datetime_to_ole_days),
            _ => self.to_f64(),
        }
    }

    /// Category label, `None` for null values.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        if self.is_null() {
            None
        } else {
            Some(self.to_string())
        }
    }

    /// Interprets a JSON scalar. RFC 3339 strings become timestamps.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(*flag),
            Value::Number(number) => number.as_f64().map_or(Self::Null, Self::Number),
            Value::String(text) => text
                .parse::<DateTime<Utc>>()
                .map_or_else(|_| Self::Text(text.clone()), Self::DateTime),
            Value::Array(_) | Value::Object(_) => Self::Text(value.to_string()),
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Decimal(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
            Self::DateTime(time) => write!(f, "{}", time.to_rfc3339()),
            Self::Duration(duration) => write!(f, "{duration}"),
        }
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Decimal> for DataValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for DataValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<TimeDelta> for DataValue {
    fn from(value: TimeDelta) -> Self {
        Self::Duration(value)
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Pulls one bound value out of a record.
///
/// `None` means the binding does not resolve on the record's shape (the
/// property is absent), while `Some(DataValue::Null)` is a present but empty
/// value. Extractors are resolved once per binding and reused for every record.
pub trait ValueExtractor<R: ?Sized> {
    fn extract(&self, record: &R) -> Option<DataValue>;
}

impl<R: ?Sized, F> ValueExtractor<R> for F
where
    F: Fn(&R) -> Option<DataValue>,
{
    fn extract(&self, record: &R) -> Option<DataValue> {
        self(record)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Field(String),
    Index(usize),
}

/// Compiled binding path over JSON records.
///
/// Supports simple (`price`), dotted (`order.price`) and array-indexed
/// (`bids[2].price`, `[0]`) forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingPath {
    source: String,
    segments: Vec<PathSegment>,
}

impl BindingPath {
    /// Parses a path, `None` when the path text is malformed.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let mut segments = Vec::new();
        for part in path.split('.') {
            let (field, mut rest) = match part.find('[') {
                Some(open) => part.split_at(open),
                None => (part, ""),
            };
            if !field.is_empty() {
                segments.push(PathSegment::Field(field.trim().to_owned()));
            } else if rest.is_empty() {
                return None;
            }
            while let Some(stripped) = rest.strip_prefix('[') {
                let close = stripped.find(']')?;
                let index = stripped[..close].trim().parse().ok()?;
                segments.push(PathSegment::Index(index));
                rest = &stripped[close + 1..];
            }
            if !rest.is_empty() {
                return None;
            }
        }
        if segments.is_empty() {
            return None;
        }
        Some(Self {
            source: path.to_owned(),
            segments,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn is_complex(&self) -> bool {
        self.segments.len() > 1
    }

    fn resolve<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(record, |current, segment| match segment {
                PathSegment::Field(name) => current.as_object()?.get(name),
                PathSegment::Index(index) => current.as_array()?.get(*index),
            })
    }
}

impl ValueExtractor<Value> for BindingPath {
    fn extract(&self, record: &Value) -> Option<DataValue> {
        self.resolve(record).map(DataValue::from_json)
    }
}

/// Row-oriented table source with named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    columns: IndexMap<String, usize>,
    rows: Vec<TableRow>,
}

/// One row of a [`DataTable`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    pub cells: Vec<DataValue>,
}

impl DataTable {
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(index, name)| (name.into(), index))
            .collect();
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, cells: Vec<DataValue>) {
        self.rows.push(TableRow { cells });
    }

    #[must_use]
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Resolves a column once; `None` when the table has no such column.
    #[must_use]
    pub fn column_extractor(&self, name: &str) -> Option<ColumnExtractor> {
        self.columns
            .get(name)
            .map(|&index| ColumnExtractor { index })
    }
}

/// Extractor reading a fixed column of a [`TableRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnExtractor {
    index: usize,
}

impl ValueExtractor<TableRow> for ColumnExtractor {
    fn extract(&self, record: &TableRow) -> Option<DataValue> {
        record.cells.get(self.index).cloned()
    }
}
