use std::fmt;

use serde_json::Value;
use smallvec::SmallVec;

use crate::core::{BindingPath, DataTable, TableRow, ValueExtractor};
use crate::error::{ChartError, ChartResult};

/// X and Y extractors of one series, resolved once and reused per record.
pub struct SeriesBindings<R: ?Sized> {
    x: Box<dyn ValueExtractor<R>>,
    ys: Vec<Box<dyn ValueExtractor<R>>>,
}

impl<R: ?Sized> SeriesBindings<R> {
    #[must_use]
    pub fn new(x: impl ValueExtractor<R> + 'static) -> Self {
        Self {
            x: Box::new(x),
            ys: Vec::new(),
        }
    }

    /// Appends the next Y channel.
    #[must_use]
    pub fn with_y(mut self, y: impl ValueExtractor<R> + 'static) -> Self {
        self.ys.push(Box::new(y));
        self
    }

    #[must_use]
    pub fn y_channel_count(&self) -> usize {
        self.ys.len()
    }

    pub(crate) fn x(&self) -> &dyn ValueExtractor<R> {
        self.x.as_ref()
    }

    pub(crate) fn ys(&self) -> SmallVec<[&dyn ValueExtractor<R>; 4]> {
        self.ys.iter().map(|y| y.as_ref()).collect()
    }
}

impl<R: ?Sized> fmt::Debug for SeriesBindings<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeriesBindings")
            .field("y_channel_count", &self.ys.len())
            .finish_non_exhaustive()
    }
}

impl SeriesBindings<Value> {
    /// Compiles JSON binding paths such as `time`, `quote.bid` or `levels[0].price`.
    pub fn from_paths(x: &str, ys: &[&str]) -> ChartResult<Self> {
        let mut bindings = Self::new(compile_path(x)?);
        for y in ys {
            bindings = bindings.with_y(compile_path(y)?);
        }
        Ok(bindings)
    }
}

impl SeriesBindings<TableRow> {
    /// Binds named columns of `table`.
    pub fn from_columns(table: &DataTable, x: &str, ys: &[&str]) -> ChartResult<Self> {
        let column = |name: &str| {
            table.column_extractor(name).ok_or_else(|| {
                ChartError::InvalidConfig(format!("unknown table column `{name}`"))
            })
        };
        let mut bindings = Self::new(column(x)?);
        for y in ys {
            bindings = bindings.with_y(column(*y)?);
        }
        Ok(bindings)
    }
}

fn compile_path(path: &str) -> ChartResult<BindingPath> {
    BindingPath::parse(path)
        .ok_or_else(|| ChartError::InvalidConfig(format!("malformed binding path `{path}`")))
}
