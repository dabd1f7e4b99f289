//! chart-spline: numeric core of interpolated chart series.
//!
//! `core` holds the pure components: value extraction, empty-point
//! resolution, the incremental point store, sorted projection, spline
//! control-point computation and segment synchronization. `api` composes them
//! into [`SeriesEngine`], which consumes data-source change notifications and
//! keeps a renderable segment collection up to date.

pub mod api;
pub mod core;
pub mod error;
pub mod telemetry;

pub use api::{ChangeOutcome, SeriesBindings, SeriesConfig, SeriesEngine, SourceChange};
pub use error::{ChartError, ChartResult};
