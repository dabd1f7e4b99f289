mod series_bindings;
mod series_config;
mod series_engine;
mod source_change;

pub use series_bindings::SeriesBindings;
pub use series_config::SeriesConfig;
pub use series_engine::{EngineDiagnostics, SeriesEngine};
pub use source_change::{ChangeOutcome, SourceChange};
