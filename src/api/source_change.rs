use serde::{Deserialize, Serialize};

/// Change notification raised by a series' data source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceChange<R> {
    Add { index: usize, item: R },
    Replace { index: usize, item: R },
    Remove { index: usize },
    /// The source was replaced wholesale; triggers a full re-extraction.
    Reset { records: Vec<R> },
}

/// What applying one [`SourceChange`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChangeOutcome {
    /// A replacement kept the point's X; hosts may skip redundant refreshes.
    pub repeat_point: bool,
    /// Curve and segments were recomputed now rather than deferred.
    pub recomputed: bool,
}
