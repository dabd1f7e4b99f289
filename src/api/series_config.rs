use serde::{Deserialize, Serialize};

use crate::core::{EmptyPointPolicy, SeriesKind, SortSpec, SplineMode, TangentSpace};
use crate::error::{ChartError, ChartResult};

/// Serializable series setup read at (re)extraction and recompute time.
///
/// Bindings are configured separately through [`super::SeriesBindings`]
/// since extractors are code, not data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesConfig {
    #[serde(default)]
    pub kind: SeriesKind,
    #[serde(default)]
    pub spline_mode: SplineMode,
    /// `None` leaves empty points as NaN.
    #[serde(default)]
    pub empty_point_policy: Option<EmptyPointPolicy>,
    /// `None` renders the canonical insertion order.
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default)]
    pub tangent_space: TangentSpace,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self::new(SeriesKind::default())
    }
}

impl SeriesConfig {
    #[must_use]
    pub fn new(kind: SeriesKind) -> Self {
        Self {
            kind,
            spline_mode: SplineMode::default(),
            empty_point_policy: None,
            sort: None,
            tangent_space: TangentSpace::default(),
        }
    }

    #[must_use]
    pub fn with_spline_mode(mut self, spline_mode: SplineMode) -> Self {
        self.spline_mode = spline_mode;
        self
    }

    #[must_use]
    pub fn with_empty_point_policy(mut self, policy: EmptyPointPolicy) -> Self {
        self.empty_point_policy = Some(policy);
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    #[must_use]
    pub fn with_tangent_space(mut self, tangent_space: TangentSpace) -> Self {
        self.tangent_space = tangent_space;
        self
    }

    /// Number of Y channels bindings must provide for this config.
    #[must_use]
    pub fn y_channel_count(self) -> usize {
        self.kind.capabilities().y_channel_count
    }

    pub fn validate(self) -> ChartResult<Self> {
        if let Some(sort) = self.sort {
            sort.validate(self.y_channel_count())?;
        }
        if let TangentSpace::Logarithmic { base } = self.tangent_space {
            if !base.is_finite() || base <= 0.0 || base == 1.0 {
                return Err(ChartError::InvalidConfig(format!(
                    "logarithmic tangent space needs a positive base other than 1, got {base}"
                )));
            }
        }
        Ok(self)
    }

    pub fn to_json_pretty(self) -> ChartResult<String> {
        serde_json::to_string_pretty(&self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize config: {e}")))
    }

    /// Parses and validates a config.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse config: {e}")))?;
        config.validate()
    }
}
