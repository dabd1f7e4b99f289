use serde::{Deserialize, Serialize};

/// Point in data space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
}

impl ChartPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Semantic type of a series' X values, fixed at first ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum XValueType {
    #[default]
    Double,
    /// Stored as OLE automation days (days since 1899-12-30).
    DateTime,
    /// Stored as milliseconds.
    TimeSpan,
    /// Stored as the point position; labels are kept alongside.
    String,
}

impl XValueType {
    /// Whether X values carry an ordering that the monotonic flag tracks.
    #[must_use]
    pub const fn is_ordered(self) -> bool {
        !matches!(self, Self::String)
    }
}

/// How segments are laid out over the points of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentLayout {
    /// One segment per adjacent point pair (`n - 1` segments).
    Pairwise,
    /// One segment per point.
    PerPoint,
}

/// Capability table consulted by the shared series pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesCapabilities {
    pub y_channel_count: usize,
    pub is_multiple_y_required: bool,
    pub segment_layout: SegmentLayout,
    pub uses_interpolation: bool,
}

/// Closed set of series kinds handled by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SeriesKind {
    #[default]
    Line,
    Spline,
    /// Channels: `[y, size]`.
    Bubble,
    StackedColumn100,
    /// Channels: `[low, high]`.
    RangeColumn,
    /// Channels: `[open, high, low, close]`.
    Candle,
}

impl SeriesKind {
    #[must_use]
    pub const fn capabilities(self) -> SeriesCapabilities {
        match self {
            Self::Line => SeriesCapabilities {
                y_channel_count: 1,
                is_multiple_y_required: false,
                segment_layout: SegmentLayout::Pairwise,
                uses_interpolation: false,
            },
            Self::Spline => SeriesCapabilities {
                y_channel_count: 1,
                is_multiple_y_required: false,
                segment_layout: SegmentLayout::Pairwise,
                uses_interpolation: true,
            },
            Self::Bubble => SeriesCapabilities {
                y_channel_count: 2,
                is_multiple_y_required: true,
                segment_layout: SegmentLayout::PerPoint,
                uses_interpolation: false,
            },
            Self::StackedColumn100 => SeriesCapabilities {
                y_channel_count: 1,
                is_multiple_y_required: false,
                segment_layout: SegmentLayout::PerPoint,
                uses_interpolation: false,
            },
            Self::RangeColumn => SeriesCapabilities {
                y_channel_count: 2,
                is_multiple_y_required: true,
                segment_layout: SegmentLayout::PerPoint,
                uses_interpolation: false,
            },
            Self::Candle => SeriesCapabilities {
                y_channel_count: 4,
                is_multiple_y_required: true,
                segment_layout: SegmentLayout::PerPoint,
                uses_interpolation: false,
            },
        }
    }

    /// Number of segments this kind produces for `point_count` points.
    #[must_use]
    pub const fn segment_count(self, point_count: usize) -> usize {
        match self.capabilities().segment_layout {
            SegmentLayout::Pairwise => point_count.saturating_sub(1),
            SegmentLayout::PerPoint => point_count,
        }
    }
}
