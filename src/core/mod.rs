pub mod empty_points;
pub mod extraction;
pub mod point_store;
pub mod primitives;
pub mod segments;
pub mod sorting;
pub mod spline;
pub mod stacking;
pub mod types;
pub mod values;

pub use empty_points::{
    EmptyPointPolicy, ResolvedEmptyPoints, resolve_empty_points, resolve_empty_points_in_place,
};
pub use extraction::{extract_point, extract_series};
pub use point_store::{PointSeries, ReplaceOutcome, YChannels};
pub use primitives::CalendarPeriod;
pub use segments::{
    BubbleSegment, ColumnSegment, CurveSegment, LineSegment, SegmentCollection, SegmentId,
    SegmentSlot, SeriesSegment, SyncReport,
};
pub use sorting::{SUPPORTED_SORT_ARITIES, SortDirection, SortKey, SortSpec, project_sorted};
pub use spline::{
    BezierControls, CurvatureBoundary, SplineMode, TangentSpace, bezier_from_second_derivatives,
    cardinal_tangents, compute_curve, compute_curve_with, monotonic_derivatives,
    second_derivatives,
};
pub use stacking::{StackSpan, stack_percent};
pub use types::{ChartPoint, SegmentLayout, SeriesCapabilities, SeriesKind, XValueType};
pub use values::{BindingPath, ColumnExtractor, DataTable, DataValue, TableRow, ValueExtractor};
