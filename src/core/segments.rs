use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::spline::BezierControls;
use crate::core::types::ChartPoint;

/// Straight span between two adjacent points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSegment<I> {
    pub start: ChartPoint,
    pub end: ChartPoint,
    /// Item behind `start`.
    pub source_item: I,
}

/// Cubic Bézier span between two adjacent points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSegment<I> {
    pub start: ChartPoint,
    pub control1: ChartPoint,
    pub control2: ChartPoint,
    pub end: ChartPoint,
    /// Item behind `start`.
    pub source_item: I,
}

impl<I> CurveSegment<I> {
    #[must_use]
    pub fn new(start: ChartPoint, end: ChartPoint, controls: BezierControls, source_item: I) -> Self {
        Self {
            start,
            control1: controls.control1,
            control2: controls.control2,
            end,
            source_item,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BubbleSegment<I> {
    pub center: ChartPoint,
    pub size: f64,
    pub source_item: I,
}

/// Vertical span of one column at `x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSegment<I> {
    pub x: f64,
    pub low: f64,
    pub high: f64,
    pub source_item: I,
}

/// Renderable geometry of one series segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SeriesSegment<I> {
    Line(LineSegment<I>),
    Curve(CurveSegment<I>),
    Bubble(BubbleSegment<I>),
    Column(ColumnSegment<I>),
}

impl<I> SeriesSegment<I> {
    #[must_use]
    pub fn source_item(&self) -> &I {
        match self {
            Self::Line(segment) => &segment.source_item,
            Self::Curve(segment) => &segment.source_item,
            Self::Bubble(segment) => &segment.source_item,
            Self::Column(segment) => &segment.source_item,
        }
    }

    /// Endpoints of pairwise segments, `None` for per-point geometry.
    #[must_use]
    pub fn endpoints(&self) -> Option<(ChartPoint, ChartPoint)> {
        match self {
            Self::Line(segment) => Some((segment.start, segment.end)),
            Self::Curve(segment) => Some((segment.start, segment.end)),
            Self::Bubble(_) | Self::Column(_) => None,
        }
    }
}

/// Stable identity of a segment slot, kept across in-place updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSlot<S> {
    id: SegmentId,
    segment: S,
}

impl<S> SegmentSlot<S> {
    #[must_use]
    pub fn id(&self) -> SegmentId {
        self.id
    }

    #[must_use]
    pub fn segment(&self) -> &S {
        &self.segment
    }
}

/// Counts of what one synchronization pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub updated: usize,
    pub created: usize,
    pub removed: usize,
}

/// Ordered segment collection patched in place against a new point count.
///
/// Slot `i` always holds the segment starting at point `i`. Slots that
/// survive a sync keep their [`SegmentId`]; only appended slots get new ones.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentCollection<S> {
    slots: Vec<SegmentSlot<S>>,
    next_id: u64,
}

impl<S> Default for SegmentCollection<S> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            next_id: 0,
        }
    }
}

impl<S> SegmentCollection<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SegmentSlot<S>> {
        self.slots.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SegmentSlot<S>> {
        self.slots.iter()
    }

    pub fn segments(&self) -> impl Iterator<Item = &S> {
        self.slots.iter().map(|slot| &slot.segment)
    }

    #[must_use]
    pub fn ids(&self) -> Vec<SegmentId> {
        self.slots.iter().map(|slot| slot.id).collect()
    }

    /// Syncs to `max(0, point_count - 1)` segments spanning adjacent points.
    pub fn sync(&mut self, point_count: usize, compute: impl FnMut(usize) -> S) -> SyncReport {
        self.sync_to(point_count.saturating_sub(1), compute)
    }

    /// Syncs to exactly `segment_count` segments.
    ///
    /// Existing slots below the count are overwritten in place, missing slots
    /// are appended and surplus trailing slots are dropped.
    pub fn sync_to(
        &mut self,
        segment_count: usize,
        mut compute: impl FnMut(usize) -> S,
    ) -> SyncReport {
        let existing = self.slots.len();
        let removed = existing.saturating_sub(segment_count);
        self.slots.truncate(segment_count);

        for (index, slot) in self.slots.iter_mut().enumerate() {
            slot.segment = compute(index);
        }
        self.slots.reserve(segment_count - self.slots.len());
        for index in self.slots.len()..segment_count {
            let id = SegmentId(self.next_id);
            self.next_id += 1;
            self.slots.push(SegmentSlot {
                id,
                segment: compute(index),
            });
        }

        let report = SyncReport {
            updated: existing.min(segment_count),
            created: segment_count.saturating_sub(existing),
            removed,
        };
        trace!(
            segment_count,
            updated = report.updated,
            created = report.created,
            removed = report.removed,
            "synced segments"
        );
        report
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
