use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::{
    BezierControls, BubbleSegment, ChartPoint, ColumnSegment, CurveSegment, LineSegment,
    PointSeries, SegmentCollection, SegmentLayout, SeriesKind, SeriesSegment, SyncReport,
    compute_curve_with, extract_point, extract_series, project_sorted, stack_percent,
};
use crate::error::{ChartError, ChartResult};

use super::{ChangeOutcome, SeriesBindings, SeriesConfig, SourceChange};

/// Counters exposed for hosts and tests tracking recompute cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineDiagnostics {
    pub recompute_passes: u64,
    pub pending_recompute: bool,
    pub suspend_depth: usize,
    pub point_count: usize,
    pub segment_count: usize,
}

impl EngineDiagnostics {
    pub fn to_json_pretty(self) -> ChartResult<String> {
        serde_json::to_string_pretty(&self).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize diagnostics json: {e}"))
        })
    }
}

/// Data and geometry pipeline of one chart series.
///
/// Source changes flow into the canonical store, then through the optional
/// sorted projection, empty-point resolution and curve computation into the
/// segment collection. The store itself never receives synthesized values. Between [`SeriesEngine::suspend_notifications`] and the
/// matching resume, store mutations are applied immediately while the
/// recompute is deferred to a single pass.
#[derive(Debug)]
pub struct SeriesEngine<R> {
    config: SeriesConfig,
    bindings: SeriesBindings<R>,
    store: PointSeries<R>,
    derived: Option<PointSeries<R>>,
    segments: SegmentCollection<SeriesSegment<R>>,
    suspend_depth: usize,
    pending_recompute: bool,
    recompute_passes: u64,
}

impl<R: Clone> SeriesEngine<R> {
    /// Creates an engine with no points.
    ///
    /// Fails when the config is invalid or the bindings do not provide the Y
    /// channel count the series kind needs.
    pub fn new(config: SeriesConfig, bindings: SeriesBindings<R>) -> ChartResult<Self> {
        let config = config.validate()?;
        check_bindings(config, &bindings)?;
        let store = PointSeries::new(config.y_channel_count())?;
        debug!(kind = ?config.kind, mode = ?config.spline_mode, "create series engine");
        Ok(Self {
            config,
            bindings,
            store,
            derived: None,
            segments: SegmentCollection::new(),
            suspend_depth: 0,
            pending_recompute: false,
            recompute_passes: 0,
        })
    }

    #[must_use]
    pub fn config(&self) -> SeriesConfig {
        self.config
    }

    #[must_use]
    pub fn bindings(&self) -> &SeriesBindings<R> {
        &self.bindings
    }

    /// Canonical insertion-ordered points.
    #[must_use]
    pub fn store(&self) -> &PointSeries<R> {
        &self.store
    }

    /// Points as rendered: the sorted projection with empty points resolved,
    /// or the store itself when neither sorting nor a policy is configured.
    ///
    /// Reflects the last recompute pass.
    #[must_use]
    pub fn effective_series(&self) -> &PointSeries<R> {
        self.derived.as_ref().unwrap_or(&self.store)
    }

    #[must_use]
    pub fn segments(&self) -> &SegmentCollection<SeriesSegment<R>> {
        &self.segments
    }

    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.suspend_depth > 0
    }

    #[must_use]
    pub fn diagnostics(&self) -> EngineDiagnostics {
        EngineDiagnostics {
            recompute_passes: self.recompute_passes,
            pending_recompute: self.pending_recompute,
            suspend_depth: self.suspend_depth,
            point_count: self.store.len(),
            segment_count: self.segments.len(),
        }
    }

    /// Rebuilds the store from `records` and recomputes.
    pub fn reset(&mut self, records: &[R]) -> ChartResult<bool> {
        self.store = extract_series(records, self.bindings.x(), &self.bindings.ys())?;
        debug!(points = self.store.len(), "reset series from source");
        self.request_recompute()
    }

    /// Applies one source change notification to the store.
    pub fn apply_change(&mut self, change: SourceChange<R>) -> ChartResult<ChangeOutcome> {
        let mut repeat_point = false;
        match change {
            SourceChange::Add { index, item } => {
                let (x, ys) = extract_point(&item, self.bindings.x(), &self.bindings.ys());
                self.store.insert_at(index, &x, &ys, item)?;
            }
            SourceChange::Replace { index, item } => {
                let (x, ys) = extract_point(&item, self.bindings.x(), &self.bindings.ys());
                repeat_point = self.store.replace_at(index, &x, &ys, item)?.repeat_point;
            }
            SourceChange::Remove { index } => {
                self.store.remove_at(index)?;
            }
            SourceChange::Reset { records } => {
                let recomputed = self.reset(&records)?;
                return Ok(ChangeOutcome {
                    repeat_point,
                    recomputed,
                });
            }
        }
        let recomputed = self.request_recompute()?;
        Ok(ChangeOutcome {
            repeat_point,
            recomputed,
        })
    }

    /// Defers recomputation until the matching [`Self::resume_notifications`].
    ///
    /// Suspensions nest.
    pub fn suspend_notifications(&mut self) {
        self.suspend_depth += 1;
        debug!(depth = self.suspend_depth, "suspend series notifications");
    }

    /// Ends one suspension; the outermost resume runs the deferred recompute.
    ///
    /// Returns whether a recompute ran.
    pub fn resume_notifications(&mut self) -> ChartResult<bool> {
        let Some(depth) = self.suspend_depth.checked_sub(1) else {
            warn!("resume_notifications called without a matching suspend");
            return Ok(false);
        };
        self.suspend_depth = depth;
        debug!(depth, pending = self.pending_recompute, "resume series notifications");
        if depth == 0 && self.pending_recompute {
            self.recompute()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Swaps the config, keeping the current bindings.
    pub fn set_config(&mut self, config: SeriesConfig) -> ChartResult<bool> {
        let config = config.validate()?;
        check_bindings(config, &self.bindings)?;
        self.config = config;
        self.request_recompute()
    }

    /// Swaps the bindings and re-extracts the current items through them.
    pub fn set_bindings(&mut self, bindings: SeriesBindings<R>) -> ChartResult<bool> {
        self.reconfigure(self.config, bindings)
    }

    /// Swaps config and bindings together, as needed when the kind changes
    /// its Y channel count.
    pub fn reconfigure(
        &mut self,
        config: SeriesConfig,
        bindings: SeriesBindings<R>,
    ) -> ChartResult<bool> {
        let config = config.validate()?;
        check_bindings(config, &bindings)?;
        let records = self.store.items().to_vec();
        self.store = extract_series(&records, bindings.x(), &bindings.ys())?;
        self.config = config;
        self.bindings = bindings;
        debug!(points = self.store.len(), kind = ?config.kind, "rebound series");
        self.request_recompute()
    }

    /// Drops every point, item reference and segment.
    pub fn detach(&mut self) {
        self.store.clear();
        self.derived = None;
        self.segments.clear();
        self.pending_recompute = false;
        debug!("detached series");
    }

    /// Runs one full pass: projection, empty points, curve and segment sync.
    pub fn recompute(&mut self) -> ChartResult<SyncReport> {
        let mut derived = match self.config.sort {
            Some(spec) => Some(project_sorted(&self.store, spec)?),
            None => None,
        };
        // Synthesized values live only in the derived series; the store keeps raw NaNs.
        if let Some(policy) = self.config.empty_point_policy {
            let series = derived.get_or_insert_with(|| self.store.clone());
            let synthesized = series.resolve_empty_points(policy);
            if synthesized > 0 {
                trace!(synthesized, ?policy, "resolved empty points");
            }
        }
        self.derived = derived;

        let series = self.derived.as_ref().unwrap_or(&self.store);
        let points = series.len();
        let report = sync_segments(&mut self.segments, series, self.config);
        self.pending_recompute = false;
        self.recompute_passes += 1;
        debug!(
            pass = self.recompute_passes,
            points,
            segments = self.segments.len(),
            created = report.created,
            removed = report.removed,
            "recomputed series geometry"
        );
        Ok(report)
    }

    fn request_recompute(&mut self) -> ChartResult<bool> {
        if self.is_suspended() {
            self.pending_recompute = true;
            return Ok(false);
        }
        self.recompute()?;
        Ok(true)
    }
}

fn check_bindings<R>(config: SeriesConfig, bindings: &SeriesBindings<R>) -> ChartResult<()> {
    let expected = config.y_channel_count();
    let actual = bindings.y_channel_count();
    if actual != expected {
        return Err(ChartError::InvalidConfig(format!(
            "{:?} series needs {expected} y bindings, got {actual}",
            config.kind
        )));
    }
    Ok(())
}

fn sync_segments<R: Clone>(
    segments: &mut SegmentCollection<SeriesSegment<R>>,
    series: &PointSeries<R>,
    config: SeriesConfig,
) -> SyncReport {
    let capabilities = config.kind.capabilities();
    let x = series.x_values();
    let items = series.items();
    let channel = |index: usize| series.y_values(index).unwrap_or_default();
    let point = |index: usize| ChartPoint::new(x[index], channel(0)[index]);

    match capabilities.segment_layout {
        SegmentLayout::Pairwise if capabilities.uses_interpolation => {
            let curve = compute_curve_with(x, channel(0), config.spline_mode, config.tangent_space);
            segments.sync(series.len(), |i| {
                let (start, end) = (point(i), point(i + 1));
                let controls = curve
                    .get(i)
                    .copied()
                    .unwrap_or_else(|| BezierControls::straight(start, end));
                SeriesSegment::Curve(CurveSegment::new(start, end, controls, items[i].clone()))
            })
        }
        SegmentLayout::Pairwise => segments.sync(series.len(), |i| {
            SeriesSegment::Line(LineSegment {
                start: point(i),
                end: point(i + 1),
                source_item: items[i].clone(),
            })
        }),
        SegmentLayout::PerPoint => {
            let shares = match config.kind {
                SeriesKind::StackedColumn100 => stack_percent(&[channel(0)]).pop(),
                _ => None,
            };
            segments.sync_to(config.kind.segment_count(series.len()), |i| {
                let source_item = items[i].clone();
                match config.kind {
                    SeriesKind::Bubble => SeriesSegment::Bubble(BubbleSegment {
                        center: point(i),
                        size: channel(1)[i],
                        source_item,
                    }),
                    SeriesKind::Candle => SeriesSegment::Column(ColumnSegment {
                        x: x[i],
                        low: channel(2)[i],
                        high: channel(1)[i],
                        source_item,
                    }),
                    SeriesKind::RangeColumn => SeriesSegment::Column(ColumnSegment {
                        x: x[i],
                        low: channel(0)[i],
                        high: channel(1)[i],
                        source_item,
                    }),
                    _ => {
                        let span = shares.as_ref().and_then(|spans| spans.get(i));
                        SeriesSegment::Column(ColumnSegment {
                            x: x[i],
                            low: span.map_or(0.0, |span| span.start),
                            high: span.map_or(channel(0)[i], |span| span.end),
                            source_item,
                        })
                    }
                }
            })
        }
    }
}
