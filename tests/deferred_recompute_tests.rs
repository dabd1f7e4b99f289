use chart_spline::core::SeriesKind;
use chart_spline::{SeriesBindings, SeriesConfig, SeriesEngine, SourceChange};
use serde_json::{Value, json};

fn spline_engine() -> SeriesEngine<Value> {
    let bindings = SeriesBindings::from_paths("x", &["y"]).expect("bindings");
    SeriesEngine::new(SeriesConfig::new(SeriesKind::Spline), bindings).expect("engine init")
}

fn add(engine: &mut SeriesEngine<Value>, x: f64, y: f64) -> bool {
    let index = engine.store().len();
    engine
        .apply_change(SourceChange::Add {
            index,
            item: json!({"x": x, "y": y}),
        })
        .expect("add")
        .recomputed
}

#[test]
fn every_change_recomputes_when_not_suspended() {
    let mut engine = spline_engine();
    assert!(add(&mut engine, 0.0, 0.0));
    assert!(add(&mut engine, 1.0, 1.0));
    assert_eq!(engine.diagnostics().recompute_passes, 2);
    assert_eq!(engine.segments().len(), 1);
}

#[test]
fn suspended_changes_recompute_once_on_resume() {
    let mut engine = spline_engine();
    engine.suspend_notifications();
    for i in 0..50 {
        assert!(!add(&mut engine, f64::from(i), f64::from(i % 7)));
    }

    let diagnostics = engine.diagnostics();
    assert_eq!(diagnostics.recompute_passes, 0);
    assert!(diagnostics.pending_recompute);
    assert_eq!(diagnostics.point_count, 50);
    assert!(engine.segments().is_empty());

    assert!(engine.resume_notifications().expect("resume"));
    let diagnostics = engine.diagnostics();
    assert_eq!(diagnostics.recompute_passes, 1);
    assert!(!diagnostics.pending_recompute);
    assert_eq!(engine.segments().len(), 49);
}

#[test]
fn nested_suspensions_recompute_only_on_outermost_resume() {
    let mut engine = spline_engine();
    engine.suspend_notifications();
    engine.suspend_notifications();
    add(&mut engine, 0.0, 0.0);
    add(&mut engine, 1.0, 2.0);

    assert!(!engine.resume_notifications().expect("inner resume"));
    assert!(engine.is_suspended());
    assert_eq!(engine.diagnostics().recompute_passes, 0);

    assert!(engine.resume_notifications().expect("outer resume"));
    assert_eq!(engine.diagnostics().recompute_passes, 1);
    assert_eq!(engine.segments().len(), 1);
}

#[test]
fn resume_without_changes_or_suspension_does_nothing() {
    let mut engine = spline_engine();
    assert!(!engine.resume_notifications().expect("unmatched resume"));

    engine.suspend_notifications();
    assert!(!engine.resume_notifications().expect("resume"));
    assert_eq!(engine.diagnostics().recompute_passes, 0);
}

#[test]
fn diagnostics_serialize_to_json() {
    let mut engine = spline_engine();
    add(&mut engine, 0.0, 0.0);
    let json = engine.diagnostics().to_json_pretty().expect("json");
    assert!(json.contains("\"recompute_passes\": 1"));
}
