use gunsync_engine::HealthMetrics;
use std::time::Duration;

// ── counter math ─────────────────────────────────────────────────

#[test]
fn success_rate_is_zero_when_nothing_discovered() {
    let metrics = HealthMetrics::default();
    assert_eq!(metrics.success_rate(), 0.0);
    assert_eq!(metrics.error_rate(), 0.0);
}

#[test]
fn success_rate_is_synced_over_discovered() {
    let metrics = HealthMetrics {
        total_discovered: 10,
        total_synced: 9,
        total_errors: 1,
        ..Default::default()
    };
    assert!((metrics.success_rate() - 0.9).abs() < f64::EPSILON);
    assert!((metrics.error_rate() - 0.1).abs() < f64::EPSILON);
}

#[test]
fn record_cycle_folds_running_average() {
    let mut metrics = HealthMetrics::default();
    metrics.record_cycle(Duration::from_millis(100));
    assert!((metrics.average_sync_time_ms - 100.0).abs() < 1e-9);

    metrics.record_cycle(Duration::from_millis(200));
    assert!((metrics.average_sync_time_ms - 150.0).abs() < 1e-9);

    assert_eq!(metrics.sync_cycles, 2);
    assert_eq!(metrics.cycles_measured, 2);
    assert!(metrics.last_sync_time.is_some());
}

#[test]
fn failed_cycle_counts_without_touching_timing() {
    let mut metrics = HealthMetrics::default();
    metrics.record_cycle(Duration::from_millis(100));
    let stamp = metrics.last_sync_time;

    metrics.record_failed_cycle();
    assert_eq!(metrics.sync_cycles, 2);
    assert_eq!(metrics.cycles_measured, 1);
    assert_eq!(metrics.total_errors, 1);
    assert_eq!(metrics.last_sync_time, stamp);
    assert!((metrics.average_sync_time_ms - 100.0).abs() < 1e-9);
}
