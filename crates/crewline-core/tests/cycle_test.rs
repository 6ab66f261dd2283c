//! Full poll cycles against the in-memory collaborators.

use chrono::{DateTime, Duration, TimeZone, Utc};
use crewline_core::format::SESSION_EXPIRED_MESSAGE;
use crewline_core::ports::{
    MemorySnapshotStore, RecordingSink, SourceError, StaticSource, StoreError,
};
use crewline_core::{CrewMember, CycleError, Flight, PollCycle, Snapshot, WatchConfig};
use serde_json::{json, Value};
use std::collections::BTreeSet;

fn now() -> DateTime<Utc> {
    // 07:00 in New York.
    Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()
}

fn record(uuid: &str, pnr: &str, start: DateTime<Utc>, crew: &[(&str, &str)]) -> Value {
    let crew: Vec<Value> = crew
        .iter()
        .map(|(name, role)| json!({"name": name, "role": role}))
        .collect();
    json!({
        "start": start.to_rfc3339(),
        "extendedProps": {
            "uuid": uuid,
            "aircraft": "N84UP",
            "origin_short": "TEB",
            "destination_short": "PBI",
            "pnr": pnr,
            "event_type_name": "Customer Flight",
            "crew": crew
        }
    })
}

fn tomorrow() -> DateTime<Utc> {
    // Mar 6 09:30 New York.
    Utc.with_ymd_and_hms(2024, 3, 6, 14, 30, 0).unwrap()
}

fn cycle() -> PollCycle {
    PollCycle::new(&WatchConfig::default()).unwrap()
}

#[tokio::test]
async fn test_first_run_saves_baseline_without_notifications() {
    let source = StaticSource::records(vec![
        record("u1", "PNR1", tomorrow(), &[("Alice Smith", "PIC")]),
        record("u0", "PNR0", now() - Duration::hours(2), &[]),
    ]);
    let store = MemorySnapshotStore::new();
    let sink = RecordingSink::new();

    let report = cycle().run(&source, &store, &sink, now()).await.unwrap();

    assert!(report.baseline);
    assert!(sink.messages().is_empty());
    assert_eq!(store.save_count(), 1);
    let saved = store.snapshot().unwrap();
    assert_eq!(saved.len(), 1, "past flight must not be persisted");
    assert_eq!(saved.flights()[0].id, "u1");
}

#[tokio::test]
async fn test_rerun_with_same_data_is_quiet() {
    let source = StaticSource::records(vec![record("u1", "PNR1", tomorrow(), &[])]);
    let store = MemorySnapshotStore::new();
    let sink = RecordingSink::new();

    cycle().run(&source, &store, &sink, now()).await.unwrap();
    let report = cycle().run(&source, &store, &sink, now()).await.unwrap();

    assert!(!report.baseline);
    assert!(report.diff.is_empty());
    assert!(sink.messages().is_empty());
    assert_eq!(store.save_count(), 2);
}

#[tokio::test]
async fn test_new_trip_notification() {
    let previous = Snapshot::new(vec![Flight::new("u1")
        .with_trip_key("PNR1")
        .with_start(tomorrow().to_rfc3339())]);
    let store = MemorySnapshotStore::with_snapshot(previous);
    let source = StaticSource::records(vec![
        record("u1", "PNR1", tomorrow(), &[]),
        record("u2", "PNR123", tomorrow(), &[]),
        record("u3", "PNR123", tomorrow() + Duration::hours(4), &[]),
    ]);
    let sink = RecordingSink::new();

    let report = cycle().run(&source, &store, &sink, now()).await.unwrap();

    assert_eq!(report.diff.new_trips.len(), 1);
    assert_eq!(report.diff.new_trips["PNR123"].len(), 2);
    // Route dedupes PBI only when it is the previous station; here both legs are TEB→PBI.
    assert_eq!(
        sink.messages(),
        vec!["🛫 Flight: Mar 6 at 09:30 on N84UP TEB - PBI - TEB - PBI".to_string()]
    );
}

#[tokio::test]
async fn test_crew_change_notification() {
    let store = MemorySnapshotStore::new();
    let sink = RecordingSink::new();
    let first = StaticSource::records(vec![record(
        "u5",
        "PNR5",
        tomorrow(),
        &[("A Smith", "PIC")],
    )]);
    cycle().run(&first, &store, &sink, now()).await.unwrap();

    let second = StaticSource::records(vec![record(
        "u5",
        "PNR5",
        tomorrow(),
        &[("A Smith", "PIC"), ("B Jones", "SIC")],
    )]);
    let report = cycle().run(&second, &store, &sink, now()).await.unwrap();

    assert_eq!(report.diff.crew_changes.len(), 1);
    assert!(report.diff.new_trips.is_empty());
    assert_eq!(
        sink.messages(),
        vec!["👨‍✈️ Crew: PIC: A, SIC: B - Mar 6 at 09:30 TEB - PBI".to_string()]
    );

    // Crew cleared upstream: not announced.
    let third = StaticSource::records(vec![record("u5", "PNR5", tomorrow(), &[])]);
    let report = cycle().run(&third, &store, &sink, now()).await.unwrap();
    assert!(report.diff.crew_changes.is_empty());
    assert_eq!(sink.messages().len(), 1);
}

#[tokio::test]
async fn test_auth_expired_notifies_and_skips_save() {
    let source = StaticSource::failing(SourceError::AuthExpired {
        message: "login page returned".into(),
    });
    let store = MemorySnapshotStore::new();
    let sink = RecordingSink::new();

    let err = cycle().run(&source, &store, &sink, now()).await.unwrap_err();

    assert!(matches!(err, CycleError::AuthExpired { .. }));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(sink.messages(), vec![SESSION_EXPIRED_MESSAGE.to_string()]);
    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn test_transport_failure_is_fatal_and_silent() {
    let source = StaticSource::failing(SourceError::Transport {
        message: "connection reset".into(),
    });
    let store = MemorySnapshotStore::new();
    let sink = RecordingSink::new();

    let err = cycle().run(&source, &store, &sink, now()).await.unwrap_err();

    assert!(matches!(err, CycleError::Source(SourceError::Transport { .. })));
    assert!(sink.messages().is_empty());
    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn test_corrupt_snapshot_rebuilds_baseline() {
    let store = MemorySnapshotStore::new().failing_load(StoreError::Corrupt {
        location: "memory".into(),
        message: "expected value at line 1".into(),
    });
    let source = StaticSource::records(vec![record("u1", "PNR1", tomorrow(), &[])]);
    let sink = RecordingSink::new();

    let report = cycle().run(&source, &store, &sink, now()).await.unwrap();

    assert!(report.baseline);
    assert!(sink.messages().is_empty());
    assert_eq!(store.save_count(), 1);
}

#[tokio::test]
async fn test_failed_notification_does_not_block_others() {
    let store = MemorySnapshotStore::with_snapshot(Snapshot::default());
    let source = StaticSource::records(vec![
        record("u1", "PNR1", tomorrow(), &[]),
        {
            let mut maintenance = record("u2", "MX1", tomorrow(), &[]);
            maintenance["extendedProps"]["event_type_name"] = json!("Maintenance");
            maintenance
        },
    ]);
    let sink = RecordingSink::rejecting("🔧");

    let report = cycle().run(&source, &store, &sink, now()).await.unwrap();

    assert_eq!(report.deliveries.len(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.sent(), 1);
    assert_eq!(sink.messages().len(), 1);
    assert_eq!(store.save_count(), 1);
}

#[tokio::test]
async fn test_save_failure_surfaces_after_notifications() {
    let store = MemorySnapshotStore::with_snapshot(Snapshot::default()).failing_save(
        StoreError::Io {
            location: "memory".into(),
            message: "disk full".into(),
        },
    );
    let source = StaticSource::records(vec![record("u1", "PNR1", tomorrow(), &[])]);
    let sink = RecordingSink::new();

    let err = cycle().run(&source, &store, &sink, now()).await.unwrap_err();

    assert!(matches!(err, CycleError::Store(_)));
    assert_eq!(sink.messages().len(), 1);
}

#[tokio::test]
async fn test_scope_and_coverage() {
    let config = WatchConfig {
        tracked_aircraft: Some(BTreeSet::from(["N84UP".to_string(), "N240V".to_string()])),
        ..WatchConfig::default()
    };
    let mut other = record("u9", "PNR9", tomorrow(), &[]);
    other["extendedProps"]["aircraft"] = json!("N1OTHER");
    let source = StaticSource::records(vec![record("u1", "PNR1", tomorrow(), &[]), other]);
    let store = MemorySnapshotStore::new();
    let sink = RecordingSink::new();

    let report = PollCycle::new(&config)
        .unwrap()
        .run(&source, &store, &sink, now())
        .await
        .unwrap();

    assert_eq!(report.fetched, 2);
    assert_eq!(report.upcoming, 1);
    assert_eq!(
        report.coverage.missing,
        BTreeSet::from(["N240V".to_string()])
    );
}

#[tokio::test]
async fn test_snapshot_written_by_one_cycle_diffs_cleanly_in_next() {
    let store = MemorySnapshotStore::new();
    let sink = RecordingSink::new();
    let crew = [("Alice <b>Smith</b>", "PIC")];
    let source = StaticSource::records(vec![record("u1", "PNR1", tomorrow(), &crew)]);

    cycle().run(&source, &store, &sink, now()).await.unwrap();
    let saved = store.snapshot().unwrap();
    assert_eq!(
        saved.flights()[0].crew,
        Some(vec![CrewMember::new("Alice Smith", "PIC")])
    );

    // Round-trip through JSON as a file store would.
    let json = serde_json::to_string(&saved).unwrap();
    let reloaded: Snapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(reloaded, saved);

    let report = cycle()
        .run(&source, &MemorySnapshotStore::with_snapshot(reloaded), &sink, now())
        .await
        .unwrap();
    assert!(report.diff.is_empty());
}
