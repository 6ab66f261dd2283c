//! JSON snapshot file store and config loading against a temp directory.

use std::fs;

use crewline_cli::{exit_codes, AppConfig, AppConfigError, JsonFileStore};
use crewline_core::ports::{SnapshotStore, StoreError};
use crewline_core::{CrewMember, CycleError, Flight, Snapshot};
use tempfile::TempDir;

fn sample() -> Snapshot {
    Snapshot::new(vec![Flight::new("u1")
        .with_trip_key("PNR1")
        .with_start("2024-03-06T14:30:00Z")
        .with_route("TEB", "PBI")
        .with_aircraft("N84UP")
        .with_crew(vec![CrewMember::new("Alice Smith", "PIC")])])
}

#[tokio::test]
async fn test_missing_file_loads_none() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("flights-data.json"));
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state").join("flights-data.json");
    let store = JsonFileStore::new(&path);

    store.save(&sample()).await.unwrap();

    assert!(path.exists(), "parent directory should be created");
    let entries: Vec<_> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("flights-data.json")], "temp file should be renamed");
    let on_disk: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(on_disk.is_array());
    assert_eq!(store.load().await.unwrap(), Some(sample()));
}

#[tokio::test]
async fn test_save_replaces_existing() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("flights-data.json"));

    store.save(&sample()).await.unwrap();
    store.save(&Snapshot::default()).await.unwrap();

    assert_eq!(store.load().await.unwrap(), Some(Snapshot::default()));
}

#[tokio::test]
async fn test_snapshot_path_with_tmp_extension() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("flights.tmp"));

    store.save(&sample()).await.unwrap();

    assert!(store.path().exists());
    assert_eq!(store.load().await.unwrap(), Some(sample()));
}

#[tokio::test]
async fn test_corrupt_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flights-data.json");
    fs::write(&path, "{ not json").unwrap();

    let err = JsonFileStore::new(&path).load().await.unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }));
}

#[test]
fn test_config_file_loads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("crewline.yaml");
    fs::write(
        &path,
        "source:\n  url: https://portal.example.com/schedule.json\n  aircraft_uuids: [a-1]\nwatch:\n  home_base: TEB\n  tracked_aircraft: [N84UP]\n",
    )
    .unwrap();

    let config = AppConfig::load(&path, true).unwrap();
    assert_eq!(config.source.aircraft_uuids, vec!["a-1".to_string()]);
    assert_eq!(config.watch.home_base.as_deref(), Some("TEB"));
}

#[test]
fn test_required_config_must_exist() {
    let dir = TempDir::new().unwrap();
    let err = AppConfig::load(&dir.path().join("absent.yaml"), true).unwrap_err();
    assert!(matches!(err, AppConfigError::Read { .. }));
}

#[test]
fn test_invalid_yaml_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("crewline.yaml");
    fs::write(&path, "source: [unterminated").unwrap();
    assert!(matches!(
        AppConfig::load(&path, true),
        Err(AppConfigError::Parse { .. })
    ));
}

#[test]
fn test_cycle_exit_codes_match_process_codes() {
    let auth = CycleError::AuthExpired {
        message: "x".into(),
    };
    let store = CycleError::Store(StoreError::Io {
        location: "x".into(),
        message: "x".into(),
    });
    assert_eq!(auth.exit_code(), exit_codes::SESSION_EXPIRED);
    assert_eq!(store.exit_code(), exit_codes::CYCLE_FAILED);
}
