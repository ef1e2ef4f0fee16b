mod common;

use std::io::Write;

use netplace::{Netmap, NodeStatus};

const SNAPSHOT: &str = r#"{
    "s01": {
        "attributes": {"Country": "Russia", "UN-LOCODE": "RU MOW"},
        "status": "ONLINE",
        "capacity": 100
    },
    "s02": {
        "attributes": {"Country": "Russia", "UN-LOCODE": "RU LED"},
        "status": "STATUS_UNDEFINED"
    },
    "s03": {
        "attributes": {"Country": "Sweden"},
        "status": "OFFLINE",
        "capacity": 50
    }
}"#;

#[test]
fn ingests_snapshot_json() {
    let map = Netmap::from_snapshot_json(SNAPSHOT).unwrap();
    assert_eq!(map.len(), 3);

    let s01 = map.get("s01").unwrap();
    assert_eq!(s01.attr("Country"), Some("Russia"));
    assert_eq!(s01.attr("UN-LOCODE"), Some("RU MOW"));
    assert_eq!(s01.capacity(), 100);
    assert!(s01.is_online());

    // capacity defaults when the record omits it
    let s02 = map.get("s02").unwrap();
    assert_eq!(s02.capacity(), 0);
    assert_eq!(s02.status(), NodeStatus::StatusUndefined);
}

#[test]
fn snapshot_lists_only_online_nodes() {
    let map = Netmap::from_snapshot_json(SNAPSHOT).unwrap();
    assert_eq!(map.snapshot(), ["s01"]);
}

#[test]
fn status_transitions_change_snapshot_visibility() {
    let mut map = common::devenv_netmap();
    assert_eq!(map.snapshot(), ["s01", "s02", "s03", "s04"]);

    assert!(map.set_status("s02", NodeStatus::Offline));
    assert_eq!(map.snapshot(), ["s01", "s03", "s04"]);

    assert!(map.set_status("s02", NodeStatus::Online));
    assert_eq!(map.snapshot(), ["s01", "s02", "s03", "s04"]);

    assert!(!map.set_status("s99", NodeStatus::Offline));
}

#[test]
fn rejects_malformed_snapshot() {
    assert!(Netmap::from_snapshot_json("{\"s01\": {\"status\": \"BOGUS\"}}").is_err());
    assert!(Netmap::from_snapshot_json("not json").is_err());
}

#[test]
fn reads_snapshot_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SNAPSHOT.as_bytes()).unwrap();
    let raw = std::fs::read_to_string(file.path()).unwrap();
    let map = Netmap::from_snapshot_json(&raw).unwrap();
    assert_eq!(map.len(), 3);
}
