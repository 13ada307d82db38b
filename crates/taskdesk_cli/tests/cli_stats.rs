use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("taskdesk-{nanos}-{file_name}"))
}

fn write_store(path: &PathBuf, tasks: serde_json::Value) {
    std::fs::write(path, serde_json::to_string_pretty(&tasks).unwrap()).unwrap();
}

fn counted_fixture() -> serde_json::Value {
    serde_json::json!([
        {
            "id": 1,
            "title": "done",
            "description": "",
            "priority": "Medium",
            "completed": true,
            "created_date": "2026-08-01 09:00",
            "completed_date": "2026-08-01 17:00"
        },
        {
            "id": 2,
            "title": "open one",
            "description": "",
            "priority": "High",
            "completed": false,
            "created_date": "2026-08-02 09:00",
            "completed_date": null
        },
        {
            "id": 3,
            "title": "open two",
            "description": "",
            "priority": "Low",
            "completed": false,
            "created_date": "2026-08-03 09:00",
            "completed_date": null
        }
    ])
}

#[test]
fn stats_counts_by_status() {
    let exe = env!("CARGO_BIN_EXE_taskdesk");
    let store_path = temp_path("cli-stats.json");
    write_store(&store_path, counted_fixture());

    let output = Command::new(exe)
        .args(["stats"])
        .env("TASKDESK_STORE_PATH", &store_path)
        .output()
        .expect("failed to run stats command");

    std::fs::remove_file(&store_path).ok();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total: 3 | Completed: 1 | Pending: 2"));
}

#[test]
fn stats_empty_store_counts_zero() {
    let exe = env!("CARGO_BIN_EXE_taskdesk");
    let store_path = temp_path("cli-stats-empty.json");

    let output = Command::new(exe)
        .args(["stats"])
        .env("TASKDESK_STORE_PATH", &store_path)
        .output()
        .expect("failed to run stats command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total: 0 | Completed: 0 | Pending: 0"));
}

#[test]
fn stats_json_output() {
    let exe = env!("CARGO_BIN_EXE_taskdesk");
    let store_path = temp_path("cli-stats-json.json");
    write_store(&store_path, counted_fixture());

    let output = Command::new(exe)
        .args(["stats", "--json"])
        .env("TASKDESK_STORE_PATH", &store_path)
        .output()
        .expect("failed to run stats command");

    std::fs::remove_file(&store_path).ok();
    assert!(output.status.success());

    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(payload["total"], 3);
    assert_eq!(payload["completed"], 1);
    assert_eq!(payload["pending"], 2);
}
