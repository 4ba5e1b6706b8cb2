// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use scc_core::lane::Lane;
use scc_core::pins::PinSpec;
use scc_core::task::{Pointers, Runner, TaskKind, TaskStatus};
use scc_core::TaskId;

pub(crate) fn task(id: &str) -> Task {
    Task {
        task_id: TaskId::new(id),
        kind: TaskKind::Atomic,
        title: "t".to_string(),
        goal: "g".to_string(),
        role: "executor".to_string(),
        area: "core".to_string(),
        lane: Lane::Mainlane,
        task_class_id: None,
        files: vec!["a.md".to_string()],
        pins: PinSpec {
            allowed_paths: vec!["a.md".to_string()],
            windows: vec![],
        },
        allowed_tests: vec![],
        allowed_executors: vec!["noop".to_string()],
        allowed_models: vec![],
        runner: Runner::Internal,
        pointers: Pointers::default(),
        status: TaskStatus::Ready,
        priority: None,
        attempts: 0,
    }
}

fn pins(task: &Task, map_hash: &str) -> PinsRequest {
    PinsRequest::new(map_hash, task.pins.clone())
}

fn service(dir: &tempfile::TempDir) -> PackService {
    PackService::new(dir.path().join("packs"))
}

#[test]
fn build_materializes_all_files() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(&dir);
    let task = task("t1");
    let pins = pins(&task, "sha256:map1");

    let pack_id = service
        .build(&PackInputs {
            task: &task,
            pins: &pins,
            preflight: &Preflight::passing(),
            replay: None,
        })
        .unwrap();

    for name in ["manifest.json", "task.json", "pins.json", "preflight.json"] {
        assert!(!service.file_bytes(&pack_id, name).unwrap().is_empty());
    }
    assert!(!service.has_file(&pack_id, "replay_bundle"));
    // No staging leftovers
    assert!(!dir.path().join("packs").join(format!(".tmp-{pack_id}")).exists());
}

#[test]
fn pack_id_is_manifest_hash() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(&dir);
    let task = task("t1");
    let pins = pins(&task, "sha256:map1");

    let pack_id = service
        .build(&PackInputs {
            task: &task,
            pins: &pins,
            preflight: &Preflight::passing(),
            replay: None,
        })
        .unwrap();

    let manifest_bytes = service.file_bytes(&pack_id, "manifest.json").unwrap();
    assert_eq!(pack_id.as_str(), crate::attest::sha256_hex(&manifest_bytes));

    // Manifest entries carry the hash of the bytes actually served
    let manifest: PackManifest = serde_json::from_slice(&manifest_bytes).unwrap();
    for entry in &manifest.files {
        let bytes = service.file_bytes(&pack_id, &entry.name).unwrap();
        assert_eq!(entry.sha256, crate::attest::sha256_hex(&bytes));
        assert_eq!(entry.size, bytes.len() as u64);
    }
}

#[test]
fn same_inputs_reuse_the_pack() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(&dir);
    let task = task("t1");
    let pins = pins(&task, "sha256:map1");
    let inputs = PackInputs {
        task: &task,
        pins: &pins,
        preflight: &Preflight::passing(),
        replay: None,
    };

    let a = service.build(&inputs).unwrap();
    let b = service.build(&inputs).unwrap();
    assert_eq!(a, b);

    // A different map hash re-pins into a new pack
    let other_pins = PinsRequest::new("sha256:map2", task.pins.clone());
    let c = service
        .build(&PackInputs {
            task: &task,
            pins: &other_pins,
            preflight: &Preflight::passing(),
            replay: None,
        })
        .unwrap();
    assert_ne!(a, c);
}

#[test]
fn replay_dispatch_includes_replay_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(&dir);
    let task = task("t1");
    let pins = pins(&task, "sha256:map1");
    let replay = ReplayBundle::minimal(&task, "noop", None);

    let pack_id = service
        .build(&PackInputs {
            task: &task,
            pins: &pins,
            preflight: &Preflight::passing(),
            replay: Some(&replay),
        })
        .unwrap();

    assert!(service.has_file(&pack_id, "replay_bundle"));
    let bytes = service.file_bytes(&pack_id, "replay_bundle.json").unwrap();
    let bundle: ReplayBundle = serde_json::from_slice(&bytes).unwrap();
    assert!(bundle.is_valid());
}

#[test]
fn file_fetch_rejects_non_pack_names() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(&dir);
    let pack_id = PackId::new("deadbeef");
    assert!(matches!(
        service.file_bytes(&pack_id, "../escape.json"),
        Err(PackError::UnknownFile(_))
    ));
    assert!(matches!(
        service.file_bytes(&pack_id, "task.json"),
        Err(PackError::NotFound(_))
    ));
}

#[test]
fn server_hashes_cover_present_files() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(&dir);
    let task = task("t1");
    let pins = pins(&task, "sha256:map1");
    let pack_id = service
        .build(&PackInputs {
            task: &task,
            pins: &pins,
            preflight: &Preflight::passing(),
            replay: None,
        })
        .unwrap();

    let hashes = service.server_hashes(&pack_id, "feedbeef").unwrap();
    assert_eq!(
        hashes.keys().cloned().collect::<Vec<_>>(),
        ["manifest", "pins", "preflight", "task"]
    );
    let task_bytes = service.file_bytes(&pack_id, "task.json").unwrap();
    let (raw, bound) = &hashes["task"];
    assert_eq!(*raw, crate::attest::sha256_hex(&task_bytes));
    assert_eq!(*bound, crate::attest::attest_sha256_hex("feedbeef", &task_bytes));
    assert_ne!(raw, bound);
}

#[test]
fn gc_keeps_live_packs() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(&dir);
    let task_a = task("t1");
    let pins_a = pins(&task_a, "sha256:map1");
    let live_pack = service
        .build(&PackInputs {
            task: &task_a,
            pins: &pins_a,
            preflight: &Preflight::passing(),
            replay: None,
        })
        .unwrap();
    let task_b = task("t2");
    let pins_b = pins(&task_b, "sha256:map1");
    let dead_pack = service
        .build(&PackInputs {
            task: &task_b,
            pins: &pins_b,
            preflight: &Preflight::passing(),
            replay: None,
        })
        .unwrap();

    let mut live = HashSet::new();
    live.insert(live_pack.clone());
    let removed = service.gc(&live);

    assert_eq!(removed, 1);
    assert!(service.file_bytes(&live_pack, "task.json").is_ok());
    assert!(matches!(
        service.file_bytes(&dead_pack, "task.json"),
        Err(PackError::NotFound(_))
    ));
}
