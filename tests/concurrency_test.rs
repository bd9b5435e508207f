//! Concurrent listing, switching and deleting on one registry root.
//!
//! Each thread builds its own service over the shared root, as separate
//! processes would.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use model_registry::models::{Notifier, NotifyError, RegistryError, RegistryService};
use serde_json::{json, Value};

const THREADS: usize = 8;

fn write_model(root: &Path, name: &str, metadata: Value) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("metadata.json"), metadata.to_string()).unwrap();
}

fn run_concurrently<T, F>(root: &Path, op: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(usize, RegistryService) -> T + Send + Sync + 'static,
{
    let barrier = Arc::new(Barrier::new(THREADS));
    let op = Arc::new(op);
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let root: PathBuf = root.to_path_buf();
            let barrier = Arc::clone(&barrier);
            let op = Arc::clone(&op);
            thread::spawn(move || {
                let service = RegistryService::new(root);
                barrier.wait();
                op(i, service)
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

#[test]
fn test_concurrent_listers_agree_on_backfilled_id() {
    let tmp = tempfile::tempdir().unwrap();
    write_model(tmp.path(), "fresh", json!({"name": "fresh", "accuracy": 0.4}));

    let results = run_concurrently(tmp.path(), |_, service| {
        let entries = service.list().unwrap();
        (entries[0].id.clone(), entries[0].train_date.as_str().to_string())
    });

    let first = &results[0];
    assert!(results.iter().all(|r| r == first), "listers saw different backfills: {:?}", results);

    let raw: Value = serde_json::from_str(
        &fs::read_to_string(tmp.path().join("fresh").join("metadata.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(raw["id"], first.0.as_str());
    assert_eq!(raw["trainDate"], first.1.as_str());
}

#[test]
fn test_concurrent_switches_leave_one_requested_model_active() {
    let tmp = tempfile::tempdir().unwrap();
    let names: Vec<String> = (0..THREADS).map(|i| format!("m{}", i)).collect();
    for (i, name) in names.iter().enumerate() {
        write_model(
            tmp.path(),
            name,
            json!({"id": format!("id-{}", i), "trainDate": format!("2024-01-0{}T00:00:00Z", i + 1)}),
        );
    }

    let results = run_concurrently(tmp.path(), |i, service| service.switch_active(&format!("m{}", i)));
    assert!(results.iter().all(|r| r.is_ok()));

    let service = RegistryService::new(tmp.path());
    let active = service.active_model().unwrap().unwrap();
    assert!(names.contains(&active));

    let entries = service.list().unwrap();
    let flagged: Vec<_> = entries.iter().filter(|e| e.active).map(|e| e.name.clone()).collect();
    assert_eq!(flagged, vec![active]);

    // Pointer file is always complete JSON.
    let raw = fs::read_to_string(tmp.path().join("active.json")).unwrap();
    assert!(serde_json::from_str::<Value>(&raw).is_ok());
}

#[test]
fn test_delete_racing_switch_never_removes_active_model() {
    let tmp = tempfile::tempdir().unwrap();
    write_model(tmp.path(), "target", json!({"id": "t", "trainDate": "2024-01-01T00:00:00Z"}));
    write_model(tmp.path(), "other", json!({"id": "o", "trainDate": "2024-01-02T00:00:00Z"}));

    let results = run_concurrently(tmp.path(), |i, service| {
        if i % 2 == 0 {
            service.switch_active("target").map(|_| ())
        } else {
            service.delete_model("target")
        }
    });

    let service = RegistryService::new(tmp.path());
    let active = service.active_model().unwrap();
    let exists = tmp.path().join("target").is_dir();

    // Either target was deleted before any switch, or it is active and intact.
    if exists {
        assert_eq!(active.as_deref(), Some("target"));
    } else {
        assert_ne!(active.as_deref(), Some("target"));
    }
    for result in results {
        match result {
            Ok(()) | Err(RegistryError::Conflict(_)) | Err(RegistryError::NotFound(_)) => {}
            Err(other) => panic!("unexpected error: {}", other),
        }
    }
}

/// Signals when a notification starts, then stalls like a hung runtime.
struct SlowNotifier {
    started: Mutex<Sender<()>>,
    delay: Duration,
}

impl Notifier for SlowNotifier {
    fn notify_switch(&self, _model_name: &str) -> Result<(), NotifyError> {
        let _ = self.started.lock().unwrap().send(());
        thread::sleep(self.delay);
        Ok(())
    }
}

#[test]
fn test_slow_notifier_does_not_block_delete() {
    let tmp = tempfile::tempdir().unwrap();
    write_model(tmp.path(), "a", json!({"id": "a", "trainDate": "2024-01-01T00:00:00Z"}));
    write_model(tmp.path(), "b", json!({"id": "b", "trainDate": "2024-01-02T00:00:00Z"}));

    let (tx, rx) = mpsc::channel();
    let notifier = Arc::new(SlowNotifier { started: Mutex::new(tx), delay: Duration::from_secs(2) });
    let root = tmp.path().to_path_buf();
    let switcher = thread::spawn(move || {
        RegistryService::with_notifier(root, notifier).switch_active("a")
    });

    rx.recv_timeout(Duration::from_secs(10)).unwrap();
    let started = Instant::now();
    RegistryService::new(tmp.path()).delete_model("b").unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_secs(1), "delete waited {:?} on the notifier", elapsed);
    assert!(!tmp.path().join("b").exists());

    let outcome = switcher.join().unwrap().unwrap();
    assert_eq!(outcome.model, "a");
    assert_eq!(RegistryService::new(tmp.path()).active_model().unwrap().as_deref(), Some("a"));
}
