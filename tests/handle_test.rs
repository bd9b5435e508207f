//! Async registry handle tests.

use std::fs;
use std::path::Path;

use model_registry::models::{RegistryError, RegistryHandle, RegistryService};
use model_registry::{Registry, RegistryConfig};
use serde_json::json;

fn write_model(root: &Path, name: &str, train_date: &str) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    let metadata = json!({"id": format!("id-{}", name), "name": name, "trainDate": train_date});
    fs::write(dir.join("metadata.json"), metadata.to_string()).unwrap();
}

#[tokio::test]
async fn test_handle_full_lifecycle() {
    let tmp = tempfile::tempdir().unwrap();
    write_model(tmp.path(), "old", "2023-06-01T00:00:00Z");
    write_model(tmp.path(), "new", "2024-06-01T00:00:00Z");
    let handle = RegistryHandle::new(RegistryService::new(tmp.path()));

    let entries = handle.list_models().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(handle.active_model().await.unwrap(), None);

    let outcome = handle.apply_model("new").await.unwrap();
    assert_eq!(outcome.model, "new");
    assert_eq!(handle.active_model().await.unwrap().as_deref(), Some("new"));

    let err = handle.delete_model("new").await.unwrap_err();
    assert!(matches!(err, RegistryError::Conflict(_)));

    handle.delete_model("old").await.unwrap();
    let names: Vec<_> = handle
        .list_models()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["new".to_string()]);
}

#[tokio::test]
async fn test_handle_clones_share_root() {
    let tmp = tempfile::tempdir().unwrap();
    write_model(tmp.path(), "m", "2024-01-01T00:00:00Z");
    let handle = Registry::new(&RegistryConfig {
        root: tmp.path().to_path_buf(),
        notify_command: None,
        ..RegistryConfig::default()
    });
    let clone = handle.clone();

    let (listed, applied) = tokio::join!(handle.list_models(), clone.apply_model("m"));
    assert_eq!(listed.unwrap().len(), 1);
    assert!(applied.unwrap().notify_warning.is_none());
    assert_eq!(handle.service().root(), tmp.path());
}

#[cfg(unix)]
#[tokio::test]
async fn test_failing_notify_command_surfaces_warning() {
    let tmp = tempfile::tempdir().unwrap();
    write_model(tmp.path(), "m", "2024-01-01T00:00:00Z");
    let handle = Registry::new(&RegistryConfig {
        root: tmp.path().to_path_buf(),
        notify_command: Some("false".into()),
        ..RegistryConfig::default()
    });

    let outcome = handle.apply_model("m").await.unwrap();

    assert!(outcome.notify_warning.is_some());
    assert_eq!(handle.active_model().await.unwrap().as_deref(), Some("m"));
}

#[tokio::test]
async fn test_handle_missing_model() {
    let tmp = tempfile::tempdir().unwrap();
    let handle = RegistryHandle::new(RegistryService::new(tmp.path()));

    assert!(matches!(
        handle.apply_model("ghost").await,
        Err(RegistryError::NotFound(_))
    ));
}
