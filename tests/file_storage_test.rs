//! Plans written by the file backend survive a new engine instance

use pacemaker::config::EngineConfig;
use pacemaker::orchestrator::PlanOrchestrator;
use pacemaker::plan::ProcessingStatus;
use pacemaker::storage::{BackendType, StorageFactory};
use pacemaker::testing::{runner_profile, threshold_request, MockReasoningService};
use std::sync::Arc;
use tempfile::TempDir;

fn file_config(dir: &TempDir) -> EngineConfig {
    let mut config = EngineConfig::default();
    config.storage.backend = BackendType::File;
    config.storage.file.base_dir = Some(dir.path().to_path_buf());
    config
}

#[tokio::test]
async fn test_completed_plan_is_readable_after_restart() {
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir);

    let orchestrator = PlanOrchestrator::from_config(
        &config,
        Arc::new(MockReasoningService::builder().build()),
    )
    .await
    .unwrap();
    let handle = orchestrator
        .submit(runner_profile(), threshold_request().with_running_id("run-1"))
        .await
        .unwrap();
    let id = handle.id.clone();
    assert_eq!(handle.wait().await.unwrap(), ProcessingStatus::Completed);

    let storage = StorageFactory::from_config(&config.storage).await.unwrap();
    let stored = storage.plans.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.processing_status, ProcessingStatus::Completed);
    assert_eq!(stored.template_id.as_deref(), Some("T-CRUISE-3X1600"));
    assert!(!stored.segments.is_empty());

    assert!(dir
        .path()
        .join("pacemakers")
        .join(format!("{}.json", id))
        .exists());

    let deleted = storage
        .plans
        .delete_by_running_ids(&["run-1".to_string()])
        .await
        .unwrap();
    assert_eq!(deleted, 1);
}
