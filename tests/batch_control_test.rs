//! Integration tests for batch control flow
//!
//! These tests verify that:
//! - Cancellation is checked between units and never interrupts an upload
//! - Every partitioned unit is accounted for exactly once
//! - Failed units can be retried without touching the ones that succeeded
//! - The history log survives the session

mod common;

use assetlift::adapters::{UploadRequest, UploadResult, Uploader};
use assetlift::config::BackendTarget;
use assetlift::core::batch::{partition, BatchOrchestrator, PartitionMode};
use assetlift::core::export::{ExportSettings, Exporter};
use assetlift::core::history::{UploadHistory, UploadStatus};
use assetlift::core::validation::ValidationLimits;
use assetlift::domain::{ContentHash, ErrorKind, LiftError, Result};
use async_trait::async_trait;
use common::{ids, workshop_scene, ScriptedEncoder};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use test_case::test_case;

/// Uploader that hashes locally and optionally raises the shutdown signal
#[derive(Default)]
struct LocalUploader {
    uploaded: Mutex<Vec<String>>,
    cancel_after_first: Option<watch::Sender<bool>>,
    reject: HashSet<String>,
}

#[async_trait]
impl Uploader for LocalUploader {
    fn backend(&self) -> BackendTarget {
        BackendTarget::Direct
    }

    async fn probe(&self) -> Result<()> {
        Ok(())
    }

    async fn upload(&self, request: UploadRequest<'_>) -> Result<UploadResult> {
        if self.reject.contains(request.unit_name) {
            return Err(LiftError::protocol("unexpected response shape"));
        }

        self.uploaded
            .lock()
            .unwrap()
            .push(request.unit_name.to_string());
        if let Some(ref tx) = self.cancel_after_first {
            // Signal arrives while this upload is still in flight
            tx.send(true).unwrap();
        }

        Ok(UploadResult {
            reference_id: ContentHash::of(request.bytes).to_string(),
            location_url: None,
            backend_metadata: BTreeMap::new(),
        })
    }
}

fn orchestrator(uploader: Arc<LocalUploader>) -> BatchOrchestrator {
    BatchOrchestrator::new(
        Exporter::new(Arc::new(ScriptedEncoder::default())),
        uploader,
        ValidationLimits::default(),
    )
}

#[tokio::test]
async fn test_cancel_mid_batch_lets_current_upload_finish() {
    let (tx, rx) = watch::channel(false);
    let uploader = Arc::new(LocalUploader {
        cancel_after_first: Some(tx),
        ..Default::default()
    });
    let mut history = UploadHistory::new();

    let report = orchestrator(uploader.clone())
        .with_shutdown(rx)
        .run_batch(
            &workshop_scene(),
            &ids(&["Chair", "Table", "Robot"]),
            PartitionMode::Individual,
            &ExportSettings::default(),
            &mut history,
        )
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(*uploader.uploaded.lock().unwrap(), vec!["Chair".to_string()]);
    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.failed_unit_names(), vec!["Table", "Robot"]);
    assert!(report
        .failed
        .iter()
        .all(|f| f.kind == ErrorKind::Cancelled));
    assert_eq!(report.total_units(), 3);
    assert_eq!(history.len(), 3);
}

#[test_case(PartitionMode::Individual ; "individual")]
#[test_case(PartitionMode::ByGroup ; "by group")]
#[test_case(PartitionMode::TopLevelWithChildren ; "top level with children")]
#[tokio::test]
async fn test_unit_count_matches_partition(mode: PartitionMode) {
    let scene = workshop_scene();
    let selection = ids(&["Chair", "Table", "Robot", "Arm", "Claw"]);
    let settings = ExportSettings::default();
    let expected = partition(&scene, &selection, mode, &settings).unwrap();

    let uploader = Arc::new(LocalUploader {
        reject: ["Table".to_string(), "Furniture".to_string()].into(),
        ..Default::default()
    });
    let report = orchestrator(uploader)
        .run_batch(&scene, &selection, mode, &settings, &mut UploadHistory::new())
        .await
        .unwrap();

    assert_eq!(report.total_units(), expected.len());
    let mut reported: Vec<&str> = report
        .succeeded
        .iter()
        .map(|i| i.unit_name.as_str())
        .chain(report.failed.iter().map(|f| f.unit_name.as_str()))
        .collect();
    let mut partitioned: Vec<&str> = expected.iter().map(|u| u.unit_name.as_str()).collect();
    reported.sort_unstable();
    partitioned.sort_unstable();
    assert_eq!(reported, partitioned);
}

#[tokio::test]
async fn test_retry_failed_units_only() {
    let scene = workshop_scene();
    let selection = ids(&["Chair", "Table", "Robot"]);
    let settings = ExportSettings::default();
    let mut history = UploadHistory::new();

    let flaky = Arc::new(LocalUploader {
        reject: ["Table".to_string()].into(),
        ..Default::default()
    });
    let first = orchestrator(flaky)
        .run_batch(
            &scene,
            &selection,
            PartitionMode::Individual,
            &settings,
            &mut history,
        )
        .await
        .unwrap();
    assert_eq!(first.failed_unit_names(), vec!["Table"]);
    assert_eq!(first.failed[0].kind, ErrorKind::BackendProtocol);

    let healthy = Arc::new(LocalUploader::default());
    let retry = orchestrator(healthy.clone())
        .retry_failed(&first, &scene, &selection, &settings, &mut history)
        .await
        .unwrap();

    assert_eq!(*healthy.uploaded.lock().unwrap(), vec!["Table".to_string()]);
    assert!(retry.is_successful());
    assert_eq!(retry.mode, PartitionMode::Individual);
    assert_ne!(retry.run_id, first.run_id);
    assert_eq!(history.len(), 4);
    assert_eq!(history.recent(1)[0].unit_name, "Table");
    assert_eq!(history.recent(1)[0].status, UploadStatus::Success);
}

#[tokio::test]
async fn test_history_log_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("history.jsonl");
    let mut history = UploadHistory::with_log(&log_path);

    let uploader = Arc::new(LocalUploader {
        reject: ["Robot".to_string()].into(),
        ..Default::default()
    });
    orchestrator(uploader)
        .run_batch(
            &workshop_scene(),
            &ids(&["Chair", "Robot"]),
            PartitionMode::Individual,
            &ExportSettings::default(),
            &mut history,
        )
        .await
        .unwrap();

    let loaded = UploadHistory::load_log(&log_path).unwrap();
    assert_eq!(loaded, history.items());
    assert_eq!(loaded[0].status, UploadStatus::Success);
    assert_eq!(loaded[1].status, UploadStatus::Failed);
    assert!(loaded[1]
        .error_message
        .as_deref()
        .unwrap()
        .contains("unexpected response shape"));

    history.clear();
    assert!(history.is_empty());
    assert_eq!(UploadHistory::load_log(&log_path).unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_object_aborts_batch() {
    let uploader = Arc::new(LocalUploader::default());
    let result = orchestrator(uploader.clone())
        .run_batch(
            &workshop_scene(),
            &ids(&["Chair", "Ghost"]),
            PartitionMode::Individual,
            &ExportSettings::default(),
            &mut UploadHistory::new(),
        )
        .await;

    match result {
        Err(e) => assert!(e.aborts_batch()),
        Ok(_) => panic!("expected the batch to abort"),
    }
    assert!(uploader.uploaded.lock().unwrap().is_empty());
}
