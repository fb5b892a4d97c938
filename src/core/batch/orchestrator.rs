//! Batch orchestrator
//!
//! Runs every partitioned unit through validate, export, size check and
//! upload, one unit at a time. A unit failure is recorded and the batch moves
//! on; only configuration, empty-selection and scene-graph errors abort the
//! run before the first unit.

use super::partition::{partition, ExportUnit, PartitionMode};
use super::report::{BatchReport, UnitFailure, UnitWarnings};
use crate::adapters::{create_uploader, UploadRequest, UploadResult, Uploader};
use crate::config::LiftConfig;
use crate::core::export::{Encoder, ExportSettings, Exporter};
use crate::core::history::{HistoryItem, UploadHistory};
use crate::core::transform;
use crate::core::validation::{self, ValidationLimits};
use crate::domain::{LiftError, ObjectId, Result, Scene, SceneObject};
use crate::{log_batch_complete, log_unit_failure, log_unit_start};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Drives export units through the pipeline
pub struct BatchOrchestrator {
    exporter: Exporter,
    uploader: Arc<dyn Uploader>,
    limits: ValidationLimits,
    auto_copy: bool,
    shutdown_signal: Option<watch::Receiver<bool>>,
}

impl BatchOrchestrator {
    pub fn new(exporter: Exporter, uploader: Arc<dyn Uploader>, limits: ValidationLimits) -> Self {
        Self {
            exporter,
            uploader,
            limits,
            auto_copy: true,
            shutdown_signal: None,
        }
    }

    /// Wire the orchestrator from a loaded configuration
    ///
    /// # Errors
    ///
    /// Returns [`LiftError::Configuration`] when the selected backend cannot be
    /// constructed.
    pub fn from_config(config: &LiftConfig, encoder: Arc<dyn Encoder>) -> Result<Self> {
        let uploader = create_uploader(config)?;
        Ok(Self::new(
            Exporter::new(encoder),
            uploader,
            ValidationLimits::from_config(&config.limits),
        )
        .with_auto_copy(config.export.auto_copy_result))
    }

    pub fn with_auto_copy(mut self, auto_copy: bool) -> Self {
        self.auto_copy = auto_copy;
        self
    }

    /// Cancel remaining units once the signal reads `true`
    pub fn with_shutdown(mut self, shutdown_signal: watch::Receiver<bool>) -> Self {
        self.shutdown_signal = Some(shutdown_signal);
        self
    }

    pub fn uploader(&self) -> &Arc<dyn Uploader> {
        &self.uploader
    }

    /// Partition `selection` and run every unit
    ///
    /// Each unit outcome is recorded in `history` as it completes.
    ///
    /// # Errors
    ///
    /// Fails without a report on invalid settings, an empty selection or an
    /// inconsistent scene graph. Per-unit errors are in the report instead.
    pub async fn run_batch(
        &self,
        scene: &Scene,
        selection: &[ObjectId],
        mode: PartitionMode,
        settings: &ExportSettings,
        history: &mut UploadHistory,
    ) -> Result<BatchReport> {
        let units = settings
            .validate()
            .and_then(|()| partition(scene, selection, mode, settings))
            .map_err(|e| aborted(mode, e))?;
        Ok(self.run_units(scene, units, mode, history).await)
    }

    /// Run again only the units that failed in `previous`
    ///
    /// The selection is re-partitioned with the previous mode, so scene edits
    /// made since then are picked up. A report without failures yields an empty
    /// report.
    pub async fn retry_failed(
        &self,
        previous: &BatchReport,
        scene: &Scene,
        selection: &[ObjectId],
        settings: &ExportSettings,
        history: &mut UploadHistory,
    ) -> Result<BatchReport> {
        if previous.failed.is_empty() {
            return Ok(BatchReport::new(previous.mode));
        }

        let failed: HashSet<&str> = previous.failed_unit_names().into_iter().collect();
        let units: Vec<ExportUnit> = settings
            .validate()
            .and_then(|()| partition(scene, selection, previous.mode, settings))
            .map_err(|e| aborted(previous.mode, e))?
            .into_iter()
            .filter(|unit| failed.contains(unit.unit_name.as_str()))
            .collect();

        tracing::info!(
            previous_run_id = %previous.run_id,
            units = units.len(),
            "Retrying failed units"
        );

        Ok(self.run_units(scene, units, previous.mode, history).await)
    }

    async fn run_units(
        &self,
        scene: &Scene,
        units: Vec<ExportUnit>,
        mode: PartitionMode,
        history: &mut UploadHistory,
    ) -> BatchReport {
        let started = Instant::now();
        let mut report = BatchReport::new(mode);
        let total = units.len();

        tracing::info!(
            run_id = %report.run_id,
            mode = %mode,
            units = total,
            backend = ?self.uploader.backend(),
            "Starting batch"
        );

        for (index, unit) in units.iter().enumerate() {
            if !report.cancelled && self.is_cancelled() {
                tracing::warn!(
                    run_id = %report.run_id,
                    remaining = total - index,
                    "Batch cancelled, skipping remaining units"
                );
                report.cancelled = true;
            }

            if report.cancelled {
                let error = LiftError::Cancelled;
                record(history, &mut report, HistoryItem::failure(&unit.unit_name, &error));
                report.failed.push(UnitFailure::new(&unit.unit_name, &error));
                continue;
            }

            log_unit_start!(unit.unit_name, index + 1, total);

            let mut warnings = Vec::new();
            match self.process_unit(scene, unit, &mut warnings).await {
                Ok(result) => {
                    tracing::info!(
                        run_id = %report.run_id,
                        unit = %unit.unit_name,
                        reference_id = %result.reference_id,
                        "Unit uploaded"
                    );
                    let item = HistoryItem::success(&unit.unit_name, &result);
                    record(history, &mut report, item.clone());
                    report.succeeded.push(item);
                }
                Err(e) => {
                    log_unit_failure!(unit.unit_name, &e);
                    record(history, &mut report, HistoryItem::failure(&unit.unit_name, &e));
                    report.failed.push(UnitFailure::new(&unit.unit_name, &e));
                }
            }

            if !warnings.is_empty() {
                report.warnings.push(UnitWarnings {
                    unit_name: unit.unit_name.clone(),
                    warnings,
                });
            }
        }

        if self.auto_copy {
            report.clipboard = report.clipboard_text();
        }
        report.duration = started.elapsed();

        log_batch_complete!(
            report.run_id,
            report.succeeded.len(),
            report.failed.len(),
            report.success_rate(),
            report.duration
        );
        report
    }

    async fn process_unit(
        &self,
        scene: &Scene,
        unit: &ExportUnit,
        warnings: &mut Vec<String>,
    ) -> Result<UploadResult> {
        let members = unit
            .members
            .iter()
            .map(|id| scene.resolve(id))
            .collect::<Result<Vec<&SceneObject>>>()?;

        let checked = validation::validate(&members, &unit.export_settings, &self.limits)?;
        warnings.extend(checked.warnings.iter().cloned());
        let checked = checked.into_result()?;

        tracing::debug!(
            unit = %unit.unit_name,
            triangles = checked.estimated_triangle_count,
            estimated_size = %validation::format_size(checked.estimated_file_size_bytes),
            "Validation passed"
        );

        let bytes = self
            .exporter
            .export(&unit.unit_name, &members, &unit.export_settings)?;
        self.limits.check_actual_size(bytes.len())?;

        // Representative object: the unit's first member
        let transform = members
            .first()
            .map(|obj| transform::extract(obj))
            .unwrap_or_default();

        self.uploader
            .upload(UploadRequest {
                bytes: &bytes,
                unit_name: &unit.unit_name,
                transform: &transform,
            })
            .await
    }

    fn is_cancelled(&self) -> bool {
        self.shutdown_signal
            .as_ref()
            .map(|rx| *rx.borrow())
            .unwrap_or(false)
    }
}

fn aborted(mode: PartitionMode, error: LiftError) -> LiftError {
    debug_assert!(error.aborts_batch(), "per-unit error raised before the first unit");
    tracing::error!(
        mode = %mode,
        kind = ?error.kind(),
        error = %error,
        "Batch aborted before any unit started"
    );
    error
}

/// Keeps the item in memory even when the log write fails; the first log
/// error is surfaced on the report
fn record(history: &mut UploadHistory, report: &mut BatchReport, item: HistoryItem) {
    if let Err(e) = history.record(item) {
        tracing::warn!(run_id = %report.run_id, error = %e, "Failed to append to history log");
        report.history_log_error.get_or_insert_with(|| e.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendTarget;
    use crate::core::export::EncoderParams;
    use crate::core::transform::TransformData;
    use crate::domain::ErrorKind;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    struct GlbEncoder;

    impl Encoder for GlbEncoder {
        fn encode(
            &self,
            objects: &[&SceneObject],
            params: &EncoderParams,
        ) -> std::result::Result<(), String> {
            let path = params
                .get("filepath")
                .and_then(|v| v.as_str())
                .ok_or("missing filepath")?;
            let mut body = b"glTF".to_vec();
            for obj in objects {
                body.extend_from_slice(obj.name.as_bytes());
            }
            std::fs::write(path, body).map_err(|e| e.to_string())
        }
    }

    #[derive(Default)]
    struct RecordingUploader {
        calls: Mutex<Vec<(String, TransformData)>>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl Uploader for RecordingUploader {
        fn backend(&self) -> BackendTarget {
            BackendTarget::Direct
        }

        async fn probe(&self) -> Result<()> {
            Ok(())
        }

        async fn upload(&self, request: UploadRequest<'_>) -> Result<UploadResult> {
            self.calls
                .lock()
                .unwrap()
                .push((request.unit_name.to_string(), *request.transform));
            if self.fail_on.as_deref() == Some(request.unit_name) {
                return Err(LiftError::Network("connection reset".to_string()));
            }
            Ok(UploadResult {
                reference_id: format!("ref-{}", request.unit_name),
                location_url: None,
                backend_metadata: BTreeMap::new(),
            })
        }
    }

    fn id(s: &str) -> ObjectId {
        ObjectId::new(s).unwrap()
    }

    fn scene() -> Scene {
        Scene::from_objects([
            SceneObject::mesh("Chair", 100, 50).unwrap(),
            SceneObject::mesh("Table", 100, 50).unwrap(),
            SceneObject::mesh("Lamp", 100, 50).unwrap(),
        ])
        .unwrap()
    }

    fn orchestrator(uploader: Arc<RecordingUploader>) -> BatchOrchestrator {
        BatchOrchestrator::new(
            Exporter::new(Arc::new(GlbEncoder)),
            uploader,
            ValidationLimits::default(),
        )
    }

    #[tokio::test]
    async fn test_every_unit_reported_once() {
        let uploader = Arc::new(RecordingUploader {
            fail_on: Some("Table".to_string()),
            ..Default::default()
        });
        let mut history = UploadHistory::new();
        let report = orchestrator(uploader.clone())
            .run_batch(
                &scene(),
                &[id("Chair"), id("Table"), id("Lamp")],
                PartitionMode::Individual,
                &ExportSettings::default(),
                &mut history,
            )
            .await
            .unwrap();

        assert_eq!(report.total_units(), 3);
        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(report.failed_unit_names(), vec!["Table"]);
        assert_eq!(report.failed[0].kind, ErrorKind::Network);
        assert_eq!(history.len(), 3);
        assert_eq!(uploader.calls.lock().unwrap().len(), 3);
        assert_eq!(
            report.clipboard.as_deref(),
            Some("Chair: ref-Chair\nLamp: ref-Lamp")
        );
    }

    #[tokio::test]
    async fn test_history_log_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = UploadHistory::with_log(dir.path());
        let report = orchestrator(Arc::new(RecordingUploader::default()))
            .run_batch(
                &scene(),
                &[id("Chair"), id("Table")],
                PartitionMode::Individual,
                &ExportSettings::default(),
                &mut history,
            )
            .await
            .unwrap();

        assert!(report.is_successful());
        assert!(report.history_log_error.is_some());
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn test_history_log_error_unset_without_log() {
        let report = orchestrator(Arc::new(RecordingUploader::default()))
            .run_batch(
                &scene(),
                &[id("Chair")],
                PartitionMode::Individual,
                &ExportSettings::default(),
                &mut UploadHistory::new(),
            )
            .await
            .unwrap();
        assert!(report.history_log_error.is_none());
    }

    #[tokio::test]
    async fn test_invalid_settings_fail_fast() {
        let uploader = Arc::new(RecordingUploader::default());
        let settings = ExportSettings {
            compression_level: 11,
            ..ExportSettings::default()
        };
        let result = orchestrator(uploader.clone())
            .run_batch(
                &scene(),
                &[id("Chair")],
                PartitionMode::Individual,
                &settings,
                &mut UploadHistory::new(),
            )
            .await;

        assert!(matches!(result, Err(LiftError::Configuration(_))));
        assert!(uploader.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pre_cancelled_batch_records_every_unit() {
        let uploader = Arc::new(RecordingUploader::default());
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        let mut history = UploadHistory::new();

        let report = orchestrator(uploader.clone())
            .with_shutdown(rx)
            .run_batch(
                &scene(),
                &[id("Chair"), id("Table")],
                PartitionMode::Individual,
                &ExportSettings::default(),
                &mut history,
            )
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.failed.len(), 2);
        assert!(report.failed.iter().all(|f| f.kind == ErrorKind::Cancelled));
        assert!(uploader.calls.lock().unwrap().is_empty());
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn test_auto_copy_disabled() {
        let uploader = Arc::new(RecordingUploader::default());
        let report = orchestrator(uploader)
            .with_auto_copy(false)
            .run_batch(
                &scene(),
                &[id("Chair")],
                PartitionMode::Individual,
                &ExportSettings::default(),
                &mut UploadHistory::new(),
            )
            .await
            .unwrap();

        assert!(report.clipboard.is_none());
        assert_eq!(report.clipboard_text().as_deref(), Some("ref-Chair"));
    }

    #[tokio::test]
    async fn test_retry_runs_only_failed_units() {
        let failing = Arc::new(RecordingUploader {
            fail_on: Some("Lamp".to_string()),
            ..Default::default()
        });
        let selection = [id("Chair"), id("Lamp")];
        let mut history = UploadHistory::new();
        let first = orchestrator(failing)
            .run_batch(
                &scene(),
                &selection,
                PartitionMode::Individual,
                &ExportSettings::default(),
                &mut history,
            )
            .await
            .unwrap();
        assert_eq!(first.failed_unit_names(), vec!["Lamp"]);

        let healthy = Arc::new(RecordingUploader::default());
        let retry = orchestrator(healthy.clone())
            .retry_failed(
                &first,
                &scene(),
                &selection,
                &ExportSettings::default(),
                &mut history,
            )
            .await
            .unwrap();

        assert_eq!(retry.total_units(), 1);
        assert_eq!(retry.succeeded[0].unit_name, "Lamp");
        assert_eq!(healthy.calls.lock().unwrap()[0].0, "Lamp");
        assert_eq!(history.len(), 3);
    }

    #[tokio::test]
    async fn test_retry_without_failures_is_empty() {
        let uploader = Arc::new(RecordingUploader::default());
        let orchestrator = orchestrator(uploader.clone());
        let mut history = UploadHistory::new();
        let previous = BatchReport::new(PartitionMode::Individual);

        let retry = orchestrator
            .retry_failed(
                &previous,
                &scene(),
                &[id("Chair")],
                &ExportSettings::default(),
                &mut history,
            )
            .await
            .unwrap();

        assert_eq!(retry.total_units(), 0);
        assert!(uploader.calls.lock().unwrap().is_empty());
    }
}
