//! Test helper utilities
//!
//! Shared fixtures for vsd-engine integration tests: scratch databases, a
//! classifier scripted by frame content, and spool/image file builders.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
use tempfile::TempDir;

use vsd_common::hub::{AlertHub, DEFAULT_QUEUE_DEPTH};
use vsd_common::{Error, Result};
use vsd_engine::capture::FsCaptureSource;
use vsd_engine::classify::FrameClassifier;
use vsd_engine::db::init_database;
use vsd_engine::evidence::EvidenceStore;
use vsd_engine::jobs::JobEngine;
use vsd_engine::models::{CapturedFrame, ClassifierOutput, Detection};
use vsd_engine::monitor::MonitorRegistry;
use vsd_engine::{build_router, AppState};

/// Frame content markers interpreted by [`ScriptedClassifier`]
pub const SMOKE_MARKER: &[u8] = b"SMOKE";
pub const VAPE_MARKER: &[u8] = b"VAPE";
pub const FAIL_MARKER: &[u8] = b"FAIL";

/// Classifier whose verdict is scripted by the frame bytes themselves
///
/// Frames starting with `SMOKE` or `VAPE` yield one matching detection,
/// frames starting with `FAIL` yield a classifier error, anything else is
/// clean. Tests pick per-item behavior by writing the marker into the file
/// the item reads.
#[derive(Debug, Clone, Default)]
pub struct ScriptedClassifier;

#[async_trait]
impl FrameClassifier for ScriptedClassifier {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn classify(
        &self,
        frame: &CapturedFrame,
        confidence_threshold: f32,
    ) -> Result<ClassifierOutput> {
        if frame.bytes.starts_with(FAIL_MARKER) {
            return Err(Error::Classifier("scripted failure".to_string()));
        }

        let mut detections = Vec::new();
        if frame.bytes.starts_with(SMOKE_MARKER) {
            detections.push(Detection::new("cigarette", 0.9, [10, 10, 60, 40]));
        } else if frame.bytes.starts_with(VAPE_MARKER) {
            detections.push(Detection::new("vape-pen", 0.8, [5, 5, 30, 30]));
        }
        detections.retain(|d| d.confidence >= f64::from(confidence_threshold));

        Ok(ClassifierOutput { detections })
    }
}

/// Scratch database under a temp dir
///
/// The TempDir must stay alive for the duration of the test.
pub async fn test_pool() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let pool = init_database(&dir.path().join("test.db"))
        .await
        .expect("Failed to initialize test database");
    (dir, pool)
}

/// Write an image file whose bytes script the classifier
pub fn write_image(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create image dir");
    }
    std::fs::write(&path, content).expect("Failed to write image file");
    path
}

/// Fully wired application for router-level tests
///
/// Uses the scripted classifier and a filesystem capture source rooted in
/// the temp dir; drop the struct and everything on disk goes away.
pub struct TestApp {
    pub app: axum::Router,
    pub pool: SqlitePool,
    pub hub: AlertHub,
    pub data_dir: PathBuf,
    pub capture_dir: PathBuf,
    _dir: TempDir,
}

pub async fn test_app() -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = dir.path().to_path_buf();
    let capture_dir = data_dir.join("spool");
    std::fs::create_dir_all(&capture_dir).expect("Failed to create spool dir");

    let pool = init_database(&data_dir.join("test.db"))
        .await
        .expect("Failed to initialize test database");
    let hub = AlertHub::new(DEFAULT_QUEUE_DEPTH);

    let classifier: Arc<dyn FrameClassifier> = Arc::new(ScriptedClassifier);
    let capture = Arc::new(FsCaptureSource::new(&capture_dir));
    let evidence = Arc::new(EvidenceStore::new(data_dir.join("evidence")));

    let registry = Arc::new(MonitorRegistry::new(
        Arc::clone(&classifier),
        capture,
        evidence,
        hub.clone(),
        pool.clone(),
    ));
    let jobs = Arc::new(JobEngine::new(pool.clone(), Arc::clone(&classifier)));

    let state = AppState::new(pool.clone(), hub.clone(), registry, jobs, classifier);

    TestApp {
        app: build_router(state),
        pool,
        hub,
        data_dir,
        capture_dir,
        _dir: dir,
    }
}
