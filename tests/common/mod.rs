#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use picktrack_sync::presentation::dto::capture::CaptureScanRequest;
use picktrack_sync::{
    AppConfig, AppState, AttendanceEntry, BackendGateway, Credentials, FailureReason,
    GatewayError, PickerId, QueueRecord, RecordId, SecureStorage, Session, SubmitAck,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub enum SubmitOutcome {
    Commit,
    AlreadyCommitted,
    Reject(FailureReason),
    Transient,
    SessionExpired,
}

/// Scriptable backend double: pops one outcome per submission, commits by
/// default, and records the order scans arrive in.
pub struct MockBackend {
    script: Mutex<VecDeque<SubmitOutcome>>,
    submitted: Mutex<Vec<RecordId>>,
    attendance: Mutex<Vec<AttendanceEntry>>,
    seed_fails: AtomicBool,
    reauth_succeeds: AtomicBool,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            submitted: Mutex::new(Vec::new()),
            attendance: Mutex::new(Vec::new()),
            seed_fails: AtomicBool::new(false),
            reauth_succeeds: AtomicBool::new(true),
        })
    }

    pub fn with_attendance(entries: Vec<AttendanceEntry>) -> Arc<Self> {
        let backend = Self::new();
        *backend.attendance.lock().unwrap() = entries;
        backend
    }

    pub fn script(&self, outcomes: Vec<SubmitOutcome>) {
        *self.script.lock().unwrap() = outcomes.into();
    }

    pub fn submitted_ids(&self) -> Vec<RecordId> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn set_seed_fails(&self, fails: bool) {
        self.seed_fails.store(fails, Ordering::SeqCst);
    }

    pub fn set_reauth_succeeds(&self, succeeds: bool) {
        self.reauth_succeeds.store(succeeds, Ordering::SeqCst);
    }
}

#[async_trait]
impl BackendGateway for MockBackend {
    async fn submit_scan(&self, record: &QueueRecord) -> Result<SubmitAck, GatewayError> {
        self.submitted.lock().unwrap().push(record.id.clone());
        match self.script.lock().unwrap().pop_front() {
            None | Some(SubmitOutcome::Commit) => Ok(SubmitAck::Committed),
            Some(SubmitOutcome::AlreadyCommitted) => Ok(SubmitAck::AlreadyCommitted),
            Some(SubmitOutcome::Reject(reason)) => Err(GatewayError::Rejected(reason)),
            Some(SubmitOutcome::Transient) => {
                Err(GatewayError::Transient("connection reset".into()))
            }
            Some(SubmitOutcome::SessionExpired) => Err(GatewayError::SessionExpired),
        }
    }

    async fn fetch_attendance(&self) -> Result<Vec<AttendanceEntry>, GatewayError> {
        if self.seed_fails.load(Ordering::SeqCst) {
            return Err(GatewayError::Transient("offline at cold start".into()));
        }
        Ok(self.attendance.lock().unwrap().clone())
    }

    async fn reauthenticate(
        &self,
        _credentials: &Credentials,
    ) -> Result<Session, GatewayError> {
        if self.reauth_succeeds.load(Ordering::SeqCst) {
            Ok(Session::new("token-renewed".into(), None))
        } else {
            Err(GatewayError::AuthRejected("invalid credentials".into()))
        }
    }
}

#[derive(Default)]
pub struct MemorySecureStorage {
    values: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl SecureStorage for MemorySecureStorage {
    async fn store(
        &self,
        key: &str,
        value: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn retrieve(
        &self,
        key: &str,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.values.lock().unwrap().contains_key(key))
    }
}

pub fn test_config(dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.data_dir = dir.path().to_string_lossy().to_string();
    // Deterministic tests: no timer loop, no reconnect jitter.
    config.sync.auto_sync = false;
    config.sync.reconnect_jitter_max_ms = 0;
    config
}

pub async fn build_engine(backend: Arc<MockBackend>, dir: &TempDir) -> AppState {
    AppState::new(
        test_config(dir),
        backend,
        None,
        Arc::new(MemorySecureStorage::default()),
    )
    .await
    .expect("engine init")
}

pub fn checked_in(picker: &str) -> AttendanceEntry {
    AttendanceEntry::new(PickerId::new(picker.into()).unwrap(), true, Utc::now())
}

pub fn capture_request(picker: &str, bucket: &str) -> CaptureScanRequest {
    CaptureScanRequest {
        picker_id: picker.to_string(),
        bucket_id: bucket.to_string(),
        kind: "pick".to_string(),
        scanned_at: None,
        client_id: None,
    }
}
