use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub auto_sync: bool,
    /// Interval of the periodic drain trigger, in seconds.
    pub sync_interval: u64,
    /// Ceiling of the reconnect jitter window, in milliseconds.
    pub reconnect_jitter_max_ms: u64,
    /// Transient attempts before a record is quarantined. `None` retries forever.
    pub max_attempts: Option<u32>,
    /// Synced records older than this are purged from the audit trail, in seconds.
    pub synced_retention: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/picktrack.db".to_string(),
                max_connections: 5,
                connection_timeout: 30,
            },
            sync: SyncConfig {
                auto_sync: true,
                sync_interval: 300, // 5 minutes
                reconnect_jitter_max_ms: 30_000,
                max_attempts: None,
                synced_retention: 7 * 24 * 3600, // one week of audit trail
            },
            storage: StorageConfig {
                data_dir: default_data_dir(),
            },
        }
    }
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|dir| dir.join("picktrack"))
        .unwrap_or_else(|| PathBuf::from("./data"))
        .to_string_lossy()
        .to_string()
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("PICKTRACK_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v;
            }
        }
        if let Ok(v) = std::env::var("PICKTRACK_DATA_DIR") {
            if !v.trim().is_empty() {
                cfg.storage.data_dir = v;
            }
        }
        if let Ok(v) = std::env::var("PICKTRACK_AUTO_SYNC") {
            cfg.sync.auto_sync = parse_bool(&v, cfg.sync.auto_sync);
        }
        if let Ok(v) = std::env::var("PICKTRACK_SYNC_INTERVAL") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.sync_interval = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("PICKTRACK_SYNC_JITTER_MAX_MS") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.reconnect_jitter_max_ms = value;
            }
        }
        if let Ok(v) = std::env::var("PICKTRACK_SYNC_MAX_ATTEMPTS") {
            if let Some(value) = parse_u64(&v) {
                // 0 keeps the unlimited default
                cfg.sync.max_attempts = if value == 0 {
                    None
                } else {
                    Some(value.min(u32::MAX as u64) as u32)
                };
            }
        }
        if let Ok(v) = std::env::var("PICKTRACK_SYNCED_RETENTION") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.synced_retention = value;
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.database.url.trim().is_empty() {
            return Err("Database url must not be empty".to_string());
        }
        if self.sync.sync_interval == 0 {
            return Err("Sync sync_interval must be greater than 0".to_string());
        }
        if let Some(max) = self.sync.max_attempts {
            if max == 0 {
                return Err("Sync max_attempts must be greater than 0 when set".to_string());
            }
        }
        Ok(())
    }
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}
