use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;

use crate::error::UploadError;

const MAX_ENTRIES: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugLogEntry {
    pub timestamp: String,
    pub level: String,
    pub message: String,
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugReport {
    pub generated_at: String,
    pub app_version: String,
    pub os: String,
    pub arch: String,
    pub error_count: usize,
    pub log_entries: Vec<DebugLogEntry>,
}

/// Action log: every entry goes to `tracing` and is kept for the debug report.
pub struct DebugLogger {
    logs: Mutex<Vec<DebugLogEntry>>,
    error_count: Mutex<usize>,
}

impl DebugLogger {
    pub fn new() -> Self {
        Self {
            logs: Mutex::new(Vec::new()),
            error_count: Mutex::new(0),
        }
    }

    pub fn log(&self, level: Level, message: String, context: Option<serde_json::Value>) {
        emit(level, &message, context.as_ref());

        if level == Level::ERROR {
            let mut count = self.error_count.lock().unwrap_or_else(|e| e.into_inner());
            *count += 1;
        }

        let entry = DebugLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            level: level.to_string(),
            message,
            context,
        };

        let mut logs = self.logs.lock().unwrap_or_else(|e| e.into_inner());
        if logs.len() >= MAX_ENTRIES {
            logs.remove(0);
        }
        logs.push(entry);
    }

    pub fn info(&self, message: String) {
        self.log(Level::INFO, message, None);
    }

    pub fn warn(&self, message: String) {
        self.log(Level::WARN, message, None);
    }

    pub fn error(&self, message: String) {
        self.log(Level::ERROR, message, None);
    }

    pub fn debug(&self, message: String) {
        self.log(Level::DEBUG, message, None);
    }

    pub fn get_error_count(&self) -> usize {
        *self.error_count.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn entries(&self) -> Vec<DebugLogEntry> {
        self.logs.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn generate_report(&self) -> DebugReport {
        DebugReport {
            generated_at: Utc::now().to_rfc3339(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            error_count: self.get_error_count(),
            log_entries: self.entries(),
        }
    }

    /// Write the report as `debug_log_<timestamp>.json` into `logs_dir`.
    pub fn save_report_to_file(&self, logs_dir: &Path) -> Result<PathBuf, UploadError> {
        let report = self.generate_report();

        fs::create_dir_all(logs_dir).map_err(|source| UploadError::Io {
            path: logs_dir.to_path_buf(),
            source,
        })?;

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let log_path = logs_dir.join(format!("debug_log_{}.json", timestamp));

        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| UploadError::Config(format!("Failed to serialize report: {}", e)))?;

        fs::write(&log_path, json).map_err(|source| UploadError::Io {
            path: log_path.clone(),
            source,
        })?;

        Ok(log_path)
    }
}

fn emit(level: Level, message: &str, context: Option<&serde_json::Value>) {
    let context = context.map(|c| c.to_string());
    let context = context.as_deref();
    if level == Level::ERROR {
        tracing::error!(context, "{}", message);
    } else if level == Level::WARN {
        tracing::warn!(context, "{}", message);
    } else if level == Level::INFO {
        tracing::info!(context, "{}", message);
    } else {
        tracing::debug!(context, "{}", message);
    }
}

impl Default for DebugLogger {
    fn default() -> Self {
        Self::new()
    }
}
