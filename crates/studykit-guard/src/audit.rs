//! Audit logging for Guard

use crate::config::AuditConfig;
use crate::types::{AuditEntry, AuditResult, GuardContext};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Audit logger
pub struct AuditLogger {
    config: AuditConfig,
    sink: Option<Arc<FileSink>>,
}

/// JSON-lines file the audit entries are appended to
struct FileSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSink {
    fn append(&self, line: &str) {
        // Serializes appends from concurrent blocking tasks
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let written = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| writeln!(f, "{line}"));
        if let Err(e) = written {
            warn!(path = %self.path.display(), error = %e, "Failed to append audit entry");
        }
    }
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(config: AuditConfig) -> Self {
        let sink = config.log_file.clone().map(|path| {
            Arc::new(FileSink {
                path,
                lock: Mutex::new(()),
            })
        });
        Self { config, sink }
    }

    /// Log an admission decision
    pub fn log(
        &self,
        context: &GuardContext,
        content: &str,
        output_chars: usize,
        result: AuditResult,
        duration_us: u64,
    ) {
        if !self.config.enabled {
            return;
        }

        let entry = AuditEntry {
            context: context.clone(),
            content_hash: hash_content(content),
            input_chars: content.chars().count(),
            output_chars,
            result,
            processing_time_us: duration_us,
        };

        self.emit(&entry, content);
    }

    /// Emit an audit entry
    fn emit(&self, entry: &AuditEntry, content: &str) {
        let content_field = if self.config.log_content {
            Some(truncate(content, 500))
        } else {
            None
        };

        match &entry.result {
            AuditResult::Rejected { stage, reason } => warn!(
                request_id = %entry.context.request_id,
                source = ?entry.context.source,
                content_hash = %entry.content_hash,
                input_chars = entry.input_chars,
                stage = ?stage,
                reason = %reason,
                content = ?content_field,
                "Content rejected"
            ),
            result => info!(
                request_id = %entry.context.request_id,
                source = ?entry.context.source,
                content_hash = %entry.content_hash,
                input_chars = entry.input_chars,
                output_chars = entry.output_chars,
                result = ?result,
                processing_time_us = entry.processing_time_us,
                content = ?content_field,
                "Content admitted"
            ),
        }

        if let Some(sink) = &self.sink {
            match serde_json::to_string(entry) {
                Ok(json) => write_entry(sink, json),
                Err(e) => warn!(error = %e, "Failed to serialize audit entry"),
            }
        }
    }
}

/// Append on the blocking pool when called from async code, inline otherwise
fn write_entry(sink: &Arc<FileSink>, line: String) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            let sink = Arc::clone(sink);
            handle.spawn_blocking(move || sink.append(&line));
        }
        Err(_) => sink.append(&line),
    }
}

/// SHA-256 of the content, hex encoded
fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Truncate to at most `max_chars` characters for logging
fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
