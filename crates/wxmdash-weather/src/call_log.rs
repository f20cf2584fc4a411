//! Rolling diagnostic log of outbound API calls.
//!
//! A capped in-memory ring, shared by handle: both HTTP clients receive one
//! at construction instead of reaching through a global recorder. Entries
//! are session-only and never persisted.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Maximum number of retained entries; the oldest is evicted on overflow.
pub const CALL_LOG_CAPACITY: usize = 50;

/// One recorded outbound call.
#[derive(Debug, Clone)]
pub struct CallLogEntry {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub url: String,
    pub status: Option<u16>,
    pub duration: Option<Duration>,
    /// Query parameters, with credential-like values masked.
    pub params: Vec<(String, String)>,
}

/// Shared handle the clients record through.
pub type CallLogHandle = Arc<Mutex<CallLog>>;

pub fn new_call_log() -> CallLogHandle {
    Arc::new(Mutex::new(CallLog::default()))
}

#[derive(Debug, Default)]
pub struct CallLog {
    next_id: u64,
    entries: VecDeque<CallLogEntry>,
}

impl CallLog {
    /// Record the start of a request. Returns the entry id so the caller
    /// can fill in status and duration once the response arrives.
    pub fn record_request(&mut self, method: &str, url: &str, params: &[(&str, String)]) -> u64 {
        self.next_id += 1;
        let id = self.next_id;

        let masked = params
            .iter()
            .map(|(key, value)| ((*key).to_string(), mask_value(key, value)))
            .collect();

        self.entries.push_back(CallLogEntry {
            id,
            timestamp: Utc::now(),
            method: method.to_string(),
            url: url.to_string(),
            status: None,
            duration: None,
            params: masked,
        });

        while self.entries.len() > CALL_LOG_CAPACITY {
            self.entries.pop_front();
        }

        id
    }

    /// Attach the outcome to a previously recorded request. A transport
    /// failure is recorded with `status: None`. Missing ids (already
    /// evicted) are ignored.
    pub fn record_completion(&mut self, id: u64, status: Option<u16>, duration: Duration) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.status = status;
            entry.duration = Some(duration);
        }
    }

    /// Entries newest-first, for display.
    pub fn entries(&self) -> impl Iterator<Item = &CallLogEntry> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn mask_value(key: &str, value: &str) -> String {
    let lowered = key.to_ascii_lowercase();
    if lowered.contains("key") || lowered.contains("token") {
        "****".to_string()
    } else {
        value.to_string()
    }
}
