//! Where user-facing status messages go.

use std::sync::{Arc, Mutex, PoisonError};

/// Receives the current status line ("Drawing done...", "New crop: ...").
pub trait StatusSink: Send {
    fn set_status(&mut self, message: &str);
}

/// Writes status messages to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatus;

impl StatusSink for LogStatus {
    fn set_status(&mut self, message: &str) {
        log::info!("{}", message);
    }
}

/// Keeps every message; clones share the same history.
#[derive(Debug, Default, Clone)]
pub struct RecordingStatus {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StatusSink for RecordingStatus {
    fn set_status(&mut self, message: &str) {
        log::debug!("status: {}", message);
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}
