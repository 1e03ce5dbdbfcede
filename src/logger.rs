//! Logging collaborator
//!
//! Warnings about dropped attributes and the default error hooks go through a
//! [`Logger`] owned by the host. [`TracingLogger`] is the production
//! implementation; [`RecordingLogger`] keeps messages in memory.

use std::sync::Mutex;

/// Sink for non-fatal notices and forwarded lifecycle errors
pub trait Logger: Send + Sync {
    /// Report a non-fatal notice
    fn warn(&self, message: &str);

    /// Report an error forwarded from an error-class lifecycle hook
    fn error(&self, message: &str);
}

/// Logger that forwards to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn warn(&self, message: &str) {
        tracing::warn!(target: "mfe_options", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "mfe_options", "{}", message);
    }
}

/// Logger that records every message, in order
#[derive(Debug, Default)]
pub struct RecordingLogger {
    warnings: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Warnings recorded so far
    pub fn warnings(&self) -> Vec<String> {
        self.warnings
            .lock()
            .map(|w| w.clone())
            .unwrap_or_default()
    }

    /// Errors recorded so far
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl Logger for RecordingLogger {
    fn warn(&self, message: &str) {
        if let Ok(mut warnings) = self.warnings.lock() {
            warnings.push(message.to_string());
        }
    }

    fn error(&self, message: &str) {
        if let Ok(mut errors) = self.errors.lock() {
            errors.push(message.to_string());
        }
    }
}
