// src/application/in_flight.rs
use crate::domain::DomainError;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Rejects a second submission of the same logical action while the first is running.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    active: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, key: impl Into<String>) -> Result<InFlightGuard, DomainError> {
        let key = key.into();
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if !active.insert(key.clone()) {
            debug!(%key, "Rejecting duplicate submission");
            return Err(DomainError::Busy(key));
        }
        Ok(InFlightGuard {
            key,
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(key)
    }
}

/// Releases its action key on drop, whatever the outcome of the action.
#[derive(Debug)]
pub struct InFlightGuard {
    key: String,
    active: Arc<Mutex<HashSet<String>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}
