//! Shared lane-context store.
//!
//! Steps of one lane run publish values here for later steps. The upload
//! action only reads the changelog key.

use std::collections::HashMap;
use std::sync::Mutex;

/// Well-known keys of the lane context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SharedValue {
    /// Changelog generated by an earlier step (e.g. from git commits)
    Changelog,
}

impl SharedValue {
    pub fn as_key(self) -> &'static str {
        match self {
            SharedValue::Changelog => "FL_CHANGELOG",
        }
    }
}

/// Key-value state shared between the steps of a single lane run.
#[derive(Debug, Default)]
pub struct LaneContext {
    values: Mutex<HashMap<SharedValue, String>>,
}

impl LaneContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a value for later steps, replacing any previous one.
    pub fn set(&self, key: SharedValue, value: impl Into<String>) {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key, value.into());
    }

    pub fn get(&self, key: SharedValue) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(&key).cloned()
    }

    /// The changelog published by an earlier step, if any.
    pub fn changelog(&self) -> Option<String> {
        self.get(SharedValue::Changelog)
    }
}
