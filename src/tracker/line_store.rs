//! Current-line store
//!
//! Holds the latest known line per (player, stat type, platform). The
//! single mutator returns the line it replaced so callers can diff
//! without a second lookup.

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::models::{DfsLine, StatKey};

pub struct LineStore {
    current: RwLock<HashMap<StatKey, DfsLine>>,
}

impl LineStore {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(HashMap::new()),
        }
    }

    pub fn get_current(&self, key: &StatKey) -> Option<DfsLine> {
        self.current.read().get(key).cloned()
    }

    /// Replace the current line for a key, returning the line it displaced
    /// (None on first write)
    pub fn set_current(&self, key: StatKey, line: DfsLine) -> Option<DfsLine> {
        self.current.write().insert(key, line)
    }

    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }
}

impl Default for LineStore {
    fn default() -> Self {
        Self::new()
    }
}
