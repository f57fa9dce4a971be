// In-memory worksheet shared by the integration tests.
#![allow(dead_code)]

use labour_tracker::{SheetError, SheetStore};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Worksheet held in memory, with switches to make calls fail
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<Vec<Vec<String>>>,
    offline: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: Vec<Vec<String>>) -> Self {
        MemoryStore {
            values: RwLock::new(values),
            ..Self::default()
        }
    }

    /// Every call fails while offline
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Only `append_row` and `write_values` fail; reads and `clear` work
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Vec<Vec<String>> {
        self.values.read().unwrap().clone()
    }

    fn check_online(&self) -> Result<(), SheetError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SheetError::Connection("store offline".to_string()));
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<(), SheetError> {
        self.check_online()?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SheetError::Api {
                status: 503,
                body: "write rejected".to_string(),
            });
        }
        Ok(())
    }
}

impl SheetStore for MemoryStore {
    async fn fetch_values(&self) -> Result<Vec<Vec<String>>, SheetError> {
        self.check_online()?;
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|row| row.iter().any(|v| !v.is_empty()))
            .collect())
    }

    async fn append_row(&self, row: Vec<String>) -> Result<(), SheetError> {
        self.check_writable()?;
        self.values.write().unwrap().push(row);
        Ok(())
    }

    async fn clear(&self) -> Result<(), SheetError> {
        self.check_online()?;
        self.values.write().unwrap().clear();
        Ok(())
    }

    async fn write_values(&self, values: Vec<Vec<String>>) -> Result<(), SheetError> {
        self.check_writable()?;
        let mut stored = self.values.write().unwrap();
        for (i, row) in values.into_iter().enumerate() {
            if i < stored.len() {
                stored[i] = row;
            } else {
                stored.push(row);
            }
        }
        Ok(())
    }
}
