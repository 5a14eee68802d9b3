//! Active font pointer

use crate::{FontId, RegistryError};

/// The single global "active font" value with a monotonic revision.
///
/// Every change bumps the revision, including a change back to a previous
/// value, so readers holding an older revision can tell they are stale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveRecord {
    font_id: Option<FontId>,
    revision: u64,
}

impl ActiveRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn font_id(&self) -> Option<&FontId> {
        self.font_id.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Point at `id`. With `expected` set, refuse unless it matches the
    /// current revision.
    pub fn set(&mut self, id: FontId, expected: Option<u64>) -> Result<u64, RegistryError> {
        if let Some(expected) = expected {
            if expected != self.revision {
                return Err(RegistryError::StaleRevision { expected, current: self.revision });
            }
        }
        self.font_id = Some(id);
        self.revision += 1;
        Ok(self.revision)
    }

    /// Clear the pointer if it names `id`. Returns whether it did.
    pub fn clear_if(&mut self, id: &FontId) -> bool {
        if self.font_id.as_ref() == Some(id) {
            self.font_id = None;
            self.revision += 1;
            true
        } else {
            false
        }
    }
}
