//! Builder for [`MemoryStore`].

use std::sync::Arc;

use smol_str::SmolStr;
use tokio::sync::RwLock;

use crate::MemoryStore;

/// Builder for [`MemoryStore`].
///
/// ```
/// use indexbox_memory::MemoryStore;
/// use indexbox_backend::StoreAdapter;
///
/// let store = MemoryStore::builder().label("sessions").build();
/// assert_eq!(store.label(), "sessions");
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStoreBuilder {
    label: SmolStr,
}

impl Default for MemoryStoreBuilder {
    fn default() -> Self {
        Self {
            label: SmolStr::new_static("memory"),
        }
    }
}

impl MemoryStoreBuilder {
    /// Set a custom label for this store, used in logs and metrics.
    pub fn label(mut self, label: impl Into<SmolStr>) -> Self {
        self.label = label.into();
        self
    }

    /// Create an empty store.
    pub fn build(self) -> MemoryStore {
        MemoryStore {
            state: Arc::new(RwLock::new(Default::default())),
            label: self.label,
        }
    }
}
