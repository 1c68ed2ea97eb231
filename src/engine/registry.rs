//! # Registry of live forked tasks.
//!
//! The engine inserts a handle when a forked task is handed to tokio and removes it
//! when the task settles. Tasks that finish during the eager first poll are never
//! registered.
//!
//! ## Rules
//! - Registry holds handles by reference (the `Arc` inside [`Handle`]); it never
//!   owns the task futures.
//! - Used for `live_tasks()` and for graceful shutdown.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::tasks::{Handle, Payload};

/// Live tasks by engine id.
pub(crate) struct Registry<V> {
    tasks: Mutex<HashMap<u64, Handle<V>>>,
}

impl<V: Payload> Registry<V> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            tasks: Mutex::new(HashMap::new()),
        })
    }

    pub fn insert(&self, handle: Handle<V>) {
        self.tasks.lock().insert(handle.id(), handle);
    }

    pub fn remove(&self, id: u64) -> Option<Handle<V>> {
        self.tasks.lock().remove(&id)
    }

    /// Returns sorted list of live task names.
    pub fn names(&self) -> Vec<String> {
        let tasks = self.tasks.lock();
        let mut names: Vec<String> = tasks.values().map(|h| h.name().to_string()).collect();
        names.sort_unstable();
        names
    }

    /// Clones out every live handle.
    pub fn snapshot(&self) -> Vec<Handle<V>> {
        self.tasks.lock().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn tracks_insert_and_remove() {
        let registry = Registry::<u32>::new();
        let (b, _sb) = Handle::pending(2, Arc::from("beta"), CancellationToken::new());
        let (a, _sa) = Handle::pending(1, Arc::from("alpha"), CancellationToken::new());
        registry.insert(b);
        registry.insert(a);

        assert_eq!(registry.names(), vec!["alpha", "beta"]);
        assert_eq!(registry.snapshot().len(), 2);

        assert!(registry.remove(1).is_some());
        assert!(registry.remove(1).is_none());
        assert_eq!(registry.names(), vec!["beta"]);

        registry.remove(2);
        assert!(registry.snapshot().is_empty());
    }
}
