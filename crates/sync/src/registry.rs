use std::collections::HashMap;

use tracing::debug;

use crate::store::SubscriptionHandle;

/// Open subscription handles keyed by collection.
///
/// Releasing removes the handle before unsubscribing, so every handle is
/// released at most once no matter how often teardown runs.
#[derive(Default)]
pub struct SubscriptionRegistry {
    handles: HashMap<String, Box<dyn SubscriptionHandle>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handle, releasing any handle it replaces.
    pub fn insert(&mut self, collection: &str, handle: Box<dyn SubscriptionHandle>) {
        if let Some(previous) = self.handles.insert(collection.to_string(), handle) {
            debug!(collection, "Releasing replaced subscription");
            previous.unsubscribe();
        }
    }

    /// Returns whether a handle was open.
    pub fn release(&mut self, collection: &str) -> bool {
        match self.handles.remove(collection) {
            Some(handle) => {
                handle.unsubscribe();
                true
            }
            None => false,
        }
    }

    /// Returns how many handles were released.
    pub fn release_all(&mut self) -> usize {
        let released = self.handles.len();
        for (collection, handle) in self.handles.drain() {
            debug!(%collection, "Releasing subscription");
            handle.unsubscribe();
        }
        released
    }

    pub fn contains(&self, collection: &str) -> bool {
        self.handles.contains_key(collection)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    struct CountingHandle(Arc<AtomicUsize>);

    impl SubscriptionHandle for CountingHandle {
        fn unsubscribe(self: Box<Self>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_release_all_twice_releases_once() {
        let released = Arc::new(AtomicUsize::new(0));
        let mut registry = SubscriptionRegistry::new();
        registry.insert("reminders", Box::new(CountingHandle(released.clone())));
        registry.insert("doses", Box::new(CountingHandle(released.clone())));

        assert_eq!(registry.release_all(), 2);
        assert_eq!(registry.release_all(), 0);
        assert_eq!(released.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_insert_replaces_and_releases_previous() {
        let released = Arc::new(AtomicUsize::new(0));
        let mut registry = SubscriptionRegistry::new();
        registry.insert("reminders", Box::new(CountingHandle(released.clone())));
        registry.insert("reminders", Box::new(CountingHandle(released.clone())));

        assert_eq!(released.load(Ordering::SeqCst), 1);
        assert!(registry.release("reminders"));
        assert!(!registry.release("reminders"));
        assert_eq!(released.load(Ordering::SeqCst), 2);
    }
}
