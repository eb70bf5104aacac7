use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Process-wide "something is loading" indicator.
///
/// Every remote fetch holds a [`LoadingGuard`] for its duration; the indicator
/// is visible while at least one guard is alive.
#[derive(Debug, Clone, Default)]
pub struct LoadingIndicator {
    active: Arc<AtomicUsize>,
}

impl LoadingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) -> LoadingGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        LoadingGuard {
            active: self.active.clone(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.active.load(Ordering::SeqCst) > 0
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

#[must_use = "the indicator hides as soon as the guard is dropped"]
pub struct LoadingGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}
