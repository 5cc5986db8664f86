/// Process-wide request counter for the static file server

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct FileserverHits {
    hits: AtomicU64,
}

impl FileserverHits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) -> u64 {
        self.hits.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
    }
}
