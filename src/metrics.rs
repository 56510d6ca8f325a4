use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing analysis activity.
#[derive(Default)]
pub struct AnalysisMetrics {
    documents_analyzed: AtomicU64,
    chunks_analyzed: AtomicU64,
    chunks_skipped: AtomicU64,
    cache_hits: AtomicU64,
}

impl AnalysisMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed analysis with its chunk counters.
    pub fn record_analysis(&self, chunk_count: u64, skipped: u64) {
        self.documents_analyzed.fetch_add(1, Ordering::Relaxed);
        self.chunks_analyzed.fetch_add(chunk_count, Ordering::Relaxed);
        self.chunks_skipped.fetch_add(skipped, Ordering::Relaxed);
    }

    /// Record a chunk served from the result cache.
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_analyzed: self.documents_analyzed.load(Ordering::Relaxed),
            chunks_analyzed: self.chunks_analyzed.load(Ordering::Relaxed),
            chunks_skipped: self.chunks_skipped.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of analysis counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of documents analyzed since startup.
    pub documents_analyzed: u64,
    /// Total chunks submitted for inference across all documents.
    pub chunks_analyzed: u64,
    /// Chunks skipped after soft failures.
    pub chunks_skipped: u64,
    /// Chunks answered from the result cache.
    pub cache_hits: u64,
}
