use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
pub struct PipelineStats {
    summaries: AtomicU64,
    failed_summaries: AtomicU64,
    transfer_pages: AtomicU64,
    receipt_batches: AtomicU64,
    failed_receipt_batches: AtomicU64,
    malformed_records: AtomicU64,
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStats {
    pub const fn new() -> Self {
        Self {
            summaries: AtomicU64::new(0),
            failed_summaries: AtomicU64::new(0),
            transfer_pages: AtomicU64::new(0),
            receipt_batches: AtomicU64::new(0),
            failed_receipt_batches: AtomicU64::new(0),
            malformed_records: AtomicU64::new(0),
        }
    }

    pub fn inc_summaries(&self) {
        self.summaries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failed_summaries(&self) {
        self.failed_summaries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_transfer_pages(&self, n: u64) {
        self.transfer_pages.fetch_add(n, Ordering::Relaxed);
    }

    pub fn inc_receipt_batches(&self) {
        self.receipt_batches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failed_receipt_batches(&self) {
        self.failed_receipt_batches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_malformed_records(&self, n: u64) {
        self.malformed_records.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            summaries: self.summaries.load(Ordering::Relaxed),
            failed_summaries: self.failed_summaries.load(Ordering::Relaxed),
            transfer_pages: self.transfer_pages.load(Ordering::Relaxed),
            receipt_batches: self.receipt_batches.load(Ordering::Relaxed),
            failed_receipt_batches: self.failed_receipt_batches.load(Ordering::Relaxed),
            malformed_records: self.malformed_records.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct PipelineSnapshot {
    pub summaries: u64,
    pub failed_summaries: u64,
    pub transfer_pages: u64,
    pub receipt_batches: u64,
    pub failed_receipt_batches: u64,
    pub malformed_records: u64,
}

pub static PIPELINE_STATS: PipelineStats = PipelineStats::new();
