//! Lightweight global metrics.
//!
//! Потокобезопасные атомарные счётчики для подсистем:
//! - fil (чтение/запись страниц, fsync, рост файлов)
//! - fsp (аллокация/освобождение страниц)
//! - buf (попадания/промахи/вытеснения/сбросы пула)

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

// ----- fil -----
static FIL_PAGE_READS: AtomicU64 = AtomicU64::new(0);
static FIL_PAGE_WRITES: AtomicU64 = AtomicU64::new(0);
static FIL_SYNCS: AtomicU64 = AtomicU64::new(0);
static FIL_FILE_GROWS: AtomicU64 = AtomicU64::new(0);

// ----- fsp -----
static FSP_PAGES_ALLOCATED: AtomicU64 = AtomicU64::new(0);
static FSP_PAGES_FREED: AtomicU64 = AtomicU64::new(0);
static FSP_SPACE_EXTENDS: AtomicU64 = AtomicU64::new(0);

// ----- buf -----
static BUF_HITS: AtomicU64 = AtomicU64::new(0);
static BUF_MISSES: AtomicU64 = AtomicU64::new(0);
static BUF_EVICTIONS: AtomicU64 = AtomicU64::new(0);
static BUF_FLUSHES: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    // fil
    pub fil_page_reads: u64,
    pub fil_page_writes: u64,
    pub fil_syncs: u64,
    pub fil_file_grows: u64,

    // fsp
    pub fsp_pages_allocated: u64,
    pub fsp_pages_freed: u64,
    pub fsp_space_extends: u64,

    // buf
    pub buf_hits: u64,
    pub buf_misses: u64,
    pub buf_evictions: u64,
    pub buf_flushes: u64,
}

impl MetricsSnapshot {
    pub fn buf_hit_ratio(&self) -> f64 {
        let total = self.buf_hits + self.buf_misses;
        if total == 0 {
            0.0
        } else {
            self.buf_hits as f64 / total as f64
        }
    }
}

// ----- Recorders (fil) -----
pub fn record_page_read() {
    FIL_PAGE_READS.fetch_add(1, Ordering::Relaxed);
}
pub fn record_page_write() {
    FIL_PAGE_WRITES.fetch_add(1, Ordering::Relaxed);
}
pub fn record_sync() {
    FIL_SYNCS.fetch_add(1, Ordering::Relaxed);
}
pub fn record_file_grow() {
    FIL_FILE_GROWS.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (fsp) -----
pub fn record_page_alloc() {
    FSP_PAGES_ALLOCATED.fetch_add(1, Ordering::Relaxed);
}
pub fn record_page_free() {
    FSP_PAGES_FREED.fetch_add(1, Ordering::Relaxed);
}
pub fn record_space_extend() {
    FSP_SPACE_EXTENDS.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (buf) -----
pub fn record_buf_hit() {
    BUF_HITS.fetch_add(1, Ordering::Relaxed);
}
pub fn record_buf_miss() {
    BUF_MISSES.fetch_add(1, Ordering::Relaxed);
}
pub fn record_buf_eviction() {
    BUF_EVICTIONS.fetch_add(1, Ordering::Relaxed);
}
pub fn record_buf_flush() {
    BUF_FLUSHES.fetch_add(1, Ordering::Relaxed);
}

// ----- Snapshot / Reset -----
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        fil_page_reads: FIL_PAGE_READS.load(Ordering::Relaxed),
        fil_page_writes: FIL_PAGE_WRITES.load(Ordering::Relaxed),
        fil_syncs: FIL_SYNCS.load(Ordering::Relaxed),
        fil_file_grows: FIL_FILE_GROWS.load(Ordering::Relaxed),

        fsp_pages_allocated: FSP_PAGES_ALLOCATED.load(Ordering::Relaxed),
        fsp_pages_freed: FSP_PAGES_FREED.load(Ordering::Relaxed),
        fsp_space_extends: FSP_SPACE_EXTENDS.load(Ordering::Relaxed),

        buf_hits: BUF_HITS.load(Ordering::Relaxed),
        buf_misses: BUF_MISSES.load(Ordering::Relaxed),
        buf_evictions: BUF_EVICTIONS.load(Ordering::Relaxed),
        buf_flushes: BUF_FLUSHES.load(Ordering::Relaxed),
    }
}

pub fn reset() {
    FIL_PAGE_READS.store(0, Ordering::Relaxed);
    FIL_PAGE_WRITES.store(0, Ordering::Relaxed);
    FIL_SYNCS.store(0, Ordering::Relaxed);
    FIL_FILE_GROWS.store(0, Ordering::Relaxed);

    FSP_PAGES_ALLOCATED.store(0, Ordering::Relaxed);
    FSP_PAGES_FREED.store(0, Ordering::Relaxed);
    FSP_SPACE_EXTENDS.store(0, Ordering::Relaxed);

    BUF_HITS.store(0, Ordering::Relaxed);
    BUF_MISSES.store(0, Ordering::Relaxed);
    BUF_EVICTIONS.store(0, Ordering::Relaxed);
    BUF_FLUSHES.store(0, Ordering::Relaxed);
}
