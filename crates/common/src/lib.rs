//! Identifiers, error taxonomy, and runtime configuration shared by the
//! page store, buffer pool, and record manager layers.

#[cfg(test)]
mod tests;

use std::io;
use thiserror::Error;

/// Page identifier within a single page file. Page 0 of a table file is the
/// schema header; data pages start at 1.
pub type PageNum = u64;

/// Record identifier: stable for the lifetime of the record (until deleted).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RecordId {
    pub page: PageNum,
    pub slot: u32,
}

impl RecordId {
    pub fn new(page: PageNum, slot: u32) -> Self {
        Self { page, slot }
    }
}

/// Canonical error type shared across the storage engine's layers.
///
/// The record manager surfaces buffer-pool errors unchanged; the buffer
/// pool surfaces page-store errors unchanged — every variant here is
/// meaningful at any layer.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("file already exists: {0}")]
    FileExists(String),
    #[error("file handle not initialized")]
    FileHandleNotInit,
    #[error("write failed: {0}")]
    WriteFailed(String),
    #[error("read failed: {0}")]
    ReadFailed(String),
    #[error("non-existing page: {0}")]
    NonExistingPage(PageNum),
    #[error("invalid parameter: {0}")]
    InvalidParam(String),
    #[error("out of memory")]
    OutOfMemory,
    #[error("shutdown attempted with pinned pages")]
    PinnedPagesOnShutdown,
    #[error("page {0} not found in buffer pool")]
    PageNotFoundInPool(PageNum),
    #[error("no free frame available")]
    NoFreeFrame,
    #[error("no such tuple: {0:?}")]
    NoSuchTuple(RecordId),
    #[error("no more tuples")]
    NoMoreTuples,
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result alias that carries a `StorageError`.
pub type StorageResult<T> = Result<T, StorageError>;

/// Replacement policy requested when a buffer pool is configured.
///
/// Only `Lru` is implemented; the other tags are accepted so callers can
/// express intent, but the buffer pool falls back to LRU for them and logs
/// that it has done so.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ReplacementStrategy {
    Fifo,
    Lru,
    LruK,
    Clock,
    Lfu,
}

impl Default for ReplacementStrategy {
    fn default() -> Self {
        ReplacementStrategy::Lru
    }
}

/// Runtime configuration for the storage engine.
///
/// # Example
/// ```
/// use common::{Config, ReplacementStrategy};
///
/// let config = Config::builder()
///     .page_size(4096)
///     .buffer_pool_frames(10)
///     .replacement_strategy(ReplacementStrategy::Lru)
///     .build();
/// ```
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, bon::Builder)]
pub struct Config {
    /// Fixed-size page allocation in bytes.
    #[builder(default = 4096)]
    pub page_size: usize,
    /// Number of frames a record manager's dedicated buffer pool keeps resident.
    #[builder(default = 10)]
    pub buffer_pool_frames: usize,
    /// Eviction policy used by buffer pools configured from this `Config`.
    #[builder(default)]
    pub replacement_strategy: ReplacementStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: 4096,
            buffer_pool_frames: 10,
            replacement_strategy: ReplacementStrategy::Lru,
        }
    }
}

/// Convenient re-exports for downstream crates.
pub mod prelude {
    pub use crate::{Config, PageNum, RecordId, ReplacementStrategy, StorageError, StorageResult};
}
