//! Buffer pool: a pinned cache of page frames sitting between the record
//! manager and the page store, providing:
//! - pin/unpin with per-frame fix counts (a pinned frame is never evicted)
//! - LRU victim selection among unpinned frames
//! - dirty tracking with write-back on eviction, `forcePage`, and
//!   `forceFlushPool`
//! - read/write I/O counters that never reset
//!
//! # Example
//!
//! ```no_run
//! use buffer::BufferPool;
//! use common::ReplacementStrategy;
//! use storage::PageFile;
//!
//! PageFile::create("/tmp/demo.db").unwrap();
//! let file = PageFile::open("/tmp/demo.db").unwrap();
//! let mut pool = BufferPool::new(file, 10, ReplacementStrategy::Lru).unwrap();
//!
//! let page = pool.pin_page(0).unwrap();
//! page[0] = 42;
//! pool.mark_dirty(0).unwrap();
//! pool.unpin_page(0).unwrap();
//! pool.shutdown().unwrap();
//! ```

#[cfg(test)]
mod tests;

use common::{PageNum, ReplacementStrategy, StorageError, StorageResult};
use storage::{PAGE_SIZE, PageFile};

/// Per-frame cache state. `None` `page_num` marks an empty frame.
#[derive(Debug)]
struct Frame {
    page_num: Option<PageNum>,
    data: Vec<u8>,
    fix_count: u32,
    dirty: bool,
    last_used: u64,
}

impl Frame {
    fn empty() -> Self {
        Self {
            page_num: None,
            data: vec![0u8; PAGE_SIZE],
            fix_count: 0,
            dirty: false,
            last_used: 0,
        }
    }
}

/// A fixed-size cache of page frames backed by a single [`PageFile`].
#[derive(Debug)]
pub struct BufferPool {
    file: PageFile,
    frames: Vec<Frame>,
    strategy: ReplacementStrategy,
    clock: u64,
    read_io: u64,
    write_io: u64,
}

impl BufferPool {
    /// Allocates `num_frames` empty frames over `file`.
    ///
    /// `strategy` other than [`ReplacementStrategy::Lru`] is accepted but
    /// behaves as LRU; a warning is logged so the fallback isn't silent.
    pub fn new(
        file: PageFile,
        num_frames: usize,
        strategy: ReplacementStrategy,
    ) -> StorageResult<Self> {
        if num_frames == 0 {
            return Err(StorageError::InvalidParam("numFrames must be > 0".into()));
        }
        if strategy != ReplacementStrategy::Lru {
            tracing::warn!(?strategy, "replacement strategy not implemented, using LRU");
        }
        Ok(Self {
            file,
            frames: (0..num_frames).map(|_| Frame::empty()).collect(),
            strategy,
            clock: 0,
            read_io: 0,
            write_io: 0,
        })
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn find_resident(&self, page_num: PageNum) -> Option<usize> {
        self.frames.iter().position(|f| f.page_num == Some(page_num))
    }

    /// Picks an eviction victim: any empty frame first, else the resident,
    /// unpinned frame with the smallest `last_used` stamp. Ties break on
    /// ascending frame index so the policy is deterministic.
    fn choose_victim(&self) -> StorageResult<usize> {
        if let Some(idx) = self.frames.iter().position(|f| f.page_num.is_none()) {
            return Ok(idx);
        }
        let mut best: Option<(usize, u64)> = None;
        for (idx, frame) in self.frames.iter().enumerate() {
            if frame.fix_count == 0 {
                match best {
                    Some((_, last_used)) if frame.last_used >= last_used => {}
                    _ => best = Some((idx, frame.last_used)),
                }
            }
        }
        best.map(|(idx, _)| idx).ok_or(StorageError::NoFreeFrame)
    }

    /// Pins `page_num`, loading it from disk if not already resident, and
    /// returns a mutable view of its frame buffer.
    ///
    /// If the page does not exist yet on disk, the underlying file's
    /// capacity is grown to `page_num + 1` and the read is retried once —
    /// this is how insert-driven page allocation reaches disk.
    pub fn pin_page(&mut self, page_num: PageNum) -> StorageResult<&mut [u8]> {
        if let Some(idx) = self.find_resident(page_num) {
            let stamp = self.tick();
            let frame = &mut self.frames[idx];
            frame.fix_count += 1;
            frame.last_used = stamp;
            return Ok(&mut frame.data);
        }

        let idx = self.choose_victim()?;
        if let Some(old_page) = self.frames[idx].page_num {
            if self.frames[idx].dirty {
                self.file.write_block(old_page, &self.frames[idx].data)?;
                self.write_io += 1;
                self.frames[idx].dirty = false;
                tracing::debug!(page = old_page, frame = idx, "wrote back dirty victim");
            }
        }

        match self.file.read_block(page_num, &mut self.frames[idx].data) {
            Ok(()) => {}
            Err(StorageError::NonExistingPage(_)) => {
                self.file.ensure_capacity(page_num + 1)?;
                self.file.read_block(page_num, &mut self.frames[idx].data)?;
            }
            Err(e) => return Err(e),
        }
        self.read_io += 1;

        let stamp = self.tick();
        let frame = &mut self.frames[idx];
        frame.page_num = Some(page_num);
        frame.fix_count = 1;
        frame.dirty = false;
        frame.last_used = stamp;
        tracing::debug!(page = page_num, frame = idx, "pinned page from disk");
        Ok(&mut frame.data)
    }

    /// Decrements the fix count of `page_num`'s frame, clamped at 0.
    pub fn unpin_page(&mut self, page_num: PageNum) -> StorageResult<()> {
        let idx = self
            .find_resident(page_num)
            .ok_or(StorageError::PageNotFoundInPool(page_num))?;
        self.frames[idx].fix_count = self.frames[idx].fix_count.saturating_sub(1);
        Ok(())
    }

    /// Marks `page_num`'s frame dirty.
    pub fn mark_dirty(&mut self, page_num: PageNum) -> StorageResult<()> {
        let idx = self
            .find_resident(page_num)
            .ok_or(StorageError::PageNotFoundInPool(page_num))?;
        self.frames[idx].dirty = true;
        Ok(())
    }

    /// Writes `page_num`'s frame back to disk if dirty, regardless of fix count.
    pub fn force_page(&mut self, page_num: PageNum) -> StorageResult<()> {
        let idx = self
            .find_resident(page_num)
            .ok_or(StorageError::PageNotFoundInPool(page_num))?;
        if self.frames[idx].dirty {
            self.file.write_block(page_num, &self.frames[idx].data)?;
            self.write_io += 1;
            self.frames[idx].dirty = false;
        }
        Ok(())
    }

    /// Writes back every frame that is both dirty and unpinned. Pinned
    /// dirty frames are left untouched.
    pub fn force_flush_pool(&mut self) -> StorageResult<()> {
        for idx in 0..self.frames.len() {
            let (page_num, dirty, fix_count) = {
                let f = &self.frames[idx];
                (f.page_num, f.dirty, f.fix_count)
            };
            if let Some(page_num) = page_num {
                if dirty && fix_count == 0 {
                    self.file.write_block(page_num, &self.frames[idx].data)?;
                    self.write_io += 1;
                    self.frames[idx].dirty = false;
                }
            }
        }
        Ok(())
    }

    /// Flushes the pool and closes the underlying file.
    ///
    /// Fails with [`StorageError::PinnedPagesOnShutdown`] if any frame has a
    /// nonzero fix count.
    pub fn shutdown(mut self) -> StorageResult<()> {
        if self.frames.iter().any(|f| f.fix_count > 0) {
            return Err(StorageError::PinnedPagesOnShutdown);
        }
        self.force_flush_pool()?;
        self.file.close()
    }

    pub fn frame_contents(&self) -> Vec<Option<PageNum>> {
        self.frames.iter().map(|f| f.page_num).collect()
    }

    pub fn dirty_flags(&self) -> Vec<bool> {
        self.frames.iter().map(|f| f.dirty).collect()
    }

    pub fn fix_counts(&self) -> Vec<u32> {
        self.frames.iter().map(|f| f.fix_count).collect()
    }

    pub fn num_read_io(&self) -> u64 {
        self.read_io
    }

    pub fn num_write_io(&self) -> u64 {
        self.write_io
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Total pages currently allocated in the underlying page file.
    pub fn total_pages(&self) -> u64 {
        self.file.total_pages()
    }

    /// Read-only view of a resident page's bytes, without re-pinning it.
    pub fn frame_data(&self, page_num: PageNum) -> StorageResult<&[u8]> {
        let idx = self
            .find_resident(page_num)
            .ok_or(StorageError::PageNotFoundInPool(page_num))?;
        Ok(&self.frames[idx].data)
    }
}
