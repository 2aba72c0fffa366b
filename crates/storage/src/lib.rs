//! Page file store: fixed-size block I/O on a named file, with a
//! positional cursor and append-only capacity growth.
//!
//! A page file is a headerless sequence of [`PAGE_SIZE`]-byte blocks
//! indexed from 0. There is no magic number and no version — any producer
//! that writes `k * PAGE_SIZE` bytes is a valid page file.

#[cfg(test)]
mod tests;

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use common::{PageNum, StorageError, StorageResult};

/// Fixed page size in bytes. All addressable units are multiples of this.
pub const PAGE_SIZE: usize = 4096;

/// An open page file: a file handle, its page count, and a cursor
/// recording the last page read or written.
#[derive(Debug)]
pub struct PageFile {
    path: PathBuf,
    file: File,
    total_pages: u64,
    cur_page: Option<PageNum>,
}

impl PageFile {
    /// Creates a new page file with a single zero-filled page.
    ///
    /// Fails with [`StorageError::FileExists`] if `path` already exists.
    pub fn create(path: impl AsRef<Path>) -> StorageResult<()> {
        let path = path.as_ref();
        if path.exists() {
            return Err(StorageError::FileExists(path.display().to_string()));
        }
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;
        file.write_all(&[0u8; PAGE_SIZE])?;
        file.flush()?;
        tracing::debug!(path = %path.display(), "created page file");
        Ok(())
    }

    /// Opens an existing page file. The file's byte length must be an
    /// exact multiple of [`PAGE_SIZE`].
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StorageError::FileNotFound(path.display().to_string()));
        }
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let len = file.metadata()?.len();
        if len % PAGE_SIZE as u64 != 0 {
            return Err(StorageError::ReadFailed(format!(
                "{}: length {len} is not a multiple of page size {PAGE_SIZE}",
                path.display()
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
            file,
            total_pages: len / PAGE_SIZE as u64,
            cur_page: None,
        })
    }

    /// Closes the page file. Equivalent to dropping it; provided so callers
    /// can mirror the original operation name and observe I/O errors from
    /// the final flush explicitly.
    pub fn close(mut self) -> StorageResult<()> {
        self.file.flush()?;
        Ok(())
    }

    /// Deletes a page file by name without requiring it to be open.
    pub fn destroy(path: impl AsRef<Path>) -> StorageResult<()> {
        let path = path.as_ref();
        fs::remove_file(path)
            .map_err(|_| StorageError::FileNotFound(path.display().to_string()))?;
        tracing::debug!(path = %path.display(), "destroyed page file");
        Ok(())
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    pub fn cur_page(&self) -> Option<PageNum> {
        self.cur_page
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check_bounds(&self, n: PageNum) -> StorageResult<()> {
        if n >= self.total_pages {
            return Err(StorageError::NonExistingPage(n));
        }
        Ok(())
    }

    /// Reads page `n` into `buf`, which must be exactly [`PAGE_SIZE`] bytes.
    /// Sets the cursor to `n` on success.
    pub fn read_block(&mut self, n: PageNum, buf: &mut [u8]) -> StorageResult<()> {
        debug_assert_eq!(buf.len(), PAGE_SIZE);
        self.check_bounds(n)?;
        self.file.seek(SeekFrom::Start(n * PAGE_SIZE as u64))?;
        self.file.read_exact(buf)?;
        self.cur_page = Some(n);
        Ok(())
    }

    /// Overwrites page `n` with `buf`. Does not grow the file; `n` must
    /// already be within `total_pages`.
    pub fn write_block(&mut self, n: PageNum, buf: &[u8]) -> StorageResult<()> {
        debug_assert_eq!(buf.len(), PAGE_SIZE);
        self.check_bounds(n)?;
        self.file.seek(SeekFrom::Start(n * PAGE_SIZE as u64))?;
        self.file.write_all(buf)?;
        self.file.flush()?;
        self.cur_page = Some(n);
        Ok(())
    }

    /// Appends one zero-filled page, incrementing `total_pages`.
    pub fn append_empty_block(&mut self) -> StorageResult<()> {
        self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(&[0u8; PAGE_SIZE])?;
        self.file.flush()?;
        self.total_pages += 1;
        Ok(())
    }

    /// Appends zero-filled pages until `total_pages >= k`. A no-op if the
    /// file already has at least `k` pages.
    pub fn ensure_capacity(&mut self, k: u64) -> StorageResult<()> {
        while self.total_pages < k {
            self.append_empty_block()?;
        }
        Ok(())
    }

    pub fn read_first(&mut self, buf: &mut [u8]) -> StorageResult<()> {
        self.read_block(0, buf)
    }

    pub fn read_last(&mut self, buf: &mut [u8]) -> StorageResult<()> {
        if self.total_pages == 0 {
            return Err(StorageError::NonExistingPage(0));
        }
        self.read_block(self.total_pages - 1, buf)
    }

    pub fn read_current(&mut self, buf: &mut [u8]) -> StorageResult<()> {
        let cur = self.cur_page.ok_or(StorageError::NonExistingPage(0))?;
        self.read_block(cur, buf)
    }

    pub fn read_next(&mut self, buf: &mut [u8]) -> StorageResult<()> {
        let cur = self.cur_page.ok_or(StorageError::NonExistingPage(0))?;
        self.read_block(cur + 1, buf)
    }

    pub fn read_previous(&mut self, buf: &mut [u8]) -> StorageResult<()> {
        let cur = self.cur_page.ok_or(StorageError::NonExistingPage(0))?;
        let prev = cur.checked_sub(1).ok_or(StorageError::NonExistingPage(0))?;
        self.read_block(prev, buf)
    }
}
