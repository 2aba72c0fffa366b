use super::*;
use common::ReplacementStrategy;
use tempfile::{tempdir, TempDir};

/// Returns the pool together with the `TempDir` guarding its backing file —
/// the guard must outlive the pool or the directory is removed mid-test.
fn pool(num_frames: usize) -> (TempDir, BufferPool) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.db");
    PageFile::create(&path).unwrap();
    let file = PageFile::open(&path).unwrap();
    (dir, BufferPool::new(file, num_frames, ReplacementStrategy::Lru).unwrap())
}

#[test]
fn pin_unpin_tracks_fix_counts() {
    let (_dir, mut pool) = pool(3);
    pool.pin_page(0).unwrap();
    pool.pin_page(0).unwrap();
    assert_eq!(pool.fix_counts(), vec![2, 0, 0]);

    pool.unpin_page(0).unwrap();
    assert_eq!(pool.fix_counts(), vec![1, 0, 0]);
}

#[test]
fn pinning_beyond_file_size_grows_it() {
    let (_dir, mut pool) = pool(3);
    pool.pin_page(2).unwrap();
    assert_eq!(pool.total_pages(), 3);
    assert_eq!(pool.frame_contents(), vec![Some(2), None, None]);
}

#[test]
fn dirty_page_is_written_back_on_eviction() {
    let (_dir, mut pool) = pool(1);
    {
        let page = pool.pin_page(0).unwrap();
        page[0] = 99;
    }
    pool.mark_dirty(0).unwrap();
    pool.unpin_page(0).unwrap();

    // Only frame is unpinned, so pinning page 1 evicts page 0 and flushes it.
    pool.pin_page(1).unwrap();
    assert_eq!(pool.num_write_io(), 1);
    pool.unpin_page(1).unwrap();

    let page0 = pool.pin_page(0).unwrap();
    assert_eq!(page0[0], 99);
}

#[test]
fn pinning_with_all_frames_pinned_fails() {
    let (_dir, mut pool) = pool(2);
    pool.pin_page(0).unwrap();
    pool.pin_page(1).unwrap();

    let err = pool.pin_page(2).unwrap_err();
    assert!(matches!(err, StorageError::NoFreeFrame));
}

#[test]
fn lru_evicts_least_recently_used_with_deterministic_tie_break() {
    let (_dir, mut pool) = pool(3);
    // Fill all 3 frames, page 0 last-used oldest after the re-pin sequence below.
    pool.pin_page(0).unwrap();
    pool.pin_page(1).unwrap();
    pool.pin_page(2).unwrap();
    pool.unpin_page(0).unwrap();
    pool.unpin_page(1).unwrap();
    pool.unpin_page(2).unwrap();

    // Re-pin 0 so it becomes the most recently used; 1 and 2 are now tied
    // as the oldest, with frame index 1 (page 1) winning the tie-break.
    pool.pin_page(0).unwrap();
    pool.unpin_page(0).unwrap();

    pool.pin_page(3).unwrap();
    assert_eq!(pool.frame_contents(), vec![Some(0), Some(3), Some(2)]);
}

#[test]
fn unpinning_a_page_not_in_the_pool_fails() {
    let (_dir, mut pool) = pool(2);
    let err = pool.unpin_page(0).unwrap_err();
    assert!(matches!(err, StorageError::PageNotFoundInPool(0)));
}

#[test]
fn force_page_writes_back_even_if_pinned() {
    let (_dir, mut pool) = pool(1);
    {
        let page = pool.pin_page(0).unwrap();
        page[0] = 7;
    }
    pool.mark_dirty(0).unwrap();
    pool.force_page(0).unwrap();
    assert_eq!(pool.num_write_io(), 1);
    assert_eq!(pool.dirty_flags(), vec![false]);
}

#[test]
fn shutdown_fails_if_pages_still_pinned() {
    let (_dir, mut pool) = pool(2);
    pool.pin_page(0).unwrap();

    let err = pool.shutdown().unwrap_err();
    assert!(matches!(err, StorageError::PinnedPagesOnShutdown));
}

#[test]
fn shutdown_flushes_dirty_unpinned_pages() {
    let (_dir, mut pool) = pool(2);
    {
        let page = pool.pin_page(0).unwrap();
        page[0] = 5;
    }
    pool.mark_dirty(0).unwrap();
    pool.unpin_page(0).unwrap();
    pool.shutdown().unwrap();
}

#[test]
fn read_io_counted_once_per_disk_fetch() {
    let (_dir, mut pool) = pool(2);
    pool.pin_page(0).unwrap();
    pool.pin_page(0).unwrap();
    assert_eq!(pool.num_read_io(), 1);
}
