use super::*;
use tempfile::tempdir;

#[test]
fn create_then_open_reports_one_page() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.db");
    PageFile::create(&path).unwrap();

    let file = PageFile::open(&path).unwrap();
    assert_eq!(file.total_pages(), 1);
}

#[test]
fn create_twice_fails_with_file_exists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.db");
    PageFile::create(&path).unwrap();

    let err = PageFile::create(&path).unwrap_err();
    assert!(matches!(err, StorageError::FileExists(_)));
}

#[test]
fn open_missing_file_fails_with_file_not_found() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.db");
    let err = PageFile::open(&path).unwrap_err();
    assert!(matches!(err, StorageError::FileNotFound(_)));
}

#[test]
fn destroy_then_destroy_again_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.db");
    PageFile::create(&path).unwrap();

    PageFile::destroy(&path).unwrap();
    let err = PageFile::destroy(&path).unwrap_err();
    assert!(matches!(err, StorageError::FileNotFound(_)));
}

#[test]
fn read_write_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.db");
    PageFile::create(&path).unwrap();
    let mut file = PageFile::open(&path).unwrap();

    let mut page = vec![7u8; PAGE_SIZE];
    page[0] = 42;
    file.write_block(0, &page).unwrap();

    let mut buf = vec![0u8; PAGE_SIZE];
    file.read_block(0, &mut buf).unwrap();
    assert_eq!(buf, page);
    assert_eq!(file.cur_page(), Some(0));
}

#[test]
fn out_of_bounds_read_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.db");
    PageFile::create(&path).unwrap();
    let mut file = PageFile::open(&path).unwrap();

    let mut buf = vec![0u8; PAGE_SIZE];
    let err = file.read_block(5, &mut buf).unwrap_err();
    assert!(matches!(err, StorageError::NonExistingPage(5)));
}

#[test]
fn write_does_not_grow_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.db");
    PageFile::create(&path).unwrap();
    let mut file = PageFile::open(&path).unwrap();

    let buf = vec![1u8; PAGE_SIZE];
    let err = file.write_block(3, &buf).unwrap_err();
    assert!(matches!(err, StorageError::NonExistingPage(3)));
    assert_eq!(file.total_pages(), 1);
}

#[test]
fn append_empty_block_grows_capacity() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.db");
    PageFile::create(&path).unwrap();
    let mut file = PageFile::open(&path).unwrap();

    file.append_empty_block().unwrap();
    file.append_empty_block().unwrap();
    assert_eq!(file.total_pages(), 3);

    let mut buf = vec![0xffu8; PAGE_SIZE];
    file.read_block(2, &mut buf).unwrap();
    assert_eq!(buf, vec![0u8; PAGE_SIZE]);
}

#[test]
fn ensure_capacity_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.db");
    PageFile::create(&path).unwrap();
    let mut file = PageFile::open(&path).unwrap();

    file.ensure_capacity(5).unwrap();
    assert_eq!(file.total_pages(), 5);

    // Already satisfied: no-op, does not shrink or error.
    file.ensure_capacity(2).unwrap();
    assert_eq!(file.total_pages(), 5);
}

#[test]
fn cursor_convenience_reads_follow_the_cursor() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.db");
    PageFile::create(&path).unwrap();
    let mut file = PageFile::open(&path).unwrap();
    file.ensure_capacity(3).unwrap();

    let mut buf = vec![0u8; PAGE_SIZE];
    file.read_first(&mut buf).unwrap();
    assert_eq!(file.cur_page(), Some(0));

    file.read_next(&mut buf).unwrap();
    assert_eq!(file.cur_page(), Some(1));

    file.read_previous(&mut buf).unwrap();
    assert_eq!(file.cur_page(), Some(0));

    file.read_last(&mut buf).unwrap();
    assert_eq!(file.cur_page(), Some(2));

    file.read_current(&mut buf).unwrap();
    assert_eq!(file.cur_page(), Some(2));
}

#[test]
fn read_previous_before_first_page_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.db");
    PageFile::create(&path).unwrap();
    let mut file = PageFile::open(&path).unwrap();

    let mut buf = vec![0u8; PAGE_SIZE];
    file.read_first(&mut buf).unwrap();
    let err = file.read_previous(&mut buf).unwrap_err();
    assert!(matches!(err, StorageError::NonExistingPage(_)));
}

#[test]
fn read_current_without_prior_read_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.db");
    PageFile::create(&path).unwrap();
    let mut file = PageFile::open(&path).unwrap();

    let mut buf = vec![0u8; PAGE_SIZE];
    let err = file.read_current(&mut buf).unwrap_err();
    assert!(matches!(err, StorageError::NonExistingPage(_)));
}

#[test]
fn open_rejects_file_with_partial_page() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.db");
    std::fs::write(&path, vec![0u8; PAGE_SIZE + 10]).unwrap();

    let err = PageFile::open(&path).unwrap_err();
    assert!(matches!(err, StorageError::ReadFailed(_)));
}
