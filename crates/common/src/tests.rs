use super::*;
use std::io;

#[test]
fn config_defaults_are_sane() {
    let cfg = Config::default();
    assert_eq!(cfg.page_size, 4096);
    assert_eq!(cfg.buffer_pool_frames, 10);
    assert_eq!(cfg.replacement_strategy, ReplacementStrategy::Lru);
}

#[test]
fn config_builder_overrides_defaults() {
    let cfg = Config::builder()
        .page_size(8192)
        .buffer_pool_frames(64)
        .replacement_strategy(ReplacementStrategy::Clock)
        .build();
    assert_eq!(cfg.page_size, 8192);
    assert_eq!(cfg.buffer_pool_frames, 64);
    assert_eq!(cfg.replacement_strategy, ReplacementStrategy::Clock);
}

#[test]
fn storage_error_formats_cleanly() {
    let err = StorageError::NonExistingPage(7);
    assert!(format!("{err}").contains("7"));
}

#[test]
fn io_error_converts() {
    let e = io::Error::other("oops");
    let err: StorageError = e.into();
    assert!(matches!(err, StorageError::Io(_)));
}

#[test]
fn record_id_carries_page_and_slot() {
    let rid = RecordId::new(3, 5);
    assert_eq!(rid.page, 3);
    assert_eq!(rid.slot, 5);
}
