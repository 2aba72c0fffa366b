//! Predicate-filtered sequential scans over a table's data pages.

use common::{PageNum, StorageResult};
use expr::Expr;

use crate::table::{Record, Table};

const LIVE: u8 = b'#';

/// Cursor state for a single scan: which `(page, slot)` to examine next,
/// how many live rows have been returned, and the optional predicate.
///
/// Frames are pinned and unpinned within a single [`Scan::next_record`]
/// call, so no frame is ever held pinned across calls — `close_scan` has
/// nothing to release but is kept for parity with the lower-level protocol.
pub struct Scan {
    next_page: PageNum,
    next_slot: usize,
    scanned: u32,
    predicate: Option<Expr>,
}

impl Scan {
    pub(crate) fn new(predicate: Option<Expr>) -> Self {
        Self {
            next_page: 1,
            next_slot: 0,
            scanned: 0,
            predicate,
        }
    }

    /// Advances the cursor until a live row matching the predicate is
    /// found, or the table is exhausted.
    pub fn next_record(&mut self, table: &mut Table) -> StorageResult<Option<Record>> {
        let slots_per_page = table.slots_per_page();
        loop {
            if self.next_page >= table.total_pages() {
                return Ok(None);
            }
            if self.next_slot == slots_per_page {
                self.next_page += 1;
                self.next_slot = 0;
                continue;
            }

            let page = self.next_page;
            let slot = self.next_slot;
            self.next_slot += 1;

            let marker = table.read_slot_marker(page, slot)?;
            if marker != LIVE {
                continue;
            }

            let values = table.read_slot_record(page, slot)?;
            let matched = match &self.predicate {
                Some(expr) => expr.eval_bool(&values)?,
                None => true,
            };
            if !matched {
                continue;
            }

            self.scanned += 1;
            return Ok(Some(Record {
                id: common::RecordId::new(page, slot as u32),
                values,
            }));
        }
    }

    pub fn rows_returned(&self) -> u32 {
        self.scanned
    }

    /// Releases the scan's state. No frame is ever held pinned between
    /// calls to `next_record`, so this never touches the buffer pool.
    pub fn close_scan(self, _table: &mut Table) -> StorageResult<()> {
        Ok(())
    }
}

/// Borrows `table` exclusively and drives a [`Scan`] as a plain iterator.
pub struct TableIter<'a> {
    table: &'a mut Table,
    scan: Scan,
}

impl<'a> TableIter<'a> {
    pub(crate) fn new(table: &'a mut Table, predicate: Option<Expr>) -> Self {
        Self {
            table,
            scan: Scan::new(predicate),
        }
    }
}

impl<'a> Iterator for TableIter<'a> {
    type Item = StorageResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.scan.next_record(self.table) {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
