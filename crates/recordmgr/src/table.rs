//! Table files: a schema header page followed by fixed-slot data pages.

use std::path::Path;

use buffer::BufferPool;
use common::{Config, PageNum, RecordId, StorageError, StorageResult};
use storage::{PAGE_SIZE, PageFile};
use types::{DataType, Value};

use crate::schema::Schema;

const LIVE: u8 = b'#';
const TOMBSTONE: u8 = b'$';

/// A decoded row together with the record id it was read from.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub values: Vec<Value>,
}

/// An open table: its buffer pool, schema, and live-row bookkeeping.
pub struct Table {
    pool: BufferPool,
    schema: Schema,
    num_tuples: u32,
    first_free_page: PageNum,
    slot_size: usize,
    slots_per_page: usize,
}

impl Table {
    /// Creates the page file and writes an empty schema header to page 0.
    ///
    /// `config.buffer_pool_frames` and `config.replacement_strategy` size
    /// the table's dedicated pool; `config.page_size` is not consulted
    /// here since the page size is fixed at compile time (see
    /// [`storage::PAGE_SIZE`]).
    pub fn create(path: impl AsRef<Path>, schema: &Schema, config: &Config) -> StorageResult<()> {
        PageFile::create(&path)?;
        let file = PageFile::open(&path)?;
        let mut pool = BufferPool::new(
            file,
            config.buffer_pool_frames,
            config.replacement_strategy,
        )?;

        let header = schema.encode_header(0, 1)?;
        let page0 = pool.pin_page(0)?;
        page0.copy_from_slice(&header);
        pool.mark_dirty(0)?;
        pool.unpin_page(0)?;
        pool.shutdown()?;
        tracing::debug!(path = %path.as_ref().display(), "created table");
        Ok(())
    }

    /// Opens an existing table, deserializing its schema header and
    /// allocating a dedicated buffer pool sized from `config`.
    pub fn open(path: impl AsRef<Path>, config: &Config) -> StorageResult<Self> {
        let file = PageFile::open(&path)?;
        let mut pool = BufferPool::new(
            file,
            config.buffer_pool_frames,
            config.replacement_strategy,
        )?;

        let page0 = pool.pin_page(0)?;
        let (schema, num_tuples, first_free_page) = Schema::decode_header(page0)?;
        pool.unpin_page(0)?;

        let record_size = schema.record_size();
        let slot_size = record_size + 1;
        if slot_size == 0 || slot_size > PAGE_SIZE {
            return Err(StorageError::InvalidParam(format!(
                "record size {record_size} does not fit in a {PAGE_SIZE}-byte page"
            )));
        }
        let slots_per_page = PAGE_SIZE / slot_size;

        tracing::debug!(path = %path.as_ref().display(), num_tuples, "opened table");
        Ok(Self {
            pool,
            schema,
            num_tuples,
            first_free_page,
            slot_size,
            slots_per_page,
        })
    }

    /// Writes back the current tuple counters and shuts down the table's pool.
    pub fn close(mut self) -> StorageResult<()> {
        let header = self.schema.encode_header(self.num_tuples, self.first_free_page)?;
        let page0 = self.pool.pin_page(0)?;
        page0.copy_from_slice(&header);
        self.pool.mark_dirty(0)?;
        self.pool.unpin_page(0)?;
        self.pool.shutdown()
    }

    /// Deletes a table's underlying file. The table must not be open.
    pub fn delete_table(path: impl AsRef<Path>) -> StorageResult<()> {
        PageFile::destroy(path)
    }

    pub fn num_tuples(&self) -> u32 {
        self.num_tuples
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Initializes scan cursor state at `(page=1, slot=0)`. No I/O happens
    /// until [`crate::scan::Scan::next_record`] is called.
    pub fn start_scan(&self, predicate: Option<expr::Expr>) -> crate::scan::Scan {
        crate::scan::Scan::new(predicate)
    }

    /// Convenience combinator: starts a scan and returns it as a plain
    /// iterator borrowing this table exclusively.
    pub fn scan(&mut self, predicate: Option<expr::Expr>) -> crate::scan::TableIter<'_> {
        crate::scan::TableIter::new(self, predicate)
    }

    pub(crate) fn slots_per_page(&self) -> usize {
        self.slots_per_page
    }

    pub(crate) fn total_pages(&self) -> u64 {
        self.pool.total_pages()
    }

    fn validate_row(&self, values: &[Value]) -> StorageResult<()> {
        if values.len() != self.schema.num_attrs() {
            return Err(StorageError::TypeMismatch(format!(
                "expected {} attributes, got {}",
                self.schema.num_attrs(),
                values.len()
            )));
        }
        for (v, attr) in values.iter().zip(&self.schema.attributes) {
            if !kind_matches(v, &attr.ty) {
                return Err(StorageError::TypeMismatch(format!(
                    "attribute {} expects {:?}, got {:?}",
                    attr.name,
                    attr.ty,
                    v.data_type()
                )));
            }
        }
        Ok(())
    }

    /// Inserts `values`, starting the free-slot search at `firstFreePage`.
    ///
    /// The page file grows automatically as the search runs past its
    /// current end (the buffer pool's `ensureCapacity` retry on pin).
    pub fn insert_record(&mut self, values: &[Value]) -> StorageResult<RecordId> {
        self.validate_row(values)?;

        let mut page = self.first_free_page;
        loop {
            let slot_size = self.slot_size;
            let slots_per_page = self.slots_per_page;
            let buf = self.pool.pin_page(page)?;

            let found = (0..slots_per_page).find(|&slot| buf[slot * slot_size] != LIVE);

            if let Some(slot) = found {
                let off = slot * slot_size;
                buf[off] = LIVE;
                encode_record(&self.schema, &mut buf[off + 1..off + slot_size], values)?;
                self.pool.mark_dirty(page)?;
                self.pool.unpin_page(page)?;
                self.first_free_page = page;
                self.num_tuples += 1;
                return Ok(RecordId::new(page, slot as u32));
            }

            self.pool.unpin_page(page)?;
            page += 1;
        }
    }

    /// Tombstones the slot at `rid`. Fails with `NoSuchTuple` if it is not
    /// currently live.
    pub fn delete_record(&mut self, rid: RecordId) -> StorageResult<()> {
        let slot_size = self.slot_size;
        let buf = self.pool.pin_page(rid.page)?;
        let off = rid.slot as usize * slot_size;
        if buf[off] != LIVE {
            self.pool.unpin_page(rid.page)?;
            return Err(StorageError::NoSuchTuple(rid));
        }
        buf[off] = TOMBSTONE;
        self.pool.mark_dirty(rid.page)?;
        self.pool.unpin_page(rid.page)?;
        self.num_tuples -= 1;
        Ok(())
    }

    /// Overwrites the payload at `rid`, leaving the occupancy marker
    /// untouched. Fails with `NoSuchTuple` if the slot is not live.
    pub fn update_record(&mut self, rid: RecordId, values: &[Value]) -> StorageResult<()> {
        self.validate_row(values)?;
        let slot_size = self.slot_size;
        let buf = self.pool.pin_page(rid.page)?;
        let off = rid.slot as usize * slot_size;
        if buf[off] != LIVE {
            self.pool.unpin_page(rid.page)?;
            return Err(StorageError::NoSuchTuple(rid));
        }
        encode_record(&self.schema, &mut buf[off + 1..off + slot_size], values)?;
        self.pool.mark_dirty(rid.page)?;
        self.pool.unpin_page(rid.page)?;
        Ok(())
    }

    /// Reads the row at `rid`. Fails with `NoSuchTuple` if it is not live.
    pub fn get_record(&mut self, rid: RecordId) -> StorageResult<Record> {
        let slot_size = self.slot_size;
        let buf = self.pool.pin_page(rid.page)?;
        let off = rid.slot as usize * slot_size;
        if buf[off] != LIVE {
            self.pool.unpin_page(rid.page)?;
            return Err(StorageError::NoSuchTuple(rid));
        }
        let payload = &buf[off + 1..off + slot_size];
        let values = decode_record(&self.schema, payload)?;
        self.pool.unpin_page(rid.page)?;
        Ok(Record { id: rid, values })
    }

    pub(crate) fn read_slot_marker(&mut self, page: PageNum, slot: usize) -> StorageResult<u8> {
        let slot_size = self.slot_size;
        let buf = self.pool.pin_page(page)?;
        let marker = buf[slot * slot_size];
        self.pool.unpin_page(page)?;
        Ok(marker)
    }

    pub(crate) fn read_slot_record(
        &mut self,
        page: PageNum,
        slot: usize,
    ) -> StorageResult<Vec<Value>> {
        let slot_size = self.slot_size;
        let buf = self.pool.pin_page(page)?;
        let off = slot * slot_size;
        let values = decode_record(&self.schema, &buf[off + 1..off + slot_size])?;
        self.pool.unpin_page(page)?;
        Ok(values)
    }
}

fn kind_matches(value: &Value, ty: &DataType) -> bool {
    matches!(
        (value, ty),
        (Value::Int(_), DataType::Int)
            | (Value::Float(_), DataType::Float)
            | (Value::Bool(_), DataType::Bool)
            | (Value::String(_), DataType::String(_))
    )
}

fn encode_record(schema: &Schema, buf: &mut [u8], values: &[Value]) -> StorageResult<()> {
    let mut off = 0;
    for (v, attr) in values.iter().zip(&schema.attributes) {
        let size = attr.ty.byte_size();
        v.encode_into(&mut buf[off..off + size]).ok_or_else(|| {
            StorageError::TypeMismatch(format!("value for {} does not fit its field", attr.name))
        })?;
        off += size;
    }
    Ok(())
}

fn decode_record(schema: &Schema, buf: &[u8]) -> StorageResult<Vec<Value>> {
    let mut off = 0;
    let mut values = Vec::with_capacity(schema.num_attrs());
    for attr in &schema.attributes {
        let size = attr.ty.byte_size();
        let v = Value::decode(&attr.ty, &buf[off..off + size])
            .ok_or_else(|| StorageError::TypeMismatch(format!("cannot decode {}", attr.name)))?;
        values.push(v);
        off += size;
    }
    Ok(values)
}
