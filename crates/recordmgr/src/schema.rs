//! Schema header codec: exact byte layout, not a `bincode` blob, so the
//! on-disk format is stable independent of the serde derive used elsewhere
//! in this crate family.

use common::{StorageError, StorageResult};
use storage::PAGE_SIZE;
use types::DataType;

/// Fixed width of a name field in the on-disk attribute descriptor.
const NAME_LEN: usize = 20;

/// One column of a table schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub ty: DataType,
}

impl Attribute {
    pub fn new(name: impl Into<String>, ty: DataType) -> Self {
        Self { name: name.into(), ty }
    }
}

/// A table's column layout and key indices.
///
/// Key indices are informational only — the core never enforces
/// uniqueness on them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    pub attributes: Vec<Attribute>,
    pub key: Vec<u32>,
}

impl Schema {
    pub fn new(attributes: Vec<Attribute>, key: Vec<u32>) -> Self {
        Self { attributes, key }
    }

    /// Sum of the declared byte widths of every attribute.
    pub fn record_size(&self) -> usize {
        self.attributes.iter().map(|a| a.ty.byte_size()).sum()
    }

    pub fn num_attrs(&self) -> usize {
        self.attributes.len()
    }

    /// Byte offset of attribute `i` within a record's fixed layout.
    pub fn attr_offset(&self, i: usize) -> usize {
        self.attributes[..i].iter().map(|a| a.ty.byte_size()).sum()
    }

    /// Byte size of the encoded header: the four counter fields, one
    /// `NAME_LEN+4+4`-byte descriptor per attribute, and one `u32` per key
    /// index plus its count.
    fn header_size(&self) -> usize {
        4 * 4 + self.attributes.len() * (NAME_LEN + 4 + 4) + 4 + self.key.len() * 4
    }

    /// Encodes the schema header page: `numTuples`, `firstFreePage`,
    /// `recordSize`, `numAttr`, per-attribute descriptors, then the key
    /// index list. Remaining bytes are left zeroed.
    ///
    /// Fails with [`StorageError::InvalidParam`] if the schema has enough
    /// attributes or key indices that the encoded header would not fit in
    /// a single page.
    pub fn encode_header(&self, num_tuples: u32, first_free_page: u32) -> StorageResult<Vec<u8>> {
        let needed = self.header_size();
        if needed > PAGE_SIZE {
            return Err(StorageError::InvalidParam(format!(
                "schema header needs {needed} bytes, page size is {PAGE_SIZE}"
            )));
        }

        let mut buf = vec![0u8; PAGE_SIZE];
        let mut off = 0;

        write_u32(&mut buf, &mut off, num_tuples);
        write_u32(&mut buf, &mut off, first_free_page);
        write_u32(&mut buf, &mut off, self.record_size() as u32);
        write_u32(&mut buf, &mut off, self.attributes.len() as u32);

        for attr in &self.attributes {
            let name_bytes = attr.name.as_bytes();
            let n = name_bytes.len().min(NAME_LEN);
            buf[off..off + n].copy_from_slice(&name_bytes[..n]);
            off += NAME_LEN;
            write_u32(&mut buf, &mut off, attr.ty.tag());
            write_u32(&mut buf, &mut off, attr.ty.declared_length());
        }

        write_u32(&mut buf, &mut off, self.key.len() as u32);
        for &idx in &self.key {
            write_u32(&mut buf, &mut off, idx);
        }

        Ok(buf)
    }

    /// Decodes a schema and the live counters from a header page previously
    /// produced by [`Schema::encode_header`].
    pub fn decode_header(buf: &[u8]) -> StorageResult<(Schema, u32, u32)> {
        let mut off = 0;
        let num_tuples = read_u32(buf, &mut off);
        let first_free_page = read_u32(buf, &mut off);
        let _record_size = read_u32(buf, &mut off);
        let num_attr = read_u32(buf, &mut off) as usize;

        let mut attributes = Vec::with_capacity(num_attr);
        for _ in 0..num_attr {
            let name_bytes = &buf[off..off + NAME_LEN];
            let end = name_bytes.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
            let name = String::from_utf8_lossy(&name_bytes[..end]).into_owned();
            off += NAME_LEN;
            let tag = read_u32(buf, &mut off);
            let length = read_u32(buf, &mut off);
            let ty = DataType::from_tag(tag, length).ok_or_else(|| {
                StorageError::ReadFailed(format!("unknown type tag {tag} in schema header"))
            })?;
            attributes.push(Attribute::new(name, ty));
        }

        let key_size = read_u32(buf, &mut off) as usize;
        let mut key = Vec::with_capacity(key_size);
        for _ in 0..key_size {
            key.push(read_u32(buf, &mut off));
        }

        Ok((Schema::new(attributes, key), num_tuples, first_free_page))
    }
}

fn write_u32(buf: &mut [u8], off: &mut usize, v: u32) {
    buf[*off..*off + 4].copy_from_slice(&v.to_ne_bytes());
    *off += 4;
}

fn read_u32(buf: &[u8], off: &mut usize) -> u32 {
    let v = u32::from_ne_bytes(buf[*off..*off + 4].try_into().unwrap());
    *off += 4;
    v
}
