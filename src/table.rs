//! HeapTable: row-level CRUD and full-scan selection above a HeapFile
//! (spec §4.4).

use crate::error::{Error, Result};
use crate::heap::HeapFile;
use crate::page::RecordId;
use crate::stg::BlockStore;
use crate::value::{marshal, unmarshal, ColumnDef, Identifier, Row};
use std::collections::HashMap;

/// `(BlockID, RecordID)` — uniquely identifies a live row inside one
/// table. Stable only until the row is deleted, or relocated within
/// its page by an update.
pub type Handle = (u32, RecordId);

/// A table materialized as a heap file, with typed columns in schema
/// order (the order that governs the row codec).
pub struct HeapTable<S: BlockStore> {
    pub name: Identifier,
    pub schema: Vec<ColumnDef>,
    file: HeapFile<S>,
}

impl<S: BlockStore> HeapTable<S> {
    pub fn create(name: &str, schema: Vec<ColumnDef>) -> Result<Self> {
        let file = HeapFile::create(name)?;
        Ok(HeapTable {
            name: name.to_string(),
            schema,
            file,
        })
    }

    pub fn create_if_not_exists(name: &str, schema: Vec<ColumnDef>) -> Result<Self> {
        let file = HeapFile::create_if_not_exists(name)?;
        Ok(HeapTable {
            name: name.to_string(),
            schema,
            file,
        })
    }

    pub fn open(name: &str, schema: Vec<ColumnDef>) -> Result<Self> {
        let file = HeapFile::open(name)?;
        Ok(HeapTable {
            name: name.to_string(),
            schema,
            file,
        })
    }

    pub fn drop_table(name: &str) -> Result<()> {
        HeapFile::<S>::drop_file(name)
    }

    pub fn close(&mut self) {
        self.file.close();
    }

    /// Validate and insert `row`, returning its new handle. Tries the
    /// last page first; on `NoRoom` a fresh page is allocated (this
    /// local recovery is never surfaced as an error per spec §7).
    pub fn insert(&mut self, row: &Row) -> Result<Handle> {
        row.validate(&self.schema)?;
        let bytes = marshal(row, &self.schema)?;

        let last_id = *self
            .file
            .block_ids()
            .last()
            .expect("a heap file always has at least one block");

        let mut page = self.file.get(last_id)?;
        match page.add(&bytes) {
            Ok(rec) => {
                self.file.put(last_id, &page)?;
                Ok((last_id, rec))
            }
            Err(_) => {
                let (new_id, mut new_page) = self.file.get_new()?;
                let rec = new_page.add(&bytes)?;
                self.file.put(new_id, &new_page)?;
                Ok((new_id, rec))
            }
        }
    }

    /// Replace the row at `handle` with `partial_row`'s columns merged
    /// onto the existing row (unspecified columns are left unchanged).
    /// Not wired to index maintenance (spec §4.4, §9).
    pub fn update(&mut self, handle: Handle, partial_row: &Row) -> Result<()> {
        let (block_id, rec_id) = handle;
        let mut page = self.file.get(block_id)?;
        let old_bytes = page
            .get(rec_id)
            .map_err(|_| Error::unknown_record(block_id, rec_id))?;
        let mut merged = unmarshal(old_bytes, &self.schema)?;
        for (col, val) in partial_row.iter() {
            merged.set(col.clone(), val.clone());
        }
        merged.validate(&self.schema)?;
        let bytes = marshal(&merged, &self.schema)?;
        page.put(rec_id, &bytes)?;
        self.file.put(block_id, &page)
    }

    /// Delete the row at `handle`.
    pub fn del(&mut self, handle: Handle) -> Result<()> {
        let (block_id, rec_id) = handle;
        let mut page = self.file.get(block_id)?;
        page.del(rec_id)
            .map_err(|_| Error::unknown_record(block_id, rec_id))?;
        self.file.put(block_id, &page)
    }

    /// Full scan: every block in ascending order, every live record in
    /// ascending order within it.
    pub fn select(&self) -> Result<Vec<Handle>> {
        let mut out = Vec::new();
        for block_id in self.file.block_ids() {
            let page = self.file.get(block_id)?;
            for rec_id in page.ids() {
                out.push((block_id, rec_id));
            }
        }
        Ok(out)
    }

    /// Full scan filtered by an equality conjunction: a handle is
    /// emitted only when its row's projection onto `where_`'s columns
    /// equals `where_` (property S1).
    pub fn select_where(&self, where_: &HashMap<Identifier, crate::value::Value>) -> Result<Vec<Handle>> {
        let mut out = Vec::new();
        for block_id in self.file.block_ids() {
            let page = self.file.get(block_id)?;
            for rec_id in page.ids() {
                let bytes = page.get(rec_id).expect("id came from page.ids()");
                let row = unmarshal(bytes, &self.schema)?;
                if where_
                    .iter()
                    .all(|(col, val)| row.get(col) == Some(val))
                {
                    out.push((block_id, rec_id));
                }
            }
        }
        Ok(out)
    }

    /// Full row at `handle`.
    pub fn project(&self, handle: Handle) -> Result<Row> {
        let (block_id, rec_id) = handle;
        let page = self.file.get(block_id)?;
        let bytes = page
            .get(rec_id)
            .map_err(|_| Error::unknown_record(block_id, rec_id))?;
        unmarshal(bytes, &self.schema)
    }

    /// Subset row at `handle`, in the order `columns` names. Fails with
    /// `UnknownColumn` if a name is not in the schema.
    pub fn project_columns(&self, handle: Handle, columns: &[Identifier]) -> Result<Row> {
        for c in columns {
            if !self.schema.iter().any(|col| &col.name == c) {
                return Err(Error::unknown_column(c));
            }
        }
        let row = self.project(handle)?;
        row.project(columns)
    }
}
