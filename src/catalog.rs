//! Schema catalog: `_tables`, `_columns`, `_indices`, bootstrapped from
//! the same heap-table machinery they describe.
//!
//! A process-wide singleton, shared by reference. Opened user tables
//! and indexes are cached by name so repeated statements reuse the
//! same `HeapTable`/`BTreeIndex` instead of reopening their files.

use crate::btree::BTreeIndex;
use crate::error::{Error, Result};
use crate::stg::BlockStore;
use crate::table::{Handle, HeapTable};
use crate::value::{ColumnDef, DataType, Identifier, Row, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub type TableRef<S> = Rc<RefCell<HeapTable<S>>>;
pub type IndexRef<S> = Rc<RefCell<BTreeIndex<S>>>;

const TABLES: &str = "_tables";
const COLUMNS: &str = "_columns";
const INDICES: &str = "_indices";

fn is_schema_table(name: &str) -> bool {
    matches!(name, TABLES | COLUMNS | INDICES)
}

fn tables_schema() -> Vec<ColumnDef> {
    vec![ColumnDef::new("table_name", DataType::Text)]
}

fn columns_schema() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("table_name", DataType::Text),
        ColumnDef::new("column_name", DataType::Text),
        ColumnDef::new("data_type", DataType::Text),
    ]
}

fn indices_schema() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("table_name", DataType::Text),
        ColumnDef::new("index_name", DataType::Text),
        ColumnDef::new("seq_in_index", DataType::Int),
        ColumnDef::new("column_name", DataType::Text),
        ColumnDef::new("index_type", DataType::Text),
        ColumnDef::new("is_unique", DataType::Boolean),
    ]
}

pub struct Catalog<S: BlockStore> {
    tables: RefCell<HashMap<Identifier, TableRef<S>>>,
    indices: RefCell<HashMap<(Identifier, Identifier), IndexRef<S>>>,
}

impl<S: BlockStore> Catalog<S> {
    /// Bootstrap (or reopen) the three schema catalog tables.
    pub fn open() -> Result<Self> {
        let cat = Catalog {
            tables: RefCell::new(HashMap::new()),
            indices: RefCell::new(HashMap::new()),
        };
        for (name, schema) in [
            (TABLES, tables_schema()),
            (COLUMNS, columns_schema()),
            (INDICES, indices_schema()),
        ] {
            let t = HeapTable::<S>::create_if_not_exists(name, schema)?;
            cat.tables
                .borrow_mut()
                .insert(name.to_string(), Rc::new(RefCell::new(t)));
        }
        Ok(cat)
    }

    fn tables_tbl(&self) -> TableRef<S> {
        self.tables.borrow().get(TABLES).unwrap().clone()
    }
    fn columns_tbl(&self) -> TableRef<S> {
        self.tables.borrow().get(COLUMNS).unwrap().clone()
    }
    fn indices_tbl(&self) -> TableRef<S> {
        self.tables.borrow().get(INDICES).unwrap().clone()
    }

    pub fn table_exists(&self, name: &str) -> Result<bool> {
        if is_schema_table(name) {
            return Ok(true);
        }
        let where_ = HashMap::from([("table_name".to_string(), Value::Text(name.to_string()))]);
        let handles = self.tables_tbl().borrow().select_where(&where_)?;
        Ok(!handles.is_empty())
    }

    /// Column schema for `name`, reconstructed from `_columns` rows in
    /// insertion order (which, since `_columns` is append-only per
    /// table, is also ascending handle order).
    fn reconstruct_schema(&self, name: &str) -> Result<Vec<ColumnDef>> {
        let where_ = HashMap::from([("table_name".to_string(), Value::Text(name.to_string()))]);
        let columns = self.columns_tbl();
        let columns = columns.borrow();
        let handles = columns.select_where(&where_)?;
        let mut schema = Vec::with_capacity(handles.len());
        for h in handles {
            let row = columns.project(h)?;
            let col_name = row.get("column_name").and_then(Value::as_text).unwrap().to_string();
            let type_name = row.get("data_type").and_then(Value::as_text).unwrap();
            let data_type = DataType::from_name(type_name)
                .ok_or_else(|| Error::row_shape(format!("unknown column type '{type_name}'")))?;
            schema.push(ColumnDef::new(col_name, data_type));
        }
        Ok(schema)
    }

    /// Open (or return the cached handle to) a table, creating the
    /// catalog tables' own heap tables on first use. Fails with
    /// `UnknownTable` if `name` is not registered in `_tables`.
    pub fn get_table(&self, name: &str) -> Result<TableRef<S>> {
        if let Some(t) = self.tables.borrow().get(name) {
            return Ok(t.clone());
        }
        if !self.table_exists(name)? {
            return Err(Error::unknown_table(name));
        }
        let schema = self.reconstruct_schema(name)?;
        let t = HeapTable::<S>::open(name, schema)?;
        let t = Rc::new(RefCell::new(t));
        self.tables.borrow_mut().insert(name.to_string(), t.clone());
        Ok(t)
    }

    /// Register and materialize a new user table. Best-effort
    /// compensates `_tables`/`_columns` rows if any step fails,
    /// keeping C1's "exactly one row, or none" invariant.
    pub fn create_table(&self, name: &str, schema: Vec<ColumnDef>) -> Result<TableRef<S>> {
        if self.table_exists(name)? {
            return Err(Error::already_exists(format!("table '{name}'")));
        }
        let tables_tbl = self.tables_tbl();
        let table_row: Row = [("table_name".to_string(), Value::Text(name.to_string()))]
            .into_iter()
            .collect();
        let table_handle = tables_tbl.borrow_mut().insert(&table_row)?;

        let columns_tbl = self.columns_tbl();
        let mut column_handles = Vec::new();
        for col in &schema {
            let row: Row = [
                ("table_name".to_string(), Value::Text(name.to_string())),
                ("column_name".to_string(), Value::Text(col.name.clone())),
                ("data_type".to_string(), Value::Text(col.data_type.name().to_string())),
            ]
            .into_iter()
            .collect();
            match columns_tbl.borrow_mut().insert(&row) {
                Ok(h) => column_handles.push(h),
                Err(e) => {
                    for h in column_handles {
                        let _ = columns_tbl.borrow_mut().del(h);
                    }
                    let _ = tables_tbl.borrow_mut().del(table_handle);
                    return Err(e);
                }
            }
        }

        match HeapTable::<S>::create(name, schema) {
            Ok(t) => {
                let t = Rc::new(RefCell::new(t));
                self.tables.borrow_mut().insert(name.to_string(), t.clone());
                Ok(t)
            }
            Err(e) => {
                for h in column_handles {
                    let _ = columns_tbl.borrow_mut().del(h);
                }
                let _ = tables_tbl.borrow_mut().del(table_handle);
                Err(e)
            }
        }
    }

    /// Distinct index names on `table`, in first-appearance order.
    /// Empty (not an error) for a table with no indexes.
    pub fn get_index_names(&self, table: &str) -> Result<Vec<Identifier>> {
        let where_ = HashMap::from([("table_name".to_string(), Value::Text(table.to_string()))]);
        let indices = self.indices_tbl();
        let indices = indices.borrow();
        let handles = indices.select_where(&where_)?;
        let mut names = Vec::new();
        for h in handles {
            let row = indices.project(h)?;
            let index_name = row.get("index_name").and_then(Value::as_text).unwrap().to_string();
            if !names.contains(&index_name) {
                names.push(index_name);
            }
        }
        Ok(names)
    }

    fn index_rows(&self, table: &str, name: &str) -> Result<Vec<Row>> {
        let where_ = HashMap::from([
            ("table_name".to_string(), Value::Text(table.to_string())),
            ("index_name".to_string(), Value::Text(name.to_string())),
        ]);
        let indices = self.indices_tbl();
        let indices = indices.borrow();
        let handles = indices.select_where(&where_)?;
        let mut rows: Vec<Row> = handles
            .into_iter()
            .map(|h| indices.project(h))
            .collect::<Result<_>>()?;
        rows.sort_by_key(|r| r.get("seq_in_index").and_then(Value::as_int).unwrap());
        Ok(rows)
    }

    /// Reconstruct and open a `BTreeIndex` from its `_indices` rows.
    pub fn get_index(&self, table: &str, name: &str) -> Result<IndexRef<S>> {
        let key = (table.to_string(), name.to_string());
        if let Some(ix) = self.indices.borrow().get(&key) {
            return Ok(ix.clone());
        }
        let rows = self.index_rows(table, name)?;
        if rows.is_empty() {
            return Err(Error::unknown_index(table, name));
        }
        let schema = self.reconstruct_schema(table)?;
        let mut key_cols = Vec::with_capacity(rows.len());
        let mut key_profile = Vec::with_capacity(rows.len());
        for row in &rows {
            let col = row.get("column_name").and_then(Value::as_text).unwrap().to_string();
            let data_type = schema
                .iter()
                .find(|c| c.name == col)
                .map(|c| c.data_type)
                .ok_or_else(|| Error::unknown_column(&col))?;
            key_cols.push(col);
            key_profile.push(data_type);
        }
        let unique = rows[0].get("is_unique").and_then(Value::as_bool).unwrap_or(true);
        let ix = BTreeIndex::<S>::open(table, name, key_cols, key_profile, unique)?;
        let ix = Rc::new(RefCell::new(ix));
        self.indices.borrow_mut().insert(key, ix.clone());
        Ok(ix)
    }

    /// Validate columns and index type, register `_indices` rows, then
    /// create and bulk-populate the B-tree. `is_unique = (index_type ==
    /// "BTREE")` per the statement-dispatch contract.
    pub fn create_index(
        &self,
        table: &str,
        name: &str,
        columns: &[Identifier],
        index_type: &str,
    ) -> Result<IndexRef<S>> {
        if index_type != "BTREE" {
            return Err(Error::unsupported_index_type(index_type));
        }
        if self.get_index_names(table)?.contains(&name.to_string()) {
            return Err(Error::already_exists(format!("index '{name}' on '{table}'")));
        }
        let t = self.get_table(table)?;
        let schema = t.borrow().schema.clone();
        for col in columns {
            if !schema.iter().any(|c| &c.name == col) {
                return Err(Error::unknown_column(col));
            }
        }
        let is_unique = index_type == "BTREE";

        let indices_tbl = self.indices_tbl();
        let mut inserted = Vec::new();
        for (seq, col) in columns.iter().enumerate() {
            let row: Row = [
                ("table_name".to_string(), Value::Text(table.to_string())),
                ("index_name".to_string(), Value::Text(name.to_string())),
                ("seq_in_index".to_string(), Value::Int(seq as i32)),
                ("column_name".to_string(), Value::Text(col.clone())),
                ("index_type".to_string(), Value::Text(index_type.to_string())),
                ("is_unique".to_string(), Value::Boolean(is_unique)),
            ]
            .into_iter()
            .collect();
            match indices_tbl.borrow_mut().insert(&row) {
                Ok(h) => inserted.push(h),
                Err(e) => {
                    for h in inserted {
                        let _ = indices_tbl.borrow_mut().del(h);
                    }
                    return Err(e);
                }
            }
        }

        let key_profile: Vec<DataType> = columns
            .iter()
            .map(|c| schema.iter().find(|sc| &sc.name == c).unwrap().data_type)
            .collect();
        let rows: Vec<(Vec<Value>, Handle)> = {
            let t = t.borrow();
            let mut out = Vec::new();
            for h in t.select()? {
                let key_row = t.project_columns(h, columns)?;
                let key: Vec<Value> = columns.iter().map(|c| key_row.get(c).unwrap().clone()).collect();
                out.push((key, h));
            }
            out
        };

        match BTreeIndex::<S>::create(table, name, columns.to_vec(), key_profile, is_unique, rows) {
            Ok(ix) => {
                let ix = Rc::new(RefCell::new(ix));
                self.indices
                    .borrow_mut()
                    .insert((table.to_string(), name.to_string()), ix.clone());
                Ok(ix)
            }
            Err(e) => {
                for h in inserted {
                    let _ = indices_tbl.borrow_mut().del(h);
                }
                // BTreeIndex::create already created its backing file
                // exclusively before the bulk-populate loop could fail;
                // without this the file is orphaned and a retry of the
                // same CREATE INDEX fails on the exclusive-create check
                // instead of repopulating cleanly.
                let _ = BTreeIndex::<S>::drop_index(table, name);
                Err(e)
            }
        }
    }

    pub fn drop_index(&self, table: &str, name: &str) -> Result<()> {
        let where_ = HashMap::from([
            ("table_name".to_string(), Value::Text(table.to_string())),
            ("index_name".to_string(), Value::Text(name.to_string())),
        ]);
        let indices_tbl = self.indices_tbl();
        let handles = indices_tbl.borrow().select_where(&where_)?;
        if handles.is_empty() {
            return Err(Error::unknown_index(table, name));
        }
        for h in handles {
            indices_tbl.borrow_mut().del(h)?;
        }
        BTreeIndex::<S>::drop_index(table, name)?;
        self.indices.borrow_mut().remove(&(table.to_string(), name.to_string()));
        Ok(())
    }

    /// Refuses on the three schema tables. Drops every index on
    /// `table` first, then its `_columns` rows, then its heap file,
    /// then its `_tables` row.
    pub fn drop_table(&self, table: &str) -> Result<()> {
        if is_schema_table(table) {
            return Err(Error::cannot_drop_schema(table));
        }
        if !self.table_exists(table)? {
            return Err(Error::unknown_table(table));
        }
        for index_name in self.get_index_names(table)? {
            self.drop_index(table, &index_name)?;
        }

        let columns_tbl = self.columns_tbl();
        let where_cols = HashMap::from([("table_name".to_string(), Value::Text(table.to_string()))]);
        let handles = columns_tbl.borrow().select_where(&where_cols)?;
        for h in handles {
            columns_tbl.borrow_mut().del(h)?;
        }

        HeapTable::<S>::drop_table(table)?;

        let tables_tbl = self.tables_tbl();
        let where_tbl = HashMap::from([("table_name".to_string(), Value::Text(table.to_string()))]);
        let handles = tables_tbl.borrow().select_where(&where_tbl)?;
        for h in handles {
            tables_tbl.borrow_mut().del(h)?;
        }

        self.tables.borrow_mut().remove(table);
        Ok(())
    }
}
