//! A single-process relational storage and execution core: heap tables
//! with a slotted-page record format, unique B-tree secondary indexes,
//! a schema catalog, and a small plan/executor layer dispatching
//! CREATE/DROP TABLE, CREATE/DROP INDEX, SHOW, INSERT, DELETE, and
//! SELECT statements.
//!
//! SQL parsing, the block store's concrete persistence mechanism, and
//! the interactive shell are external collaborators; this crate
//! consumes/produces plain Rust values at those seams (`ast::Statement`
//! in, `exec::QueryResult` out), layered on anything implementing
//! `stg::BlockStore`.

pub mod ast;
pub mod btree;
pub mod catalog;
pub mod error;
pub mod exec;
pub mod heap;
pub mod page;
pub mod plan;
pub mod stg;
pub mod table;
pub mod value;

pub use error::{Error, ErrorKind, Result};
pub use exec::{Executor, QueryResult};
pub use stg::{BlockStore, FileBlockStore, MemBlockStore};
pub use value::{ColumnDef, DataType, Identifier, Row, Value};
