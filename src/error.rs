//! Crate-wide error type.
//!
//! Mirrors the kind-not-type error design: one flat enum of causes,
//! each carrying just enough context to explain itself. No panic is
//! raised for a caller mistake (bad row shape, missing table, full
//! page); panics remain for invariants this crate itself must keep
//! (corrupt on-disk page header, programmer misuse of a handle from
//! a different table).

use std::fmt;

/// The kind of failure that occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A page cannot fit a record or an update.
    NoRoom,
    /// A referenced block id does not exist.
    UnknownBlock,
    /// A referenced record id does not exist, or is tombstoned.
    UnknownRecord,
    /// A referenced table is not registered in the catalog.
    UnknownTable,
    /// A referenced index is not registered in the catalog.
    UnknownIndex,
    /// A referenced column is not part of a table's schema.
    UnknownColumn,
    /// A row does not match its table's schema.
    RowShape,
    /// A marshaled row would exceed page capacity.
    RowTooLarge,
    /// A WHERE clause is not a conjunction of `column = literal`.
    UnsupportedPredicate,
    /// Attempt to drop one of the three schema catalog tables.
    CannotDropSchema,
    /// A B-tree index was requested with `unique = false`.
    NonUniqueUnsupported,
    /// `CREATE INDEX ... USING <type>` named a type other than `BTREE`.
    UnsupportedIndexType,
    /// An entity (table, index) that must not already exist does.
    AlreadyExists,
    /// Operation has no implementation in this core (DELETE-from-index,
    /// range scans, update-through-index).
    NotImplemented,
    /// Propagated from the block store.
    Io,
}

/// A crate error: a kind plus a human-readable description of what
/// was being attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: impl Into<String>) -> Self {
        Error {
            kind,
            context: context.into(),
        }
    }

    pub fn no_room(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoRoom, context)
    }
    pub fn unknown_block(id: u32) -> Self {
        Self::new(ErrorKind::UnknownBlock, format!("block {id}"))
    }
    pub fn unknown_record(block: u32, rec: u16) -> Self {
        Self::new(ErrorKind::UnknownRecord, format!("record ({block}, {rec})"))
    }
    pub fn unknown_table(name: &str) -> Self {
        Self::new(ErrorKind::UnknownTable, format!("table '{name}'"))
    }
    pub fn unknown_index(table: &str, name: &str) -> Self {
        Self::new(ErrorKind::UnknownIndex, format!("index '{name}' on '{table}'"))
    }
    pub fn unknown_column(name: &str) -> Self {
        Self::new(ErrorKind::UnknownColumn, format!("column '{name}'"))
    }
    pub fn row_shape(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::RowShape, context)
    }
    pub fn row_too_large(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::RowTooLarge, context)
    }
    pub fn unsupported_predicate(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedPredicate, context)
    }
    pub fn cannot_drop_schema(name: &str) -> Self {
        Self::new(ErrorKind::CannotDropSchema, format!("'{name}' is a schema catalog table"))
    }
    pub fn non_unique_unsupported() -> Self {
        Self::new(ErrorKind::NonUniqueUnsupported, "B-tree indexes must be unique")
    }
    pub fn unsupported_index_type(ty: &str) -> Self {
        Self::new(ErrorKind::UnsupportedIndexType, format!("'{ty}'"))
    }
    pub fn already_exists(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyExists, context)
    }
    pub fn not_implemented(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotImplemented, context)
    }
    pub fn io(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, context)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
