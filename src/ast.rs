//! The statement shapes this crate consumes. An external SQL parser is
//! assumed to produce these; this module only defines the seam.

use crate::error::{Error, Result};
use crate::value::{ColumnDef, Identifier, Value};

/// One `column = literal` clause. A WHERE clause this core can execute
/// is a conjunction of these.
#[derive(Debug, Clone, PartialEq)]
pub struct Eq {
    pub column: Identifier,
    pub literal: Value,
}

/// A conjunction of `column = literal` clauses — the only predicate
/// shape a plan's `Select` node filters by.
pub type WherePredicate = Vec<Eq>;

/// A WHERE expression as an external SQL parser hands it over: a tree
/// of operators, not yet known to be a conjunction of equalities. This
/// core recognizes only `=` and `AND`; every other operator a real
/// parser can produce (`OR`, `<`, `LIKE`, ...) still parses into this
/// type (the grammar itself is out of scope here) but is rejected once
/// the executor tries to compile it.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Eq(Identifier, Value),
    And(Box<Expr>, Box<Expr>),
    /// An operator this core does not execute. Carries a short
    /// description (e.g. `"OR"`, `"<"`, `"LIKE"`) for the error message.
    Unsupported(String),
}

impl Expr {
    pub fn eq(column: impl Into<Identifier>, literal: Value) -> Self {
        Expr::Eq(column.into(), literal)
    }

    pub fn and(self, other: Expr) -> Self {
        Expr::And(Box::new(self), Box::new(other))
    }
}

/// Flatten an `Expr` into a `WherePredicate`. Fails with
/// `UnsupportedPredicate` unless every leaf is an `=` clause joined
/// only by `AND`.
pub fn where_conjunction(expr: &Expr) -> Result<WherePredicate> {
    match expr {
        Expr::Eq(column, literal) => Ok(vec![Eq {
            column: column.clone(),
            literal: literal.clone(),
        }]),
        Expr::And(left, right) => {
            let mut clauses = where_conjunction(left)?;
            clauses.extend(where_conjunction(right)?);
            Ok(clauses)
        }
        Expr::Unsupported(desc) => Err(Error::unsupported_predicate(format!(
            "WHERE clause is not a conjunction of column = literal clauses (found {desc})"
        ))),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectColumns {
    All,
    List(Vec<Identifier>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable {
        table: Identifier,
        columns: Vec<ColumnDef>,
    },
    DropTable {
        table: Identifier,
    },
    CreateIndex {
        index: Identifier,
        table: Identifier,
        columns: Vec<Identifier>,
        using: Option<String>,
    },
    DropIndex {
        index: Identifier,
        table: Identifier,
    },
    ShowTables,
    ShowColumns {
        table: Identifier,
    },
    ShowIndex {
        table: Identifier,
    },
    Insert {
        table: Identifier,
        columns: Option<Vec<Identifier>>,
        values: Vec<Value>,
    },
    Delete {
        table: Identifier,
        where_: Option<Expr>,
    },
    Select {
        table: Identifier,
        columns: SelectColumns,
        where_: Option<Expr>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_eq_clause() {
        let expr = Expr::eq("id", Value::Int(2));
        assert_eq!(
            where_conjunction(&expr).unwrap(),
            vec![Eq {
                column: "id".to_string(),
                literal: Value::Int(2)
            }]
        );
    }

    #[test]
    fn and_of_eq_clauses_flattens_to_conjunction() {
        let expr = Expr::eq("id", Value::Int(2)).and(Expr::eq("name", Value::Text("b".into())));
        let clauses = where_conjunction(&expr).unwrap();
        assert_eq!(clauses.len(), 2);
        assert!(clauses.contains(&Eq {
            column: "id".to_string(),
            literal: Value::Int(2)
        }));
        assert!(clauses.contains(&Eq {
            column: "name".to_string(),
            literal: Value::Text("b".into())
        }));
    }

    #[test]
    fn or_rejected_as_unsupported_predicate() {
        let expr = Expr::eq("id", Value::Int(2)).and(Expr::Unsupported("OR".to_string()));
        let err = where_conjunction(&expr).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::UnsupportedPredicate);
    }

    #[test]
    fn bare_comparison_rejected() {
        let expr = Expr::Unsupported("<".to_string());
        assert!(where_conjunction(&expr).is_err());
    }
}
