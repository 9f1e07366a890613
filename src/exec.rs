//! Executor: dispatches a parsed `Statement` to catalog mutation
//! and/or plan construction/evaluation, producing a `QueryResult`.

use crate::ast::{Expr, SelectColumns, Statement};
use crate::catalog::Catalog;
use crate::error::Result;
use crate::plan::{evaluate, optimize, pipeline, EvalPlan};
use crate::stg::BlockStore;
use crate::table::Handle;
use crate::value::{Identifier, Row, Value};
use std::collections::HashMap;

/// The outcome of one executed statement.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// CREATE/DROP TABLE/INDEX succeeded.
    Success,
    /// SHOW or SELECT rows.
    Rows(Vec<Row>),
    /// INSERT succeeded, at this handle.
    Inserted(Handle),
    /// DELETE removed this many rows.
    Deleted { count: usize },
}

/// Compile an optional WHERE expression into the equality map a plan's
/// `Select` node filters by. Fails with `UnsupportedPredicate` unless
/// the expression is a conjunction of `column = literal` clauses.
fn where_to_map(where_: &Option<Expr>) -> Result<HashMap<Identifier, Value>> {
    match where_ {
        None => Ok(HashMap::new()),
        Some(expr) => Ok(crate::ast::where_conjunction(expr)?
            .into_iter()
            .map(|eq| (eq.column, eq.literal))
            .collect()),
    }
}

/// A process-wide statement dispatcher, holding the schema catalog.
pub struct Executor<S: BlockStore> {
    catalog: Catalog<S>,
}

impl<S: BlockStore> Executor<S> {
    pub fn open() -> Result<Self> {
        Ok(Executor {
            catalog: Catalog::open()?,
        })
    }

    pub fn catalog(&self) -> &Catalog<S> {
        &self.catalog
    }

    pub fn execute(&self, stmt: &Statement) -> Result<QueryResult> {
        match stmt {
            Statement::CreateTable { table, columns } => {
                self.catalog.create_table(table, columns.clone())?;
                Ok(QueryResult::Success)
            }
            Statement::DropTable { table } => {
                self.catalog.drop_table(table)?;
                Ok(QueryResult::Success)
            }
            Statement::CreateIndex {
                index,
                table,
                columns,
                using,
            } => {
                let index_type = using.as_deref().unwrap_or("BTREE");
                self.catalog.create_index(table, index, columns, index_type)?;
                Ok(QueryResult::Success)
            }
            Statement::DropIndex { index, table } => {
                self.catalog.drop_index(table, index)?;
                Ok(QueryResult::Success)
            }
            Statement::ShowTables => {
                let t = self.catalog.get_table("_tables")?;
                let t = t.borrow();
                let rows = t.select()?.into_iter().map(|h| t.project(h)).collect::<Result<_>>()?;
                Ok(QueryResult::Rows(rows))
            }
            Statement::ShowColumns { table } => self.show_catalog_rows("_columns", table),
            Statement::ShowIndex { table } => self.show_catalog_rows("_indices", table),
            Statement::Insert { table, columns, values } => self.insert(table, columns, values),
            Statement::Delete { table, where_ } => self.delete(table, where_),
            Statement::Select { table, columns, where_ } => self.select(table, columns, where_),
        }
    }

    fn show_catalog_rows(&self, catalog_table: &str, table: &str) -> Result<QueryResult> {
        let t = self.catalog.get_table(catalog_table)?;
        let t = t.borrow();
        let where_ = HashMap::from([("table_name".to_string(), Value::Text(table.to_string()))]);
        let rows = t
            .select_where(&where_)?
            .into_iter()
            .map(|h| t.project(h))
            .collect::<Result<_>>()?;
        Ok(QueryResult::Rows(rows))
    }

    fn insert(&self, table: &str, columns: &Option<Vec<Identifier>>, values: &[Value]) -> Result<QueryResult> {
        let t = self.catalog.get_table(table)?;
        let schema = t.borrow().schema.clone();
        let col_order: Vec<Identifier> = columns
            .clone()
            .unwrap_or_else(|| schema.iter().map(|c| c.name.clone()).collect());
        if col_order.len() != values.len() {
            return Err(crate::error::Error::row_shape(format!(
                "{} columns named but {} values given",
                col_order.len(),
                values.len()
            )));
        }
        let mut row = Row::new();
        for (c, v) in col_order.iter().zip(values.iter()) {
            row.set(c.clone(), v.clone());
        }
        let handle = t.borrow_mut().insert(&row)?;

        for index_name in self.catalog.get_index_names(table)? {
            let ix = self.catalog.get_index(table, &index_name)?;
            let key_cols = ix.borrow().key_cols.clone();
            let key: Vec<Value> = key_cols
                .iter()
                .map(|c| row.get(c).cloned().ok_or_else(|| crate::error::Error::unknown_column(c)))
                .collect::<Result<_>>()?;
            ix.borrow_mut().insert(key, handle)?;
        }
        Ok(QueryResult::Inserted(handle))
    }

    fn delete(&self, table: &str, where_: &Option<Expr>) -> Result<QueryResult> {
        let where_map = where_to_map(where_)?;
        let scan = EvalPlan::TableScan(table.to_string());
        let plan = if where_map.is_empty() {
            scan
        } else {
            EvalPlan::Select(where_map, Box::new(scan))
        };
        let plan = optimize(plan, &self.catalog)?;
        let (_, handles) = pipeline(&plan, &self.catalog)?;

        let t = self.catalog.get_table(table)?;
        let index_names = self.catalog.get_index_names(table)?;
        let mut indexes = Vec::with_capacity(index_names.len());
        for name in &index_names {
            indexes.push(self.catalog.get_index(table, name)?);
        }

        for h in &handles {
            let row = t.borrow().project(*h)?;
            for ix in &indexes {
                let key_cols = ix.borrow().key_cols.clone();
                let key: Vec<Value> = key_cols.iter().map(|c| row.get(c).cloned().unwrap()).collect();
                ix.borrow_mut().remove_entry(&key, *h)?;
            }
            t.borrow_mut().del(*h)?;
        }
        Ok(QueryResult::Deleted { count: handles.len() })
    }

    fn select(&self, table: &str, columns: &SelectColumns, where_: &Option<Expr>) -> Result<QueryResult> {
        let where_map = where_to_map(where_)?;
        let scan = EvalPlan::TableScan(table.to_string());
        let filtered = if where_map.is_empty() {
            scan
        } else {
            EvalPlan::Select(where_map, Box::new(scan))
        };
        let plan = match columns {
            SelectColumns::All => filtered,
            SelectColumns::List(cols) => EvalPlan::Project(cols.clone(), Box::new(filtered)),
        };
        let plan = optimize(plan, &self.catalog)?;
        let rows = evaluate(&plan, &self.catalog)?;
        Ok(QueryResult::Rows(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;
    use crate::stg::MemBlockStore;
    use crate::value::{ColumnDef, DataType};

    fn create_foo(exec: &Executor<MemBlockStore>, name: &str) {
        exec.execute(&Statement::CreateTable {
            table: name.to_string(),
            columns: vec![
                ColumnDef::new("id", DataType::Int),
                ColumnDef::new("name", DataType::Text),
            ],
        })
        .unwrap();
    }

    #[test]
    fn create_and_show_tables() {
        let exec = Executor::<MemBlockStore>::open().unwrap();
        create_foo(&exec, "exec-foo1");
        let result = exec.execute(&Statement::ShowTables).unwrap();
        match result {
            QueryResult::Rows(rows) => {
                assert!(rows.iter().any(|r| r.get("table_name") == Some(&Value::Text("exec-foo1".into()))));
            }
            other => panic!("expected Rows, got {other:?}"),
        }
        exec.execute(&Statement::DropTable {
            table: "exec-foo1".to_string(),
        })
        .unwrap();
    }

    #[test]
    fn insert_select_roundtrip() {
        let exec = Executor::<MemBlockStore>::open().unwrap();
        create_foo(&exec, "exec-foo2");
        exec.execute(&Statement::Insert {
            table: "exec-foo2".to_string(),
            columns: None,
            values: vec![Value::Int(1), Value::Text("a".into())],
        })
        .unwrap();
        exec.execute(&Statement::Insert {
            table: "exec-foo2".to_string(),
            columns: None,
            values: vec![Value::Int(2), Value::Text("b".into())],
        })
        .unwrap();
        let result = exec
            .execute(&Statement::Select {
                table: "exec-foo2".to_string(),
                columns: SelectColumns::All,
                where_: None,
            })
            .unwrap();
        match result {
            QueryResult::Rows(rows) => assert_eq!(rows.len(), 2),
            other => panic!("expected Rows, got {other:?}"),
        }
        exec.execute(&Statement::DropTable {
            table: "exec-foo2".to_string(),
        })
        .unwrap();
    }

    #[test]
    fn select_with_index_and_delete() {
        let exec = Executor::<MemBlockStore>::open().unwrap();
        create_foo(&exec, "exec-foo3");
        exec.execute(&Statement::Insert {
            table: "exec-foo3".to_string(),
            columns: None,
            values: vec![Value::Int(1), Value::Text("a".into())],
        })
        .unwrap();
        exec.execute(&Statement::Insert {
            table: "exec-foo3".to_string(),
            columns: None,
            values: vec![Value::Int(2), Value::Text("b".into())],
        })
        .unwrap();
        exec.execute(&Statement::CreateIndex {
            index: "fx".to_string(),
            table: "exec-foo3".to_string(),
            columns: vec!["id".to_string()],
            using: None,
        })
        .unwrap();

        let result = exec
            .execute(&Statement::Select {
                table: "exec-foo3".to_string(),
                columns: SelectColumns::List(vec!["name".to_string()]),
                where_: Some(Expr::eq("id", Value::Int(2))),
            })
            .unwrap();
        match result {
            QueryResult::Rows(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].get("name"), Some(&Value::Text("b".into())));
            }
            other => panic!("expected Rows, got {other:?}"),
        }

        let deleted = exec
            .execute(&Statement::Delete {
                table: "exec-foo3".to_string(),
                where_: Some(Expr::eq("id", Value::Int(1))),
            })
            .unwrap();
        assert_eq!(deleted, QueryResult::Deleted { count: 1 });

        let ix = exec.catalog().get_index("exec-foo3", "fx").unwrap();
        assert_eq!(ix.borrow().lookup(&[Value::Int(1)]).unwrap(), Vec::<Handle>::new());
        assert_eq!(ix.borrow().lookup(&[Value::Int(2)]).unwrap().len(), 1);

        exec.execute(&Statement::DropTable {
            table: "exec-foo3".to_string(),
        })
        .unwrap();
    }

    #[test]
    fn drop_tables_schema_table_refused() {
        let exec = Executor::<MemBlockStore>::open().unwrap();
        let result = exec.execute(&Statement::DropTable {
            table: "_tables".to_string(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn select_with_non_equality_predicate_is_rejected() {
        let exec = Executor::<MemBlockStore>::open().unwrap();
        create_foo(&exec, "exec-foo4");
        let result = exec.execute(&Statement::Select {
            table: "exec-foo4".to_string(),
            columns: SelectColumns::All,
            where_: Some(Expr::eq("id", Value::Int(1)).and(Expr::Unsupported("OR".to_string()))),
        });
        let err = result.unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::UnsupportedPredicate);
        exec.execute(&Statement::DropTable {
            table: "exec-foo4".to_string(),
        })
        .unwrap();
    }

    #[test]
    fn type_mismatched_equality_returns_no_rows_indexed_or_not() {
        // A TEXT literal against an INT column can never match (spec
        // §3: values of different tags are unequal); the indexed path
        // must agree with the unindexed one instead of panicking.
        let exec = Executor::<MemBlockStore>::open().unwrap();
        create_foo(&exec, "exec-foo5");
        exec.execute(&Statement::Insert {
            table: "exec-foo5".to_string(),
            columns: None,
            values: vec![Value::Int(1), Value::Text("a".into())],
        })
        .unwrap();

        let unindexed = exec
            .execute(&Statement::Select {
                table: "exec-foo5".to_string(),
                columns: SelectColumns::All,
                where_: Some(Expr::eq("id", Value::Text("x".into()))),
            })
            .unwrap();
        assert_eq!(unindexed, QueryResult::Rows(Vec::new()));

        exec.execute(&Statement::CreateIndex {
            index: "fx5".to_string(),
            table: "exec-foo5".to_string(),
            columns: vec!["id".to_string()],
            using: None,
        })
        .unwrap();

        let indexed = exec
            .execute(&Statement::Select {
                table: "exec-foo5".to_string(),
                columns: SelectColumns::All,
                where_: Some(Expr::eq("id", Value::Text("x".into()))),
            })
            .unwrap();
        assert_eq!(indexed, QueryResult::Rows(Vec::new()));

        exec.execute(&Statement::DropTable {
            table: "exec-foo5".to_string(),
        })
        .unwrap();
    }
}
