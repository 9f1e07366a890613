//! EvalPlan: the small tree of plan nodes an executed statement is
//! compiled to, its `optimize` rewrite pass, and the two ways a plan
//! is run: `pipeline` (handles only, for DELETE) and `evaluate`
//! (materialized rows, for SELECT).

use crate::catalog::Catalog;
use crate::error::Result;
use crate::stg::BlockStore;
use crate::table::Handle;
use crate::value::{Identifier, Row, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum EvalPlan {
    /// Emits every handle of `table`.
    TableScan(Identifier),
    /// Filters `child`'s handles by an equality conjunction.
    Select(HashMap<Identifier, Value>, Box<EvalPlan>),
    /// Materializes `child`'s handles, projected onto `columns`.
    Project(Vec<Identifier>, Box<EvalPlan>),
    /// Emits the handles `index.lookup(key)` returns on `table`.
    /// Produced only by `optimize`, never built directly by the
    /// executor.
    IndexLookup {
        table: Identifier,
        index: Identifier,
        key: Vec<Value>,
    },
}

impl EvalPlan {
    fn table_name(&self) -> &Identifier {
        match self {
            EvalPlan::TableScan(t) => t,
            EvalPlan::IndexLookup { table, .. } => table,
            EvalPlan::Select(_, child) => child.table_name(),
            EvalPlan::Project(_, child) => child.table_name(),
        }
    }
}

/// Rewrite every `Select(where, TableScan(t))` subtree whose `where`
/// covers the full key of some index on `t` into an `IndexLookup`,
/// wrapping it in a residual `Select` if `where` has columns beyond
/// the index's key. Leaves everything else untouched.
pub fn optimize<S: BlockStore>(plan: EvalPlan, catalog: &Catalog<S>) -> Result<EvalPlan> {
    match plan {
        EvalPlan::Select(where_, child) => {
            if let EvalPlan::TableScan(table) = child.as_ref() {
                for index_name in catalog.get_index_names(table)? {
                    let ix = catalog.get_index(table, &index_name)?;
                    let ix = ix.borrow();
                    if !ix.key_cols.is_empty() && ix.key_cols.iter().all(|c| where_.contains_key(c)) {
                        let key: Vec<Value> = ix.key_cols.iter().map(|c| where_[c].clone()).collect();
                        let residual: HashMap<Identifier, Value> = where_
                            .iter()
                            .filter(|(c, _)| !ix.key_cols.contains(c))
                            .map(|(c, v)| (c.clone(), v.clone()))
                            .collect();
                        let lookup = EvalPlan::IndexLookup {
                            table: table.clone(),
                            index: index_name,
                            key,
                        };
                        return Ok(if residual.is_empty() {
                            lookup
                        } else {
                            EvalPlan::Select(residual, Box::new(lookup))
                        });
                    }
                }
            }
            Ok(EvalPlan::Select(where_, Box::new(optimize(*child, catalog)?)))
        }
        EvalPlan::Project(cols, child) => Ok(EvalPlan::Project(cols, Box::new(optimize(*child, catalog)?))),
        other => Ok(other),
    }
}

/// Run a plan down to its handle set, alongside the name of the table
/// those handles live in. Used for DELETE, which needs handles (to
/// remove from indexes and the table) rather than materialized rows.
pub fn pipeline<S: BlockStore>(plan: &EvalPlan, catalog: &Catalog<S>) -> Result<(Identifier, Vec<Handle>)> {
    match plan {
        EvalPlan::TableScan(table) => {
            let t = catalog.get_table(table)?;
            let handles = t.borrow().select()?;
            Ok((table.clone(), handles))
        }
        EvalPlan::IndexLookup { table, index, key } => {
            let ix = catalog.get_index(table, index)?;
            let handles = ix.borrow().lookup(key)?;
            Ok((table.clone(), handles))
        }
        EvalPlan::Select(where_, child) => {
            let (table, handles) = pipeline(child, catalog)?;
            let t = catalog.get_table(&table)?;
            let t = t.borrow();
            let mut out = Vec::new();
            for h in handles {
                let row = t.project(h)?;
                if where_.iter().all(|(c, v)| row.get(c) == Some(v)) {
                    out.push(h);
                }
            }
            Ok((table, out))
        }
        EvalPlan::Project(_, child) => pipeline(child, catalog),
    }
}

/// Run a plan to materialized rows: `Project` on top selects a column
/// subset, otherwise every handle is projected onto the full schema.
pub fn evaluate<S: BlockStore>(plan: &EvalPlan, catalog: &Catalog<S>) -> Result<Vec<Row>> {
    match plan {
        EvalPlan::Project(cols, child) => {
            let (table, handles) = pipeline(child, catalog)?;
            let t = catalog.get_table(&table)?;
            let t = t.borrow();
            handles.into_iter().map(|h| t.project_columns(h, cols)).collect()
        }
        other => {
            let table = other.table_name().clone();
            let (_, handles) = pipeline(other, catalog)?;
            let t = catalog.get_table(&table)?;
            let t = t.borrow();
            handles.into_iter().map(|h| t.project(h)).collect()
        }
    }
}
