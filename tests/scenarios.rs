//! End-to-end acceptance scenarios run against the full executor,
//! mirroring the six literal scenarios the engine must satisfy.

use rustdb_lite::ast::{Expr, SelectColumns, Statement};
use rustdb_lite::exec::QueryResult;
use rustdb_lite::value::{ColumnDef, DataType, Value};
use rustdb_lite::{Executor, MemBlockStore};

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

fn drop_foo(exec: &Executor<MemBlockStore>, name: &str) {
    exec.execute(&Statement::DropTable {
        table: name.to_string(),
    })
    .unwrap();
}

#[test]
fn scenario_1_create_and_show_tables() {
    let exec = Executor::<MemBlockStore>::open().unwrap();
    create_foo(&exec, "scn1-foo");
    let result = exec.execute(&Statement::ShowTables).unwrap();
    let rows = match result {
        QueryResult::Rows(rows) => rows,
        other => panic!("expected Rows, got {other:?}"),
    };
    let matches: Vec<_> = rows
        .iter()
        .filter(|r| r.get("table_name") == Some(&Value::Text("scn1-foo".into())))
        .collect();
    assert_eq!(matches.len(), 1);
    drop_foo(&exec, "scn1-foo");
}

#[test]
fn scenario_2_insert_select_roundtrip() {
    let exec = Executor::<MemBlockStore>::open().unwrap();
    create_foo(&exec, "scn2-foo");
    exec.execute(&Statement::Insert {
        table: "scn2-foo".to_string(),
        columns: None,
        values: vec![Value::Int(1), Value::Text("a".into())],
    })
    .unwrap();
    exec.execute(&Statement::Insert {
        table: "scn2-foo".to_string(),
        columns: None,
        values: vec![Value::Int(2), Value::Text("b".into())],
    })
    .unwrap();
    let result = exec
        .execute(&Statement::Select {
            table: "scn2-foo".to_string(),
            columns: SelectColumns::All,
            where_: None,
        })
        .unwrap();
    let mut rows = match result {
        QueryResult::Rows(rows) => rows,
        other => panic!("expected Rows, got {other:?}"),
    };
    rows.sort_by_key(|r| r.get("id").and_then(Value::as_int).unwrap());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("id"), Some(&Value::Int(1)));
    assert_eq!(rows[0].get("name"), Some(&Value::Text("a".into())));
    assert_eq!(rows[1].get("id"), Some(&Value::Int(2)));
    assert_eq!(rows[1].get("name"), Some(&Value::Text("b".into())));
    drop_foo(&exec, "scn2-foo");
}

#[test]
fn scenario_3_equality_predicate_uses_index() {
    let exec = Executor::<MemBlockStore>::open().unwrap();
    create_foo(&exec, "scn3-foo");
    exec.execute(&Statement::Insert {
        table: "scn3-foo".to_string(),
        columns: None,
        values: vec![Value::Int(1), Value::Text("a".into())],
    })
    .unwrap();
    exec.execute(&Statement::Insert {
        table: "scn3-foo".to_string(),
        columns: None,
        values: vec![Value::Int(2), Value::Text("b".into())],
    })
    .unwrap();
    exec.execute(&Statement::CreateIndex {
        index: "fx".to_string(),
        table: "scn3-foo".to_string(),
        columns: vec!["id".to_string()],
        using: None,
    })
    .unwrap();

    use rustdb_lite::plan::{optimize, EvalPlan};
    let plan = EvalPlan::Select(
        std::collections::HashMap::from([("id".to_string(), Value::Int(2))]),
        Box::new(EvalPlan::TableScan("scn3-foo".to_string())),
    );
    let optimized = optimize(plan, exec.catalog()).unwrap();
    assert!(matches!(optimized, EvalPlan::IndexLookup { .. }), "expected indexed plan, got {optimized:?}");

    let result = exec
        .execute(&Statement::Select {
            table: "scn3-foo".to_string(),
            columns: SelectColumns::List(vec!["name".to_string()]),
            where_: Some(Expr::eq("id", Value::Int(2))),
        })
        .unwrap();
    let rows = match result {
        QueryResult::Rows(rows) => rows,
        other => panic!("expected Rows, got {other:?}"),
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name"), Some(&Value::Text("b".into())));
    drop_foo(&exec, "scn3-foo");
}

#[test]
fn scenario_4_delete_by_predicate_maintains_index() {
    let exec = Executor::<MemBlockStore>::open().unwrap();
    create_foo(&exec, "scn4-foo");
    exec.execute(&Statement::Insert {
        table: "scn4-foo".to_string(),
        columns: None,
        values: vec![Value::Int(1), Value::Text("a".into())],
    })
    .unwrap();
    exec.execute(&Statement::Insert {
        table: "scn4-foo".to_string(),
        columns: None,
        values: vec![Value::Int(2), Value::Text("b".into())],
    })
    .unwrap();
    exec.execute(&Statement::CreateIndex {
        index: "fx".to_string(),
        table: "scn4-foo".to_string(),
        columns: vec!["id".to_string()],
        using: None,
    })
    .unwrap();

    let deleted = exec
        .execute(&Statement::Delete {
            table: "scn4-foo".to_string(),
            where_: Some(Expr::eq("id", Value::Int(1))),
        })
        .unwrap();
    assert_eq!(deleted, QueryResult::Deleted { count: 1 });

    let result = exec
        .execute(&Statement::Select {
            table: "scn4-foo".to_string(),
            columns: SelectColumns::All,
            where_: None,
        })
        .unwrap();
    let rows = match result {
        QueryResult::Rows(rows) => rows,
        other => panic!("expected Rows, got {other:?}"),
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("id"), Some(&Value::Int(2)));

    let ix = exec.catalog().get_index("scn4-foo", "fx").unwrap();
    assert!(ix.borrow().lookup(&[Value::Int(1)]).unwrap().is_empty());
    assert_eq!(ix.borrow().lookup(&[Value::Int(2)]).unwrap().len(), 1);

    drop_foo(&exec, "scn4-foo");
}

#[test]
fn scenario_5_page_overflow_creates_second_block() {
    let exec = Executor::<MemBlockStore>::open().unwrap();
    exec.execute(&Statement::CreateTable {
        table: "scn5-foo".to_string(),
        columns: vec![ColumnDef::new("id", DataType::Int), ColumnDef::new("pad", DataType::Text)],
    })
    .unwrap();
    let pad = "x".repeat(1018);
    for i in 0..5 {
        exec.execute(&Statement::Insert {
            table: "scn5-foo".to_string(),
            columns: None,
            values: vec![Value::Int(i), Value::Text(pad.clone())],
        })
        .unwrap();
    }
    let t = exec.catalog().get_table("scn5-foo").unwrap();
    let handles = t.borrow().select().unwrap();
    assert_eq!(handles.len(), 5);
    let blocks: std::collections::BTreeSet<_> = handles.iter().map(|h| h.0).collect();
    assert_eq!(blocks.len(), 2);
    drop_foo(&exec, "scn5-foo");
}

#[test]
fn scenario_6_drop_schema_table_refused() {
    let exec = Executor::<MemBlockStore>::open().unwrap();
    let result = exec.execute(&Statement::DropTable {
        table: "_tables".to_string(),
    });
    assert!(result.is_err());
    assert_eq!(result.unwrap_err().kind, rustdb_lite::ErrorKind::CannotDropSchema);

    let result = exec.execute(&Statement::ShowTables).unwrap();
    match result {
        QueryResult::Rows(_) => {}
        other => panic!("expected Rows, got {other:?}"),
    }
}

#[test]
fn scenario_7_non_equality_where_is_rejected() {
    let exec = Executor::<MemBlockStore>::open().unwrap();
    create_foo(&exec, "scn7-foo");
    exec.execute(&Statement::Insert {
        table: "scn7-foo".to_string(),
        columns: None,
        values: vec![Value::Int(1), Value::Text("a".into())],
    })
    .unwrap();

    let result = exec.execute(&Statement::Select {
        table: "scn7-foo".to_string(),
        columns: SelectColumns::All,
        where_: Some(Expr::Unsupported("<".to_string())),
    });
    assert_eq!(result.unwrap_err().kind, rustdb_lite::ErrorKind::UnsupportedPredicate);
    drop_foo(&exec, "scn7-foo");
}
