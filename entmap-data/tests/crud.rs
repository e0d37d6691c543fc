use chrono::{DateTime, TimeZone, Utc};
use entmap_data::crud;
use entmap_data::prelude::*;
use entmap_data::{metadata, EntityError, Operation, Row, ValueError};
use entmap_test::{CallKind, MockExecutor};

#[derive(Debug, Clone, Default, PartialEq)]
struct General {
    id: i64,
    id2: i64,
    name: String,
    create_at: Option<DateTime<Utc>>,
    version: i64,
    deprecated: String,
    scratch: String,
}

impl Entity for General {
    fn table_name() -> &'static str {
        "general"
    }

    fn schema() -> Schema {
        Schema::new()
            .column(Column::new("id").primary_key().auto_increment())
            .column(Column::new("id2").primary_key())
            .column(Column::new("name"))
            .column(Column::new("create_at").refuse_update().returning_insert())
            .column(Column::new("version").returning())
            .column(Column::new("deprecated").deprecated())
            .column(Column::new("scratch").ignored())
    }

    fn value_of(&self, column: &str) -> Option<Value> {
        match column {
            "id" => Some(self.id.to_value()),
            "id2" => Some(self.id2.to_value()),
            "name" => Some(self.name.to_value()),
            "create_at" => Some(self.create_at.to_value()),
            "version" => Some(self.version.to_value()),
            _ => None,
        }
    }

    fn set_value(&mut self, column: &str, value: Value) -> Result<(), ValueError> {
        match column {
            "id" => self.id = FromValue::from_value(value)?,
            "id2" => self.id2 = FromValue::from_value(value)?,
            "name" => self.name = FromValue::from_value(value)?,
            "create_at" => self.create_at = FromValue::from_value(value)?,
            "version" => self.version = FromValue::from_value(value)?,
            other => return Err(ValueError::UnknownColumn(other.to_string())),
        }
        Ok(())
    }
}

/// Same shape without RETURNING columns, usable on MySQL.
#[derive(Debug, Clone, Default, PartialEq)]
struct Plain {
    id: i64,
    label: String,
}

impl Entity for Plain {
    fn table_name() -> &'static str {
        "plain"
    }

    fn schema() -> Schema {
        Schema::new()
            .column(Column::new("id").primary_key().auto_increment())
            .column(Column::new("label"))
    }

    fn value_of(&self, column: &str) -> Option<Value> {
        match column {
            "id" => Some(self.id.to_value()),
            "label" => Some(self.label.to_value()),
            _ => None,
        }
    }

    fn set_value(&mut self, column: &str, value: Value) -> Result<(), ValueError> {
        match column {
            "id" => self.id = FromValue::from_value(value)?,
            "label" => self.label = FromValue::from_value(value)?,
            other => return Err(ValueError::UnknownColumn(other.to_string())),
        }
        Ok(())
    }
}

impl EntityEvents for Plain {}

fn created() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

#[test]
fn test_general_metadata() {
    let md = metadata::<General>().unwrap();
    assert_eq!(md.table_name(), "general");
    let names: Vec<&str> = md.columns().iter().map(|c| c.db_field.as_str()).collect();
    assert_eq!(names, ["id", "id2", "name", "create_at", "version"]);
    assert_eq!(md.primary_keys().len(), 2);
    assert!(md.has_returning_insert());
    assert!(md.has_returning_update());
    assert!(md.column("version").unwrap().refuse_update);

    let again = metadata::<General>().unwrap();
    assert!(std::sync::Arc::ptr_eq(&md, &again));
}

#[tokio::test]
async fn test_load_fills_entity() {
    let db = MockExecutor::new("pgx");
    db.push_rows(vec![Row::new()
        .with("id", 7i64)
        .with("id2", 3i64)
        .with("name", "alpha")
        .with("create_at", created())
        .with("version", 2i64)]);

    let mut ent = General {
        id: 7,
        id2: 3,
        ..Default::default()
    };
    crud::load(&mut ent, &db).await.unwrap();
    assert_eq!(ent.name, "alpha");
    assert_eq!(ent.create_at, Some(created()));
    assert_eq!(ent.version, 2);

    let call = db.last_call().unwrap();
    assert_eq!(call.kind, CallKind::Query);
    assert_eq!(
        call.sql,
        r#"SELECT "id", "id2", "name", "create_at", "version" FROM "general" WHERE "id" = :id AND "id2" = :id2 LIMIT 1"#
    );
    assert_eq!(
        call.params,
        vec![("id".to_string(), Value::Int(7)), ("id2".to_string(), Value::Int(3))]
    );
}

#[tokio::test]
async fn test_load_missing_row_is_not_found() {
    let db = MockExecutor::new("postgres");
    let mut ent = General::default();
    let err = crud::load(&mut ent, &db).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(
        err,
        EntityError::NotFound {
            operation: Operation::Select,
            ..
        }
    ));
}

#[tokio::test]
async fn test_insert_with_returning_scans_back() {
    let db = MockExecutor::new("sqlite3");
    db.push_rows(vec![Row::new()
        .with("create_at", "2024-05-01 12:00:00")
        .with("version", 1i64)]);

    let mut ent = General {
        id2: 4,
        name: "beta".into(),
        ..Default::default()
    };
    let id = crud::insert(&mut ent, &db).await.unwrap();
    assert_eq!(id, 0);
    assert_eq!(ent.create_at, Some(created()));
    assert_eq!(ent.version, 1);

    let call = db.last_call().unwrap();
    assert_eq!(call.kind, CallKind::Query);
    assert_eq!(
        call.sql,
        r#"INSERT INTO "general" ("id2", "name") VALUES (:id2, :name) RETURNING "create_at", "version""#
    );
}

#[tokio::test]
async fn test_insert_reports_last_insert_id() {
    let db = MockExecutor::new("mysql");
    db.push_exec(1, Some(42));
    let mut ent = Plain {
        label: "x".into(),
        ..Default::default()
    };
    assert_eq!(crud::insert(&mut ent, &db).await.unwrap(), 42);
    assert_eq!(
        db.last_call().unwrap().sql,
        "INSERT INTO `plain` (`label`) VALUES (:label)"
    );
}

#[tokio::test]
async fn test_insert_on_postgres_without_returning_is_zero() {
    let db = MockExecutor::new("postgres");
    db.push_exec(1, Some(42));
    let mut ent = Plain::default();
    assert_eq!(crud::insert(&mut ent, &db).await.unwrap(), 0);
    assert_eq!(db.last_call().unwrap().kind, CallKind::Execute);
}

#[tokio::test]
async fn test_returning_on_mysql_is_rejected() {
    let db = MockExecutor::new("mariadb");
    let mut ent = General::default();
    let err = crud::insert(&mut ent, &db).await.unwrap_err();
    assert!(matches!(
        err,
        EntityError::UnsupportedReturning {
            operation: Operation::Insert,
            dialect: "mysql",
            ..
        }
    ));
    assert!(db.calls().is_empty());
}

#[tokio::test]
async fn test_returning_on_unknown_engine_is_rejected() {
    let db = MockExecutor::new("sqlserver");
    let mut ent = General::default();
    let err = crud::insert(&mut ent, &db).await.unwrap_err();
    assert!(matches!(
        err,
        EntityError::UnsupportedReturning {
            dialect: "generic",
            ..
        }
    ));
    assert!(db.calls().is_empty());

    db.push_exec(1, None);
    let mut ent = Plain::default();
    assert_eq!(crud::insert(&mut ent, &db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_returning_more_than_one_row_is_rejected() {
    let db = MockExecutor::new("postgres");
    db.push_rows(vec![
        Row::new().with("create_at", created()).with("version", 1i64),
        Row::new().with("create_at", created()).with("version", 2i64),
    ]);
    let mut ent = General {
        id2: 4,
        name: "twice".into(),
        ..Default::default()
    };
    let err = crud::insert(&mut ent, &db).await.unwrap_err();
    assert!(matches!(
        err,
        EntityError::TooManyRows {
            operation: Operation::Insert,
            ..
        }
    ));
    assert_eq!(ent.version, 0);
    assert_eq!(ent.create_at, None);

    db.push_rows(vec![
        Row::new().with("version", 5i64),
        Row::new().with("version", 6i64),
    ]);
    let err = crud::update(&mut ent, &db).await.unwrap_err();
    assert!(matches!(
        err,
        EntityError::TooManyRows {
            operation: Operation::Update,
            ..
        }
    ));
    assert_eq!(ent.version, 0);
}

#[tokio::test]
async fn test_missing_last_insert_id_is_transport_error() {
    let db = MockExecutor::new("mysql");
    db.push_exec(1, None);
    let mut ent = Plain {
        label: "y".into(),
        ..Default::default()
    };
    let err = crud::insert(&mut ent, &db).await.unwrap_err();
    match err {
        EntityError::Transport { operation, source, .. } => {
            assert_eq!(operation, Operation::Insert);
            assert_eq!(source.to_string(), "driver did not report a last insert id");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_update_without_match_is_not_found() {
    let db = MockExecutor::new("sqlite");
    db.push_exec(0, None);
    let mut ent = Plain {
        id: 9,
        label: "gone".into(),
    };
    let err = crud::update(&mut ent, &db).await.unwrap_err();
    assert!(err.is_not_found());

    db.push_exec(1, None);
    crud::update(&mut ent, &db).await.unwrap();
    assert_eq!(
        db.last_call().unwrap().sql,
        r#"UPDATE "plain" SET "label" = :label WHERE "id" = :id"#
    );
}

#[tokio::test]
async fn test_update_with_returning() {
    let db = MockExecutor::new("postgres");
    db.push_rows(vec![Row::new().with("version", 5i64)]);
    let mut ent = General {
        id: 1,
        id2: 1,
        name: "renamed".into(),
        version: 4,
        ..Default::default()
    };
    crud::update(&mut ent, &db).await.unwrap();
    assert_eq!(ent.version, 5);
    assert_eq!(
        db.last_call().unwrap().sql,
        r#"UPDATE "general" SET "name" = :name WHERE "id" = :id AND "id2" = :id2 RETURNING "version""#
    );

    let mut ent = General::default();
    let err = crud::update(&mut ent, &db).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_does_not_check_rows() {
    let db = MockExecutor::new("postgres");
    db.push_exec(0, None);
    let ent = General {
        id: 1,
        id2: 2,
        ..Default::default()
    };
    crud::delete(&ent, &db).await.unwrap();
    assert_eq!(
        db.last_call().unwrap().sql,
        r#"DELETE FROM "general" WHERE "id" = :id AND "id2" = :id2"#
    );
}

#[tokio::test]
async fn test_unique_violation_is_conflict() {
    let db = MockExecutor::new("postgres");
    db.push_error(r#"ERROR: duplicate key value violates unique constraint "plain_label_key""#);
    let mut ent = Plain::default();
    let err = crud::insert(&mut ent, &db).await.unwrap_err();
    assert!(err.is_conflict());

    db.push_error("Duplicate entry 'x' for key 'label'");
    let err = crud::insert(&mut ent, &db).await.unwrap_err();
    assert!(matches!(err, EntityError::Transport { .. }));
}

#[tokio::test]
async fn test_scan_error_names_column() {
    let db = MockExecutor::new("sqlite3");
    db.push_rows(vec![Row::new().with("id", 1i64).with("label", 3.5)]);
    let mut ent = Plain::default();
    let err = crud::load(&mut ent, &db).await.unwrap_err();
    match err {
        EntityError::Scan { column, .. } => assert_eq!(column, "label"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_repository_without_hooks() {
    let db = MockExecutor::new("sqlite3");
    db.push_exec(1, Some(11));
    let repo: Repository<Plain, _> = Repository::new(&db);
    let mut ent = Plain {
        id: 0,
        label: "r".into(),
    };
    assert_eq!(repo.insert(&mut ent).await.unwrap(), 11);
    assert_eq!(repo.executor().driver_name(), "sqlite3");
    assert_eq!(
        db.calls().into_iter().map(|c| c.kind).collect::<Vec<_>>(),
        vec![CallKind::Execute]
    );
}
