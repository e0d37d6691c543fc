#![cfg(feature = "sqlite")]

use chrono::{DateTime, Utc};
use entmap_data::crud;
use entmap_data::prelude::*;
use entmap_data::ValueError;
use entmap_data_sqlx::SqlxExecutor;
use sqlx::any::AnyPoolOptions;

#[derive(Debug, Default, Clone, PartialEq)]
struct Note {
    id: i64,
    slug: String,
    body: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl Entity for Note {
    fn table_name() -> &'static str {
        "notes"
    }

    fn schema() -> Schema {
        Schema::new()
            .column(Column::new("id").primary_key().auto_increment())
            .column(Column::new("slug"))
            .column(Column::new("body"))
            .column(Column::new("created_at").refuse_update().returning_insert())
    }

    fn value_of(&self, column: &str) -> Option<Value> {
        match column {
            "id" => Some(self.id.to_value()),
            "slug" => Some(self.slug.to_value()),
            "body" => Some(self.body.to_value()),
            "created_at" => Some(self.created_at.to_value()),
            _ => None,
        }
    }

    fn set_value(&mut self, column: &str, value: Value) -> Result<(), ValueError> {
        match column {
            "id" => self.id = FromValue::from_value(value)?,
            "slug" => self.slug = FromValue::from_value(value)?,
            "body" => self.body = FromValue::from_value(value)?,
            "created_at" => self.created_at = FromValue::from_value(value)?,
            other => return Err(ValueError::UnknownColumn(other.to_string())),
        }
        Ok(())
    }
}

async fn setup() -> SqlxExecutor {
    let db = SqlxExecutor::connect_with(AnyPoolOptions::new().max_connections(1), "sqlite::memory:")
        .await
        .unwrap();
    sqlx::query(
        "CREATE TABLE notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            slug TEXT NOT NULL UNIQUE,
            body TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(db.pool())
    .await
    .unwrap();
    db
}

#[tokio::test]
async fn test_crud_round_trip() {
    let db = setup().await;
    assert_eq!(db.driver_name(), "sqlite3");

    let mut note = Note {
        slug: "first".into(),
        body: Some("hello".into()),
        ..Default::default()
    };
    assert_eq!(crud::insert(&mut note, &db).await.unwrap(), 0);
    assert!(note.created_at.is_some());

    let mut loaded = Note {
        id: 1,
        ..Default::default()
    };
    crud::load(&mut loaded, &db).await.unwrap();
    assert_eq!(loaded.slug, "first");
    assert_eq!(loaded.body.as_deref(), Some("hello"));

    loaded.body = None;
    crud::update(&mut loaded, &db).await.unwrap();
    let mut reread = Note {
        id: 1,
        ..Default::default()
    };
    crud::load(&mut reread, &db).await.unwrap();
    assert_eq!(reread.body, None);

    crud::delete(&reread, &db).await.unwrap();
    let err = crud::load(&mut reread, &db).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_unique_violation_is_conflict() {
    let db = setup().await;
    let mut a = Note {
        slug: "dup".into(),
        ..Default::default()
    };
    crud::insert(&mut a, &db).await.unwrap();

    let mut b = a.clone();
    let err = crud::insert(&mut b, &db).await.unwrap_err();
    assert!(err.is_conflict(), "unexpected error: {err}");
}

#[tokio::test]
async fn test_update_missing_row() {
    let db = setup().await;
    let mut ghost = Note {
        id: 99,
        slug: "ghost".into(),
        ..Default::default()
    };
    assert!(crud::update(&mut ghost, &db).await.unwrap_err().is_not_found());
}
