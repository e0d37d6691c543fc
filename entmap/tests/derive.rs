use std::future::Future;
use std::time::Duration;

use entmap::entmap_cache::{self, CacheStore};
use entmap::prelude::*;
use entmap::statement::statement;
use entmap::{crud, metadata, Dialect, Operation, Row};
use entmap_test::{MockExecutor, RecordingStore};
use serde::{Deserialize, Serialize};
use serial_test::serial;

#[derive(Debug, Clone, Default, PartialEq, Entity, Serialize, Deserialize, Cacheable)]
#[entity(table = "general")]
#[cache(key = "general:{id}:{id2}", expiration_secs = 90)]
struct General {
    #[column(primary_key, auto_increment)]
    id: i64,
    #[column(primary_key)]
    id2: i64,
    #[column]
    name: String,
    #[column(refuse_update, returning_insert)]
    create_at: Option<DateTime<Utc>>,
    #[column(returning)]
    version: i64,
    #[column(deprecated)]
    legacy: String,
    #[serde(skip)]
    scratch: Vec<u8>,
}

#[derive(Debug, Default, Entity)]
#[entity(table = "members", hooks)]
struct Member {
    #[column(primary_key, name = "member_id")]
    id: i64,
    #[column]
    handle: String,
    #[column(ignore)]
    loads: u32,
}

impl EntityEvents for Member {
    fn on_entity_event(
        &mut self,
        event: Event,
    ) -> impl Future<Output = Result<(), EntityError>> + Send {
        if event == Event::AfterLoad {
            self.loads += 1;
        }
        async { Ok(()) }
    }
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize, Cacheable)]
#[cache(key = "session:{token}", codec = "msgpack")]
struct Session {
    token: String,
    user_id: i64,
}

#[test]
fn test_derived_metadata() {
    let md = metadata::<General>().unwrap();
    assert_eq!(md.table_name(), "general");
    let names: Vec<&str> = md.columns().iter().map(|c| c.db_field.as_str()).collect();
    assert_eq!(names, ["id", "id2", "name", "create_at", "version"]);
    assert_eq!(md.primary_keys().len(), 2);

    let update = statement(&md, Operation::Update, Dialect::Postgres).unwrap();
    assert_eq!(
        update.sql(),
        r#"UPDATE "general" SET "name" = :name WHERE "id" = :id AND "id2" = :id2 RETURNING "version""#
    );
}

#[test]
fn test_derived_value_access() {
    let mut ent = General {
        id: 3,
        name: "n".into(),
        ..Default::default()
    };
    assert_eq!(ent.value_of("id"), Some(Value::Int(3)));
    assert_eq!(ent.value_of("create_at"), Some(Value::Null));
    assert_eq!(ent.value_of("legacy"), None);
    assert_eq!(ent.value_of("scratch"), None);

    ent.set_value("version", Value::Int(8)).unwrap();
    assert_eq!(ent.version, 8);
    assert!(ent.set_value("scratch", Value::Null).is_err());
}

#[test]
fn test_column_rename() {
    let md = metadata::<Member>().unwrap();
    assert_eq!(md.primary_keys()[0].db_field, "member_id");
    let member = Member {
        id: 5,
        ..Default::default()
    };
    assert_eq!(member.value_of("member_id"), Some(Value::Int(5)));
}

#[tokio::test]
async fn test_custom_hooks_run_through_repository() {
    let db = MockExecutor::new("mysql");
    db.push_rows(vec![Row::new().with("member_id", 5i64).with("handle", "kit")]);
    let repo = Repository::new(&db);
    let mut member = Member {
        id: 5,
        ..Default::default()
    };
    repo.load(&mut member).await.unwrap();
    assert_eq!(member.handle, "kit");
    assert_eq!(member.loads, 1);
    assert_eq!(
        db.last_call().unwrap().sql,
        "SELECT `member_id`, `handle` FROM `members` WHERE `member_id` = :member_id LIMIT 1"
    );
}

#[test]
fn test_derived_cache_option() {
    let ent = General {
        id: 1,
        id2: 2,
        ..Default::default()
    };
    let option = ent.cache_option();
    assert_eq!(option.key, "general:1:2");
    assert_eq!(option.expiration, Duration::from_secs(90));
    assert!(option.encoder.is_none());

    let session = Session {
        token: "abc".into(),
        user_id: 1,
    };
    let option = session.cache_option();
    assert_eq!(option.key, "session:abc");
    assert!(option.expiration.is_zero());
    assert!(option.encoder.is_some() && option.decoder.is_some());
}

#[tokio::test]
#[serial]
async fn test_load_then_cache() {
    let store = RecordingStore::new();
    entmap_cache::set_default_cacher(store.clone());

    let db = MockExecutor::new("postgres");
    db.push_rows(vec![Row::new()
        .with("id", 1i64)
        .with("id2", 2i64)
        .with("name", "cached")
        .with("create_at", Value::Null)
        .with("version", 4i64)]);

    let mut ent = General {
        id: 1,
        id2: 2,
        ..Default::default()
    };
    crud::load(&mut ent, &db).await.unwrap();
    save_cache(&ent).await.unwrap();
    assert_eq!(store.ttl_of("general:1:2"), Some(Duration::from_secs(90)));

    let mut fresh = General {
        id: 1,
        id2: 2,
        ..Default::default()
    };
    assert!(load_cache(&mut fresh).await.unwrap());
    assert_eq!(fresh, ent);

    delete_cache(&ent).await.unwrap();
    assert!(!load_cache(&mut fresh).await.unwrap());

    let session = Session {
        token: "t".into(),
        user_id: 9,
    };
    save_cache(&session).await.unwrap();
    let raw = store.get("session:t").await.unwrap().unwrap();
    assert!(serde_json::from_slice::<serde_json::Value>(&raw).is_err());

    entmap_cache::clear_default_cacher();
}
