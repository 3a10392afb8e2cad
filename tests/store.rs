use taskboard::model::Gender;
use taskboard::{apply_schema, connect, AppError, Person, Record, Settings};

fn settings(url: &str, schema: &str) -> Result<Settings, AppError> {
    Settings::from_lookup(|key| match key {
        "DATABASE_URL" => Some(url.to_string()),
        "DB_SCHEMA" => Some(schema.to_string()),
        "DB_MAX_CONNECTIONS" => Some("2".to_string()),
        _ => None,
    })
}

fn person(id: &str) -> Person {
    Person {
        id: id.into(),
        firstname: "Jane".into(),
        lastname: "Doe".into(),
        email: "j@x.com".into(),
        age: 30,
        gender: Gender::Female,
        email_validated: false,
    }
}

#[tokio::test]
async fn schema_is_visible_from_every_pooled_connection() {
    for schema in ["main", "app"] {
        let dir = std::env::temp_dir().join(format!("taskboard-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let url = format!("sqlite://{}", dir.join("database.sqlite").display());

        let db = connect(&settings(&url, schema).unwrap()).await.unwrap();
        apply_schema(&db).await.unwrap();

        // Keep the connection that created the tables busy so the next statements open another one.
        let held = db.pool.acquire().await.unwrap();
        let table = Person::table(&db);
        assert_eq!(table.select_all().count().await.unwrap(), 0, "schema {}", schema);
        table.insert(person("p1")).await.unwrap();
        assert_eq!(table.read("p1").await.unwrap().firstname, "Jane");
        drop(held);

        db.pool.close().await;
        let _ = std::fs::remove_dir_all(&dir);
    }
}

#[test]
fn temp_schema_is_rejected() {
    let err = settings("sqlite::memory:", "temp").unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}
