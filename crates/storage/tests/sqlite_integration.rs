use academy_core::model::{SessionRecord, UserId};
use storage::repository::{LocalSessionStore, LocalStorage, SESSION_KEY, SessionStore, Storage};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_local_storage_overwrites_and_removes() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_local_storage?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    // Migrations are idempotent.
    repo.migrate().await.expect("migrate twice");

    assert!(repo.get_item("theme").await.unwrap().is_none());

    repo.set_item("theme", "dark").await.unwrap();
    repo.set_item("theme", "light").await.unwrap();
    assert_eq!(repo.get_item("theme").await.unwrap().as_deref(), Some("light"));

    repo.remove_item("theme").await.unwrap();
    repo.remove_item("theme").await.unwrap();
    assert!(repo.get_item("theme").await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_session_store_survives_reconnect() {
    let url = "sqlite:file:memdb_session_store?mode=memory&cache=shared";
    let first = SqliteRepository::connect(url).await.expect("connect");
    first.migrate().await.expect("migrate");

    let store = LocalSessionStore::new(std::sync::Arc::new(first.clone()));
    let record = SessionRecord::new(
        UserId::new("admin1"),
        "Admin User",
        "admin@tum-academy.de",
        true,
    );
    store.set(&record).await.unwrap();

    // A second pool on the same shared in-memory database sees the blob.
    let second = Storage::sqlite(url).await.expect("storage");
    assert_eq!(second.sessions.get().await.unwrap(), Some(record));

    let raw = second.local.get_item(SESSION_KEY).await.unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["isAdmin"], serde_json::Value::Bool(true));

    second.sessions.clear().await.unwrap();
    assert!(store.get().await.unwrap().is_none());
    drop(first);
}

#[tokio::test]
async fn sqlite_storage_ignores_corrupt_blob() {
    let storage = Storage::sqlite("sqlite:file:memdb_corrupt_blob?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage.local.set_item(SESSION_KEY, "[1, 2, 3]").await.unwrap();
    assert!(storage.sessions.get().await.unwrap().is_none());
}
