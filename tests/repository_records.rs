mod common;

use link_analytics::domain::entities::{ChildRecord, ParentRecord, Record};
use link_analytics::domain::repositories::RecordRepository;
use link_analytics::error::StoreError;
use link_analytics::infrastructure::persistence::JsonRecordRepository;
use tempfile::TempDir;

#[tokio::test]
async fn test_store_writes_tagged_camel_case_records() {
    let dir = TempDir::new().unwrap();
    let store = common::open_store(dir.path()).await;
    common::seed_clicks(&store).await;

    let raw = std::fs::read(common::records_path(dir.path())).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();

    assert_eq!(json[0]["kind"], "parent");
    assert_eq!(json[0]["shortUrl"], "abc123");
    assert_eq!(json[0]["registrationCount"], 1);
    assert_eq!(json[1]["kind"], "child");
    assert_eq!(json[1]["parentId"], 1);
    assert_eq!(json[1]["sourceIp"], "1.2.3.4");
    assert_eq!(json[4]["parentId"], 0);
}

#[tokio::test]
async fn test_reload_and_resave_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let store = common::open_store(dir.path()).await;
    common::seed_clicks(&store).await;
    let path = common::records_path(dir.path());
    let before = std::fs::read(&path).unwrap();

    let repo = JsonRecordRepository::new(&path);
    let records = repo.load().await.unwrap();
    repo.save(&records).await.unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[tokio::test]
async fn test_open_on_missing_file_starts_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("connections.json");
    let repo = JsonRecordRepository::new(&path);

    assert!(repo.load().await.unwrap().is_empty());

    repo.save(&[
        Record::Parent(ParentRecord::new(1, "http://a.com".into(), "abc".into())),
        Record::Child(ChildRecord::new(
            2,
            1,
            "1.2.3.4".into(),
            "2024-01-01 10:30".into(),
        )),
    ])
    .await
    .unwrap();

    assert_eq!(repo.load().await.unwrap().len(), 2);
    assert!(!path.with_extension("json.tmp").exists());
}

#[tokio::test]
async fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = common::records_path(dir.path());
    std::fs::write(&path, "[{\"kind\": \"parent\"").unwrap();
    let repo = JsonRecordRepository::new(&path);

    let result = repo.load().await;

    assert!(matches!(result, Err(StoreError::Serialization(_))));
}
