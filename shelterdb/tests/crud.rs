use bson::{Bson, doc};
use serde_json::json;
use shelterdb::{memory::InMemoryStore, prelude::*};

fn animals() -> Namespace {
    Namespace::new("AAC", "animals")
}

async fn shelter() -> (InMemoryStore, DataAccessObject<InMemoryStore>) {
    let store = InMemoryStore::new();
    let dao = DataAccessObject::with_backend(store.clone(), animals()).await;
    assert!(dao.is_connected());
    (store, dao)
}

async fn kennel() -> (InMemoryStore, DataAccessObject<InMemoryStore>) {
    let (store, dao) = shelter().await;
    let inserted = dao
        .create_many(vec![
            doc! { "name": "Rex", "species": "dog", "age_weeks": 52 },
            doc! { "name": "Fido", "species": "dog", "age_weeks": 120 },
            doc! { "name": "Bolt", "species": "dog", "age_weeks": 30 },
            doc! { "name": "Tom", "species": "cat", "age_weeks": 80 },
            doc! { "name": "Kiwi", "species": "bird", "age_weeks": 10 },
        ])
        .await;
    assert_eq!(inserted, 5);
    (store, dao)
}

#[tokio::test]
async fn create_then_read_back() {
    let (_, dao) = shelter().await;

    assert!(dao.create(doc! { "name": "Rex" }).await);

    let found = dao.read(doc! { "name": "Rex" }).await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].get_str("name").unwrap(), "Rex");
    assert!(found[0].get_object_id("_id").is_ok());
}

#[tokio::test]
async fn create_many_counts_inserted_records() {
    let (_, dao) = shelter().await;

    let inserted = dao
        .create_many(vec![
            doc! { "name": "Rex" },
            doc! { "name": "Tom" },
            doc! { "name": "Kiwi" },
        ])
        .await;

    assert_eq!(inserted, 3);
    assert!(dao.read(doc! {}).await.len() >= 3);
}

#[tokio::test]
async fn create_many_with_duplicate_id_reports_zero() {
    let (store, dao) = shelter().await;

    let inserted = dao
        .create_many(vec![
            doc! { "_id": "A001", "name": "Rex" },
            doc! { "_id": "A001", "name": "Rex again" },
        ])
        .await;

    // the store keeps what it inserted before the failure
    assert_eq!(inserted, 0);
    assert_eq!(store.records(&animals()).await.len(), 1);
}

#[tokio::test]
async fn create_with_existing_id_reports_false() {
    let (_, dao) = shelter().await;

    assert!(dao.create(doc! { "_id": "A001", "name": "Rex" }).await);
    assert!(!dao.create(doc! { "_id": "A001", "name": "Tom" }).await);
}

#[tokio::test]
async fn read_with_empty_result() {
    let (_, dao) = kennel().await;

    assert!(dao.read(doc! { "species": "horse" }).await.is_empty());
}

#[tokio::test]
async fn read_with_operators() {
    let (_, dao) = kennel().await;

    let seniors = dao.read(doc! { "age_weeks": { "$gte": 80 } }).await;
    let names: Vec<&str> = seniors
        .iter()
        .map(|record| record.get_str("name").unwrap())
        .collect();

    assert_eq!(names, vec!["Fido", "Tom"]);
}

#[tokio::test]
async fn update_sets_fields_on_every_match() {
    let (_, dao) = kennel().await;

    let modified = dao
        .update(doc! { "species": "dog" }, doc! { "adopted": true })
        .await;

    assert_eq!(modified, 3);
    for dog in dao.read(doc! { "species": "dog" }).await {
        assert!(dog.get_bool("adopted").unwrap());
        assert!(dog.get_i32("age_weeks").is_ok());
    }
    for other in dao.read(doc! { "species": { "$ne": "dog" } }).await {
        assert!(other.get("adopted").is_none());
    }
}

#[tokio::test]
async fn update_counts_only_changed_records() {
    let (_, dao) = kennel().await;

    assert_eq!(dao.update(doc! { "species": "dog" }, doc! { "adopted": true }).await, 3);
    assert_eq!(dao.update(doc! { "species": "dog" }, doc! { "adopted": true }).await, 0);
}

#[tokio::test]
async fn update_one_touches_at_most_one_record() {
    let (_, dao) = kennel().await;

    assert!(dao.update_one(doc! { "species": "dog" }, doc! { "adopted": true }).await);

    assert_eq!(dao.read(doc! { "adopted": true }).await.len(), 1);
    assert_eq!(dao.read(doc! { "species": "dog", "adopted": { "$exists": false } }).await.len(), 2);
}

#[tokio::test]
async fn update_one_without_match_reports_false() {
    let (_, dao) = kennel().await;

    assert!(!dao.update_one(doc! { "species": "horse" }, doc! { "adopted": true }).await);
}

#[tokio::test]
async fn delete_removes_every_match() {
    let (_, dao) = kennel().await;

    assert_eq!(dao.delete(doc! { "species": "dog" }).await, 3);
    assert!(dao.read(doc! { "species": "dog" }).await.is_empty());
    assert_eq!(dao.read(doc! {}).await.len(), 2);
}

#[tokio::test]
async fn delete_one_removes_at_most_one() {
    let (_, dao) = kennel().await;

    assert!(dao.delete_one(doc! { "species": "dog" }).await);
    assert_eq!(dao.read(doc! { "species": "dog" }).await.len(), 2);
}

#[tokio::test]
async fn delete_one_twice_reports_false_second_time() {
    let (_, dao) = kennel().await;

    assert!(dao.delete_one(doc! { "name": "Kiwi" }).await);
    assert!(!dao.delete_one(doc! { "name": "Kiwi" }).await);
}

#[tokio::test]
async fn unreachable_store_disables_every_operation() {
    let store = InMemoryStore::builder()
        .seed(animals(), vec![
            doc! { "name": "Rex", "species": "dog" },
            doc! { "name": "Tom", "species": "cat" },
        ])
        .unreachable()
        .build()
        .await
        .unwrap();
    let dao = DataAccessObject::with_backend(store.clone(), animals()).await;

    // the handle stays disabled even after the store comes back
    store.set_reachable(true);

    assert!(!dao.is_connected());
    assert!(!dao.create(doc! { "name": "Kiwi" }).await);
    assert_eq!(dao.create_many(vec![doc! { "name": "Kiwi" }]).await, 0);
    assert!(dao.read(doc! {}).await.is_empty());
    assert_eq!(dao.update(doc! {}, doc! { "adopted": true }).await, 0);
    assert!(!dao.update_one(doc! {}, doc! { "adopted": true }).await);
    assert_eq!(dao.delete(doc! {}).await, 0);
    assert!(!dao.delete_one(doc! {}).await);

    let untouched = store.records(&animals()).await;
    assert_eq!(untouched.len(), 2);
    assert!(untouched.iter().all(|record| record.get("adopted").is_none()));
}

#[tokio::test]
async fn connect_through_builder() {
    let dao = DataAccessObject::connect(
        InMemoryStore::builder().seed(animals(), vec![doc! { "name": "Rex" }]),
        animals(),
    )
    .await;

    assert!(dao.is_connected());
    assert_eq!(dao.read(doc! {}).await.len(), 1);
    assert!(dao.shutdown().await.is_ok());
}

#[tokio::test]
async fn outage_after_connect_maps_to_conservative_values() {
    let (store, dao) = kennel().await;

    store.set_reachable(false);

    assert!(dao.is_connected());
    assert!(dao.read(doc! {}).await.is_empty());
    assert_eq!(dao.delete(doc! {}).await, 0);
    assert!(!dao.update_one(doc! {}, doc! { "adopted": true }).await);

    store.set_reachable(true);
    assert_eq!(dao.read(doc! {}).await.len(), 5);
}

#[tokio::test]
async fn invalid_query_reads_as_empty() {
    let (_, dao) = kennel().await;

    assert!(dao.read(doc! { "name": { "$regex": "^R" } }).await.is_empty());
    assert_eq!(dao.delete(doc! { "$where": "true" }).await, 0);
    assert_eq!(dao.read(doc! {}).await.len(), 5);
}

#[tokio::test]
async fn handles_share_the_store_per_namespace() {
    let store = InMemoryStore::new();
    let animals_dao = DataAccessObject::with_backend(&store, animals()).await;
    let intakes_dao = DataAccessObject::with_backend(&store, Namespace::new("AAC", "intakes")).await;

    assert!(animals_dao.create(doc! { "name": "Rex" }).await);

    assert_eq!(animals_dao.read(doc! {}).await.len(), 1);
    assert!(intakes_dao.read(doc! {}).await.is_empty());
}

#[tokio::test]
async fn json_rows_round_out_the_dashboard_path() {
    let (_, dao) = shelter().await;

    let record = record_from_json(json!({ "name": "Rex", "breed": "Labrador Retriever Mix" })).unwrap();
    assert!(dao.create(record).await);

    let rows = records_to_json(&dao.read(doc! { "name": "Rex" }).await).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["breed"], json!("Labrador Retriever Mix"));
    assert!(rows[0]["_id"].is_object());
}

#[tokio::test]
async fn nested_fields_update_through_dotted_paths() {
    let (_, dao) = shelter().await;
    dao.create(doc! { "name": "Rex", "location": { "city": "Austin", "zip": "78701" } }).await;

    assert!(dao.update_one(doc! { "name": "Rex" }, doc! { "location.zip": "78702" }).await);

    let rex = dao.read(doc! { "location.zip": "78702" }).await;
    assert_eq!(rex.len(), 1);
    assert_eq!(
        rex[0].get_document("location").unwrap().get("city"),
        Some(&Bson::String("Austin".into())),
    );
}

#[tokio::test]
async fn rejected_update_leaves_record_unchanged() {
    let (store, dao) = kennel().await;
    let before = store.records(&animals()).await;

    assert!(!dao.update_one(doc! { "name": "Rex" }, doc! { "adopted": true, "name.first": "R" }).await);
    assert_eq!(dao.update(doc! { "species": "dog" }, doc! { "adopted": true, "_id": 1 }).await, 0);

    assert_eq!(store.records(&animals()).await, before);
    assert!(dao.read(doc! { "adopted": true }).await.is_empty());
}
