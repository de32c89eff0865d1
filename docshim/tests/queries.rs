use chrono::{DateTime, TimeDelta, Utc};
use futures::TryStreamExt;

use docshim::{memory::InMemoryStore, prelude::*};

fn store() -> DataStore<InMemoryStore> {
    DataStore::new(InMemoryStore::new())
}

fn ids(snapshots: &[Snapshot]) -> Vec<&str> {
    snapshots.iter().map(Snapshot::id).collect()
}

async fn seed_jobs(store: &DataStore<InMemoryStore>) {
    let jobs = store.collection("jobs");
    let rows = [
        ("JOB_1", "open", "Nairobi", 1_500),
        ("JOB_2", "closed", "Nairobi", 3_000),
        ("JOB_3", "open", "Mombasa", 2_000),
        ("JOB_4", "open", "Nairobi", 2_500),
    ];

    for (id, status, location, pay) in rows {
        jobs.document(id)
            .set(fields! { "status" => status, "location" => location, "pay" => pay })
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn equality_filter_skips_documents_missing_the_field() {
    let store = store();
    let users = store.collection("users");

    users.document("a").set(fields! { "phone" => "+254700000001" }).await.unwrap();
    users.document("b").set(fields! { "email" => "b@example.com" }).await.unwrap();

    let results = users.filter("phone", "==", "+254700000001").evaluate().await.unwrap();

    assert_eq!(ids(&results), ["a"]);
}

#[tokio::test]
async fn not_equal_filter_also_skips_missing_fields() {
    let store = store();
    let users = store.collection("users");

    users.document("a").set(fields! { "role" => "worker" }).await.unwrap();
    users.document("b").set(fields! { "role" => "employer" }).await.unwrap();
    users.document("c").set(fields! { "name" => "no role" }).await.unwrap();

    let results = users.filter("role", "!=", "worker").evaluate().await.unwrap();

    assert_eq!(ids(&results), ["b"]);
}

#[tokio::test]
async fn conjunctive_filters_must_all_match() {
    let store = store();
    seed_jobs(&store).await;

    let results = store
        .collection("jobs")
        .query()
        .filter("status", FieldOp::Eq, "open")
        .filter("location", "==", "Nairobi")
        .filter("pay", ">=", 2_000)
        .evaluate()
        .await
        .unwrap();

    assert_eq!(ids(&results), ["JOB_4"]);
}

#[tokio::test]
async fn limit_one_returns_first_match_in_insertion_order() {
    let store = store();
    let users = store.collection("users");

    users.document("second").set(fields! { "phone" => "0700" }).await.unwrap();
    users.document("first").set(fields! { "phone" => "0700" }).await.unwrap();

    let results = users.filter("phone", "==", "0700").limit(1).evaluate().await.unwrap();

    assert_eq!(ids(&results), ["second"]);
}

#[tokio::test]
async fn order_applies_to_the_whole_result_before_limit() {
    let store = store();
    seed_jobs(&store).await;

    let results = store
        .collection("jobs")
        .query()
        .order_by("pay", SortDirection::Desc)
        .limit(2)
        .evaluate()
        .await
        .unwrap();

    assert_eq!(ids(&results), ["JOB_2", "JOB_4"]);
}

#[tokio::test]
async fn offset_skips_after_ordering() {
    let store = store();
    seed_jobs(&store).await;

    let results = store
        .collection("jobs")
        .query()
        .order_by("pay", SortDirection::Asc)
        .offset(1)
        .limit(2)
        .evaluate()
        .await
        .unwrap();

    assert_eq!(ids(&results), ["JOB_3", "JOB_4"]);
}

#[tokio::test]
async fn secondary_order_breaks_ties() {
    let store = store();
    seed_jobs(&store).await;

    let results = store
        .collection("jobs")
        .query()
        .order_by("location", SortDirection::Asc)
        .order_by("pay", SortDirection::Desc)
        .evaluate()
        .await
        .unwrap();

    assert_eq!(ids(&results), ["JOB_3", "JOB_2", "JOB_4", "JOB_1"]);
}

#[tokio::test]
async fn ordering_excludes_documents_without_the_field() {
    let store = store();
    let ratings = store.collection("ratings");

    ratings.document("r1").set(fields! { "score" => 3 }).await.unwrap();
    ratings.document("r2").set(fields! { "comment" => "no score" }).await.unwrap();
    ratings.document("r3").set(fields! { "score" => 4.5 }).await.unwrap();

    let results = ratings
        .query()
        .order_by("score", SortDirection::Desc)
        .evaluate()
        .await
        .unwrap();

    assert_eq!(ids(&results), ["r3", "r1"]);
}

#[tokio::test]
async fn timestamps_order_chronologically() {
    let store = store();
    let logs = store.collection("logs");
    let start = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();

    logs.document("late").set(fields! { "at" => start + TimeDelta::hours(2) }).await.unwrap();
    logs.document("early").set(fields! { "at" => start }).await.unwrap();

    let results = logs
        .query()
        .filter("at", ">", start - TimeDelta::hours(1))
        .order_by("at", SortDirection::Asc)
        .evaluate()
        .await
        .unwrap();

    assert_eq!(ids(&results), ["early", "late"]);
}

#[tokio::test]
async fn in_and_array_contains_match_membership() {
    let store = store();
    let workers = store.collection("workers");

    workers
        .document("w1")
        .set(fields! { "county" => "Kisumu", "skills" => vec!["plumbing", "masonry"] })
        .await
        .unwrap();
    workers
        .document("w2")
        .set(fields! { "county" => "Nakuru", "skills" => vec!["carpentry"] })
        .await
        .unwrap();

    let by_county = workers
        .filter("county", "in", vec!["Nakuru", "Eldoret"])
        .evaluate()
        .await
        .unwrap();
    assert_eq!(ids(&by_county), ["w2"]);

    let by_skill = workers
        .filter("skills", "array-contains", "masonry")
        .evaluate()
        .await
        .unwrap();
    assert_eq!(ids(&by_skill), ["w1"]);
}

#[tokio::test]
async fn range_filters_do_not_cross_types() {
    let store = store();
    let items = store.collection("items");

    items.document("n").set(fields! { "v" => 10 }).await.unwrap();
    items.document("s").set(fields! { "v" => "10" }).await.unwrap();
    items.document("d").set(fields! { "v" => 10.5 }).await.unwrap();

    let results = items.filter("v", ">", 5).evaluate().await.unwrap();

    assert_eq!(ids(&results), ["n", "d"]);
}

#[tokio::test]
async fn unsupported_operator_is_an_error_not_an_empty_result() {
    let store = store();
    seed_jobs(&store).await;

    let result = store
        .collection("jobs")
        .filter("status", "array-contains-any", vec!["open"])
        .evaluate()
        .await;

    assert!(matches!(result, Err(DocumentStoreError::UnsupportedOperator(_))));
}

#[tokio::test]
async fn malformed_filters_are_reported() {
    let store = store();
    let jobs = store.collection("jobs");

    let not_a_list = jobs.filter("status", "in", "open").evaluate().await;
    assert!(matches!(not_a_list, Err(DocumentStoreError::InvalidQuery(_))));

    let sentinel = jobs
        .filter("views", "==", FieldValue::increment_by(1))
        .evaluate()
        .await;
    assert!(matches!(sentinel, Err(DocumentStoreError::InvalidQuery(_))));
}

#[tokio::test]
async fn query_on_unknown_collection_is_empty() {
    let store = store();

    let results = store
        .collection("nothing_here")
        .filter("a", "==", 1)
        .evaluate()
        .await
        .unwrap();

    assert!(results.is_empty());
}

#[tokio::test]
async fn evaluation_reflects_writes_made_after_the_query_was_built() {
    let store = store();
    let wallets = store.collection("wallets");
    let rich = wallets.filter("KES", ">=", 1_000);

    wallets.document("w1").set(fields! { "KES" => 500 }).await.unwrap();
    assert!(rich.evaluate().await.unwrap().is_empty());

    wallets
        .document("w1")
        .update(fields! { "KES" => FieldValue::increment_by(600) })
        .await
        .unwrap();
    assert_eq!(ids(&rich.evaluate().await.unwrap()), ["w1"]);

    wallets.document("w1").delete().await.unwrap();
    assert!(rich.evaluate().await.unwrap().is_empty());
}

#[tokio::test]
async fn streams_are_lazy_and_restartable() {
    let store = store();
    let jobs = store.collection("jobs");
    let open = jobs.filter("status", "==", "open");

    let first = open.stream();
    jobs.document("JOB_1").set(fields! { "status" => "open" }).await.unwrap();

    let results: Vec<Snapshot> = first.try_collect().await.unwrap();
    assert_eq!(ids(&results), ["JOB_1"]);

    jobs.document("JOB_2").set(fields! { "status" => "open" }).await.unwrap();

    let results: Vec<Snapshot> = open.stream().try_collect().await.unwrap();
    assert_eq!(ids(&results), ["JOB_1", "JOB_2"]);
}

#[tokio::test]
async fn stream_surfaces_query_errors() {
    let store = store();

    let result: DocumentStoreResult<Vec<Snapshot>> = store
        .collection("jobs")
        .filter("status", "like", "op%")
        .stream()
        .try_collect()
        .await;

    assert!(matches!(result, Err(DocumentStoreError::UnsupportedOperator(_))));
}

#[tokio::test]
async fn query_results_are_detached_copies() {
    let store = store();
    let jobs = store.collection("jobs");
    jobs.document("JOB_1").set(fields! { "views" => 1 }).await.unwrap();

    let results = jobs.query().evaluate().await.unwrap();
    jobs.document("JOB_1")
        .update(fields! { "views" => FieldValue::increment_by(1) })
        .await
        .unwrap();

    assert_eq!(results[0].get("views"), Some(&Value::Integer(1)));
}
