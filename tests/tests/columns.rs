//! Column types and flags beyond plain strings: JSON documents and
//! unique values.

use tests::prelude::*;
use tests::prelude::assert_eq;

use serde_json::json;

#[tokio::test]
async fn json_documents_roundtrip() {
    let models = vec![Model::new("Example")
        .field(Field::id())
        .field(Field::json("info"))];
    let (db, _log) = fixtures::db(models).await;

    let doc = json!({ "firstname": "Umed", "lastname": "Khudoiberdiev" });
    let mut graph = EntityGraph::new();
    let example = graph.add(
        db.entity(db.model("Example").unwrap())
            .with("info", doc.clone()),
    );
    db.save(&mut graph, &[example]).await.unwrap();
    assert_eq!(graph[example].key(), Some(1));

    let (graph, found) = db
        .get_one(fixtures::model_id(&db, "Example"), Filter::by_key(1), &[])
        .await
        .unwrap();
    assert_eq!(graph[found].get("info"), Some(&Value::Json(doc)));
}

#[tokio::test]
async fn json_columns_reject_other_values() {
    let models = vec![Model::new("Example")
        .field(Field::id())
        .field(Field::json("info"))];
    let (db, _log) = fixtures::db(models).await;

    let mut graph = EntityGraph::new();
    let example = graph.add(
        db.entity(db.model("Example").unwrap())
            .with("info", "not a document"),
    );
    let err = db.save(&mut graph, &[example]).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(
        err.to_string(),
        "type mismatch for field Example.info: expected json, got string"
    );
}

#[tokio::test]
async fn duplicate_unique_values_are_rejected() {
    let (db, _log) = fixtures::db(fixtures::company()).await;

    let mut graph = EntityGraph::new();
    let department = graph.add(
        db.entity(db.model("Department").unwrap())
            .with("name", "Engineering"),
    );
    db.save(&mut graph, &[department]).await.unwrap();

    // A second department under the same name hits the unique column
    let mut graph = EntityGraph::new();
    let department = graph.add(
        db.entity(db.model("Department").unwrap())
            .with("name", "Engineering"),
    );
    let err = db.save(&mut graph, &[department]).await.unwrap_err();
    assert!(err.is_transaction_failure());
    assert!(err
        .to_string()
        .contains("unique constraint violated: department.name"));
    assert_eq!(graph[department].key(), None);
}
