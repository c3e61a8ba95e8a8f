//! Lookup behavior: absence is `None` for find_one and an error for
//! get_one, relation names are checked up front, and unrequested
//! relations stay unloaded.

use tests::prelude::*;
use tests::prelude::assert_eq;

#[tokio::test]
async fn find_one_returns_none_when_nothing_matches() {
    let (db, _log) = fixtures::db(fixtures::memo_board()).await;

    let found = db
        .find_one(fixtures::model_id(&db, "Category"), Filter::by_key(1), &[])
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn get_one_treats_absence_as_an_error() {
    let (db, _log) = fixtures::db(fixtures::memo_board()).await;

    let err = db
        .get_one(
            fixtures::model_id(&db, "Category"),
            Filter::eq("name", "memo"),
            &[],
        )
        .await
        .unwrap_err();
    assert!(err.is_record_not_found());
    assert_eq!(err.to_string(), "record not found: Category where name=memo");
}

#[tokio::test]
async fn unknown_relation_names_fail_before_any_query() {
    let (db, log) = fixtures::db(fixtures::memo_board()).await;

    let err = db
        .find_one(
            fixtures::model_id(&db, "Category"),
            Filter::by_key(1),
            &["nosuch"],
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(
        err.to_string(),
        "model Category has no relation named nosuch"
    );
    assert!(log.is_empty());
}

#[tokio::test]
async fn unrequested_relations_stay_not_loaded() {
    let (db, _log) = fixtures::db(fixtures::memo_board()).await;

    let mut graph = EntityGraph::new();
    let memo = graph.add(db.entity(db.model("Category").unwrap()).with("name", "memo"));
    db.save(&mut graph, &[memo]).await.unwrap();

    let (graph, found) = db
        .get_one(fixtures::model_id(&db, "Category"), Filter::by_key(1), &[])
        .await
        .unwrap();

    let questions = graph[found].relation("questions").unwrap();
    assert!(!questions.is_loaded());
    assert!(matches!(questions, RelationValue::NotLoaded));
}

#[tokio::test]
async fn filters_can_target_to_one_relations() {
    let (db, _log) = fixtures::db(fixtures::company()).await;

    let mut graph = EntityGraph::new();
    let department = graph.add(
        db.entity(db.model("Department").unwrap())
            .with("name", "Accounting"),
    );
    let mut member = db
        .entity(db.model("CompanyMember").unwrap())
        .with("name", "Sharma")
        .with("age", 26i64);
    member.set_one("department", department);
    let member = graph.add(member);
    db.save(&mut graph, &[member]).await.unwrap();

    let (graph, found) = db
        .get_one(
            fixtures::model_id(&db, "CompanyMember"),
            Filter::eq("department", 1i64),
            &[],
        )
        .await
        .unwrap();
    assert_eq!(graph[found].get("name"), Some(&Value::from("Sharma")));
}

#[tokio::test]
async fn filters_reject_unknown_fields() {
    let (db, _log) = fixtures::db(fixtures::memo_board()).await;

    let err = db
        .find_one(
            fixtures::model_id(&db, "Category"),
            Filter::eq("nope", 1i64),
            &[],
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "model Category has no field named nope");
}
