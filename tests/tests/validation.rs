//! Entities are validated against the schema while the plan is built, so
//! a bad entity never reaches the driver.

use tests::prelude::*;
use tests::prelude::assert_eq;

async fn save_err(db: &Db, entity: Entity) -> Error {
    let mut graph = EntityGraph::new();
    let node = graph.add(entity);
    db.save(&mut graph, &[node]).await.unwrap_err()
}

#[tokio::test]
async fn missing_required_fields_are_rejected() {
    let (db, log) = fixtures::db(fixtures::memo_board()).await;

    let err = save_err(&db, db.entity(db.model("Category").unwrap())).await;
    assert!(err.is_validation());
    assert_eq!(
        err.to_string(),
        "missing value for required field Category.name"
    );
    assert!(log.is_empty());
}

#[tokio::test]
async fn nulls_are_rejected_in_non_nullable_fields() {
    let (db, _log) = fixtures::db(fixtures::memo_board()).await;

    let entity = db.entity(db.model("Category").unwrap()).with("name", Value::Null);
    let err = save_err(&db, entity).await;
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "field Category.name is not nullable");
}

#[tokio::test]
async fn values_must_match_the_declared_type() {
    let (db, _log) = fixtures::db(fixtures::memo_board()).await;

    let entity = db.entity(db.model("Category").unwrap()).with("name", 42i64);
    let err = save_err(&db, entity).await;
    assert!(err.is_validation());
    assert_eq!(
        err.to_string(),
        "type mismatch for field Category.name: expected string, got i64"
    );
}

#[tokio::test]
async fn undeclared_fields_are_rejected() {
    let (db, _log) = fixtures::db(fixtures::memo_board()).await;

    let entity = db
        .entity(db.model("Category").unwrap())
        .with("name", "memo")
        .with("color", "red");
    let err = save_err(&db, entity).await;
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "model Category has no field named color");
}

#[tokio::test]
async fn enum_values_must_name_a_declared_variant() {
    let (db, _log) = fixtures::db(fixtures::gamers()).await;

    let entity = db
        .entity(db.model("Profile").unwrap())
        .with("gender", "robot")
        .with("photo", "robot.png");
    let err = save_err(&db, entity).await;
    assert!(err.is_validation());
    assert_eq!(
        err.to_string(),
        "value \"robot\" is not a variant of enum field Profile.gender"
    );
}

#[tokio::test]
async fn unsaved_references_require_cascade_insert() {
    let (db, _log) = fixtures::db(fixtures::company()).await;

    // Department.member does not cascade inserts, so an unsaved member
    // node cannot ride along
    let mut graph = EntityGraph::new();
    let member = graph.add(
        db.entity(db.model("CompanyMember").unwrap())
            .with("name", "Sharma")
            .with("age", 26i64),
    );
    let mut department = db
        .entity(db.model("Department").unwrap())
        .with("name", "Accounting");
    department.set_many("member", [member]);
    let department = graph.add(department);

    let err = db.save(&mut graph, &[department]).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(
        err.to_string(),
        "relation Department.member references an unsaved entity and cascade insert is not enabled"
    );
}

#[tokio::test]
async fn removing_an_unkeyed_entity_is_rejected() {
    let (db, _log) = fixtures::db(fixtures::memo_board()).await;

    let mut graph = EntityGraph::new();
    let node = graph.add(db.entity(db.model("Category").unwrap()).with("name", "memo"));

    let err = db.remove(&mut graph, node).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "entity Category has no primary key value");
}

#[tokio::test]
async fn relation_slots_reject_plain_values() {
    let (db, _log) = fixtures::db(fixtures::memo_board()).await;

    let entity = db
        .entity(db.model("Question").unwrap())
        .with("title", "Question1")
        .with("text", "abc")
        .with("categories", "memo");
    let err = save_err(&db, entity).await;
    assert!(err.is_validation());
    assert_eq!(
        err.to_string(),
        "type mismatch for field Question.categories: expected member collection, got string"
    );
}
