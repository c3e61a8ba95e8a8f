//! Embedded models flatten into their owner's table and read back as
//! records, with no table or identity of their own.

use tests::prelude::*;
use tests::prelude::assert_eq;

#[tokio::test]
async fn embedded_values_roundtrip() {
    let (db, log) = fixtures::db(fixtures::students()).await;

    let mut graph = EntityGraph::new();
    let student = graph.add(
        db.entity(db.model("Student").unwrap())
            .with(
                "name",
                Value::record_from_vec(vec!["Mohan".into(), "Ram".into()]),
            )
            .with("faculty", "Engineering"),
    );
    db.save(&mut graph, &[student]).await.unwrap();

    // The record was flattened into plain columns on the student row
    let students = fixtures::table_id(&db, "student");
    let stored = log.with_ops(|ops| {
        ops.iter()
            .find_map(|op| match op {
                Operation::Insert(insert) if insert.table == students => {
                    Some(insert.rows[0].clone())
                }
                _ => None,
            })
            .unwrap()
    });
    assert_eq!(stored[1], Value::from("Mohan"));
    assert_eq!(stored[2], Value::from("Ram"));
    assert_eq!(stored[3], Value::from("Engineering"));

    let (graph, found) = db
        .get_one(fixtures::model_id(&db, "Student"), Filter::by_key(1), &[])
        .await
        .unwrap();

    let name = graph[found].get("name").unwrap().expect_record();
    assert_eq!(name[0], Value::from("Mohan"));
    assert_eq!(name[1], Value::from("Ram"));
    assert_eq!(graph[found].get("faculty"), Some(&Value::from("Engineering")));
}

#[tokio::test]
async fn absent_nullable_embedded_values_read_back_as_null() {
    let models = vec![
        Model::new("Applicant")
            .field(Field::id())
            .field(Field::string("email"))
            .field(Field::embedded("address", "Address").nullable()),
        Model::embedded("Address")
            .field(Field::string("city"))
            .field(Field::string("zip")),
    ];
    let (db, _log) = fixtures::db(models).await;

    let mut graph = EntityGraph::new();
    let applicant = graph.add(
        db.entity(db.model("Applicant").unwrap())
            .with("email", "jane@example.com"),
    );
    db.save(&mut graph, &[applicant]).await.unwrap();

    let (graph, found) = db
        .get_one(fixtures::model_id(&db, "Applicant"), Filter::by_key(1), &[])
        .await
        .unwrap();

    // All-null columns collapse back to a null value, not a record of nulls
    assert_eq!(graph[found].get("address"), Some(&Value::Null));
}

#[tokio::test]
async fn record_arity_must_match_the_embedded_model() {
    let (db, _log) = fixtures::db(fixtures::students()).await;

    let mut graph = EntityGraph::new();
    let student = graph.add(
        db.entity(db.model("Student").unwrap())
            .with("name", Value::record_from_vec(vec!["OnlyFirst".into()]))
            .with("faculty", "Engineering"),
    );

    let err = db.save(&mut graph, &[student]).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(
        err.to_string(),
        "type mismatch for field Student.name: expected record with 2 fields, got record with 1 fields"
    );
}
