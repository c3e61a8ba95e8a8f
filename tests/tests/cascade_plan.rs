//! Write plans are inspectable before they run: step order shows rows
//! landing before the rows and join entries that reference them.

use tests::prelude::*;
use tests::prelude::assert_eq;

#[tokio::test]
async fn save_plans_insert_rows_before_their_join_entries() {
    let (db, _log) = fixtures::db(fixtures::memo_board()).await;

    let mut graph = EntityGraph::new();
    let memo = graph.add(db.entity(db.model("Category").unwrap()).with("name", "memo"));
    let board = graph.add(db.entity(db.model("Category").unwrap()).with("name", "board"));

    let mut q1 = db
        .entity(db.model("Question").unwrap())
        .with("title", "Question1")
        .with("text", "abc");
    q1.push_related("categories", memo);
    let q1 = graph.add(q1);

    let mut q2 = db
        .entity(db.model("Question").unwrap())
        .with("title", "Question2")
        .with("text", "abcd");
    q2.push_related("categories", memo);
    q2.push_related("categories", board);
    let q2 = graph.add(q2);

    let plan = db.plan_save(&graph, &[q1, q2]).await.unwrap();
    let summaries: Vec<&str> = plan.summaries().collect();
    assert_eq!(
        summaries,
        [
            "insert Question",
            "insert Category",
            "link Question.categories",
            "insert Question",
            "insert Category",
            "link Question.categories",
            "link Question.categories",
        ]
    );
}

#[tokio::test]
async fn cyclic_references_defer_one_foreign_key() {
    let models = vec![Model::new("Employee")
        .field(Field::id())
        .field(Field::string("name"))
        .field(Field::many_to_one("mentor", "Employee").cascade(Cascade::SAVE))];
    let (db, log) = fixtures::db(models).await;

    let mut graph = EntityGraph::new();
    let jun = graph.add(db.entity(db.model("Employee").unwrap()).with("name", "Jun"));
    let ada = graph.add(db.entity(db.model("Employee").unwrap()).with("name", "Ada"));
    graph.set_one(jun, "mentor", ada);
    graph.set_one(ada, "mentor", jun);

    let plan = db.plan_save(&graph, &[jun]).await.unwrap();
    let summaries: Vec<&str> = plan.summaries().collect();
    assert_eq!(
        summaries,
        ["insert Employee", "insert Employee", "link Employee.mentor"]
    );

    db.save(&mut graph, &[jun]).await.unwrap();

    // Ada lands first, so her row is inserted with a null mentor and
    // linked back once Jun's key exists
    assert_eq!(graph[ada].key(), Some(1));
    assert_eq!(graph[jun].key(), Some(2));

    let employees = fixtures::table_id(&db, "employee");
    assert_eq!(log.count_updates_of(employees), 1);

    let employee = fixtures::model_id(&db, "Employee");
    for (key, mentor_name) in [(1, "Jun"), (2, "Ada")] {
        let (graph, found) = db
            .get_one(employee, Filter::by_key(key), &["mentor"])
            .await
            .unwrap();
        let mentor = (*graph[found].relation("mentor").unwrap().as_one().unwrap())
            .unwrap()
            .as_node()
            .unwrap();
        assert_eq!(graph[mentor].get("name"), Some(&Value::from(mentor_name)));
    }
}

#[tokio::test]
async fn remove_plans_clean_join_rows_before_the_row() {
    let (db, _log) = fixtures::db(fixtures::memo_board()).await;

    let mut graph = EntityGraph::new();
    let memo = graph.add(db.entity(db.model("Category").unwrap()).with("name", "memo"));
    let board = graph.add(db.entity(db.model("Category").unwrap()).with("name", "board"));
    let mut question = db
        .entity(db.model("Question").unwrap())
        .with("title", "Question2")
        .with("text", "abcd");
    question.push_related("categories", memo);
    question.push_related("categories", board);
    let question = graph.add(question);
    db.save(&mut graph, &[question]).await.unwrap();

    let (mut graph, question) = db
        .get_one(fixtures::model_id(&db, "Question"), Filter::by_key(1), &[])
        .await
        .unwrap();

    let plan = db.plan_remove(&graph, question).await.unwrap();
    let summaries: Vec<&str> = plan.summaries().collect();
    assert_eq!(
        summaries,
        [
            "unlink Question.categories",
            "unlink Question.categories",
            "delete Question id=1",
        ]
    );

    db.remove(&mut graph, question).await.unwrap();

    let category = fixtures::model_id(&db, "Category");
    for key in [1, 2] {
        let (graph, node) = db
            .get_one(category, Filter::by_key(key), &["questions"])
            .await
            .unwrap();
        assert!(graph[node].relation("questions").unwrap().expect_many().is_empty());
    }
}

#[tokio::test]
async fn saving_a_bare_keyed_entity_plans_nothing() {
    let (db, _log) = fixtures::db(fixtures::memo_board()).await;

    let mut entity = db.entity(db.model("Category").unwrap());
    entity.set_key(1);

    let mut graph = EntityGraph::new();
    let node = graph.add(entity);

    let plan = db.plan_save(&graph, &[node]).await.unwrap();
    assert!(plan.is_empty());
}
