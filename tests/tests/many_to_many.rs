//! Many-to-many membership maintained through a join table: saving links
//! each member exactly once, and editing a loaded member set touches only
//! the join rows that actually changed.

use tests::prelude::*;
use tests::prelude::assert_eq;

/// Two questions sharing the "memo" category, one also on "board".
async fn seed(db: &Db) {
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

    db.save(&mut graph, &[q1, q2]).await.unwrap();

    assert_eq!(graph[q1].key(), Some(1));
    assert_eq!(graph[q2].key(), Some(2));
    assert_eq!(graph[memo].key(), Some(1));
    assert_eq!(graph[board].key(), Some(2));
}

fn member_keys(graph: &EntityGraph, node: NodeId, field: &str) -> Vec<i64> {
    graph[node]
        .relation(field)
        .unwrap()
        .expect_many()
        .iter()
        .map(|member| graph.key_of(*member).unwrap())
        .collect()
}

#[tokio::test]
async fn save_links_each_member_exactly_once() {
    let (db, log) = fixtures::db(fixtures::memo_board()).await;

    seed(&db).await;

    let questions = fixtures::table_id(&db, "question");
    let categories = fixtures::table_id(&db, "category");
    let joins = fixtures::table_id(&db, "question_categories_category");

    assert_eq!(log.count_inserts_into(questions), 2);
    assert_eq!(log.count_inserts_into(categories), 2);
    assert_eq!(log.count_inserts_into(joins), 3);

    // Fresh rows have no stored membership to diff against
    assert_eq!(log.count(|op| matches!(op, Operation::QueryTable(_))), 0);

    let mut join_rows: Vec<(i64, i64)> = log.with_ops(|ops| {
        ops.iter()
            .filter_map(|op| match op {
                Operation::Insert(insert) if insert.table == joins => {
                    let row = &insert.rows[0];
                    Some((row[0].expect_i64(), row[1].expect_i64()))
                }
                _ => None,
            })
            .collect()
    });
    join_rows.sort_unstable();

    // (question_id, category_id)
    assert_eq!(join_rows, [(1, 1), (2, 1), (2, 2)]);
}

#[tokio::test]
async fn removing_a_loaded_member_deletes_one_join_row() {
    let (db, log) = fixtures::db(fixtures::memo_board()).await;
    let category = fixtures::model_id(&db, "Category");

    seed(&db).await;

    let (mut graph, memo) = db
        .find_one(category, Filter::by_key(1), &["questions"])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(member_keys(&graph, memo, "questions"), [1, 2]);

    let question2 = graph[memo]
        .relation("questions")
        .unwrap()
        .expect_many()
        .iter()
        .copied()
        .find(|member| graph.key_of(*member) == Some(2))
        .unwrap();
    graph.entity_mut(memo).remove_related("questions", question2);

    log.clear();
    db.save(&mut graph, &[memo]).await.unwrap();

    let questions = fixtures::table_id(&db, "question");
    let categories = fixtures::table_id(&db, "category");
    let joins = fixtures::table_id(&db, "question_categories_category");

    // One join row goes; the member set is not rewritten wholesale
    assert_eq!(log.count_deletes_from(joins), 1);
    assert_eq!(log.count_inserts_into(joins), 0);
    assert_eq!(log.count_updates_of(questions), 0);
    assert_eq!(log.count_deletes_from(questions), 0);
    assert_eq!(log.count_updates_of(categories), 1);

    let (graph, memo) = db
        .find_one(category, Filter::by_key(1), &["questions"])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(member_keys(&graph, memo, "questions"), [1]);

    // The other category keeps its membership
    let (graph, board) = db
        .find_one(category, Filter::by_key(2), &["questions"])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(member_keys(&graph, board, "questions"), [2]);
}

#[tokio::test]
async fn resaving_an_unchanged_member_set_leaves_join_rows_alone() {
    let (db, log) = fixtures::db(fixtures::memo_board()).await;
    let category = fixtures::model_id(&db, "Category");

    seed(&db).await;

    let (mut graph, memo) = db
        .find_one(category, Filter::by_key(1), &["questions"])
        .await
        .unwrap()
        .unwrap();

    log.clear();
    db.save(&mut graph, &[memo]).await.unwrap();

    let joins = fixtures::table_id(&db, "question_categories_category");
    assert_eq!(log.count_inserts_into(joins), 0);
    assert_eq!(log.count_deletes_from(joins), 0);
}
