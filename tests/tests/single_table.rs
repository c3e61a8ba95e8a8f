//! A model hierarchy stored in one table, with a discriminator column
//! naming the model each row belongs to.

use tests::prelude::*;
use tests::prelude::assert_eq;

async fn seed(db: &Db) {
    let mut graph = EntityGraph::new();
    let photo = graph.add(
        db.entity(db.model("Photo").unwrap())
            .with("title", "Sunrise")
            .with("description", "over the bay")
            .with("size", "1024x768"),
    );
    let post = graph.add(
        db.entity(db.model("Post").unwrap())
            .with("title", "Hello")
            .with("description", "first post")
            .with("view_count", 7i64),
    );
    db.save(&mut graph, &[photo, post]).await.unwrap();

    // One table, one key sequence
    assert_eq!(graph[photo].key(), Some(1));
    assert_eq!(graph[post].key(), Some(2));
}

#[tokio::test]
async fn hierarchy_rows_share_one_table_and_carry_a_tag() {
    let (db, log) = fixtures::db(fixtures::content()).await;

    seed(&db).await;

    let content = fixtures::table_id(&db, "content");
    assert_eq!(log.count_inserts_into(content), 2);

    // Columns: id, title, description, type, size, view_count
    let rows: Vec<Vec<Value>> = log.with_ops(|ops| {
        ops.iter()
            .filter_map(|op| match op {
                Operation::Insert(insert) if insert.table == content => {
                    Some(insert.rows[0].clone())
                }
                _ => None,
            })
            .collect()
    });
    assert_eq!(rows[0][3], Value::from("Photo"));
    assert_eq!(rows[0][4], Value::from("1024x768"));
    assert_eq!(rows[0][5], Value::Null);
    assert_eq!(rows[1][3], Value::from("Post"));
    assert_eq!(rows[1][4], Value::Null);
    assert_eq!(rows[1][5], Value::I64(7));
}

#[tokio::test]
async fn base_queries_dispatch_to_the_stored_model() {
    let (db, _log) = fixtures::db(fixtures::content()).await;

    seed(&db).await;

    let content = fixtures::model_id(&db, "Content");

    let (graph, found) = db.get_one(content, Filter::by_key(1), &[]).await.unwrap();
    assert_eq!(graph[found].model, fixtures::model_id(&db, "Photo"));
    assert_eq!(graph[found].get("size"), Some(&Value::from("1024x768")));
    assert_eq!(graph[found].get("view_count"), None);

    let (graph, found) = db.get_one(content, Filter::by_key(2), &[]).await.unwrap();
    assert_eq!(graph[found].model, fixtures::model_id(&db, "Post"));
    assert_eq!(graph[found].get("view_count"), Some(&Value::I64(7)));
}

#[tokio::test]
async fn sub_model_queries_only_see_their_own_rows() {
    let (db, _log) = fixtures::db(fixtures::content()).await;

    seed(&db).await;

    let found = db
        .find_one(
            fixtures::model_id(&db, "Post"),
            Filter::eq("title", "Sunrise"),
            &[],
        )
        .await
        .unwrap();
    assert!(found.is_none());

    // Same goes for key lookups across the shared key sequence
    let found = db
        .find_one(fixtures::model_id(&db, "Post"), Filter::by_key(1), &[])
        .await
        .unwrap();
    assert!(found.is_none());

    let found = db
        .find_one(
            fixtures::model_id(&db, "Photo"),
            Filter::eq("title", "Sunrise"),
            &[],
        )
        .await
        .unwrap();
    assert!(found.is_some());
}

#[tokio::test]
async fn updating_a_sub_model_keeps_its_tag() {
    let (db, _log) = fixtures::db(fixtures::content()).await;

    seed(&db).await;

    let content = fixtures::model_id(&db, "Content");
    let (mut graph, photo) = db.get_one(content, Filter::by_key(1), &[]).await.unwrap();
    graph[photo].set("title", "Sunset");
    db.save(&mut graph, &[photo]).await.unwrap();

    let (graph, found) = db.get_one(content, Filter::by_key(1), &[]).await.unwrap();
    assert_eq!(graph[found].model, fixtures::model_id(&db, "Photo"));
    assert_eq!(graph[found].get("title"), Some(&Value::from("Sunset")));
}
