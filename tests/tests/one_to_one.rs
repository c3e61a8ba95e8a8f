//! One-to-one relations: the owning side stores the key, the inverse
//! side resolves through its pair, and the unique column keeps two rows
//! from claiming the same target.

use tests::prelude::*;
use tests::prelude::assert_eq;

async fn seed_gamer(db: &Db) {
    let mut graph = EntityGraph::new();
    let profile = graph.add(
        db.entity(db.model("Profile").unwrap())
            .with("gender", "male")
            .with("photo", "timber.png"),
    );
    let mut gamer = db.entity(db.model("Gamer").unwrap()).with("name", "Timber");
    gamer.set_one("profile", profile);
    let gamer = graph.add(gamer);

    db.save(&mut graph, &[gamer]).await.unwrap();
    assert_eq!(graph[gamer].key(), Some(1));
    assert_eq!(graph[profile].key(), Some(1));
}

#[tokio::test]
async fn saving_a_gamer_carries_its_profile() {
    let (db, log) = fixtures::db(fixtures::gamers()).await;

    seed_gamer(&db).await;

    let gamers = fixtures::table_id(&db, "gamer");
    let profiles = fixtures::table_id(&db, "profile");

    let (profile_at, gamer_at, fk) = log.with_ops(|ops| {
        let position = |table| {
            ops.iter()
                .position(|op| matches!(op, Operation::Insert(insert) if insert.table == table))
                .unwrap()
        };
        let fk = ops
            .iter()
            .find_map(|op| match op {
                Operation::Insert(insert) if insert.table == gamers => {
                    Some(insert.rows[0][2].clone())
                }
                _ => None,
            })
            .unwrap();
        (position(profiles), position(gamers), fk)
    });

    // The profile row exists before the gamer row that references it
    assert!(profile_at < gamer_at);
    assert_eq!(fk, Value::I64(1));

    let (graph, found) = db
        .get_one(fixtures::model_id(&db, "Gamer"), Filter::by_key(1), &["profile"])
        .await
        .unwrap();
    let profile = (*graph[found].relation("profile").unwrap().as_one().unwrap())
        .unwrap()
        .as_node()
        .unwrap();
    assert_eq!(graph[profile].get("photo"), Some(&Value::from("timber.png")));
}

#[tokio::test]
async fn the_inverse_side_loads_through_its_pair() {
    let (db, _log) = fixtures::db(fixtures::gamers()).await;

    seed_gamer(&db).await;

    let (graph, found) = db
        .get_one(fixtures::model_id(&db, "Profile"), Filter::by_key(1), &["gamer"])
        .await
        .unwrap();
    let gamer = (*graph[found].relation("gamer").unwrap().as_one().unwrap())
        .unwrap()
        .as_node()
        .unwrap();
    assert_eq!(graph[gamer].get("name"), Some(&Value::from("Timber")));
}

#[tokio::test]
async fn dangling_references_load_as_unlinked() {
    let (db, _log) = fixtures::db(fixtures::gamers()).await;

    let mut graph = EntityGraph::new();
    let mut gamer = db.entity(db.model("Gamer").unwrap()).with("name", "Ghost");
    gamer.set_one("profile", 999i64);
    let gamer = graph.add(gamer);
    db.save(&mut graph, &[gamer]).await.unwrap();

    let (graph, found) = db
        .get_one(fixtures::model_id(&db, "Gamer"), Filter::by_key(1), &["profile"])
        .await
        .unwrap();
    assert_eq!(graph[found].relation("profile").unwrap().as_one(), Some(&None));
}

#[tokio::test]
async fn two_gamers_cannot_share_a_profile() {
    let (db, _log) = fixtures::db(fixtures::gamers()).await;

    seed_gamer(&db).await;

    let mut graph = EntityGraph::new();
    let mut rival = db.entity(db.model("Gamer").unwrap()).with("name", "Rival");
    rival.set_one("profile", 1i64);
    let rival = graph.add(rival);

    let err = db.save(&mut graph, &[rival]).await.unwrap_err();
    assert!(err.is_transaction_failure());
    assert!(err
        .to_string()
        .contains("unique constraint violated: gamer.gamer_profile"));

    // The failed save left nothing behind
    let gone = db
        .find_one(
            fixtures::model_id(&db, "Gamer"),
            Filter::eq("name", "Rival"),
            &[],
        )
        .await
        .unwrap();
    assert!(gone.is_none());
}
