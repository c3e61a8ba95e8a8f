//! One-to-many relations backed by a foreign key on the member's row.
//! The link is always maintained; cascade flags decide whether member
//! rows themselves are written or removed.

use tests::prelude::*;
use tests::prelude::assert_eq;

fn one_node(graph: &EntityGraph, node: NodeId, field: &str) -> NodeId {
    let target = *graph[node].relation(field).unwrap().as_one().unwrap();
    target.unwrap().as_node().unwrap()
}

#[tokio::test]
async fn saving_a_member_carries_its_department() {
    let (db, log) = fixtures::db(fixtures::company()).await;

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
    assert_eq!(graph[department].key(), Some(1));
    assert_eq!(graph[member].key(), Some(1));

    // The referenced row is written before the row holding the key
    let departments = fixtures::table_id(&db, "department");
    let members = fixtures::table_id(&db, "company_member");
    let (department_at, member_at) = log.with_ops(|ops| {
        let position = |table| {
            ops.iter()
                .position(|op| matches!(op, Operation::Insert(insert) if insert.table == table))
                .unwrap()
        };
        (position(departments), position(members))
    });
    assert!(department_at < member_at);

    let (graph, found) = db
        .get_one(
            fixtures::model_id(&db, "CompanyMember"),
            Filter::by_key(1),
            &["department"],
        )
        .await
        .unwrap();
    let department = one_node(&graph, found, "department");
    assert_eq!(graph[department].get("name"), Some(&Value::from("Accounting")));
}

#[tokio::test]
async fn a_department_adopts_members_referenced_by_key() {
    let (db, log) = fixtures::db(fixtures::company()).await;

    let mut graph = EntityGraph::new();
    let first = graph.add(
        db.entity(db.model("CompanyMember").unwrap())
            .with("name", "Ravi")
            .with("age", 30i64),
    );
    let second = graph.add(
        db.entity(db.model("CompanyMember").unwrap())
            .with("name", "Priya")
            .with("age", 28i64),
    );
    db.save(&mut graph, &[first, second]).await.unwrap();

    log.clear();

    let mut graph = EntityGraph::new();
    let mut department = db
        .entity(db.model("Department").unwrap())
        .with("name", "Engineering");
    department.set_many("member", [EntityRef::Key(1), EntityRef::Key(2)]);
    let department = graph.add(department);

    db.save(&mut graph, &[department]).await.unwrap();

    let departments = fixtures::table_id(&db, "department");
    let members = fixtures::table_id(&db, "company_member");
    assert_eq!(log.count_inserts_into(departments), 1);
    assert_eq!(log.count_updates_of(members), 2);

    let (graph, found) = db
        .get_one(
            fixtures::model_id(&db, "CompanyMember"),
            Filter::by_key(2),
            &["department"],
        )
        .await
        .unwrap();
    let department = one_node(&graph, found, "department");
    assert_eq!(
        graph[department].get("name"),
        Some(&Value::from("Engineering"))
    );
}

#[tokio::test]
async fn removing_a_department_unlinks_its_members() {
    let (db, log) = fixtures::db(fixtures::company()).await;

    let mut graph = EntityGraph::new();
    let department = graph.add(
        db.entity(db.model("Department").unwrap())
            .with("name", "Accounting"),
    );
    let mut first = db
        .entity(db.model("CompanyMember").unwrap())
        .with("name", "Sharma")
        .with("age", 26i64);
    first.set_one("department", department);
    let first = graph.add(first);
    let mut second = db
        .entity(db.model("CompanyMember").unwrap())
        .with("name", "Ravi")
        .with("age", 30i64);
    second.set_one("department", department);
    let second = graph.add(second);
    db.save(&mut graph, &[first, second]).await.unwrap();

    let (mut graph, department) = db
        .get_one(fixtures::model_id(&db, "Department"), Filter::by_key(1), &[])
        .await
        .unwrap();

    log.clear();
    db.remove(&mut graph, department).await.unwrap();
    assert_eq!(graph[department].key(), None);

    let departments = fixtures::table_id(&db, "department");
    let members = fixtures::table_id(&db, "company_member");
    assert_eq!(log.count_deletes_from(departments), 1);
    assert_eq!(log.count_deletes_from(members), 0);
    assert_eq!(log.count_updates_of(members), 2);

    // Members survive, unlinked
    let (graph, found) = db
        .get_one(
            fixtures::model_id(&db, "CompanyMember"),
            Filter::by_key(1),
            &[],
        )
        .await
        .unwrap();
    assert_eq!(graph[found].relation("department").unwrap().as_one(), Some(&None));

    let gone = db
        .find_one(fixtures::model_id(&db, "Department"), Filter::by_key(1), &[])
        .await
        .unwrap();
    assert!(gone.is_none());
}

#[tokio::test]
async fn an_owning_department_carries_and_removes_its_members() {
    let (db, log) = fixtures::db(fixtures::company_with_owned_members()).await;

    let mut graph = EntityGraph::new();
    let members = [
        db.entity(db.model("CompanyMember").unwrap())
            .with("name", "Sharma")
            .with("age", 26i64),
        db.entity(db.model("CompanyMember").unwrap())
            .with("name", "Ravi")
            .with("age", 30i64),
    ]
    .map(|member| graph.add(member));
    let mut department = db
        .entity(db.model("Department").unwrap())
        .with("name", "Accounting");
    department.set_many("member", members);
    let department = graph.add(department);

    db.save(&mut graph, &[department]).await.unwrap();

    let member_table = fixtures::table_id(&db, "company_member");
    assert_eq!(log.count_inserts_into(member_table), 2);
    assert_eq!(log.count_updates_of(member_table), 0);

    // Dependent rows are deleted before the row they point at
    let plan = db.plan_remove(&graph, department).await.unwrap();
    let summaries: Vec<&str> = plan.summaries().collect();
    assert_eq!(
        summaries,
        [
            "delete CompanyMember id=1",
            "delete CompanyMember id=2",
            "delete Department id=1",
        ]
    );

    db.remove(&mut graph, department).await.unwrap();

    for key in [1, 2] {
        let gone = db
            .find_one(
                fixtures::model_id(&db, "CompanyMember"),
                Filter::by_key(key),
                &[],
            )
            .await
            .unwrap();
        assert!(gone.is_none());
    }
}
