use ormlet::{Cascade, Db, EntityGraph, Field, Filter, Model};

#[tokio::main]
async fn main() -> ormlet::Result<()> {
    tracing_subscriber::fmt::init();

    let db = Db::builder()
        .register(
            Model::new("Category")
                .field(Field::id())
                .field(Field::string("name"))
                .field(Field::many_to_many("questions", "Question").pair("categories")),
        )
        .register(
            Model::new("Question")
                .field(Field::id())
                .field(Field::string("title"))
                .field(Field::string("text"))
                .field(
                    Field::many_to_many("categories", "Category")
                        .join_table()
                        .pair("questions")
                        .cascade(Cascade::SAVE),
                ),
        )
        .connect("mem://")
        .await?;

    println!("==> save([question1, question2])");

    let mut graph = EntityGraph::new();
    let memo = graph.add(db.entity(db.model("Category")?).with("name", "memo"));
    let board = graph.add(db.entity(db.model("Category")?).with("name", "board"));

    let mut question1 = db
        .entity(db.model("Question")?)
        .with("title", "Question1")
        .with("text", "abc");
    question1.push_related("categories", memo);
    let question1 = graph.add(question1);

    let mut question2 = db
        .entity(db.model("Question")?)
        .with("title", "Question2")
        .with("text", "abcd");
    question2.push_related("categories", memo);
    question2.push_related("categories", board);
    let question2 = graph.add(question2);

    db.save(&mut graph, &[question1, question2]).await?;

    println!(" -> question1 id={:?}", graph[question1].key());
    println!(" -> question2 id={:?}", graph[question2].key());
    println!(" -> memo id={:?}", graph[memo].key());
    println!(" -> board id={:?}", graph[board].key());

    println!("==> find_one(Category, id=1, relations=[questions])");

    let (mut graph, memo) = db
        .get_one(db.model("Category")?, Filter::by_key(1), &["questions"])
        .await?;
    println!(" -> {:#?}", graph[memo]);

    println!("==> drop question 2 from the member set and save");

    let members = graph[memo]
        .relation("questions")
        .and_then(|members| members.as_many())
        .unwrap_or(&[]);
    let dropped = members
        .iter()
        .copied()
        .find(|member| graph.key_of(*member) == Some(2));

    if let Some(dropped) = dropped {
        graph.entity_mut(memo).remove_related("questions", dropped);
    }
    db.save(&mut graph, &[memo]).await?;

    let (graph, memo) = db
        .get_one(db.model("Category")?, Filter::by_key(1), &["questions"])
        .await?;
    let remaining = graph[memo]
        .relation("questions")
        .and_then(|members| members.as_many())
        .map_or(0, <[_]>::len);
    println!(" -> memo now has {remaining} question(s)");

    // Question 2 itself is untouched; only its membership changed
    let (graph, question2) = db
        .get_one(db.model("Question")?, Filter::by_key(2), &["categories"])
        .await?;
    println!(" -> {:#?}", graph[question2]);

    Ok(())
}
