//! Model sets used across the integration tests, mirroring the shapes the
//! relation machinery has to cover: a join-table pair, a foreign-key pair,
//! an owned one-to-one, an embedded value, and a single-table hierarchy.

use crate::recording_driver::{FailureSwitch, RecordingDriver};
use crate::ExecLog;

use ormlet::schema::app::ModelId;
use ormlet::schema::db::TableId;
use ormlet::{Cascade, Db, Field, Model};

/// Question owns a join table to Category; saving a question carries its
/// categories along.
pub fn memo_board() -> Vec<Model> {
    vec![
        Model::new("Category")
            .field(Field::id())
            .field(Field::string("name"))
            .field(Field::many_to_many("questions", "Question").pair("categories")),
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
    ]
}

/// A one-to-many with the foreign key on the member side. Saving a member
/// carries its department along; removing a department leaves its members
/// in place, unlinked.
pub fn company() -> Vec<Model> {
    vec![
        Model::new("Department")
            .field(Field::id())
            .field(Field::string("name").unique())
            .field(Field::one_to_many("member", "CompanyMember", "department")),
        Model::new("CompanyMember")
            .field(Field::id())
            .field(Field::string("name"))
            .field(Field::i64("age"))
            .field(Field::text("description").nullable())
            .field(
                Field::many_to_one("department", "Department")
                    .pair("member")
                    .cascade(Cascade::SAVE),
            ),
    ]
}

/// Like [`company`], but the department owns its members' lifecycle:
/// saving it carries the members along and removing it removes them.
pub fn company_with_owned_members() -> Vec<Model> {
    vec![
        Model::new("Department")
            .field(Field::id())
            .field(Field::string("name").unique())
            .field(
                Field::one_to_many("member", "CompanyMember", "department")
                    .cascade(Cascade::ALL),
            ),
        Model::new("CompanyMember")
            .field(Field::id())
            .field(Field::string("name"))
            .field(Field::i64("age"))
            .field(Field::text("description").nullable())
            .field(Field::many_to_one("department", "Department").pair("member")),
    ]
}

/// A one-to-one with the key on the gamer side, stored in a column with an
/// explicit name.
pub fn gamers() -> Vec<Model> {
    vec![
        Model::new("Gamer")
            .field(Field::id())
            .field(Field::string("name"))
            .field(
                Field::one_to_one("profile", "Profile")
                    .join_column()
                    .column("gamer_profile")
                    .pair("gamer")
                    .cascade(Cascade::SAVE),
            ),
        Model::new("Profile")
            .field(Field::id())
            .field(Field::enumeration("gender", ["male", "female"]))
            .field(Field::string("photo"))
            .field(Field::one_to_one("gamer", "Gamer").pair("profile")),
    ]
}

/// A student with an embedded name, flattened into the student table.
pub fn students() -> Vec<Model> {
    vec![
        Model::new("Student")
            .field(Field::id())
            .field(Field::embedded("name", "Name"))
            .field(Field::string("faculty")),
        Model::embedded("Name")
            .field(Field::string("firstname"))
            .field(Field::string("lastname")),
    ]
}

/// A content hierarchy stored in one table with a type tag.
pub fn content() -> Vec<Model> {
    vec![
        Model::new("Content")
            .discriminator("type")
            .field(Field::id())
            .field(Field::string("title"))
            .field(Field::text("description")),
        Model::sub_of("Photo", "Content").field(Field::string("size")),
        Model::sub_of("Post", "Content").field(Field::i64("view_count")),
    ]
}

/// Builds a database over a recording in-memory driver.
pub async fn db(models: Vec<Model>) -> (Db, ExecLog) {
    let (db, log, _) = db_with_failures(models).await;
    (db, log)
}

/// Builds a database whose driver can be told to fail a later write.
pub async fn db_with_failures(models: Vec<Model>) -> (Db, ExecLog, FailureSwitch) {
    let driver = RecordingDriver::new();
    let log = driver.log();
    let switch = driver.failure_switch();

    let mut builder = Db::builder();
    for model in models {
        builder.register(model);
    }
    let db = builder.build(driver).await.unwrap();

    (db, log, switch)
}

/// The identifier of the named model.
#[track_caller]
pub fn model_id(db: &Db, name: &str) -> ModelId {
    db.model(name).unwrap().id
}

/// The identifier of the named table.
#[track_caller]
pub fn table_id(db: &Db, name: &str) -> TableId {
    db.schema()
        .db
        .table_by_name(name)
        .unwrap_or_else(|| panic!("no table named {name}"))
        .id
}
