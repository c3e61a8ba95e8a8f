mod db;
pub use db::Db;

mod engine;
pub use engine::plan;
pub use plan::Plan;

pub use ormlet_core::{
    driver, entity, schema, stmt, Entity, EntityGraph, EntityRef, Error, NodeId, RelationValue,
    Result,
};

#[doc(inline)]
pub use schema::app::{Cascade, Field, Model};
#[doc(inline)]
pub use stmt::Filter;
