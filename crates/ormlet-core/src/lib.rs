pub mod driver;
pub use driver::Driver;

pub mod entity;
pub use entity::{Entity, EntityGraph, EntityRef, FieldValue, NodeId, RelationValue};

mod error;
pub use error::Error;

pub mod schema;
pub use schema::Schema;

pub mod stmt;

/// A Result type alias that uses Ormlet's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

pub use async_trait::async_trait;
