//! Common imports for test files
//!
//! This module provides a convenient way to import frequently used items
//! in test files with `use tests::prelude::*;`

// Re-export test infrastructure
pub use crate::exec_log::ExecLog;
pub use crate::fixtures;
pub use crate::recording_driver::{FailureSwitch, RecordingDriver};

// Re-export the client API surface the tests touch
pub use ormlet::driver::Operation;
pub use ormlet::stmt::Value;
pub use ormlet::{
    Cascade, Db, Entity, EntityGraph, EntityRef, Error, Field, Filter, Model, NodeId,
    RelationValue,
};

pub use pretty_assertions::assert_eq;
