pub(crate) mod exec;
pub(crate) mod lower;
pub mod plan;
pub(crate) mod planner;
pub(crate) mod resolve;
