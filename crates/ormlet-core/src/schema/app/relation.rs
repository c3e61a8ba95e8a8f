mod many_to_many;
pub use many_to_many::{JoinTable, ManyToMany};

mod many_to_one;
pub use many_to_one::ManyToOne;

mod one_to_many;
pub use one_to_many::OneToMany;

mod one_to_one;
pub use one_to_one::OneToOne;

use super::{Cascade, FieldId, FieldRef, FieldTy, Model, ModelId, ModelRef, Schema};
