use super::{
    Auto, Cascade, Embedded, FieldRef, ManyToMany, ManyToOne, ModelId, ModelRef, OneToMany,
    OneToOne,
};
use crate::stmt;

use std::fmt;

#[derive(Debug, Clone)]
pub struct Field {
    /// Uniquely identifies the field within the containing model.
    pub id: FieldId,

    /// The field name
    pub name: String,

    /// Primitive, embedded, relation, ...
    pub ty: FieldTy,

    /// True if the field accepts null
    pub nullable: bool,

    /// True if values must be unique across the table
    pub unique: bool,

    /// True if the field is the primary key
    pub primary_key: bool,

    /// Set if the store populates this field for new records
    pub auto: Option<Auto>,

    /// Overrides the derived column name
    pub column: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId {
    pub model: ModelId,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct FieldPrimitive {
    pub ty: stmt::Type,
}

#[derive(Debug, Clone)]
pub enum FieldTy {
    Primitive(FieldPrimitive),
    Embedded(Embedded),
    ManyToOne(ManyToOne),
    OneToMany(OneToMany),
    OneToOne(OneToOne),
    ManyToMany(ManyToMany),
}

impl Field {
    /// Declares the primary key field.
    ///
    /// Every root model has exactly one, named `id`, populated by the store
    /// on insert.
    pub fn id() -> Self {
        Self {
            primary_key: true,
            auto: Some(Auto::Increment),
            ..Self::primitive("id", stmt::Type::I64)
        }
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::primitive(name, stmt::Type::Bool)
    }

    pub fn i64(name: impl Into<String>) -> Self {
        Self::primitive(name, stmt::Type::I64)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::primitive(name, stmt::Type::String)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::primitive(name, stmt::Type::Text)
    }

    pub fn json(name: impl Into<String>) -> Self {
        Self::primitive(name, stmt::Type::Json)
    }

    pub fn enumeration(
        name: impl Into<String>,
        variants: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::primitive(
            name,
            stmt::Type::Enum(variants.into_iter().map(Into::into).collect()),
        )
    }

    /// Declares a field holding an embedded model, flattened into this
    /// model's table.
    pub fn embedded(name: impl Into<String>, target: impl Into<ModelRef>) -> Self {
        Self::with_ty(
            name,
            FieldTy::Embedded(Embedded {
                target: target.into(),
            }),
        )
    }

    /// Declares the owning side of a many-to-one relation.
    ///
    /// The foreign key column lives on this model's table, named after the
    /// field (`<name>_id`) unless overridden with [`column`](Self::column).
    pub fn many_to_one(name: impl Into<String>, target: impl Into<ModelRef>) -> Self {
        Self::with_ty(
            name,
            FieldTy::ManyToOne(ManyToOne {
                target: target.into(),
                pair: None,
                cascade: Cascade::NONE,
            }),
        )
    }

    /// Declares the inverse side of a many-to-one relation.
    ///
    /// `pair` names the many-to-one field on the target model that holds the
    /// foreign key.
    pub fn one_to_many(
        name: impl Into<String>,
        target: impl Into<ModelRef>,
        pair: impl Into<FieldRef>,
    ) -> Self {
        Self::with_ty(
            name,
            FieldTy::OneToMany(OneToMany {
                target: target.into(),
                pair: pair.into(),
                cascade: Cascade::NONE,
            }),
        )
    }

    /// Declares a one-to-one relation.
    ///
    /// Exactly one side must call [`join_column`](Self::join_column) to mark
    /// itself as owning the foreign key.
    pub fn one_to_one(name: impl Into<String>, target: impl Into<ModelRef>) -> Self {
        Self::with_ty(
            name,
            FieldTy::OneToOne(OneToOne {
                target: target.into(),
                pair: None,
                join_column: false,
                cascade: Cascade::NONE,
            }),
        )
    }

    /// Declares a many-to-many relation.
    ///
    /// Exactly one side must call [`join_table`](Self::join_table) to mark
    /// itself as owning the join table.
    pub fn many_to_many(name: impl Into<String>, target: impl Into<ModelRef>) -> Self {
        Self::with_ty(
            name,
            FieldTy::ManyToMany(ManyToMany {
                target: target.into(),
                pair: None,
                join_table: None,
                cascade: Cascade::NONE,
            }),
        )
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Overrides the column name the field is stored under.
    ///
    /// For many-to-one and owning one-to-one fields this names the foreign
    /// key column.
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.column = Some(name.into());
        self
    }

    /// Sets the cascade flags for a relation field.
    #[track_caller]
    pub fn cascade(mut self, cascade: Cascade) -> Self {
        match &mut self.ty {
            FieldTy::ManyToOne(rel) => rel.cascade = cascade,
            FieldTy::OneToMany(rel) => rel.cascade = cascade,
            FieldTy::OneToOne(rel) => rel.cascade = cascade,
            FieldTy::ManyToMany(rel) => rel.cascade = cascade,
            _ => panic!("cascade set on non-relation field {}", self.name),
        }
        self
    }

    /// Names the paired field on the target model.
    #[track_caller]
    pub fn pair(mut self, pair: impl Into<FieldRef>) -> Self {
        let pair = pair.into();
        match &mut self.ty {
            FieldTy::ManyToOne(rel) => rel.pair = Some(pair),
            FieldTy::OneToOne(rel) => rel.pair = Some(pair),
            FieldTy::ManyToMany(rel) => rel.pair = Some(pair),
            _ => panic!("pair set on field {} which cannot take one", self.name),
        }
        self
    }

    /// Marks this one-to-one side as holding the foreign key.
    #[track_caller]
    pub fn join_column(mut self) -> Self {
        match &mut self.ty {
            FieldTy::OneToOne(rel) => rel.join_column = true,
            _ => panic!("join_column set on non one-to-one field {}", self.name),
        }
        self
    }

    /// Marks this many-to-many side as owning the join table.
    #[track_caller]
    pub fn join_table(self) -> Self {
        self.set_join_table(super::JoinTable::default())
    }

    /// Marks this many-to-many side as owning an explicitly named join table.
    #[track_caller]
    pub fn join_table_named(self, name: impl Into<String>) -> Self {
        self.set_join_table(super::JoinTable {
            name: Some(name.into()),
            ..Default::default()
        })
    }

    /// Overrides the join table's foreign key column names.
    #[track_caller]
    pub fn join_table_columns(
        mut self,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        match &mut self.ty {
            FieldTy::ManyToMany(ManyToMany {
                join_table: Some(join_table),
                ..
            }) => {
                join_table.source_column = Some(source.into());
                join_table.target_column = Some(target.into());
            }
            _ => panic!(
                "join_table_columns set on field {} which has no join table",
                self.name
            ),
        }
        self
    }

    pub fn is_auto_increment(&self) -> bool {
        self.auto
            .as_ref()
            .map(|auto| auto.is_increment())
            .unwrap_or(false)
    }

    pub fn is_relation(&self) -> bool {
        self.ty.is_relation()
    }

    /// The column name the field is stored under.
    pub fn column_name(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }

    /// The foreign key column name for a many-to-one or owning one-to-one
    /// field.
    pub fn fk_column_name(&self) -> String {
        match &self.column {
            Some(column) => column.clone(),
            None => format!("{}_id", self.name),
        }
    }

    fn primitive(name: impl Into<String>, ty: stmt::Type) -> Self {
        Self::with_ty(name, FieldTy::Primitive(FieldPrimitive { ty }))
    }

    fn with_ty(name: impl Into<String>, ty: FieldTy) -> Self {
        Self {
            id: FieldId::placeholder(),
            name: name.into(),
            ty,
            nullable: false,
            unique: false,
            primary_key: false,
            auto: None,
            column: None,
        }
    }

    #[track_caller]
    fn set_join_table(mut self, join_table: super::JoinTable) -> Self {
        match &mut self.ty {
            FieldTy::ManyToMany(rel) => rel.join_table = Some(join_table),
            _ => panic!("join_table set on non many-to-many field {}", self.name),
        }
        self
    }
}

impl FieldTy {
    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(..))
    }

    pub fn as_primitive(&self) -> Option<&FieldPrimitive> {
        match self {
            Self::Primitive(primitive) => Some(primitive),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_primitive(&self) -> &FieldPrimitive {
        match self {
            Self::Primitive(primitive) => primitive,
            _ => panic!("expected primitive field, but was {self:?}"),
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded(..))
    }

    pub fn as_embedded(&self) -> Option<&Embedded> {
        match self {
            Self::Embedded(embedded) => Some(embedded),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_embedded(&self) -> &Embedded {
        match self {
            Self::Embedded(embedded) => embedded,
            _ => panic!("expected embedded field, but was {self:?}"),
        }
    }

    pub fn is_relation(&self) -> bool {
        matches!(
            self,
            Self::ManyToOne(..) | Self::OneToMany(..) | Self::OneToOne(..) | Self::ManyToMany(..)
        )
    }

    pub fn is_many_to_one(&self) -> bool {
        matches!(self, Self::ManyToOne(..))
    }

    pub fn as_many_to_one(&self) -> Option<&ManyToOne> {
        match self {
            Self::ManyToOne(rel) => Some(rel),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_many_to_one(&self) -> &ManyToOne {
        match self {
            Self::ManyToOne(rel) => rel,
            _ => panic!("expected field to be `ManyToOne`, but was {self:?}"),
        }
    }

    pub fn is_one_to_many(&self) -> bool {
        matches!(self, Self::OneToMany(..))
    }

    pub fn as_one_to_many(&self) -> Option<&OneToMany> {
        match self {
            Self::OneToMany(rel) => Some(rel),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_one_to_many(&self) -> &OneToMany {
        match self {
            Self::OneToMany(rel) => rel,
            _ => panic!("expected field to be `OneToMany`, but was {self:?}"),
        }
    }

    pub fn is_one_to_one(&self) -> bool {
        matches!(self, Self::OneToOne(..))
    }

    pub fn as_one_to_one(&self) -> Option<&OneToOne> {
        match self {
            Self::OneToOne(rel) => Some(rel),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_one_to_one(&self) -> &OneToOne {
        match self {
            Self::OneToOne(rel) => rel,
            _ => panic!("expected field to be `OneToOne`, but was {self:?}"),
        }
    }

    pub fn is_many_to_many(&self) -> bool {
        matches!(self, Self::ManyToMany(..))
    }

    pub fn as_many_to_many(&self) -> Option<&ManyToMany> {
        match self {
            Self::ManyToMany(rel) => Some(rel),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_many_to_many(&self) -> &ManyToMany {
        match self {
            Self::ManyToMany(rel) => rel,
            _ => panic!("expected field to be `ManyToMany`, but was {self:?}"),
        }
    }

    /// The relation's cascade flags, if this is a relation field.
    pub fn cascade(&self) -> Option<Cascade> {
        match self {
            Self::ManyToOne(rel) => Some(rel.cascade),
            Self::OneToMany(rel) => Some(rel.cascade),
            Self::OneToOne(rel) => Some(rel.cascade),
            Self::ManyToMany(rel) => Some(rel.cascade),
            _ => None,
        }
    }

    /// The relation's target, if this is a relation field.
    pub fn relation_target(&self) -> Option<&ModelRef> {
        match self {
            Self::ManyToOne(rel) => Some(&rel.target),
            Self::OneToMany(rel) => Some(&rel.target),
            Self::OneToOne(rel) => Some(&rel.target),
            Self::ManyToMany(rel) => Some(&rel.target),
            _ => None,
        }
    }
}

impl FieldId {
    pub(crate) const fn placeholder() -> Self {
        Self {
            model: ModelId::placeholder(),
            index: usize::MAX,
        }
    }
}

impl From<&Self> for FieldId {
    fn from(src: &Self) -> Self {
        *src
    }
}

impl From<&Field> for FieldId {
    fn from(value: &Field) -> Self {
        value.id
    }
}

impl fmt::Debug for FieldId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "FieldId({}/{})", self.model.0, self.index)
    }
}
