/// Which operations propagate across a relation edge.
///
/// Cascade flags gate how far the planner descends when expanding a save or
/// remove into a plan. They never gate join table maintenance, which is part
/// of writing the owning entity itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cascade {
    /// Saving the source inserts unsaved related entities
    pub insert: bool,

    /// Saving the source updates already-saved related entities
    pub update: bool,

    /// Removing the source removes related entities
    pub remove: bool,
}

impl Cascade {
    pub const NONE: Cascade = Cascade {
        insert: false,
        update: false,
        remove: false,
    };

    pub const ALL: Cascade = Cascade {
        insert: true,
        update: true,
        remove: true,
    };

    /// Insert and update propagation without remove.
    pub const SAVE: Cascade = Cascade {
        insert: true,
        update: true,
        remove: false,
    };

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}
