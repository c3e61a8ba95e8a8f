/// How the store should populate the field for new records
#[derive(Debug, Clone)]
pub enum Auto {
    Increment,
}

impl Auto {
    /// Returns `true` if the auto is [`Increment`].
    ///
    /// [`Increment`]: Auto::Increment
    #[must_use]
    pub fn is_increment(&self) -> bool {
        matches!(self, Self::Increment)
    }
}
