//! Action outcomes.

/// What an action (or a continuation) produced.
///
/// Resolution stops at the first [`Value`](Self::Value). The two empty
/// outcomes differ in where traversal continues: after [`Miss`](Self::Miss)
/// the route's own descendants are skipped, after [`Absent`](Self::Absent)
/// traversal simply moves on to the next match in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<R> {
    /// A result. Resolution is finished.
    Value(R),
    /// Explicit miss: skip this route's subtree.
    Miss,
    /// No opinion: keep falling through.
    Absent,
}

impl<R> Outcome<R> {
    /// Returns `true` for [`Outcome::Value`].
    pub const fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Converts into the value, if any.
    pub fn into_value(self) -> Option<R> {
        match self {
            Self::Value(value) => Some(value),
            Self::Miss | Self::Absent => None,
        }
    }

    /// Maps the value, keeping empty outcomes as they are.
    pub fn map<T>(self, f: impl FnOnce(R) -> T) -> Outcome<T> {
        match self {
            Self::Value(value) => Outcome::Value(f(value)),
            Self::Miss => Outcome::Miss,
            Self::Absent => Outcome::Absent,
        }
    }
}

impl<R> From<Option<R>> for Outcome<R> {
    /// `Some` becomes a value, `None` becomes [`Outcome::Absent`].
    fn from(value: Option<R>) -> Self {
        value.map_or(Self::Absent, Self::Value)
    }
}
