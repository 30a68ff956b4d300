//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Ord + core::hash::Hash + core::fmt::Debug;

    /// Name used in error messages and logs.
    const NAME: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
