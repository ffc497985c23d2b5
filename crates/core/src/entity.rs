//! Entity trait: identity + continuity across state changes.
//!
//! A product stays the same product when its price or stock changes; two
//! catalog rows with equal fields but different ids are different products.
//! Entities carry that distinction through their typed id.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
