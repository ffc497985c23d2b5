//! `vitrina-core` — storefront domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{BundleId, CollectionId, PriceRuleId, ProductId, VariantId};
pub use money::{discount_percentage, percent_of};
pub use value_object::ValueObject;
