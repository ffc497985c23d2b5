//! Catalog domain module (products, options, variants).
//!
//! This crate contains the storefront's product model and variant resolution
//! rules, implemented purely as deterministic domain logic (no IO, no HTTP,
//! no storage). Raw backend rows are validated once at the boundary
//! ([`Product::from_record`]); every operation after that point is total.

pub mod display;
pub mod product;
pub mod resolver;
pub mod selection;

pub use display::{DisplayState, display_state};
pub use product::{OptionAxis, Product, ProductRecord, Slug, Variant, VariantRecord};
pub use resolver::{
    DefaultSelectionPolicy, default_selection, matching_variant, option_value_available,
    selection_complete,
};
pub use selection::Selection;
