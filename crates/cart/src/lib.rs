//! In-memory shopping cart for the storefront.
//!
//! The cart accepts validated hand-offs from the product page
//! ([`CartAddition`]) and finished bundles
//! ([`vitrina_bundles::AssembledBundle`]), keeps line merging deterministic,
//! and prices itself through `vitrina-pricing` for display. Checkout
//! re-prices authoritatively; nothing here persists or talks to a server.

pub mod cart;

pub use cart::{AddToCartError, Cart, CartAddition, CartLine, CartTotals};
