//! Price rule evaluation for the storefront.
//!
//! Rules are loaded from the backend and evaluated locally so carts and
//! product pages can show discounts without a server round trip. Evaluation
//! is display-layer only: checkout re-prices authoritatively, so nothing in
//! here mutates orders or talks to the network. All operations take the
//! evaluation instant explicitly and are deterministic.

pub mod engine;
pub mod rule;

pub use engine::{LineDiscount, PricingBreakdown, apply_rules};
pub use rule::{LineItem, PriceRule, PriceRuleKind, RuleScope};
