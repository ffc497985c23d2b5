use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitrina_core::{BundleId, CollectionId, PriceRuleId, ProductId};

/// A promotional rule row as configured in the backend.
///
/// Plain data with no hidden invariants: malformed parameters (zero
/// thresholds, percentages over 100) degrade to "no discount" or a full
/// discount during evaluation instead of failing validation, since a bad
/// promotion must never break the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRule {
    pub id: PriceRuleId,
    pub name: String,
    pub kind: PriceRuleKind,
    pub scope: RuleScope,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl PriceRule {
    /// Whether the rule applies at `at`: the active flag must be set and the
    /// instant must fall inside the validity window. A missing bound leaves
    /// that side open; the end instant itself is already outside.
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.active
            && self.starts_at.is_none_or(|start| at >= start)
            && self.ends_at.is_none_or(|end| at < end)
    }
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceRuleKind {
    /// Percent off the line subtotal once the quantity reaches the
    /// threshold.
    #[serde(rename_all = "camelCase")]
    VolumeDiscount { min_quantity: u32, percent_off: u8 },
    /// Per full group of `buy + free` units on a line, `free` units are
    /// free. Classic buy-one-get-one when both are 1.
    #[serde(rename_all = "camelCase")]
    BuyXGetY { buy_quantity: u32, free_quantity: u32 },
    /// Percent off lines that belong to an assembled bundle.
    #[serde(rename_all = "camelCase")]
    BundleDiscount { percent_off: u8 },
}

/// Which lines a rule may touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleScope {
    AllProducts,
    #[serde(rename_all = "camelCase")]
    Products { product_ids: Vec<ProductId> },
    #[serde(rename_all = "camelCase")]
    Collections { collection_ids: Vec<CollectionId> },
}

impl RuleScope {
    pub fn matches(&self, line: &LineItem) -> bool {
        match self {
            RuleScope::AllProducts => true,
            RuleScope::Products { product_ids } => product_ids.contains(&line.product_id),
            RuleScope::Collections { collection_ids } => line
                .collection_ids
                .iter()
                .any(|id| collection_ids.contains(id)),
        }
    }
}

/// Engine input describing one cart line, decoupled from the cart's own
/// line type so the engine can price anything (cart lines, bundle
/// previews, quick-buy widgets).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub collection_ids: Vec<CollectionId>,
    #[serde(default)]
    pub bundle_id: Option<BundleId>,
    /// Unit price in smallest currency unit.
    pub unit_price: u64,
    pub quantity: u32,
}

impl LineItem {
    pub fn subtotal(&self) -> u64 {
        self.unit_price.saturating_mul(self.quantity as u64)
    }
}
