use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use vitrina_bundles::AssembledBundle;
use vitrina_catalog::{Product, Variant};
use vitrina_core::{BundleId, CollectionId, DomainError, DomainResult, ProductId, VariantId};
use vitrina_pricing::{LineDiscount, LineItem, PriceRule, apply_rules};

/// Refusals for the product-page hand-off. Expected outcomes of normal
/// clicking, surfaced as results and never as panics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddToCartError {
    /// The product declares variants and none is resolved yet.
    #[error("select all product options first")]
    SelectionIncomplete,
    /// The requested quantity is below one.
    #[error("quantity must be at least 1, got {quantity}")]
    InvalidQuantity { quantity: u32 },
    /// Malformed hand-off, e.g. a variant belonging to another product.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Validated product-page hand-off: one product, its resolved variant when
/// it has any, and a requested quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartAddition {
    product_id: ProductId,
    variant_id: Option<VariantId>,
    title: String,
    unit_price: u64,
    compare_at_price: Option<u64>,
    collection_ids: Vec<CollectionId>,
    image: Option<String>,
    quantity: u32,
}

impl CartAddition {
    /// Validate the hand-off contract: quantity at least one, a variant
    /// present exactly when the product declares variants, and the variant
    /// actually belonging to the product.
    pub fn new(
        product: &Product,
        variant: Option<&Variant>,
        quantity: u32,
    ) -> Result<Self, AddToCartError> {
        if quantity == 0 {
            return Err(AddToCartError::InvalidQuantity { quantity });
        }
        match variant {
            None if product.has_variants() => return Err(AddToCartError::SelectionIncomplete),
            Some(v) => {
                if !product.has_variants() {
                    return Err(DomainError::validation(format!(
                        "'{}' does not have variants",
                        product.title()
                    ))
                    .into());
                }
                if product.variant_by_id(v.id_typed()).is_none() {
                    return Err(DomainError::validation(format!(
                        "variant {} does not belong to '{}'",
                        v.id_typed(),
                        product.title()
                    ))
                    .into());
                }
            }
            None => {}
        }
        Ok(Self {
            product_id: product.id_typed(),
            variant_id: variant.map(Variant::id_typed),
            title: product.title().to_string(),
            unit_price: variant.map_or(product.price(), Variant::price),
            compare_at_price: variant
                .and_then(Variant::compare_at_price)
                .or(product.compare_at_price()),
            collection_ids: product.collection_ids().to_vec(),
            image: variant
                .and_then(|v| v.image().map(str::to_string))
                .or_else(|| product.images().first().cloned()),
            quantity,
        })
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn variant_id(&self) -> Option<VariantId> {
        self.variant_id
    }

    pub fn unit_price(&self) -> u64 {
        self.unit_price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// One cart row. Quantity is always at least one; a row vanishes through
/// [`Cart::remove_line`], never by reaching zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    product_id: ProductId,
    variant_id: Option<VariantId>,
    bundle_id: Option<BundleId>,
    title: String,
    unit_price: u64,
    compare_at_price: Option<u64>,
    quantity: u32,
    collection_ids: Vec<CollectionId>,
    image: Option<String>,
}

impl CartLine {
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn variant_id(&self) -> Option<VariantId> {
        self.variant_id
    }

    pub fn bundle_id(&self) -> Option<BundleId> {
        self.bundle_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn unit_price(&self) -> u64 {
        self.unit_price
    }

    pub fn compare_at_price(&self) -> Option<u64> {
        self.compare_at_price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn collection_ids(&self) -> &[CollectionId] {
        &self.collection_ids
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn subtotal(&self) -> u64 {
        self.unit_price.saturating_mul(self.quantity as u64)
    }

    /// Pricing-engine view of this line.
    fn pricing_line(&self) -> LineItem {
        LineItem {
            product_id: self.product_id,
            collection_ids: self.collection_ids.clone(),
            bundle_id: self.bundle_id,
            unit_price: self.unit_price,
            quantity: self.quantity,
        }
    }
}

/// Priced summary of the whole cart at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub subtotal: u64,
    /// Sum of "was" prices (compare-at where present, unit price
    /// otherwise), for the savings banner.
    pub compare_at_subtotal: u64,
    pub discount_total: u64,
    /// Parallel to the cart lines, like the pricing breakdown.
    pub line_discounts: Vec<Option<LineDiscount>>,
    pub total: u64,
}

/// The shopper's cart. Line order is insertion order and never reshuffles;
/// additions merge into an existing line only when product, variant, bundle
/// tag and unit price all agree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_units(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |units, line| units.saturating_add(line.quantity))
    }

    /// Take a validated product-page hand-off into the cart.
    pub fn add(&mut self, addition: CartAddition) {
        let CartAddition {
            product_id,
            variant_id,
            title,
            unit_price,
            compare_at_price,
            collection_ids,
            image,
            quantity,
        } = addition;
        self.merge_line(CartLine {
            product_id,
            variant_id,
            bundle_id: None,
            title,
            unit_price,
            compare_at_price,
            quantity,
            collection_ids,
            image,
        });
    }

    /// Expand a finished bundle into bundle-tagged lines, one unit per
    /// component. Non-sum pricing is distributed over the components in
    /// proportion to their catalog prices, with the rounding remainder on
    /// the last line so the line subtotals add up to the bundle price
    /// exactly.
    pub fn add_assembled_bundle(&mut self, bundle: &AssembledBundle) {
        let prices = distributed_prices(bundle);
        for (component, unit_price) in bundle.components.iter().zip(prices) {
            // The catalog price becomes the "was" price when distribution
            // lowered it.
            let compare_at_price = if unit_price < component.unit_price {
                Some(component.unit_price)
            } else {
                component.compare_at_price
            };
            self.merge_line(CartLine {
                product_id: component.product_id,
                variant_id: component.variant_id,
                bundle_id: Some(bundle.bundle_id),
                title: component.title.clone(),
                unit_price,
                compare_at_price,
                quantity: 1,
                collection_ids: component.collection_ids.clone(),
                image: component.image.clone(),
            });
        }
    }

    pub fn update_quantity(&mut self, index: usize, quantity: u32) -> DomainResult<()> {
        if quantity == 0 {
            return Err(DomainError::validation(
                "quantity must be at least 1; remove the line instead",
            ));
        }
        let line = self
            .lines
            .get_mut(index)
            .ok_or_else(|| DomainError::validation(format!("no cart line at index {index}")))?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn remove_line(&mut self, index: usize) -> DomainResult<()> {
        if index >= self.lines.len() {
            return Err(DomainError::validation(format!(
                "no cart line at index {index}"
            )));
        }
        self.lines.remove(index);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Price the cart for display at the given instant.
    pub fn totals(&self, rules: &[PriceRule], at: DateTime<Utc>) -> CartTotals {
        let items: Vec<LineItem> = self.lines.iter().map(CartLine::pricing_line).collect();
        let breakdown = apply_rules(&items, rules, at);
        let subtotal = items
            .iter()
            .fold(0u64, |sum, item| sum.saturating_add(item.subtotal()));
        let compare_at_subtotal = self.lines.iter().fold(0u64, |sum, line| {
            let was = line.compare_at_price.unwrap_or(line.unit_price);
            sum.saturating_add(was.saturating_mul(line.quantity as u64))
        });
        CartTotals {
            subtotal,
            compare_at_subtotal,
            discount_total: breakdown.discount_total,
            line_discounts: breakdown.line_discounts,
            total: subtotal.saturating_sub(breakdown.discount_total),
        }
    }

    fn merge_line(&mut self, line: CartLine) {
        let existing = self.lines.iter_mut().find(|l| {
            l.product_id == line.product_id
                && l.variant_id == line.variant_id
                && l.bundle_id == line.bundle_id
                && l.unit_price == line.unit_price
        });
        match existing {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(line.quantity);
            }
            None => self.lines.push(line),
        }
    }
}

/// Per-component unit prices that sum to the bundle price exactly.
///
/// Every component but the last gets its proportional floor share of the
/// bundle price; the last takes whatever remains. Under sum-of-components
/// pricing the shares equal the catalog prices and nothing shifts.
fn distributed_prices(bundle: &AssembledBundle) -> Vec<u64> {
    let total = bundle.total_price();
    let component_sum = bundle.compare_at_total;
    let count = bundle.components.len();
    let mut prices = Vec::with_capacity(count);
    let mut allocated = 0u64;
    for (i, component) in bundle.components.iter().enumerate() {
        if i + 1 == count {
            prices.push(total.saturating_sub(allocated));
        } else if component_sum == 0 {
            prices.push(0);
        } else {
            let share =
                ((total as u128 * component.unit_price as u128) / component_sum as u128) as u64;
            allocated = allocated.saturating_add(share);
            prices.push(share);
        }
    }
    prices
}
