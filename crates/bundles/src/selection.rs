use thiserror::Error;

use vitrina_catalog::{Product, Variant};
use vitrina_core::{BundleId, CollectionId, DomainError, DomainResult};

use crate::bundle::{AssembledBundle, Bundle, BundleComponent, BundleItem, BundleKind, BundlePricing};

/// Where the shopper stands in filling a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleState {
    Choosing { remaining: u32 },
    Complete,
}

/// Assembly refusal for a bundle that still needs picks. A normal outcome
/// of clicking too early, not a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AssembleError {
    #[error("bundle still needs {remaining} pick(s)")]
    PicksOutstanding { remaining: u32 },
}

/// Walks one shopper through filling a bundle offer.
///
/// Fixed kinds resolve their whole component set up front and start
/// complete; mix-and-match starts with `pick_quantity` open slots and
/// validates each pick against the catalog snapshot it is given. Components
/// are snapshotted at pick time, so a later catalog refresh does not shift
/// a selection already made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSelection {
    bundle_id: BundleId,
    pricing: BundlePricing,
    /// Collection picks must come from; `None` for fixed kinds, which take
    /// no picks at all.
    pick_collection: Option<CollectionId>,
    remaining: u32,
    components: Vec<BundleComponent>,
}

impl BundleSelection {
    /// Open the offer against the catalog products the storefront has on
    /// hand. Fixed kinds resolve every component here and come back already
    /// complete.
    pub fn begin(bundle: &Bundle, catalog: &[Product]) -> DomainResult<Self> {
        match &bundle.kind {
            BundleKind::FixedItems { items } => {
                if items.is_empty() {
                    return Err(DomainError::validation("fixed bundle declares no items"));
                }
                let components = items
                    .iter()
                    .map(|item| resolve_fixed_item(item, catalog))
                    .collect::<DomainResult<Vec<_>>>()?;
                Ok(Self {
                    bundle_id: bundle.id,
                    pricing: bundle.pricing,
                    pick_collection: None,
                    remaining: 0,
                    components,
                })
            }
            BundleKind::CollectionFixed { collection_id } => {
                let members: Vec<&Product> = catalog
                    .iter()
                    .filter(|p| p.collection_ids().contains(collection_id))
                    .collect();
                if members.is_empty() {
                    return Err(DomainError::validation(
                        "bundle collection has no products",
                    ));
                }
                let components = members
                    .into_iter()
                    .map(collection_component)
                    .collect::<DomainResult<Vec<_>>>()?;
                Ok(Self {
                    bundle_id: bundle.id,
                    pricing: bundle.pricing,
                    pick_collection: None,
                    remaining: 0,
                    components,
                })
            }
            BundleKind::MixAndMatch {
                collection_id,
                pick_quantity,
            } => {
                if *pick_quantity == 0 {
                    return Err(DomainError::validation(
                        "mix-and-match bundle must ask for at least one pick",
                    ));
                }
                Ok(Self {
                    bundle_id: bundle.id,
                    pricing: bundle.pricing,
                    pick_collection: Some(*collection_id),
                    remaining: *pick_quantity,
                    components: Vec::new(),
                })
            }
        }
    }

    pub fn bundle_id(&self) -> BundleId {
        self.bundle_id
    }

    pub fn pricing(&self) -> BundlePricing {
        self.pricing
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn components(&self) -> &[BundleComponent] {
        &self.components
    }

    pub fn state(&self) -> BundleState {
        if self.remaining == 0 {
            BundleState::Complete
        } else {
            BundleState::Choosing {
                remaining: self.remaining,
            }
        }
    }

    /// Add one pick. The same product or variant may be picked repeatedly;
    /// each pick fills one slot.
    pub fn add_pick(&mut self, product: &Product, variant: Option<&Variant>) -> DomainResult<()> {
        if self.remaining == 0 {
            return Err(DomainError::conflict("bundle selection is already complete"));
        }
        let collection = match self.pick_collection {
            Some(collection) => collection,
            // Unreachable in practice: fixed kinds always have remaining 0.
            None => return Err(DomainError::conflict("bundle does not take picks")),
        };
        if !product.collection_ids().contains(&collection) {
            return Err(DomainError::validation(format!(
                "'{}' is not part of the bundle collection",
                product.title()
            )));
        }
        let variant = validate_pick_variant(product, variant)?;
        let available = match variant {
            Some(v) => product.variant_available(v),
            None => product.base_in_stock(),
        };
        if !available {
            return Err(DomainError::validation(format!(
                "'{}' is not available right now",
                product.title()
            )));
        }
        self.components.push(BundleComponent::from_pick(product, variant));
        self.remaining -= 1;
        Ok(())
    }

    /// Drop the pick at `index`, reopening one slot.
    pub fn remove_pick(&mut self, index: usize) -> DomainResult<()> {
        if self.pick_collection.is_none() {
            return Err(DomainError::conflict("fixed bundle contents cannot be edited"));
        }
        if index >= self.components.len() {
            return Err(DomainError::validation(format!("no pick at index {index}")));
        }
        self.components.remove(index);
        self.remaining += 1;
        Ok(())
    }

    /// Finish the bundle. Refused while picks are outstanding.
    pub fn assemble(&self) -> Result<AssembledBundle, AssembleError> {
        if self.remaining > 0 {
            return Err(AssembleError::PicksOutstanding {
                remaining: self.remaining,
            });
        }
        let compare_at_total = self
            .components
            .iter()
            .fold(0u64, |sum, c| sum.saturating_add(c.unit_price));
        Ok(AssembledBundle {
            bundle_id: self.bundle_id,
            pricing: self.pricing,
            compare_at_total,
            components: self.components.clone(),
        })
    }
}

fn resolve_fixed_item(item: &BundleItem, catalog: &[Product]) -> DomainResult<BundleComponent> {
    let product = catalog
        .iter()
        .find(|p| p.id_typed() == item.product_id)
        .ok_or_else(|| {
            DomainError::not_found(format!("bundle item product {}", item.product_id))
        })?;
    let variant = match item.variant_id {
        Some(variant_id) => Some(product.variant_by_id(variant_id).ok_or_else(|| {
            DomainError::validation(format!(
                "variant {variant_id} does not belong to '{}'",
                product.title()
            ))
        })?),
        None => None,
    };
    if product.has_variants() && variant.is_none() {
        return Err(DomainError::validation(format!(
            "bundle item '{}' needs a variant choice",
            product.title()
        )));
    }
    Ok(BundleComponent::from_pick(product, variant))
}

/// Collection-fixed members resolve without customer input: simple products
/// as themselves, configurable ones through their first available variant.
fn collection_component(product: &Product) -> DomainResult<BundleComponent> {
    if !product.has_variants() {
        return Ok(BundleComponent::from_pick(product, None));
    }
    let variant = product
        .variants()
        .iter()
        .find(|v| product.variant_available(v))
        .ok_or_else(|| {
            DomainError::validation(format!(
                "bundle member '{}' has no available variant",
                product.title()
            ))
        })?;
    Ok(BundleComponent::from_pick(product, Some(variant)))
}

fn validate_pick_variant<'a>(
    product: &'a Product,
    variant: Option<&'a Variant>,
) -> DomainResult<Option<&'a Variant>> {
    match variant {
        Some(v) => {
            if !product.has_variants() {
                return Err(DomainError::validation(format!(
                    "'{}' does not have variants",
                    product.title()
                )));
            }
            if product.variant_by_id(v.id_typed()).is_none() {
                return Err(DomainError::validation(format!(
                    "variant {} does not belong to '{}'",
                    v.id_typed(),
                    product.title()
                )));
            }
            Ok(Some(v))
        }
        None => {
            if product.has_variants() {
                return Err(DomainError::validation(format!(
                    "'{}' needs a variant choice",
                    product.title()
                )));
            }
            Ok(None)
        }
    }
}
