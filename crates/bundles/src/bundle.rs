use serde::{Deserialize, Serialize};

use vitrina_catalog::{Product, Variant};
use vitrina_core::{BundleId, CollectionId, Entity, ProductId, VariantId, percent_of};

/// A bundle offer row as configured in the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub id: BundleId,
    pub title: String,
    pub kind: BundleKind,
    #[serde(default)]
    pub pricing: BundlePricing,
}

impl Entity for Bundle {
    type Id = BundleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BundleKind {
    /// Preset product/variant pairs, no customer choice.
    #[serde(rename_all = "camelCase")]
    FixedItems { items: Vec<BundleItem> },
    /// Every product of the collection, as offered at assembly time.
    #[serde(rename_all = "camelCase")]
    CollectionFixed { collection_id: CollectionId },
    /// The customer picks exactly `pick_quantity` items from the collection.
    #[serde(rename_all = "camelCase")]
    MixAndMatch {
        collection_id: CollectionId,
        pick_quantity: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
}

/// How an assembled bundle is priced. The compare-at shown next to it is
/// always the plain component sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BundlePricing {
    #[default]
    SumOfComponents,
    #[serde(rename_all = "camelCase")]
    FixedPrice { amount: u64 },
    /// Percent off the component sum.
    #[serde(rename_all = "camelCase")]
    PercentOff { percent: u8 },
}

/// One resolved member of a bundle, snapshotted from the catalog at pick
/// time so later catalog refreshes cannot shift an assembled offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleComponent {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub title: String,
    /// Unit price in smallest currency unit.
    pub unit_price: u64,
    pub compare_at_price: Option<u64>,
    pub collection_ids: Vec<CollectionId>,
    pub image: Option<String>,
}

impl BundleComponent {
    /// Snapshot a pick. The caller has already validated that `variant`
    /// belongs to `product` and is present exactly when the product
    /// declares variants.
    pub fn from_pick(product: &Product, variant: Option<&Variant>) -> Self {
        Self {
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
        }
    }
}

/// The cart hand-off: a finished bundle with every component resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembledBundle {
    pub bundle_id: BundleId,
    pub pricing: BundlePricing,
    /// Sum of component unit prices.
    pub compare_at_total: u64,
    pub components: Vec<BundleComponent>,
}

impl AssembledBundle {
    /// The price the customer pays for the whole bundle.
    pub fn total_price(&self) -> u64 {
        match self.pricing {
            BundlePricing::SumOfComponents => self.compare_at_total,
            BundlePricing::FixedPrice { amount } => amount,
            BundlePricing::PercentOff { percent } => self
                .compare_at_total
                .saturating_sub(percent_of(self.compare_at_total, percent)),
        }
    }
}
