use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use vitrina_core::{CollectionId, DomainError, DomainResult, Entity, ProductId, VariantId};

/// URL key of a product page.
///
/// Never constructed from raw input without validation: empty and
/// whitespace-bearing keys are rejected at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    pub fn new(raw: impl Into<String>) -> DomainResult<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("slug cannot be empty"));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("slug cannot contain whitespace"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Slug {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// One option axis a product declares (e.g. "Tamaño"), with its declared
/// values in display order. Not every declared value is necessarily
/// purchasable; availability is resolved against the variant list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionAxis {
    pub name: String,
    pub values: Vec<String>,
}

/// A concrete purchasable configuration of a product.
///
/// Carries one option value per declared axis plus its own pricing,
/// imagery, and inventory data. Constructed only through
/// [`Product::from_record`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    id: VariantId,
    option_values: BTreeMap<String, String>,
    price: u64,
    compare_at_price: Option<u64>,
    image: Option<String>,
    image_urls: Vec<String>,
    inventory_quantity: Option<i64>,
    track_inventory: Option<bool>,
}

impl Variant {
    pub fn id_typed(&self) -> VariantId {
        self.id
    }

    /// The variant's value on the given axis, if it declares one.
    pub fn option_value(&self, axis_name: &str) -> Option<&str> {
        self.option_values.get(axis_name).map(String::as_str)
    }

    pub fn option_values(&self) -> &BTreeMap<String, String> {
        &self.option_values
    }

    /// Price in smallest currency unit (e.g., cents).
    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn compare_at_price(&self) -> Option<u64> {
        self.compare_at_price
    }

    /// Variant-specific cover image, when the row declares one.
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Variant-specific gallery, in declared order.
    pub fn image_urls(&self) -> &[String] {
        &self.image_urls
    }

    pub fn inventory_quantity(&self) -> Option<i64> {
        self.inventory_quantity
    }

    /// Availability given the product-level tracking default.
    ///
    /// Available when tracking is off, when the quantity is unknown, or when
    /// the quantity is positive.
    pub fn is_available(&self, product_tracks_inventory: bool) -> bool {
        let tracked = self.track_inventory.unwrap_or(product_tracks_inventory);
        !tracked || self.inventory_quantity.is_none_or(|q| q > 0)
    }
}

impl Entity for Variant {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A product-with-variants snapshot, validated once at the data boundary.
///
/// Invariant: when `variants` is non-empty, `options` is non-empty and every
/// variant carries exactly one declared value per declared axis. The
/// resolver relies on this and never re-validates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    id: ProductId,
    slug: Slug,
    title: String,
    price: u64,
    compare_at_price: Option<u64>,
    images: Vec<String>,
    options: Vec<OptionAxis>,
    variants: Vec<Variant>,
    inventory_quantity: Option<i64>,
    track_inventory: bool,
    collection_ids: Vec<CollectionId>,
}

impl Product {
    /// Validate a raw backend row into a well-formed product snapshot.
    ///
    /// Malformed rows (variants without option axes, missing or undeclared
    /// axis values, duplicate axis names or values) are rejected here so the
    /// resolver operations stay total.
    pub fn from_record(record: ProductRecord) -> DomainResult<Self> {
        let slug = Slug::new(record.slug)?;

        if record.title.trim().is_empty() {
            return Err(DomainError::validation("title cannot be empty"));
        }

        if !record.variants.is_empty() && record.options.is_empty() {
            return Err(DomainError::invariant(
                "variants declared without option axes",
            ));
        }

        validate_axes(&record.options, !record.variants.is_empty())?;

        let variants = record
            .variants
            .into_iter()
            .map(|v| validate_variant(v, &record.options))
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(Self {
            id: record.id,
            slug,
            title: record.title,
            price: record.price,
            compare_at_price: record.compare_at_price,
            images: record.images,
            options: record.options,
            variants,
            inventory_quantity: record.inventory_quantity,
            track_inventory: record.track_inventory,
            collection_ids: record.collection_ids,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn slug(&self) -> &Slug {
        &self.slug
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Base price in smallest currency unit; applies when no variants exist.
    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn compare_at_price(&self) -> Option<u64> {
        self.compare_at_price
    }

    /// Product-level gallery, in declared order.
    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// Declared option axes, in declaration order.
    pub fn options(&self) -> &[OptionAxis] {
        &self.options
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    pub fn inventory_quantity(&self) -> Option<i64> {
        self.inventory_quantity
    }

    pub fn track_inventory(&self) -> bool {
        self.track_inventory
    }

    pub fn collection_ids(&self) -> &[CollectionId] {
        &self.collection_ids
    }

    pub fn axis(&self, name: &str) -> Option<&OptionAxis> {
        self.options.iter().find(|axis| axis.name == name)
    }

    pub fn variant_by_id(&self, id: VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == id)
    }

    /// Availability of one of this product's variants, applying the
    /// product-level tracking default.
    pub fn variant_available(&self, variant: &Variant) -> bool {
        variant.is_available(self.track_inventory)
    }

    pub fn any_variant_available(&self) -> bool {
        self.variants.iter().any(|v| self.variant_available(v))
    }

    /// Minimum price across all variants (the "starting at" price).
    pub fn min_variant_price(&self) -> Option<u64> {
        self.variants.iter().map(Variant::price).min()
    }

    /// Stock rule for products without variants: in stock when tracking is
    /// off, the quantity is unknown, or the quantity is positive.
    pub fn base_in_stock(&self) -> bool {
        !self.track_inventory || self.inventory_quantity.is_none_or(|q| q > 0)
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn validate_axes(options: &[OptionAxis], has_variants: bool) -> DomainResult<()> {
    for (i, axis) in options.iter().enumerate() {
        if axis.name.trim().is_empty() {
            return Err(DomainError::validation("option axis name cannot be empty"));
        }
        if options[..i].iter().any(|other| other.name == axis.name) {
            return Err(DomainError::validation(format!(
                "duplicate option axis '{}'",
                axis.name
            )));
        }
        if has_variants && axis.values.is_empty() {
            return Err(DomainError::validation(format!(
                "option axis '{}' declares no values",
                axis.name
            )));
        }
        for (j, value) in axis.values.iter().enumerate() {
            if axis.values[..j].contains(value) {
                return Err(DomainError::validation(format!(
                    "duplicate value '{}' on axis '{}'",
                    value, axis.name
                )));
            }
        }
    }
    Ok(())
}

fn validate_variant(record: VariantRecord, options: &[OptionAxis]) -> DomainResult<Variant> {
    for axis in options {
        match record.option_values.get(&axis.name) {
            None => {
                return Err(DomainError::validation(format!(
                    "variant {} missing a value for axis '{}'",
                    record.id, axis.name
                )));
            }
            Some(value) if !axis.values.contains(value) => {
                return Err(DomainError::validation(format!(
                    "variant {} value '{}' is not declared on axis '{}'",
                    record.id, value, axis.name
                )));
            }
            Some(_) => {}
        }
    }
    for key in record.option_values.keys() {
        if !options.iter().any(|axis| axis.name == *key) {
            return Err(DomainError::validation(format!(
                "variant {} carries undeclared axis '{}'",
                record.id, key
            )));
        }
    }
    Ok(Variant {
        id: record.id,
        option_values: record.option_values,
        price: record.price,
        compare_at_price: record.compare_at_price,
        image: record.image,
        image_urls: record.image_urls,
        inventory_quantity: record.inventory_quantity,
        track_inventory: record.track_inventory,
    })
}

/// Raw product row as served by the hosted backend (camelCase JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: ProductId,
    pub slug: String,
    pub title: String,
    pub price: u64,
    #[serde(default)]
    pub compare_at_price: Option<u64>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub options: Vec<OptionAxis>,
    #[serde(default)]
    pub variants: Vec<VariantRecord>,
    #[serde(default)]
    pub inventory_quantity: Option<i64>,
    #[serde(default = "default_track_inventory")]
    pub track_inventory: bool,
    #[serde(default)]
    pub collection_ids: Vec<CollectionId>,
}

/// Raw variant row as served by the hosted backend (camelCase JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantRecord {
    pub id: VariantId,
    #[serde(default)]
    pub option_values: BTreeMap<String, String>,
    pub price: u64,
    #[serde(default)]
    pub compare_at_price: Option<u64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub inventory_quantity: Option<i64>,
    #[serde(default)]
    pub track_inventory: Option<bool>,
}

fn default_track_inventory() -> bool {
    true
}
