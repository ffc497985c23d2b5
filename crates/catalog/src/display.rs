use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use vitrina_core::discount_percentage;

use crate::product::{Product, Variant};
use crate::resolver::matching_variant;
use crate::selection::Selection;

/// Everything the product page renders for one product and selection state.
///
/// Plain data: the presentation layer reads it, nothing writes it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    /// Effective price in smallest currency unit. A "starting at" minimum
    /// across variants while the selection is incomplete.
    pub price: u64,
    pub compare_at_price: Option<u64>,
    /// Whole-percent markdown, present only when the compare-at price is
    /// strictly above the effective price.
    pub discount_percentage: Option<u8>,
    pub in_stock: bool,
    /// Gallery in render order, variant imagery first.
    pub images: Vec<String>,
    /// Single cover image, when any image exists at all.
    pub cover_image: Option<String>,
}

/// Derive the display record for the current selection.
///
/// Price resolution: the matched variant's price; otherwise the minimum
/// across all variants while variants exist but nothing matches; otherwise
/// the base product price. The compare-at price prefers the matched
/// variant's, falling back to the product's.
///
/// Stock resolution: a matched variant answers for itself; an incomplete
/// selection is in stock while any variant is; a product without variants
/// follows its own inventory fields.
pub fn display_state(product: &Product, selection: &Selection) -> DisplayState {
    let variant = matching_variant(product, selection);

    let price = match variant {
        Some(v) => v.price(),
        None if product.has_variants() => product.min_variant_price().unwrap_or(product.price()),
        None => product.price(),
    };

    let compare_at_price = variant
        .and_then(Variant::compare_at_price)
        .or(product.compare_at_price());

    let in_stock = match variant {
        Some(v) => product.variant_available(v),
        None if product.has_variants() => product.any_variant_available(),
        None => product.base_in_stock(),
    };

    let images = merged_images(product, variant);

    let cover_image = variant
        .and_then(|v| v.image().map(str::to_string))
        .or_else(|| images.first().cloned());

    DisplayState {
        price,
        compare_at_price,
        discount_percentage: compare_at_price
            .and_then(|compare| discount_percentage(price, compare)),
        in_stock,
        images,
        cover_image,
    }
}

/// Gallery for the current state.
///
/// When the matched variant brings its own `image_urls`, those lead and the
/// product gallery contributes only its general images: anything appearing
/// in any variant's `image_urls` is treated as variant-specific and left
/// out. Without a matched variant (or when it has no urls), the product
/// gallery is shown untouched. Exact string comparison, first occurrence
/// wins.
fn merged_images(product: &Product, variant: Option<&Variant>) -> Vec<String> {
    let variant_urls = variant.map(Variant::image_urls).unwrap_or(&[]);
    if variant_urls.is_empty() {
        return product.images().to_vec();
    }

    let variant_pool: HashSet<&str> = product
        .variants()
        .iter()
        .flat_map(|v| v.image_urls())
        .map(String::as_str)
        .collect();

    let mut images = Vec::new();
    let mut seen = HashSet::new();
    for url in variant_urls {
        if seen.insert(url.as_str()) {
            images.push(url.clone());
        }
    }
    for url in product.images() {
        if !variant_pool.contains(url.as_str()) && seen.insert(url.as_str()) {
            images.push(url.clone());
        }
    }
    images
}
