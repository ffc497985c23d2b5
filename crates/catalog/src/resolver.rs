use serde::{Deserialize, Serialize};

use crate::product::{Product, Variant};
use crate::selection::Selection;

/// Whether choosing `value` on `axis_name` can still lead to a purchasable
/// variant, given what is already selected on the other axes.
///
/// A variant witnesses availability when it carries `value` on the axis,
/// agrees with every other selected value on axes the product declares, and
/// is itself available. Selection entries for axes the product does not
/// declare are ignored.
///
/// Products that do not track inventory skip the witness search entirely:
/// every value that appears on any variant counts as available, regardless
/// of the rest of the selection.
pub fn option_value_available(
    product: &Product,
    selection: &Selection,
    axis_name: &str,
    value: &str,
) -> bool {
    if !product.track_inventory() {
        return product
            .variants()
            .iter()
            .any(|variant| variant.option_value(axis_name) == Some(value));
    }
    product.variants().iter().any(|variant| {
        variant.option_value(axis_name) == Some(value)
            && selection.iter().all(|(axis, selected)| {
                axis == axis_name
                    || product.axis(axis).is_none()
                    || variant.option_value(axis) == Some(selected)
            })
            && product.variant_available(variant)
    })
}

/// Whether the selection covers every axis the product declares.
///
/// Entries for undeclared axes neither help nor hurt. A product without
/// axes is trivially complete.
pub fn selection_complete(product: &Product, selection: &Selection) -> bool {
    product
        .options()
        .iter()
        .all(|axis| selection.contains_axis(&axis.name))
}

/// The variant the selection resolves to, or `None` while the selection is
/// incomplete.
///
/// Resolution only happens on a complete selection; partial selections never
/// match, even when a single variant would already be unambiguous. When two
/// variants carry the same combination, the first declared one wins.
pub fn matching_variant<'a>(product: &'a Product, selection: &Selection) -> Option<&'a Variant> {
    if !product.has_variants() || !selection_complete(product, selection) {
        return None;
    }
    product.variants().iter().find(|variant| {
        product
            .options()
            .iter()
            .all(|axis| variant.option_value(&axis.name) == selection.get(&axis.name))
    })
}

/// Tunable part of [`default_selection`]: merchandising tokens that break
/// ties when several values of one axis are available.
///
/// Tokens are tried in order against the available values, comparing
/// normalized forms (lowercased, whitespace removed, the unit suffix "cm"
/// removed). The first token matching at least one value decides the axis:
/// a single match is picked, several matches leave the axis unselected. A
/// token matching nothing is skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultSelectionPolicy {
    preferred_tokens: Vec<String>,
}

impl DefaultSelectionPolicy {
    /// Policy without preferences: only forced values get preselected.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preferring<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            preferred_tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.preferred_tokens.push(token.into());
        self
    }

    pub fn preferred_tokens(&self) -> &[String] {
        &self.preferred_tokens
    }

    fn preferred_value<'a>(&self, values: &[&'a str]) -> Option<&'a str> {
        for token in &self.preferred_tokens {
            let token = normalize(token);
            let mut matches = values
                .iter()
                .copied()
                .filter(|value| normalize(value).contains(&token));
            match (matches.next(), matches.next()) {
                (Some(only), None) => return Some(only),
                (Some(_), Some(_)) => return None,
                (None, _) => {}
            }
        }
        None
    }
}

fn normalize(value: &str) -> String {
    let lowered = value.to_lowercase();
    let compact: String = lowered.chars().filter(|c| !c.is_whitespace()).collect();
    compact.replace("cm", "")
}

/// Compute the selection a freshly opened product page starts with.
///
/// Each axis is preselected only when the choice is forced (exactly one
/// available value) or when the policy singles one value out. Axes with
/// several equally valid values stay unselected so the shopper decides.
///
/// Picking a value on one axis narrows what is available on the others, so
/// the scan repeats until a pass settles nothing. Every productive pass
/// settles at least one axis, which bounds the loop by the axis count.
pub fn default_selection(product: &Product, policy: &DefaultSelectionPolicy) -> Selection {
    let mut selection = Selection::new();
    if !product.has_variants() {
        return selection;
    }
    let max_passes = product.options().len() + 1;
    for _ in 0..max_passes {
        let mut changed = false;
        for axis in product.options() {
            if selection.contains_axis(&axis.name) {
                continue;
            }
            let available: Vec<&str> = axis
                .values
                .iter()
                .map(String::as_str)
                .filter(|value| option_value_available(product, &selection, &axis.name, value))
                .collect();
            let pick = match available.as_slice() {
                [] => None,
                [only] => Some(*only),
                _ => policy.preferred_value(&available),
            };
            if let Some(value) = pick {
                selection.set(axis.name.as_str(), value);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    selection
}
