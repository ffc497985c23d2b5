use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitrina_core::{PriceRuleId, percent_of};

use crate::rule::{LineItem, PriceRule, PriceRuleKind};

/// The single discount applied to one line, with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDiscount {
    pub rule_id: PriceRuleId,
    /// Discount amount in smallest currency unit, never above the line
    /// subtotal.
    pub amount: u64,
}

/// Result of one pricing pass over a set of lines.
///
/// `line_discounts` is parallel to the input lines; `None` means no rule
/// touched that line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    pub line_discounts: Vec<Option<LineDiscount>>,
    pub discount_total: u64,
}

/// Evaluate all rules against all lines at the given instant.
///
/// Per line, every active, in-window, in-scope rule is priced and only the
/// single best discount is kept (largest amount; ties go to the earliest
/// rule in input order). Rules never stack on one line.
pub fn apply_rules(lines: &[LineItem], rules: &[PriceRule], at: DateTime<Utc>) -> PricingBreakdown {
    let mut line_discounts = Vec::with_capacity(lines.len());
    let mut discount_total = 0u64;
    for line in lines {
        let best = best_discount(line, rules, at);
        if let Some(discount) = &best {
            discount_total = discount_total.saturating_add(discount.amount);
        }
        line_discounts.push(best);
    }
    PricingBreakdown {
        line_discounts,
        discount_total,
    }
}

fn best_discount(line: &LineItem, rules: &[PriceRule], at: DateTime<Utc>) -> Option<LineDiscount> {
    if line.quantity == 0 {
        return None;
    }
    let subtotal = line.subtotal();
    let mut best: Option<LineDiscount> = None;
    for rule in rules {
        if !rule.is_active_at(at) || !rule.scope.matches(line) {
            continue;
        }
        let amount = discount_amount(&rule.kind, line, subtotal).min(subtotal);
        if amount == 0 {
            continue;
        }
        // Strict comparison keeps the earliest rule on equal amounts.
        if best.as_ref().is_none_or(|current| amount > current.amount) {
            best = Some(LineDiscount {
                rule_id: rule.id,
                amount,
            });
        }
    }
    best
}

fn discount_amount(kind: &PriceRuleKind, line: &LineItem, subtotal: u64) -> u64 {
    match *kind {
        PriceRuleKind::VolumeDiscount {
            min_quantity,
            percent_off,
        } => {
            if line.quantity >= min_quantity {
                percent_of(subtotal, percent_off)
            } else {
                0
            }
        }
        PriceRuleKind::BuyXGetY {
            buy_quantity,
            free_quantity,
        } => {
            if buy_quantity == 0 || free_quantity == 0 {
                return 0;
            }
            let group = buy_quantity as u64 + free_quantity as u64;
            let free_units = (line.quantity as u64 / group) * free_quantity as u64;
            free_units.saturating_mul(line.unit_price)
        }
        PriceRuleKind::BundleDiscount { percent_off } => {
            if line.bundle_id.is_some() {
                percent_of(subtotal, percent_off)
            } else {
                0
            }
        }
    }
}
