//! Integer money math.
//!
//! All prices in the storefront are `u64` amounts in the smallest currency
//! unit (e.g. cents). Percentages round half-up to the nearest integer;
//! intermediate math widens to `u128` so no realistic price can overflow.

/// Integer discount percentage of `price` against `compare_at`.
///
/// Defined only when `compare_at > price`; returns `None` otherwise
/// (including when both are zero). Rounds half-up, so 800 against 1000
/// is `Some(20)` and 875 against 1000 is `Some(13)`.
pub fn discount_percentage(price: u64, compare_at: u64) -> Option<u8> {
    if compare_at <= price {
        return None;
    }
    let diff = (compare_at - price) as u128;
    let compare = compare_at as u128;
    // round_half_up(diff * 100 / compare) without floats.
    let pct = (diff * 200 + compare) / (compare * 2);
    Some(pct as u8)
}

/// `percent` of `amount`, rounded half-up.
///
/// `percent` is clamped to 100; the result never exceeds `amount`.
pub fn percent_of(amount: u64, percent: u8) -> u64 {
    if percent >= 100 {
        return amount;
    }
    let scaled = (amount as u128) * (percent as u128);
    ((scaled * 2 + 100) / 200) as u64
}
