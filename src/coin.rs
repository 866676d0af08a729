//! Coin math and formatting.
//!
//! Prices on the wire are whole copper. Strategy costs divide by recipe
//! output counts, so internally everything is a [`Decimal`] and only the
//! display layer rounds.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// A coin amount in copper, possibly fractional.
pub type Coin = Decimal;

pub const COPPER_PER_SILVER: i64 = 100;
pub const COPPER_PER_GOLD: i64 = 10_000;

/// Net fraction a seller receives after the 5% listing and 10% delivery fees.
pub const SALE_NET: Decimal = Decimal::from_parts(85, 0, 0, false, 2); // 0.85

/// Convert a wire price (whole copper) into a [`Coin`].
pub fn coin(copper: i64) -> Coin {
    Decimal::from(copper)
}

/// Lowest price the trading post accepts for a listing:
/// `ceil(vendor_value / 0.85)`.
pub fn min_sale_price(vendor_value: i64) -> Coin {
    (Decimal::from(vendor_value) / SALE_NET).ceil()
}

/// Coin the seller actually receives for a sale at `price`.
pub fn net_sale(price: Coin) -> Coin {
    (price * SALE_NET).floor()
}

/// Render a coin amount as `12g 34s 56c`, rounding to whole copper.
///
/// Sub-gold amounts drop the leading units (`34s 56c`, `56c`).
pub fn format_coin(amount: Coin) -> String {
    let total = amount.round().to_i64().unwrap_or(0);
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();

    let gold = total / COPPER_PER_GOLD;
    let silver = (total % COPPER_PER_GOLD) / COPPER_PER_SILVER;
    let copper = total % COPPER_PER_SILVER;

    if gold > 0 {
        format!("{sign}{gold}g {silver:02}s {copper:02}c")
    } else if silver > 0 {
        format!("{sign}{silver}s {copper:02}c")
    } else {
        format!("{sign}{copper}c")
    }
}

/// Render an optional cost; undefined costs show as `?`.
pub fn format_opt_coin(amount: Option<Coin>) -> String {
    match amount {
        Some(c) => format_coin(c),
        None => "?".into(),
    }
}
