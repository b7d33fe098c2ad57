//! Price arithmetic
//!
//! Display prices include IVA; net and tax are derived backwards from them.
//! CLP has no minor unit, so every rounded amount is a whole peso and halves
//! round up.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_IVA_PERCENT;

/// Net/tax split of a tax-inclusive price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub price_display: Decimal,
    pub price_net: Decimal,
    pub iva_amount: Decimal,
}

/// Round to a whole currency unit, halves toward positive infinity
#[inline]
pub fn round_amount(value: Decimal) -> Decimal {
    (value + dec!(0.5)).floor()
}

/// Split a display price into net price and IVA
///
/// `price_net = round(display / (1 + iva/100))` and the IVA is whatever is
/// left, so both parts always add back to the display price.
pub fn price_breakdown(price_display: Decimal, iva_percent: Decimal) -> PriceBreakdown {
    let divisor = Decimal::ONE + iva_percent / dec!(100);
    let price_net = price_display
        .checked_div(divisor)
        .map(round_amount)
        .unwrap_or(price_display);

    PriceBreakdown {
        price_display,
        price_net,
        iva_amount: price_display - price_net,
    }
}

/// [`price_breakdown`] at the default 19% IVA
pub fn price_breakdown_default(price_display: Decimal) -> PriceBreakdown {
    price_breakdown(price_display, DEFAULT_IVA_PERCENT)
}

/// Apply a percentage discount; percentages outside `[0, 100]` are ignored
pub fn apply_discount(subtotal: Decimal, percent: Decimal) -> Decimal {
    if percent < Decimal::ZERO || percent > dec!(100) {
        return subtotal;
    }
    subtotal - round_amount(subtotal * percent / dec!(100))
}

/// Suggested deposit for a total, percentage clamped to `[0, 100]`
pub fn deposit_for(total: Decimal, percent: Decimal) -> Decimal {
    let percent = percent.max(Decimal::ZERO).min(dec!(100));
    round_amount(total * percent / dec!(100))
}

/// Nights between arrival and departure; zero or negative for invalid ranges
pub fn nights_between(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days()
}
