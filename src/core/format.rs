//! Display formatting for prices

use crate::core::plan::Currency;
use rust_decimal::{Decimal, RoundingStrategy};

/// Renders `"<symbol> <amount>"` with two decimals and the currency's decimal
/// separator, e.g. `R$ 19,90` or `$ 9.99`. No grouping separator is used.
pub fn format_price(amount: Decimal, currency: Currency) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let digits = format!("{rounded:.2}");
    let digits = match currency.decimal_separator() {
        '.' => digits,
        sep => digits.replace('.', &sep.to_string()),
    };
    format!("{} {}", currency.symbol(), digits)
}
