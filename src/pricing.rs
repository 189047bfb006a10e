//! Line and invoice arithmetic on `rust_decimal`.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{AppError, AppResult};

/// Monetary amounts are kept to 2 decimal places, half-up.
const MONEY_DP: u32 = 2;
/// Quantities may be weights, so they keep 3 decimal places.
const QUANTITY_DP: u32 = 3;

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

pub fn require_positive(value: Decimal, field: &str) -> AppResult<()> {
    if value <= Decimal::ZERO {
        return Err(AppError::BadRequest(format!("{field} must be greater than 0")));
    }
    Ok(())
}

/// Validates a quantity/price pair and returns the rounded line subtotal.
pub fn line_subtotal(quantity: Decimal, unit_price: Decimal) -> AppResult<Decimal> {
    require_positive(quantity, "quantity")?;
    require_positive(unit_price, "unit_price")?;
    if quantity.normalize().scale() > QUANTITY_DP {
        return Err(AppError::BadRequest(format!(
            "quantity supports at most {QUANTITY_DP} decimal places"
        )));
    }
    quantity
        .checked_mul(unit_price)
        .map(round_money)
        .ok_or_else(|| AppError::BadRequest("line amount is too large".into()))
}

pub fn sum_subtotals<I>(subtotals: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    round_money(subtotals.into_iter().sum())
}
