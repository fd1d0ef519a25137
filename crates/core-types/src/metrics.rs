use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Administered doses as a percentage of distributed doses, rounded to one
/// decimal place.
///
/// Returns `0.0` when nothing was distributed instead of dividing by zero.
pub fn efficiency_pct(distributed: i64, administered: i64) -> f64 {
    if distributed <= 0 {
        return 0.0;
    }
    Decimal::from(administered)
        .checked_mul(dec!(100))
        .and_then(|scaled| scaled.checked_div(Decimal::from(distributed)))
        .map(|pct| pct.round_dp(1))
        .and_then(|pct| pct.to_f64())
        .unwrap_or(0.0)
}

/// Rounds a stored percentage to one decimal place (banker's rounding).
///
/// Values that have no decimal representation (NaN, infinities) pass through.
pub fn round_pct(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(|pct| pct.round_dp(1))
        .and_then(|pct| pct.to_f64())
        .unwrap_or(value)
}
