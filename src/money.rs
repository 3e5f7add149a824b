//! Money Arithmetic
//!
//! Minor-unit helpers shared by the discount strategies. Every division
//! rounds half-up at minor-unit precision, so results stay bit-exact with
//! two-decimal-place, round-half-up reference arithmetic.

use decimal_percentage::Percentage;
use num_traits::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Errors from minor-unit money arithmetic.
#[derive(Debug, Error)]
pub enum MoneyMathError {
    /// A multiplication or conversion overflowed the representable range.
    #[error("money arithmetic overflowed")]
    Overflow,

    /// A mean was requested over zero elements.
    #[error("cannot divide by zero")]
    DivideByZero,

    /// Two amounts with different currencies were combined (expected, found).
    #[error("currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculate a percentage of an amount, rounded half-up to minor units.
///
/// # Errors
///
/// Returns [`MoneyMathError::Overflow`] if the product cannot be represented
/// in minor units.
pub fn percent_of<'a>(
    value: Money<'a, Currency>,
    percent: Percentage,
) -> Result<Money<'a, Currency>, MoneyMathError> {
    // `from_i64` returns `Some` for every `i64`.
    let minor = Decimal::from_i64(value.to_minor_units()).ok_or(MoneyMathError::Overflow)?;

    let rate = percent * Decimal::ONE;
    let Some(applied) = rate.checked_mul(minor) else {
        return Err(MoneyMathError::Overflow);
    };

    let rounded = applied.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let Some(rounded) = rounded.to_i64() else {
        return Err(MoneyMathError::Overflow);
    };

    Ok(Money::from_minor(rounded, value.currency()))
}

/// Divide a total evenly over `count` elements, rounded half-up to minor units.
///
/// # Errors
///
/// Returns [`MoneyMathError::DivideByZero`] when `count` is zero, and
/// [`MoneyMathError::Overflow`] if the quotient cannot be represented.
pub fn mean_over<'a>(
    total: Money<'a, Currency>,
    count: usize,
) -> Result<Money<'a, Currency>, MoneyMathError> {
    if count == 0 {
        return Err(MoneyMathError::DivideByZero);
    }

    let minor = Decimal::from_i64(total.to_minor_units()).ok_or(MoneyMathError::Overflow)?;

    let Some(divisor) = Decimal::from_usize(count) else {
        return Err(MoneyMathError::Overflow);
    };

    let Some(quotient) = minor.checked_div(divisor) else {
        return Err(MoneyMathError::Overflow);
    };

    let rounded = quotient.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let Some(rounded) = rounded.to_i64() else {
        return Err(MoneyMathError::Overflow);
    };

    Ok(Money::from_minor(rounded, total.currency()))
}

/// Multiply an amount by an integer count.
///
/// # Errors
///
/// Returns [`MoneyMathError::Overflow`] if the product overflows minor units.
pub fn scale<'a>(
    value: Money<'a, Currency>,
    times: i64,
) -> Result<Money<'a, Currency>, MoneyMathError> {
    let Some(scaled) = value.to_minor_units().checked_mul(times) else {
        return Err(MoneyMathError::Overflow);
    };

    Ok(Money::from_minor(scaled, value.currency()))
}

/// Cap an amount at an upper bound.
///
/// # Errors
///
/// Returns [`MoneyMathError::CurrencyMismatch`] when the bound's currency
/// differs from the value's.
pub fn cap_at<'a>(
    value: Money<'a, Currency>,
    cap: Money<'a, Currency>,
) -> Result<Money<'a, Currency>, MoneyMathError> {
    ensure_same_currency(value, cap)?;

    if cap.to_minor_units() < value.to_minor_units() {
        Ok(cap)
    } else {
        Ok(value)
    }
}

/// Clamp a possibly negative amount up to zero.
#[must_use]
pub fn clamp_non_negative<'a>(value: Money<'a, Currency>) -> Money<'a, Currency> {
    if value.to_minor_units() < 0 {
        Money::from_minor(0, value.currency())
    } else {
        value
    }
}

/// Whether `value` is strictly below `threshold`.
///
/// # Errors
///
/// Returns [`MoneyMathError::CurrencyMismatch`] when the two amounts carry
/// different currencies.
pub fn is_below(
    value: Money<'_, Currency>,
    threshold: Money<'_, Currency>,
) -> Result<bool, MoneyMathError> {
    ensure_same_currency(value, threshold)?;

    Ok(value.to_minor_units() < threshold.to_minor_units())
}

/// Return `CurrencyMismatch` unless both amounts share a currency.
fn ensure_same_currency(
    left: Money<'_, Currency>,
    right: Money<'_, Currency>,
) -> Result<(), MoneyMathError> {
    if left.currency() == right.currency() {
        Ok(())
    } else {
        Err(MoneyMathError::CurrencyMismatch(
            left.currency().iso_alpha_code,
            right.currency().iso_alpha_code,
        ))
    }
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn percent_of_rounds_half_up() -> TestResult {
        // 10% of 1.25 = 0.125, which rounds up to 0.13.
        let value = Money::from_minor(125, USD);

        let discount = percent_of(value, Percentage::from(0.10))?;

        assert_eq!(discount, Money::from_minor(13, USD));

        Ok(())
    }

    #[test]
    fn percent_of_exact_amount() -> TestResult {
        let value = Money::from_minor(12_000, USD);

        let discount = percent_of(value, Percentage::from(0.10))?;

        assert_eq!(discount, Money::from_minor(1200, USD));

        Ok(())
    }

    #[test]
    fn mean_over_rounds_half_up() -> TestResult {
        // 9.99 / 2 = 4.995, which rounds up to 5.00.
        let mean = mean_over(Money::from_minor(999, USD), 2)?;

        assert_eq!(mean, Money::from_minor(500, USD));

        Ok(())
    }

    #[test]
    fn mean_over_zero_count_errors() {
        let result = mean_over(Money::from_minor(100, USD), 0);

        assert!(matches!(result, Err(MoneyMathError::DivideByZero)));
    }

    #[test]
    fn scale_multiplies_minor_units() -> TestResult {
        let scaled = scale(Money::from_minor(250, USD), 4)?;

        assert_eq!(scaled, Money::from_minor(1000, USD));

        Ok(())
    }

    #[test]
    fn scale_overflow_errors() {
        let result = scale(Money::from_minor(i64::MAX, USD), 2);

        assert!(matches!(result, Err(MoneyMathError::Overflow)));
    }

    #[test]
    fn cap_at_returns_smaller_amount() -> TestResult {
        let capped = cap_at(Money::from_minor(1500, USD), Money::from_minor(1000, USD))?;
        let uncapped = cap_at(Money::from_minor(800, USD), Money::from_minor(1000, USD))?;

        assert_eq!(capped, Money::from_minor(1000, USD));
        assert_eq!(uncapped, Money::from_minor(800, USD));

        Ok(())
    }

    #[test]
    fn cap_at_currency_mismatch_errors() {
        let result = cap_at(Money::from_minor(100, USD), Money::from_minor(100, GBP));

        assert!(matches!(
            result,
            Err(MoneyMathError::CurrencyMismatch("USD", "GBP"))
        ));
    }

    #[test]
    fn clamp_non_negative_floors_at_zero() {
        assert_eq!(
            clamp_non_negative(Money::from_minor(-50, USD)),
            Money::from_minor(0, USD)
        );
        assert_eq!(
            clamp_non_negative(Money::from_minor(50, USD)),
            Money::from_minor(50, USD)
        );
    }

    #[test]
    fn is_below_compares_minor_units() -> TestResult {
        assert!(is_below(
            Money::from_minor(9000, USD),
            Money::from_minor(10_000, USD)
        )?);
        assert!(!is_below(
            Money::from_minor(10_000, USD),
            Money::from_minor(10_000, USD)
        )?);

        Ok(())
    }
}
