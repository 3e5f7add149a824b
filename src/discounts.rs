//! Discount Strategies
//!
//! Pure calculation of the discount a coupon yields for a cart: one `match`
//! over the coupon variant, one function per strategy. Calculation never
//! mutates the cart; [`crate::application`] is the mutating counterpart.

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    cart::Cart,
    coupons::{BxgyRule, Coupon, CouponKind, DiscountValue},
    money::{self, MoneyMathError},
};

/// Errors specific to discount calculation.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// Wrapped minor-unit arithmetic or currency mismatch error.
    #[error(transparent)]
    Math(#[from] MoneyMathError),

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculate the discount `coupon` yields for `cart`.
///
/// Pure: identical inputs always produce identical outputs.
///
/// # Errors
///
/// Returns a [`DiscountError`] if the arithmetic overflows or the coupon's
/// amounts are in a different currency than the cart.
pub fn calculate_discount<'a>(
    coupon: &Coupon<'a>,
    cart: &Cart<'a>,
) -> Result<Money<'a, Currency>, DiscountError> {
    match coupon.kind() {
        CouponKind::CartWise => cart_wise(coupon, cart),
        CouponKind::ProductWise { .. } => product_wise(coupon, cart),
        CouponKind::BuyXGetY {
            rules,
            repetition_limit,
        } => buy_x_get_y(rules, *repetition_limit, cart),
    }
}

/// Cart-wise: a discount on the aggregate cart value, capped and clamped.
pub(crate) fn cart_wise<'a>(
    coupon: &Coupon<'a>,
    cart: &Cart<'a>,
) -> Result<Money<'a, Currency>, DiscountError> {
    let total = cart.total_price();

    if let Some(minimum) = coupon.minimum_cart_value() {
        if money::is_below(total, minimum)? {
            return Ok(Money::from_minor(0, cart.currency()));
        }
    }

    let discount = match coupon.discount() {
        DiscountValue::Percentage(percent) => money::percent_of(total, percent)?,
        DiscountValue::FixedAmount(amount) => amount,
    };

    capped_non_negative(discount, coupon.max_discount_amount())
}

/// Product-wise: per-line discounts summed over the applicable products,
/// capped and clamped on the sum.
pub(crate) fn product_wise<'a>(
    coupon: &Coupon<'a>,
    cart: &Cart<'a>,
) -> Result<Money<'a, Currency>, DiscountError> {
    let CouponKind::ProductWise {
        applicable_products,
    } = coupon.kind()
    else {
        return Ok(Money::from_minor(0, cart.currency()));
    };

    if applicable_products.is_empty() {
        return Ok(Money::from_minor(0, cart.currency()));
    }

    let mut total = Money::from_minor(0, cart.currency());

    for item in cart.iter() {
        if !applicable_products.contains(&item.product()) {
            continue;
        }

        let item_discount = match coupon.discount() {
            DiscountValue::Percentage(percent) => money::percent_of(item.line_total(), percent)?,
            DiscountValue::FixedAmount(amount) => {
                money::scale(amount, i64::from(item.quantity()))?
            }
        };

        total = total.add(item_discount)?;
    }

    capped_non_negative(total, coupon.max_discount_amount())
}

/// Buy-x-get-y: prioritised rules accumulate discount until the repetition
/// limit is reached. `max_discount_amount` is deliberately not consulted for
/// this variant, and the total is not clamped.
pub(crate) fn buy_x_get_y<'a>(
    rules: &[BxgyRule],
    repetition_limit: u32,
    cart: &Cart<'a>,
) -> Result<Money<'a, Currency>, DiscountError> {
    let mut total = Money::from_minor(0, cart.currency());

    if rules.is_empty() {
        return Ok(total);
    }

    let mut ordered: Vec<&BxgyRule> = rules.iter().collect();
    ordered.sort_by_key(|rule| rule.priority());

    let mut applied: u32 = 0;

    for rule in ordered {
        if applied >= repetition_limit {
            break;
        }

        let rule_discount = bxgy_rule_discount(rule, cart)?;

        if rule_discount.to_minor_units() > 0 {
            total = total.add(rule_discount)?;
            applied += 1;
        }
    }

    Ok(total)
}

/// Discount contributed by a single buy-x-get-y rule.
///
/// The average get price divides the get-set value by the number of distinct
/// get product ids, not by matched quantity.
fn bxgy_rule_discount<'a>(
    rule: &BxgyRule,
    cart: &Cart<'a>,
) -> Result<Money<'a, Currency>, DiscountError> {
    let buy_count: i64 = cart
        .iter()
        .filter(|item| rule.buy_products().contains(&item.product()))
        .map(|item| i64::from(item.quantity()))
        .sum();

    let applicable_times = buy_count / i64::from(rule.buy_quantity());

    if applicable_times == 0 {
        return Ok(Money::from_minor(0, cart.currency()));
    }

    let mut get_value = Money::from_minor(0, cart.currency());

    for item in cart.iter() {
        if rule.get_products().contains(&item.product()) {
            get_value = get_value.add(item.line_total())?;
        }
    }

    let average_get_price = money::mean_over(get_value, rule.get_products().len())?;

    Ok(money::scale(
        average_get_price,
        applicable_times * i64::from(rule.get_quantity()),
    )?)
}

/// Apply the optional discount cap, then clamp to non-negative.
fn capped_non_negative<'a>(
    discount: Money<'a, Currency>,
    cap: Option<Money<'a, Currency>>,
) -> Result<Money<'a, Currency>, DiscountError> {
    let capped = match cap {
        Some(cap) => money::cap_at(discount, cap)?,
        None => discount,
    };

    Ok(money::clamp_non_negative(capped))
}
