//! Coupon Application
//!
//! Validates a coupon against a cart, recomputes its discount, and writes
//! the result onto the cart: per-unit discounts for product-wise coupons,
//! the cart-level total for every variant.

use jiff::civil::DateTime;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    cart::Cart,
    coupons::{Coupon, CouponKind, DiscountValue},
    discounts::{self, DiscountError},
    eligibility::{self, EligibilityError},
    money,
};

/// Errors from applying a coupon to a cart.
#[derive(Debug, Error)]
pub enum ApplyError<'a> {
    /// The coupon failed an eligibility check; surfaced unchanged.
    #[error("{0}")]
    Ineligible(EligibilityError<'a>),

    /// Discount computation failed while writing to the cart.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

impl<'a> From<EligibilityError<'a>> for ApplyError<'a> {
    fn from(err: EligibilityError<'a>) -> Self {
        Self::Ineligible(err)
    }
}

/// Apply `coupon` to `cart` at `now`, returning the total discount applied.
///
/// Cart-wise and buy-x-get-y coupons only set the cart-level discount;
/// product-wise coupons also write a per-unit discount onto each matching
/// line. The cart's `total_price` and `final_price` are derived, so they are
/// consistent as soon as the discount is set. Incrementing the coupon's
/// usage counter afterwards is the caller's responsibility.
///
/// # Errors
///
/// Returns [`ApplyError::Ineligible`] when validation fails (the cart is
/// left untouched) and [`ApplyError::Discount`] when recomputation fails
/// mid-application.
pub fn apply_coupon<'a>(
    coupon: &Coupon<'a>,
    cart: &mut Cart<'a>,
    now: DateTime,
) -> Result<Money<'a, Currency>, ApplyError<'a>> {
    eligibility::check_eligibility(coupon, cart, now)?;

    let total_discount = match coupon.kind() {
        CouponKind::CartWise => discounts::cart_wise(coupon, cart)?,
        CouponKind::ProductWise { .. } => apply_product_wise(coupon, cart)?,
        CouponKind::BuyXGetY {
            rules,
            repetition_limit,
        } => discounts::buy_x_get_y(rules, *repetition_limit, cart)?,
    };

    cart.set_total_discount(total_discount)
        .map_err(DiscountError::from)?;
    cart.set_applied_coupon(coupon.key());

    Ok(total_discount)
}

/// Write per-unit discounts onto matching lines and return their capped sum.
///
/// The per-unit amount rounds on the unit price, while evaluation rounds on
/// the line total; and the cap applies to the accumulated sum without
/// re-proportioning the per-unit discounts already written. Both follow the
/// reference behaviour.
fn apply_product_wise<'a>(
    coupon: &Coupon<'a>,
    cart: &mut Cart<'a>,
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

    let discount = coupon.discount();
    let cap = coupon.max_discount_amount();
    let mut total = Money::from_minor(0, cart.currency());

    for item in cart.items_mut() {
        if !applicable_products.contains(&item.product()) {
            continue;
        }

        let unit_discount = match discount {
            DiscountValue::Percentage(percent) => money::percent_of(*item.unit_price(), percent)?,
            DiscountValue::FixedAmount(amount) => amount,
        };

        let quantity = item.quantity();
        item.set_unit_discount(unit_discount)?;

        total = total.add(money::scale(unit_discount, i64::from(quantity))?)?;
    }

    let capped = match cap {
        Some(cap) => money::cap_at(total, cap)?,
        None => total,
    };

    Ok(money::clamp_non_negative(capped))
}
