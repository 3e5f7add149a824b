//! Coupon Eligibility
//!
//! Ordered pre-application checks: temporal, usage, and cart-value
//! preconditions, then a discount computation that must come out positive.

use jiff::civil::DateTime;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    cart::Cart,
    coupons::Coupon,
    discounts::{self, DiscountError},
    money,
};

/// Reasons a coupon cannot be applied to a cart.
///
/// These are business-rule rejections, not transient failures; callers
/// surface them verbatim and never retry.
#[derive(Debug, Error)]
pub enum EligibilityError<'a> {
    /// The coupon is switched off.
    #[error("coupon is not active")]
    Inactive,

    /// The validity window has not opened yet.
    #[error("coupon is not yet valid")]
    NotYetValid,

    /// The validity window has closed.
    #[error("coupon has expired")]
    Expired,

    /// The coupon has been used as many times as allowed.
    #[error("coupon usage limit exceeded")]
    UsageLimitExceeded,

    /// The cart total is under the coupon's minimum.
    #[error("cart total does not meet minimum cart value of {minimum}")]
    BelowMinimumCartValue {
        /// The required minimum cart value.
        minimum: Money<'a, Currency>,
    },

    /// The coupon yields no positive discount for this cart.
    #[error("coupon cannot be applied to this cart")]
    NotApplicable,

    /// Discount computation failed; bulk scans catch this kind and skip the
    /// coupon rather than aborting.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Check whether `coupon` can be applied to `cart` at `now`.
///
/// Checks run in a fixed order and stop at the first failure. On success the
/// computed discount is returned so callers can reuse it without
/// recomputing.
///
/// # Errors
///
/// Returns the first failing [`EligibilityError`], or
/// [`EligibilityError::Discount`] if the discount computation itself fails.
pub fn check_eligibility<'a>(
    coupon: &Coupon<'a>,
    cart: &Cart<'a>,
    now: DateTime,
) -> Result<Money<'a, Currency>, EligibilityError<'a>> {
    if !coupon.is_active() {
        return Err(EligibilityError::Inactive);
    }

    if let Some(from) = coupon.valid_from() {
        if now < from {
            return Err(EligibilityError::NotYetValid);
        }
    }

    if let Some(until) = coupon.valid_until() {
        if now > until {
            return Err(EligibilityError::Expired);
        }
    }

    if let Some(max) = coupon.max_usage() {
        if coupon.current_usage() >= max {
            return Err(EligibilityError::UsageLimitExceeded);
        }
    }

    if let Some(minimum) = coupon.minimum_cart_value() {
        let below = money::is_below(cart.total_price(), minimum)
            .map_err(DiscountError::from)?;

        if below {
            return Err(EligibilityError::BelowMinimumCartValue { minimum });
        }
    }

    let discount = discounts::calculate_discount(coupon, cart)?;

    if discount.to_minor_units() <= 0 {
        return Err(EligibilityError::NotApplicable);
    }

    Ok(discount)
}
