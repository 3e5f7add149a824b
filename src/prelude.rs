//! Scrip prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    application::{ApplyError, apply_coupon},
    cart::{Cart, CartError},
    catalog::{ApplicableCoupon, CatalogError, CouponCatalog},
    coupons::{BxgyRule, Coupon, CouponError, CouponKey, CouponKind, DiscountValue},
    discounts::{DiscountError, calculate_discount},
    eligibility::{EligibilityError, check_eligibility},
    fixtures::{CheckoutFixture, FixtureError},
    items::CartItem,
    money::MoneyMathError,
    products::ProductId,
    receipt,
};
