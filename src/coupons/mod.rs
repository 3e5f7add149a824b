//! Coupons
//!
//! Coupon definitions: the three discount variants, their parameters, and
//! usage/validity metadata. Coupons are immutable during evaluation; the
//! only mutation is the usage counter the caller bumps after a successful
//! application.

use decimal_percentage::Percentage;
use jiff::civil::DateTime;
use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;
use smallvec::SmallVec;
use thiserror::Error;

use crate::products::ProductId;

pub mod bxgy;

pub use bxgy::BxgyRule;

new_key_type! {
    /// Coupon Key
    pub struct CouponKey;
}

/// Errors raised while constructing coupon data.
#[derive(Debug, Error)]
pub enum CouponError {
    /// A buy-x-get-y rule needs a buy quantity of at least one.
    #[error("buy quantity must be at least 1")]
    ZeroBuyQuantity,

    /// A buy-x-get-y rule needs a get quantity of at least one.
    #[error("get quantity must be at least 1")]
    ZeroGetQuantity,

    /// A buy-x-get-y rule needs at least one buy product.
    #[error("buy product set must not be empty")]
    EmptyBuyProducts,

    /// A buy-x-get-y rule needs at least one get product.
    #[error("get product set must not be empty")]
    EmptyGetProducts,
}

/// Discount configuration shared by cart-wise and product-wise coupons.
#[derive(Debug, Clone, Copy)]
pub enum DiscountValue<'a> {
    /// Percentage discount (e.g. 10% off).
    Percentage(Percentage),

    /// Fixed amount discount (e.g. $5 off).
    FixedAmount(Money<'a, Currency>),
}

/// Variant-specific coupon payload.
#[derive(Debug, Clone)]
pub enum CouponKind {
    /// Discount on the aggregate cart value.
    CartWise,

    /// Discount restricted to a fixed set of product ids.
    ProductWise {
        /// Products the discount applies to. An empty set never applies.
        applicable_products: FxHashSet<ProductId>,
    },

    /// Free units of a "get" set earned by purchased quantity of a "buy" set.
    BuyXGetY {
        /// Rules evaluated in ascending priority order.
        rules: SmallVec<[BxgyRule; 2]>,

        /// Maximum number of rules that may contribute in one application.
        repetition_limit: u32,
    },
}

/// A coupon definition.
///
/// Constructed by the caller from persisted records and passed by reference
/// into the engine; the engine never creates or deletes coupons.
#[derive(Debug, Clone)]
pub struct Coupon<'a> {
    key: CouponKey,
    code: String,
    name: String,
    description: String,
    kind: CouponKind,
    discount: DiscountValue<'a>,
    active: bool,
    valid_from: Option<DateTime>,
    valid_until: Option<DateTime>,
    minimum_cart_value: Option<Money<'a, Currency>>,
    max_usage: Option<u32>,
    current_usage: u32,
    max_discount_amount: Option<Money<'a, Currency>>,
}

impl<'a> Coupon<'a> {
    /// Create an active coupon with no validity window and no limits.
    #[must_use]
    pub fn new(
        key: CouponKey,
        code: impl Into<String>,
        kind: CouponKind,
        discount: DiscountValue<'a>,
    ) -> Self {
        Self {
            key,
            code: code.into(),
            name: String::new(),
            description: String::new(),
            kind,
            discount,
            active: true,
            valid_from: None,
            valid_until: None,
            minimum_cart_value: None,
            max_usage: None,
            current_usage: 0,
            max_discount_amount: None,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the long description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set whether the coupon is switched on.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Set the validity window; either bound may be open.
    #[must_use]
    pub fn with_validity(mut self, from: Option<DateTime>, until: Option<DateTime>) -> Self {
        self.valid_from = from;
        self.valid_until = until;
        self
    }

    /// Set the minimum cart value required to use the coupon.
    #[must_use]
    pub fn with_minimum_cart_value(mut self, minimum: Money<'a, Currency>) -> Self {
        self.minimum_cart_value = Some(minimum);
        self
    }

    /// Set the maximum number of uses.
    #[must_use]
    pub fn with_max_usage(mut self, limit: u32) -> Self {
        self.max_usage = Some(limit);
        self
    }

    /// Set how many times the coupon has already been used.
    #[must_use]
    pub fn with_current_usage(mut self, used: u32) -> Self {
        self.current_usage = used;
        self
    }

    /// Set a cap on the discount a single application may yield.
    #[must_use]
    pub fn with_max_discount_amount(mut self, cap: Money<'a, Currency>) -> Self {
        self.max_discount_amount = Some(cap);
        self
    }

    /// Return the coupon key.
    pub fn key(&self) -> CouponKey {
        self.key
    }

    /// Return the unique coupon code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Return the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the long description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Return the variant payload.
    pub fn kind(&self) -> &CouponKind {
        &self.kind
    }

    /// Return the discount configuration.
    pub fn discount(&self) -> DiscountValue<'a> {
        self.discount
    }

    /// Whether the coupon is switched on.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start of the validity window, if bounded.
    pub fn valid_from(&self) -> Option<DateTime> {
        self.valid_from
    }

    /// End of the validity window, if bounded.
    pub fn valid_until(&self) -> Option<DateTime> {
        self.valid_until
    }

    /// Minimum cart value required, if any.
    pub fn minimum_cart_value(&self) -> Option<Money<'a, Currency>> {
        self.minimum_cart_value
    }

    /// Maximum number of uses, if limited.
    pub fn max_usage(&self) -> Option<u32> {
        self.max_usage
    }

    /// How many times the coupon has been used so far.
    pub fn current_usage(&self) -> u32 {
        self.current_usage
    }

    /// Cap on the discount per application, if any.
    pub fn max_discount_amount(&self) -> Option<Money<'a, Currency>> {
        self.max_discount_amount
    }

    /// Record one use. Callers invoke this only after a successful
    /// application; eligibility checking is the gate, so the counter
    /// saturates rather than errors.
    pub fn record_usage(&mut self) {
        self.current_usage = self.current_usage.saturating_add(1);
    }

    /// A human-readable description of the discount this coupon grants.
    #[must_use]
    pub fn discount_description(&self) -> String {
        match &self.kind {
            CouponKind::BuyXGetY { .. } => "Buy X Get Y discount applied".to_owned(),
            CouponKind::CartWise | CouponKind::ProductWise { .. } => match self.discount {
                DiscountValue::Percentage(percent) => {
                    let points = (percent * Decimal::ONE_HUNDRED).normalize();
                    format!("{points}% off")
                }
                DiscountValue::FixedAmount(amount) => format!("{amount} off"),
            },
        }
    }
}
