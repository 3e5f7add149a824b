//! Coupon Catalog
//!
//! In-memory coupon store: keyed storage, code lookup, validity filtering,
//! and the best-effort applicable-coupons scan.

use jiff::civil::DateTime;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use slotmap::SlotMap;
use thiserror::Error;

use crate::{
    cart::Cart,
    coupons::{Coupon, CouponKey},
    discounts,
};

/// Errors related to catalog maintenance.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A coupon with this code already exists.
    #[error("coupon with code {0} already exists")]
    DuplicateCode(String),

    /// No coupon is stored under the given key.
    #[error("coupon not found")]
    UnknownCoupon,
}

/// A coupon that yields a positive discount for a specific cart.
#[derive(Debug)]
pub struct ApplicableCoupon<'a> {
    /// Key of the coupon in the catalog.
    pub key: CouponKey,

    /// Coupon code.
    pub code: String,

    /// Discount the coupon would yield.
    pub discount: Money<'a, Currency>,

    /// Human-readable discount description.
    pub description: String,
}

/// In-memory coupon store.
#[derive(Debug, Default)]
pub struct CouponCatalog<'a> {
    coupons: SlotMap<CouponKey, Coupon<'a>>,
    codes: FxHashMap<String, CouponKey>,
}

impl<'a> CouponCatalog<'a> {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            coupons: SlotMap::with_key(),
            codes: FxHashMap::default(),
        }
    }

    /// Insert a coupon built around a freshly assigned key.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateCode` when a coupon with the same
    /// code is already stored; the new coupon is discarded.
    pub fn insert(
        &mut self,
        build: impl FnOnce(CouponKey) -> Coupon<'a>,
    ) -> Result<CouponKey, CatalogError> {
        let key = self.coupons.insert_with_key(build);

        // The key was inserted just above.
        let code = self
            .coupons
            .get(key)
            .map(|coupon| coupon.code().to_owned())
            .ok_or(CatalogError::UnknownCoupon)?;

        if self.codes.contains_key(&code) {
            self.coupons.remove(key);
            return Err(CatalogError::DuplicateCode(code));
        }

        self.codes.insert(code, key);
        Ok(key)
    }

    /// Look up a coupon by key.
    pub fn get(&self, key: CouponKey) -> Option<&Coupon<'a>> {
        self.coupons.get(key)
    }

    /// Look up a coupon by code.
    pub fn find_by_code(&self, code: &str) -> Option<&Coupon<'a>> {
        self.codes.get(code).and_then(|&key| self.coupons.get(key))
    }

    /// Record one use of a coupon, after a successful application.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownCoupon` if no coupon is stored under
    /// the key.
    pub fn record_usage(&mut self, key: CouponKey) -> Result<(), CatalogError> {
        self.coupons
            .get_mut(key)
            .map(Coupon::record_usage)
            .ok_or(CatalogError::UnknownCoupon)
    }

    /// The number of coupons stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }

    /// Iterate over every stored coupon.
    pub fn iter(&self) -> impl Iterator<Item = (CouponKey, &Coupon<'a>)> {
        self.coupons.iter()
    }

    /// Coupons that are active, inside their validity window, and under
    /// their usage limit at `now`.
    pub fn active_and_valid(&self, now: DateTime) -> impl Iterator<Item = &Coupon<'a>> {
        self.coupons.values().filter(move |coupon| {
            coupon.is_active()
                && coupon.valid_from().is_none_or(|from| from <= now)
                && coupon.valid_until().is_none_or(|until| until >= now)
                && coupon
                    .max_usage()
                    .is_none_or(|max| coupon.current_usage() < max)
        })
    }

    /// Evaluate every active, valid coupon against `cart` and return those
    /// yielding a positive discount, sorted by descending discount.
    ///
    /// A coupon whose evaluation fails is logged and skipped; the scan never
    /// aborts on malformed per-coupon data.
    pub fn applicable_coupons(&self, cart: &Cart<'a>, now: DateTime) -> Vec<ApplicableCoupon<'a>> {
        let mut applicable = Vec::new();

        for coupon in self.active_and_valid(now) {
            match discounts::calculate_discount(coupon, cart) {
                Ok(discount) if discount.to_minor_units() > 0 => {
                    applicable.push(ApplicableCoupon {
                        key: coupon.key(),
                        code: coupon.code().to_owned(),
                        discount,
                        description: coupon.discount_description(),
                    });
                }
                Ok(_) => {}
                Err(error) => {
                    tracing::warn!(
                        code = coupon.code(),
                        %error,
                        "skipping coupon during applicable scan"
                    );
                }
            }
        }

        applicable.sort_by_key(|candidate| std::cmp::Reverse(candidate.discount.to_minor_units()));
        applicable
    }
}
