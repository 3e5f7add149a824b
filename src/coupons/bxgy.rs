//! Buy-X-Get-Y Rules

use rustc_hash::FxHashSet;

use crate::{coupons::CouponError, products::ProductId};

/// A single prioritised buy-x-get-y rule: buying `buy_quantity` units from
/// the buy set earns `get_quantity` units from the get set.
#[derive(Debug, Clone)]
pub struct BxgyRule {
    buy_quantity: u32,
    buy_products: FxHashSet<ProductId>,
    get_quantity: u32,
    get_products: FxHashSet<ProductId>,
    priority: u32,
}

impl BxgyRule {
    /// Create a new rule.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponError`] when either quantity is zero or either
    /// product set is empty. A non-empty get set guarantees the average
    /// get-price division can never divide by zero.
    pub fn new(
        buy_quantity: u32,
        buy_products: FxHashSet<ProductId>,
        get_quantity: u32,
        get_products: FxHashSet<ProductId>,
        priority: u32,
    ) -> Result<Self, CouponError> {
        if buy_quantity == 0 {
            return Err(CouponError::ZeroBuyQuantity);
        }

        if get_quantity == 0 {
            return Err(CouponError::ZeroGetQuantity);
        }

        if buy_products.is_empty() {
            return Err(CouponError::EmptyBuyProducts);
        }

        if get_products.is_empty() {
            return Err(CouponError::EmptyGetProducts);
        }

        Ok(Self {
            buy_quantity,
            buy_products,
            get_quantity,
            get_products,
            priority,
        })
    }

    /// Units that must be bought from the buy set per application.
    pub fn buy_quantity(&self) -> u32 {
        self.buy_quantity
    }

    /// Products that count towards the buy requirement.
    pub fn buy_products(&self) -> &FxHashSet<ProductId> {
        &self.buy_products
    }

    /// Units from the get set granted per application.
    pub fn get_quantity(&self) -> u32 {
        self.get_quantity
    }

    /// Products eligible to be granted.
    pub fn get_products(&self) -> &FxHashSet<ProductId> {
        &self.get_products
    }

    /// Evaluation priority; lower values are evaluated first.
    pub fn priority(&self) -> u32 {
        self.priority
    }
}
