//! Carts

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{coupons::CouponKey, items::CartItem, money::MoneyMathError};

/// Errors related to cart construction or lookups.
#[derive(Debug, Error)]
pub enum CartError {
    /// An item's currency differs from the cart currency (index, item currency, cart currency).
    #[error("item {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// An item was not found in the cart.
    #[error("item {0} not found")]
    ItemNotFound(usize),
}

/// A shopping cart: line items plus the discount state written by coupon
/// application.
///
/// `total_price` and `final_price` are derived from the items and the total
/// discount; they are never stored or independently mutated.
#[derive(Debug)]
pub struct Cart<'a> {
    items: Vec<CartItem<'a>>,
    total_discount: Money<'a, Currency>,
    applied_coupon: Option<CouponKey>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create a new empty cart.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            items: Vec::new(),
            total_discount: Money::from_minor(0, currency),
            applied_coupon: None,
            currency,
        }
    }

    /// Create a cart with the given items.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::CurrencyMismatch` if any item is priced in a
    /// currency other than the cart's.
    pub fn with_items(
        items: impl Into<Vec<CartItem<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let items = items.into();

        items.iter().enumerate().try_for_each(|(i, item)| {
            let item_currency = item.unit_price().currency();

            if item_currency == currency {
                Ok(())
            } else {
                Err(CartError::CurrencyMismatch(
                    i,
                    item_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ))
            }
        })?;

        Ok(Cart {
            items,
            total_discount: Money::from_minor(0, currency),
            applied_coupon: None,
            currency,
        })
    }

    /// The undiscounted cart total: the sum of every line total.
    #[must_use]
    pub fn total_price(&self) -> Money<'a, Currency> {
        let minor: i64 = self
            .items
            .iter()
            .map(|item| item.line_total().to_minor_units())
            .sum();

        Money::from_minor(minor, self.currency)
    }

    /// The discount currently applied to the cart as a whole.
    pub fn total_discount(&self) -> &Money<'a, Currency> {
        &self.total_discount
    }

    /// The cart total after the applied discount.
    #[must_use]
    pub fn final_price(&self) -> Money<'a, Currency> {
        Money::from_minor(
            self.total_price().to_minor_units() - self.total_discount.to_minor_units(),
            self.currency,
        )
    }

    /// The coupon applied to this cart, if any.
    pub fn applied_coupon(&self) -> Option<CouponKey> {
        self.applied_coupon
    }

    /// Get an item from the cart.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::ItemNotFound` if the index is out of range.
    pub fn get_item(&self, item: usize) -> Result<&CartItem<'a>, CartError> {
        self.items.get(item).ok_or(CartError::ItemNotFound(item))
    }

    /// The items in the cart, in insertion order.
    pub fn items(&self) -> &[CartItem<'a>] {
        &self.items
    }

    /// Iterate over the items in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &CartItem<'a>> {
        self.items.iter()
    }

    /// Get the number of items in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Iterate mutably over the items; used by coupon application to write
    /// per-unit discounts.
    pub(crate) fn items_mut(&mut self) -> impl Iterator<Item = &mut CartItem<'a>> {
        self.items.iter_mut()
    }

    /// Set the cart-level discount.
    pub(crate) fn set_total_discount(
        &mut self,
        discount: Money<'a, Currency>,
    ) -> Result<(), MoneyMathError> {
        if discount.currency() == self.currency {
            self.total_discount = discount;
            Ok(())
        } else {
            Err(MoneyMathError::CurrencyMismatch(
                self.currency.iso_alpha_code,
                discount.currency().iso_alpha_code,
            ))
        }
    }

    /// Record which coupon was applied.
    pub(crate) fn set_applied_coupon(&mut self, coupon: CouponKey) {
        self.applied_coupon = Some(coupon);
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use crate::products::ProductId;

    use super::*;

    fn test_items<'a>() -> [CartItem<'a>; 3] {
        [
            CartItem::new(ProductId(1), "Espresso", 1, Money::from_minor(100, GBP)),
            CartItem::new(ProductId(2), "Flat White", 1, Money::from_minor(200, GBP)),
            CartItem::new(ProductId(3), "Mocha", 1, Money::from_minor(300, GBP)),
        ]
    }

    #[test]
    fn new_cart_is_empty_with_zero_totals() {
        let cart = Cart::new(GBP);

        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Money::from_minor(0, GBP));
        assert_eq!(cart.final_price(), Money::from_minor(0, GBP));
        assert!(cart.applied_coupon().is_none());
    }

    #[test]
    fn with_items_currency_mismatch_errors() {
        let items = [
            CartItem::new(ProductId(1), "Espresso", 1, Money::from_minor(100, GBP)),
            CartItem::new(ProductId(2), "Flat White", 1, Money::from_minor(100, USD)),
        ];

        let result = Cart::with_items(items, GBP);

        match result {
            Err(CartError::CurrencyMismatch(idx, item_currency, cart_currency)) => {
                assert_eq!(idx, 1);
                assert_eq!(item_currency, USD.iso_alpha_code);
                assert_eq!(cart_currency, GBP.iso_alpha_code);
            }
            other => panic!("expected CurrencyMismatch error, got {other:?}"),
        }
    }

    #[test]
    fn total_price_sums_line_totals() -> TestResult {
        let items = [
            CartItem::new(ProductId(1), "Espresso", 2, Money::from_minor(100, GBP)),
            CartItem::new(ProductId(2), "Flat White", 1, Money::from_minor(200, GBP)),
        ];

        let cart = Cart::with_items(items, GBP)?;

        assert_eq!(cart.total_price(), Money::from_minor(400, GBP));

        Ok(())
    }

    #[test]
    fn final_price_subtracts_total_discount() -> TestResult {
        let mut cart = Cart::with_items(test_items(), GBP)?;

        cart.set_total_discount(Money::from_minor(150, GBP))?;

        assert_eq!(cart.total_price(), Money::from_minor(600, GBP));
        assert_eq!(cart.final_price(), Money::from_minor(450, GBP));

        Ok(())
    }

    #[test]
    fn set_total_discount_rejects_other_currency() -> TestResult {
        let mut cart = Cart::with_items(test_items(), GBP)?;

        let result = cart.set_total_discount(Money::from_minor(150, USD));

        assert!(matches!(
            result,
            Err(MoneyMathError::CurrencyMismatch("GBP", "USD"))
        ));

        Ok(())
    }

    #[test]
    fn get_item_returns_item() -> TestResult {
        let cart = Cart::with_items(test_items(), GBP)?;

        let item = cart.get_item(1)?;

        assert_eq!(item.unit_price(), &Money::from_minor(200, GBP));

        Ok(())
    }

    #[test]
    fn get_item_missing_returns_error() {
        let cart = Cart::new(GBP);

        let err = cart.get_item(0).err();

        assert!(matches!(err, Some(CartError::ItemNotFound(0))));
    }

    #[test]
    fn iter_returns_items_in_order() -> TestResult {
        let cart = Cart::with_items(test_items(), GBP)?;

        let prices: Vec<i64> = cart
            .iter()
            .map(|item| item.unit_price().to_minor_units())
            .collect();

        assert_eq!(prices, vec![100, 200, 300]);

        Ok(())
    }
}
