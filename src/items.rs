//! Cart Items

use rusty_money::{Money, iso::Currency};

use crate::{money::MoneyMathError, products::ProductId};

/// A priced cart line: a product, a quantity, and any per-unit discount
/// written onto it by coupon application.
///
/// `quantity` must be at least 1 and `unit_price` positive; both are the
/// caller's responsibility to validate before handing items to the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct CartItem<'a> {
    product: ProductId,
    name: String,
    quantity: u32,
    unit_price: Money<'a, Currency>,
    unit_discount: Money<'a, Currency>,
}

impl<'a> CartItem<'a> {
    /// Creates a new line item with no discount.
    #[must_use]
    pub fn new(
        product: ProductId,
        name: impl Into<String>,
        quantity: u32,
        unit_price: Money<'a, Currency>,
    ) -> Self {
        Self {
            product,
            name: name.into(),
            quantity,
            unit_price,
            unit_discount: Money::from_minor(0, unit_price.currency()),
        }
    }

    /// Returns the product this line refers to.
    pub fn product(&self) -> ProductId {
        self.product
    }

    /// Returns the display name of the product.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of units on this line.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the price of a single unit.
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the discount applied to a single unit.
    pub fn unit_discount(&self) -> &Money<'a, Currency> {
        &self.unit_discount
    }

    /// The undiscounted value of the line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money<'a, Currency> {
        Money::from_minor(
            self.unit_price.to_minor_units() * i64::from(self.quantity),
            self.unit_price.currency(),
        )
    }

    /// The discount carried by the whole line: unit discount times quantity.
    #[must_use]
    pub fn line_discount(&self) -> Money<'a, Currency> {
        Money::from_minor(
            self.unit_discount.to_minor_units() * i64::from(self.quantity),
            self.unit_price.currency(),
        )
    }

    /// The line value after its discount. Not clamped: clamping happens at
    /// the rule level before a discount ever reaches the line.
    #[must_use]
    pub fn line_final(&self) -> Money<'a, Currency> {
        Money::from_minor(
            self.line_total().to_minor_units() - self.line_discount().to_minor_units(),
            self.unit_price.currency(),
        )
    }

    /// Set the per-unit discount for this line.
    pub(crate) fn set_unit_discount(
        &mut self,
        discount: Money<'a, Currency>,
    ) -> Result<(), MoneyMathError> {
        if discount.currency() == self.unit_price.currency() {
            self.unit_discount = discount;
            Ok(())
        } else {
            Err(MoneyMathError::CurrencyMismatch(
                self.unit_price.currency().iso_alpha_code,
                discount.currency().iso_alpha_code,
            ))
        }
    }
}
