//! Receipts
//!
//! Plain-text rendering of an evaluated cart: one row per line item with its
//! discount, then the cart totals and the applied coupon, if any.

use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

use crate::{cart::Cart, coupons::Coupon};

/// Render `cart` as a plain-text receipt table.
///
/// Pass the applied coupon, if any, to include its code and description
/// under the table.
#[must_use]
pub fn render(cart: &Cart<'_>, applied: Option<&Coupon<'_>>) -> String {
    let mut builder = Builder::default();

    builder.push_record(["Item", "Qty", "Unit", "Discount", "Total"]);

    for item in cart.iter() {
        builder.push_record([
            item.name().to_owned(),
            item.quantity().to_string(),
            item.unit_price().to_string(),
            item.line_discount().to_string(),
            item.line_final().to_string(),
        ]);
    }

    builder.push_record([
        "Subtotal".to_owned(),
        String::new(),
        String::new(),
        String::new(),
        cart.total_price().to_string(),
    ]);

    builder.push_record([
        "Discount".to_owned(),
        String::new(),
        String::new(),
        String::new(),
        cart.total_discount().to_string(),
    ]);

    builder.push_record([
        "Total".to_owned(),
        String::new(),
        String::new(),
        String::new(),
        cart.final_price().to_string(),
    ]);

    let mut table = builder.build();
    table.with(Style::sharp());
    table.modify(Columns::new(1..), Alignment::right());

    let mut receipt = table.to_string();

    if let Some(coupon) = applied {
        receipt.push_str(&format!(
            "\nApplied {}: {}",
            coupon.code(),
            coupon.discount_description()
        ));
    }

    receipt
}
