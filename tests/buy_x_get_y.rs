//! Integration tests for buy-x-get-y coupons: rule prioritisation, the
//! repetition limit, the distinct-get-id average price, and the deliberate
//! absence of the discount cap on this variant.

use decimal_percentage::Percentage;
use jiff::civil::{self, DateTime};
use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use scrip::prelude::*;

fn noon() -> DateTime {
    civil::date(2025, 6, 15).at(12, 0, 0, 0)
}

fn ids(raw: &[u64]) -> FxHashSet<ProductId> {
    raw.iter().copied().map(ProductId).collect()
}

fn bxgy(rules: Vec<BxgyRule>, repetition_limit: u32) -> Coupon<'static> {
    Coupon::new(
        CouponKey::default(),
        "BXGY",
        CouponKind::BuyXGetY {
            rules: rules.into(),
            repetition_limit,
        },
        DiscountValue::Percentage(Percentage::from(0.0)),
    )
}

/// Buy 4 grinders against a buy-2-get-1 rule: the rule applies twice, and
/// the average get price divides the get-set value by the two distinct get
/// product ids.
#[test]
fn rule_discount_uses_average_get_price() -> TestResult {
    let rule = BxgyRule::new(2, ids(&[1]), 1, ids(&[4, 5]), 1)?;

    let items = vec![
        CartItem::new(ProductId(1), "Grinder", 4, Money::from_minor(1000, USD)),
        CartItem::new(ProductId(4), "Filter Pack", 1, Money::from_minor(800, USD)),
        CartItem::new(ProductId(5), "Travel Press", 1, Money::from_minor(1200, USD)),
    ];
    let cart = Cart::with_items(items, USD)?;

    // buy_count 4 -> applicable twice; get value $20.00 over 2 ids -> $10.00
    // average; 2 applications x 1 get unit -> $20.00.
    let discount = calculate_discount(&bxgy(vec![rule], 1), &cart)?;

    assert_eq!(discount, Money::from_minor(2000, USD));

    Ok(())
}

#[test]
fn average_divides_by_distinct_ids_even_when_one_is_absent() -> TestResult {
    let rule = BxgyRule::new(2, ids(&[1]), 1, ids(&[4, 5]), 1)?;

    let items = vec![
        CartItem::new(ProductId(1), "Grinder", 2, Money::from_minor(1000, USD)),
        CartItem::new(ProductId(4), "Filter Pack", 1, Money::from_minor(800, USD)),
    ];
    let cart = Cart::with_items(items, USD)?;

    // Get value is only the $8.00 filter pack, still divided by the two
    // distinct get ids: $4.00 average, one application.
    let discount = calculate_discount(&bxgy(vec![rule], 1), &cart)?;

    assert_eq!(discount, Money::from_minor(400, USD));

    Ok(())
}

#[test]
fn repetition_limit_stops_after_first_qualifying_rule() -> TestResult {
    let first = BxgyRule::new(2, ids(&[1]), 1, ids(&[4]), 1)?;
    let second = BxgyRule::new(1, ids(&[2]), 1, ids(&[5]), 2)?;

    let items = vec![
        CartItem::new(ProductId(1), "Grinder", 2, Money::from_minor(1000, USD)),
        CartItem::new(ProductId(2), "Kettle", 1, Money::from_minor(4500, USD)),
        CartItem::new(ProductId(4), "Filter Pack", 1, Money::from_minor(800, USD)),
        CartItem::new(ProductId(5), "Travel Press", 1, Money::from_minor(1200, USD)),
    ];
    let cart = Cart::with_items(items, USD)?;

    // Both rules are independently satisfiable; the limit admits only the
    // first in priority order.
    let limited = calculate_discount(&bxgy(vec![first.clone(), second.clone()], 1), &cart)?;
    assert_eq!(limited, Money::from_minor(800, USD));

    let unlimited = calculate_discount(&bxgy(vec![first, second], 2), &cart)?;
    assert_eq!(unlimited, Money::from_minor(2000, USD));

    Ok(())
}

#[test]
fn rules_run_in_ascending_priority_order() -> TestResult {
    // Declared out of order: the priority-1 rule must win under a limit of 1.
    let low_priority = BxgyRule::new(1, ids(&[1]), 1, ids(&[5]), 9)?;
    let high_priority = BxgyRule::new(1, ids(&[1]), 1, ids(&[4]), 1)?;

    let items = vec![
        CartItem::new(ProductId(1), "Grinder", 1, Money::from_minor(1000, USD)),
        CartItem::new(ProductId(4), "Filter Pack", 1, Money::from_minor(800, USD)),
        CartItem::new(ProductId(5), "Travel Press", 1, Money::from_minor(1200, USD)),
    ];
    let cart = Cart::with_items(items, USD)?;

    let discount = calculate_discount(&bxgy(vec![low_priority, high_priority], 1), &cart)?;

    assert_eq!(discount, Money::from_minor(800, USD));

    Ok(())
}

#[test]
fn equal_priorities_keep_declaration_order() -> TestResult {
    let declared_first = BxgyRule::new(1, ids(&[1]), 1, ids(&[4]), 1)?;
    let declared_second = BxgyRule::new(1, ids(&[1]), 1, ids(&[5]), 1)?;

    let items = vec![
        CartItem::new(ProductId(1), "Grinder", 1, Money::from_minor(1000, USD)),
        CartItem::new(ProductId(4), "Filter Pack", 1, Money::from_minor(800, USD)),
        CartItem::new(ProductId(5), "Travel Press", 1, Money::from_minor(1200, USD)),
    ];
    let cart = Cart::with_items(items, USD)?;

    let discount = calculate_discount(&bxgy(vec![declared_first, declared_second], 1), &cart)?;

    assert_eq!(discount, Money::from_minor(800, USD));

    Ok(())
}

#[test]
fn unsatisfied_rule_does_not_consume_a_repetition_slot() -> TestResult {
    let unsatisfiable = BxgyRule::new(10, ids(&[1]), 1, ids(&[4]), 1)?;
    let satisfiable = BxgyRule::new(1, ids(&[1]), 1, ids(&[5]), 2)?;

    let items = vec![
        CartItem::new(ProductId(1), "Grinder", 1, Money::from_minor(1000, USD)),
        CartItem::new(ProductId(4), "Filter Pack", 1, Money::from_minor(800, USD)),
        CartItem::new(ProductId(5), "Travel Press", 1, Money::from_minor(1200, USD)),
    ];
    let cart = Cart::with_items(items, USD)?;

    let discount = calculate_discount(&bxgy(vec![unsatisfiable, satisfiable], 1), &cart)?;

    assert_eq!(discount, Money::from_minor(1200, USD));

    Ok(())
}

#[test]
fn max_discount_amount_does_not_cap_this_variant() -> TestResult {
    let rule = BxgyRule::new(2, ids(&[1]), 1, ids(&[4, 5]), 1)?;

    let coupon = bxgy(vec![rule], 1).with_max_discount_amount(Money::from_minor(500, USD));

    let items = vec![
        CartItem::new(ProductId(1), "Grinder", 4, Money::from_minor(1000, USD)),
        CartItem::new(ProductId(4), "Filter Pack", 1, Money::from_minor(800, USD)),
        CartItem::new(ProductId(5), "Travel Press", 1, Money::from_minor(1200, USD)),
    ];
    let cart = Cart::with_items(items, USD)?;

    // The cap would bind at $5.00 for the other variants; here it is
    // ignored and the full $20.00 comes through.
    let discount = calculate_discount(&coupon, &cart)?;

    assert_eq!(discount, Money::from_minor(2000, USD));

    Ok(())
}

#[test]
fn apply_sets_only_cart_level_discount() -> TestResult {
    let rule = BxgyRule::new(2, ids(&[1]), 1, ids(&[4, 5]), 1)?;

    let items = vec![
        CartItem::new(ProductId(1), "Grinder", 4, Money::from_minor(1000, USD)),
        CartItem::new(ProductId(4), "Filter Pack", 1, Money::from_minor(800, USD)),
        CartItem::new(ProductId(5), "Travel Press", 1, Money::from_minor(1200, USD)),
    ];
    let mut cart = Cart::with_items(items, USD)?;

    let applied = apply_coupon(&bxgy(vec![rule], 1), &mut cart, noon())?;

    assert_eq!(applied, Money::from_minor(2000, USD));
    assert_eq!(cart.total_discount(), &Money::from_minor(2000, USD));
    assert_eq!(cart.final_price(), Money::from_minor(4000, USD));

    for item in cart.iter() {
        assert_eq!(item.unit_discount(), &Money::from_minor(0, USD));
    }

    Ok(())
}
