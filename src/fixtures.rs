//! Fixtures
//!
//! YAML definitions of coupon catalogs and carts, used by the demo and the
//! integration tests. Prices are `"AMOUNT CUR"` strings; percentages are
//! points (`value: 10` means 10% off).

use std::{fs, path::Path};

use decimal_percentage::Percentage;
use jiff::civil::DateTime;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    catalog::{CatalogError, CouponCatalog},
    coupons::{BxgyRule, Coupon, CouponError, CouponKind, DiscountValue},
    items::CartItem,
    products::ProductId,
};

/// Fixture parsing errors.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading a fixture file.
    #[error("failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format.
    #[error("invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Invalid coupon data.
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// Catalog construction error.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Cart construction error.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// A checkout scenario: a coupon catalog plus a cart.
#[derive(Debug, Deserialize)]
pub struct CheckoutFixture {
    /// ISO currency code for the cart.
    pub currency: String,

    /// Map of coupon code -> definition.
    pub coupons: FxHashMap<String, CouponFixture>,

    /// Cart line items.
    pub cart: Vec<ItemFixture>,
}

/// A cart line in YAML.
#[derive(Debug, Deserialize)]
pub struct ItemFixture {
    /// Product id.
    pub product: u64,

    /// Product name.
    pub name: String,

    /// Number of units.
    pub quantity: u32,

    /// Unit price (e.g., "12.50 USD").
    pub unit_price: String,
}

/// A coupon definition in YAML.
#[derive(Debug, Deserialize)]
pub struct CouponFixture {
    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Long description.
    #[serde(default)]
    pub description: String,

    /// Variant payload, tagged by `type`.
    #[serde(flatten)]
    pub kind: CouponKindFixture,

    /// Discount configuration.
    pub discount: DiscountFixture,

    /// Whether the coupon is switched on.
    #[serde(default = "default_active")]
    pub active: bool,

    /// Start of the validity window.
    #[serde(default)]
    pub valid_from: Option<DateTime>,

    /// End of the validity window.
    #[serde(default)]
    pub valid_until: Option<DateTime>,

    /// Minimum cart value (e.g., "100.00 USD").
    #[serde(default)]
    pub minimum_cart_value: Option<String>,

    /// Maximum number of uses.
    #[serde(default)]
    pub max_usage: Option<u32>,

    /// Uses so far.
    #[serde(default)]
    pub current_usage: u32,

    /// Cap on the discount per application (e.g., "20.00 USD").
    #[serde(default)]
    pub max_discount_amount: Option<String>,
}

/// Coupon variant payload in YAML.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouponKindFixture {
    /// Cart-wise coupon.
    CartWise,

    /// Product-wise coupon.
    ProductWise {
        /// Products the discount applies to.
        applicable_products: Vec<u64>,
    },

    /// Buy-x-get-y coupon.
    BuyXGetY {
        /// Prioritised rules.
        rules: Vec<BxgyRuleFixture>,

        /// Maximum number of rules that may contribute.
        #[serde(default = "default_repetition_limit")]
        repetition_limit: u32,
    },
}

/// A buy-x-get-y rule in YAML.
#[derive(Debug, Deserialize)]
pub struct BxgyRuleFixture {
    /// Units that must be bought.
    pub buy_quantity: u32,

    /// Products counting towards the buy requirement.
    pub buy_products: Vec<u64>,

    /// Units granted per application.
    pub get_quantity: u32,

    /// Products eligible to be granted.
    pub get_products: Vec<u64>,

    /// Evaluation priority; lower first.
    #[serde(default = "default_priority")]
    pub priority: u32,
}

/// Discount configuration in YAML.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountFixture {
    /// Percentage points (e.g., `value: 10` for 10% off).
    Percentage {
        /// Percentage points.
        value: f64,
    },

    /// Fixed amount (e.g., `value: "5.00 USD"`).
    FixedAmount {
        /// Amount string.
        value: String,
    },
}

fn default_active() -> bool {
    true
}

fn default_repetition_limit() -> u32 {
    1
}

fn default_priority() -> u32 {
    1
}

impl CheckoutFixture {
    /// Parse a fixture from YAML text.
    ///
    /// # Errors
    ///
    /// Returns a `FixtureError::Yaml` on malformed YAML.
    pub fn from_str(contents: &str) -> Result<Self, FixtureError> {
        Ok(serde_norway::from_str(contents)?)
    }

    /// Read and parse a fixture file.
    ///
    /// # Errors
    ///
    /// Returns a `FixtureError::Io` if the file cannot be read, or a
    /// `FixtureError::Yaml` on malformed YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let contents = fs::read_to_string(path)?;

        Self::from_str(&contents)
    }

    /// Build the coupon catalog and cart this fixture describes.
    ///
    /// # Errors
    ///
    /// Returns a `FixtureError` on invalid prices, unknown currencies,
    /// invalid coupon data, duplicate codes, or mixed-currency carts.
    pub fn into_catalog_and_cart(
        self,
    ) -> Result<(CouponCatalog<'static>, Cart<'static>), FixtureError> {
        let currency = parse_currency(&self.currency)?;

        let mut catalog = CouponCatalog::new();

        for (code, fixture) in self.coupons {
            let kind = fixture.kind.try_into_kind()?;
            let discount = fixture.discount.try_into_discount()?;

            let minimum = fixture
                .minimum_cart_value
                .as_deref()
                .map(parse_money)
                .transpose()?;

            let cap = fixture
                .max_discount_amount
                .as_deref()
                .map(parse_money)
                .transpose()?;

            catalog.insert(move |key| {
                let mut coupon = Coupon::new(key, code, kind, discount)
                    .with_name(fixture.name)
                    .with_description(fixture.description)
                    .with_active(fixture.active)
                    .with_validity(fixture.valid_from, fixture.valid_until)
                    .with_current_usage(fixture.current_usage);

                if let Some(minimum) = minimum {
                    coupon = coupon.with_minimum_cart_value(minimum);
                }

                if let Some(limit) = fixture.max_usage {
                    coupon = coupon.with_max_usage(limit);
                }

                if let Some(cap) = cap {
                    coupon = coupon.with_max_discount_amount(cap);
                }

                coupon
            })?;
        }

        let items: Vec<CartItem<'static>> = self
            .cart
            .into_iter()
            .map(|item| {
                let unit_price = parse_money(&item.unit_price)?;

                Ok(CartItem::new(
                    ProductId(item.product),
                    item.name,
                    item.quantity,
                    unit_price,
                ))
            })
            .collect::<Result<_, FixtureError>>()?;

        let cart = Cart::with_items(items, currency)?;

        Ok((catalog, cart))
    }
}

impl CouponKindFixture {
    /// Convert to a `CouponKind`.
    ///
    /// # Errors
    ///
    /// Returns a `FixtureError::Coupon` for invalid buy-x-get-y rules.
    fn try_into_kind(self) -> Result<CouponKind, FixtureError> {
        match self {
            CouponKindFixture::CartWise => Ok(CouponKind::CartWise),
            CouponKindFixture::ProductWise {
                applicable_products,
            } => Ok(CouponKind::ProductWise {
                applicable_products: applicable_products.into_iter().map(ProductId).collect(),
            }),
            CouponKindFixture::BuyXGetY {
                rules,
                repetition_limit,
            } => {
                let rules = rules
                    .into_iter()
                    .map(|rule| {
                        BxgyRule::new(
                            rule.buy_quantity,
                            rule.buy_products.into_iter().map(ProductId).collect(),
                            rule.get_quantity,
                            rule.get_products.into_iter().map(ProductId).collect(),
                            rule.priority,
                        )
                    })
                    .collect::<Result<SmallVec<_>, CouponError>>()?;

                Ok(CouponKind::BuyXGetY {
                    rules,
                    repetition_limit,
                })
            }
        }
    }
}

impl DiscountFixture {
    /// Convert to a `DiscountValue`.
    ///
    /// # Errors
    ///
    /// Returns a `FixtureError` for malformed amounts.
    fn try_into_discount(self) -> Result<DiscountValue<'static>, FixtureError> {
        match self {
            DiscountFixture::Percentage { value } => {
                Ok(DiscountValue::Percentage(Percentage::from(value / 100.0)))
            }
            DiscountFixture::FixedAmount { value } => {
                Ok(DiscountValue::FixedAmount(parse_money(&value)?))
            }
        }
    }
}

/// Parse a price string (e.g., "2.99 GBP") into money.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code is
/// not recognised.
pub fn parse_money(s: &str) -> Result<Money<'static, Currency>, FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = parse_currency(currency_code)?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Resolve an ISO currency code.
///
/// # Errors
///
/// Returns a `FixtureError::UnknownCurrency` for unsupported codes.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}
