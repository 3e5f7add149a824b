//! Checkout demo: load a fixture file, list the applicable coupons, apply
//! one, and print the receipt.

use clap::Parser;

use scrip::prelude::*;

/// Arguments for the checkout demo
#[derive(Debug, Parser)]
struct CheckoutArgs {
    /// Fixture file with coupons and a cart
    #[clap(short, long, default_value = "demos/checkout.yaml")]
    fixture: String,

    /// Coupon code to apply (defaults to the best applicable coupon)
    #[clap(short, long)]
    code: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CheckoutArgs::parse();

    let fixture = CheckoutFixture::from_path(&args.fixture)?;
    let (mut catalog, mut cart) = fixture.into_catalog_and_cart()?;
    let now = jiff::Zoned::now().datetime();

    let applicable = catalog.applicable_coupons(&cart, now);

    println!("Applicable coupons:");
    for candidate in &applicable {
        println!(
            "  {:<12} {:>10}  {}",
            candidate.code,
            candidate.discount.to_string(),
            candidate.description
        );
    }

    let key = match &args.code {
        Some(code) => catalog
            .find_by_code(code)
            .map(Coupon::key)
            .ok_or("unknown coupon code")?,
        None => applicable
            .first()
            .map(|candidate| candidate.key)
            .ok_or("no applicable coupons for this cart")?,
    };

    let coupon = catalog.get(key).cloned().ok_or("coupon disappeared")?;

    apply_coupon(&coupon, &mut cart, now)?;
    catalog.record_usage(key)?;

    println!("\n{}", receipt::render(&cart, Some(&coupon)));

    Ok(())
}
