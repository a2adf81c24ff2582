//! # Checkout CLI
//!
//! Checks one coupon code against a cart file, for poking at a dev database.
//!
//! ## Usage
//! ```bash
//! # Cart file is a CartSnapshot as JSON
//! cargo run -p storefront-checkout --bin checkout -- \
//!     --code SAVE10 --user demo-user-001 --cart ./cart.json
//!
//! # Price the cart at an adjusted total (major units), e.g. after shipping
//! cargo run -p storefront-checkout --bin checkout -- \
//!     --code SAVE10 --cart ./cart.json --total 1249.50
//!
//! # List what the offers page would show
//! cargo run -p storefront-checkout --bin checkout -- --list
//! ```
//!
//! Database location and log filter come from the `STOREFRONT_*`
//! environment variables.

use chrono::Utc;
use std::env;
use std::fs;

use storefront_checkout::{init_tracing, CheckoutConfig, CouponService};
use storefront_core::{CartSnapshot, Money};
use storefront_db::Database;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut code: Option<String> = None;
    let mut user_id = String::from("guest");
    let mut cart_path: Option<String> = None;
    let mut total: Option<String> = None;
    let mut list = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--code" | "-c" => {
                if i + 1 < args.len() {
                    code = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--user" | "-u" => {
                if i + 1 < args.len() {
                    user_id = args[i + 1].clone();
                    i += 1;
                }
            }
            "--cart" => {
                if i + 1 < args.len() {
                    cart_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--total" | "-t" => {
                if i + 1 < args.len() {
                    total = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--list" | "-l" => list = true,
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let config = CheckoutConfig::load()?;
    init_tracing(&config);
    info!(db = %config.database_path.display(), "Configuration loaded");

    let db = Database::new(config.db_config()).await?;
    let service = CouponService::new(db);
    let now = Utc::now();

    if list {
        let coupons = service.public_coupons(now).await?;
        println!("{}", serde_json::to_string_pretty(&coupons)?);
        return Ok(());
    }

    let (Some(code), Some(cart_path)) = (code, cart_path) else {
        print_help();
        return Err("--code and --cart are required".into());
    };

    let mut cart: CartSnapshot = serde_json::from_str(&fs::read_to_string(&cart_path)?)?;
    if let Some(raw) = total {
        cart = CartSnapshot::with_total(cart.lines, Money::parse_major(&raw)?);
    }
    let result = service.validate(&code, &cart, &user_id, now).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    service.database().close().await;
    Ok(())
}

fn print_help() {
    println!("Storefront Checkout");
    println!();
    println!("Usage: checkout --code <CODE> --cart <FILE> [--user <ID>] [--total <AMOUNT>]");
    println!("       checkout --list");
    println!();
    println!("Options:");
    println!("  -c, --code <CODE>  Coupon code to check");
    println!("      --cart <FILE>  Cart snapshot JSON");
    println!("  -u, --user <ID>    Shopper id (default: guest)");
    println!("  -t, --total <AMT>  Override the cart total, e.g. 1249.50");
    println!("  -l, --list         Print the public coupon listing");
    println!("  -h, --help         Show this help message");
}
