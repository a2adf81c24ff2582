//! # Seed Data Generator
//!
//! Populates the database with demo coupons and order history for
//! development.
//!
//! ## Usage
//! ```bash
//! # Default database, 20 demo shoppers
//! cargo run -p storefront-db --bin seed
//!
//! # Custom shopper count and database path
//! cargo run -p storefront-db --bin seed -- --users 200 --db ./data/storefront.db
//! ```
//!
//! ## Generated Data
//! - One coupon of every discount variant, including the bundle variants
//!   that evaluate to `UnsupportedDiscountType`
//! - Restricted coupons (category, product, user allow-lists)
//! - An expired coupon and a not-yet-active one
//! - Confirmed orders for every other shopper, so first-purchase coupons
//!   have someone to reject

use chrono::{Duration, Utc};
use std::env;
use storefront_core::{CouponDraft, DiscountKind, Money, Percentage, PriceTier};
use storefront_db::{Database, DbConfig};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut users: usize = 20;
    let mut db_path = String::from("./storefront_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--users" | "-u" => {
                if i + 1 < args.len() {
                    users = args[i + 1].parse().unwrap_or(20);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Storefront Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -u, --users <N>    Number of demo shoppers (default: 20)");
                println!("  -d, --db <PATH>    Database file path (default: ./storefront_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Storefront Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Shoppers: {}", users);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db.coupons().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} coupons", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();
    let mut created = 0;
    for draft in demo_coupons(now) {
        let coupon = draft.into_coupon(Uuid::new_v4().to_string(), now)?;
        match db.coupons().insert(&coupon).await {
            Ok(_) => {
                println!("  + {:<14} {}", coupon.code, coupon.discount_type());
                created += 1;
            }
            Err(e) => eprintln!("Failed to insert {}: {}", coupon.code, e),
        }
    }
    println!("✓ Created {} coupons", created);

    let mut confirmed = 0;
    for n in 0..users {
        let user_id = format!("demo-user-{:03}", n);
        // Odd shoppers stay first-time buyers
        if n % 2 == 1 {
            continue;
        }
        let subtotal = Money::from_cents(1_999 + (n as i64 * 731) % 25_000);
        let order = db.orders().create_pending(&user_id, subtotal).await?;
        db.orders().confirm(&order.id).await?;
        confirmed += 1;
    }
    println!("✓ Confirmed {} past orders", confirmed);

    let public = db.coupons().list_public(now).await?;
    println!("  Public listing: {} coupons", public.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// One coupon per scenario the checkout has to handle.
fn demo_coupons(now: chrono::DateTime<Utc>) -> Vec<CouponDraft> {
    vec![
        CouponDraft::percentage("SAVE10", 1000)
            .description("10% off orders over 500")
            .min_purchase(Money::from_major(500))
            .max_discount(Money::from_major(100))
            .show_to_user(true),
        CouponDraft::fixed("FLAT250", Money::from_major(250))
            .description("250 off, limited run")
            .max_usage(100)
            .show_to_user(true),
        CouponDraft::percentage("WELCOME15", 1500)
            .description("First order only")
            .first_purchase_only(true)
            .show_to_user(true),
        CouponDraft::percentage("KURTA20", 2000)
            .description("20% off kurtas")
            .categories(["kurta"]),
        CouponDraft::fixed("VIP500", Money::from_major(500))
            .description("Private offer")
            .users(["demo-user-000", "demo-user-002"])
            .per_user_limit(None),
        CouponDraft::percentage("SUMMER", 1200)
            .description("Ended last month")
            .valid_from(now - Duration::days(90))
            .valid_until(now - Duration::days(30))
            .show_to_user(true),
        CouponDraft::percentage("EID", 1800)
            .description("Starts next week")
            .valid_from(now + Duration::days(7))
            .show_to_user(true),
        CouponDraft::new(
            "BUY3FOR999",
            DiscountKind::BuyXForY {
                required_quantity: 3,
                price: Money::from_major(999),
            },
        ),
        CouponDraft::new(
            "B2G1",
            DiscountKind::BuyXGetYFree {
                buy_quantity: 2,
                free_quantity: 1,
            },
        ),
        CouponDraft::new(
            "BULK",
            DiscountKind::TierPricing {
                tiers: vec![
                    PriceTier {
                        min_quantity: 5,
                        rate: Percentage::from_percent(5),
                    },
                    PriceTier {
                        min_quantity: 10,
                        rate: Percentage::from_percent(12),
                    },
                ],
            },
        ),
    ]
}
