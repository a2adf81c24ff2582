//! # storefront-core: Pure Coupon Engine
//!
//! This crate decides whether a coupon applies to a cart and how much it
//! takes off. Every function is pure: the caller supplies the coupon
//! snapshot, the cart, the shopper's order-history facts and the current time.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Storefront Checkout Architecture                    │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              storefront-checkout (CouponService)                │   │
//! │  │     lookup coupon ──► gather UserFacts ──► evaluate ──► map     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ storefront-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌─────────────┐  ┌──────────┐  │   │
//! │  │   │  coupon   │  │   cart    │  │ eligibility │  │ discount │  │   │
//! │  │   │  Coupon   │  │ CartLine  │  │  9 ordered  │  │ eligible │  │   │
//! │  │   │  Draft    │  │ Snapshot  │  │   checks    │  │ subtotal │  │   │
//! │  │   └───────────┘  └───────────┘  └─────────────┘  └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             storefront-db (coupons, orders, ledger)             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic
//! - [`coupon`] - Coupon definitions and the discount sum type
//! - [`cart`] - Cart lines, variant attributes, cart snapshot
//! - [`eligibility`] - Ordered eligibility checks and rejection reasons
//! - [`discount`] - Eligible subtotal and discount arithmetic
//! - [`evaluation`] - The combined `evaluate` entry point
//! - [`types`] - Orders and redemption records shared with the db layer
//! - [`validation`] - Admin-side field validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use storefront_core::{evaluate, CartLine, CartSnapshot, CouponDraft, Evaluation, Money, UserFacts};
//!
//! let now = Utc::now();
//! let coupon = CouponDraft::percentage("save10", 1000)
//!     .min_purchase(Money::from_cents(50_000))
//!     .max_discount(Money::from_cents(10_000))
//!     .into_coupon("coupon-1", now)
//!     .unwrap();
//!
//! let cart = CartSnapshot::from_lines(vec![CartLine::new("p-1", Money::from_cents(100_000), 1)]);
//! let facts = UserFacts::new("user-1", 3, 0);
//!
//! match evaluate(&coupon, &cart, &facts, now).unwrap() {
//!     Evaluation::Accepted(applied) => assert_eq!(applied.final_total.cents(), 90_000),
//!     Evaluation::Rejected(reason) => panic!("unexpected rejection: {reason}"),
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod coupon;
pub mod discount;
pub mod eligibility;
pub mod error;
pub mod evaluation;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartSnapshot, VariantAttributes};
pub use coupon::{Coupon, CouponDraft, DiscountKind, DiscountType, Percentage, PriceTier};
pub use discount::{calculate_discount, eligible_subtotal, DiscountBreakdown};
pub use eligibility::{check_eligibility, Rejection, RejectionCode, UserFacts};
pub use error::{CoreError, CoreResult, ValidationError};
pub use evaluation::{evaluate, AppliedDiscount, Evaluation};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: u32 = 999;

/// Default number of times one shopper may redeem the same coupon.
pub const DEFAULT_PER_USER_LIMIT: u32 = 1;
