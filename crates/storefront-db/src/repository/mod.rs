//! # Repository Module
//!
//! Database repositories for the storefront checkout.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CouponService                                                          │
//! │       │                                                                 │
//! │       │  db.coupons().get_by_code("save10")                             │
//! │       │  db.ledger().user_facts(coupon_id, user_id)                     │
//! │       ▼                                                                 │
//! │  CouponRepository        OrderRepository        LedgerRepository        │
//! │  ├── insert              ├── create_pending     ├── user_facts          │
//! │  ├── update              ├── get_by_id          ├── usage_count         │
//! │  ├── delete              ├── confirm            ├── redemptions_for_user│
//! │  ├── get_by_id           ├── cancel             └── redeem (guarded)    │
//! │  ├── get_by_code         └── count_for_user                             │
//! │  └── list_public                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`coupon::CouponRepository`] - Coupon CRUD and lookup by code
//! - [`order::OrderRepository`] - Order lifecycle
//! - [`ledger::LedgerRepository`] - Usage facts and the atomic redeem

pub mod coupon;
pub mod ledger;
pub mod order;
