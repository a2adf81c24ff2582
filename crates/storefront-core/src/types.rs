//! # Order Types
//!
//! Records the usage ledger is built from. The engine never reads these
//! directly; the db layer aggregates them into [`crate::UserFacts`].
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌─────────────────┐        ┌──────────────────────┐                    │
//! │  │     Order       │ 1 ── 0..1 │  CouponRedemption  │                    │
//! │  │  ─────────────  │        │  ──────────────────  │                    │
//! │  │  id (UUID)      │        │  id (UUID)           │                    │
//! │  │  user_id        │        │  coupon_id (FK)      │                    │
//! │  │  coupon_code    │        │  order_id (FK)       │                    │
//! │  │  status         │        │  discount_cents      │                    │
//! │  └─────────────────┘        └──────────────────────┘                    │
//! │                                                                         │
//! │  OrderStatus: Pending ──► Confirmed                                     │
//! │                  └──────► Cancelled                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only confirmed orders count as prior orders, and a redemption row exists
//! only for a confirmed order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Checkout started, payment not yet captured.
    Pending,
    /// Paid. Counts toward usage caps and first-purchase checks.
    Confirmed,
    /// Abandoned or refunded before confirmation.
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Order
// =============================================================================

/// A shopper's order as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub status: OrderStatus,
    /// Coupon applied at confirmation, if any.
    pub coupon_id: Option<String>,
    pub coupon_code: Option<String>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == OrderStatus::Confirmed
    }
}

// =============================================================================
// Coupon Redemption
// =============================================================================

/// One use of a coupon by one shopper on one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CouponRedemption {
    pub id: String,
    pub coupon_id: String,
    pub user_id: String,
    pub order_id: String,
    pub discount_cents: i64,
    #[ts(as = "String")]
    pub redeemed_at: DateTime<Utc>,
}

impl CouponRedemption {
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_serialization() {
        assert_eq!(serde_json::to_string(&OrderStatus::Confirmed).unwrap(), "\"confirmed\"");
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_order_money_accessors() {
        let order = Order {
            id: "o-1".to_string(),
            user_id: "u-1".to_string(),
            status: OrderStatus::Confirmed,
            coupon_id: None,
            coupon_code: None,
            subtotal_cents: 100_000,
            discount_cents: 10_000,
            total_cents: 90_000,
            created_at: Utc::now(),
            confirmed_at: None,
        };
        assert_eq!(order.total(), order.subtotal() - order.discount());
        assert!(order.is_confirmed());
    }
}
