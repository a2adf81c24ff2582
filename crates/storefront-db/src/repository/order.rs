//! # Order Repository
//!
//! Orders as far as the coupon ledger cares about them.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. CREATE                                                              │
//! │     └── create_pending() → Order { status: Pending }                    │
//! │                                                                         │
//! │  2a. CONFIRM WITHOUT COUPON                                             │
//! │     └── confirm() → Order { status: Confirmed }                         │
//! │                                                                         │
//! │  2b. CONFIRM WITH COUPON                                                │
//! │     └── LedgerRepository::redeem() → Confirmed + redemption row         │
//! │         (same transaction as the usage_count increment)                 │
//! │                                                                         │
//! │  2c. CANCEL                                                             │
//! │     └── cancel() → Order { status: Cancelled }                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only confirmed orders count toward a shopper's order history.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use storefront_core::{Money, Order, OrderStatus};

const ORDER_COLUMNS: &str = r#"
    id,
    user_id,
    status,
    coupon_id,
    coupon_code,
    subtotal_cents,
    discount_cents,
    total_cents,
    created_at,
    confirmed_at
"#;

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Starts a new order with no discount applied.
    pub async fn create_pending(&self, user_id: &str, subtotal: Money) -> DbResult<Order> {
        let order = Order {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            status: OrderStatus::Pending,
            coupon_id: None,
            coupon_code: None,
            subtotal_cents: subtotal.cents(),
            discount_cents: 0,
            total_cents: subtotal.cents(),
            created_at: Utc::now(),
            confirmed_at: None,
        };

        debug!(id = %order.id, user_id = %user_id, subtotal = %subtotal, "Creating order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, status, subtotal_cents, discount_cents, total_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(order.status)
        .bind(order.subtotal_cents)
        .bind(order.discount_cents)
        .bind(order.total_cents)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;

        Ok(order)
    }

    /// Confirms a pending order that carries no coupon.
    pub async fn confirm(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Confirming order");

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = 'confirmed',
                confirmed_at = ?2
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order (pending)", id));
        }

        Ok(())
    }

    /// Cancels a pending order.
    ///
    /// Confirmed orders are final; their redemptions stay counted.
    pub async fn cancel(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Cancelling order");

        let result = sqlx::query(
            "UPDATE orders SET status = 'cancelled' WHERE id = ?1 AND status = 'pending'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order (pending)", id));
        }

        Ok(())
    }

    /// Counts a shopper's confirmed orders.
    pub async fn count_for_user(&self, user_id: &str) -> DbResult<u32> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE user_id = ?1 AND status = 'confirmed'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
