//! # Usage Ledger Repository
//!
//! The counts the coupon engine consumes, and the one write path that moves
//! them.
//!
//! ## Reads vs the Authoritative Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  user_facts(coupon_id, user_id)          advisory, one read snapshot    │
//! │  ├── total_prior_orders  = confirmed orders of the user                 │
//! │  └── prior_redemptions   = redemption rows for (coupon, user)           │
//! │                                                                         │
//! │  redeem(order_id, user_id, applied)      authoritative, one transaction │
//! │  1. UPDATE coupons SET usage_count = usage_count + 1                    │
//! │        WHERE id = ? AND is_active = 1                                   │
//! │          AND (max_usage IS NULL OR usage_count < max_usage)             │
//! │        0 rows → ROLLBACK, Rejected(Inactive | UsageLimitReached)        │
//! │  2. UPDATE orders SET status = 'confirmed', ...                         │
//! │        WHERE id = ? AND user_id = ? AND status = 'pending'              │
//! │        0 rows → ROLLBACK, DbError::NotFound                             │
//! │  3. INSERT INTO coupon_redemptions SELECT ...                           │
//! │        WHERE per_user_limit IS NULL OR count(coupon, user) < limit      │
//! │        0 rows → ROLLBACK, Rejected(PerUserLimitReached)                 │
//! │  4. COMMIT → Redeemed(CouponRedemption)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Step 1 writes first so the transaction takes SQLite's write lock before
//! reading anything. Two checkouts racing for the last unit serialize on
//! that lock and the second sees the incremented count.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use storefront_core::{AppliedDiscount, CouponRedemption, Rejection, UserFacts};

/// Result of a redeem attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemOutcome {
    /// Usage counted, redemption recorded, order confirmed.
    Redeemed(CouponRedemption),
    /// A cap was reached between evaluation and confirmation. Nothing written.
    Rejected(Rejection),
}

impl RedeemOutcome {
    pub fn is_redeemed(&self) -> bool {
        matches!(self, RedeemOutcome::Redeemed(_))
    }
}

/// Repository for the coupon usage ledger.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Gathers the shopper facts for one coupon from a single snapshot.
    pub async fn user_facts(&self, coupon_id: &str, user_id: &str) -> DbResult<UserFacts> {
        let mut tx = self.pool.begin().await?;

        let total_prior_orders: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE user_id = ?1 AND status = 'confirmed'",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let prior_redemptions: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM coupon_redemptions WHERE coupon_id = ?1 AND user_id = ?2",
        )
        .bind(coupon_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(
            coupon_id = %coupon_id,
            user_id = %user_id,
            total_prior_orders,
            prior_redemptions,
            "Gathered user facts"
        );

        Ok(UserFacts::new(
            user_id,
            to_count(total_prior_orders),
            to_count(prior_redemptions),
        ))
    }

    /// Counts redemptions of a coupon across all shoppers.
    pub async fn usage_count(&self, coupon_id: &str) -> DbResult<u32> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM coupon_redemptions WHERE coupon_id = ?1")
                .bind(coupon_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(to_count(count))
    }

    /// Lists a shopper's redemptions, newest first.
    pub async fn redemptions_for_user(&self, user_id: &str) -> DbResult<Vec<CouponRedemption>> {
        let redemptions = sqlx::query_as::<_, CouponRedemption>(
            r#"
            SELECT id, coupon_id, user_id, order_id, discount_cents, redeemed_at
            FROM coupon_redemptions
            WHERE user_id = ?1
            ORDER BY redeemed_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(redemptions)
    }

    /// Atomically counts a coupon use and confirms the order.
    ///
    /// The caps are re-checked inside the transaction against the stored
    /// coupon, so an evaluation that was true a moment ago can still come
    /// back `Rejected` here.
    ///
    /// ## Errors
    /// - `DbError::NotFound` if the coupon is gone, or the order is not a
    ///   pending order of `user_id`
    pub async fn redeem(
        &self,
        order_id: &str,
        user_id: &str,
        applied: &AppliedDiscount,
    ) -> DbResult<RedeemOutcome> {
        let coupon_id = applied.coupon_id.as_str();
        let now = Utc::now();

        debug!(
            order_id = %order_id,
            coupon_id = %coupon_id,
            user_id = %user_id,
            "Redeeming coupon"
        );

        let mut tx = self.pool.begin().await?;

        // 1. Global cap
        let counted = sqlx::query(
            r#"
            UPDATE coupons SET
                usage_count = usage_count + 1,
                updated_at = ?2
            WHERE id = ?1
              AND is_active = 1
              AND (max_usage IS NULL OR usage_count < max_usage)
            "#,
        )
        .bind(coupon_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if counted.rows_affected() == 0 {
            let rejection = usage_guard_rejection(&mut tx, coupon_id).await?;
            tx.rollback().await?;
            warn!(coupon_id = %coupon_id, reason = %rejection, "Redeem rejected");
            return Ok(RedeemOutcome::Rejected(rejection));
        }

        // 2. Order must still be this shopper's pending order
        let confirmed = sqlx::query(
            r#"
            UPDATE orders SET
                status = 'confirmed',
                coupon_id = ?3,
                coupon_code = ?4,
                discount_cents = ?5,
                total_cents = ?6,
                confirmed_at = ?7
            WHERE id = ?1 AND user_id = ?2 AND status = 'pending'
            "#,
        )
        .bind(order_id)
        .bind(user_id)
        .bind(coupon_id)
        .bind(&applied.coupon_code)
        .bind(applied.discount_amount.cents())
        .bind(applied.final_total.cents())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if confirmed.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DbError::not_found("Order (pending)", order_id));
        }

        // 3. Per-user cap
        let redemption = CouponRedemption {
            id: Uuid::new_v4().to_string(),
            coupon_id: coupon_id.to_string(),
            user_id: user_id.to_string(),
            order_id: order_id.to_string(),
            discount_cents: applied.discount_amount.cents(),
            redeemed_at: now,
        };

        let recorded = sqlx::query(
            r#"
            INSERT INTO coupon_redemptions (
                id, coupon_id, user_id, order_id, discount_cents, redeemed_at
            )
            SELECT ?1, ?2, ?3, ?4, ?5, ?6
            WHERE (SELECT per_user_limit FROM coupons WHERE id = ?2) IS NULL
               OR (SELECT COUNT(*) FROM coupon_redemptions WHERE coupon_id = ?2 AND user_id = ?3)
                  < (SELECT per_user_limit FROM coupons WHERE id = ?2)
            "#,
        )
        .bind(&redemption.id)
        .bind(&redemption.coupon_id)
        .bind(&redemption.user_id)
        .bind(&redemption.order_id)
        .bind(redemption.discount_cents)
        .bind(redemption.redeemed_at)
        .execute(&mut *tx)
        .await?;

        if recorded.rows_affected() == 0 {
            let limit: Option<i64> =
                sqlx::query_scalar("SELECT per_user_limit FROM coupons WHERE id = ?1")
                    .bind(coupon_id)
                    .fetch_one(&mut *tx)
                    .await?;
            tx.rollback().await?;

            let rejection = Rejection::PerUserLimitReached {
                limit: limit.map(to_count).unwrap_or(0),
            };
            warn!(coupon_id = %coupon_id, user_id = %user_id, reason = %rejection, "Redeem rejected");
            return Ok(RedeemOutcome::Rejected(rejection));
        }

        tx.commit().await?;

        info!(
            order_id = %order_id,
            coupon_id = %coupon_id,
            discount = %applied.discount_amount,
            "Coupon redeemed"
        );

        Ok(RedeemOutcome::Redeemed(redemption))
    }
}

/// Works out which guard stopped the usage increment.
async fn usage_guard_rejection(
    tx: &mut Transaction<'_, Sqlite>,
    coupon_id: &str,
) -> DbResult<Rejection> {
    let row = sqlx::query_as::<_, (bool, Option<i64>)>(
        "SELECT is_active, max_usage FROM coupons WHERE id = ?1",
    )
    .bind(coupon_id)
    .fetch_optional(&mut **tx)
    .await?;

    match row {
        None => Err(DbError::not_found("Coupon", coupon_id)),
        Some((false, _)) => Ok(Rejection::Inactive),
        Some((true, max_usage)) => Ok(Rejection::UsageLimitReached {
            max_usage: max_usage.map(to_count).unwrap_or(0),
        }),
    }
}

fn to_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

// =============================================================================
// Unit Tests
// =============================================================================
