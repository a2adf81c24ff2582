//! # Coupon Repository
//!
//! Storage for admin-defined coupons.
//!
//! ## Row Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DiscountKind::Percentage { rate: 1000 }                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  discount_type   = 'percentage'        ← plain tag, readable in SQL     │
//! │  discount_params = '{"rate":1000}'     ← variant fields as JSON         │
//! │                                                                         │
//! │  Reading back:                                                          │
//! │  tag ──► DiscountType::from_str ──► unknown? DbError::CorruptRecord     │
//! │  tag + params ──► DiscountKind (serde) ──► bad JSON? CorruptRecord      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Codes are stored uppercase and looked up through the same
//! normalization, so `save10` finds `SAVE10`.
//!
//! `usage_count` is never written here. Only the ledger's redeem
//! transaction moves it.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use storefront_core::coupon::normalize_code;
use storefront_core::{Coupon, CoreError, DiscountKind, DiscountType, Money};

/// Field name carrying the variant tag inside a serialized `DiscountKind`.
const DISCOUNT_TAG: &str = "discount_type";

const COUPON_COLUMNS: &str = r#"
    id,
    code,
    description,
    discount_type,
    discount_params,
    min_purchase_cents,
    max_discount_cents,
    max_usage,
    usage_count,
    per_user_limit,
    valid_from,
    valid_until,
    applicable_categories,
    applicable_products,
    applicable_users,
    first_purchase_only,
    is_active,
    show_to_user,
    created_at,
    updated_at
"#;

// =============================================================================
// Row Mapping
// =============================================================================

/// A `coupons` row exactly as SQLite returns it.
#[derive(Debug, sqlx::FromRow)]
struct CouponRow {
    id: String,
    code: String,
    description: Option<String>,
    discount_type: String,
    discount_params: String,
    min_purchase_cents: i64,
    max_discount_cents: Option<i64>,
    max_usage: Option<i64>,
    usage_count: i64,
    per_user_limit: Option<i64>,
    valid_from: Option<DateTime<Utc>>,
    valid_until: Option<DateTime<Utc>>,
    applicable_categories: String,
    applicable_products: String,
    applicable_users: String,
    first_purchase_only: bool,
    is_active: bool,
    show_to_user: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CouponRow> for Coupon {
    type Error = DbError;

    fn try_from(row: CouponRow) -> DbResult<Self> {
        let id = row.id.as_str();
        let discount = decode_discount(id, &row.discount_type, &row.discount_params)?;

        Ok(Coupon {
            discount,
            code: row.code.clone(),
            description: row.description.clone(),
            min_purchase: Money::from_cents(row.min_purchase_cents),
            max_discount: row.max_discount_cents.map(Money::from_cents),
            max_usage: row
                .max_usage
                .map(|v| counter(id, "max_usage", v))
                .transpose()?,
            usage_count: counter(id, "usage_count", row.usage_count)?,
            per_user_limit: row
                .per_user_limit
                .map(|v| counter(id, "per_user_limit", v))
                .transpose()?,
            valid_from: row.valid_from,
            valid_until: row.valid_until,
            applicable_categories: decode_list(id, &row.applicable_categories)?,
            applicable_products: decode_list(id, &row.applicable_products)?,
            applicable_users: decode_list(id, &row.applicable_users)?,
            first_purchase_only: row.first_purchase_only,
            is_active: row.is_active,
            show_to_user: row.show_to_user,
            created_at: row.created_at,
            updated_at: row.updated_at,
            id: row.id,
        })
    }
}

/// Splits a discount variant into its tag and a JSON object of its fields.
fn encode_discount(kind: &DiscountKind) -> DbResult<(&'static str, String)> {
    let mut value = serde_json::to_value(kind).map_err(|e| DbError::Internal(e.to_string()))?;
    if let Some(fields) = value.as_object_mut() {
        fields.remove(DISCOUNT_TAG);
    }
    Ok((kind.discount_type().as_str(), value.to_string()))
}

/// Rebuilds a discount variant from its stored tag and parameters.
fn decode_discount(id: &str, tag: &str, params: &str) -> DbResult<DiscountKind> {
    let discount_type: DiscountType = tag
        .parse()
        .map_err(|e: CoreError| DbError::corrupt("coupon", id, e))?;

    let mut value: Value =
        serde_json::from_str(params).map_err(|e| DbError::corrupt("coupon", id, e))?;
    let fields = value
        .as_object_mut()
        .ok_or_else(|| DbError::corrupt("coupon", id, "discount_params is not a JSON object"))?;
    fields.insert(
        DISCOUNT_TAG.to_string(),
        Value::String(discount_type.as_str().to_string()),
    );

    serde_json::from_value(value).map_err(|e| DbError::corrupt("coupon", id, e))
}

fn encode_list(values: &[String]) -> DbResult<String> {
    serde_json::to_string(values).map_err(|e| DbError::Internal(e.to_string()))
}

fn decode_list(id: &str, raw: &str) -> DbResult<Vec<String>> {
    serde_json::from_str(raw).map_err(|e| DbError::corrupt("coupon", id, e))
}

fn counter(id: &str, field: &str, value: i64) -> DbResult<u32> {
    u32::try_from(value)
        .map_err(|_| DbError::corrupt("coupon", id, format!("{field} out of range: {value}")))
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for coupon database operations.
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    /// Creates a new CouponRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Gets a coupon by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Coupon>> {
        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE id = ?1");
        let row: Option<CouponRow> = sqlx::query_as::<_, CouponRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Coupon::try_from).transpose()
    }

    /// Gets a coupon by its shopper-facing code, case-insensitively.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let coupon = db.coupons().get_by_code(" save10 ").await?;
    /// assert_eq!(coupon.unwrap().code, "SAVE10");
    /// ```
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        let code = normalize_code(code);
        debug!(code = %code, "Looking up coupon");

        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE code = ?1");
        let row: Option<CouponRow> = sqlx::query_as::<_, CouponRow>(&sql)
            .bind(&code)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Coupon::try_from).transpose()
    }

    /// Lists coupons shoppers may browse: active, visible, and inside their
    /// validity window at `now`. Newest first.
    pub async fn list_public(&self, now: DateTime<Utc>) -> DbResult<Vec<Coupon>> {
        let sql = format!(
            "SELECT {COUPON_COLUMNS} FROM coupons \
             WHERE is_active = 1 AND show_to_user = 1 \
             ORDER BY created_at DESC, code ASC"
        );
        let rows: Vec<CouponRow> = sqlx::query_as::<_, CouponRow>(&sql).fetch_all(&self.pool).await?;

        let mut coupons = Vec::with_capacity(rows.len());
        for row in rows {
            let coupon = Coupon::try_from(row)?;
            if coupon.is_publicly_listed(now) {
                coupons.push(coupon);
            }
        }

        debug!(count = coupons.len(), "Listed public coupons");
        Ok(coupons)
    }

    /// Inserts a new coupon.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` when the code is already taken.
    pub async fn insert(&self, coupon: &Coupon) -> DbResult<Coupon> {
        debug!(id = %coupon.id, code = %coupon.code, "Inserting coupon");

        let (discount_type, discount_params) = encode_discount(&coupon.discount)?;

        sqlx::query(
            r#"
            INSERT INTO coupons (
                id, code, description, discount_type, discount_params,
                min_purchase_cents, max_discount_cents, max_usage, usage_count,
                per_user_limit, valid_from, valid_until,
                applicable_categories, applicable_products, applicable_users,
                first_purchase_only, is_active, show_to_user,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20
            )
            "#,
        )
        .bind(&coupon.id)
        .bind(&coupon.code)
        .bind(&coupon.description)
        .bind(discount_type)
        .bind(&discount_params)
        .bind(coupon.min_purchase.cents())
        .bind(coupon.max_discount.map(|m| m.cents()))
        .bind(coupon.max_usage.map(i64::from))
        .bind(i64::from(coupon.usage_count))
        .bind(coupon.per_user_limit.map(i64::from))
        .bind(coupon.valid_from)
        .bind(coupon.valid_until)
        .bind(encode_list(&coupon.applicable_categories)?)
        .bind(encode_list(&coupon.applicable_products)?)
        .bind(encode_list(&coupon.applicable_users)?)
        .bind(coupon.first_purchase_only)
        .bind(coupon.is_active)
        .bind(coupon.show_to_user)
        .bind(coupon.created_at)
        .bind(coupon.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_code(e, &coupon.code))?;

        Ok(coupon.clone())
    }

    /// Updates an existing coupon's definition.
    ///
    /// `usage_count` and `created_at` are left as stored.
    pub async fn update(&self, coupon: &Coupon) -> DbResult<()> {
        debug!(id = %coupon.id, code = %coupon.code, "Updating coupon");

        let (discount_type, discount_params) = encode_discount(&coupon.discount)?;

        let result = sqlx::query(
            r#"
            UPDATE coupons SET
                code = ?2,
                description = ?3,
                discount_type = ?4,
                discount_params = ?5,
                min_purchase_cents = ?6,
                max_discount_cents = ?7,
                max_usage = ?8,
                per_user_limit = ?9,
                valid_from = ?10,
                valid_until = ?11,
                applicable_categories = ?12,
                applicable_products = ?13,
                applicable_users = ?14,
                first_purchase_only = ?15,
                is_active = ?16,
                show_to_user = ?17,
                updated_at = ?18
            WHERE id = ?1
            "#,
        )
        .bind(&coupon.id)
        .bind(&coupon.code)
        .bind(&coupon.description)
        .bind(discount_type)
        .bind(&discount_params)
        .bind(coupon.min_purchase.cents())
        .bind(coupon.max_discount.map(|m| m.cents()))
        .bind(coupon.max_usage.map(i64::from))
        .bind(coupon.per_user_limit.map(i64::from))
        .bind(coupon.valid_from)
        .bind(coupon.valid_until)
        .bind(encode_list(&coupon.applicable_categories)?)
        .bind(encode_list(&coupon.applicable_products)?)
        .bind(encode_list(&coupon.applicable_users)?)
        .bind(coupon.first_purchase_only)
        .bind(coupon.is_active)
        .bind(coupon.show_to_user)
        .bind(coupon.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_code(e, &coupon.code))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", &coupon.id));
        }

        Ok(())
    }

    /// Deletes a coupon and its redemption rows.
    ///
    /// Orders keep their `coupon_code`; their `coupon_id` becomes NULL.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting coupon");

        let result = sqlx::query("DELETE FROM coupons WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", id));
        }

        Ok(())
    }

    /// Counts all coupons.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coupons")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Names the offending code in a UNIQUE failure.
fn duplicate_code(err: sqlx::Error, code: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => DbError::duplicate("code", code),
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::{Duration, TimeZone};
    use storefront_core::{CouponDraft, Percentage, PriceTier};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 9, 30, 0).unwrap()
    }

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn save10(id: &str) -> Coupon {
        CouponDraft::percentage("SAVE10", 1000)
            .min_purchase(Money::from_major(500))
            .max_discount(Money::from_major(100))
            .into_coupon(id, now())
            .unwrap()
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let db = setup().await;
        db.coupons().insert(&save10("c-1")).await.unwrap();

        let found = db.coupons().get_by_code("save10").await.unwrap().unwrap();
        assert_eq!(found.id, "c-1");
        assert_eq!(found, save10("c-1"));

        assert!(db.coupons().get_by_code(" Save10 ").await.unwrap().is_some());
        assert!(db.coupons().get_by_code("SAVE20").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_every_field_survives_storage() {
        let db = setup().await;
        let coupon = CouponDraft::new(
            "TIERS",
            DiscountKind::TierPricing {
                tiers: vec![
                    PriceTier {
                        min_quantity: 3,
                        rate: Percentage::from_percent(5),
                    },
                    PriceTier {
                        min_quantity: 10,
                        rate: Percentage::from_percent(15),
                    },
                ],
            },
        )
        .description("Bulk pricing")
        .max_usage(50)
        .per_user_limit(None)
        .valid_from(now())
        .valid_until(now() + Duration::days(30))
        .categories(["kurta", "shawl"])
        .products(["p-9"])
        .users(["u-1", "u-2"])
        .first_purchase_only(true)
        .show_to_user(true)
        .into_coupon("c-tiers", now())
        .unwrap();

        db.coupons().insert(&coupon).await.unwrap();
        let stored = db.coupons().get_by_id("c-tiers").await.unwrap().unwrap();
        assert_eq!(stored, coupon);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = setup().await;
        db.coupons().insert(&save10("c-1")).await.unwrap();

        match db.coupons().insert(&save10("c-2")).await {
            Err(DbError::UniqueViolation { field, value }) => {
                assert_eq!(field, "code");
                assert_eq!(value, "SAVE10");
            }
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_keeps_usage_count() {
        let db = setup().await;
        let original = save10("c-1");
        db.coupons().insert(&original).await.unwrap();
        sqlx::query("UPDATE coupons SET usage_count = 7 WHERE id = 'c-1'")
            .execute(db.pool())
            .await
            .unwrap();

        let stored = db.coupons().get_by_id("c-1").await.unwrap().unwrap();
        let edited = CouponDraft::fixed("SAVE10", Money::from_major(75))
            .active(false)
            .apply_to(&stored, now() + Duration::hours(1))
            .unwrap();
        db.coupons().update(&edited).await.unwrap();

        let reloaded = db.coupons().get_by_id("c-1").await.unwrap().unwrap();
        assert_eq!(reloaded.usage_count, 7);
        assert_eq!(reloaded.discount_type(), DiscountType::Fixed);
        assert!(!reloaded.is_active);
        assert_eq!(reloaded.created_at, original.created_at);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let db = setup().await;
        assert!(matches!(
            db.coupons().update(&save10("ghost")).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            db.coupons().delete("ghost").await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = setup().await;
        db.coupons().insert(&save10("c-1")).await.unwrap();
        db.coupons().delete("c-1").await.unwrap();

        assert!(db.coupons().get_by_id("c-1").await.unwrap().is_none());
        assert_eq!(db.coupons().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_public() {
        let db = setup().await;
        let visible = CouponDraft::percentage("VISIBLE", 500)
            .show_to_user(true)
            .into_coupon("c-visible", now())
            .unwrap();
        let hidden = CouponDraft::percentage("HIDDEN", 500)
            .into_coupon("c-hidden", now())
            .unwrap();
        let expired = CouponDraft::percentage("EXPIRED", 500)
            .show_to_user(true)
            .valid_until(now() - Duration::days(1))
            .into_coupon("c-expired", now() - Duration::days(10))
            .unwrap();
        let inactive = CouponDraft::percentage("OFF", 500)
            .show_to_user(true)
            .active(false)
            .into_coupon("c-off", now())
            .unwrap();

        for coupon in [&visible, &hidden, &expired, &inactive] {
            db.coupons().insert(coupon).await.unwrap();
        }

        let listed = db.coupons().list_public(now()).await.unwrap();
        let codes: Vec<&str> = listed.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["VISIBLE"]);
    }

    #[tokio::test]
    async fn test_unknown_discount_type_is_corrupt_record() {
        let db = setup().await;
        db.coupons().insert(&save10("c-1")).await.unwrap();
        sqlx::query("UPDATE coupons SET discount_type = 'bogo' WHERE id = 'c-1'")
            .execute(db.pool())
            .await
            .unwrap();

        match db.coupons().get_by_code("SAVE10").await {
            Err(DbError::CorruptRecord { id, reason, .. }) => {
                assert_eq!(id, "c-1");
                assert!(reason.contains("bogo"));
            }
            other => panic!("expected CorruptRecord, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_params_is_corrupt_record() {
        let db = setup().await;
        db.coupons().insert(&save10("c-1")).await.unwrap();
        sqlx::query("UPDATE coupons SET discount_params = '[1,2]' WHERE id = 'c-1'")
            .execute(db.pool())
            .await
            .unwrap();

        assert!(matches!(
            db.coupons().get_by_id("c-1").await,
            Err(DbError::CorruptRecord { .. })
        ));
    }

    #[test]
    fn test_discount_encoding() {
        let (tag, params) = encode_discount(&DiscountKind::Fixed {
            amount: Money::from_cents(2_500),
        })
        .unwrap();
        assert_eq!(tag, "fixed");
        assert_eq!(params, r#"{"amount":2500}"#);

        let back = decode_discount("c", tag, &params).unwrap();
        assert_eq!(
            back,
            DiscountKind::Fixed {
                amount: Money::from_cents(2_500)
            }
        );
    }
}
