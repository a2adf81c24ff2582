//! # Coupon Service
//!
//! The validate-coupon and redeem flows the storefront calls.
//!
//! ## Validate vs Redeem
//! ```text
//! validate(code, cart, user, now)          redeem(order, code, cart, user, now)
//!   │                                        │
//!   ├── coupons().get_by_code(code)          ├── orders().get_by_id(order)
//!   │     None ──► Rejected(NotFound)        │     owner + subtotal must match
//!   ├── ledger().user_facts(..)              ├── (same steps as validate,
//!   ├── evaluate(..)                         │    against fresh facts)
//!   └── CouponValidation                     ├── ledger().redeem(..)  guarded write
//!        (nothing written)                   └── CouponValidation
//! ```
//!
//! A rejection at any stage comes back as `Ok(CouponValidation { ok: false })`.
//! `Err(ApiError)` means a fault: bad cart data, storage trouble, or a
//! coupon variant the engine cannot price.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{ApiError, CheckoutResult};
use storefront_core::{
    evaluate, AppliedDiscount, CartSnapshot, Coupon, CouponDraft, DiscountKind, Evaluation,
    Money, Rejection, RejectionCode,
};
use storefront_db::{Database, RedeemOutcome};

// =============================================================================
// Response Shapes
// =============================================================================

/// Result of checking or redeeming a coupon code.
///
/// ```json
/// { "ok": false, "code": "SAVE10", "reason": "BELOW_MINIMUM_PURCHASE",
///   "message": "Add 100.00 more to use this coupon (minimum purchase 500.00)" }
///
/// { "ok": true, "code": "SAVE10", "message": "Coupon applied",
///   "discountAmount": 10000, "eligibleSubtotal": 100000, "finalTotal": 90000 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CouponValidation {
    pub ok: bool,

    /// The code as the shopper typed it, normalized when the coupon exists.
    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectionCode>,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<Money>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligible_subtotal: Option<Money>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_total: Option<Money>,
}

impl CouponValidation {
    fn accepted(applied: &AppliedDiscount) -> Self {
        CouponValidation {
            ok: true,
            code: applied.coupon_code.clone(),
            reason: None,
            message: "Coupon applied".to_string(),
            discount_amount: Some(applied.discount_amount),
            eligible_subtotal: Some(applied.eligible_subtotal),
            final_total: Some(applied.final_total),
        }
    }

    fn rejected(code: &str, rejection: &Rejection) -> Self {
        CouponValidation {
            ok: false,
            code: code.to_string(),
            reason: Some(rejection.code()),
            message: rejection.to_string(),
            discount_amount: None,
            eligible_subtotal: None,
            final_total: None,
        }
    }
}

/// A coupon as shown on the public offers page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PublicCoupon {
    pub code: String,
    pub description: Option<String>,
    pub discount: DiscountKind,
    pub min_purchase: Money,
    pub max_discount: Option<Money>,
    pub first_purchase_only: bool,
    #[ts(as = "Option<String>")]
    pub valid_until: Option<DateTime<Utc>>,
}

impl From<Coupon> for PublicCoupon {
    fn from(coupon: Coupon) -> Self {
        PublicCoupon {
            code: coupon.code,
            description: coupon.description,
            discount: coupon.discount,
            min_purchase: coupon.min_purchase,
            max_discount: coupon.max_discount,
            first_purchase_only: coupon.first_purchase_only,
            valid_until: coupon.valid_until,
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// Coupon flows over one database handle.
#[derive(Debug, Clone)]
pub struct CouponService {
    db: Database,
}

impl CouponService {
    pub fn new(db: Database) -> Self {
        CouponService { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Checks a code against a cart without writing anything.
    pub async fn validate(
        &self,
        code: &str,
        cart: &CartSnapshot,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> CheckoutResult<CouponValidation> {
        debug!(code = %code, user_id = %user_id, total = %cart.cart_total, "validate coupon");

        let evaluation = match self.evaluate_code(code, cart, user_id, now).await? {
            Ok(evaluation) => evaluation,
            Err(rejection) => return Ok(CouponValidation::rejected(code, &rejection)),
        };

        let response = match evaluation {
            Evaluation::Accepted(applied) => CouponValidation::accepted(&applied),
            Evaluation::Rejected(rejection) => CouponValidation::rejected(code, &rejection),
        };

        info!(
            code = %response.code,
            user_id = %user_id,
            ok = response.ok,
            reason = ?response.reason,
            "Coupon validated"
        );

        Ok(response)
    }

    /// Re-evaluates a code for a pending order and, when it still applies,
    /// counts the use and confirms the order in one transaction.
    ///
    /// ## Errors
    /// - `NOT_FOUND` if the order does not exist, is not `user_id`'s, or is
    ///   no longer pending
    /// - `VALIDATION_ERROR` if the cart total disagrees with the order
    pub async fn redeem(
        &self,
        order_id: &str,
        code: &str,
        cart: &CartSnapshot,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> CheckoutResult<CouponValidation> {
        debug!(order_id = %order_id, code = %code, user_id = %user_id, "redeem coupon");

        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .filter(|o| o.user_id == user_id)
            .ok_or_else(|| ApiError::not_found("Order", order_id))?;

        if order.subtotal() != cart.cart_total {
            return Err(ApiError::validation(format!(
                "Cart total {} does not match order subtotal {}",
                cart.cart_total,
                order.subtotal()
            )));
        }

        let applied = match self.evaluate_code(code, cart, user_id, now).await? {
            Ok(Evaluation::Accepted(applied)) => applied,
            Ok(Evaluation::Rejected(rejection)) | Err(rejection) => {
                info!(order_id = %order_id, code = %code, reason = %rejection, "Redeem refused");
                return Ok(CouponValidation::rejected(code, &rejection));
            }
        };

        match self.db.ledger().redeem(order_id, user_id, &applied).await? {
            RedeemOutcome::Redeemed(_) => Ok(CouponValidation::accepted(&applied)),
            RedeemOutcome::Rejected(rejection) => {
                Ok(CouponValidation::rejected(&applied.coupon_code, &rejection))
            }
        }
    }

    /// Coupons to advertise on the storefront right now.
    pub async fn public_coupons(&self, now: DateTime<Utc>) -> CheckoutResult<Vec<PublicCoupon>> {
        let coupons = self.db.coupons().list_public(now).await?;
        Ok(coupons.into_iter().map(PublicCoupon::from).collect())
    }

    // =========================================================================
    // Administration
    // =========================================================================

    /// Validates a draft and stores it as a new coupon.
    pub async fn create_coupon(
        &self,
        draft: CouponDraft,
        now: DateTime<Utc>,
    ) -> CheckoutResult<Coupon> {
        let coupon = draft.into_coupon(Uuid::new_v4().to_string(), now)?;
        let coupon = self.db.coupons().insert(&coupon).await?;

        info!(id = %coupon.id, code = %coupon.code, kind = %coupon.discount_type(), "Coupon created");
        Ok(coupon)
    }

    /// Replaces a coupon's settings. Usage so far is kept.
    pub async fn update_coupon(
        &self,
        id: &str,
        draft: CouponDraft,
        now: DateTime<Utc>,
    ) -> CheckoutResult<Coupon> {
        let existing = self
            .db
            .coupons()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Coupon", id))?;

        let coupon = draft.apply_to(&existing, now)?;
        self.db.coupons().update(&coupon).await?;

        info!(id = %coupon.id, code = %coupon.code, "Coupon updated");
        Ok(coupon)
    }

    pub async fn delete_coupon(&self, id: &str) -> CheckoutResult<()> {
        self.db.coupons().delete(id).await?;
        info!(id = %id, "Coupon deleted");
        Ok(())
    }

    /// Lookup, facts, engine. The inner `Err` is a missing code.
    async fn evaluate_code(
        &self,
        code: &str,
        cart: &CartSnapshot,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> CheckoutResult<Result<Evaluation, Rejection>> {
        let Some(coupon) = self.db.coupons().get_by_code(code).await? else {
            return Ok(Err(Rejection::NotFound {
                code: code.trim().to_string(),
            }));
        };

        let facts = self.db.ledger().user_facts(&coupon.id, user_id).await?;
        Ok(Ok(evaluate(&coupon, cart, &facts, now)?))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
