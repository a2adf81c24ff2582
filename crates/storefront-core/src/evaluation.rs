//! # Coupon Evaluation
//!
//! The single entry point callers use: eligibility, then arithmetic.
//!
//! ## Result Channels
//! ```text
//! evaluate(coupon, cart, facts, now)
//!      │
//!      ├── Err(CoreError)                  fault: bad cart data, unknown or
//!      │                                   unsupported discount variant
//!      │
//!      ├── Ok(Evaluation::Rejected(r))     expected: shopper sees r's message
//!      │
//!      └── Ok(Evaluation::Accepted(a))     discount, eligible subtotal,
//!                                          final total = max(0, total - discount)
//! ```
//!
//! Evaluation is advisory. It reserves nothing; the ledger's redeem path
//! re-checks the caps atomically when the order is confirmed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

use crate::cart::CartSnapshot;
use crate::coupon::Coupon;
use crate::discount::calculate_discount;
use crate::eligibility::{check_eligibility, Rejection, UserFacts};
use crate::error::CoreResult;
use crate::money::Money;

/// A coupon that applies, with the amounts to show and charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct AppliedDiscount {
    pub coupon_id: String,
    pub coupon_code: String,
    pub eligible_subtotal: Money,
    pub discount_amount: Money,
    pub final_total: Money,
}

/// Outcome of evaluating a coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Evaluation {
    Accepted(AppliedDiscount),
    Rejected(Rejection),
}

impl Evaluation {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Evaluation::Accepted(_))
    }

    pub fn applied(&self) -> Option<&AppliedDiscount> {
        match self {
            Evaluation::Accepted(applied) => Some(applied),
            Evaluation::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Evaluation::Accepted(_) => None,
            Evaluation::Rejected(rejection) => Some(rejection),
        }
    }

    /// Converts to a Result, with a rejection becoming the error.
    pub fn into_result(self) -> Result<AppliedDiscount, Rejection> {
        match self {
            Evaluation::Accepted(applied) => Ok(applied),
            Evaluation::Rejected(rejection) => Err(rejection),
        }
    }
}

/// Checks eligibility and, when every check passes, computes the discount.
///
/// Pure and deterministic: the same inputs always give the same output.
pub fn evaluate(
    coupon: &Coupon,
    cart: &CartSnapshot,
    facts: &UserFacts,
    now: DateTime<Utc>,
) -> CoreResult<Evaluation> {
    cart.validate()?;

    if let Err(rejection) = check_eligibility(coupon, cart, facts, now) {
        return Ok(Evaluation::Rejected(rejection));
    }

    let breakdown = calculate_discount(coupon, cart)?;
    let final_total = (cart.cart_total - breakdown.discount).clamp_non_negative();

    Ok(Evaluation::Accepted(AppliedDiscount {
        coupon_id: coupon.id.clone(),
        coupon_code: coupon.code.clone(),
        eligible_subtotal: breakdown.eligible_subtotal,
        discount_amount: breakdown.discount,
        final_total,
    }))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartLine;
    use crate::coupon::{CouponDraft, DiscountKind};
    use crate::error::CoreError;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 15, 18, 0, 0).unwrap()
    }

    fn save10() -> Coupon {
        CouponDraft::percentage("SAVE10", 1000)
            .min_purchase(Money::from_major(500))
            .max_discount(Money::from_major(100))
            .into_coupon("coupon-save10", now())
            .unwrap()
    }

    fn cart_worth(major: i64) -> CartSnapshot {
        CartSnapshot::from_lines(vec![CartLine::new("p-1", Money::from_major(major), 1)])
    }

    #[test]
    fn test_save10_accepted() {
        let result = evaluate(&save10(), &cart_worth(1000), &UserFacts::new("u-1", 4, 0), now()).unwrap();
        let applied = result.applied().unwrap();
        assert_eq!(applied.coupon_code, "SAVE10");
        assert_eq!(applied.discount_amount, Money::from_major(100));
        assert_eq!(applied.eligible_subtotal, Money::from_major(1000));
        assert_eq!(applied.final_total, Money::from_major(900));
    }

    #[test]
    fn test_save10_below_minimum() {
        let result = evaluate(&save10(), &cart_worth(400), &UserFacts::new("u-1", 4, 0), now()).unwrap();
        assert!(!result.is_accepted());
        assert!(matches!(
            result.rejection(),
            Some(Rejection::BelowMinimumPurchase { .. })
        ));
    }

    #[test]
    fn test_final_total_never_negative() {
        let coupon = CouponDraft::fixed("ALLOFF", Money::from_major(50))
            .into_coupon("c", now())
            .unwrap();
        let applied = evaluate(&coupon, &cart_worth(20), &UserFacts::first_time("u"), now())
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(applied.discount_amount, Money::from_major(20));
        assert_eq!(applied.final_total, Money::zero());
    }

    #[test]
    fn test_invalid_cart_is_fault() {
        let cart = CartSnapshot::from_lines(vec![CartLine::new("p", Money::from_major(10), 0)]);
        assert!(matches!(
            evaluate(&save10(), &cart, &UserFacts::first_time("u"), now()),
            Err(CoreError::InvalidCart { .. })
        ));
    }

    #[test]
    fn test_overflowing_line_total_is_fault() {
        let coupon = CouponDraft::percentage("KURTA", 1000)
            .categories(["c1"])
            .into_coupon("c", now())
            .unwrap();
        let cart = CartSnapshot::with_total(
            vec![CartLine::new("p", Money::from_cents(i64::MAX / 2), 3).with_category("c1")],
            Money::from_cents(1_000),
        );

        assert!(matches!(
            evaluate(&coupon, &cart, &UserFacts::first_time("u"), now()),
            Err(CoreError::InvalidCart { .. })
        ));
    }

    #[test]
    fn test_unsupported_variant_is_fault_not_zero() {
        let coupon = CouponDraft::new(
            "B2G1",
            DiscountKind::BuyXGetYFree {
                buy_quantity: 2,
                free_quantity: 1,
            },
        )
        .into_coupon("c", now())
        .unwrap();

        let cart = CartSnapshot::from_lines(vec![CartLine::new("p", Money::from_major(10), 3)]);
        assert!(matches!(
            evaluate(&coupon, &cart, &UserFacts::first_time("u"), now()),
            Err(CoreError::UnsupportedDiscountType(_))
        ));

        // Below the quantity gate it is an ordinary rejection
        let small = CartSnapshot::from_lines(vec![CartLine::new("p", Money::from_major(10), 1)]);
        let result = evaluate(&coupon, &small, &UserFacts::first_time("u"), now()).unwrap();
        assert!(matches!(
            result.rejection(),
            Some(Rejection::QuantityRequirementNotMet { required: 3, actual: 1 })
        ));
    }

    #[test]
    fn test_deterministic() {
        let cart = cart_worth(777);
        let facts = UserFacts::new("u-1", 1, 0);
        let first = evaluate(&save10(), &cart, &facts, now()).unwrap();
        for _ in 0..10 {
            assert_eq!(evaluate(&save10(), &cart, &facts, now()).unwrap(), first);
        }
    }

    #[test]
    fn test_serialized_outcome_tag() {
        let result = evaluate(&save10(), &cart_worth(1000), &UserFacts::first_time("u"), now()).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["outcome"], "accepted");
        assert_eq!(json["discount_amount"], 10_000);

        let result = evaluate(&save10(), &cart_worth(10), &UserFacts::first_time("u"), now()).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["outcome"], "rejected");
        assert_eq!(json["reason"], "below_minimum_purchase");
    }
}
