//! # Eligibility Checker
//!
//! Decides whether a coupon may be applied to a cart for a shopper.
//!
//! ## Check Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  check_eligibility(coupon, cart, facts, now)                            │
//! │                                                                         │
//! │   1. active flag ........................ Inactive                      │
//! │   2. validity window .................... NotYetActive / Expired        │
//! │   3. global usage cap ................... UsageLimitReached             │
//! │   4. per-user cap ....................... PerUserLimitReached           │
//! │   5. minimum purchase ................... BelowMinimumPurchase          │
//! │   6. first purchase only ................ NotFirstPurchase              │
//! │   7. quantity preconditions ............. QuantityRequirementNotMet     │
//! │   8. user allow-list .................... UserNotEligible               │
//! │   9. product / category allow-list ...... NoEligibleItems               │
//! │                                                                         │
//! │  First failure wins. The checks are independent predicates, so the     │
//! │  order only decides which message the shopper sees.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `NotFound` is raised by the caller before the engine runs: there is no
//! coupon to check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::cart::CartSnapshot;
use crate::coupon::Coupon;
use crate::money::Money;

// =============================================================================
// User Facts
// =============================================================================

/// What the order store knows about the shopper, queried by the caller.
///
/// The engine treats the counts as opaque; they must come from one
/// consistent snapshot (see `storefront_db::LedgerRepository::user_facts`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserFacts {
    pub user_id: String,
    /// Orders the shopper has placed before, any coupon.
    pub total_prior_orders: u32,
    /// Orders the shopper has placed before with this coupon.
    pub prior_redemptions: u32,
}

impl UserFacts {
    pub fn new(user_id: impl Into<String>, total_prior_orders: u32, prior_redemptions: u32) -> Self {
        UserFacts {
            user_id: user_id.into(),
            total_prior_orders,
            prior_redemptions,
        }
    }

    /// A shopper with no order history.
    pub fn first_time(user_id: impl Into<String>) -> Self {
        Self::new(user_id, 0, 0)
    }
}

// =============================================================================
// Rejections
// =============================================================================

/// Why a coupon does not apply.
///
/// This is an expected outcome, not a fault: it travels in the `Ok` side of
/// [`crate::evaluate`] and its `Display` text is shown to the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    #[error("Coupon code {code} was not found")]
    NotFound { code: String },

    #[error("This coupon is no longer active")]
    Inactive,

    #[error("This coupon is not active until {valid_from}")]
    NotYetActive { valid_from: DateTime<Utc> },

    #[error("This coupon expired on {valid_until}")]
    Expired { valid_until: DateTime<Utc> },

    #[error("This coupon has reached its usage limit of {max_usage}")]
    UsageLimitReached { max_usage: u32 },

    #[error("You have already used this coupon the maximum of {limit} time(s)")]
    PerUserLimitReached { limit: u32 },

    #[error("Add {shortfall} more to use this coupon (minimum purchase {minimum})")]
    BelowMinimumPurchase {
        minimum: Money,
        cart_total: Money,
        shortfall: Money,
    },

    #[error("This coupon is only valid on your first order")]
    NotFirstPurchase,

    #[error("This coupon needs at least {required} items in the cart (you have {actual})")]
    QuantityRequirementNotMet { required: u32, actual: u32 },

    #[error("This coupon is not available for your account")]
    UserNotEligible,

    #[error("None of the items in your cart are eligible for this coupon")]
    NoEligibleItems,
}

/// Machine-readable rejection codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionCode {
    NotFound,
    Inactive,
    NotYetActive,
    Expired,
    UsageLimitReached,
    PerUserLimitReached,
    BelowMinimumPurchase,
    NotFirstPurchase,
    QuantityRequirementNotMet,
    UserNotEligible,
    NoEligibleItems,
}

impl Rejection {
    pub fn code(&self) -> RejectionCode {
        match self {
            Rejection::NotFound { .. } => RejectionCode::NotFound,
            Rejection::Inactive => RejectionCode::Inactive,
            Rejection::NotYetActive { .. } => RejectionCode::NotYetActive,
            Rejection::Expired { .. } => RejectionCode::Expired,
            Rejection::UsageLimitReached { .. } => RejectionCode::UsageLimitReached,
            Rejection::PerUserLimitReached { .. } => RejectionCode::PerUserLimitReached,
            Rejection::BelowMinimumPurchase { .. } => RejectionCode::BelowMinimumPurchase,
            Rejection::NotFirstPurchase => RejectionCode::NotFirstPurchase,
            Rejection::QuantityRequirementNotMet { .. } => RejectionCode::QuantityRequirementNotMet,
            Rejection::UserNotEligible => RejectionCode::UserNotEligible,
            Rejection::NoEligibleItems => RejectionCode::NoEligibleItems,
        }
    }
}

type CheckResult = Result<(), Rejection>;

// =============================================================================
// Checks
// =============================================================================

/// Runs the nine eligibility checks in order; the first failure is returned.
pub fn check_eligibility(
    coupon: &Coupon,
    cart: &CartSnapshot,
    facts: &UserFacts,
    now: DateTime<Utc>,
) -> CheckResult {
    check_active(coupon)?;
    check_window(coupon, now)?;
    check_global_usage(coupon)?;
    check_per_user(coupon, facts)?;
    check_min_purchase(coupon, cart)?;
    check_first_purchase(coupon, facts)?;
    check_quantity(coupon, cart)?;
    check_user_allowed(coupon, facts)?;
    check_items(coupon, cart)
}

fn check_active(coupon: &Coupon) -> CheckResult {
    if coupon.is_active {
        Ok(())
    } else {
        Err(Rejection::Inactive)
    }
}

// Both bounds are inclusive.
fn check_window(coupon: &Coupon, now: DateTime<Utc>) -> CheckResult {
    if let Some(valid_from) = coupon.valid_from {
        if now < valid_from {
            return Err(Rejection::NotYetActive { valid_from });
        }
    }
    if let Some(valid_until) = coupon.valid_until {
        if now > valid_until {
            return Err(Rejection::Expired { valid_until });
        }
    }
    Ok(())
}

fn check_global_usage(coupon: &Coupon) -> CheckResult {
    match coupon.max_usage {
        Some(max_usage) if coupon.usage_count >= max_usage => {
            Err(Rejection::UsageLimitReached { max_usage })
        }
        _ => Ok(()),
    }
}

fn check_per_user(coupon: &Coupon, facts: &UserFacts) -> CheckResult {
    match coupon.per_user_limit {
        Some(limit) if facts.prior_redemptions >= limit => {
            Err(Rejection::PerUserLimitReached { limit })
        }
        _ => Ok(()),
    }
}

fn check_min_purchase(coupon: &Coupon, cart: &CartSnapshot) -> CheckResult {
    if cart.cart_total < coupon.min_purchase {
        return Err(Rejection::BelowMinimumPurchase {
            minimum: coupon.min_purchase,
            cart_total: cart.cart_total,
            shortfall: coupon.min_purchase - cart.cart_total,
        });
    }
    Ok(())
}

fn check_first_purchase(coupon: &Coupon, facts: &UserFacts) -> CheckResult {
    if coupon.first_purchase_only && facts.total_prior_orders > 0 {
        return Err(Rejection::NotFirstPurchase);
    }
    Ok(())
}

fn check_quantity(coupon: &Coupon, cart: &CartSnapshot) -> CheckResult {
    let Some(required) = coupon.discount.required_quantity() else {
        return Ok(());
    };
    let actual = cart.total_quantity();
    if actual < required {
        return Err(Rejection::QuantityRequirementNotMet { required, actual });
    }
    Ok(())
}

fn check_user_allowed(coupon: &Coupon, facts: &UserFacts) -> CheckResult {
    if !coupon.applicable_users.is_empty() && !coupon.applicable_users.contains(&facts.user_id) {
        return Err(Rejection::UserNotEligible);
    }
    Ok(())
}

fn check_items(coupon: &Coupon, cart: &CartSnapshot) -> CheckResult {
    if coupon.has_item_restrictions() && !cart.lines.iter().any(|l| coupon.matches_line(l)) {
        return Err(Rejection::NoEligibleItems);
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartLine;
    use crate::coupon::{CouponDraft, DiscountKind, Percentage, PriceTier};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 10, 9, 30, 0).unwrap()
    }

    fn coupon(draft: CouponDraft) -> Coupon {
        draft.into_coupon("coupon-1", now() - Duration::days(30)).unwrap()
    }

    fn cart_of(total_major: i64) -> CartSnapshot {
        CartSnapshot::from_lines(vec![CartLine::new(
            "p-1",
            Money::from_major(total_major),
            1,
        )
        .with_category("c-1")])
    }

    fn shopper() -> UserFacts {
        UserFacts::new("user-1", 2, 0)
    }

    #[test]
    fn test_plain_coupon_passes() {
        let c = coupon(CouponDraft::percentage("SAVE10", 1000));
        assert_eq!(check_eligibility(&c, &cart_of(100), &shopper(), now()), Ok(()));
    }

    #[test]
    fn test_inactive() {
        let c = coupon(CouponDraft::percentage("OFF", 1000).active(false));
        assert_eq!(
            check_eligibility(&c, &cart_of(100), &shopper(), now()),
            Err(Rejection::Inactive)
        );
    }

    #[test]
    fn test_window_edges_inclusive() {
        let starts_now = coupon(CouponDraft::percentage("START", 1000).valid_from(now()));
        assert!(check_eligibility(&starts_now, &cart_of(100), &shopper(), now()).is_ok());

        let ends_now = coupon(CouponDraft::percentage("END", 1000).valid_until(now()));
        assert!(check_eligibility(&ends_now, &cart_of(100), &shopper(), now()).is_ok());

        let later = now() + Duration::seconds(1);
        assert_eq!(
            check_eligibility(&ends_now, &cart_of(100), &shopper(), later),
            Err(Rejection::Expired { valid_until: now() })
        );

        let earlier = now() - Duration::seconds(1);
        assert_eq!(
            check_eligibility(&starts_now, &cart_of(100), &shopper(), earlier),
            Err(Rejection::NotYetActive { valid_from: now() })
        );
    }

    #[test]
    fn test_global_usage_cap() {
        let mut c = coupon(CouponDraft::percentage("CAP", 1000).max_usage(5));
        c.usage_count = 4;
        assert!(check_eligibility(&c, &cart_of(100), &shopper(), now()).is_ok());

        c.usage_count = 5;
        assert_eq!(
            check_eligibility(&c, &cart_of(100), &shopper(), now()),
            Err(Rejection::UsageLimitReached { max_usage: 5 })
        );
    }

    #[test]
    fn test_per_user_limit() {
        let c = coupon(CouponDraft::percentage("ONCE", 1000));
        assert!(check_eligibility(&c, &cart_of(100), &UserFacts::new("user-1", 5, 0), now()).is_ok());
        assert_eq!(
            check_eligibility(&c, &cart_of(100), &UserFacts::new("user-1", 5, 1), now()),
            Err(Rejection::PerUserLimitReached { limit: 1 })
        );

        let unlimited = coupon(CouponDraft::percentage("MANY", 1000).per_user_limit(None));
        assert!(
            check_eligibility(&unlimited, &cart_of(100), &UserFacts::new("user-1", 50, 50), now())
                .is_ok()
        );
    }

    #[test]
    fn test_min_purchase() {
        let c = coupon(CouponDraft::percentage("MIN", 1000).min_purchase(Money::from_major(500)));
        assert!(check_eligibility(&c, &cart_of(500), &shopper(), now()).is_ok());
        assert_eq!(
            check_eligibility(&c, &cart_of(400), &shopper(), now()),
            Err(Rejection::BelowMinimumPurchase {
                minimum: Money::from_major(500),
                cart_total: Money::from_major(400),
                shortfall: Money::from_major(100),
            })
        );
    }

    #[test]
    fn test_first_purchase_gate() {
        let c = coupon(CouponDraft::percentage("FIRST", 1000).first_purchase_only(true));
        assert!(check_eligibility(&c, &cart_of(100), &UserFacts::first_time("u"), now()).is_ok());
        assert_eq!(
            check_eligibility(&c, &cart_of(100), &UserFacts::new("u", 1, 0), now()),
            Err(Rejection::NotFirstPurchase)
        );
    }

    #[test]
    fn test_quantity_preconditions() {
        let bundle = coupon(CouponDraft::new(
            "BUNDLE",
            DiscountKind::BuyXGetYFree {
                buy_quantity: 2,
                free_quantity: 1,
            },
        ));
        let two = CartSnapshot::from_lines(vec![CartLine::new("p", Money::from_major(10), 2)]);
        let three = CartSnapshot::from_lines(vec![CartLine::new("p", Money::from_major(10), 3)]);

        assert_eq!(
            check_eligibility(&bundle, &two, &shopper(), now()),
            Err(Rejection::QuantityRequirementNotMet {
                required: 3,
                actual: 2
            })
        );
        assert!(check_eligibility(&bundle, &three, &shopper(), now()).is_ok());

        let tiered = coupon(CouponDraft::new(
            "TIER",
            DiscountKind::TierPricing {
                tiers: vec![PriceTier {
                    min_quantity: 4,
                    rate: Percentage::from_percent(5),
                }],
            },
        ));
        assert!(matches!(
            check_eligibility(&tiered, &three, &shopper(), now()),
            Err(Rejection::QuantityRequirementNotMet { required: 4, .. })
        ));
    }

    #[test]
    fn test_user_allow_list() {
        let c = coupon(CouponDraft::percentage("VIP", 1000).users(["user-1", "user-9"]));
        assert!(check_eligibility(&c, &cart_of(100), &shopper(), now()).is_ok());
        assert_eq!(
            check_eligibility(&c, &cart_of(100), &UserFacts::new("user-2", 0, 0), now()),
            Err(Rejection::UserNotEligible)
        );
    }

    #[test]
    fn test_category_only_restriction() {
        let c = coupon(CouponDraft::percentage("CAT", 1000).categories(["C1"]));
        let matching = CartSnapshot::from_lines(vec![
            CartLine::new("any-product", Money::from_major(10), 1).with_category("C1"),
        ]);
        let other = CartSnapshot::from_lines(vec![
            CartLine::new("any-product", Money::from_major(10), 1).with_category("C2"),
        ]);
        assert!(check_eligibility(&c, &matching, &shopper(), now()).is_ok());
        assert_eq!(
            check_eligibility(&c, &other, &shopper(), now()),
            Err(Rejection::NoEligibleItems)
        );
    }

    #[test]
    fn test_product_or_category_match() {
        let c = coupon(
            CouponDraft::percentage("BOTH", 1000)
                .products(["P1"])
                .categories(["C1"]),
        );
        let by_product =
            CartSnapshot::from_lines(vec![CartLine::new("P1", Money::from_major(10), 1).with_category("C9")]);
        let by_category =
            CartSnapshot::from_lines(vec![CartLine::new("P9", Money::from_major(10), 1).with_category("C1")]);
        let neither =
            CartSnapshot::from_lines(vec![CartLine::new("P9", Money::from_major(10), 1).with_category("C9")]);

        assert!(check_eligibility(&c, &by_product, &shopper(), now()).is_ok());
        assert!(check_eligibility(&c, &by_category, &shopper(), now()).is_ok());
        assert_eq!(
            check_eligibility(&c, &neither, &shopper(), now()),
            Err(Rejection::NoEligibleItems)
        );
    }

    #[test]
    fn test_first_failure_wins() {
        let mut c = coupon(
            CouponDraft::percentage("MANY-FAILS", 1000)
                .active(false)
                .max_usage(1)
                .min_purchase(Money::from_major(1_000)),
        );
        c.usage_count = 1;
        assert_eq!(
            check_eligibility(&c, &cart_of(1), &shopper(), now()),
            Err(Rejection::Inactive)
        );

        c.is_active = true;
        assert_eq!(
            check_eligibility(&c, &cart_of(1), &shopper(), now()),
            Err(Rejection::UsageLimitReached { max_usage: 1 })
        );
    }

    #[test]
    fn test_every_rejection_has_distinct_message() {
        let all = vec![
            Rejection::NotFound { code: "X".into() },
            Rejection::Inactive,
            Rejection::NotYetActive { valid_from: now() },
            Rejection::Expired { valid_until: now() },
            Rejection::UsageLimitReached { max_usage: 1 },
            Rejection::PerUserLimitReached { limit: 1 },
            Rejection::BelowMinimumPurchase {
                minimum: Money::from_major(2),
                cart_total: Money::from_major(1),
                shortfall: Money::from_major(1),
            },
            Rejection::NotFirstPurchase,
            Rejection::QuantityRequirementNotMet {
                required: 2,
                actual: 1,
            },
            Rejection::UserNotEligible,
            Rejection::NoEligibleItems,
        ];
        let messages: std::collections::HashSet<String> = all.iter().map(ToString::to_string).collect();
        let codes: std::collections::HashSet<RejectionCode> = all.iter().map(Rejection::code).collect();
        assert_eq!(messages.len(), all.len());
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn test_rejection_json() {
        let json = serde_json::to_value(Rejection::Inactive).unwrap();
        assert_eq!(json["reason"], "inactive");
        let json = serde_json::to_value(RejectionCode::BelowMinimumPurchase).unwrap();
        assert_eq!(json, "BELOW_MINIMUM_PURCHASE");
    }
}
