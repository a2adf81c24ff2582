//! # Discount Calculator
//!
//! Turns an eligible coupon and a cart into a monetary discount.
//!
//! ## Calculation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. eligible subtotal                                                   │
//! │     no allow-lists   → cart_total                                       │
//! │     allow-lists set  → Σ price × qty of lines where coupon.matches_line │
//! │                        (never more than cart_total)                     │
//! │                                                                         │
//! │  2. by variant                                                          │
//! │     Percentage  → eligible × rate, rounded half-up, ≤ max_discount      │
//! │     Fixed       → min(amount, eligible)                                 │
//! │     others      → CoreError::UnsupportedDiscountType                    │
//! │                                                                         │
//! │  Guarantee: 0 ≤ discount ≤ eligible subtotal ≤ cart_total               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{CartLine, CartSnapshot};
use crate::coupon::{Coupon, DiscountKind};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;

/// The two numbers the calculator produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountBreakdown {
    pub eligible_subtotal: Money,
    pub discount: Money,
}

/// The part of the cart the discount is computed against.
pub fn eligible_subtotal(coupon: &Coupon, cart: &CartSnapshot) -> Money {
    let cart_total = cart.cart_total.clamp_non_negative();
    if !coupon.has_item_restrictions() {
        return cart_total;
    }

    let matched: Money = cart
        .lines
        .iter()
        .filter(|line| coupon.matches_line(line))
        .map(CartLine::line_total)
        .sum();

    // cart_total may already include caller-side reductions
    matched.clamp_non_negative().min(cart_total)
}

/// Computes the discount for a coupon that has passed eligibility.
///
/// Does not re-run the eligibility checks; use [`crate::evaluate`] for the
/// combined flow.
pub fn calculate_discount(coupon: &Coupon, cart: &CartSnapshot) -> CoreResult<DiscountBreakdown> {
    let eligible = eligible_subtotal(coupon, cart);

    let raw = match &coupon.discount {
        DiscountKind::Percentage { rate } => {
            let amount = eligible.percentage_of(*rate);
            match coupon.max_discount {
                Some(cap) => amount.min(cap.clamp_non_negative()),
                None => amount,
            }
        }
        DiscountKind::Fixed { amount } => amount.clamp_non_negative().min(eligible),
        DiscountKind::BuyXForY { .. }
        | DiscountKind::BuyXGetYFree { .. }
        | DiscountKind::TierPricing { .. } => {
            return Err(CoreError::UnsupportedDiscountType(coupon.discount_type()));
        }
    };

    Ok(DiscountBreakdown {
        eligible_subtotal: eligible,
        discount: raw.clamp_non_negative().min(eligible),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coupon::{CouponDraft, Percentage, PriceTier};
    use chrono::{TimeZone, Utc};

    fn build(draft: CouponDraft) -> Coupon {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        draft.into_coupon("c-1", now).unwrap()
    }

    fn single_line(major: i64) -> CartSnapshot {
        CartSnapshot::from_lines(vec![CartLine::new("p-1", Money::from_major(major), 1)])
    }

    #[test]
    fn test_percentage_uncapped() {
        let c = build(CouponDraft::percentage("TEN", 1000));
        let result = calculate_discount(&c, &single_line(1000)).unwrap();
        assert_eq!(result.eligible_subtotal, Money::from_major(1000));
        assert_eq!(result.discount, Money::from_major(100));
    }

    #[test]
    fn test_max_discount_cap() {
        let c = build(CouponDraft::percentage("HALF", 5000).max_discount(Money::from_major(100)));
        let result = calculate_discount(&c, &single_line(1000)).unwrap();
        assert_eq!(result.discount, Money::from_major(100));
    }

    #[test]
    fn test_fixed_never_exceeds_eligible() {
        let c = build(CouponDraft::fixed("FLAT", Money::from_major(500)));
        let result = calculate_discount(&c, &single_line(300)).unwrap();
        assert_eq!(result.discount, Money::from_major(300));

        let result = calculate_discount(&c, &single_line(800)).unwrap();
        assert_eq!(result.discount, Money::from_major(500));
    }

    #[test]
    fn test_clamped_percentage_discounts_whole_subtotal() {
        let c = build(CouponDraft::percentage("ALL", 15_000));
        let result = calculate_discount(&c, &single_line(250)).unwrap();
        assert_eq!(result.discount, Money::from_major(250));
    }

    #[test]
    fn test_restricted_subtotal_uses_matching_lines_only() {
        let c = build(CouponDraft::percentage("SHOES", 2000).categories(["shoes"]));
        let cart = CartSnapshot::from_lines(vec![
            CartLine::new("sneaker", Money::from_major(100), 2).with_category("shoes"),
            CartLine::new("cap", Money::from_major(50), 1).with_category("hats"),
        ]);

        let result = calculate_discount(&c, &cart).unwrap();
        assert_eq!(result.eligible_subtotal, Money::from_major(200));
        assert_eq!(result.discount, Money::from_major(40));
    }

    #[test]
    fn test_empty_product_list_does_not_widen_category_restriction() {
        let c = build(CouponDraft::percentage("C1ONLY", 1000).categories(["C1"]));
        assert!(c.applicable_products.is_empty());

        let outside = CartLine::new("p-2", Money::from_major(70), 1).with_category("C2");
        let uncategorized = CartLine::new("p-3", Money::from_major(40), 1);
        assert!(!c.matches_line(&outside));
        assert!(!c.matches_line(&uncategorized));

        let cart = CartSnapshot::from_lines(vec![
            CartLine::new("p-1", Money::from_major(30), 1).with_category("C1"),
            outside,
            uncategorized,
        ]);
        assert_eq!(eligible_subtotal(&c, &cart), Money::from_major(30));

        // Same rule with the lists swapped
        let p = build(CouponDraft::percentage("P1ONLY", 1000).products(["p-1"]));
        assert!(p.applicable_categories.is_empty());
        assert_eq!(eligible_subtotal(&p, &cart), Money::from_major(30));
    }

    #[test]
    fn test_restricted_subtotal_capped_by_cart_total() {
        let c = build(CouponDraft::fixed("FLAT", Money::from_major(1000)).products(["p-1"]));
        // Caller already took 20 off the 100 line
        let cart = CartSnapshot::with_total(
            vec![CartLine::new("p-1", Money::from_major(100), 1)],
            Money::from_major(80),
        );
        let result = calculate_discount(&c, &cart).unwrap();
        assert_eq!(result.eligible_subtotal, Money::from_major(80));
        assert_eq!(result.discount, Money::from_major(80));
    }

    #[test]
    fn test_rounding_to_cent() {
        // 33.33 × 12.5% = 4.166... → 4.17
        let c = build(CouponDraft::percentage("ODD", 1250));
        let cart = CartSnapshot::from_lines(vec![CartLine::new("p", Money::from_cents(3333), 1)]);
        assert_eq!(calculate_discount(&c, &cart).unwrap().discount.cents(), 417);
    }

    #[test]
    fn test_unsupported_variants_are_faults() {
        let variants = vec![
            DiscountKind::BuyXForY {
                required_quantity: 3,
                price: Money::from_major(20),
            },
            DiscountKind::BuyXGetYFree {
                buy_quantity: 1,
                free_quantity: 1,
            },
            DiscountKind::TierPricing {
                tiers: vec![PriceTier {
                    min_quantity: 1,
                    rate: Percentage::from_percent(5),
                }],
            },
        ];

        for kind in variants {
            let expected = kind.discount_type();
            let c = build(CouponDraft::new("BUNDLE", kind));
            match calculate_discount(&c, &single_line(100)) {
                Err(CoreError::UnsupportedDiscountType(tag)) => assert_eq!(tag, expected),
                other => panic!("expected UnsupportedDiscountType, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_bounds_hold_across_grid() {
        let drafts = vec![
            CouponDraft::percentage("P0", 0),
            CouponDraft::percentage("P33", 3333),
            CouponDraft::percentage("P100", 10_000),
            CouponDraft::percentage("PCAP", 5000).max_discount(Money::from_cents(777)),
            CouponDraft::fixed("F1", Money::from_cents(1)),
            CouponDraft::fixed("F999", Money::from_cents(99_999)),
            CouponDraft::fixed("FCAT", Money::from_cents(2_500)).categories(["c-a"]),
            CouponDraft::percentage("PPROD", 2500).products(["p-b"]),
        ];

        for draft in drafts {
            let c = build(draft);
            for price_a in [0, 1, 99, 1_000, 123_457] {
                for qty_b in 1..4u32 {
                    let lines = vec![
                        CartLine::new("p-a", Money::from_cents(price_a), 1).with_category("c-a"),
                        CartLine::new("p-b", Money::from_cents(1_999), qty_b).with_category("c-b"),
                    ];
                    let full = CartSnapshot::from_lines(lines.clone());
                    let reduced = CartSnapshot::with_total(lines, Money::from_cents(price_a / 2));

                    for cart in [full, reduced] {
                        let result = calculate_discount(&c, &cart).unwrap();
                        assert!(result.discount >= Money::zero());
                        assert!(result.discount <= result.eligible_subtotal);
                        assert!(result.eligible_subtotal <= cart.cart_total);
                        // same inputs, same answer
                        assert_eq!(calculate_discount(&c, &cart).unwrap(), result);
                    }
                }
            }
        }
    }
}
