//! # Validation Module
//!
//! Admin-side input validation for coupon definitions and cart lines.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Admin form (frontend)                                         │
//! │  └── Basic format checks, immediate feedback                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: CouponDraft::into_coupon / CartSnapshot::validate             │
//! │  └── THIS MODULE: field rules                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── UNIQUE(code)                                                       │
//! │  └── CHECK constraints on counters                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Shopper-facing outcomes are never produced here. A coupon that does not
//! apply is an [`crate::Rejection`], not a `ValidationError`.
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{validate_coupon_code, validate_quantity};
//!
//! assert_eq!(validate_coupon_code(" summer-24 ").unwrap(), "SUMMER-24");
//! assert!(validate_quantity(0).is_err());
//! ```

use chrono::{DateTime, Utc};

use crate::coupon::{normalize_code, DiscountKind};
use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Shortest accepted coupon code.
pub const MIN_CODE_LEN: usize = 3;

/// Longest accepted coupon code.
pub const MAX_CODE_LEN: usize = 32;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a coupon code and returns its normalized (uppercase) form.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Between 3 and 32 characters
/// - Only `A-Z`, `0-9`, hyphens and underscores (checked after uppercasing)
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_coupon_code;
///
/// assert!(validate_coupon_code("SAVE10").is_ok());
/// assert!(validate_coupon_code("").is_err());
/// assert!(validate_coupon_code("NO SPACES").is_err());
/// ```
pub fn validate_coupon_code(code: &str) -> ValidationResult<String> {
    let code = normalize_code(code);

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    let len = code.chars().count();
    if len < MIN_CODE_LEN {
        return Err(ValidationError::TooShort {
            field: "code".to_string(),
            min: MIN_CODE_LEN,
        });
    }
    if len > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: u32) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: i64::from(MAX_ITEM_QUANTITY),
        });
    }

    Ok(())
}

/// Validates that an amount is zero or more.
///
/// ```rust
/// use storefront_core::{validation::validate_non_negative, Money};
///
/// assert!(validate_non_negative("min_purchase", Money::zero()).is_ok());
/// assert!(validate_non_negative("min_purchase", Money::from_cents(-1)).is_err());
/// ```
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a per-user redemption limit. `None` means unlimited.
pub fn validate_per_user_limit(limit: Option<u32>) -> ValidationResult<()> {
    if limit == Some(0) {
        return Err(ValidationError::MustBePositive {
            field: "per_user_limit".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Coupon Structure Validators
// =============================================================================

/// Validates that an activation window is not inverted.
///
/// Equal bounds are allowed: the coupon is live for exactly that instant.
pub fn validate_validity_window(
    valid_from: Option<DateTime<Utc>>,
    valid_until: Option<DateTime<Utc>>,
) -> ValidationResult<()> {
    if let (Some(from), Some(until)) = (valid_from, valid_until) {
        if from > until {
            return Err(ValidationError::Inconsistent {
                field: "valid_until".to_string(),
                reason: "must not be earlier than valid_from".to_string(),
            });
        }
    }

    Ok(())
}

/// Validates the parameters of a discount variant.
///
/// ## Rules
/// ```text
/// Fixed         amount >= 0
/// BuyXForY      required_quantity >= 1, price >= 0
/// BuyXGetYFree  buy_quantity >= 1, free_quantity >= 1
/// TierPricing   at least one tier, min_quantity >= 1,
///               thresholds strictly increasing
/// ```
/// Percentage rates are clamped on construction and always pass.
pub fn validate_discount_kind(kind: &DiscountKind) -> ValidationResult<()> {
    match kind {
        DiscountKind::Percentage { .. } => Ok(()),
        DiscountKind::Fixed { amount } => validate_non_negative("amount", *amount),
        DiscountKind::BuyXForY {
            required_quantity,
            price,
        } => {
            if *required_quantity == 0 {
                return Err(ValidationError::MustBePositive {
                    field: "required_quantity".to_string(),
                });
            }
            validate_non_negative("price", *price)
        }
        DiscountKind::BuyXGetYFree {
            buy_quantity,
            free_quantity,
        } => {
            if *buy_quantity == 0 {
                return Err(ValidationError::MustBePositive {
                    field: "buy_quantity".to_string(),
                });
            }
            if *free_quantity == 0 {
                return Err(ValidationError::MustBePositive {
                    field: "free_quantity".to_string(),
                });
            }
            Ok(())
        }
        DiscountKind::TierPricing { tiers } => {
            if tiers.is_empty() {
                return Err(ValidationError::Required {
                    field: "tiers".to_string(),
                });
            }

            let mut previous: Option<u32> = None;
            for tier in tiers {
                if tier.min_quantity == 0 {
                    return Err(ValidationError::MustBePositive {
                        field: "tiers.min_quantity".to_string(),
                    });
                }
                if previous.is_some_and(|p| tier.min_quantity <= p) {
                    return Err(ValidationError::Inconsistent {
                        field: "tiers".to_string(),
                        reason: "thresholds must be strictly increasing".to_string(),
                    });
                }
                previous = Some(tier.min_quantity);
            }
            Ok(())
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coupon::{Percentage, PriceTier};
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_validate_coupon_code() {
        assert_eq!(validate_coupon_code("save10").unwrap(), "SAVE10");
        assert_eq!(validate_coupon_code("  eid_sale-2026 ").unwrap(), "EID_SALE-2026");
        assert_eq!(validate_coupon_code("ABC").unwrap(), "ABC");

        assert!(matches!(
            validate_coupon_code("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_coupon_code("AB"),
            Err(ValidationError::TooShort { min: 3, .. })
        ));
        assert!(matches!(
            validate_coupon_code(&"A".repeat(33)),
            Err(ValidationError::TooLong { max: 32, .. })
        ));
        assert!(validate_coupon_code("HALF OFF").is_err());
        assert!(validate_coupon_code("10%OFF").is_err());
        assert!(validate_coupon_code("ÜBER10").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("price", Money::from_cents(0)).is_ok());
        assert!(validate_non_negative("price", Money::from_cents(1099)).is_ok());
        assert!(validate_non_negative("price", Money::from_cents(-100)).is_err());
    }

    #[test]
    fn test_validate_per_user_limit() {
        assert!(validate_per_user_limit(None).is_ok());
        assert!(validate_per_user_limit(Some(1)).is_ok());
        assert!(validate_per_user_limit(Some(0)).is_err());
    }

    #[test]
    fn test_validate_validity_window() {
        let t = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();

        assert!(validate_validity_window(None, None).is_ok());
        assert!(validate_validity_window(Some(t), None).is_ok());
        assert!(validate_validity_window(None, Some(t)).is_ok());
        assert!(validate_validity_window(Some(t), Some(t)).is_ok());
        assert!(validate_validity_window(Some(t), Some(t + Duration::days(7))).is_ok());
        assert!(validate_validity_window(Some(t), Some(t - Duration::seconds(1))).is_err());
    }

    #[test]
    fn test_validate_discount_kind() {
        let tier = |min_quantity, percent| PriceTier {
            min_quantity,
            rate: Percentage::from_percent(percent),
        };

        assert!(validate_discount_kind(&DiscountKind::Fixed {
            amount: Money::from_cents(-1)
        })
        .is_err());
        assert!(validate_discount_kind(&DiscountKind::BuyXForY {
            required_quantity: 0,
            price: Money::from_major(10)
        })
        .is_err());
        assert!(validate_discount_kind(&DiscountKind::BuyXGetYFree {
            buy_quantity: 2,
            free_quantity: 0
        })
        .is_err());

        assert!(validate_discount_kind(&DiscountKind::TierPricing { tiers: vec![] }).is_err());
        assert!(validate_discount_kind(&DiscountKind::TierPricing {
            tiers: vec![tier(5, 10), tier(5, 20)]
        })
        .is_err());
        assert!(validate_discount_kind(&DiscountKind::TierPricing {
            tiers: vec![tier(10, 20), tier(5, 10)]
        })
        .is_err());
        assert!(validate_discount_kind(&DiscountKind::TierPricing {
            tiers: vec![tier(5, 10), tier(10, 20)]
        })
        .is_ok());
    }
}
