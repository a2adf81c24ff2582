//! # Coupon Definitions
//!
//! A coupon is an administrator-defined rule that reduces an order's total
//! under certain conditions. The engine only ever reads a [`Coupon`]
//! snapshot; edits go through [`CouponDraft`], which validates and normalizes.
//!
//! ## Discount Variants
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DiscountKind (closed sum type)          arithmetic?   quantity gate?   │
//! │  ───────────────────────────────         ───────────   ──────────────   │
//! │  Percentage { rate }                     yes           no               │
//! │  Fixed { amount }                        yes           no               │
//! │  BuyXForY { required_quantity, price }   not yet       qty >= X         │
//! │  BuyXGetYFree { buy, free }              not yet       qty >= X + Y     │
//! │  TierPricing { tiers }                   not yet       qty >= lowest    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Adding a variant is a compile error in every `match` until its arithmetic
//! and its eligibility gate are written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::cart::CartLine;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation;
use crate::DEFAULT_PER_USER_LIMIT;

// =============================================================================
// Percentage
// =============================================================================

/// A rate in basis points, always within 0%..=100%.
///
/// ## Why Basis Points?
/// 1 basis point = 0.01%, so 1250 bps = 12.5%. Fractional percentages stay
/// integers and the rounding lives in exactly one place
/// ([`Money::percentage_of`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, TS)]
#[ts(export)]
pub struct Percentage(u32);

impl Percentage {
    /// 100%.
    pub const FULL_BPS: u32 = 10_000;

    /// Creates a rate from basis points, capped at 100%.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        if bps > Self::FULL_BPS {
            Percentage(Self::FULL_BPS)
        } else {
            Percentage(bps)
        }
    }

    /// Creates a rate from whole percent points, clamped into 0..=100.
    ///
    /// ```rust
    /// use storefront_core::coupon::Percentage;
    ///
    /// assert_eq!(Percentage::from_percent(150).bps(), 10_000);
    /// assert_eq!(Percentage::from_percent(-5).bps(), 0);
    /// ```
    pub fn from_percent(percent: i64) -> Self {
        Self::clamped(percent.saturating_mul(100))
    }

    /// Clamps an arbitrary (possibly negative) basis-point value.
    pub fn clamped(bps: i64) -> Self {
        let bounded = bps.clamp(0, i64::from(Self::FULL_BPS));
        // bounded is within 0..=10_000
        Percentage(bounded as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate in percent (for display only).
    #[inline]
    pub fn percent(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl<'de> Deserialize<'de> for Percentage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Ok(Percentage::clamped(raw))
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

// =============================================================================
// Discount Type Tag
// =============================================================================

/// The bare discount type tag, as stored and as shown in the admin UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum DiscountType {
    Percentage,
    Fixed,
    BuyXForY,
    BuyXGetYFree,
    TierPricing,
}

impl DiscountType {
    /// The canonical tag string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
            DiscountType::BuyXForY => "buyXForY",
            DiscountType::BuyXGetYFree => "buyXGetYFree",
            DiscountType::TierPricing => "tierPricing",
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a stored tag. Anything outside the known set is a fault.
///
/// ```rust
/// use storefront_core::coupon::DiscountType;
///
/// assert_eq!("fixed".parse::<DiscountType>().unwrap(), DiscountType::Fixed);
/// assert!("bogo".parse::<DiscountType>().is_err());
/// ```
impl FromStr for DiscountType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(DiscountType::Percentage),
            "fixed" => Ok(DiscountType::Fixed),
            "buyXForY" => Ok(DiscountType::BuyXForY),
            "buyXGetYFree" => Ok(DiscountType::BuyXGetYFree),
            "tierPricing" => Ok(DiscountType::TierPricing),
            other => Err(CoreError::UnknownDiscountType(other.to_string())),
        }
    }
}

// =============================================================================
// Discount Kind
// =============================================================================

/// One quantity threshold of a tier-pricing coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceTier {
    /// Cart quantity at which this tier starts.
    pub min_quantity: u32,
    /// Rate applied once the tier is reached.
    pub rate: Percentage,
}

/// What a coupon takes off, with the parameters each variant needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "discount_type", rename_all = "camelCase")]
pub enum DiscountKind {
    /// A share of the eligible subtotal, optionally capped by `max_discount`.
    Percentage { rate: Percentage },

    /// A flat amount, never more than the eligible subtotal.
    Fixed { amount: Money },

    /// Buy `required_quantity` units for a bundle `price`.
    BuyXForY { required_quantity: u32, price: Money },

    /// Buy `buy_quantity`, get `free_quantity` more at no charge.
    BuyXGetYFree { buy_quantity: u32, free_quantity: u32 },

    /// Quantity-dependent rates.
    TierPricing { tiers: Vec<PriceTier> },
}

impl DiscountKind {
    /// Returns the tag for this variant.
    pub const fn discount_type(&self) -> DiscountType {
        match self {
            DiscountKind::Percentage { .. } => DiscountType::Percentage,
            DiscountKind::Fixed { .. } => DiscountType::Fixed,
            DiscountKind::BuyXForY { .. } => DiscountType::BuyXForY,
            DiscountKind::BuyXGetYFree { .. } => DiscountType::BuyXGetYFree,
            DiscountKind::TierPricing { .. } => DiscountType::TierPricing,
        }
    }

    /// Minimum total cart quantity this variant needs before it can apply.
    ///
    /// `None` for variants without a quantity gate.
    pub fn required_quantity(&self) -> Option<u32> {
        match self {
            DiscountKind::Percentage { .. } | DiscountKind::Fixed { .. } => None,
            DiscountKind::BuyXForY {
                required_quantity, ..
            } => Some(*required_quantity),
            DiscountKind::BuyXGetYFree {
                buy_quantity,
                free_quantity,
            } => Some(buy_quantity.saturating_add(*free_quantity)),
            DiscountKind::TierPricing { tiers } => {
                Some(tiers.iter().map(|t| t.min_quantity).min().unwrap_or(0))
            }
        }
    }
}

// =============================================================================
// Coupon
// =============================================================================

/// Normalizes a shopper- or admin-entered code: trimmed, uppercase.
///
/// ```rust
/// use storefront_core::coupon::normalize_code;
///
/// assert_eq!(normalize_code("  save10 "), "SAVE10");
/// ```
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// A coupon snapshot as read from storage.
///
/// ## Invariants
/// - `code` is uppercase
/// - a `Percentage` rate is within 0..=100%
/// - `usage_count` only grows, and only through the ledger's redeem path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Coupon {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Shopper-facing code, uppercase.
    pub code: String,

    /// Optional admin note / storefront blurb.
    pub description: Option<String>,

    /// Discount variant and its parameters.
    pub discount: DiscountKind,

    /// Minimum cart total required.
    pub min_purchase: Money,

    /// Cap on the computed discount (percentage coupons).
    pub max_discount: Option<Money>,

    /// Global redemption cap. `None` = unlimited.
    pub max_usage: Option<u32>,

    /// Redemptions so far.
    pub usage_count: u32,

    /// Redemptions allowed per shopper. `None` = unlimited.
    pub per_user_limit: Option<u32>,

    /// Start of the activation window (inclusive).
    #[ts(as = "Option<String>")]
    pub valid_from: Option<DateTime<Utc>>,

    /// End of the activation window (inclusive).
    #[ts(as = "Option<String>")]
    pub valid_until: Option<DateTime<Utc>>,

    /// Category allow-list. Empty = no restriction.
    pub applicable_categories: Vec<String>,

    /// Product allow-list. Empty = no restriction.
    pub applicable_products: Vec<String>,

    /// Shopper allow-list. Empty = anyone.
    pub applicable_users: Vec<String>,

    /// Only shoppers with no prior orders may redeem.
    pub first_purchase_only: bool,

    /// Administrative on/off switch.
    pub is_active: bool,

    /// Listed on the public offers page.
    pub show_to_user: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    /// Returns the discount type tag.
    #[inline]
    pub fn discount_type(&self) -> DiscountType {
        self.discount.discount_type()
    }

    /// True when either the product or the category allow-list is set.
    pub fn has_item_restrictions(&self) -> bool {
        !self.applicable_products.is_empty() || !self.applicable_categories.is_empty()
    }

    /// Whether a cart line counts toward this coupon.
    ///
    /// A line matches when its product is in `applicable_products` OR its
    /// category is in `applicable_categories`. An empty list contributes no
    /// match; with no lists at all every line matches.
    ///
    /// The eligibility check and the eligible-subtotal filter both call this,
    /// so they cannot disagree.
    pub fn matches_line(&self, line: &CartLine) -> bool {
        if !self.has_item_restrictions() {
            return true;
        }

        let product_match = self.applicable_products.contains(&line.product_id);
        let category_match = line
            .category_id
            .as_ref()
            .is_some_and(|category| self.applicable_categories.contains(category));

        product_match || category_match
    }

    /// Whether `now` falls inside the (inclusive) activation window.
    pub fn is_within_window(&self, now: DateTime<Utc>) -> bool {
        let started = self.valid_from.map_or(true, |from| now >= from);
        let not_ended = self.valid_until.map_or(true, |until| now <= until);
        started && not_ended
    }

    /// Redemptions left before the global cap. `None` = unlimited.
    pub fn remaining_usage(&self) -> Option<u32> {
        self.max_usage
            .map(|max| max.saturating_sub(self.usage_count))
    }

    /// Whether the coupon belongs on the public offers page right now.
    pub fn is_publicly_listed(&self, now: DateTime<Utc>) -> bool {
        self.show_to_user
            && self.is_active
            && self.is_within_window(now)
            && self.remaining_usage() != Some(0)
    }
}

// =============================================================================
// Coupon Draft (admin input)
// =============================================================================

/// Admin input for creating or editing a coupon.
///
/// ## Normalization on `into_coupon` / `apply_to`
/// - code trimmed and uppercased
/// - percentage rates clamped into 0..=100% (at construction)
/// - allow-lists trimmed, blanks dropped, duplicates removed
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use storefront_core::{CouponDraft, Money};
///
/// let coupon = CouponDraft::percentage("welcome", 15_000) // 150% → 100%
///     .first_purchase_only(true)
///     .into_coupon("c-1", Utc::now())
///     .unwrap();
///
/// assert_eq!(coupon.code, "WELCOME");
/// assert_eq!(coupon.per_user_limit, Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CouponDraft {
    pub code: String,
    pub description: Option<String>,
    pub discount: DiscountKind,
    pub min_purchase: Money,
    pub max_discount: Option<Money>,
    pub max_usage: Option<u32>,
    pub per_user_limit: Option<u32>,
    #[ts(as = "Option<String>")]
    pub valid_from: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub valid_until: Option<DateTime<Utc>>,
    pub applicable_categories: Vec<String>,
    pub applicable_products: Vec<String>,
    pub applicable_users: Vec<String>,
    pub first_purchase_only: bool,
    pub is_active: bool,
    pub show_to_user: bool,
}

impl CouponDraft {
    /// A new active draft with the given discount and all defaults.
    pub fn new(code: impl Into<String>, discount: DiscountKind) -> Self {
        CouponDraft {
            code: code.into(),
            description: None,
            discount,
            min_purchase: Money::zero(),
            max_discount: None,
            max_usage: None,
            per_user_limit: Some(DEFAULT_PER_USER_LIMIT),
            valid_from: None,
            valid_until: None,
            applicable_categories: Vec::new(),
            applicable_products: Vec::new(),
            applicable_users: Vec::new(),
            first_purchase_only: false,
            is_active: true,
            show_to_user: false,
        }
    }

    /// A percentage draft. `bps` is clamped into 0..=10000.
    pub fn percentage(code: impl Into<String>, bps: i64) -> Self {
        Self::new(
            code,
            DiscountKind::Percentage {
                rate: Percentage::clamped(bps),
            },
        )
    }

    /// A fixed-amount draft.
    pub fn fixed(code: impl Into<String>, amount: Money) -> Self {
        Self::new(code, DiscountKind::Fixed { amount })
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn min_purchase(mut self, amount: Money) -> Self {
        self.min_purchase = amount;
        self
    }

    pub fn max_discount(mut self, amount: Money) -> Self {
        self.max_discount = Some(amount);
        self
    }

    pub fn max_usage(mut self, max: u32) -> Self {
        self.max_usage = Some(max);
        self
    }

    pub fn per_user_limit(mut self, limit: Option<u32>) -> Self {
        self.per_user_limit = limit;
        self
    }

    pub fn valid_from(mut self, from: DateTime<Utc>) -> Self {
        self.valid_from = Some(from);
        self
    }

    pub fn valid_until(mut self, until: DateTime<Utc>) -> Self {
        self.valid_until = Some(until);
        self
    }

    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.applicable_categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn products<I, S>(mut self, products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.applicable_products = products.into_iter().map(Into::into).collect();
        self
    }

    pub fn users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.applicable_users = users.into_iter().map(Into::into).collect();
        self
    }

    pub fn first_purchase_only(mut self, only: bool) -> Self {
        self.first_purchase_only = only;
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    pub fn show_to_user(mut self, show: bool) -> Self {
        self.show_to_user = show;
        self
    }

    /// Validates the draft and builds a brand-new coupon.
    pub fn into_coupon(self, id: impl Into<String>, now: DateTime<Utc>) -> CoreResult<Coupon> {
        self.build(id.into(), 0, now, now)
    }

    /// Validates the draft and applies it over an existing coupon.
    ///
    /// Keeps the existing `id`, `usage_count` and `created_at`.
    pub fn apply_to(self, existing: &Coupon, now: DateTime<Utc>) -> CoreResult<Coupon> {
        self.build(
            existing.id.clone(),
            existing.usage_count,
            existing.created_at,
            now,
        )
    }

    fn build(
        self,
        id: String,
        usage_count: u32,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> CoreResult<Coupon> {
        let code = validation::validate_coupon_code(&self.code)?;
        validation::validate_non_negative("min_purchase", self.min_purchase)?;
        if let Some(cap) = self.max_discount {
            validation::validate_non_negative("max_discount", cap)?;
        }
        validation::validate_per_user_limit(self.per_user_limit)?;
        validation::validate_validity_window(self.valid_from, self.valid_until)?;
        validation::validate_discount_kind(&self.discount)?;

        Ok(Coupon {
            id,
            code,
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            discount: self.discount,
            min_purchase: self.min_purchase,
            max_discount: self.max_discount,
            max_usage: self.max_usage,
            usage_count,
            per_user_limit: self.per_user_limit,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            applicable_categories: normalize_list(self.applicable_categories),
            applicable_products: normalize_list(self.applicable_products),
            applicable_users: normalize_list(self.applicable_users),
            first_purchase_only: self.first_purchase_only,
            is_active: self.is_active,
            show_to_user: self.show_to_user,
            created_at,
            updated_at,
        })
    }
}

/// Trims entries, drops blanks and duplicates, keeps first-seen order.
fn normalize_list(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim();
        if !value.is_empty() && !out.iter().any(|seen| seen == value) {
            out.push(value.to_string());
        }
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_percentage_clamped_on_creation() {
        let coupon = CouponDraft::percentage("big", 15_000)
            .into_coupon("c-1", now())
            .unwrap();
        assert_eq!(
            coupon.discount,
            DiscountKind::Percentage {
                rate: Percentage::from_percent(100)
            }
        );

        let coupon = CouponDraft::percentage("neg", -50)
            .into_coupon("c-2", now())
            .unwrap();
        assert_eq!(
            coupon.discount,
            DiscountKind::Percentage {
                rate: Percentage::from_bps(0)
            }
        );
    }

    #[test]
    fn test_percentage_deserialize_clamps() {
        let rate: Percentage = serde_json::from_str("25000").unwrap();
        assert_eq!(rate.bps(), 10_000);
        let rate: Percentage = serde_json::from_str("-3").unwrap();
        assert_eq!(rate.bps(), 0);
    }

    #[test]
    fn test_percentage_display() {
        assert_eq!(Percentage::from_bps(1250).to_string(), "12.50%");
        assert_eq!(Percentage::from_percent(100).to_string(), "100.00%");
    }

    #[test]
    fn test_code_normalized_and_defaults() {
        let coupon = CouponDraft::fixed("  summer-25 ", Money::from_major(25))
            .into_coupon("c-1", now())
            .unwrap();
        assert_eq!(coupon.code, "SUMMER-25");
        assert_eq!(coupon.per_user_limit, Some(1));
        assert_eq!(coupon.min_purchase, Money::zero());
        assert_eq!(coupon.usage_count, 0);
        assert!(coupon.is_active);
        assert!(!coupon.show_to_user);
    }

    #[test]
    fn test_lists_normalized() {
        let coupon = CouponDraft::fixed("LISTS", Money::from_major(5))
            .categories(["shoes", " shoes", "", "bags "])
            .into_coupon("c-1", now())
            .unwrap();
        assert_eq!(coupon.applicable_categories, vec!["shoes", "bags"]);
    }

    #[test]
    fn test_invalid_drafts_rejected() {
        assert!(CouponDraft::fixed("x", Money::from_major(5))
            .into_coupon("c", now())
            .is_err());
        assert!(CouponDraft::fixed("NEGATIVE", Money::from_cents(-1))
            .into_coupon("c", now())
            .is_err());
        assert!(CouponDraft::fixed("WINDOW", Money::from_major(5))
            .valid_from(now())
            .valid_until(now() - Duration::days(1))
            .into_coupon("c", now())
            .is_err());
        assert!(CouponDraft::fixed("ZERO-LIMIT", Money::from_major(5))
            .per_user_limit(Some(0))
            .into_coupon("c", now())
            .is_err());
        assert!(CouponDraft::new("TIERS", DiscountKind::TierPricing { tiers: vec![] })
            .into_coupon("c", now())
            .is_err());
    }

    #[test]
    fn test_apply_to_keeps_identity_and_usage() {
        let created = CouponDraft::fixed("EDIT", Money::from_major(5))
            .into_coupon("c-1", now())
            .unwrap();
        let mut used = created.clone();
        used.usage_count = 7;

        let later = now() + Duration::hours(2);
        let edited = CouponDraft::fixed("edit", Money::from_major(8))
            .apply_to(&used, later)
            .unwrap();

        assert_eq!(edited.id, "c-1");
        assert_eq!(edited.usage_count, 7);
        assert_eq!(edited.created_at, now());
        assert_eq!(edited.updated_at, later);
        assert_eq!(
            edited.discount,
            DiscountKind::Fixed {
                amount: Money::from_major(8)
            }
        );
    }

    #[test]
    fn test_required_quantity() {
        assert_eq!(
            DiscountKind::Fixed {
                amount: Money::zero()
            }
            .required_quantity(),
            None
        );
        assert_eq!(
            DiscountKind::BuyXForY {
                required_quantity: 3,
                price: Money::from_major(10)
            }
            .required_quantity(),
            Some(3)
        );
        assert_eq!(
            DiscountKind::BuyXGetYFree {
                buy_quantity: 2,
                free_quantity: 1
            }
            .required_quantity(),
            Some(3)
        );
        assert_eq!(
            DiscountKind::TierPricing {
                tiers: vec![
                    PriceTier {
                        min_quantity: 10,
                        rate: Percentage::from_percent(20)
                    },
                    PriceTier {
                        min_quantity: 5,
                        rate: Percentage::from_percent(10)
                    },
                ]
            }
            .required_quantity(),
            Some(5)
        );
    }

    #[test]
    fn test_discount_type_round_trip_tags() {
        for tag in ["percentage", "fixed", "buyXForY", "buyXGetYFree", "tierPricing"] {
            let parsed: DiscountType = tag.parse().unwrap();
            assert_eq!(parsed.as_str(), tag);
        }
        assert!(matches!(
            "tiered".parse::<DiscountType>(),
            Err(CoreError::UnknownDiscountType(tag)) if tag == "tiered"
        ));
    }

    #[test]
    fn test_discount_kind_json_shape() {
        let json = serde_json::to_value(DiscountKind::Fixed {
            amount: Money::from_cents(500),
        })
        .unwrap();
        assert_eq!(json["discount_type"], "fixed");
        assert_eq!(json["amount"], 500);
    }

    #[test]
    fn test_window_inclusive() {
        let coupon = CouponDraft::fixed("WINDOW", Money::from_major(5))
            .valid_from(now())
            .valid_until(now() + Duration::days(1))
            .into_coupon("c", now())
            .unwrap();
        assert!(coupon.is_within_window(now()));
        assert!(coupon.is_within_window(now() + Duration::days(1)));
        assert!(!coupon.is_within_window(now() - Duration::seconds(1)));
        assert!(!coupon.is_within_window(now() + Duration::days(1) + Duration::seconds(1)));
    }

    #[test]
    fn test_public_listing() {
        let mut coupon = CouponDraft::fixed("LISTED", Money::from_major(5))
            .show_to_user(true)
            .max_usage(2)
            .into_coupon("c", now())
            .unwrap();
        assert!(coupon.is_publicly_listed(now()));

        coupon.usage_count = 2;
        assert!(!coupon.is_publicly_listed(now()));

        coupon.usage_count = 0;
        coupon.is_active = false;
        assert!(!coupon.is_publicly_listed(now()));
    }
}
