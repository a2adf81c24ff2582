//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    999.99 × 0.15 = 149.99849999999998  ❌ which cent is that?           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (cents / paisa)                      │
//! │    99999 × 1500 bps = 149998500 → (149998500 + 5000) / 10000            │
//! │                     = 15000 → 150.00                                    │
//! │    Rounding happens exactly once, half-up, at the minor unit            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::money::Money;
//! use storefront_core::coupon::Percentage;
//!
//! let price = Money::from_cents(1099); // 10.99
//! let total = price * 2 + Money::from_cents(500); // 26.98
//! assert_eq!(total.cents(), 2698);
//!
//! let off = total.percentage_of(Percentage::from_bps(1000)); // 10%
//! assert_eq!(off.cents(), 270); // 2.698 rounds half-up to 2.70
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::coupon::Percentage;
use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: subtraction never wraps; callers clamp where a
///   negative value is meaningless (e.g. final totals)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Two minor digits**: every currency the storefront sells in
///   (INR, USD, EUR) uses exactly two
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole major units.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(500).cents(), 50_000);
    /// ```
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Parses a decimal string in major units (`"12"`, `"12.5"`, `"12.50"`).
    ///
    /// Used for admin forms and configuration. More than two fractional
    /// digits is rejected rather than silently rounded.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// assert_eq!(Money::parse_major("12.5").unwrap().cents(), 1250);
    /// assert_eq!(Money::parse_major("-0.07").unwrap().cents(), -7);
    /// assert!(Money::parse_major("1.999").is_err());
    /// ```
    pub fn parse_major(input: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (major_part, minor_part) = match digits.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (digits, ""),
        };

        if major_part.is_empty() && minor_part.is_empty() {
            return Err(invalid("amount is empty"));
        }
        if minor_part.len() > 2 {
            return Err(invalid("at most two decimal places are allowed"));
        }
        if !major_part.chars().all(|c| c.is_ascii_digit())
            || !minor_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("must be a decimal number"));
        }

        let major: i64 = if major_part.is_empty() {
            0
        } else {
            major_part
                .parse()
                .map_err(|_| invalid("amount is too large"))?
        };
        let minor: i64 = match minor_part.len() {
            0 => 0,
            1 => minor_part.parse::<i64>().map_err(|_| invalid("bad fraction"))? * 10,
            _ => minor_part.parse().map_err(|_| invalid("bad fraction"))?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(|| invalid("amount is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        Money(self.0.min(other.0))
    }

    /// Returns the larger of two amounts.
    #[inline]
    pub fn max(self, other: Money) -> Money {
        Money(self.0.max(other.0))
    }

    /// Negative amounts become zero.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let owed = Money::from_cents(300) - Money::from_cents(500);
    /// assert_eq!(owed.clamp_non_negative(), Money::zero());
    /// ```
    #[inline]
    pub fn clamp_non_negative(self) -> Money {
        self.max(Money::zero())
    }

    /// Multiplies money by a quantity.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }

    /// `self × qty`, or `None` if the product does not fit in an i64.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// assert!(Money::from_cents(i64::MAX / 2).checked_multiply_quantity(3).is_none());
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: u32) -> Option<Self> {
        match self.0.checked_mul(qty as i64) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// `self + other`, or `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// `self + other`, pinned to the i64 bounds.
    #[inline]
    pub const fn saturating_add(self, other: Money) -> Self {
        Money(self.0.saturating_add(other.0))
    }

    /// Computes `self × rate`, rounded half-up to the minor unit.
    ///
    /// ## Implementation
    /// Integer math on i128: `(|amount| * bps + 5000) / 10000`, sign restored.
    /// The +5000 is the half (5000/10000 = 0.5), so 0.5 of a cent rounds
    /// away from zero.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    /// use storefront_core::coupon::Percentage;
    ///
    /// // 10.05 × 12.5% = 1.25625 → 1.26
    /// let amount = Money::from_cents(1005);
    /// assert_eq!(amount.percentage_of(Percentage::from_bps(1250)).cents(), 126);
    /// ```
    pub fn percentage_of(&self, rate: Percentage) -> Money {
        let magnitude = (i128::from(self.0).abs() * i128::from(rate.bps()) + 5000) / 10000;
        let signed = if self.0 < 0 { -magnitude } else { magnitude };
        // |result| <= |self| because bps <= 10000, so this never truncates
        Money(signed as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders `1234` as `12.34`. Currency symbols are a frontend concern.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Saturates instead of overflowing. Cart validation rejects totals that
/// would get this far.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Money::saturating_add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
