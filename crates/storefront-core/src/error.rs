//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                     │
//! │  ├── CoreError        - Faults: malformed coupon data, bad input        │
//! │  └── ValidationError  - Admin input validation failures                 │
//! │                                                                         │
//! │  NOT errors: eligibility::Rejection                                     │
//! │  └── An ineligible coupon is an expected outcome, returned in Ok(..)    │
//! │                                                                         │
//! │  storefront-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  storefront-checkout errors                                             │
//! │  └── ApiError         - What the HTTP collaborator serializes           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::coupon::DiscountType;

// =============================================================================
// Core Error
// =============================================================================

/// Faults raised by the coupon engine.
///
/// These are programming or data errors, never "this coupon does not apply".
/// Callers should log them and surface a generic failure.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A stored discount type tag is outside the known set.
    ///
    /// ## When This Occurs
    /// - A coupon row was written by a newer release
    /// - Manual edits to the coupons table
    #[error("Unknown discount type: {0}")]
    UnknownDiscountType(String),

    /// The discount variant is recognised but has no arithmetic yet.
    ///
    /// ## When This Occurs
    /// A `buyXForY`, `buyXGetYFree` or `tierPricing` coupon passed every
    /// eligibility check. The engine refuses to guess a formula.
    #[error("Discount type {0} is not supported for calculation")]
    UnsupportedDiscountType(DiscountType),

    /// Cart data handed to the engine is inconsistent.
    #[error("Invalid cart: {reason}")]
    InvalidCart { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when an administrator's coupon draft or a cart line doesn't
/// meet requirements.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, bad amount string).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Two fields contradict each other.
    #[error("{field} is inconsistent: {reason}")]
    Inconsistent { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
