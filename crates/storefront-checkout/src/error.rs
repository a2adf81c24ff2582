//! # API Error Type
//!
//! Unified error type for checkout operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Checkout                           │
//! │                                                                         │
//! │  CouponService::validate("SAVE10", cart, user, now)                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Database Error? ─── DbError::QueryFailed(..) ──────┐                   │
//! │         │                                           │                   │
//! │         ▼                                           ▼                   │
//! │  Engine fault? ─── CoreError::InvalidCart ─────► ApiError (Err)         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Coupon does not apply? ──► CouponValidation { ok: false } (Ok)         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Applies ─────────────────► CouponValidation { ok: true }  (Ok)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A rejected coupon is never an `ApiError`. Errors are reserved for faults
//! the shopper cannot fix by changing their cart.

use serde::Serialize;
use ts_rs::TS;

use crate::config::ConfigError;
use storefront_core::CoreError;
use storefront_db::DbError;

/// Error returned from checkout operations.
///
/// ## Serialization
/// ```json
/// {
///   "code": "UNSUPPORTED_DISCOUNT",
///   "message": "Discount type buyXForY is not supported for calculation"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Cart data the engine cannot evaluate (400)
    CartError,

    /// Coupon variant with no discount formula (422)
    UnsupportedDiscount,

    /// Stored data failed to decode (500)
    DataIntegrity,

    /// Database operation failed (500)
    DatabaseError,

    /// Bad or missing configuration
    Configuration,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::CorruptRecord { entity, id, reason } => {
                tracing::error!(entity = %entity, id = %id, "Corrupt record: {}", reason);
                ApiError::new(
                    ErrorCode::DataIntegrity,
                    format!("{} {} could not be read", entity, id),
                )
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownDiscountType(tag) => {
                tracing::error!(tag = %tag, "Unknown discount type reached the engine");
                ApiError::new(
                    ErrorCode::DataIntegrity,
                    format!("Unknown discount type: {}", tag),
                )
            }
            e @ CoreError::UnsupportedDiscountType(_) => {
                tracing::warn!("{}", e);
                ApiError::new(ErrorCode::UnsupportedDiscount, e.to_string())
            }
            CoreError::InvalidCart { reason } => {
                ApiError::new(ErrorCode::CartError, format!("Invalid cart: {}", reason))
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

/// Converts configuration errors to API errors.
impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::Configuration, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Convenience type alias for checkout results.
pub type CheckoutResult<T> = Result<T, ApiError>;
