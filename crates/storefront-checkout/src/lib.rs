//! # storefront-checkout: Coupon Flows
//!
//! Glue between the storefront's HTTP layer and the coupon engine.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Request                                 │
//! │                                                                         │
//! │  HTTP handler ───► CouponService ───► storefront-db  (lookup, facts,    │
//! │       ▲                 │                             guarded redeem)   │
//! │       │                 ▼                                               │
//! │       │          storefront-core   (evaluate: pure, no I/O)             │
//! │       │                 │                                               │
//! │       └──── CouponValidation / ApiError ◄┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup
//! ```rust,ignore
//! let config = CheckoutConfig::load()?;
//! init_tracing(&config);
//! let db = Database::new(config.db_config()).await?;
//! let service = CouponService::new(db);
//! ```

pub mod config;
pub mod error;
pub mod service;

pub use config::{CheckoutConfig, ConfigError};
pub use error::{ApiError, CheckoutResult, ErrorCode};
pub use service::{CouponService, CouponValidation, PublicCoupon};

use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber with the configured filter.
///
/// An unparsable filter falls back to [`config::DEFAULT_LOG_FILTER`]. Calling
/// this twice is harmless; the second call leaves the first subscriber in place.
pub fn init_tracing(config: &CheckoutConfig) {
    let filter = EnvFilter::try_new(&config.log_filter)
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
