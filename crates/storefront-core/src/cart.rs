//! # Cart
//!
//! Cart lines as the coupon engine sees them, plus the mutable [`Cart`]
//! the storefront keeps per shopper.
//!
//! ## Cart vs CartSnapshot
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart (mutable, per session)          CartSnapshot (engine input)       │
//! │  ───────────────────────────          ────────────────────────────      │
//! │  add_line / remove_line               lines       (frozen prices)       │
//! │  merge by product + attributes        cart_total  (caller supplied)     │
//! │            │                                                            │
//! │            └────── snapshot() ──────► cart_total = Σ price × qty        │
//! │                                                                         │
//! │  A caller that applies other pre-discount adjustments builds the        │
//! │  snapshot with `CartSnapshot::with_total` instead.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::MAX_CART_ITEMS;

// =============================================================================
// Variant Attributes
// =============================================================================

/// Product variant attributes (`size = "M"`, `colour = "teal"`).
///
/// Keys are trimmed and lowercased, values trimmed. Equality is structural
/// over the normalized pairs, so insertion order never matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, TS)]
#[ts(export)]
pub struct VariantAttributes(BTreeMap<String, String>);

impl VariantAttributes {
    pub fn new() -> Self {
        VariantAttributes(BTreeMap::new())
    }

    /// Inserts a pair, replacing any value already stored under the key.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl AsRef<str>) {
        self.0.insert(
            key.as_ref().trim().to_lowercase(),
            value.as_ref().trim().to_string(),
        );
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(&key.trim().to_lowercase()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for VariantAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = VariantAttributes::new();
        for (key, value) in iter {
            attributes.insert(key, value);
        }
        attributes
    }
}

impl<'de> Deserialize<'de> for VariantAttributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One line of a cart at evaluation time.
///
/// ## Snapshot Pattern
/// `unit_price` is frozen when the line is added, so a price edit in the
/// catalog does not change a discount mid-checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub category_id: Option<String>,
    pub unit_price: Money,
    pub quantity: u32,
    #[serde(default)]
    pub attributes: VariantAttributes,
}

impl CartLine {
    /// Creates an uncategorised line without variant attributes.
    pub fn new(product_id: impl Into<String>, unit_price: Money, quantity: u32) -> Self {
        CartLine {
            product_id: product_id.into(),
            category_id: None,
            unit_price,
            quantity,
            attributes: VariantAttributes::new(),
        }
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn with_attribute(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.attributes.insert(key, value);
        self
    }

    /// `unit_price × quantity`.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Same product and same variant.
    pub fn is_same_variant(&self, other: &CartLine) -> bool {
        self.product_id == other.product_id && self.attributes == other.attributes
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.product_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "product_id".to_string(),
            });
        }
        crate::validation::validate_quantity(self.quantity)?;
        crate::validation::validate_non_negative("unit_price", self.unit_price)?;
        if self.unit_price.checked_multiply_quantity(self.quantity).is_none() {
            return Err(ValidationError::OutOfRange {
                field: "unit_price".to_string(),
                min: 0,
                max: i64::MAX / i64::from(self.quantity),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A shopper's cart.
///
/// ## Invariants
/// - lines are unique by product + variant attributes
/// - every quantity is within 1..=MAX_ITEM_QUANTITY
/// - at most MAX_CART_ITEMS lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds a line, merging into an existing line of the same variant.
    pub fn add_line(&mut self, line: CartLine) -> CoreResult<()> {
        line.validate()?;

        if let Some(existing) = self.lines.iter_mut().find(|l| l.is_same_variant(&line)) {
            let merged = CartLine {
                quantity: existing.quantity.saturating_add(line.quantity),
                ..existing.clone()
            };
            merged.validate()?;
            existing.quantity = merged.quantity;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::InvalidCart {
                reason: format!("cart cannot have more than {MAX_CART_ITEMS} lines"),
            });
        }

        self.lines.push(line);
        Ok(())
    }

    /// Removes the line for a product variant. Returns whether one was removed.
    pub fn remove_line(&mut self, product_id: &str, attributes: &VariantAttributes) -> bool {
        let before = self.lines.len();
        self.lines
            .retain(|l| !(l.product_id == product_id && &l.attributes == attributes));
        self.lines.len() != before
    }

    /// Σ unit_price × quantity.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn total_quantity(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, l| acc.saturating_add(l.quantity))
    }

    /// Freezes the cart for evaluation, with `cart_total = subtotal()`.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::from_lines(self.lines.clone())
    }
}

// =============================================================================
// Cart Snapshot
// =============================================================================

/// The cart as handed to the coupon engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    /// Pre-discount total computed by the caller.
    pub cart_total: Money,
}

impl CartSnapshot {
    /// Snapshot whose total is the plain sum of its lines.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let cart_total = lines.iter().map(CartLine::line_total).sum();
        CartSnapshot { lines, cart_total }
    }

    /// Snapshot with a caller-adjusted total.
    pub fn with_total(lines: Vec<CartLine>, cart_total: Money) -> Self {
        CartSnapshot { lines, cart_total }
    }

    pub fn total_quantity(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, l| acc.saturating_add(l.quantity))
    }

    /// Rejects data the engine cannot reason about: empty product ids,
    /// zero or oversized quantities, negative prices or totals, and amounts
    /// too large to sum in an i64.
    pub fn validate(&self) -> CoreResult<()> {
        if self.lines.len() > MAX_CART_ITEMS {
            return Err(CoreError::InvalidCart {
                reason: format!("cart cannot have more than {MAX_CART_ITEMS} lines"),
            });
        }
        for line in &self.lines {
            line.validate().map_err(|e| CoreError::InvalidCart {
                reason: format!("line {}: {e}", line.product_id),
            })?;
        }
        self.lines
            .iter()
            .try_fold(Money::zero(), |acc, line| acc.checked_add(line.line_total()))
            .ok_or_else(|| CoreError::InvalidCart {
                reason: "sum of line totals is too large".to_string(),
            })?;
        if self.cart_total.is_negative() {
            return Err(CoreError::InvalidCart {
                reason: "cart total cannot be negative".to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
