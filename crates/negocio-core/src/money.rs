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
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Catalog prices here are whole pesos (e.g. $ 180.000), and the IVA      │
//! │  split divides by (1 + rate). Doing that in floats slowly smears        │
//! │  centavos across invoices.                                              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Pesos                                            │
//! │    The split is one integer division with explicit rounding, and        │
//! │    base + tax reconstructs the listed price exactly.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use negocio_core::money::Money;
//!
//! // Create from whole pesos (the only constructor)
//! let price = Money::from_pesos(180_000);
//!
//! // Arithmetic operations
//! let doubled = price * 2;
//! let total = price + Money::from_pesos(10_000);
//! assert_eq!(total.pesos(), 190_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in whole pesos.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for corrections and refunds
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for gateway payloads
///
/// Every monetary value in the system flows through this type: product
/// prices, cart line subtotals, invoice totals, and kardex valuations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole pesos.
    ///
    /// ## Example
    /// ```rust
    /// use negocio_core::money::Money;
    ///
    /// let price = Money::from_pesos(50_000);
    /// assert_eq!(price.pesos(), 50_000);
    /// ```
    #[inline]
    pub const fn from_pesos(pesos: i64) -> Self {
        Money(pesos)
    }

    /// Returns the value in whole pesos.
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0
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

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Strips the IVA already contained in a tax-inclusive price.
    ///
    /// Catalog prices include IVA, so the pre-tax base is recovered by
    /// dividing by (1 + rate), not by multiplying the rate onto the price.
    ///
    /// ## Implementation
    /// Integer math with round-half-up:
    /// `(pesos * 10000 + (10000 + bps) / 2) / (10000 + bps)`
    ///
    /// A zero rate returns the price unchanged.
    ///
    /// ## Example
    /// ```rust
    /// use negocio_core::money::Money;
    /// use negocio_core::types::TaxRate;
    ///
    /// let price = Money::from_pesos(119_000); // includes 19% IVA
    /// let rate = TaxRate::from_bps(1900);
    ///
    /// assert_eq!(price.tax_exclusive(rate).pesos(), 100_000);
    /// ```
    pub fn tax_exclusive(&self, rate: TaxRate) -> Money {
        if rate.is_zero() {
            return *self;
        }
        // Use i128 to prevent overflow on large amounts
        let divisor = 10_000i128 + rate.bps() as i128;
        let base = (self.0 as i128 * 10_000 + divisor / 2) / divisor;
        Money(base as i64)
    }

    /// Returns the IVA portion contained in a tax-inclusive price.
    ///
    /// Defined as the complement of [`Money::tax_exclusive`], so
    /// `tax_exclusive + included_tax == price` holds exactly for every
    /// unit price and rate.
    ///
    /// ## Example
    /// ```rust
    /// use negocio_core::money::Money;
    /// use negocio_core::types::TaxRate;
    ///
    /// let price = Money::from_pesos(119_000);
    /// let rate = TaxRate::from_bps(1900);
    ///
    /// assert_eq!(price.included_tax(rate).pesos(), 19_000);
    /// ```
    pub fn included_tax(&self, rate: TaxRate) -> Money {
        *self - self.tax_exclusive(rate)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use negocio_core::money::Money;
    ///
    /// let unit_price = Money::from_pesos(50_000);
    /// let line_total = unit_price.multiply_quantity(2);
    /// assert_eq!(line_total.pesos(), 100_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in the shop's convention:
/// `$ 1.234.567` with dot-grouped thousands and no decimals.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}$ {}", sign, grouped(self.0.unsigned_abs()))
    }
}

/// Groups digits in threes with dots: 290000 → "290.000".
fn grouped(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut parts: Vec<String> = Vec::new();
    while n > 0 {
        if n >= 1000 {
            parts.push(format!("{:03}", n % 1000));
        } else {
            parts.push(format!("{}", n % 1000));
        }
        n /= 1000;
    }
    parts.reverse();
    parts.join(".")
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pesos() {
        let money = Money::from_pesos(180_000);
        assert_eq!(money.pesos(), 180_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_pesos(290_000)), "$ 290.000");
        assert_eq!(format!("{}", Money::from_pesos(1_234_567)), "$ 1.234.567");
        assert_eq!(format!("{}", Money::from_pesos(500)), "$ 500");
        assert_eq!(format!("{}", Money::from_pesos(-5_000)), "-$ 5.000");
        assert_eq!(format!("{}", Money::from_pesos(0)), "$ 0");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_pesos(100_000);
        let b = Money::from_pesos(50_000);

        assert_eq!((a + b).pesos(), 150_000);
        assert_eq!((a - b).pesos(), 50_000);
        let result: Money = a * 3;
        assert_eq!(result.pesos(), 300_000);
    }

    #[test]
    fn test_tax_exclusive_zero_rate() {
        let price = Money::from_pesos(180_000);
        assert_eq!(price.tax_exclusive(TaxRate::zero()), price);
        assert_eq!(price.included_tax(TaxRate::zero()), Money::zero());
    }

    #[test]
    fn test_tax_exclusive_exact_split() {
        // $ 119.000 with 19% IVA included: base $ 100.000, tax $ 19.000
        let price = Money::from_pesos(119_000);
        let rate = TaxRate::from_bps(1900);

        assert_eq!(price.tax_exclusive(rate).pesos(), 100_000);
        assert_eq!(price.included_tax(rate).pesos(), 19_000);
    }

    #[test]
    fn test_split_reconstructs_price() {
        // base + tax must equal the listed price for awkward rates too
        for pesos in [1, 17, 999, 50_000, 180_001, 7_777_777] {
            for bps in [0u32, 500, 825, 1600, 1900] {
                let price = Money::from_pesos(pesos);
                let rate = TaxRate::from_bps(bps);
                assert_eq!(
                    price.tax_exclusive(rate) + price.included_tax(rate),
                    price,
                    "pesos={} bps={}",
                    pesos,
                    bps
                );
            }
        }
    }

    #[test]
    fn test_split_within_tolerance_of_exact_ratio() {
        // tax_exclusive * (1 + rate) must land within one peso of the price
        let price = Money::from_pesos(180_000);
        let rate = TaxRate::from_bps(1900);
        let base = price.tax_exclusive(rate).pesos() as f64;
        let reconstructed = base * 1.19;
        assert!((reconstructed - 180_000.0).abs() <= 1.19);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_pesos(50_000);
        let line_total = unit_price.multiply_quantity(2);
        assert_eq!(line_total.pesos(), 100_000);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let refund = Money::from_pesos(-100);
        assert!(refund.is_negative());
        assert_eq!(refund.abs().pesos(), 100);
    }
}
