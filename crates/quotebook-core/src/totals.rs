//! # Totals Module
//!
//! Line item aggregation: subtotal, tax and grand total.
//!
//! ## Why Decimal?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Fabrication quotes multiply fractional quantities (2.35 m², 12.5 ml)  │
//! │  by prices with cents, so integer cents are not enough either.         │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal::Decimal                                    │
//! │    96-bit mantissa, 28 digits of scale, exact + and ×                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Formula
//! ```text
//! line_total  = quantity × unit_price
//! subtotal    = Σ line_total
//! tax_amount  = subtotal × rate / 100
//! grand_total = subtotal + tax_amount
//! ```
//!
//! Negative quantities or prices are computed as given. Rejecting them is
//! the job of [`crate::validation`].

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::{LineItem, NewLineItem};
use crate::DEFAULT_TAX_RATE_PERCENT;

// =============================================================================
// Tax Rate
// =============================================================================

/// A tax rate expressed in percent (`20` = 20 %).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// Creates a tax rate from a percentage.
    #[inline]
    pub const fn from_percent(percent: Decimal) -> Self {
        TaxRate(percent)
    }

    /// Returns the rate in percent.
    #[inline]
    pub const fn percent(&self) -> Decimal {
        self.0
    }

    /// Zero tax rate (export, self-billing, ...).
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(Decimal::ZERO)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Tax due on `amount` at this rate, unrounded.
    pub fn tax_on(&self, amount: Decimal) -> CoreResult<Decimal> {
        amount
            .checked_mul(self.0)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .ok_or(CoreError::AmountOverflow { context: "tax amount" })
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate(Decimal::from(DEFAULT_TAX_RATE_PERCENT))
    }
}

// =============================================================================
// Line Amount
// =============================================================================

/// Anything priced as `quantity × unit_price`.
///
/// Implemented for both submitted lines and stored lines so the same
/// aggregation runs before insert and after read.
pub trait LineAmount {
    fn quantity(&self) -> Decimal;
    fn unit_price(&self) -> Decimal;

    /// `quantity × unit_price`, exact.
    fn line_total(&self) -> CoreResult<Decimal> {
        self.quantity()
            .checked_mul(self.unit_price())
            .ok_or(CoreError::AmountOverflow { context: "line total" })
    }
}

impl LineAmount for NewLineItem {
    fn quantity(&self) -> Decimal {
        self.quantity
    }

    fn unit_price(&self) -> Decimal {
        self.unit_price
    }
}

impl LineAmount for LineItem {
    fn quantity(&self) -> Decimal {
        self.quantity
    }

    fn unit_price(&self) -> Decimal {
        self.unit_price
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Financial totals of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Totals {
    #[ts(type = "string")]
    pub subtotal: Decimal,
    #[ts(type = "string")]
    pub tax_amount: Decimal,
    #[ts(type = "string")]
    pub grand_total: Decimal,
}

impl Totals {
    /// All-zero totals (a document with no lines).
    pub const fn zero() -> Self {
        Totals {
            subtotal: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            grand_total: Decimal::ZERO,
        }
    }

    /// Computes totals for a set of lines at the given tax rate.
    ///
    /// ## Example
    /// ```rust
    /// use quotebook_core::totals::{TaxRate, Totals};
    /// use quotebook_core::NewLineItem;
    /// use rust_decimal::Decimal;
    ///
    /// let lines = [
    ///     NewLineItem::new("Fenêtre", Decimal::new(2, 0), "u", Decimal::new(10000, 2)),
    ///     NewLineItem::new("Pose", Decimal::ONE, "forfait", Decimal::new(5000, 2)),
    /// ];
    /// let totals = Totals::aggregate(&lines, TaxRate::from_percent(Decimal::new(2000, 2))).unwrap();
    ///
    /// assert_eq!(totals.subtotal, Decimal::new(25000, 2));
    /// assert_eq!(totals.tax_amount, Decimal::new(5000, 2));
    /// assert_eq!(totals.grand_total, Decimal::new(30000, 2));
    /// ```
    pub fn aggregate<'a, L, I>(lines: I, rate: TaxRate) -> CoreResult<Totals>
    where
        L: LineAmount + 'a,
        I: IntoIterator<Item = &'a L>,
    {
        let mut subtotal = Decimal::ZERO;
        for line in lines {
            subtotal = subtotal
                .checked_add(line.line_total()?)
                .ok_or(CoreError::AmountOverflow { context: "subtotal" })?;
        }

        if subtotal.is_zero() {
            return Ok(Totals::zero());
        }

        let tax_amount = rate.tax_on(subtotal)?;
        let grand_total = subtotal
            .checked_add(tax_amount)
            .ok_or(CoreError::AmountOverflow { context: "grand total" })?;

        Ok(Totals {
            subtotal,
            tax_amount,
            grand_total,
        })
    }

    /// Rounds every amount to `dp` decimal places for presentation.
    ///
    /// Uses Bankers Rounding (half to even) so repeated rounding over many
    /// documents carries no systematic bias.
    pub fn rounded(&self, dp: u32) -> Totals {
        let round = |v: Decimal| v.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven);
        Totals {
            subtotal: round(self.subtotal),
            tax_amount: round(self.tax_amount),
            grand_total: round(self.grand_total),
        }
    }
}

impl Default for Totals {
    fn default() -> Self {
        Totals::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(qty: &str, price: &str) -> NewLineItem {
        NewLineItem::new("item", dec(qty), "u", dec(price))
    }

    #[test]
    fn test_aggregate_basic() {
        let lines = vec![line("2", "100.00"), line("1", "50.00")];
        let totals = Totals::aggregate(&lines, TaxRate::from_percent(dec("20.00"))).unwrap();

        assert_eq!(totals.subtotal, dec("250.00"));
        assert_eq!(totals.tax_amount, dec("50.00"));
        assert_eq!(totals.grand_total, dec("300.00"));
    }

    #[test]
    fn test_aggregate_empty_is_zero_for_any_rate() {
        let lines: Vec<NewLineItem> = Vec::new();
        for rate in ["0", "5.5", "20", "100"] {
            let totals = Totals::aggregate(&lines, TaxRate::from_percent(dec(rate))).unwrap();
            assert_eq!(totals, Totals::zero());
        }
    }

    #[test]
    fn test_fractional_quantities_stay_exact() {
        // 2.35 m² at 189.90 = 446.265, 12.5 ml at 7.08 = 88.5
        let lines = vec![line("2.35", "189.90"), line("12.5", "7.08")];
        let totals = Totals::aggregate(&lines, TaxRate::from_percent(dec("5.5"))).unwrap();

        assert_eq!(totals.subtotal, dec("534.765"));
        assert_eq!(totals.tax_amount, dec("29.412075"));
        assert_eq!(totals.grand_total, dec("564.177075"));
    }

    #[test]
    fn test_order_does_not_change_subtotal() {
        let forward = vec![line("0.1", "3"), line("0.2", "3"), line("7", "0.01")];
        let mut backward = forward.clone();
        backward.reverse();

        let rate = TaxRate::default();
        assert_eq!(
            Totals::aggregate(&forward, rate).unwrap(),
            Totals::aggregate(&backward, rate).unwrap()
        );
    }

    #[test]
    fn test_negative_values_are_computed_not_rejected() {
        // A discount row
        let lines = vec![line("1", "100"), line("1", "-10")];
        let totals = Totals::aggregate(&lines, TaxRate::zero()).unwrap();
        assert_eq!(totals.subtotal, dec("90"));
        assert_eq!(totals.grand_total, dec("90"));
    }

    #[test]
    fn test_grand_total_matches_rate_invariant() {
        let lines = vec![line("3", "41.17"), line("1.5", "12.30")];
        let rate = TaxRate::from_percent(dec("20"));
        let totals = Totals::aggregate(&lines, rate).unwrap();

        let expected = totals.subtotal * (Decimal::ONE + rate.percent() / Decimal::ONE_HUNDRED);
        assert_eq!(totals.grand_total, expected);
    }

    #[test]
    fn test_overflow_is_an_error() {
        let lines = vec![NewLineItem::new("huge", Decimal::MAX, "u", dec("2"))];
        let err = Totals::aggregate(&lines, TaxRate::default()).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow { .. }));
    }

    #[test]
    fn test_rounded_uses_bankers_rounding() {
        let totals = Totals {
            subtotal: dec("10.125"),
            tax_amount: dec("2.135"),
            grand_total: dec("12.26"),
        };
        let rounded = totals.rounded(2);
        assert_eq!(rounded.subtotal, dec("10.12"));
        assert_eq!(rounded.tax_amount, dec("2.14"));
        assert_eq!(rounded.grand_total, dec("12.26"));
    }

    #[test]
    fn test_default_tax_rate() {
        assert_eq!(TaxRate::default().percent(), dec("20"));
        assert!(TaxRate::zero().is_zero());
    }
}
