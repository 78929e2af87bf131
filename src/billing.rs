//! Bill computation.
//!
//! Deterministic pricing breakdown for a consultation. The invariant is
//! `total == subtotal + tax_amount + appointment_fee + round_off`; the
//! result is snapshotted onto the prescription, never re-derived.

use chrono::{Duration, NaiveDate};

use crate::models::enums::TaxType;
use crate::models::BillDetails;

/// Tax configuration as entered in clinic settings / the billing form.
#[derive(Debug, Clone, Copy)]
pub struct TaxConfig {
    pub tax_type: TaxType,
    pub percent: f64,
}

impl TaxConfig {
    pub fn none() -> Self {
        Self {
            tax_type: TaxType::None,
            percent: 0.0,
        }
    }
}

/// Compute the bill for a set of line-item prices.
///
/// `round_off` is the hand-entered signed rounding adjustment; the due
/// date is `issued_on` plus the clinic's receipt validity window.
pub fn compute_bill(
    prices: &[f64],
    tax: TaxConfig,
    appointment_fee: f64,
    round_off: f64,
    receipt_validity_days: u32,
    issued_on: NaiveDate,
) -> BillDetails {
    let subtotal: f64 = prices.iter().sum();
    let tax_amount = match tax.tax_type {
        TaxType::None => 0.0,
        TaxType::Gst | TaxType::Vat => subtotal * tax.percent / 100.0,
    };
    let total = subtotal + tax_amount + appointment_fee + round_off;

    BillDetails {
        tax_type: tax.tax_type,
        tax_percent: tax.percent,
        tax_amount,
        appointment_fee,
        round_off,
        subtotal,
        total,
        due_date: issued_on + Duration::days(receipt_validity_days as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
    }

    fn assert_invariant(bill: &BillDetails) {
        let derived = bill.subtotal + bill.tax_amount + bill.appointment_fee + bill.round_off;
        assert!(
            (bill.total - derived).abs() < 1e-9,
            "total {} != derived {derived}",
            bill.total
        );
    }

    #[test]
    fn subtotal_is_sum_of_prices() {
        let bill = compute_bill(&[30.0, 20.0, 10.5], TaxConfig::none(), 0.0, 0.0, 7, day());
        assert_eq!(bill.subtotal, 60.5);
        assert_eq!(bill.total, 60.5);
        assert_invariant(&bill);
    }

    #[test]
    fn tax_applies_percentage_of_subtotal() {
        let tax = TaxConfig { tax_type: TaxType::Gst, percent: 10.0 };
        let bill = compute_bill(&[50.0], tax, 0.0, 0.0, 7, day());
        assert!((bill.tax_amount - 5.0).abs() < 1e-9);
        assert!((bill.total - 55.0).abs() < 1e-9);
        assert_invariant(&bill);
    }

    #[test]
    fn fee_and_round_off_participate() {
        let tax = TaxConfig { tax_type: TaxType::Vat, percent: 5.0 };
        let bill = compute_bill(&[100.0], tax, 20.0, -0.25, 7, day());
        assert!((bill.total - 124.75).abs() < 1e-9);
        assert_invariant(&bill);
    }

    #[test]
    fn zero_valued_optional_fields() {
        // Every optional component zero, including an empty item list
        let bill = compute_bill(&[], TaxConfig::none(), 0.0, 0.0, 0, day());
        assert_eq!(bill.subtotal, 0.0);
        assert_eq!(bill.total, 0.0);
        assert_eq!(bill.due_date, day());
        assert_invariant(&bill);
    }

    #[test]
    fn tax_percent_ignored_when_no_tax_type() {
        // Percentage configured but tax type none — no tax charged
        let tax = TaxConfig { tax_type: TaxType::None, percent: 18.0 };
        let bill = compute_bill(&[100.0], tax, 0.0, 0.0, 7, day());
        assert_eq!(bill.tax_amount, 0.0);
        assert_invariant(&bill);
    }

    #[test]
    fn due_date_offsets_by_validity_window() {
        let bill = compute_bill(&[10.0], TaxConfig::none(), 0.0, 0.0, 7, day());
        assert_eq!(bill.due_date, NaiveDate::from_ymd_opt(2026, 9, 6).unwrap());
    }

    #[test]
    fn invariant_holds_across_combinations() {
        let taxes = [
            TaxConfig::none(),
            TaxConfig { tax_type: TaxType::Gst, percent: 12.0 },
            TaxConfig { tax_type: TaxType::Vat, percent: 7.5 },
        ];
        for tax in taxes {
            for fee in [0.0, 15.0] {
                for round_off in [0.0, 0.5, -0.5] {
                    let bill = compute_bill(&[12.0, 48.0], tax, fee, round_off, 7, day());
                    assert_invariant(&bill);
                }
            }
        }
    }
}
