//! Totals engine: pure aggregation of a record snapshot into the summary
//! figures. Recomputed on every view, never stored independently of its
//! inputs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::round_cents;
use crate::record::{ExpenseRecord, PaidBy};

/// Summary figures for one submission.
///
/// Invariant: `total_spend == company_paid + employee_paid` exactly, at
/// 2-decimal precision. `reimbursement_due = per_diem_total + employee_paid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub total_spend: Decimal,
    pub company_paid: Decimal,
    pub employee_paid: Decimal,
    /// The daily rate the per-diem was priced at, kept for rendering.
    pub per_diem_rate: Decimal,
    pub per_diem_total: Decimal,
    pub reimbursement_due: Decimal,
}

impl Totals {
    pub fn zero() -> Self {
        Totals {
            total_spend: Decimal::ZERO,
            company_paid: Decimal::ZERO,
            employee_paid: Decimal::ZERO,
            per_diem_rate: Decimal::ZERO,
            per_diem_total: Decimal::ZERO,
            reimbursement_due: Decimal::ZERO,
        }
    }

    /// Aggregate a record snapshot. Pure; an empty snapshot yields all
    /// zeros plus whatever per diem the trip length earns.
    pub fn compute(records: &[ExpenseRecord], per_diem_rate: Decimal, trip_days: u32) -> Self {
        let mut total_spend = Decimal::ZERO;
        let mut company_paid = Decimal::ZERO;
        let mut employee_paid = Decimal::ZERO;

        for record in records {
            let amount = round_cents(record.amount);
            total_spend += amount;
            match record.paid_by {
                PaidBy::Company => company_paid += amount,
                PaidBy::Employee => employee_paid += amount,
            }
        }

        let per_diem_total = round_cents(per_diem_rate * Decimal::from(trip_days));
        Totals {
            total_spend,
            company_paid,
            employee_paid,
            per_diem_rate,
            per_diem_total,
            reimbursement_due: per_diem_total + employee_paid,
        }
    }
}
