//! Expense line items. The form collaborator hands over loosely typed
//! payloads ([`RawExpense`]); everything past the boundary is a fixed,
//! tagged [`ExpenseRecord`] that is immutable once added to a session.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::money::coerce_amount;

/// Fixed expense categories offered by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpenseCategory {
    Airfare,
    #[serde(rename = "Airport Parking")]
    AirportParking,
    #[serde(rename = "Taxi/Uber")]
    TaxiOrUber,
    Hotel,
    #[serde(rename = "Rental Car")]
    RentalCar,
    Gas,
    Other,
}

impl ExpenseCategory {
    pub fn label(self) -> &'static str {
        match self {
            ExpenseCategory::Airfare => "Airfare",
            ExpenseCategory::AirportParking => "Airport Parking",
            ExpenseCategory::TaxiOrUber => "Taxi/Uber",
            ExpenseCategory::Hotel => "Hotel",
            ExpenseCategory::RentalCar => "Rental Car",
            ExpenseCategory::Gas => "Gas",
            ExpenseCategory::Other => "Other",
        }
    }

    /// Lenient parse of a form value. Unknown categories normalize to
    /// `Other` with a data-quality warning rather than failing the add.
    /// The long-form labels are what older form revisions submitted.
    pub fn from_raw(raw: &str) -> Self {
        let raw = raw.trim();
        let known = [
            ("Airfare", ExpenseCategory::Airfare),
            ("Airport Parking", ExpenseCategory::AirportParking),
            ("Taxi/Uber", ExpenseCategory::TaxiOrUber),
            ("Taxi or Uber to Airport", ExpenseCategory::TaxiOrUber),
            ("Hotel", ExpenseCategory::Hotel),
            ("Rental Car", ExpenseCategory::RentalCar),
            ("Gas", ExpenseCategory::Gas),
            ("Gas for Rental Car", ExpenseCategory::Gas),
            ("Other", ExpenseCategory::Other),
        ];
        for (label, category) in known {
            if raw.eq_ignore_ascii_case(label) {
                return category;
            }
        }
        warn!(
            event = "record.category_unknown",
            domain = "expense",
            raw = raw,
            "unknown category normalized to Other"
        );
        ExpenseCategory::Other
    }
}

/// Who paid for a line item. Only `Employee` amounts count toward the
/// reimbursement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaidBy {
    Employee,
    Company,
}

impl PaidBy {
    pub fn label(self) -> &'static str {
        match self {
            PaidBy::Employee => "Employee",
            PaidBy::Company => "Company",
        }
    }

    /// Fail-safe parse: anything that is not recognizably company-paid
    /// counts as employee-paid, so a bad value inflates the reimbursement
    /// rather than silently shrinking it. Logged for later reconciliation.
    /// "Performa" is the company name an older form revision submitted in
    /// place of "Company".
    pub fn from_raw(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("company") {
            return PaidBy::Company;
        }
        if raw.eq_ignore_ascii_case("performa") {
            debug!(
                event = "record.paid_by_normalized",
                domain = "expense",
                raw = raw,
                "legacy company label normalized to Company"
            );
            return PaidBy::Company;
        }
        if !raw.eq_ignore_ascii_case("employee") {
            warn!(
                event = "record.paid_by_unknown",
                domain = "expense",
                raw = raw,
                "unrecognized paid-by value defaulted to Employee"
            );
        }
        PaidBy::Employee
    }
}

/// Uploaded receipt file. The media type is inferred from the filename at
/// bundling time, not stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// One expense line item. Created on "add expense", never mutated, only
/// removable from the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub category: ExpenseCategory,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub amount: Decimal,
    pub paid_by: PaidBy,
    pub receipt: Option<Receipt>,
}

impl ExpenseRecord {
    /// Normalize a raw form payload into a record. Never fails: amounts
    /// coerce per [`coerce_amount`], unknown enum values fall back to their
    /// documented defaults.
    pub fn from_raw(raw: RawExpense) -> Self {
        ExpenseRecord {
            category: ExpenseCategory::from_raw(&raw.category),
            date: raw.date,
            description: raw.description.filter(|d| !d.trim().is_empty()),
            amount: coerce_amount(raw.amount.as_deref()),
            paid_by: PaidBy::from_raw(&raw.paid_by),
            receipt: raw.receipt,
        }
    }

    /// True iff the amount is owed back to the employee.
    pub fn is_reimbursable(&self) -> bool {
        self.paid_by == PaidBy::Employee
    }

    pub fn has_receipt(&self) -> bool {
        self.receipt.is_some()
    }
}

/// The untyped "add expense" payload as submitted by the form collaborator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawExpense {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub paid_by: String,
    #[serde(default)]
    pub receipt: Option<Receipt>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn category_parses_current_and_legacy_labels() {
        assert_eq!(ExpenseCategory::from_raw("Taxi/Uber"), ExpenseCategory::TaxiOrUber);
        assert_eq!(
            ExpenseCategory::from_raw("Taxi or Uber to Airport"),
            ExpenseCategory::TaxiOrUber
        );
        assert_eq!(ExpenseCategory::from_raw("gas for rental car"), ExpenseCategory::Gas);
        assert_eq!(ExpenseCategory::from_raw("Snacks"), ExpenseCategory::Other);
    }

    #[test]
    fn paid_by_parses_current_and_legacy_labels() {
        assert_eq!(PaidBy::from_raw("company"), PaidBy::Company);
        assert_eq!(PaidBy::from_raw("Performa"), PaidBy::Company);
        assert_eq!(PaidBy::from_raw(" performa "), PaidBy::Company);
        assert_eq!(PaidBy::from_raw("Employee"), PaidBy::Employee);
    }

    #[test]
    fn unknown_paid_by_defaults_to_employee() {
        assert_eq!(PaidBy::from_raw(""), PaidBy::Employee);
        assert_eq!(PaidBy::from_raw("petty cash"), PaidBy::Employee);
    }

    #[test]
    fn from_raw_coerces_amount_and_blanks() {
        let record = ExpenseRecord::from_raw(RawExpense {
            category: "Hotel".into(),
            amount: Some("412.505".into()),
            paid_by: "Company".into(),
            description: Some("   ".into()),
            ..RawExpense::default()
        });
        assert_eq!(record.category, ExpenseCategory::Hotel);
        assert_eq!(record.amount, dec!(412.51));
        assert_eq!(record.paid_by, PaidBy::Company);
        assert_eq!(record.description, None);
        assert!(!record.is_reimbursable());
    }

    #[test]
    fn form_json_payload_deserializes() {
        let raw: RawExpense = serde_json::from_str(
            r#"{"category":"Airfare","date":"2025-03-10","amount":"250.00","paid_by":"Employee"}"#,
        )
        .unwrap();
        let record = ExpenseRecord::from_raw(raw);
        assert_eq!(record.category, ExpenseCategory::Airfare);
        assert_eq!(record.amount, dec!(250.00));
        assert!(record.is_reimbursable());
        assert!(!record.has_receipt());
    }
}
