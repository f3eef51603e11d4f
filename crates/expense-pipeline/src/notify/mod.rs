//! Notification composer: builds the outgoing message from the same
//! totals/metadata the report was rendered from, and dispatches via an
//! injected [`Mailer`]. The body restates every total and line item so
//! finance has a human-readable audit copy independent of the workbook.

mod lettre_smtp;

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use expense_core::config::ReportConfig;
use expense_core::money::format_usd;
use expense_core::record::ExpenseRecord;
use expense_core::totals::Totals;
use expense_core::trip::TripInfo;

use crate::bundle::AttachmentSet;

pub use lettre_smtp::{SmtpMailer, SmtpSettings};

/// Error from dispatching a notification. Any transport failure is a
/// delivery failure, never a partial success.
#[derive(Debug, Clone)]
pub struct MailError(pub String);

impl std::fmt::Display for MailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for MailError {}

/// The composed outbound message. Recipients come from configuration and
/// the form, never from code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub from: String,
    pub to: String,
    pub cc: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Mail dispatch abstraction. Implement and inject; tests use recording or
/// failing doubles.
pub trait Mailer: Send + Sync {
    fn send(&self, message: &NotificationMessage, attachments: &AttachmentSet)
    -> Result<(), MailError>;
}

/// Collapse line breaks; many mail transports reject multi-line subjects.
fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn date_text(date: Option<chrono::NaiveDate>) -> String {
    date.map_or_else(|| "unknown".to_string(), |d| d.format("%Y-%m-%d").to_string())
}

/// Build subject, body, and recipient set for one submission.
pub fn compose_notification(
    trip: &TripInfo,
    totals: &Totals,
    records: &[ExpenseRecord],
    config: &ReportConfig,
) -> NotificationMessage {
    let subject = single_line(&format!(
        "Expense Report Submitted, {}, {}, {} to {}, Reimbursement {}",
        trip.employee_name,
        trip.location,
        date_text(trip.departure_date),
        date_text(trip.return_date),
        format_usd(totals.reimbursement_due),
    ));

    let mut body = String::new();
    let _ = writeln!(body, "Expense Report Submitted");
    let _ = writeln!(body);
    let _ = writeln!(body, "Employee: {}", trip.employee_name);
    let _ = writeln!(body, "Employee Email: {}", trip.employee_email);
    let _ = writeln!(body, "Trip: {}", trip.location);
    let _ = writeln!(body, "Purpose: {}", trip.purpose);
    let _ = writeln!(
        body,
        "Dates: {} to {} ({} day(s))",
        date_text(trip.departure_date),
        date_text(trip.return_date),
        trip.trip_days(),
    );
    let _ = writeln!(body, "Per Diem Rate: {}", format_usd(totals.per_diem_rate));
    let _ = writeln!(body, "Per Diem Total: {}", format_usd(totals.per_diem_total));
    let _ = writeln!(body, "Total Spend: {}", format_usd(totals.total_spend));
    let _ = writeln!(body, "Company Paid: {}", format_usd(totals.company_paid));
    let _ = writeln!(body, "Employee Paid: {}", format_usd(totals.employee_paid));
    let _ = writeln!(body, "Reimbursement Due: {}", format_usd(totals.reimbursement_due));
    let _ = writeln!(body);
    let _ = writeln!(body, "Line items:");
    for (i, record) in records.iter().enumerate() {
        let receipt_note = if record.has_receipt() {
            "receipt attached"
        } else {
            "no receipt"
        };
        let _ = writeln!(
            body,
            "{}. {}, {}, {}, Paid by {}, {}, {}",
            i + 1,
            record.category.label(),
            date_text(record.date),
            record.description.as_deref().unwrap_or("-"),
            record.paid_by.label(),
            format_usd(record.amount),
            receipt_note,
        );
    }
    let _ = writeln!(body);
    let _ = writeln!(body, "Excel report attached. Receipts attached.");

    NotificationMessage {
        from: config.sender_email.clone(),
        to: config.finance_email.clone(),
        cc: vec![config.approver_email.clone(), trip.employee_email.clone()],
        subject,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use expense_core::record::{ExpenseCategory, PaidBy};
    use rust_decimal_macros::dec;

    fn config() -> ReportConfig {
        ReportConfig {
            per_diem_rate: dec!(100),
            max_attachment_mb: dec!(18),
            sender_email: "reports@example.com".into(),
            finance_email: "finance@example.com".into(),
            approver_email: "approver@example.com".into(),
        }
    }

    fn trip() -> TripInfo {
        TripInfo {
            employee_name: "Dana Flores".into(),
            employee_email: "dana@example.com".into(),
            location: "Austin".into(),
            purpose: "Client onboarding".into(),
            departure_date: NaiveDate::from_ymd_opt(2025, 3, 10),
            return_date: NaiveDate::from_ymd_opt(2025, 3, 12),
        }
    }

    fn records() -> Vec<ExpenseRecord> {
        vec![ExpenseRecord {
            category: ExpenseCategory::Airfare,
            date: NaiveDate::from_ymd_opt(2025, 3, 10),
            description: Some("Round trip".into()),
            amount: dec!(250.00),
            paid_by: PaidBy::Employee,
            receipt: None,
        }]
    }

    #[test]
    fn recipients_come_from_config_and_form() {
        let totals = Totals::compute(&records(), dec!(100), 3);
        let message = compose_notification(&trip(), &totals, &records(), &config());
        assert_eq!(message.from, "reports@example.com");
        assert_eq!(message.to, "finance@example.com");
        assert_eq!(message.cc, vec!["approver@example.com", "dana@example.com"]);
    }

    #[test]
    fn subject_is_single_line_with_context() {
        let mut t = trip();
        t.location = "Austin\nTX".into();
        let totals = Totals::compute(&records(), dec!(100), 3);
        let message = compose_notification(&t, &totals, &records(), &config());
        assert!(!message.subject.contains('\n'));
        assert!(message.subject.contains("Dana Flores"));
        assert!(message.subject.contains("2025-03-10 to 2025-03-12"));
        assert!(message.subject.contains("$550.00"));
    }

    #[test]
    fn body_restates_every_total_and_line_item() {
        let totals = Totals::compute(&records(), dec!(100), 3);
        let message = compose_notification(&trip(), &totals, &records(), &config());
        for expected in [
            "Per Diem Total: $300.00",
            "Total Spend: $250.00",
            "Company Paid: $0.00",
            "Employee Paid: $250.00",
            "Reimbursement Due: $550.00",
            "1. Airfare, 2025-03-10, Round trip, Paid by Employee, $250.00, no receipt",
        ] {
            assert!(message.body.contains(expected), "missing: {expected}");
        }
    }
}
