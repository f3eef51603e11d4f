//! The canonical submission pipeline: validate, total, render, bundle,
//! compose, dispatch. Each stage returns a typed error the caller can act
//! on; no stage is retried automatically. The session's line items survive
//! every failure and are cleared only after a successful dispatch.

use thiserror::Error;
use tracing::{info, warn};

use expense_core::config::ReportConfig;
use expense_core::session::ExpenseSession;
use expense_core::totals::Totals;
use expense_core::validate::{ValidationError, validate_submission};

use crate::bundle::{Attachment, SizeExceededError, bundle_attachments, receipt_attachments};
use crate::notify::{MailError, Mailer, compose_notification};
use crate::report::{ReportError, XLSX_MEDIA_TYPE, build_report, report_filename};

/// Why a submission was blocked or failed. Every variant is resolvable by
/// user action without losing entered line items.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    AttachmentsTooLarge(#[from] SizeExceededError),
    #[error("email delivery failed: {0}")]
    Delivery(#[from] MailError),
}

/// What a successful submission looked like, for the confirmation surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionSummary {
    pub report_filename: String,
    pub attachment_count: usize,
    pub total_bytes: u64,
    pub totals: Totals,
}

impl SubmissionSummary {
    pub fn confirmation(&self) -> String {
        format!(
            "Submitted successfully: {} plus {} receipt(s) sent. Check your email for the package.",
            self.report_filename,
            self.attachment_count - 1,
        )
    }
}

/// Run the whole pipeline for one session. Synchronous: the workbook
/// serialization and the mail dispatch are the only blocking calls, and
/// both complete before this returns.
pub fn submit_expense_report(
    session: &mut ExpenseSession,
    config: &ReportConfig,
    mailer: &dyn Mailer,
) -> Result<SubmissionSummary, SubmitError> {
    info!(
        event = "submit.started",
        domain = "expense",
        session_id = %session.id(),
        line_items = session.len()
    );
    validate_submission(&session.trip, session.records())?;

    let trip_days = session.trip.trip_days();
    let totals = Totals::compute(session.records(), config.per_diem_rate, trip_days);
    debug_assert_eq!(totals.total_spend, totals.company_paid + totals.employee_paid);

    let report_name = report_filename(&session.trip);
    let report_bytes = build_report(&session.trip, &totals, session.records())?;
    let report = Attachment {
        filename: report_name.clone(),
        bytes: report_bytes,
        media_type: XLSX_MEDIA_TYPE.to_string(),
    };
    let receipts = receipt_attachments(session.records(), &session.trip.employee_name);
    let attachments = bundle_attachments(report, receipts, config.max_attachment_bytes())?;

    let message = compose_notification(&session.trip, &totals, session.records(), config);
    if let Err(e) = mailer.send(&message, &attachments) {
        // Session state survives so the user can resubmit, not re-enter.
        warn!(
            event = "submit.delivery_failed",
            domain = "expense",
            session_id = %session.id(),
            error = %e
        );
        return Err(SubmitError::Delivery(e));
    }

    let summary = SubmissionSummary {
        report_filename: report_name,
        attachment_count: attachments.len(),
        total_bytes: attachments.total_bytes(),
        totals,
    };
    info!(
        event = "submit.succeeded",
        domain = "expense",
        session_id = %session.id(),
        attachments = summary.attachment_count,
        total_bytes = summary.total_bytes
    );
    session.clear();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use expense_core::record::{ExpenseCategory, ExpenseRecord, PaidBy, Receipt};
    use expense_core::trip::TripInfo;

    use crate::bundle::AttachmentSet;
    use crate::notify::NotificationMessage;

    /// Captures what was dispatched without touching a network.
    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(NotificationMessage, Vec<String>)>>,
    }

    impl Mailer for RecordingMailer {
        fn send(
            &self,
            message: &NotificationMessage,
            attachments: &AttachmentSet,
        ) -> Result<(), MailError> {
            let filenames = attachments.iter().map(|a| a.filename.clone()).collect();
            self.sent.lock().unwrap().push((message.clone(), filenames));
            Ok(())
        }
    }

    struct FailingMailer;

    impl Mailer for FailingMailer {
        fn send(&self, _: &NotificationMessage, _: &AttachmentSet) -> Result<(), MailError> {
            Err(MailError("550 mailbox unavailable".into()))
        }
    }

    fn config() -> ReportConfig {
        ReportConfig {
            per_diem_rate: dec!(100),
            max_attachment_mb: dec!(18),
            sender_email: "reports@example.com".into(),
            finance_email: "finance@example.com".into(),
            approver_email: "approver@example.com".into(),
        }
    }

    fn session() -> ExpenseSession {
        let mut session = ExpenseSession::new(TripInfo {
            employee_name: "Dana Flores".into(),
            employee_email: "dana@example.com".into(),
            location: "Austin".into(),
            purpose: "Client onboarding".into(),
            departure_date: NaiveDate::from_ymd_opt(2025, 3, 10),
            return_date: NaiveDate::from_ymd_opt(2025, 3, 12),
        });
        session.add(ExpenseRecord {
            category: ExpenseCategory::Airfare,
            date: NaiveDate::from_ymd_opt(2025, 3, 10),
            description: Some("Round trip".into()),
            amount: dec!(250.00),
            paid_by: PaidBy::Employee,
            receipt: Some(Receipt {
                filename: "ticket.pdf".into(),
                bytes: vec![0u8; 64],
            }),
        });
        session.add(ExpenseRecord {
            category: ExpenseCategory::Hotel,
            date: NaiveDate::from_ymd_opt(2025, 3, 11),
            description: None,
            amount: dec!(400.00),
            paid_by: PaidBy::Company,
            receipt: None,
        });
        session
    }

    #[test]
    fn happy_path_sends_package_and_clears_session() {
        let mut session = session();
        let mailer = RecordingMailer::default();
        let summary = submit_expense_report(&mut session, &config(), &mailer).unwrap();

        assert_eq!(summary.attachment_count, 2);
        assert_eq!(summary.totals.reimbursement_due, dec!(550.00));
        assert!(summary.confirmation().contains("1 receipt(s)"));
        assert!(session.is_empty());

        let sent = mailer.sent.lock().unwrap();
        let (message, filenames) = &sent[0];
        assert_eq!(message.to, "finance@example.com");
        assert_eq!(message.cc, vec!["approver@example.com", "dana@example.com"]);
        assert_eq!(
            filenames[0],
            "ExpenseReport_DanaFlores_Austin_20250310-20250312.xlsx"
        );
        assert_eq!(filenames[1], "01_Airfare_Dana_Flores.pdf");
    }

    #[test]
    fn validation_blocks_before_any_dispatch() {
        let mut session = session();
        session.trip.employee_email = String::new();
        session.trip.purpose = String::new();
        let mailer = RecordingMailer::default();
        let err = submit_expense_report(&mut session, &config(), &mailer).unwrap_err();

        match err {
            SubmitError::Validation(v) => {
                assert_eq!(v.problems, vec!["Employee Email", "Business Purpose"]);
            }
            other => panic!("expected validation error, got {other}"),
        }
        assert!(mailer.sent.lock().unwrap().is_empty());
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn oversized_bundle_is_rejected_with_exact_numbers() {
        let mut session = session();
        session.add(ExpenseRecord {
            category: ExpenseCategory::Other,
            date: NaiveDate::from_ymd_opt(2025, 3, 11),
            description: Some("huge scan".into()),
            amount: dec!(1.00),
            paid_by: PaidBy::Employee,
            receipt: Some(Receipt {
                filename: "scan.png".into(),
                bytes: vec![0u8; 64 * 1024],
            }),
        });
        let mut config = config();
        config.max_attachment_mb = dec!(0.01);
        let mailer = RecordingMailer::default();
        let err = submit_expense_report(&mut session, &config, &mailer).unwrap_err();

        match err {
            SubmitError::AttachmentsTooLarge(e) => {
                assert_eq!(e.max_bytes, 10_485);
                assert!(e.total_bytes > e.max_bytes);
            }
            other => panic!("expected size error, got {other}"),
        }
        assert!(mailer.sent.lock().unwrap().is_empty());
        assert_eq!(session.len(), 3);
    }

    #[test]
    fn delivery_failure_preserves_session() {
        let mut session = session();
        let err = submit_expense_report(&mut session, &config(), &FailingMailer).unwrap_err();
        assert!(matches!(err, SubmitError::Delivery(_)));
        assert!(err.to_string().contains("550 mailbox unavailable"));
        assert_eq!(session.len(), 2);
    }
}
