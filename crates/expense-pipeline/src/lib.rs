pub mod bundle;
pub mod notify;
pub mod report;
pub mod submit;

// Minimal user-facing API: build/bundle/compose stages plus the end-to-end
// submission driver. The form UI and secret loading are external collaborators.
pub use bundle::{Attachment, AttachmentSet, SizeExceededError, bundle_attachments, media_type_for};
pub use notify::{
    MailError, Mailer, NotificationMessage, SmtpMailer, SmtpSettings, compose_notification,
};
pub use report::{XLSX_MEDIA_TYPE, ReportError, build_report, report_filename};
pub use submit::{SubmissionSummary, SubmitError, submit_expense_report};
