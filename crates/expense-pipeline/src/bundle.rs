//! Attachment bundler: assembles the report and receipt byte blobs for one
//! outbound message and enforces the configured size ceiling. The bundler
//! never truncates or drops an attachment silently; going over the limit is
//! an error the caller surfaces to the user.

use tracing::{debug, warn};

use expense_core::record::{ExpenseCategory, ExpenseRecord};

/// One named byte blob headed for the outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub media_type: String,
}

/// Ordered attachment list: the report first, then receipts in the same
/// order as their source records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentSet {
    attachments: Vec<Attachment>,
}

impl AttachmentSet {
    pub fn iter(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments.iter()
    }

    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.attachments.iter().map(|a| a.bytes.len() as u64).sum()
    }
}

/// Bundle over the configured ceiling. Carries both sides of the comparison
/// so the user sees the exact overage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeExceededError {
    pub total_bytes: u64,
    pub max_bytes: u64,
}

fn to_mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

impl SizeExceededError {
    /// How far over the limit the bundle is, in MB.
    pub fn overage_mb(&self) -> f64 {
        to_mb(self.total_bytes - self.max_bytes)
    }
}

impl std::fmt::Display for SizeExceededError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "attachments are too large: {:.2} MB, limit is {:.2} MB. Remove some receipts or compress them",
            to_mb(self.total_bytes),
            to_mb(self.max_bytes)
        )
    }
}

impl std::error::Error for SizeExceededError {}

/// Infer a receipt's media type from its filename extension,
/// case-insensitive. Anything unrecognized (or extension-less) falls back
/// to `application/pdf`; the fallback is logged because it can mislabel a
/// receipt.
pub fn media_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "pdf" => "application/pdf",
        _ => {
            warn!(
                event = "bundle.media_type_fallback",
                domain = "expense",
                filename = filename,
                "unknown receipt extension labeled application/pdf"
            );
            "application/pdf"
        }
    }
}

fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' { '_' } else { c })
        .collect()
}

/// Receipt filename for the bundle: zero-padded 1-based sequence index,
/// category, and employee name, so a human can match the file to its line
/// item without opening it. Unique within a bundle by the index alone.
pub fn receipt_filename(
    index: usize,
    category: ExpenseCategory,
    employee_name: &str,
    original: &str,
) -> String {
    let ext = original
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| "pdf".to_string());
    format!(
        "{:02}_{}_{}.{}",
        index,
        sanitize(category.label()),
        sanitize(employee_name.trim()),
        ext
    )
}

/// Collect receipt attachments from a record snapshot, in record order.
/// Records without a receipt are skipped but keep their 1-based position in
/// the generated filenames.
pub fn receipt_attachments(records: &[ExpenseRecord], employee_name: &str) -> Vec<Attachment> {
    records
        .iter()
        .enumerate()
        .filter_map(|(i, record)| {
            let receipt = record.receipt.as_ref()?;
            Some(Attachment {
                filename: receipt_filename(i + 1, record.category, employee_name, &receipt.filename),
                bytes: receipt.bytes.clone(),
                media_type: media_type_for(&receipt.filename).to_string(),
            })
        })
        .collect()
}

/// Combine the report and receipts, checking the cumulative size against
/// `max_bytes`. A bundle exactly at the ceiling is allowed; one byte over is
/// rejected.
pub fn bundle_attachments(
    report: Attachment,
    receipts: Vec<Attachment>,
    max_bytes: u64,
) -> Result<AttachmentSet, SizeExceededError> {
    let mut attachments = Vec::with_capacity(1 + receipts.len());
    attachments.push(report);
    attachments.extend(receipts);

    let set = AttachmentSet { attachments };
    let total_bytes = set.total_bytes();
    debug!(
        event = "bundle.size_checked",
        domain = "expense",
        attachments = set.len(),
        total_bytes = total_bytes,
        max_bytes = max_bytes
    );
    if total_bytes > max_bytes {
        return Err(SizeExceededError {
            total_bytes,
            max_bytes,
        });
    }
    Ok(set)
}
