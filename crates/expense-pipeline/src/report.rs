//! Report builder: renders a trip snapshot into an xlsx workbook held
//! entirely in memory. Two worksheets: a summary of the trip and totals,
//! and one row per line item.
//!
//! Output is deterministic for identical inputs; the workbook's creation
//! timestamp is pinned so repeated builds produce identical bytes.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{
    Color, DocProperties, ExcelDateTime, Format, FormatAlign, Workbook, Worksheet, XlsxError,
};
use thiserror::Error;
use tracing::debug;

use expense_core::money::{format_usd, round_cents};
use expense_core::record::ExpenseRecord;
use expense_core::totals::Totals;
use expense_core::trip::TripInfo;

/// MIME type of the produced artifact.
pub const XLSX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Cap on auto-sized column widths so a long description cannot produce a
/// degenerate layout.
const MAX_COLUMN_WIDTH: usize = 60;

/// Structural workbook failure. Record content never raises; malformed or
/// missing fields render as empty cells.
#[derive(Debug, Error)]
#[error("workbook generation failed: {0}")]
pub struct ReportError(pub String);

impl From<XlsxError> for ReportError {
    fn from(e: XlsxError) -> Self {
        ReportError(e.to_string())
    }
}

/// Deterministic artifact name: employee, location, and date range with
/// whitespace stripped.
pub fn report_filename(trip: &TripInfo) -> String {
    let strip = |s: &str| s.split_whitespace().collect::<String>();
    let day = |d: Option<NaiveDate>| {
        d.map_or_else(|| "undated".to_string(), |d| d.format("%Y%m%d").to_string())
    };
    format!(
        "ExpenseReport_{}_{}_{}-{}.xlsx",
        strip(&trip.employee_name),
        strip(&trip.location),
        day(trip.departure_date),
        day(trip.return_date),
    )
}

enum SummaryValue {
    Text(String),
    Wrapped(String),
    Currency(Decimal),
    Days(u32),
}

impl SummaryValue {
    fn display_width(&self) -> usize {
        match self {
            SummaryValue::Text(s) | SummaryValue::Wrapped(s) => s.chars().count(),
            SummaryValue::Currency(d) => format_usd(*d).chars().count(),
            SummaryValue::Days(n) => n.to_string().len(),
        }
    }
}

fn date_cell(date: Option<NaiveDate>) -> String {
    date.map_or_else(String::new, |d| d.format("%Y-%m-%d").to_string())
}

fn set_capped_widths(worksheet: &mut Worksheet, widths: &[usize]) -> Result<(), XlsxError> {
    for (col, max_len) in widths.iter().enumerate() {
        let width = (max_len + 2).min(MAX_COLUMN_WIDTH);
        worksheet.set_column_width(col as u16, width as f64)?;
    }
    Ok(())
}

/// Build the workbook for one submission snapshot and return its bytes.
pub fn build_report(
    trip: &TripInfo,
    totals: &Totals,
    records: &[ExpenseRecord],
) -> Result<Vec<u8>, ReportError> {
    let mut workbook = Workbook::new();
    let properties = DocProperties::new()
        .set_title("Trip Expense Report")
        .set_creation_datetime(&ExcelDateTime::from_ymd(2024, 1, 1)?);
    workbook.set_properties(&properties);

    let bold = Format::new().set_bold();
    let title = Format::new().set_bold().set_font_size(16);
    let header = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x00EEEEEE));
    let currency = Format::new()
        .set_num_format("$#,##0.00")
        .set_align(FormatAlign::Right);
    let wrap = Format::new().set_text_wrap();

    // Sheet 1: Summary
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Summary")?;
    worksheet.write_string_with_format(0, 0, "Trip Expense Report", &title)?;

    let entries: Vec<(u32, &str, SummaryValue)> = vec![
        (2, "Employee Name", SummaryValue::Text(trip.employee_name.clone())),
        (3, "Employee Email", SummaryValue::Text(trip.employee_email.clone())),
        (4, "Trip Location", SummaryValue::Text(trip.location.clone())),
        (5, "Business Purpose", SummaryValue::Wrapped(trip.purpose.clone())),
        (6, "Departure Date", SummaryValue::Text(date_cell(trip.departure_date))),
        (7, "Return Date", SummaryValue::Text(date_cell(trip.return_date))),
        (8, "Trip Days", SummaryValue::Days(trip.trip_days())),
        (10, "Per Diem Rate", SummaryValue::Currency(totals.per_diem_rate)),
        (11, "Per Diem Total", SummaryValue::Currency(totals.per_diem_total)),
        (13, "Total Spend", SummaryValue::Currency(totals.total_spend)),
        (14, "Company Paid", SummaryValue::Currency(totals.company_paid)),
        (15, "Employee Paid", SummaryValue::Currency(totals.employee_paid)),
        (16, "Reimbursement Due", SummaryValue::Currency(totals.reimbursement_due)),
    ];

    let mut widths = [0usize; 2];
    for (row, label, value) in &entries {
        widths[0] = widths[0].max(label.chars().count());
        widths[1] = widths[1].max(value.display_width());
        worksheet.write_string_with_format(*row, 0, *label, &bold)?;
        match value {
            SummaryValue::Text(s) => worksheet.write_string(*row, 1, s.as_str())?,
            SummaryValue::Wrapped(s) => {
                worksheet.write_string_with_format(*row, 1, s.as_str(), &wrap)?
            }
            SummaryValue::Currency(d) => {
                worksheet.write_number_with_format(*row, 1, d.to_f64().unwrap_or(0.0), &currency)?
            }
            SummaryValue::Days(n) => worksheet.write_number(*row, 1, f64::from(*n))?,
        };
    }
    // Long purpose text wraps instead of truncating.
    worksheet.set_row_height(5, 45)?;
    set_capped_widths(worksheet, &widths)?;

    // Sheet 2: Line Items
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Line Items")?;
    let headers = [
        "Category",
        "Expense Date",
        "Description",
        "Paid By",
        "Amount",
        "Reimbursable",
        "Receipt Attached",
    ];
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for (col, name) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header)?;
    }
    for (i, record) in records.iter().enumerate() {
        let row = i as u32 + 1;
        let yes_no = |b: bool| if b { "Yes" } else { "No" };
        let cells = [
            record.category.label().to_string(),
            date_cell(record.date),
            record.description.clone().unwrap_or_default(),
            record.paid_by.label().to_string(),
            format_usd(record.amount),
            yes_no(record.is_reimbursable()).to_string(),
            yes_no(record.has_receipt()).to_string(),
        ];
        for (col, cell) in cells.iter().enumerate() {
            widths[col] = widths[col].max(cell.chars().count());
        }
        worksheet.write_string(row, 0, cells[0].as_str())?;
        worksheet.write_string(row, 1, cells[1].as_str())?;
        worksheet.write_string_with_format(row, 2, cells[2].as_str(), &wrap)?;
        worksheet.write_string(row, 3, cells[3].as_str())?;
        worksheet.write_number_with_format(
            row,
            4,
            round_cents(record.amount).to_f64().unwrap_or(0.0),
            &currency,
        )?;
        worksheet.write_string(row, 5, cells[5].as_str())?;
        worksheet.write_string(row, 6, cells[6].as_str())?;
    }
    set_capped_widths(worksheet, &widths)?;

    let bytes = workbook.save_to_buffer()?;
    debug!(
        event = "report.built",
        domain = "expense",
        bytes = bytes.len() as u64,
        line_items = records.len()
    );
    Ok(bytes)
}
