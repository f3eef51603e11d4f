//! Submission validation. Runs before any report, bundle, or mail work and
//! reports every violated field together, not one at a time.

use thiserror::Error;

use crate::record::ExpenseRecord;
use crate::trip::TripInfo;

/// All the reasons a submission is blocked, collected in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("please complete the following: {}", .problems.join(", "))]
pub struct ValidationError {
    pub problems: Vec<String>,
}

/// Check the trip metadata and line-item list. `Ok(())` means report
/// generation may begin.
pub fn validate_submission(
    trip: &TripInfo,
    records: &[ExpenseRecord],
) -> Result<(), ValidationError> {
    let mut problems = Vec::new();

    let mut require = |value: &str, field: &str| {
        if value.trim().is_empty() {
            problems.push(field.to_string());
        }
    };
    require(&trip.employee_name, "Employee Name");
    require(&trip.employee_email, "Employee Email");
    require(&trip.location, "Trip Location");
    require(&trip.purpose, "Business Purpose");

    match (trip.departure_date, trip.return_date) {
        (None, _) | (_, None) => {
            problems.push("Departure and Return Dates".to_string());
        }
        (Some(departure), Some(ret)) if ret < departure => {
            problems.push("Return Date must be on or after Departure Date".to_string());
        }
        _ => {}
    }

    if records.is_empty() {
        problems.push("At least one expense line item".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { problems })
    }
}
