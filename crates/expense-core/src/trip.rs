//! Trip metadata and trip-day counting.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Trip metadata collected from the form collaborator. Dates are optional
/// here because the form may not have both filled in yet; validation decides
/// whether a submission can proceed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripInfo {
    pub employee_name: String,
    pub employee_email: String,
    pub location: String,
    pub purpose: String,
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
}

impl TripInfo {
    /// Inclusive day count for this trip. 0 means the range is unusable.
    pub fn trip_days(&self) -> u32 {
        trip_days(self.departure_date, self.return_date)
    }
}

/// Inclusive day count between departure and return. Returns 0 when either
/// date is absent or the return precedes the departure; callers must treat 0
/// as "block submission", not as a zero-day trip.
pub fn trip_days(departure: Option<NaiveDate>, ret: Option<NaiveDate>) -> u32 {
    let (Some(departure), Some(ret)) = (departure, ret) else {
        return 0;
    };
    if ret < departure {
        return 0;
    }
    (ret - departure).num_days() as u32 + 1
}
