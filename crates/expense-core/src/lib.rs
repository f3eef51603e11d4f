pub mod config;
pub mod money;
pub mod observability;
pub mod record;
pub mod session;
pub mod totals;
pub mod trip;
pub mod validate;

// Minimal user-facing API: session, model types, totals, config, validation.
pub use config::{ConfigError, ReportConfig};
pub use observability::init_observability;
pub use record::{ExpenseCategory, ExpenseRecord, PaidBy, RawExpense, Receipt};
pub use session::ExpenseSession;
pub use totals::Totals;
pub use trip::{TripInfo, trip_days};
pub use validate::{ValidationError, validate_submission};
