//! # Core Types
//!
//! Plain data shared by the database layer and the web server: the rows read
//! from the statistics tables, the shapes returned to the dashboard, filter
//! parsing, and the efficiency formula.
//!
//! Serialized field names are Portuguese (`distribuídas`, `eficiência`, `mês`)
//! because the dashboard consumes them verbatim.

pub mod filters;
pub mod metrics;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use filters::{DEFAULT_YEAR, Filters, NATIONAL_UF, is_unset, parse_int};
pub use metrics::{efficiency_pct, round_pct};
pub use structs::{MonthlyTotal, Overview, RankingEntry, StateSnapshot, StateTotal, TimeSeriesPoint};
