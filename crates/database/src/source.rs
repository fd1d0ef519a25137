use crate::error::DbError;
use crate::fallback::Attempt;
use async_trait::async_trait;
use core_types::{MonthlyTotal, StateSnapshot, StateTotal, TimeSeriesPoint};

/// Something that can hand out per-request statistics sessions.
///
/// The production implementation is [`crate::Database`]; tests plug in an
/// in-memory store.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn open_session(&self) -> Result<Box<dyn StatsSession>, DbError>;
}

/// The reads one request may perform, all on the same connection.
///
/// Structured tables (`estado_snapshot`, `timeseries`) return errors normally.
/// Raw distribution reads go through the query-variant fallback and report an
/// [`Attempt`] instead: they never fail, they only run out of variants.
#[async_trait]
pub trait StatsSession: Send {
    /// Snapshots, optionally for a single state, best efficiency first.
    async fn state_snapshots(&mut self, uf: Option<&str>) -> Result<Vec<StateSnapshot>, DbError>;

    /// Sum of adverse-event counts in `timeseries`, optionally for one state.
    async fn esavi_total(&mut self, uf: Option<&str>) -> Result<i64, DbError>;

    /// Monthly points for one year and state, ordered by month.
    async fn time_series(&mut self, year: i32, uf: &str, month: Option<i32>) -> Result<Vec<TimeSeriesPoint>, DbError>;

    async fn raw_distribution_total(&mut self) -> Attempt<i64>;

    async fn raw_monthly_totals(&mut self) -> Attempt<Vec<MonthlyTotal>>;

    async fn raw_state_totals(&mut self, uf: Option<&str>) -> Attempt<Vec<StateTotal>>;
}
