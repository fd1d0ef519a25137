//! In-memory `StatsSource` for tests.
//!
//! A table set to `None` behaves like a missing table: structured reads return
//! an error and raw reads run out of query variants.

use async_trait::async_trait;
use core_types::{MonthlyTotal, StateSnapshot, StateTotal, TimeSeriesPoint};
use database::{Attempt, DbError, StatsSession, StatsSource};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One row of the raw distribution table.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub ano: Option<i32>,
    pub month: i32,
    pub sigla: String,
    pub quantity: i64,
}

impl RawRow {
    pub fn new(ano: Option<i32>, month: i32, sigla: &str, quantity: i64) -> Self {
        Self {
            ano,
            month,
            sigla: sigla.to_string(),
            quantity,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Tables {
    snapshots: Option<Vec<StateSnapshot>>,
    timeseries: Option<Vec<TimeSeriesPoint>>,
    raw: Option<Vec<RawRow>>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStats {
    tables: Arc<Tables>,
}

impl InMemoryStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshots(self, rows: Vec<StateSnapshot>) -> Self {
        self.update(|t| t.snapshots = Some(rows))
    }

    pub fn with_timeseries(self, rows: Vec<TimeSeriesPoint>) -> Self {
        self.update(|t| t.timeseries = Some(rows))
    }

    pub fn with_raw(self, rows: Vec<RawRow>) -> Self {
        self.update(|t| t.raw = Some(rows))
    }

    fn update(self, apply: impl FnOnce(&mut Tables)) -> Self {
        let mut tables = (*self.tables).clone();
        apply(&mut tables);
        Self {
            tables: Arc::new(tables),
        }
    }
}

struct InMemorySession {
    tables: Arc<Tables>,
}

fn missing(table: &str) -> DbError {
    DbError::ConnectionError(sqlx_error(format!("relation \"{table}\" does not exist")))
}

fn sqlx_error(message: String) -> sqlx::Error {
    sqlx::Error::Protocol(message)
}

#[async_trait]
impl StatsSource for InMemoryStats {
    async fn open_session(&self) -> Result<Box<dyn StatsSession>, DbError> {
        Ok(Box::new(InMemorySession {
            tables: Arc::clone(&self.tables),
        }))
    }
}

#[async_trait]
impl StatsSession for InMemorySession {
    async fn state_snapshots(&mut self, uf: Option<&str>) -> Result<Vec<StateSnapshot>, DbError> {
        let rows = self.tables.snapshots.as_ref().ok_or_else(|| missing("estado_snapshot"))?;
        let mut rows: Vec<StateSnapshot> = rows
            .iter()
            .filter(|s| uf.is_none_or(|code| s.uf == code))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.efficiency.total_cmp(&a.efficiency));
        Ok(rows)
    }

    async fn esavi_total(&mut self, uf: Option<&str>) -> Result<i64, DbError> {
        let rows = self.tables.timeseries.as_ref().ok_or_else(|| missing("timeseries"))?;
        Ok(rows
            .iter()
            .filter(|p| uf.is_none_or(|code| p.uf == code))
            .map(|p| p.esavi)
            .sum())
    }

    async fn time_series(&mut self, year: i32, uf: &str, month: Option<i32>) -> Result<Vec<TimeSeriesPoint>, DbError> {
        let rows = self.tables.timeseries.as_ref().ok_or_else(|| missing("timeseries"))?;
        let mut rows: Vec<TimeSeriesPoint> = rows
            .iter()
            .filter(|p| p.ano == year && p.uf == uf && month.is_none_or(|m| p.month == m))
            .cloned()
            .collect();
        rows.sort_by_key(|p| (p.ano, p.month));
        Ok(rows)
    }

    async fn raw_distribution_total(&mut self) -> Attempt<i64> {
        match &self.tables.raw {
            Some(rows) => Attempt::Succeeded {
                candidate: 0,
                value: rows.iter().map(|r| r.quantity).sum(),
            },
            None => Attempt::Exhausted,
        }
    }

    async fn raw_monthly_totals(&mut self) -> Attempt<Vec<MonthlyTotal>> {
        let Some(rows) = &self.tables.raw else {
            return Attempt::Exhausted;
        };
        let mut grouped: BTreeMap<(Option<i32>, i32), i64> = BTreeMap::new();
        for row in rows {
            *grouped.entry((row.ano, row.month)).or_default() += row.quantity;
        }
        Attempt::Succeeded {
            candidate: 0,
            value: grouped
                .into_iter()
                .map(|((ano, month), distributed)| MonthlyTotal { ano, month, distributed })
                .collect(),
        }
    }

    async fn raw_state_totals(&mut self, uf: Option<&str>) -> Attempt<Vec<StateTotal>> {
        let Some(rows) = &self.tables.raw else {
            return Attempt::Exhausted;
        };
        let mut grouped: BTreeMap<String, i64> = BTreeMap::new();
        for row in rows.iter().filter(|r| uf.is_none_or(|code| r.sigla.trim() == code)) {
            *grouped.entry(row.sigla.trim().to_string()).or_default() += row.quantity;
        }
        Attempt::Succeeded {
            candidate: 0,
            value: grouped
                .into_iter()
                .map(|(sigla, distributed)| StateTotal {
                    uf: Some(sigla),
                    distributed,
                })
                .collect(),
        }
    }
}
