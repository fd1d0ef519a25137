//! The aggregation behind each endpoint.
//!
//! Every function opens its own session, prefers the structured tables and
//! falls back to the raw distribution table through the query-variant
//! executor. Errors are returned to the handler, which decides how to degrade.

use crate::error::AppError;
use core_types::{
    DEFAULT_YEAR, Filters, MonthlyTotal, NATIONAL_UF, Overview, RankingEntry, StateTotal, TimeSeriesPoint,
    efficiency_pct, round_pct,
};
use database::StatsSource;

/// National (or single-state) totals.
///
/// A positive raw distribution total wins over the snapshot figures; the raw
/// table has no administered doses, so efficiency and esavi are then zero.
pub async fn overview(source: &dyn StatsSource, filters: &Filters) -> Result<Overview, AppError> {
    let uf = filters.state();
    let mut session = source.open_session().await?;

    let snapshots = session.state_snapshots(uf).await?;
    let raw_total = session.raw_distribution_total().await.into_option().unwrap_or(0);

    if raw_total > 0 {
        return Ok(Overview {
            distributed: raw_total,
            ..Overview::default()
        });
    }
    if snapshots.is_empty() {
        return Ok(Overview::default());
    }

    let distributed: i64 = snapshots.iter().map(|s| s.distributed).sum();
    let administered: i64 = snapshots.iter().map(|s| s.administered).sum();
    let esavi = session.esavi_total(uf).await?;

    Ok(Overview {
        distributed,
        administered,
        efficiency: efficiency_pct(distributed, administered),
        esavi,
    })
}

/// Monthly series for one year and state, sorted by (year, month).
pub async fn time_series(source: &dyn StatsSource, filters: &Filters) -> Result<Vec<TimeSeriesPoint>, AppError> {
    let year = filters.year().unwrap_or(DEFAULT_YEAR);
    let uf = filters.state().unwrap_or(NATIONAL_UF);
    let month = filters.month();
    let mut session = source.open_session().await?;

    let points = session.time_series(year, uf, month).await?;
    if !points.is_empty() {
        return Ok(points
            .into_iter()
            .map(|p| TimeSeriesPoint {
                efficiency: round_pct(p.efficiency),
                ..p
            })
            .collect());
    }

    tracing::debug!(year, uf, "No structured time series rows, aggregating the raw table.");
    let totals = session.raw_monthly_totals().await.into_option().unwrap_or_default();
    Ok(series_from_raw(totals, month))
}

/// Turns raw monthly sums into national points.
///
/// Every year in the raw table is reported; only the month filter applies.
fn series_from_raw(totals: Vec<MonthlyTotal>, month: Option<i32>) -> Vec<TimeSeriesPoint> {
    let mut series: Vec<TimeSeriesPoint> = totals
        .into_iter()
        .map(|total| TimeSeriesPoint {
            ano: total.ano.unwrap_or(DEFAULT_YEAR),
            month: total.month,
            uf: NATIONAL_UF.to_string(),
            distributed: total.distributed,
            administered: 0,
            efficiency: 0.0,
            esavi: 0,
        })
        .filter(|point| month.is_none_or(|m| point.month == m))
        .collect();
    series.sort_by_key(|point| (point.ano, point.month));
    series
}

/// States ordered by efficiency, or by distributed doses when only the raw
/// table has data.
pub async fn ranking(source: &dyn StatsSource, filters: &Filters) -> Result<Vec<RankingEntry>, AppError> {
    let uf = filters.state();
    let mut session = source.open_session().await?;

    let snapshots = session.state_snapshots(uf).await?;
    if !snapshots.is_empty() {
        return Ok(snapshots
            .into_iter()
            .map(|s| RankingEntry {
                uf: Some(s.uf),
                nome: Some(s.nome),
                distributed: s.distributed,
                administered: s.administered,
                efficiency: round_pct(s.efficiency),
            })
            .collect());
    }

    tracing::debug!("No state snapshots, ranking from the raw table.");
    let totals = session.raw_state_totals(uf).await.into_option().unwrap_or_default();
    Ok(ranking_from_raw(totals))
}

fn ranking_from_raw(mut totals: Vec<StateTotal>) -> Vec<RankingEntry> {
    totals.sort_by(|a, b| b.distributed.cmp(&a.distributed));
    totals
        .into_iter()
        .map(|total| RankingEntry {
            uf: total.uf.map(|code| code.trim().to_string()),
            nome: None,
            distributed: total.distributed,
            administered: 0,
            efficiency: 0.0,
        })
        .collect()
}
