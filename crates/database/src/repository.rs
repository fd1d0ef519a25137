use crate::connection::{Database, PgSession};
use crate::error::DbError;
use crate::fallback::{self, Attempt};
use crate::raw_distribution;
use crate::source::{StatsSession, StatsSource};
use async_trait::async_trait;
use core_types::{MonthlyTotal, StateSnapshot, StateTotal, TimeSeriesPoint};

// Columns are cast so that INTEGER and BIGINT deployments decode the same way.
const SNAPSHOT_QUERY: &str = r#"
    SELECT
        uf,
        nome,
        CAST(COALESCE("distribuídas", 0) AS BIGINT) AS "distribuídas",
        CAST(COALESCE(aplicadas, 0) AS BIGINT) AS aplicadas,
        CAST(COALESCE("eficiência", 0) AS DOUBLE PRECISION) AS "eficiência"
    FROM estado_snapshot
    WHERE ($1::TEXT IS NULL OR uf = $1::TEXT)
    ORDER BY "eficiência" DESC
"#;

const ESAVI_TOTAL_QUERY: &str = r#"
    SELECT CAST(COALESCE(SUM(esavi), 0) AS BIGINT)
    FROM timeseries
    WHERE ($1::TEXT IS NULL OR uf = $1::TEXT)
"#;

const TIME_SERIES_QUERY: &str = r#"
    SELECT
        CAST(ano AS INTEGER) AS ano,
        CAST("mês" AS INTEGER) AS "mês",
        uf,
        CAST(COALESCE("distribuídas", 0) AS BIGINT) AS "distribuídas",
        CAST(COALESCE(aplicadas, 0) AS BIGINT) AS aplicadas,
        CAST(COALESCE("eficiência", 0) AS DOUBLE PRECISION) AS "eficiência",
        CAST(COALESCE(esavi, 0) AS BIGINT) AS esavi
    FROM timeseries
    WHERE ano = $1 AND uf = $2::TEXT AND ($3::INTEGER IS NULL OR "mês" = $3::INTEGER)
    ORDER BY ano, "mês"
"#;

#[async_trait]
impl StatsSource for Database {
    async fn open_session(&self) -> Result<Box<dyn StatsSession>, DbError> {
        Ok(Box::new(self.acquire_session().await?))
    }
}

#[async_trait]
impl StatsSession for PgSession {
    async fn state_snapshots(&mut self, uf: Option<&str>) -> Result<Vec<StateSnapshot>, DbError> {
        let rows = sqlx::query_as::<_, StateSnapshot>(SNAPSHOT_QUERY)
            .bind(uf)
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows)
    }

    async fn esavi_total(&mut self, uf: Option<&str>) -> Result<i64, DbError> {
        let total: i64 = sqlx::query_scalar(ESAVI_TOTAL_QUERY)
            .bind(uf)
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(total)
    }

    async fn time_series(&mut self, year: i32, uf: &str, month: Option<i32>) -> Result<Vec<TimeSeriesPoint>, DbError> {
        let rows = sqlx::query_as::<_, TimeSeriesPoint>(TIME_SERIES_QUERY)
            .bind(year)
            .bind(uf)
            .bind(month)
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows)
    }

    async fn raw_distribution_total(&mut self) -> Attempt<i64> {
        let candidates = raw_distribution::total_candidates();
        fallback::fetch_optional::<(i64,)>(&mut *self.conn, &candidates)
            .await
            .map(|row| row.map(|(total,)| total).unwrap_or(0))
    }

    async fn raw_monthly_totals(&mut self) -> Attempt<Vec<MonthlyTotal>> {
        let candidates = raw_distribution::monthly_candidates();
        fallback::fetch_all::<MonthlyTotal>(&mut *self.conn, &candidates).await
    }

    async fn raw_state_totals(&mut self, uf: Option<&str>) -> Attempt<Vec<StateTotal>> {
        let candidates = raw_distribution::state_candidates(uf);
        fallback::fetch_all::<StateTotal>(&mut *self.conn, &candidates).await
    }
}
