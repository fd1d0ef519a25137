//! One-time table creation and sample data, run out of band before traffic.
//!
//! Tables are only seeded when empty. The emptiness check and the insert are
//! not atomic across processes, so two concurrent first runs could both insert;
//! this step is meant to run once per deployment.

use crate::connection::{Database, run_migrations};
use crate::error::DbError;
use core_types::{NATIONAL_UF, StateSnapshot, TimeSeriesPoint, efficiency_pct};
use rand::Rng;
use sqlx::{Postgres, QueryBuilder};

/// Year covered by the sample time series.
pub const SAMPLE_YEAR: i32 = 2021;

/// How many rows each table received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub snapshots_inserted: usize,
    pub timeseries_inserted: usize,
}

/// Applies the migrations and seeds any empty statistics table.
pub async fn bootstrap(db: &Database) -> Result<SeedReport, DbError> {
    tracing::info!("Creating tables (if not exists)...");
    run_migrations(db.pool()).await?;

    let snapshots = sample_snapshots();
    let timeseries = sample_timeseries(&mut rand::rng());
    let mut report = SeedReport::default();

    let mut tx = db.pool().begin().await?;

    let has_snapshot: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM estado_snapshot)")
        .fetch_one(&mut *tx)
        .await?;
    if has_snapshot {
        tracing::info!("estado_snapshot already has data, skipping seeding.");
    } else {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(r#"INSERT INTO estado_snapshot (uf, nome, "distribuídas", aplicadas, "eficiência") "#);
        builder.push_values(&snapshots, |mut row, s| {
            row.push_bind(s.uf.clone())
                .push_bind(s.nome.clone())
                .push_bind(s.distributed)
                .push_bind(s.administered)
                .push_bind(s.efficiency);
        });
        builder.build().execute(&mut *tx).await?;
        report.snapshots_inserted = snapshots.len();
        tracing::info!(rows = snapshots.len(), "Seeded estado_snapshot.");
    }

    let has_timeseries: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM timeseries)")
        .fetch_one(&mut *tx)
        .await?;
    if has_timeseries {
        tracing::info!("timeseries already has data, skipping seeding.");
    } else {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"INSERT INTO timeseries (ano, "mês", uf, "distribuídas", aplicadas, "eficiência", esavi) "#,
        );
        builder.push_values(&timeseries, |mut row, p| {
            row.push_bind(p.ano)
                .push_bind(p.month)
                .push_bind(p.uf.clone())
                .push_bind(p.distributed)
                .push_bind(p.administered)
                .push_bind(p.efficiency)
                .push_bind(p.esavi);
        });
        builder.build().execute(&mut *tx).await?;
        report.timeseries_inserted = timeseries.len();
        tracing::info!(rows = timeseries.len(), "Seeded timeseries.");
    }

    tx.commit().await?;
    Ok(report)
}

/// A handful of large states with fixed figures.
pub fn sample_snapshots() -> Vec<StateSnapshot> {
    [
        ("SP", "São Paulo", 40_000_000, 35_000_000),
        ("RJ", "Rio de Janeiro", 18_000_000, 15_000_000),
        ("MG", "Minas Gerais", 20_000_000, 17_000_000),
    ]
    .into_iter()
    .map(|(uf, nome, distributed, administered)| StateSnapshot {
        uf: uf.to_string(),
        nome: nome.to_string(),
        distributed,
        administered,
        efficiency: efficiency_pct(distributed, administered),
    })
    .collect()
}

/// Twelve months of national figures and twelve months for São Paulo.
pub fn sample_timeseries<R: Rng + ?Sized>(rng: &mut R) -> Vec<TimeSeriesPoint> {
    let mut points = Vec::with_capacity(24);
    // (uf, distributed base, distributed spread, min uptake, uptake spread, esavi base, esavi spread)
    let profiles = [
        (NATIONAL_UF, 15_000_000.0, 5_000_000.0, 0.78, 0.12, 1000.0, 500.0),
        ("SP", 4_000_000.0, 1_000_000.0, 0.80, 0.10, 200.0, 100.0),
    ];

    for (uf, dist_base, dist_spread, uptake_min, uptake_spread, esavi_base, esavi_spread) in profiles {
        for month in 1..=12 {
            let distributed = (dist_base + rng.random::<f64>() * dist_spread) as i64;
            let administered = (distributed as f64 * (uptake_min + rng.random::<f64>() * uptake_spread)) as i64;
            let esavi = (esavi_base + rng.random::<f64>() * esavi_spread) as i64;
            points.push(TimeSeriesPoint {
                ano: SAMPLE_YEAR,
                month,
                uf: uf.to_string(),
                distributed,
                administered,
                efficiency: efficiency_pct(distributed, administered),
                esavi,
            });
        }
    }
    points
}
