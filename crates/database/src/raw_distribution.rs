//! Candidate queries against the externally loaded `distribuicao` table.
//!
//! Each list is ordered from the most common deployment shape to the least
//! common one. Every variant casts its output columns so that the decoded row
//! shape is the same whichever variant wins.

use crate::fallback::{QueryCandidate, SqlParam};

/// Column/table spellings seen in the wild for the distributed quantity.
const QUANTITY_SHAPES: [(&str, &str); 4] = [
    ("qtde", "distribuicao"),
    ("\"QTDE\"", "distribuicao"),
    ("\"TX_QTDE\"", "distribuicao"),
    ("\"QTDE\"", "public.distribuicao"),
];

/// Grand total of distributed doses: one row with a `total` column.
pub fn total_candidates() -> Vec<QueryCandidate> {
    QUANTITY_SHAPES
        .iter()
        .map(|(quantity, table)| {
            QueryCandidate::new(format!(
                "SELECT CAST(COALESCE(SUM({quantity}), 0) AS BIGINT) AS total FROM {table}"
            ))
        })
        .collect()
}

/// Distributed doses grouped by year and month, ordered by (year, month).
///
/// Rows decode into [`core_types::MonthlyTotal`].
pub fn monthly_candidates() -> Vec<QueryCandidate> {
    let mut candidates: Vec<QueryCandidate> = QUANTITY_SHAPES
        .iter()
        .map(|(quantity, table)| monthly_query("ano", "mes", quantity, table))
        .collect();
    // Loaders that kept the upper-case CSV headers for every column.
    candidates.push(monthly_query("\"ANO\"", "\"MES\"", "\"QTDE\"", "distribuicao"));
    candidates
}

fn monthly_query(year: &str, month: &str, quantity: &str, table: &str) -> QueryCandidate {
    QueryCandidate::new(format!(
        "SELECT CAST({year} AS INTEGER) AS ano, CAST({month} AS INTEGER) AS \"mês\", \
         CAST(COALESCE(SUM({quantity}), 0) AS BIGINT) AS \"distribuídas\" \
         FROM {table} GROUP BY {year}, {month} ORDER BY {year}, {month}"
    ))
}

/// Distributed doses grouped by state code, largest first.
///
/// When `uf` is given it is bound as `$1` and compared against the trimmed
/// state column. Rows decode into [`core_types::StateTotal`].
pub fn state_candidates(uf: Option<&str>) -> Vec<QueryCandidate> {
    [
        ("sigla", "qtde", "distribuicao"),
        ("\"TX_SIGLA\"", "\"QTDE\"", "distribuicao"),
        ("sigla", "\"QTDE\"", "public.distribuicao"),
    ]
    .iter()
    .map(|(state, quantity, table)| {
        let filter = if uf.is_some() {
            format!(" WHERE TRIM({state}) = $1")
        } else {
            String::new()
        };
        let candidate = QueryCandidate::new(format!(
            "SELECT TRIM({state}) AS uf, CAST(COALESCE(SUM({quantity}), 0) AS BIGINT) AS \"distribuídas\" \
             FROM {table}{filter} GROUP BY TRIM({state}) ORDER BY SUM({quantity}) DESC"
        ));
        match uf {
            Some(code) => candidate.bind(SqlParam::Text(code.to_string())),
            None => candidate,
        }
    })
    .collect()
}
