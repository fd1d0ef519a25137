use serde::Serialize;
use sqlx::FromRow;

/// One row of `estado_snapshot`: the precomputed per-state summary.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct StateSnapshot {
    pub uf: String,
    pub nome: String,
    #[sqlx(rename = "distribuídas")]
    pub distributed: i64,
    #[sqlx(rename = "aplicadas")]
    pub administered: i64,
    #[sqlx(rename = "eficiência")]
    pub efficiency: f64,
}

/// One monthly point, either read from `timeseries` or synthesized from the
/// raw distribution table. Serializes directly as an item of `/timeseries`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct TimeSeriesPoint {
    pub ano: i32,
    #[sqlx(rename = "mês")]
    #[serde(rename = "mês")]
    pub month: i32,
    pub uf: String,
    #[sqlx(rename = "distribuídas")]
    #[serde(rename = "distribuídas")]
    pub distributed: i64,
    #[sqlx(rename = "aplicadas")]
    #[serde(rename = "aplicadas")]
    pub administered: i64,
    #[sqlx(rename = "eficiência")]
    #[serde(rename = "eficiência")]
    pub efficiency: f64,
    pub esavi: i64,
}

/// Monthly sum of the raw distribution table.
///
/// The year is optional because the ingestion table does not enforce it.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct MonthlyTotal {
    pub ano: Option<i32>,
    #[sqlx(rename = "mês")]
    pub month: i32,
    #[sqlx(rename = "distribuídas")]
    pub distributed: i64,
}

/// Per-state sum of the raw distribution table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct StateTotal {
    pub uf: Option<String>,
    #[sqlx(rename = "distribuídas")]
    pub distributed: i64,
}

/// The national (or per-state) KPI block returned by `/overview`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Overview {
    #[serde(rename = "distribuídas")]
    pub distributed: i64,
    #[serde(rename = "aplicadas")]
    pub administered: i64,
    #[serde(rename = "eficiência")]
    pub efficiency: f64,
    pub esavi: i64,
}

/// One line of `/ranking/ufs`.
///
/// `nome` is `None` when the entry was derived from the raw table, which
/// carries no state names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub uf: Option<String>,
    pub nome: Option<String>,
    #[serde(rename = "distribuídas")]
    pub distributed: i64,
    #[serde(rename = "aplicadas")]
    pub administered: i64,
    #[serde(rename = "eficiência")]
    pub efficiency: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn overview_serializes_with_dashboard_keys() {
        let overview = Overview {
            distributed: 100,
            administered: 87,
            efficiency: 87.0,
            esavi: 3,
        };
        assert_eq!(
            serde_json::to_value(&overview).unwrap(),
            json!({ "distribuídas": 100, "aplicadas": 87, "eficiência": 87.0, "esavi": 3 })
        );
    }

    #[test]
    fn ranking_entry_without_name_serializes_null() {
        let entry = RankingEntry {
            uf: Some("SP".to_string()),
            nome: None,
            distributed: 10,
            administered: 0,
            efficiency: 0.0,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["nome"], serde_json::Value::Null);
        assert_eq!(value["uf"], "SP");
        assert_eq!(value["eficiência"], 0.0);
    }

    #[test]
    fn time_series_point_uses_accented_month_key() {
        let point = TimeSeriesPoint {
            ano: 2021,
            month: 4,
            uf: "BR".to_string(),
            distributed: 1,
            administered: 1,
            efficiency: 100.0,
            esavi: 0,
        };
        let value = serde_json::to_value(&point).unwrap();
        assert_eq!(value["mês"], 4);
        assert!(value.get("month").is_none());
    }
}
