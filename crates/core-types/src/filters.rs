use serde::Deserialize;

/// Year used by `/timeseries` when the request does not name one.
pub const DEFAULT_YEAR: i32 = 2021;

/// State code meaning "the whole country".
pub const NATIONAL_UF: &str = "BR";

/// Values the dashboard sends when a dropdown is left on "all".
const UNSET_SENTINELS: [&str; 5] = ["", "todos", "all", "none", "null"];

/// Returns `true` when a filter value should not be applied.
pub fn is_unset(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(raw) => {
            let normalized = raw.trim().to_lowercase();
            UNSET_SENTINELS.contains(&normalized.as_str())
        }
    }
}

/// Lenient integer parsing: anything that is not an integer is `None`.
pub fn parse_int(value: Option<&str>) -> Option<i32> {
    value.and_then(|raw| raw.trim().parse::<i32>().ok())
}

/// The query string shared by every statistics endpoint.
///
/// All fields stay as raw strings so that a bad value never rejects the
/// request; the accessors decide what counts as set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Filters {
    pub ano: Option<String>,
    pub mes: Option<String>,
    pub uf: Option<String>,
    /// Accepted for compatibility with the dashboard, never used in aggregation.
    pub fabricante: Option<String>,
}

impl Filters {
    /// The state code filter, trimmed, or `None` when unset.
    pub fn state(&self) -> Option<&str> {
        let uf = self.uf.as_deref();
        if is_unset(uf) { None } else { uf.map(str::trim) }
    }

    /// The requested year. Zero and unparseable values count as absent.
    pub fn year(&self) -> Option<i32> {
        if is_unset(self.ano.as_deref()) {
            return None;
        }
        parse_int(self.ano.as_deref()).filter(|year| *year != 0)
    }

    /// The requested month. Zero and unparseable values count as absent.
    pub fn month(&self) -> Option<i32> {
        if is_unset(self.mes.as_deref()) {
            return None;
        }
        parse_int(self.mes.as_deref()).filter(|month| *month != 0)
    }

    pub fn manufacturer(&self) -> Option<&str> {
        let fabricante = self.fabricante.as_deref();
        if is_unset(fabricante) { None } else { fabricante }
    }
}
