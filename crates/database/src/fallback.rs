//! Runs a list of equivalent SQL statements until one of them works.
//!
//! The raw distribution table is loaded by an external process and its column
//! names differ between deployments (`qtde`, `"QTDE"`, `"TX_QTDE"`, with or
//! without the `public.` prefix). Instead of introspecting the schema, callers
//! describe every known shape as a [`QueryCandidate`] and let
//! [`first_success`] pick the first one the database accepts.
//!
//! Ordering is the whole contract: a candidate that executes without error
//! wins, even when it returns no rows, and later candidates are never tried.

use futures::future::BoxFuture;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, PgConnection, Postgres};
use std::fmt::Display;

/// A value bound to a `$n` placeholder of a candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i32),
    Text(String),
}

/// One SQL alternative and its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCandidate {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl QueryCandidate {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, param: SqlParam) -> Self {
        self.params.push(param);
        self
    }

    /// Builds the sqlx query with every parameter bound in order.
    pub fn query_as<'q, T>(&'q self) -> QueryAs<'q, Postgres, T, PgArguments>
    where
        T: for<'r> FromRow<'r, PgRow>,
    {
        self.params
            .iter()
            .fold(sqlx::query_as::<Postgres, T>(&self.sql), |query, param| match param {
                SqlParam::Int(value) => query.bind(*value),
                SqlParam::Text(value) => query.bind(value.as_str()),
            })
    }
}

/// Outcome of running a candidate list.
///
/// `Succeeded` with an empty value and `Exhausted` are different answers: the
/// first means the schema matched and holds no data, the second means no known
/// schema matched at all.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt<T> {
    Succeeded { candidate: usize, value: T },
    Exhausted,
}

impl<T> Attempt<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Attempt<U> {
        match self {
            Attempt::Succeeded { candidate, value } => Attempt::Succeeded {
                candidate,
                value: f(value),
            },
            Attempt::Exhausted => Attempt::Exhausted,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Attempt::Exhausted)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Attempt::Succeeded { value, .. } => Some(value),
            Attempt::Exhausted => None,
        }
    }
}

/// Runs `run` on each candidate in order and returns the first success.
///
/// Errors are logged at debug level and otherwise ignored. `state` is handed to
/// every call, which lets the candidates share one connection.
pub async fn first_success<S, T, E, F>(state: &mut S, candidates: &[QueryCandidate], mut run: F) -> Attempt<T>
where
    S: ?Sized + Send,
    E: Display,
    F: for<'a> FnMut(&'a mut S, &'a QueryCandidate) -> BoxFuture<'a, Result<T, E>>,
{
    for (index, candidate) in candidates.iter().enumerate() {
        match run(&mut *state, candidate).await {
            Ok(value) => {
                tracing::debug!(candidate = index, sql = %candidate.sql, "Query variant accepted.");
                return Attempt::Succeeded {
                    candidate: index,
                    value,
                };
            }
            Err(e) => {
                tracing::debug!(candidate = index, error = %e, "Query variant rejected, trying the next one.");
            }
        }
    }
    tracing::debug!(candidates = candidates.len(), "No query variant matched the schema.");
    Attempt::Exhausted
}

/// Single-row flavour: the first accepted candidate's first row, if any.
pub async fn fetch_optional<T>(conn: &mut PgConnection, candidates: &[QueryCandidate]) -> Attempt<Option<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static,
{
    first_success::<_, _, sqlx::Error, _>(conn, candidates, |conn, candidate| {
        Box::pin(async move { candidate.query_as::<T>().fetch_optional(conn).await })
    })
    .await
}

/// Row-set flavour: every row of the first accepted candidate.
pub async fn fetch_all<T>(conn: &mut PgConnection, candidates: &[QueryCandidate]) -> Attempt<Vec<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static,
{
    first_success::<_, _, sqlx::Error, _>(conn, candidates, |conn, candidate| {
        Box::pin(async move { candidate.query_as::<T>().fetch_all(conn).await })
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Scripted outcomes keyed by SQL text; records the order of calls.
    struct Script {
        outcomes: HashMap<String, Result<Vec<i64>, String>>,
        calls: Vec<String>,
    }

    impl Script {
        fn new(outcomes: &[(&str, Result<Vec<i64>, &str>)]) -> Self {
            Self {
                outcomes: outcomes
                    .iter()
                    .map(|(sql, outcome)| (sql.to_string(), outcome.clone().map_err(str::to_string)))
                    .collect(),
                calls: Vec::new(),
            }
        }
    }

    fn candidates(sqls: &[&str]) -> Vec<QueryCandidate> {
        sqls.iter().map(|sql| QueryCandidate::new(*sql)).collect()
    }

    async fn run_script(script: &mut Script, list: &[QueryCandidate]) -> Attempt<Vec<i64>> {
        first_success::<_, _, String, _>(script, list, |script, candidate| {
            script.calls.push(candidate.sql.clone());
            let outcome = script
                .outcomes
                .get(&candidate.sql)
                .cloned()
                .unwrap_or_else(|| Err("relation does not exist".to_string()));
            Box::pin(async move { outcome })
        })
        .await
    }

    #[tokio::test]
    async fn empty_success_stops_the_chain() {
        let mut script = Script::new(&[
            ("A", Err("column \"qtde\" does not exist")),
            ("B", Err("column \"QTDE\" does not exist")),
            ("C", Ok(vec![])),
            ("D", Ok(vec![42])),
        ]);
        let list = candidates(&["A", "B", "C", "D"]);

        let attempt = run_script(&mut script, &list).await;

        assert_eq!(attempt, Attempt::Succeeded { candidate: 2, value: vec![] });
        assert!(!attempt.is_exhausted());
        assert_eq!(script.calls, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn all_failures_are_exhausted() {
        let mut script = Script::new(&[("A", Err("syntax error")), ("B", Err("syntax error"))]);
        let list = candidates(&["A", "B", "C"]);

        let attempt = run_script(&mut script, &list).await;

        assert!(attempt.is_exhausted());
        assert_eq!(attempt.into_option(), None);
        assert_eq!(script.calls.len(), 3);
    }

    #[tokio::test]
    async fn first_candidate_wins_when_it_works() {
        let mut script = Script::new(&[("A", Ok(vec![7])), ("B", Ok(vec![8]))]);
        let list = candidates(&["A", "B"]);

        let attempt = run_script(&mut script, &list).await;

        assert_eq!(attempt.into_option(), Some(vec![7]));
        assert_eq!(script.calls, vec!["A"]);
    }

    #[tokio::test]
    async fn empty_candidate_list_is_exhausted() {
        let mut script = Script::new(&[]);
        assert!(run_script(&mut script, &[]).await.is_exhausted());
    }

    #[test]
    fn map_keeps_the_winning_index() {
        let attempt = Attempt::Succeeded { candidate: 1, value: 3 }.map(|v| v * 2);
        assert_eq!(attempt, Attempt::Succeeded { candidate: 1, value: 6 });
        assert!(Attempt::<i32>::Exhausted.map(|v| v + 1).is_exhausted());
    }

    #[test]
    fn bind_appends_params_in_order() {
        let candidate = QueryCandidate::new("SELECT $1, $2")
            .bind(SqlParam::Int(2021))
            .bind(SqlParam::Text("SP".to_string()));
        assert_eq!(
            candidate.params,
            vec![SqlParam::Int(2021), SqlParam::Text("SP".to_string())]
        );
    }
}
