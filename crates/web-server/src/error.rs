use thiserror::Error;

/// Anything that can go wrong while computing a statistics response.
///
/// Handlers never turn these into error responses: they are logged and the
/// endpoint answers with empty or zeroed data instead.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] database::DbError),
}
