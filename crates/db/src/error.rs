use yamdb_core::error::CoreError;

/// Failure on the transactional review write path.
///
/// The open transaction is dropped (and therefore rolled back) on every
/// error, so no variant ever leaves a partial review row or a stale rating.
#[derive(Debug, thiserror::Error)]
pub enum ReviewWriteError {
    /// Validation, not-found, or duplicate-review rejection.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
