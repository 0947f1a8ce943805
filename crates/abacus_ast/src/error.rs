use thiserror::Error;

/// Failure modes of the symbol cache.
///
/// Interning is idempotent and normally infallible; the only way it can
/// fail is by running out of composite names, which is fatal for the
/// search that owns the store.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternError {
    #[error("symbol cache exhausted: no composite names left")]
    CacheExhausted,
}
