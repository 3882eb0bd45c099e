//! PostgreSQL Repository Implementations

mod call_repository;
mod prompt_repository;

pub use call_repository::PgCallRepository;
pub use prompt_repository::PgPromptRepository;

use callsight::DomainError;

/// Connection-level failures are transient; everything else (constraint
/// violations, decode errors, bad SQL) is not.
fn repository_error(err: sqlx::Error) -> DomainError {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            DomainError::Unavailable(err.to_string())
        }
        other => DomainError::Repository(other.to_string()),
    }
}
