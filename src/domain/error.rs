//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the distribution contract.
/// These are independent of file formats and configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("office not found: {0}")]
    OfficeNotFound(String),

    #[error("decimal overflow while computing amounts for office: {office}")]
    ArithmeticOverflow { office: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
