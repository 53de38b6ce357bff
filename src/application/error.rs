use thiserror::Error;

use crate::domain::{SaleId, ValidationError};
use crate::io::LaunchError;

/// Coarse error classes shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad form input; nothing was written
    Validation,
    /// The ledger or an invoice file could not be written or read
    Persistence,
    /// A document could not be opened for viewing
    Launch,
    /// The requested sale does not exist
    NotFound,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Persistence => "persistence",
            ErrorKind::Launch => "launch",
            ErrorKind::NotFound => "not found",
        };
        write!(f, "{}", s)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed saving sale record: {0:#}")]
    Ledger(anyhow::Error),

    #[error("Failed creating invoice file for sale #{sale_id}: {cause:#}")]
    Invoice { sale_id: SaleId, cause: anyhow::Error },

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error("Sale not found: {0}")]
    SaleNotFound(SaleId),

    #[error("Database error: {0:#}")]
    Database(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Ledger(_) | AppError::Invoice { .. } | AppError::Database(_) => {
                ErrorKind::Persistence
            }
            AppError::Launch(_) => ErrorKind::Launch,
            AppError::SaleNotFound(_) => ErrorKind::NotFound,
        }
    }
}
