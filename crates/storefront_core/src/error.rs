//! crates/storefront_core/src/error.rs
//!
//! The error type returned by the storefront workflows.

use crate::domain::PaymentStatus;
use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Missing or malformed input.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The caller is not an admin, or tried to act on their own account.
    #[error("Forbidden")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    /// The payment has already left `pending`.
    #[error("Cannot move a payment from {from} to {to}")]
    InvalidTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<PortError> for ServiceError {
    fn from(e: PortError) -> Self {
        match e {
            PortError::NotFound(what) => ServiceError::NotFound(what),
            PortError::Unexpected(msg) => ServiceError::StoreUnavailable(msg),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
