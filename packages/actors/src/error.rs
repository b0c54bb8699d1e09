//! Errors returned by lifecycle operations.

use printflow_core::{JobAction, JobError, JobStatus, TicketError, TicketId};
use storage::StorageError;

/// Outcome of a failed lifecycle operation. No variant is fatal: the queue
/// keeps its prior state and the caller decides whether to retry.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("job {0} not found")]
    NotFound(TicketId),

    #[error("document {0:?} not found")]
    DocumentNotFound(String),

    #[error("cannot {action} job {ticket} while it is {status}")]
    InvalidTransition {
        ticket: TicketId,
        status: JobStatus,
        action: JobAction,
    },

    #[error("document name {0:?} is already in use")]
    DuplicateName(String),

    #[error("invalid document name {name:?}: {reason}")]
    InvalidDocumentName { name: String, reason: &'static str },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("cannot rename {from:?} to {to:?}: {source}")]
    Rename {
        from: String,
        to: String,
        #[source]
        source: StorageError,
    },

    #[error("storage timed out: {0}")]
    StorageTimeout(String),

    #[error("storage error: {0}")]
    Storage(StorageError),

    #[error("ticket allocation failed: {0}")]
    Tickets(#[from] TicketError),

    #[error("ticket {0} was issued twice")]
    TicketReissued(TicketId),

    #[error("print queue unavailable: {0}")]
    Unavailable(String),
}

impl LifecycleError {
    pub(crate) fn rename(from: &str, to: &str, source: StorageError) -> Self {
        match source {
            StorageError::Timeout { .. } => Self::StorageTimeout(source.to_string()),
            source => Self::Rename {
                from: from.to_string(),
                to: to.to_string(),
                source,
            },
        }
    }
}

impl From<JobError> for LifecycleError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::NotFound(ticket) => Self::NotFound(ticket),
            JobError::InvalidTransition {
                ticket,
                status,
                action,
            } => Self::InvalidTransition {
                ticket,
                status,
                action,
            },
            JobError::DuplicateName(name) => Self::DuplicateName(name),
            JobError::InvalidDocumentName { name, reason } => {
                Self::InvalidDocumentName { name, reason }
            }
            JobError::TicketInUse(ticket) => Self::TicketReissued(ticket),
        }
    }
}

impl From<StorageError> for LifecycleError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(name) => Self::DocumentNotFound(name),
            StorageError::AlreadyExists(name) => Self::DuplicateName(name),
            StorageError::InvalidName(name) => Self::InvalidDocumentName {
                name,
                reason: "not a valid storage key",
            },
            StorageError::Timeout { .. } => Self::StorageTimeout(err.to_string()),
            other => Self::Storage(other),
        }
    }
}
