//! Errors raised by the job queue and its naming rules.

use crate::{JobAction, JobStatus, TicketId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobError {
    #[error("job {0} not found")]
    NotFound(TicketId),

    #[error("cannot {action} job {ticket} while it is {status}")]
    InvalidTransition {
        ticket: TicketId,
        status: JobStatus,
        action: JobAction,
    },

    #[error("ticket {0} was already issued")]
    TicketInUse(TicketId),

    #[error("document name {0:?} is already in use")]
    DuplicateName(String),

    #[error("invalid document name {name:?}: {reason}")]
    InvalidDocumentName { name: String, reason: &'static str },
}
