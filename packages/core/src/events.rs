//! Event types for notifications and real-time updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{JobStatus, PrintJob, TicketId};

/// Events emitted by the print queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEvent {
    /// A new job entered the queue.
    JobSubmitted {
        job: PrintJob,
        timestamp: DateTime<Utc>,
    },
    /// A job moved to another status.
    JobStatusChanged {
        ticket: TicketId,
        submitter_name: String,
        old_status: JobStatus,
        new_status: JobStatus,
        timestamp: DateTime<Utc>,
    },
    /// A job's document was renamed.
    DocumentRenamed {
        ticket: TicketId,
        old_name: String,
        new_name: String,
        timestamp: DateTime<Utc>,
    },
    /// A rejected job's document was kept in storage.
    DocumentRetained {
        ticket: TicketId,
        document_name: String,
        timestamp: DateTime<Utc>,
    },
    /// A rejected job's document was removed from storage.
    DocumentDeleted {
        ticket: TicketId,
        document_name: String,
        timestamp: DateTime<Utc>,
    },
}

impl JobEvent {
    /// Get the timestamp of the event.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            JobEvent::JobSubmitted { timestamp, .. } => *timestamp,
            JobEvent::JobStatusChanged { timestamp, .. } => *timestamp,
            JobEvent::DocumentRenamed { timestamp, .. } => *timestamp,
            JobEvent::DocumentRetained { timestamp, .. } => *timestamp,
            JobEvent::DocumentDeleted { timestamp, .. } => *timestamp,
        }
    }

    /// Get the ticket this event is about.
    pub fn ticket(&self) -> TicketId {
        match self {
            JobEvent::JobSubmitted { job, .. } => job.id,
            JobEvent::JobStatusChanged { ticket, .. } => *ticket,
            JobEvent::DocumentRenamed { ticket, .. } => *ticket,
            JobEvent::DocumentRetained { ticket, .. } => *ticket,
            JobEvent::DocumentDeleted { ticket, .. } => *ticket,
        }
    }

    /// New status carried by submit and transition events.
    pub fn status(&self) -> Option<JobStatus> {
        match self {
            JobEvent::JobSubmitted { job, .. } => Some(job.status),
            JobEvent::JobStatusChanged { new_status, .. } => Some(*new_status),
            _ => None,
        }
    }

    /// Get a short description of this event for logging.
    pub fn description(&self) -> String {
        match self {
            JobEvent::JobSubmitted { job, .. } => format!(
                "Job #{} for {} is now '{}'",
                job.id,
                job.submitter_name,
                job.status.label()
            ),
            JobEvent::JobStatusChanged {
                ticket,
                submitter_name,
                new_status,
                ..
            } => format!(
                "Job #{} for {} is now '{}'",
                ticket,
                submitter_name,
                new_status.label()
            ),
            JobEvent::DocumentRenamed {
                ticket,
                old_name,
                new_name,
                ..
            } => format!("Job #{} document {} -> {}", ticket, old_name, new_name),
            JobEvent::DocumentRetained {
                ticket,
                document_name,
                ..
            } => format!("Job #{} rejected, retained {}", ticket, document_name),
            JobEvent::DocumentDeleted {
                ticket,
                document_name,
                ..
            } => format!("Job #{} rejected, deleted {}", ticket, document_name),
        }
    }
}
