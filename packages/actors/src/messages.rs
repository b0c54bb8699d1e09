//! Message types for actor communication.

use bytes::Bytes;
use printflow_core::{JobAction, PrintJob, PrintOptions, QueueStats, TicketId};
use ractor::RpcReplyPort;

use crate::error::LifecycleError;

/// A new print request as received from a submitter.
#[derive(Debug, Clone)]
pub struct Submission {
    pub submitter_name: String,
    pub document_name: String,
    pub options: PrintOptions,
    pub document: Bytes,
}

impl Submission {
    pub fn new(
        submitter_name: impl Into<String>,
        document_name: impl Into<String>,
        options: PrintOptions,
        document: impl Into<Bytes>,
    ) -> Self {
        Self {
            submitter_name: submitter_name.into(),
            document_name: document_name.into(),
            options,
            document: document.into(),
        }
    }
}

pub type LifecycleReply<T> = RpcReplyPort<Result<T, LifecycleError>>;

/// Messages for the PrintQueueActor.
#[derive(Debug)]
pub enum QueueMessage {
    /// Store the document and queue a new job.
    Submit {
        submission: Box<Submission>,
        reply: LifecycleReply<PrintJob>,
    },

    /// Accept, complete or reject a job.
    Transition {
        ticket: TicketId,
        action: JobAction,
        reply: LifecycleReply<PrintJob>,
    },

    /// Rename a queued job's document.
    Rename {
        ticket: TicketId,
        new_name: String,
        reply: LifecycleReply<PrintJob>,
    },

    /// Get a job by ticket.
    GetJob {
        ticket: TicketId,
        reply: LifecycleReply<PrintJob>,
    },

    /// Snapshot of all jobs, newest first.
    ListJobs { reply: RpcReplyPort<Vec<PrintJob>> },

    /// Job counts per status.
    GetStats { reply: RpcReplyPort<QueueStats> },

    /// Stop the actor.
    Shutdown,
}
