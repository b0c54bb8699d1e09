//! The ordered collection of print jobs.

use std::collections::{HashMap, VecDeque};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::JobError;
use crate::{JobAction, JobStatus, PrintJob, TicketId, Workflow};

/// Job counts per status, for dashboard headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueueStats {
    pub queued: u64,
    pub printing: u64,
    pub ready_for_pickup: u64,
    pub rejected: u64,
}

impl QueueStats {
    /// Jobs an operator still has to act on.
    pub fn active(&self) -> u64 {
        self.queued + self.printing
    }

    pub fn total(&self) -> u64 {
        self.queued + self.printing + self.ready_for_pickup + self.rejected
    }
}

/// Outcome of a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub ticket: TicketId,
    pub from: JobStatus,
    pub to: JobStatus,
}

/// Newest-first job list. Records are never removed.
#[derive(Debug, Default)]
pub struct JobQueue {
    jobs: VecDeque<PrintJob>,
    /// Insertion sequence per ticket; the job inserted `seq`-th sits at
    /// `len - 1 - seq` because every insert goes to the head.
    index: HashMap<TicketId, usize>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Place `job` at the head of the queue.
    pub fn insert(&mut self, job: PrintJob) -> Result<(), JobError> {
        if self.index.contains_key(&job.id) {
            return Err(JobError::TicketInUse(job.id));
        }
        self.index.insert(job.id, self.jobs.len());
        self.jobs.push_front(job);
        Ok(())
    }

    fn position(&self, id: TicketId) -> Result<usize, JobError> {
        let seq = self.index.get(&id).ok_or(JobError::NotFound(id))?;
        Ok(self.jobs.len() - 1 - seq)
    }

    pub fn find_by_id(&self, id: TicketId) -> Result<&PrintJob, JobError> {
        let pos = self.position(id)?;
        self.jobs.get(pos).ok_or(JobError::NotFound(id))
    }

    /// The only way to mutate a stored record.
    pub fn find_by_id_mut(&mut self, id: TicketId) -> Result<&mut PrintJob, JobError> {
        let pos = self.position(id)?;
        self.jobs.get_mut(pos).ok_or(JobError::NotFound(id))
    }

    /// Apply `action` to the job's status under `workflow`.
    ///
    /// `Rename` is not a status change and is refused here; it only moves the
    /// document, which goes through the lifecycle controller.
    pub fn transition(
        &mut self,
        id: TicketId,
        workflow: &Workflow,
        action: JobAction,
    ) -> Result<Transition, JobError> {
        let job = self.find_by_id_mut(id)?;
        let from = job.status;
        if action == JobAction::Rename {
            return Err(JobError::InvalidTransition {
                ticket: id,
                status: from,
                action,
            });
        }
        let to = workflow.apply(id, from, action)?;

        job.status = to;
        job.updated_at = Utc::now();

        Ok(Transition {
            ticket: id,
            from,
            to,
        })
    }

    /// Whether a job that still claims its document uses `name`.
    pub fn name_in_use(&self, name: &str) -> bool {
        self.jobs
            .iter()
            .any(|job| job.holds_document_name() && job.document_name == name)
    }

    /// Jobs, head (newest) first.
    pub fn iter(&self) -> impl Iterator<Item = &PrintJob> {
        self.jobs.iter()
    }

    /// Owned snapshot, head first.
    pub fn list(&self) -> Vec<PrintJob> {
        self.jobs.iter().cloned().collect()
    }

    pub fn stats(&self) -> QueueStats {
        let mut stats = QueueStats::default();
        for job in &self.jobs {
            match job.status {
                JobStatus::Queued => stats.queued += 1,
                JobStatus::Printing => stats.printing += 1,
                JobStatus::ReadyForPickup => stats.ready_for_pickup += 1,
                JobStatus::Rejected => stats.rejected += 1,
            }
        }
        stats
    }
}
