//! Queue actor: the single writer for the job queue and its documents.
//!
//! Every mutating request is a message, and ractor hands messages to
//! `handle` one at a time, so a job's status and document name are never
//! updated by two requests at once.

use std::sync::Arc;

use chrono::Utc;
use printflow_core::naming::{self, suffixed, validate_document_name};
use printflow_core::{
    DuplicatePolicy, JobAction, JobEvent, JobQueue, JobStatus, PrintJob, RetentionPolicy,
    TicketAllocator, TicketId,
};
use ractor::{Actor, ActorProcessingErr, ActorRef};
use storage::{DocumentStore, StorageError};
use tokio::sync::broadcast;

use crate::config::LifecycleConfig;
use crate::error::LifecycleError;
use crate::messages::{QueueMessage, Submission};
use crate::notifier::{self, StatusNotifier};

/// Highest suffix tried before a colliding name is refused.
const MAX_NAME_SUFFIX: u32 = 1000;

/// Arguments for spawning the queue actor.
pub struct PrintQueueArgs {
    pub config: LifecycleConfig,
    pub tickets: TicketAllocator,
    pub store: DocumentStore,
    pub notifier: Arc<dyn StatusNotifier>,
    pub event_tx: broadcast::Sender<JobEvent>,
}

/// State for the queue actor.
pub struct PrintQueueState {
    config: LifecycleConfig,
    queue: JobQueue,
    tickets: TicketAllocator,
    store: DocumentStore,
    notifier: Arc<dyn StatusNotifier>,
    event_tx: broadcast::Sender<JobEvent>,
}

impl PrintQueueState {
    pub fn new(args: PrintQueueArgs) -> Self {
        Self {
            config: args.config,
            queue: JobQueue::new(),
            tickets: args.tickets,
            store: args.store,
            notifier: args.notifier,
            event_tx: args.event_tx,
        }
    }

    /// Publish an event; status events also go to the notifier.
    fn broadcast(&self, event: JobEvent) {
        if event.status().is_some() {
            notifier::dispatch(&self.notifier, &event);
        }
        let _ = self.event_tx.send(event);
    }

    async fn name_taken(&self, name: &str) -> Result<bool, LifecycleError> {
        if self.queue.name_in_use(name) {
            return Ok(true);
        }
        Ok(self.store.exists(name).await?)
    }

    /// Pick the stored name for a submission according to the duplicate policy.
    async fn resolve_name(&self, requested: &str) -> Result<String, LifecycleError> {
        if !self.name_taken(requested).await? {
            return Ok(requested.to_string());
        }

        match self.config.duplicate_policy {
            DuplicatePolicy::Reject => Err(LifecycleError::DuplicateName(requested.to_string())),
            DuplicatePolicy::Suffix => {
                for n in 1..=MAX_NAME_SUFFIX {
                    let candidate = suffixed(requested, n);
                    if !self.name_taken(&candidate).await? {
                        return Ok(candidate);
                    }
                }
                Err(LifecycleError::DuplicateName(requested.to_string()))
            }
        }
    }

    pub async fn submit(&mut self, submission: Submission) -> Result<PrintJob, LifecycleError> {
        let submitter = submission.submitter_name.trim();
        if submitter.is_empty() {
            return Err(LifecycleError::InvalidRequest(
                "submitter name is required".into(),
            ));
        }
        validate_document_name(&submission.document_name)?;

        let name = self.resolve_name(&submission.document_name).await?;
        let ticket = self.tickets.next()?;

        self.store
            .save(&name, submission.document)
            .await
            .map_err(|e| match e {
                StorageError::AlreadyExists(name) => LifecycleError::DuplicateName(name),
                other => LifecycleError::from(other),
            })?;

        let job = PrintJob::new(ticket, submitter, name, submission.options);
        if let Err(e) = self.queue.insert(job.clone()) {
            if let Err(cleanup) = self.store.delete(&job.document_name).await {
                tracing::warn!(%ticket, error = %cleanup, "Failed to remove orphaned upload");
            }
            return Err(e.into());
        }

        tracing::info!(
            %ticket,
            submitter = %job.submitter_name,
            document = %job.document_name,
            "Job submitted"
        );
        self.broadcast(JobEvent::JobSubmitted {
            job: job.clone(),
            timestamp: job.created_at,
        });

        Ok(job)
    }

    pub async fn transition(
        &mut self,
        ticket: TicketId,
        action: JobAction,
    ) -> Result<PrintJob, LifecycleError> {
        let change = self
            .queue
            .transition(ticket, &self.config.workflow, action)
            .inspect_err(|e| tracing::debug!(%ticket, %action, error = %e, "Transition refused"))?;
        let job = self.queue.find_by_id(ticket)?.clone();

        tracing::info!(%ticket, from = %change.from, to = %change.to, "Job status changed");
        self.broadcast(JobEvent::JobStatusChanged {
            ticket,
            submitter_name: job.submitter_name.clone(),
            old_status: change.from,
            new_status: change.to,
            timestamp: job.updated_at,
        });

        if change.to == JobStatus::Rejected {
            self.settle_rejected_document(&job).await;
        }

        Ok(job)
    }

    /// Apply the retention policy. The rejection itself already stands, so
    /// storage failures are only logged.
    async fn settle_rejected_document(&self, job: &PrintJob) {
        let name = job.document_name.clone();
        match self.config.retention {
            RetentionPolicy::Retain => {
                tracing::warn!(
                    ticket = %job.id,
                    document = %name,
                    "Rejected job's document retained in storage"
                );
                self.broadcast(JobEvent::DocumentRetained {
                    ticket: job.id,
                    document_name: name,
                    timestamp: Utc::now(),
                });
            }
            RetentionPolicy::Delete => match self.store.delete(&name).await {
                Ok(()) => {
                    tracing::info!(ticket = %job.id, document = %name, "Rejected job's document deleted");
                    self.broadcast(JobEvent::DocumentDeleted {
                        ticket: job.id,
                        document_name: name,
                        timestamp: Utc::now(),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        ticket = %job.id,
                        document = %name,
                        error = %e,
                        "Failed to delete rejected job's document"
                    );
                }
            },
        }
    }

    pub async fn rename(
        &mut self,
        ticket: TicketId,
        new_name: &str,
    ) -> Result<PrintJob, LifecycleError> {
        let job = self.queue.find_by_id(ticket)?;
        self.config
            .workflow
            .apply(ticket, job.status, JobAction::Rename)?;

        let current = job.document_name.clone();
        let target = naming::rename_target(&current, new_name)?;
        if target == current {
            return Ok(job.clone());
        }
        if self.queue.name_in_use(&target) {
            return Err(LifecycleError::rename(
                &current,
                &target,
                StorageError::AlreadyExists(target.clone()),
            ));
        }

        // The record only changes once the stored file has moved.
        self.store
            .rename(&current, &target)
            .await
            .map_err(|e| LifecycleError::rename(&current, &target, e))?;

        let job = self.queue.find_by_id_mut(ticket)?;
        job.document_name = target.clone();
        job.updated_at = Utc::now();
        let job = job.clone();

        tracing::info!(%ticket, from = %current, to = %target, "Document renamed");
        self.broadcast(JobEvent::DocumentRenamed {
            ticket,
            old_name: current,
            new_name: target,
            timestamp: job.updated_at,
        });

        Ok(job)
    }
}

/// Queue actor that owns the print queue.
pub struct PrintQueueActor;

impl Actor for PrintQueueActor {
    type Msg = QueueMessage;
    type State = PrintQueueState;
    type Arguments = PrintQueueArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!(
            storage = args.store.kind().as_str(),
            notifier = args.notifier.name(),
            "Starting print queue actor"
        );
        Ok(PrintQueueState::new(args))
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            QueueMessage::Submit { submission, reply } => {
                let result = state.submit(*submission).await;
                let _ = reply.send(result);
            }

            QueueMessage::Transition {
                ticket,
                action,
                reply,
            } => {
                let result = state.transition(ticket, action).await;
                let _ = reply.send(result);
            }

            QueueMessage::Rename {
                ticket,
                new_name,
                reply,
            } => {
                let result = state.rename(ticket, &new_name).await;
                let _ = reply.send(result);
            }

            QueueMessage::GetJob { ticket, reply } => {
                let result = state
                    .queue
                    .find_by_id(ticket)
                    .cloned()
                    .map_err(LifecycleError::from);
                let _ = reply.send(result);
            }

            QueueMessage::ListJobs { reply } => {
                let _ = reply.send(state.queue.list());
            }

            QueueMessage::GetStats { reply } => {
                let _ = reply.send(state.queue.stats());
            }

            QueueMessage::Shutdown => {
                tracing::info!(jobs = state.queue.len(), "Shutting down print queue");
                myself.stop(None);
            }
        }

        Ok(())
    }
}
