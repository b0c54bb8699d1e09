//! Client handle for the print queue actor.

use std::sync::Arc;

use bytes::Bytes;
use printflow_core::naming::validate_document_name;
use printflow_core::{JobAction, JobEvent, PrintJob, QueueStats, TicketAllocator, TicketId};
use ractor::{Actor, ActorRef, RpcReplyPort};
use storage::DocumentStore;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::LifecycleConfig;
use crate::error::LifecycleError;
use crate::messages::{QueueMessage, Submission};
use crate::notifier::StatusNotifier;
use crate::queue_actor::{PrintQueueActor, PrintQueueArgs};

/// Capacity of the event channel handed to subscribers.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Cloneable front desk for the print queue.
///
/// Mutations and listings are forwarded to the queue actor and answered in
/// arrival order. Document downloads read the store directly so they do not
/// wait behind operator actions.
#[derive(Clone)]
pub struct PrintDesk {
    actor: ActorRef<QueueMessage>,
    store: DocumentStore,
    event_tx: broadcast::Sender<JobEvent>,
}

impl PrintDesk {
    /// Spawn the queue actor and return a handle to it.
    pub async fn start(
        config: LifecycleConfig,
        store: DocumentStore,
        notifier: Arc<dyn StatusNotifier>,
    ) -> Result<(Self, JoinHandle<()>), LifecycleError> {
        let tickets = TicketAllocator::new(config.ticket_mode)?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let args = PrintQueueArgs {
            config,
            tickets,
            store: store.clone(),
            notifier,
            event_tx: event_tx.clone(),
        };

        let (actor, handle) = Actor::spawn(None, PrintQueueActor, args)
            .await
            .map_err(|e| LifecycleError::Unavailable(format!("failed to spawn queue: {e}")))?;

        Ok((
            Self {
                actor,
                store,
                event_tx,
            },
            handle,
        ))
    }

    async fn call<T: Send + 'static>(
        &self,
        build: impl FnOnce(RpcReplyPort<T>) -> QueueMessage,
    ) -> Result<T, LifecycleError> {
        let (tx, rx) = ractor::concurrency::oneshot();
        self.actor
            .send_message(build(tx.into()))
            .map_err(|e| LifecycleError::Unavailable(format!("failed to send message: {e}")))?;

        rx.await
            .map_err(|_| LifecycleError::Unavailable("failed to receive response".into()))
    }

    async fn apply(&self, ticket: TicketId, action: JobAction) -> Result<PrintJob, LifecycleError> {
        self.call(|reply| QueueMessage::Transition {
            ticket,
            action,
            reply,
        })
        .await?
    }

    /// Store the document and queue a new job at the head of the list.
    pub async fn submit(&self, submission: Submission) -> Result<PrintJob, LifecycleError> {
        self.call(|reply| QueueMessage::Submit {
            submission: Box::new(submission),
            reply,
        })
        .await?
    }

    /// `Queued -> Printing`.
    pub async fn accept_for_printing(&self, ticket: TicketId) -> Result<PrintJob, LifecycleError> {
        self.apply(ticket, JobAction::Accept).await
    }

    /// `Printing -> ReadyForPickup`.
    pub async fn mark_ready(&self, ticket: TicketId) -> Result<PrintJob, LifecycleError> {
        self.apply(ticket, JobAction::Complete).await
    }

    /// `Queued -> Rejected` (and `Printing -> Rejected` when cancelling is allowed).
    pub async fn reject(&self, ticket: TicketId) -> Result<PrintJob, LifecycleError> {
        self.apply(ticket, JobAction::Reject).await
    }

    /// Rename a queued job's document, keeping its extension.
    pub async fn rename(
        &self,
        ticket: TicketId,
        new_name: impl Into<String>,
    ) -> Result<PrintJob, LifecycleError> {
        let new_name = new_name.into();
        self.call(|reply| QueueMessage::Rename {
            ticket,
            new_name,
            reply,
        })
        .await?
    }

    pub async fn get(&self, ticket: TicketId) -> Result<PrintJob, LifecycleError> {
        self.call(|reply| QueueMessage::GetJob { ticket, reply })
            .await?
    }

    /// All jobs, newest first.
    pub async fn list_all(&self) -> Result<Vec<PrintJob>, LifecycleError> {
        self.call(|reply| QueueMessage::ListJobs { reply }).await
    }

    pub async fn stats(&self) -> Result<QueueStats, LifecycleError> {
        self.call(|reply| QueueMessage::GetStats { reply }).await
    }

    /// Bytes of a stored document.
    pub async fn fetch_document(&self, name: &str) -> Result<Bytes, LifecycleError> {
        validate_document_name(name)?;
        Ok(self.store.fetch(name).await?)
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }

    /// Ask the actor to stop after the messages already queued.
    pub fn shutdown(&self) -> Result<(), LifecycleError> {
        self.actor
            .send_message(QueueMessage::Shutdown)
            .map_err(|e| LifecycleError::Unavailable(format!("failed to send message: {e}")))
    }
}
