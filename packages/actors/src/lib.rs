//! Actor system for the print queue.
//!
//! This crate provides the Ractor-based lifecycle controller:
//!
//! - `PrintQueueActor` - owns the job queue, ticket allocator and document
//!   store, and applies submit/accept/complete/reject/rename one at a time
//! - `PrintDesk` - cloneable handle that sends those requests and awaits replies
//! - `StatusNotifier` - outside collaborator told about every status change
//!
//! # Usage
//!
//! ```ignore
//! use actors::{LifecycleConfig, LogNotifier, PrintDesk, Submission};
//!
//! let store = storage::DocumentStore::from_env()?;
//! let (desk, _handle) =
//!     PrintDesk::start(LifecycleConfig::default(), store, Arc::new(LogNotifier)).await?;
//! let job = desk.submit(Submission::new("studentA", "notes.docx", options, bytes)).await?;
//! desk.accept_for_printing(job.id).await?;
//! ```

mod config;
mod desk;
mod error;
mod messages;
mod notifier;
mod queue_actor;

pub use config::{ConfigError, LifecycleConfig};
pub use desk::PrintDesk;
pub use error::LifecycleError;
pub use messages::{QueueMessage, Submission};
pub use notifier::{
    FnNotifier, LogNotifier, NOTIFY_TIMEOUT, NoopNotifier, NotifyFuture, NotifyResult,
    StatusNotifier,
};
pub use queue_actor::{PrintQueueActor, PrintQueueArgs, PrintQueueState};
