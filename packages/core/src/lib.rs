//! Core domain types for the print queue.
//!
//! This crate contains shared types used across all packages:
//! - Tickets and their allocator
//! - PrintJob, PrintOptions and the status machine
//! - JobQueue, the newest-first job list
//! - Document naming rules
//! - Events for notifications and real-time updates

mod error;
mod events;
mod job;
pub mod naming;
mod queue;
mod ticket;

pub use error::JobError;
pub use events::JobEvent;
pub use job::{
    ColorMode, JobAction, JobStatus, OptionParseError, Orientation, PaperSize, PrintJob,
    PrintOptions, Resolution, Workflow,
};
pub use naming::{DuplicatePolicy, RetentionPolicy};
pub use queue::{JobQueue, QueueStats, Transition};
pub use ticket::{
    DEFAULT_RANDOM_MAX, DEFAULT_RANDOM_MIN, DEFAULT_TICKET_BASE, TicketAllocator, TicketError,
    TicketId, TicketMode,
};
