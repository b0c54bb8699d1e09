//! Status notifier trait and the stock implementations.
//!
//! A notifier mirrors job status changes to some outside system. It is called
//! after the queue has already committed the change, on a spawned task, so a
//! slow or failing notifier never holds up or undoes a transition.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use printflow_core::JobEvent;

/// Result type for notifiers.
pub type NotifyResult = Result<(), String>;

/// Future type for async notifiers.
pub type NotifyFuture = Pin<Box<dyn Future<Output = NotifyResult> + Send>>;

/// Longest a single notification may run before it is abandoned.
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

pub trait StatusNotifier: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Deliver one event.
    fn notify(&self, event: &JobEvent) -> NotifyFuture;
}

/// Writes a sync line to the log for every status change.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl StatusNotifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    fn notify(&self, event: &JobEvent) -> NotifyFuture {
        let line = event.description();
        Box::pin(async move {
            tracing::info!(target: "printflow::sync", "--- [SYNC] {} ---", line);
            Ok(())
        })
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl StatusNotifier for NoopNotifier {
    fn name(&self) -> &str {
        "noop"
    }

    fn notify(&self, _event: &JobEvent) -> NotifyFuture {
        Box::pin(async { Ok(()) })
    }
}

/// A simple function-based notifier.
pub struct FnNotifier<F>
where
    F: Fn(&JobEvent) -> NotifyFuture + Send + Sync + 'static,
{
    name: String,
    notifier: F,
}

impl<F> FnNotifier<F>
where
    F: Fn(&JobEvent) -> NotifyFuture + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, notifier: F) -> Self {
        Self {
            name: name.into(),
            notifier,
        }
    }
}

impl<F> StatusNotifier for FnNotifier<F>
where
    F: Fn(&JobEvent) -> NotifyFuture + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn notify(&self, event: &JobEvent) -> NotifyFuture {
        (self.notifier)(event)
    }
}

/// Fire-and-forget delivery: failures and timeouts are logged, never returned.
pub(crate) fn dispatch(notifier: &Arc<dyn StatusNotifier>, event: &JobEvent) {
    let name = notifier.name().to_string();
    let ticket = event.ticket();
    let delivery = notifier.notify(event);

    tokio::spawn(async move {
        match tokio::time::timeout(NOTIFY_TIMEOUT, delivery).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(notifier = %name, %ticket, error = %e, "Status notification failed");
            }
            Err(_) => {
                tracing::warn!(notifier = %name, %ticket, "Status notification timed out");
            }
        }
    });
}
