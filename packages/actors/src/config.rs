//! Policy knobs for the print queue.

use printflow_core::{
    DEFAULT_RANDOM_MAX, DEFAULT_RANDOM_MIN, DEFAULT_TICKET_BASE, DuplicatePolicy,
    RetentionPolicy, TicketMode, Workflow,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
#[error("invalid {var}={value:?}: expected {expected}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// How the lifecycle controller behaves where deployments differ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub workflow: Workflow,
    pub ticket_mode: TicketMode,
    pub duplicate_policy: DuplicatePolicy,
    pub retention: RetentionPolicy,
}

impl LifecycleConfig {
    pub fn with_workflow(mut self, workflow: Workflow) -> Self {
        self.workflow = workflow;
        self
    }

    pub fn with_ticket_mode(mut self, mode: TicketMode) -> Self {
        self.ticket_mode = mode;
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    pub fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    /// Build a config from environment variables.
    ///
    /// - `WORKFLOW`: `full` (default) or `reduced`
    /// - `ALLOW_CANCEL_PRINTING`: `true` lets operators reject a printing job
    /// - `TICKET_MODE`: `sequential` (default) or `random`
    /// - `TICKET_BASE`: first sequential ticket (default 1001)
    /// - `DUPLICATE_NAMES`: `reject` (default) or `suffix`
    /// - `REJECTED_DOCUMENTS`: `retain` (default) or `delete`
    pub fn from_env() -> Result<Self, ConfigError> {
        let workflow = match var("WORKFLOW").as_deref() {
            None | Some("full") => Workflow::full(),
            Some("reduced") => Workflow::reduced(),
            Some(other) => return Err(invalid("WORKFLOW", other, "full|reduced")),
        };
        let allow_cancel = match var("ALLOW_CANCEL_PRINTING").as_deref() {
            None | Some("0" | "false" | "no") => false,
            Some("1" | "true" | "yes") => true,
            Some(other) => return Err(invalid("ALLOW_CANCEL_PRINTING", other, "true|false")),
        };

        let ticket_mode = match var("TICKET_MODE").as_deref() {
            None | Some("sequential") => {
                let base = match var("TICKET_BASE") {
                    Some(raw) => raw
                        .parse()
                        .map_err(|_| invalid("TICKET_BASE", &raw, "unsigned integer"))?,
                    None => DEFAULT_TICKET_BASE,
                };
                TicketMode::Sequential { base }
            }
            Some("random") => TicketMode::Random {
                min: DEFAULT_RANDOM_MIN,
                max: DEFAULT_RANDOM_MAX,
            },
            Some(other) => return Err(invalid("TICKET_MODE", other, "sequential|random")),
        };

        let duplicate_policy = match var("DUPLICATE_NAMES").as_deref() {
            None | Some("reject") => DuplicatePolicy::Reject,
            Some("suffix") => DuplicatePolicy::Suffix,
            Some(other) => return Err(invalid("DUPLICATE_NAMES", other, "reject|suffix")),
        };

        let retention = match var("REJECTED_DOCUMENTS").as_deref() {
            None | Some("retain") => RetentionPolicy::Retain,
            Some("delete") => RetentionPolicy::Delete,
            Some(other) => return Err(invalid("REJECTED_DOCUMENTS", other, "retain|delete")),
        };

        Ok(Self {
            workflow: workflow.with_cancel_printing(allow_cancel),
            ticket_mode,
            duplicate_policy,
            retention,
        })
    }
}

fn var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
}

fn invalid(var: &'static str, value: &str, expected: &'static str) -> ConfigError {
    ConfigError {
        var,
        value: value.to_string(),
        expected,
    }
}
