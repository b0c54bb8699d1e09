//! Print job records, their formatting options and the status machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::TicketId;
use crate::error::JobError;

/// Error returned when a form value does not name a known option.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {field}: {value:?}")]
pub struct OptionParseError {
    pub field: &'static str,
    pub value: String,
}

fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaperSize {
    #[default]
    A4,
    A3,
    Letter,
}

impl PaperSize {
    pub fn parse(value: &str) -> Result<Self, OptionParseError> {
        match normalize(value).as_str() {
            "a4" => Ok(Self::A4),
            "a3" => Ok(Self::A3),
            "letter" => Ok(Self::Letter),
            _ => Err(OptionParseError {
                field: "paper size",
                value: value.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaperSize::A4 => "A4",
            PaperSize::A3 => "A3",
            PaperSize::Letter => "Letter",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn parse(value: &str) -> Result<Self, OptionParseError> {
        match normalize(value).as_str() {
            "portrait" => Ok(Self::Portrait),
            "landscape" => Ok(Self::Landscape),
            _ => Err(OptionParseError {
                field: "orientation",
                value: value.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "Portrait",
            Orientation::Landscape => "Landscape",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorMode {
    #[default]
    BlackAndWhite,
    Color,
}

impl ColorMode {
    /// Accepts the labels used by the submission form ("Black & White", "Color").
    pub fn parse(value: &str) -> Result<Self, OptionParseError> {
        match normalize(value).as_str() {
            "black&white" | "blackandwhite" | "bw" | "b&w" | "mono" | "monochrome" => {
                Ok(Self::BlackAndWhite)
            }
            "color" | "colour" => Ok(Self::Color),
            _ => Err(OptionParseError {
                field: "color mode",
                value: value.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMode::BlackAndWhite => "Black & White",
            ColorMode::Color => "Color",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    Standard,
    High,
    Draft,
}

impl Resolution {
    pub fn parse(value: &str) -> Result<Self, OptionParseError> {
        match normalize(value).as_str() {
            "standard" | "300" | "300dpi" => Ok(Self::Standard),
            "high" | "600" | "600dpi" => Ok(Self::High),
            "draft" | "150" | "150dpi" => Ok(Self::Draft),
            _ => Err(OptionParseError {
                field: "resolution",
                value: value.to_string(),
            }),
        }
    }

    pub fn dpi(&self) -> u32 {
        match self {
            Resolution::Standard => 300,
            Resolution::High => 600,
            Resolution::Draft => 150,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Standard => "Standard",
            Resolution::High => "High",
            Resolution::Draft => "Draft",
        }
    }
}

/// Formatting options chosen at submission. Fields a submission form does not
/// offer stay `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintOptions {
    pub paper_size: PaperSize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    pub color_mode: ColorMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

impl PrintOptions {
    pub fn new(paper_size: PaperSize, color_mode: ColorMode) -> Self {
        Self {
            paper_size,
            orientation: None,
            color_mode,
            resolution: None,
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }
}

/// Where a job stands in the fulfillment workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    #[default]
    Queued,
    Printing,
    ReadyForPickup,
    Rejected,
}

impl JobStatus {
    /// No transition leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::ReadyForPickup | JobStatus::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Printing => "printing",
            JobStatus::ReadyForPickup => "ready_for_pickup",
            JobStatus::Rejected => "rejected",
        }
    }

    /// Label shown to operators and submitters.
    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Queued => "Queued",
            JobStatus::Printing => "Printing",
            JobStatus::ReadyForPickup => "Ready for Pickup",
            JobStatus::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Operator actions that move a job between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobAction {
    Accept,
    Complete,
    Reject,
    Rename,
}

impl std::fmt::Display for JobAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobAction::Accept => write!(f, "accept"),
            JobAction::Complete => write!(f, "complete"),
            JobAction::Reject => write!(f, "reject"),
            JobAction::Rename => write!(f, "rename"),
        }
    }
}

/// The status machine a deployment runs.
///
/// The full machine is `Queued -> Printing -> ReadyForPickup` plus
/// `Queued -> Rejected`. The reduced machine only knows `Queued -> Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    /// Whether `Printing` and `ReadyForPickup` exist.
    pub printing_stages: bool,
    /// Whether a job already printing may still be rejected.
    pub allow_cancel_printing: bool,
}

impl Default for Workflow {
    fn default() -> Self {
        Self::full()
    }
}

impl Workflow {
    pub fn full() -> Self {
        Self {
            printing_stages: true,
            allow_cancel_printing: false,
        }
    }

    pub fn reduced() -> Self {
        Self {
            printing_stages: false,
            allow_cancel_printing: false,
        }
    }

    pub fn with_cancel_printing(mut self, allow: bool) -> Self {
        self.allow_cancel_printing = allow;
        self
    }

    /// Status reached by applying `action` to a job in `from`, or `None` when
    /// the machine defines no such edge.
    pub fn next_status(&self, from: JobStatus, action: JobAction) -> Option<JobStatus> {
        match (from, action) {
            (JobStatus::Queued, JobAction::Accept) if self.printing_stages => {
                Some(JobStatus::Printing)
            }
            (JobStatus::Printing, JobAction::Complete) if self.printing_stages => {
                Some(JobStatus::ReadyForPickup)
            }
            (JobStatus::Queued, JobAction::Reject) => Some(JobStatus::Rejected),
            (JobStatus::Printing, JobAction::Reject) if self.allow_cancel_printing => {
                Some(JobStatus::Rejected)
            }
            // Renaming keeps the status but is only allowed before printing starts.
            (JobStatus::Queued, JobAction::Rename) => Some(JobStatus::Queued),
            _ => None,
        }
    }

    pub fn apply(
        &self,
        ticket: TicketId,
        from: JobStatus,
        action: JobAction,
    ) -> Result<JobStatus, JobError> {
        self.next_status(from, action)
            .ok_or(JobError::InvalidTransition {
                ticket,
                status: from,
                action,
            })
    }
}

/// One submitted print job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintJob {
    pub id: TicketId,
    pub submitter_name: String,
    /// Name of the stored document; changes only through a rename.
    pub document_name: String,
    pub options: PrintOptions,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PrintJob {
    /// Create a new queued job.
    pub fn new(
        id: TicketId,
        submitter_name: impl Into<String>,
        document_name: impl Into<String>,
        options: PrintOptions,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            submitter_name: submitter_name.into(),
            document_name: document_name.into(),
            options,
            status: JobStatus::Queued,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this job still claims its document name.
    pub fn holds_document_name(&self) -> bool {
        self.status != JobStatus::Rejected
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::disallowed_methods)]

    use super::*;

    #[test]
    fn full_workflow_edges() {
        let wf = Workflow::full();
        assert_eq!(
            wf.next_status(JobStatus::Queued, JobAction::Accept),
            Some(JobStatus::Printing)
        );
        assert_eq!(
            wf.next_status(JobStatus::Printing, JobAction::Complete),
            Some(JobStatus::ReadyForPickup)
        );
        assert_eq!(
            wf.next_status(JobStatus::Queued, JobAction::Reject),
            Some(JobStatus::Rejected)
        );
        assert_eq!(wf.next_status(JobStatus::Queued, JobAction::Complete), None);
        assert_eq!(wf.next_status(JobStatus::Printing, JobAction::Reject), None);
        assert_eq!(wf.next_status(JobStatus::Printing, JobAction::Rename), None);
    }

    #[test]
    fn terminal_statuses_have_no_exits() {
        let wf = Workflow::full().with_cancel_printing(true);
        for status in [JobStatus::ReadyForPickup, JobStatus::Rejected] {
            assert!(status.is_terminal());
            for action in [
                JobAction::Accept,
                JobAction::Complete,
                JobAction::Reject,
                JobAction::Rename,
            ] {
                assert_eq!(wf.next_status(status, action), None);
            }
        }
    }

    #[test]
    fn reduced_workflow_only_rejects() {
        let wf = Workflow::reduced();
        assert_eq!(wf.next_status(JobStatus::Queued, JobAction::Accept), None);
        assert_eq!(
            wf.next_status(JobStatus::Queued, JobAction::Reject),
            Some(JobStatus::Rejected)
        );
    }

    #[test]
    fn cancel_printing_is_opt_in() {
        let wf = Workflow::full().with_cancel_printing(true);
        assert_eq!(
            wf.next_status(JobStatus::Printing, JobAction::Reject),
            Some(JobStatus::Rejected)
        );
    }

    #[test]
    fn apply_reports_the_refused_edge() {
        let err = Workflow::full()
            .apply(TicketId(7), JobStatus::Rejected, JobAction::Accept)
            .unwrap_err();
        assert_eq!(
            err,
            JobError::InvalidTransition {
                ticket: TicketId(7),
                status: JobStatus::Rejected,
                action: JobAction::Accept,
            }
        );
    }

    #[test]
    fn options_parse_form_labels() {
        assert_eq!(ColorMode::parse("Black & White"), Ok(ColorMode::BlackAndWhite));
        assert_eq!(ColorMode::parse("  Color"), Ok(ColorMode::Color));
        assert_eq!(PaperSize::parse("letter"), Ok(PaperSize::Letter));
        assert_eq!(Orientation::parse("Landscape"), Ok(Orientation::Landscape));
        assert_eq!(Resolution::parse("Draft").map(|r| r.dpi()), Ok(150));
        assert!(PaperSize::parse("B5").is_err());
    }

    #[test]
    fn options_omit_unset_fields_when_serialized() {
        let options = PrintOptions::new(PaperSize::A4, ColorMode::Color);
        let json = serde_json::to_value(options).unwrap();
        assert_eq!(json["paperSize"], "A4");
        assert_eq!(json["colorMode"], "Color");
        assert!(json.get("orientation").is_none());
        assert!(json.get("resolution").is_none());
    }
}
