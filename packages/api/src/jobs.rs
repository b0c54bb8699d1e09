//! Job submission, listing and status transitions.

use actors::{PrintDesk, Submission};
use axum::Json;
use axum::extract::multipart::Field;
use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use bytes::Bytes;
use printflow_core::{
    ColorMode, JobStatus, OptionParseError, Orientation, PaperSize, PrintJob, PrintOptions,
    QueueStats, Resolution, TicketId,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub ticket_id: TicketId,
    pub document_name: String,
    pub status: JobStatus,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    #[serde(rename = "newName", alias = "new_name")]
    pub new_name: String,
}

impl From<OptionParseError> for ApiError {
    fn from(err: OptionParseError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

/// Form fields collected from a submission. Both the camelCase names and the
/// snake_case names used by the upload page are accepted.
#[derive(Debug, Default)]
struct SubmitForm {
    submitter: Option<String>,
    document_name: Option<String>,
    file_name: Option<String>,
    document: Option<Bytes>,
    paper_size: Option<String>,
    orientation: Option<String>,
    color_mode: Option<String>,
    resolution: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SubmitForm {
    fn into_submission(self) -> ApiResult<Submission> {
        let submitter = non_empty(self.submitter)
            .ok_or_else(|| ApiError::bad_request("submitterName is required"))?;

        // A browser sends an empty, unnamed part when no file was chosen.
        let named = self.file_name.as_deref().is_some_and(|n| !n.is_empty());
        let document = self
            .document
            .filter(|bytes| named || !bytes.is_empty())
            .ok_or_else(|| ApiError::bad_request("No document uploaded"))?;

        let document_name = non_empty(self.document_name)
            .or_else(|| non_empty(self.file_name))
            .ok_or_else(|| ApiError::bad_request("documentName is required"))?;

        let paper_size = match non_empty(self.paper_size) {
            Some(v) => PaperSize::parse(&v)?,
            None => PaperSize::default(),
        };
        let color_mode = match non_empty(self.color_mode) {
            Some(v) => ColorMode::parse(&v)?,
            None => ColorMode::default(),
        };

        let mut options = PrintOptions::new(paper_size, color_mode);
        if let Some(v) = non_empty(self.orientation) {
            options = options.with_orientation(Orientation::parse(&v)?);
        }
        if let Some(v) = non_empty(self.resolution) {
            options = options.with_resolution(Resolution::parse(&v)?);
        }

        Ok(Submission::new(submitter, document_name, options, document))
    }
}

async fn text(field: Field<'_>) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read form field: {e}")))
}

#[tracing::instrument(skip(desk, multipart))]
pub async fn submit_job(
    State(desk): State<PrintDesk>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<SubmitResponse>)> {
    let mut form = SubmitForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read multipart: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "document" | "file" => {
                form.file_name = field.file_name().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;
                tracing::debug!(bytes = data.len(), "File data received");
                form.document = Some(data);
            }
            "submitterName" | "student_id" => form.submitter = Some(text(field).await?),
            "documentName" => form.document_name = Some(text(field).await?),
            "paperSize" | "paper_size" => form.paper_size = Some(text(field).await?),
            "orientation" => form.orientation = Some(text(field).await?),
            "colorMode" | "color_mode" => form.color_mode = Some(text(field).await?),
            "resolution" => form.resolution = Some(text(field).await?),
            other => tracing::debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    let job = desk.submit(form.into_submission()?).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            ticket_id: job.id,
            document_name: job.document_name,
            status: job.status,
        }),
    ))
}

/// All jobs, newest first.
pub async fn list_jobs(State(desk): State<PrintDesk>) -> ApiResult<Json<Vec<PrintJob>>> {
    Ok(Json(desk.list_all().await?))
}

pub async fn queue_stats(State(desk): State<PrintDesk>) -> ApiResult<Json<QueueStats>> {
    Ok(Json(desk.stats().await?))
}

fn parse_ticket(id: &str) -> ApiResult<TicketId> {
    TicketId::parse(id).map_err(|_| ApiError::bad_request(format!("Invalid ticket ID: {id}")))
}

/// Status lookup for a single ticket.
pub async fn get_job(
    State(desk): State<PrintDesk>,
    Path(id): Path<String>,
) -> ApiResult<Json<PrintJob>> {
    let ticket = parse_ticket(&id)?;
    Ok(Json(desk.get(ticket).await?))
}

#[tracing::instrument(skip(desk))]
pub async fn accept_job(
    State(desk): State<PrintDesk>,
    Path(id): Path<String>,
) -> ApiResult<Json<PrintJob>> {
    let ticket = parse_ticket(&id)?;
    Ok(Json(desk.accept_for_printing(ticket).await?))
}

#[tracing::instrument(skip(desk))]
pub async fn complete_job(
    State(desk): State<PrintDesk>,
    Path(id): Path<String>,
) -> ApiResult<Json<PrintJob>> {
    let ticket = parse_ticket(&id)?;
    Ok(Json(desk.mark_ready(ticket).await?))
}

#[tracing::instrument(skip(desk))]
pub async fn reject_job(
    State(desk): State<PrintDesk>,
    Path(id): Path<String>,
) -> ApiResult<Json<PrintJob>> {
    let ticket = parse_ticket(&id)?;
    Ok(Json(desk.reject(ticket).await?))
}

/// Rename body sent either as JSON or as an urlencoded form.
pub struct RenameBody(pub RenameRequest);

impl<S> FromRequest<S> for RenameBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json"));

        if is_json {
            let Json(body) = Json::<RenameRequest>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            Ok(Self(body))
        } else {
            let axum::Form(body) = axum::Form::<RenameRequest>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            Ok(Self(body))
        }
    }
}

#[tracing::instrument(skip(desk, body))]
pub async fn rename_job(
    State(desk): State<PrintDesk>,
    Path(id): Path<String>,
    RenameBody(body): RenameBody,
) -> ApiResult<Json<PrintJob>> {
    let ticket = parse_ticket(&id)?;
    Ok(Json(desk.rename(ticket, body.new_name).await?))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::disallowed_methods)]

    use super::*;

    fn form(submitter: &str, file_name: &str, body: &'static str) -> SubmitForm {
        SubmitForm {
            submitter: Some(submitter.into()),
            file_name: Some(file_name.into()),
            document: Some(Bytes::from(body)),
            ..SubmitForm::default()
        }
    }

    #[test]
    fn defaults_fill_missing_options() {
        let submission = form("studentA", "notes.docx", "x").into_submission().unwrap();
        assert_eq!(submission.document_name, "notes.docx");
        assert_eq!(submission.options.paper_size, PaperSize::A4);
        assert_eq!(submission.options.color_mode, ColorMode::BlackAndWhite);
        assert_eq!(submission.options.orientation, None);
    }

    #[test]
    fn document_name_field_overrides_file_name() {
        let mut f = form("studentA", "upload.bin", "x");
        f.document_name = Some("lab.pdf".into());
        f.color_mode = Some("Black & White".into());
        f.resolution = Some("600".into());
        let submission = f.into_submission().unwrap();
        assert_eq!(submission.document_name, "lab.pdf");
        assert_eq!(submission.options.resolution, Some(Resolution::High));
    }

    #[test]
    fn missing_pieces_are_bad_requests() {
        let mut no_file = form("studentA", "", "");
        no_file.document = Some(Bytes::new());
        assert_eq!(
            no_file.into_submission().unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );

        let no_submitter = form("  ", "a.pdf", "x");
        assert_eq!(
            no_submitter.into_submission().unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );

        let mut bad_option = form("studentA", "a.pdf", "x");
        bad_option.paper_size = Some("B5".into());
        assert_eq!(
            bad_option.into_submission().unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
