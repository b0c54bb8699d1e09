//! Stored document downloads.

use actors::PrintDesk;
use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use printflow_core::naming::extension;

use crate::error::ApiResult;

fn content_type_for(name: &str) -> &'static str {
    match extension(name).to_ascii_lowercase().as_str() {
        ".pdf" => "application/pdf",
        ".doc" => "application/msword",
        ".docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".ppt" => "application/vnd.ms-powerpoint",
        ".pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        ".txt" => "text/plain; charset=utf-8",
        ".png" => "image/png",
        ".jpg" | ".jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Serve the bytes of a stored document, `404` when the file is gone.
#[tracing::instrument(skip(desk))]
pub async fn fetch_document(
    State(desk): State<PrintDesk>,
    Path(name): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let bytes = desk.fetch_document(&name).await?;
    let disposition = format!("inline; filename=\"{}\"", name.replace('"', ""));

    Ok((
        [
            (CONTENT_TYPE, content_type_for(&name).to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for("essay.PDF"), "application/pdf");
        assert_eq!(content_type_for("README"), "application/octet-stream");
        assert_eq!(content_type_for(".bashrc"), "application/octet-stream");
    }
}
