#![allow(dead_code)]

use std::sync::Arc;

use actors::{LifecycleConfig, LifecycleError, NoopNotifier, PrintDesk, StatusNotifier, Submission};
use printflow_core::{ColorMode, Orientation, PaperSize, PrintOptions, Resolution};
use storage::DocumentStore;

pub async fn start_desk(config: LifecycleConfig) -> Result<PrintDesk, LifecycleError> {
    start_desk_with(config, DocumentStore::memory(), Arc::new(NoopNotifier)).await
}

pub async fn start_desk_with(
    config: LifecycleConfig,
    store: DocumentStore,
    notifier: Arc<dyn StatusNotifier>,
) -> Result<PrintDesk, LifecycleError> {
    let (desk, _handle) = PrintDesk::start(config, store, notifier).await?;
    Ok(desk)
}

pub fn a4_color() -> PrintOptions {
    PrintOptions::new(PaperSize::A4, ColorMode::Color)
}

pub fn full_options() -> PrintOptions {
    PrintOptions::new(PaperSize::A3, ColorMode::BlackAndWhite)
        .with_orientation(Orientation::Landscape)
        .with_resolution(Resolution::High)
}

pub fn submission(submitter: &str, name: &str, body: &'static str) -> Submission {
    Submission::new(submitter, name, a4_color(), body.as_bytes())
}
