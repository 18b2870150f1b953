//! HTTP surface: shared state, the router, and the form handler.
//!
//! ## Structure
//!
//! - [`handler`] - `POST /` form handler.

pub mod handler;

use crate::server::config::ServerConfig;
use axum::{Router, routing::post};
use leadline::{
    FileCounterStore, FileSheetStore, Intake, LeadPipeline, RecordAppender, ResponseBuilder,
    SequenceAllocator, SystemClock,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// State shared by every request.
#[derive(Clone)]
pub struct AppState {
    intake: Arc<dyn Intake>,
    responses: Arc<ResponseBuilder>,
}

impl AppState {
    pub fn new(intake: Arc<dyn Intake>, responses: ResponseBuilder) -> Self {
        Self {
            intake,
            responses: Arc::new(responses),
        }
    }

    /// Opens the file-backed counter and sheet stores under
    /// `config.data_dir` and builds a pipeline on the system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if either store cannot be opened.
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let counter = FileCounterStore::open(config.counter_path())?;
        let sheets = FileSheetStore::open(&config.data_dir, &config.spreadsheet_id)?;

        let pipeline = LeadPipeline::new(
            SequenceAllocator::new(counter).with_lock_timeout(config.lock_timeout),
            RecordAppender::new(sheets, config.sheet_name.clone()),
            SystemClock,
            config.zone,
        );
        let responses = ResponseBuilder::new(config.agent_digits.clone())
            .with_prompt(config.message_prompt.clone());

        Ok(Self::new(Arc::new(pipeline), responses))
    }

    pub fn intake(&self) -> &Arc<dyn Intake> {
        &self.intake
    }

    pub fn responses(&self) -> &ResponseBuilder {
        &self.responses
    }
}

/// `POST /` accepts the lead form; every other route falls through to axum's
/// defaults.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(handler::submit_lead))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
