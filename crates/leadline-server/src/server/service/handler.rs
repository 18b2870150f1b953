//! The lead form handler.
//!
//! Every outcome is answered with `200 OK` and an HTML page: the redirect page
//! for an accepted lead, or the error page with a fixed message otherwise.
//! Internal failures are logged here and never shown to the visitor.

use crate::server::{
    service::AppState,
    telemetry::{
        increment_leads_accepted, increment_submission_failures, increment_submissions,
        increment_submissions_rejected, record_submit_duration,
    },
};
use axum::{
    extract::{Form, State, rejection::FormRejection},
    response::Html,
};
use leadline::{LeadForm, Notice};
use std::{sync::Arc, time::Instant};

/// Runs the submission on the blocking pool and renders the outcome.
///
/// A body that cannot be read as a form is handled like an empty form.
#[tracing::instrument(level = "debug", skip_all)]
pub async fn submit_lead(
    State(state): State<AppState>,
    form: Result<Form<LeadForm>, FormRejection>,
) -> Html<String> {
    increment_submissions();

    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!(%rejection, "unreadable lead form");
            LeadForm::default()
        }
    };

    let started = Instant::now();
    let intake = Arc::clone(state.intake());
    let outcome = tokio::task::spawn_blocking(move || intake.submit(&form)).await;
    record_submit_duration(started.elapsed().as_secs_f64() * 1000.0);

    let page = match outcome {
        Ok(Ok(receipt)) => {
            increment_leads_accepted();
            tracing::info!(lead_id = %receipt.lead_id(), "lead accepted");
            state.responses().success(receipt.lead_id())
        }
        Ok(Err(err)) if err.is_validation() => {
            increment_submissions_rejected();
            tracing::info!(error = %err, "lead rejected");
            state.responses().failure(err.notice())
        }
        Ok(Err(err)) => {
            increment_submission_failures();
            tracing::error!(error = ?err, "lead submission failed");
            state.responses().failure(err.notice())
        }
        Err(join_err) => {
            increment_submission_failures();
            tracing::error!(error = %join_err, "lead submission task did not complete");
            state.responses().failure(Notice::TryAgain)
        }
    };

    Html(page)
}
