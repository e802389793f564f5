//! Documentation page endpoint.

use axum::{
    extract::{RawQuery, State},
    http::Uri,
    response::Html,
};

use specdocs_spec::{SpecType, UnknownSpecType};
use specdocs_telemetry::log_pipeline_failed;

use super::router::AppState;
use crate::error::DocsError;
use crate::location::{split_docs_path, SpecLocation};
use crate::pipeline::PipelineError;

/// GET /docs/{spec_type}/{*spec_url}
///
/// The spec URL is taken from the raw request path rather than the decoded
/// route capture, and the inbound query string is forwarded to the spec host.
pub async fn render_docs(
    State(state): State<AppState>,
    uri: Uri,
    RawQuery(query): RawQuery,
) -> Result<Html<String>, DocsError> {
    let (spec_type, spec_url) =
        split_docs_path(uri.path()).ok_or_else(|| UnknownSpecType(uri.path().to_string()))?;
    let spec_type: SpecType = spec_type.parse()?;
    let location = SpecLocation::new(spec_url, query);

    match render_page(&state, spec_type, &location).await {
        Ok((page, outcome)) => {
            state.metrics.record_outcome(spec_type.as_str(), outcome);
            Ok(Html(page))
        }
        Err(err) => {
            log_pipeline_failed!(
                spec_type = %spec_type,
                url = location.url(),
                stage = err.stage(),
                error = %err,
                "documentation request failed"
            );
            state.metrics.record_outcome(spec_type.as_str(), err.outcome());
            Err(err.into())
        }
    }
}

async fn render_page(
    state: &AppState,
    spec_type: SpecType,
    location: &SpecLocation,
) -> Result<(String, &'static str), PipelineError> {
    let plan = state.pipeline.run(spec_type, location).await?;
    let page = state.templates.render(plan.template, &plan.context)?;
    Ok((page, plan.outcome()))
}
