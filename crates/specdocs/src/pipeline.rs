//! The documentation pipeline: fetch, normalize, apply the type policy, encode.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use thiserror::Error;

use specdocs_spec::{
    apply_policy, normalize, Decision, NormalizeError, PolicyError, Rejection, RenderContext,
    SpecType,
};
use specdocs_telemetry::{log_spec_fetched, log_spec_rejected, MetricsRegistry};

use crate::fetch::{FetchError, SpecFetcher};
use crate::location::SpecLocation;
use crate::templates::TemplateError;

/// A failure in one of the pipeline stages.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Render(#[from] TemplateError),
}

impl PipelineError {
    /// The stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Fetch(_) => "fetch",
            PipelineError::Normalize(_) => "normalize",
            PipelineError::Policy(_) => "policy",
            PipelineError::Render(_) => "render",
        }
    }

    /// Metrics outcome label for this failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            PipelineError::Fetch(_) => "fetch_failed",
            PipelineError::Normalize(_) => "normalize_failed",
            PipelineError::Policy(_) => "policy_failed",
            PipelineError::Render(_) => "render_failed",
        }
    }
}

/// What to render for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPlan {
    pub template: &'static str,
    pub context: RenderContext,
    /// Set when the document was routed to a rejection page.
    pub rejection: Option<Rejection>,
}

impl RenderPlan {
    pub fn is_rejection(&self) -> bool {
        self.rejection.is_some()
    }

    /// Metrics outcome label for this plan.
    pub fn outcome(&self) -> &'static str {
        if self.is_rejection() {
            "rejected"
        } else {
            "rendered"
        }
    }
}

/// Runs the full pipeline for a remote document.
#[derive(Clone)]
pub struct DocsPipeline {
    fetcher: SpecFetcher,
    metrics: Arc<MetricsRegistry>,
}

impl DocsPipeline {
    pub fn new(fetcher: SpecFetcher, metrics: Arc<MetricsRegistry>) -> Self {
        Self { fetcher, metrics }
    }

    /// Fetch the document at `location` and decide how it renders.
    pub async fn run(
        &self,
        spec_type: SpecType,
        location: &SpecLocation,
    ) -> Result<RenderPlan, PipelineError> {
        let started = Instant::now();
        let raw = self.fetcher.fetch(&location.fetch_url()).await?;
        let elapsed = started.elapsed();

        self.metrics
            .record_fetch(spec_type.as_str(), elapsed.as_secs_f64(), raw.len() as u64);
        log_spec_fetched!(
            spec_type = %spec_type,
            url = location.url(),
            bytes = raw.len(),
            duration_ms = elapsed.as_millis() as u64,
            "specification fetched"
        );

        process(spec_type, location, raw)
    }
}

/// The synchronous tail of the pipeline, over bytes already in hand.
pub fn process(
    spec_type: SpecType,
    location: &SpecLocation,
    raw: Bytes,
) -> Result<RenderPlan, PipelineError> {
    let json = normalize(location.url(), raw)?;

    let plan = match apply_policy(spec_type, &json)? {
        Decision::RenderNormal(template) => RenderPlan {
            template,
            context: RenderContext::build(&json),
            rejection: None,
        },
        Decision::RenderRejection(template, rejection) => {
            log_spec_rejected!(
                spec_type = %spec_type,
                url = location.url(),
                template,
                reason = %rejection,
                "specification routed to rejection page"
            );
            RenderPlan {
                template,
                context: RenderContext::empty(),
                rejection: Some(rejection),
            }
        }
    };

    Ok(plan)
}
