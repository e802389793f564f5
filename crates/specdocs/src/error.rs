//! Plain-text error responses for documentation requests.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use specdocs_spec::{PolicyError, UnknownSpecType};

use crate::fetch::FetchError;
use crate::pipeline::PipelineError;

/// Body of the 400 response for an unknown `{type}` segment.
pub const UNSUPPORTED_TYPE_MESSAGE: &str = "Unsupported specification type";

/// Why a documentation request produced no page.
#[derive(Debug, Error)]
pub enum DocsError {
    /// The path names a specification type we do not render.
    #[error(transparent)]
    UnsupportedType(#[from] UnknownSpecType),

    /// A pipeline stage failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl DocsError {
    pub fn status(&self) -> StatusCode {
        match self {
            DocsError::UnsupportedType(_) => StatusCode::BAD_REQUEST,
            DocsError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The text sent to the client.
    pub fn message(&self) -> String {
        match self {
            DocsError::UnsupportedType(_) => UNSUPPORTED_TYPE_MESSAGE.to_string(),
            DocsError::Pipeline(err) => match err {
                PipelineError::Fetch(FetchError::Request(_)) => {
                    "Failed to retrieve the specification".to_string()
                }
                PipelineError::Fetch(FetchError::Read(_)) => {
                    "Failed to read the specification".to_string()
                }
                PipelineError::Normalize(e) => format!("Failed to convert YAML to JSON: {}", e),
                PipelineError::Policy(PolicyError::Parse(e)) => {
                    format!("Failed to parse JSON: {}", e)
                }
                PipelineError::Policy(PolicyError::Load(detail)) => {
                    format!("Failed to load OpenAPI document: {}", detail)
                }
                PipelineError::Render(_) => "Failed to render documentation page".to_string(),
            },
        }
    }
}

impl IntoResponse for DocsError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.message(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specdocs_spec::NormalizeError;

    #[test]
    fn unsupported_type_is_bad_request() {
        let err = DocsError::from(UnknownSpecType("swagger".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Unsupported specification type");
    }

    #[test]
    fn pipeline_failures_are_server_errors_with_stage_messages() {
        let err = DocsError::from(PipelineError::Normalize(NormalizeError::NonStringKey(
            "200".into(),
        )));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.message(),
            "Failed to convert YAML to JSON: mapping key is not a string: 200"
        );

        let err = DocsError::from(PipelineError::Policy(PolicyError::Load(
            "invalid type: string \"none\", expected a map".into(),
        )));
        assert!(err
            .message()
            .starts_with("Failed to load OpenAPI document: invalid type"));
    }

    #[test]
    fn parse_failure_message_carries_parser_detail() {
        let parse_err = serde_json::from_slice::<serde_json::Value>(b"{").unwrap_err();
        let detail = parse_err.to_string();
        let err = DocsError::from(PipelineError::Policy(PolicyError::Parse(parse_err)));
        assert_eq!(err.message(), format!("Failed to parse JSON: {}", detail));
    }
}
