//! Template context carrying the encoded document.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;

/// Name of the context field holding the base64-encoded document.
pub const ENCODED_SPEC_CONTENT: &str = "EncodedSpecContent";

/// The data handed to a documentation template.
///
/// Holds either the encoded document or nothing at all (rejection pages).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderContext {
    #[serde(rename = "EncodedSpecContent", skip_serializing_if = "Option::is_none")]
    encoded_spec_content: Option<String>,
}

impl RenderContext {
    /// Encode normalized JSON with standard, padded base64.
    pub fn build(json: &[u8]) -> Self {
        Self {
            encoded_spec_content: Some(STANDARD.encode(json)),
        }
    }

    /// The context used for rejection templates.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn encoded_spec_content(&self) -> Option<&str> {
        self.encoded_spec_content.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.encoded_spec_content.is_none()
    }
}
