//! specdocs documentation service library.
//!
//! Renders documentation pages for remote OpenAPI and AsyncAPI documents.
//! The main entry point is the `specdocs` binary; the modules are exposed for
//! embedding and testing.

pub mod api;
pub mod error;
pub mod fetch;
pub mod location;
pub mod pipeline;
pub mod server;
pub mod templates;

#[cfg(test)]
mod test_support;

pub use error::DocsError;
pub use fetch::{FetchError, SpecFetcher};
pub use location::SpecLocation;
pub use pipeline::{process, DocsPipeline, PipelineError, RenderPlan};
pub use templates::{TemplateError, Templates};
