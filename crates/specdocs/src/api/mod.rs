//! HTTP surface of the documentation service.

mod docs;
mod health;
mod metrics;
mod router;

#[cfg(test)]
mod tests;

pub use router::{create_router, AppState};
