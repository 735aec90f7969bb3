//! Column enrichment.
//!
//! Builds a context document from the selected rows and columns, asks a
//! ranked list of LLM providers for a JSON array of values (one per row, in
//! row order), validates the shape, and maps the values back onto the
//! originating rows by id. Providers are interchangeable behind the
//! [`provider::Provider`] trait; a failed or invalid response falls through
//! to the next provider in the ranking.

pub mod apply;
pub mod client;
pub mod context;
pub mod extract;
pub mod provider;

pub use apply::apply_enrichment;
pub use client::{EnrichClient, EnrichError, EnrichRequest};
pub use context::enrichable_rows;
pub use provider::{AnthropicProvider, OpenAiProvider, Provider, ProviderError};
