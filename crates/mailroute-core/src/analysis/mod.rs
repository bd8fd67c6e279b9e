//! Email analysis via an external language-model provider.
//!
//! This module provides:
//! - **Prompt building**: a deterministic rendering of subject, body and
//!   attachments
//! - **Provider seam**: [`AnalysisProvider`], with an OpenAI-compatible
//!   HTTP implementation
//! - **Response parsing**: a strict grammar for "JSON in a fenced block or
//!   a bare object", with typed failures
//!
//! # Example
//!
//! ```ignore
//! use mailroute_core::analysis::{AnalysisClient, AnalysisResponse};
//!
//! let client = AnalysisClient::new(provider);
//! match client.analyze(&email).await {
//!     Ok(AnalysisResponse::Findings(analysis)) => { /* validate, classify */ }
//!     Ok(AnalysisResponse::Empty) | Err(_) => { /* human review */ }
//! }
//! ```

mod client;
mod http;
mod model;
mod prompt;
mod response;

pub use client::{AnalysisClient, AnalysisProvider};
pub use http::HttpAnalysisProvider;
pub use model::{EmailAnalysis, Priority};
pub(crate) use model::non_blank;
pub use prompt::build_prompt;
pub use response::{AnalysisError, AnalysisResponse, extract_json, parse_response};
