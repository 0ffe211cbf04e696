//! Fetch, transform, and load for single bookmark URLs.
//!
//! This crate provides:
//! - [`fetch`] — bounded-timeout page fetcher with a configurable user-agent
//! - [`extract`] — lossy plain-text extraction and normalization
//! - [`sink`] — HTTP client for the search index sink
//! - [`worker`] — the "process one URL" operation with its typed [`Outcome`]
//!
//! [`Outcome`]: linkdex_shared::Outcome

pub mod extract;
pub mod fetch;
pub mod sink;
pub mod worker;

pub use extract::{extract_text, normalize};
pub use fetch::{FetchResponse, Fetcher};
pub use sink::IndexClient;
pub use worker::{WorkerContext, process_url};
