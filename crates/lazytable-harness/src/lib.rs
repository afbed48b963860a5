#![forbid(unsafe_code)]

//! Test harness for lazytable: scripted collaborators and fixtures.
//!
//! Everything the integration suites need to drive the pagination pipeline
//! without a real UI or a real backend:
//!
//! - [`MockViewport`]: a hand-cranked [`VirtualViewport`] that records
//!   every `set_rendered_range` command it receives.
//! - [`ScriptedFetcher`]: an in-memory page source with immediate or
//!   deferred completion, scripted per-page failures, and a call log.
//! - [`fixtures`]: deterministic row generators.
//!
//! [`VirtualViewport`]: lazytable::VirtualViewport

pub mod fetcher;
pub mod fixtures;
pub mod viewport;

pub use fetcher::ScriptedFetcher;
pub use viewport::MockViewport;
