//! Shared utilities for extract-smoke integration tests.
//!
//! This module provides:
//! - `StubBackend`, an in-process HTTP server standing in for the extraction backend
//! - `StalledBackend`, a listener that accepts connections and never replies
//! - Canned response bodies for the happy path

#![allow(dead_code)]

pub mod stalled_backend;
pub mod stub_backend;

pub use stalled_backend::StalledBackend;
pub use stub_backend::{example_fields, RecordedRequest, StubBackend, StubConfig, StubResponse};
