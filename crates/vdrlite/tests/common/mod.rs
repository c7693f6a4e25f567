//! Shared test utilities for vdrlite integration tests.
//!
//! This module provides:
//! - In-memory fixture builders for ZIP archives and office/PDF documents
//! - `TestHarness` running the full pipeline against a scripted provider

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{echo_provider, scripted_provider, TestHarness, SUMMARY_TEXT};
