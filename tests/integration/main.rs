//! Integration tests for Sitelint
//!
//! These tests use wiremock to stand in for target pages and the
//! LanguageTool server, and drive the full submit, poll and aggregate cycle.

mod common;
mod flow_tests;
mod server_tests;
