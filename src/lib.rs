//! Safiertech quote intake library
//!
//! Validates the "free solar quotation" form and forwards accepted leads to
//! the external quote API.
//!
//! # Modules
//!
//! - `api`: HTTP-facing components.
//! - `core`: Validation, models and error types.
//! - `integrations`: External quote API client.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and router.
//! - `models`: Form input, normalized lead and wire types.
//! - `quote_client`: Transport trait and reqwest-based quote API client.
//! - `submitter`: Single-attempt submission state machine.
//! - `validation`: Field checks, phone normalization and error collection.

pub mod api;
pub mod core;
pub mod integrations;

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod quote_client;
pub mod submitter;
pub mod validation;
