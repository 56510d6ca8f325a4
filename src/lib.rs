#![deny(missing_docs)]

//! Core library for the Lexiscan contract analysis server.

/// HTTP routing and REST handlers.
pub mod api;
/// Bounded result caching for remote calls.
pub mod cache;
/// Conversational completion client for follow-up questions.
pub mod chat;
/// Environment-driven configuration management.
pub mod config;
/// Remote text-generation inference client.
pub mod inference;
/// Structured logging and tracing setup.
pub mod logging;
/// Analysis metrics helpers.
pub mod metrics;
/// Document analysis pipeline utilities.
pub mod processing;
/// Machine translation integration.
pub mod translation;
