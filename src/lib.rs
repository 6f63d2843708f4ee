//! apiweave: generate typed Rust bindings for Swagger-documented web services.
//!
//! The generator discovers API base URLs, fetches each API's metadata and
//! per-version documents, compiles every documented operation into a wrapper
//! method and emits one source file per API version plus a root module.
//! Generated code calls into [`runtime`], which carries the session cookie
//! and keeps the CSRF token fresh.
#![deny(unsafe_code)]

pub mod application;
pub mod config;
pub mod generation;
pub mod infrastructure;
pub mod runtime;
