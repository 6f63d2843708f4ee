//! Runtime support for generated bindings
//!
//! Generated per-version structs hold an [`AuthenticatedClient`] and build a
//! [`Request`] per call. Named arguments arrive as [`Args`]; the required
//! guard lives in [`Args::required`] so a missing argument is reported when
//! the generated method is invoked, not when it is compiled.

pub mod args;
pub mod client;
pub mod error;
pub mod request;

pub use args::Args;
pub use client::{AuthConfig, AuthenticatedClient, ExpiryCallback, Identity};
pub use error::{ClientError, Result};
pub use request::{Payload, Request, group, interpolate};

/// Re-exported so generated code does not need its own `serde_json` dependency
pub use serde_json;
