//! Infrastructure layer - network, rendering and filesystem adapters

pub mod generation;
pub mod http;
pub mod openapi;
pub mod output;
