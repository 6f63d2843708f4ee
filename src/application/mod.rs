//! Application layer - orchestrates the generation run

pub mod dto;
pub mod errors;
pub mod generate_bindings;
pub mod traits;

pub use dto::*;
pub use errors::*;
pub use generate_bindings::GenerateBindingsUseCase;
pub use traits::*;
