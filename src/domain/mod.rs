//! Domain layer - Pure acquisition abstractions
//!
//! This layer contains NO network or filesystem code.
//! Only record types, run state and the error enum.

pub mod errors;
pub mod models;

pub use errors::AcquisitionError;
pub use models::*;
