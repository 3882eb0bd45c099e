//! Ports (Interfaces)
//!
//! How the pipeline reaches the outside world: the inference backend
//! (`services/`) and structured storage (`repositories/`).
//!
//! Implementations live in the server crate's adapters.

pub mod repositories;
pub mod services;

pub use repositories::*;
pub use services::*;
