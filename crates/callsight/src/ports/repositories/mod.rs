//! Repository Ports
//!
//! Abstract interfaces for data persistence operations.

mod call_repository;
mod prompt_repository;

pub use call_repository::*;
pub use prompt_repository::*;
