//! Domain Services
//!
//! Stateful domain logic shared across requests.

mod knowledge;

pub use knowledge::*;
