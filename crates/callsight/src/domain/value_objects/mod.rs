//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod audio;
mod prompt_source;
mod token_usage;

pub use audio::*;
pub use prompt_source::*;
pub use token_usage::*;
