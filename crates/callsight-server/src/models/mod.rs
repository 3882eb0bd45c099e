//! Callsight HTTP Models
//!
//! - Transcription: aggregate pipeline result
//! - Call: stored call records and statistics
//! - Domain: known domain/category pairs

mod call;
mod domain;
mod transcription;

pub use call::*;
pub use domain::*;
pub use transcription::*;
