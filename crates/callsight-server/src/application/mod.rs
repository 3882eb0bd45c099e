//! Application Layer (Use Cases)
//!
//! The transcription pipeline and the components it coordinates. Every
//! component is generic over the domain ports; `main` wires in the
//! concrete adapters.

mod bootstrap;
mod error;
mod gateway;
mod instructions;
mod persistence;
mod pipeline;
mod prompt_resolver;
mod prompt_writer;
mod stage_runner;

#[cfg(test)]
pub(crate) mod testing;

pub use bootstrap::seed_knowledge;
pub use gateway::{Gateway, GatewayConfig};
pub use pipeline::{PersistenceStatus, TokenReport, TranscriptionPipeline, TranscriptionResult};
pub use prompt_writer::{PromptWriter, DEFAULT_QUEUE_CAPACITY};
