//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - DomainCategoryPair: classification tuple
//! - PromptRecord: stored extraction prompt
//! - CallRecord / DomainSpecificRecord: persisted results of one upload
//! - GeneralMetrics: six-section call analysis
//! - TonalAnalysis: tone and sentiment read from the audio

mod analysis;
mod call;
mod pair;
mod prompt;
mod tonal;

pub use analysis::*;
pub use call::*;
pub use pair::*;
pub use prompt::*;
pub use tonal::*;
