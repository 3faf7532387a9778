//! HTTP clients for the three downstream services: knowledge-base question
//! answering, intent classification, and appointment scheduling.
//!
//! Each client gets its settings injected at construction and exposes a
//! backend trait so the dispatcher can be exercised with fakes.

mod intent;
mod knowledge;
mod scheduler;

pub use intent::{EntitySpan, IntentBackend, IntentClient, IntentError, IntentResult};
pub use knowledge::{
    KnowledgeAnswer, KnowledgeBackend, KnowledgeClient, KnowledgeError, KnowledgeResult,
};
pub use scheduler::{SchedulerBackend, SchedulerClient, SchedulerError};
