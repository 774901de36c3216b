//! Connection-state reconciliation core.
//!
//! - `source`: collaborator traits (`ConnectionSource`, `RenderSink`) and events
//! - `registry`: one toggle record per tracked profile
//! - `animator`: the status icon sweep
//! - `timer`: deadline queue driving the sweep
//! - `engine`: event dispatch tying the above together

pub mod animator;
pub mod engine;
pub mod registry;
pub mod source;
pub mod timer;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{EngineOptions, ReconciliationEngine};
pub use source::{ConnectionSource, RenderSink, SourceEvent, Subscription};
