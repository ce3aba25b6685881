// binaa/src/flow/mod.rs

//! A small step-flow engine: named steps run in order, each with optional
//! `before`/`on`/`after` async handlers over shared page data.
//!
//! Page operations that touch several collaborators (session, cart slot, API,
//! hand-off slot) are written as flows so every stage is named in the logs and
//! can halt the remaining stages.

pub mod context;
pub mod control;
pub mod definition;
pub mod execution;
pub mod step;

pub use context::PageData;
pub use control::{FlowControl, FlowOutcome};
pub use definition::{Flow, Handler};
pub use step::{SkipCondition, StepDef};
