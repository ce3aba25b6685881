// binaa/src/wizard/mod.rs

//! The four-step checkout wizard as an explicit state machine.
//!
//! Forward moves only happen through `Next`, and each forward row in
//! [`TRANSITIONS`] carries the guard that must hold. Indicator clicks may
//! only go back to a step already reached.

pub mod customer;
pub mod machine;
pub mod step;

pub use customer::CustomerInfo;
pub use machine::{
  EventKind, Guard, IndicatorState, Rejection, Transition, Wizard, WizardContext, WizardEvent, TRANSITIONS,
};
pub use step::WizardStep;
