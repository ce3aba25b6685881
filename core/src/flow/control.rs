// binaa/src/flow/control.rs

/// Signal returned by a step handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
  Continue,
  /// Stop here. Remaining handlers of this step and all later steps are skipped.
  Halt,
}

/// How a flow run ended when no handler failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
  Completed,
  Halted,
}
