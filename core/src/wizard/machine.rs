// binaa/src/wizard/machine.rs
use super::customer::CustomerInfo;
use super::step::WizardStep;
use super::step::WizardStep::{CustomerInfo as Info, Products, ShippingMethod as Shipping, Totals};
use std::fmt;
use tracing::{debug, instrument};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardEvent {
  Next,
  Back,
  /// A click on the step indicator.
  Jump(WizardStep),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
  Next,
  Back,
  Jump,
}

impl WizardEvent {
  pub fn kind(self) -> EventKind {
    match self {
      WizardEvent::Next => EventKind::Next,
      WizardEvent::Back => EventKind::Back,
      WizardEvent::Jump(_) => EventKind::Jump,
    }
  }
}

/// What guards may look at when an event fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct WizardContext<'a> {
  pub cart_is_empty: bool,
  pub customer_info: Option<&'a CustomerInfo>,
}

/// Inputs of one guard evaluation.
#[derive(Debug, Clone, Copy)]
pub struct GuardInput<'a> {
  pub from: WizardStep,
  pub to: WizardStep,
  pub ctx: &'a WizardContext<'a>,
}

#[derive(Clone, Copy)]
pub struct Guard {
  pub name: &'static str,
  pub check: fn(&GuardInput<'_>) -> bool,
}

impl fmt::Debug for Guard {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name)
  }
}

pub const CART_NOT_EMPTY: Guard = Guard {
  name: "cart_not_empty",
  check: |input| !input.ctx.cart_is_empty,
};

pub const CUSTOMER_INFO_VALID: Guard = Guard {
  name: "customer_info_valid",
  check: |input| input.ctx.customer_info.is_some_and(|info| info.validate().is_ok()),
};

pub const JUMP_NOT_AHEAD: Guard = Guard {
  name: "jump_not_ahead",
  check: |input| input.to <= input.from,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
  Step(WizardStep),
  /// The step carried by the event.
  Requested,
}

#[derive(Debug, Clone, Copy)]
pub struct Transition {
  /// `None` matches every state.
  pub from: Option<WizardStep>,
  pub event: EventKind,
  pub to: Target,
  pub guards: &'static [Guard],
}

pub const TRANSITIONS: &[Transition] = &[
  Transition { from: Some(Products), event: EventKind::Next, to: Target::Step(Info), guards: &[CART_NOT_EMPTY] },
  Transition { from: Some(Info), event: EventKind::Next, to: Target::Step(Shipping), guards: &[CUSTOMER_INFO_VALID] },
  Transition { from: Some(Shipping), event: EventKind::Next, to: Target::Step(Totals), guards: &[] },
  Transition { from: Some(Info), event: EventKind::Back, to: Target::Step(Products), guards: &[] },
  Transition { from: Some(Shipping), event: EventKind::Back, to: Target::Step(Info), guards: &[] },
  Transition { from: Some(Totals), event: EventKind::Back, to: Target::Step(Shipping), guards: &[] },
  Transition { from: None, event: EventKind::Jump, to: Target::Requested, guards: &[JUMP_NOT_AHEAD] },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
  /// No row of the table matches the state and event.
  NoTransition { from: WizardStep, event: WizardEvent },
  GuardFailed { from: WizardStep, to: WizardStep, guard: &'static str },
}

impl fmt::Display for Rejection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Rejection::NoTransition { from, event } => write!(f, "no transition from step {from} on {event:?}"),
      Rejection::GuardFailed { from, to, guard } => {
        write!(f, "guard '{guard}' blocked step {from} -> {to}")
      }
    }
  }
}

impl std::error::Error for Rejection {}

/// Indicator shown above the wizard for each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
  Active,
  Completed,
  /// Ahead of the current step, not clickable.
  Locked,
}

/// The checkout wizard. Lives only as long as the shipping page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Wizard {
  current: WizardStep,
}

impl Wizard {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn current(&self) -> WizardStep {
    self.current
  }

  /// Where `event` would lead, without moving.
  pub fn evaluate(&self, event: WizardEvent, ctx: &WizardContext<'_>) -> Result<WizardStep, Rejection> {
    let from = self.current;
    let transition = TRANSITIONS
      .iter()
      .find(|t| t.event == event.kind() && t.from.map_or(true, |s| s == from))
      .ok_or(Rejection::NoTransition { from, event })?;
    let to = match (transition.to, event) {
      (Target::Step(step), _) => step,
      (Target::Requested, WizardEvent::Jump(step)) => step,
      (Target::Requested, _) => return Err(Rejection::NoTransition { from, event }),
    };
    let input = GuardInput { from, to, ctx };
    if let Some(failed) = transition.guards.iter().find(|g| !(g.check)(&input)) {
      return Err(Rejection::GuardFailed {
        from,
        to,
        guard: failed.name,
      });
    }
    Ok(to)
  }

  #[instrument(level = "debug", skip(self, ctx), fields(from = self.current.number()))]
  pub fn fire(&mut self, event: WizardEvent, ctx: &WizardContext<'_>) -> Result<WizardStep, Rejection> {
    let to = self.evaluate(event, ctx).map_err(|rejection| {
      debug!(%rejection, "Wizard event rejected.");
      rejection
    })?;
    self.current = to;
    Ok(to)
  }

  pub fn next(&mut self, ctx: &WizardContext<'_>) -> Result<WizardStep, Rejection> {
    self.fire(WizardEvent::Next, ctx)
  }

  pub fn back(&mut self) -> Result<WizardStep, Rejection> {
    self.fire(WizardEvent::Back, &WizardContext::default())
  }

  pub fn jump_to(&mut self, step: WizardStep) -> Result<WizardStep, Rejection> {
    self.fire(WizardEvent::Jump(step), &WizardContext::default())
  }

  /// Whether the "next" control is enabled.
  pub fn can_advance(&self, ctx: &WizardContext<'_>) -> bool {
    self.evaluate(WizardEvent::Next, ctx).is_ok()
  }

  pub fn can_go_back(&self) -> bool {
    self.evaluate(WizardEvent::Back, &WizardContext::default()).is_ok()
  }

  pub fn indicator_states(&self) -> [(WizardStep, IndicatorState); 4] {
    WizardStep::ALL.map(|step| {
      let state = match step.cmp(&self.current) {
        std::cmp::Ordering::Less => IndicatorState::Completed,
        std::cmp::Ordering::Equal => IndicatorState::Active,
        std::cmp::Ordering::Greater => IndicatorState::Locked,
      };
      (step, state)
    })
  }
}
