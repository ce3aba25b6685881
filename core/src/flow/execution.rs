// binaa/src/flow/execution.rs

//! `Flow::run`: executes the declared steps against shared page data.

use crate::error::CheckoutError;
use crate::flow::context::PageData;
use crate::flow::control::{FlowControl, FlowOutcome};
use crate::flow::definition::{Flow, Phase};
use crate::scope::PageScope;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, Err> Flow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<CheckoutError> + Send + Sync + 'static,
{
  /// Runs every step in declaration order.
  ///
  /// Stops at the first handler returning [`FlowControl::Halt`] or an error.
  /// The page scope is checked before each handler: once it is closed the run
  /// aborts with [`CheckoutError::Cancelled`] and no further handler touches
  /// the page data.
  #[instrument(
    name = "Flow::run",
    skip_all,
    fields(flow = %self.name, page = scope.page(), num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, page: PageData<TData>, scope: &PageScope) -> Result<FlowOutcome, Err> {
    event!(Level::DEBUG, "Flow starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = span!(Level::DEBUG, "flow_step", step = step_name, step_index = step_idx);

      let skip = match &step_def.skip_if {
        Some(cond) => cond(&*page.read()),
        None => false,
      };
      if skip {
        event!(parent: &step_span, Level::DEBUG, "Step skipped by condition.");
        continue;
      }

      let has_handlers = Phase::ORDER
        .iter()
        .any(|phase| !self.handlers_for(step_name, *phase).is_empty());
      if !has_handlers {
        if step_def.optional {
          event!(parent: &step_span, Level::DEBUG, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(parent: &step_span, Level::ERROR, "Non-optional step has no handlers.");
        return Err(Err::from(CheckoutError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      for phase in Phase::ORDER {
        for handler in self.handlers_for(step_name, phase) {
          if scope.is_closed() {
            event!(parent: &step_span, Level::INFO, "Page scope closed, abandoning flow.");
            return Err(Err::from(CheckoutError::Cancelled {
              operation: format!("{}::{}", self.name, step_name),
            }));
          }

          let control = handler(page.clone())
            .instrument(span!(parent: &step_span, Level::TRACE, "handler", phase = phase.as_str()))
            .await;
          match control {
            Ok(FlowControl::Continue) => {}
            Ok(FlowControl::Halt) => {
              event!(parent: &step_span, Level::INFO, phase = phase.as_str(), "Flow halted by handler.");
              return Ok(FlowOutcome::Halted);
            }
            Err(e) => {
              event!(parent: &step_span, Level::WARN, phase = phase.as_str(), error = %e, "Handler failed.");
              return Err(e);
            }
          }
        }
      }
    }

    event!(Level::DEBUG, "Flow completed.");
    Ok(FlowOutcome::Completed)
  }
}
