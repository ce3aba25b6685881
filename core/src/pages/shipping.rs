// binaa/src/pages/shipping.rs

//! The shipping page: cart review, delivery details, per-seller shipping and
//! totals, driven by the checkout [`Wizard`].

use super::{PageServices, Route};
use crate::api::{Order, ORDERS_FETCH_ERROR};
use crate::cart::{Cart, CartLineItem, CartStore, ShippingMethod};
use crate::error::{CheckoutError, CheckoutResult};
use crate::flow::{Flow, FlowControl, FlowOutcome, PageData};
use crate::handoff::{CheckoutSummary, SummarySlot};
use crate::pricing::{self, CartTotals, PricingPolicy};
use crate::scope::PageScope;
use crate::session::Session;
use crate::wizard::{CustomerInfo, IndicatorState, Rejection, Wizard, WizardContext, WizardStep};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[derive(Debug)]
pub struct ShippingState {
  pub session: Session,
  pub cart: Cart,
  /// Fetched for display only; never merged into the cart.
  pub orders: Vec<Order>,
  pub loading: bool,
  pub error: Option<String>,
  pub wizard: Wizard,
  pub customer_info: CustomerInfo,
  summary: Option<CheckoutSummary>,
  route: Option<Route>,
}

/// One row of the shipping-method step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingLine {
  pub product_id: String,
  pub name: String,
  pub image: String,
  pub seller_name: Option<String>,
  pub method: Option<ShippingMethod>,
  pub method_label: &'static str,
  pub cost: Decimal,
}

pub struct ShippingPage {
  data: PageData<ShippingState>,
  scope: PageScope,
  services: PageServices,
  mount_flow: Flow<ShippingState>,
  proceed_flow: Flow<ShippingState>,
}

impl ShippingPage {
  pub fn new(session: Session, services: PageServices, scope: PageScope) -> Self {
    let data = PageData::new(ShippingState {
      session,
      cart: Cart::detached(),
      orders: Vec::new(),
      loading: true,
      error: None,
      wizard: Wizard::new(),
      customer_info: CustomerInfo::default(),
      summary: None,
      route: None,
    });
    let mount_flow = build_mount_flow(&services, &scope);
    let proceed_flow = build_proceed_flow(&services);
    Self {
      data,
      scope,
      services,
      mount_flow,
      proceed_flow,
    }
  }

  pub fn data(&self) -> &PageData<ShippingState> {
    &self.data
  }

  pub fn scope(&self) -> &PageScope {
    &self.scope
  }

  pub fn close(&self) {
    self.scope.close();
  }

  /// Resolves the session against the API and loads that user's cart.
  ///
  /// Session problems and fetch failures degrade to an empty cart or an
  /// inline message. Only a closed scope is an error.
  pub async fn mount(&self) -> CheckoutResult<()> {
    self.mount_flow.run(self.data.clone(), &self.scope).await?;
    Ok(())
  }

  pub fn policy(&self) -> PricingPolicy {
    self.services.pricing_policy()
  }

  pub fn cart_items(&self) -> Vec<CartLineItem> {
    self.data.read().cart.items().to_vec()
  }

  pub fn totals(&self) -> CartTotals {
    self.data.read().cart.totals(&self.policy())
  }

  pub fn products_label(&self) -> String {
    pricing::products_label(self.data.read().cart.items())
  }

  pub fn latest_order(&self) -> Option<Order> {
    self.data.read().orders.first().cloned()
  }

  /// Rows of the shipping-method step, one per cart line.
  pub fn shipping_lines(&self) -> Vec<ShippingLine> {
    let policy = self.policy();
    self
      .data
      .read()
      .cart
      .items()
      .iter()
      .map(|item| ShippingLine {
        product_id: item.product_id.clone(),
        name: item.name.clone(),
        image: item.image.clone().unwrap_or_else(|| crate::cart::item::PLACEHOLDER_IMAGE.to_string()),
        seller_name: item.seller_name.clone(),
        method: item.seller_shipping_method,
        method_label: ShippingMethod::label_with_window(item.seller_shipping_method),
        cost: pricing::item_shipping_cost(item, &policy),
      })
      .collect()
  }

  // Cart edits. Only the products step edits the cart; elsewhere they are
  // ignored and `Ok(false)` is returned.

  pub fn change_quantity(&self, product_id: &str, delta: i64) -> CheckoutResult<bool> {
    let mut state = self.data.write();
    if !state.wizard.current().cart_editable() {
      debug!(step = %state.wizard.current(), "Cart is read-only on this step.");
      return Ok(false);
    }
    state.cart.change_quantity(product_id, delta)?;
    Ok(true)
  }

  pub fn remove_item(&self, product_id: &str) -> CheckoutResult<bool> {
    let mut state = self.data.write();
    if !state.wizard.current().cart_editable() {
      debug!(step = %state.wizard.current(), "Cart is read-only on this step.");
      return Ok(false);
    }
    state.cart.remove_item(product_id)?;
    Ok(true)
  }

  // Wizard.

  pub fn current_step(&self) -> WizardStep {
    self.data.read().wizard.current()
  }

  /// "خطوة N من 4: <subtitle>"
  pub fn progress_caption(&self) -> String {
    let step = self.current_step();
    format!("خطوة {} من {}: {}", step.number(), WizardStep::ALL.len(), step.subtitle())
  }

  pub fn indicator_states(&self) -> [(WizardStep, IndicatorState); 4] {
    self.data.read().wizard.indicator_states()
  }

  pub fn can_advance(&self) -> bool {
    let state = self.data.read();
    state.wizard.can_advance(&context(&state))
  }

  pub fn can_go_back(&self) -> bool {
    self.data.read().wizard.can_go_back()
  }

  pub fn next(&self) -> Result<WizardStep, Rejection> {
    let mut guard = self.data.write();
    let state = &mut *guard;
    let ctx = WizardContext {
      cart_is_empty: state.cart.is_empty(),
      customer_info: Some(&state.customer_info),
    };
    state.wizard.next(&ctx)
  }

  pub fn back(&self) -> Result<WizardStep, Rejection> {
    self.data.write().wizard.back()
  }

  pub fn jump_to(&self, step: WizardStep) -> Result<WizardStep, Rejection> {
    self.data.write().wizard.jump_to(step)
  }

  // Delivery details.

  pub fn update_customer_info(&self, edit: impl FnOnce(&mut CustomerInfo)) {
    edit(&mut self.data.write().customer_info);
  }

  pub fn validate_customer_info(&self) -> CheckoutResult<()> {
    self.data.read().customer_info.validate()?;
    Ok(())
  }

  /// Freezes the cart and its totals into the hand-off slot. `None` unless
  /// the wizard is on the totals step.
  #[instrument(name = "ShippingPage::proceed_to_payment", skip(self))]
  pub async fn proceed_to_payment(&self) -> CheckoutResult<Option<Route>> {
    self.data.write().route = None;
    match self.proceed_flow.run(self.data.clone(), &self.scope).await? {
      FlowOutcome::Halted => Ok(None),
      FlowOutcome::Completed => Ok(self.data.write().route.take()),
    }
  }

  /// Signs out from this page: credentials and this user's cart are dropped.
  pub fn sign_out(&self) -> CheckoutResult<Route> {
    let mut state = self.data.write();
    self.services.sessions().logout(&state.session)?;
    state.session = Session::anonymous();
    state.cart = Cart::detached();
    state.wizard = Wizard::new();
    state.customer_info = CustomerInfo::default();
    state.orders.clear();
    Ok(Route::Home)
  }
}

fn context(state: &ShippingState) -> WizardContext<'_> {
  WizardContext {
    cart_is_empty: state.cart.is_empty(),
    customer_info: Some(&state.customer_info),
  }
}

fn build_mount_flow(services: &PageServices, scope: &PageScope) -> Flow<ShippingState> {
  let mut flow = Flow::new(
    "shipping_mount",
    &[("check_token", false, None), ("resolve_profile_and_orders", false, None)],
  );

  let slots = services.slots.clone();
  flow.on("check_token", move |page: PageData<ShippingState>| {
    let slots = slots.clone();
    async move {
      let has_token = page.read().session.token.is_some();
      if has_token {
        return Ok::<_, CheckoutError>(FlowControl::Continue);
      }
      if let Err(e) = CartStore::clear_legacy(slots.as_ref()) {
        warn!(error = %e, "Could not clear legacy cart.");
      }
      let mut state = page.write();
      state.cart = Cart::detached();
      state.loading = false;
      info!("No session token, showing an empty cart.");
      Ok(FlowControl::Halt)
    }
  });

  let services = services.clone();
  let scope = scope.clone();
  flow.on("resolve_profile_and_orders", move |page: PageData<ShippingState>| {
    let services = services.clone();
    let scope = scope.clone();
    async move {
      let token = page
        .read()
        .session
        .token
        .clone()
        .ok_or(CheckoutError::Unauthenticated)?;
      let (profile, orders) = tokio::join!(
        scope.guard("auth::me", services.api.me(&token)),
        scope.guard("orders::my_orders", services.api.my_orders(&token)),
      );
      if scope.is_closed() {
        return Err(CheckoutError::Cancelled {
          operation: "shipping::mount".to_string(),
        });
      }

      let mut state = page.write();
      match profile {
        Ok(user) => {
          let store = CartStore::new(services.slots.clone(), user.id.clone());
          state.cart = Cart::open(store);
          state.customer_info = CustomerInfo::prefill(&user);
          info!(user_id = %user.id, lines = state.cart.line_count(), "Cart loaded.");
          state.session.user = Some(user);
        }
        Err(CheckoutError::Unauthenticated | CheckoutError::Api { .. }) => {
          if let Err(e) = services.sessions().invalidate() {
            warn!(error = %e, "Could not clear rejected session.");
          }
          state.session = Session::anonymous();
          state.cart = Cart::detached();
        }
        Err(e) => {
          warn!(error = %e, "Profile fetch failed, showing an empty cart.");
          if let Err(e) = CartStore::clear_legacy(services.slots.as_ref()) {
            warn!(error = %e, "Could not clear legacy cart.");
          }
          state.cart = Cart::detached();
        }
      }

      match orders {
        Ok(orders) => state.orders = orders,
        Err(CheckoutError::Api { message }) => state.error = Some(message),
        Err(e) => {
          warn!(error = %e, "Orders fetch failed.");
          state.error = Some(ORDERS_FETCH_ERROR.to_string());
        }
      }
      state.loading = false;
      Ok(FlowControl::Continue)
    }
  });

  flow
}

fn build_proceed_flow(services: &PageServices) -> Flow<ShippingState> {
  let mut flow = Flow::new(
    "proceed_to_payment",
    &[
      ("require_totals_step", false, None),
      ("snapshot_summary", false, None),
      ("write_summary", false, None),
    ],
  );

  flow.on("require_totals_step", |page: PageData<ShippingState>| async move {
    let step = page.read().wizard.current();
    if step == WizardStep::Totals {
      Ok::<_, CheckoutError>(FlowControl::Continue)
    } else {
      debug!(%step, "Payment hand-off is only offered on the totals step.");
      Ok(FlowControl::Halt)
    }
  });

  let policy = services.pricing_policy();
  flow.on("snapshot_summary", move |page: PageData<ShippingState>| async move {
    let mut state = page.write();
    state.summary = Some(CheckoutSummary::snapshot(state.cart.items(), &policy));
    Ok::<_, CheckoutError>(FlowControl::Continue)
  });

  let slot = SummarySlot::new(services.slots.clone());
  flow.on("write_summary", move |page: PageData<ShippingState>| {
    let slot = slot.clone();
    async move {
      let mut state = page.write();
      let summary = state
        .summary
        .take()
        .ok_or_else(|| CheckoutError::Internal("no summary to hand off".to_string()))?;
      // The payment page falls back to zero totals, so a failed write
      // does not block navigation.
      if let Err(e) = slot.write(&summary) {
        warn!(error = %e, "Could not store checkout summary.");
      }
      state.route = Some(Route::Payment);
      Ok::<_, CheckoutError>(FlowControl::Continue)
    }
  });

  flow
}
