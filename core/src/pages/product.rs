// binaa/src/pages/product.rs
use super::{PageServices, Route};
use crate::api::{Product, PRODUCT_FETCH_ERROR};
use crate::cart::{self, resolve_image_url, CartLineItem, CartStore, ShippingMethod};
use crate::error::{CheckoutError, CheckoutResult};
use crate::flow::{Flow, FlowControl, PageData};
use crate::scope::PageScope;
use crate::session::Session;
use tracing::{debug, info, instrument, warn};

pub const LOGIN_REQUIRED_PROMPT: &str = "يجب تسجيل الدخول أولاً لإضافة منتجات إلى السلة";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddToCartOutcome {
  /// No session: tell the buyer to sign in and send them to the login page.
  LoginRequired { prompt: &'static str, redirect: Route },
  Added {
    product_id: String,
    /// Quantity of this product in the cart after the merge.
    quantity_in_cart: u32,
    redirect: Route,
  },
  /// The product never loaded; the button does nothing.
  ProductUnavailable,
}

impl AddToCartOutcome {
  pub fn redirect(&self) -> Option<&Route> {
    match self {
      AddToCartOutcome::LoginRequired { redirect, .. } | AddToCartOutcome::Added { redirect, .. } => Some(redirect),
      AddToCartOutcome::ProductUnavailable => None,
    }
  }
}

#[derive(Debug)]
struct PendingCart {
  store: CartStore,
  items: Vec<CartLineItem>,
}

#[derive(Debug)]
pub struct ProductState {
  pub product_id: String,
  pub session: Session,
  pub product: Option<Product>,
  pub loading: bool,
  /// Inline message shown instead of the product.
  pub error: Option<String>,
  pub quantity: u32,
  pending: Option<PendingCart>,
  outcome: Option<AddToCartOutcome>,
}

pub struct ProductPage {
  data: PageData<ProductState>,
  scope: PageScope,
  services: PageServices,
  add_to_cart: Flow<ProductState>,
}

impl ProductPage {
  pub fn new(product_id: impl Into<String>, session: Session, services: PageServices, scope: PageScope) -> Self {
    let data = PageData::new(ProductState {
      product_id: product_id.into(),
      session,
      product: None,
      loading: true,
      error: None,
      quantity: 1,
      pending: None,
      outcome: None,
    });
    let add_to_cart = build_add_to_cart_flow(&services);
    Self {
      data,
      scope,
      services,
      add_to_cart,
    }
  }

  pub fn data(&self) -> &PageData<ProductState> {
    &self.data
  }

  pub fn scope(&self) -> &PageScope {
    &self.scope
  }

  /// Fetches the product. A failed fetch becomes an inline message; only a
  /// closed scope is returned as an error, and then nothing is written.
  #[instrument(name = "ProductPage::mount", skip(self))]
  pub async fn mount(&self) -> CheckoutResult<()> {
    let id = self.data.read().product_id.clone();
    debug!(product_id = %id, "Fetching product.");
    let fetched = self.scope.guard("product", self.services.api.product(&id)).await;
    let mut state = self.data.write();
    match fetched {
      Ok(product) => {
        state.product = Some(product);
        state.error = None;
      }
      Err(e @ CheckoutError::Cancelled { .. }) => return Err(e),
      Err(CheckoutError::Api { message }) => state.error = Some(message),
      Err(e) => {
        warn!(error = %e, "Product fetch failed.");
        state.error = Some(PRODUCT_FETCH_ERROR.to_string());
      }
    }
    state.loading = false;
    Ok(())
  }

  /// Clamps to `1..=stock`, or to the configured maximum when the product has
  /// no stock figure. Ignored until the product has loaded.
  pub fn set_quantity(&self, requested: i64) -> u32 {
    let mut state = self.data.write();
    let Some(product) = state.product.as_ref() else {
      return state.quantity;
    };
    let max = product
      .stock
      .filter(|s| *s > 0)
      .unwrap_or(self.services.config.max_quantity);
    let clamped = requested.clamp(1, i64::from(max.max(1)));
    // Within 1..=u32::MAX after the clamp.
    state.quantity = clamped as u32;
    state.quantity
  }

  pub fn image_url(&self) -> String {
    let state = self.data.read();
    let image = state.product.as_ref().and_then(|p| p.image.as_deref());
    resolve_image_url(image, self.services.api.base_url())
  }

  /// Colour, size and free-form features that are set.
  pub fn feature_items(&self) -> Vec<String> {
    let state = self.data.read();
    let Some(p) = state.product.as_ref() else {
      return Vec::new();
    };
    [
      p.color.as_ref().map(|c| format!("اللون: {c}")),
      p.size.as_ref().map(|s| format!("المقاس: {s}")),
      p.feature1.clone(),
      p.feature2.clone(),
      p.feature3.clone(),
    ]
    .into_iter()
    .flatten()
    .filter(|f| !f.is_empty())
    .collect()
  }

  pub fn shipping_label(&self) -> &'static str {
    ShippingMethod::product_label(self.data.read().product.as_ref().and_then(|p| p.shipping_method))
  }

  /// Merges the selected quantity into the signed-in user's cart.
  #[instrument(name = "ProductPage::add_to_cart", skip(self))]
  pub async fn add_to_cart(&self) -> CheckoutResult<AddToCartOutcome> {
    {
      let mut state = self.data.write();
      if state.product.is_none() {
        return Ok(AddToCartOutcome::ProductUnavailable);
      }
      state.outcome = None;
      state.pending = None;
    }
    self.add_to_cart.run(self.data.clone(), &self.scope).await?;
    self
      .data
      .write()
      .outcome
      .take()
      .ok_or_else(|| CheckoutError::Internal("add-to-cart flow ended without an outcome".to_string()))
  }

  pub fn close(&self) {
    self.scope.close();
  }
}

fn build_add_to_cart_flow(services: &PageServices) -> Flow<ProductState> {
  let mut flow = Flow::new(
    "add_to_cart",
    &[
      ("require_session", false, None),
      ("load_cart", false, None),
      ("merge_line_item", false, None),
      ("persist_cart", false, None),
    ],
  );

  flow.on("require_session", |page: PageData<ProductState>| async move {
    let authenticated = page.read().session.is_authenticated();
    if authenticated {
      return Ok::<_, CheckoutError>(FlowControl::Continue);
    }
    info!("Add to cart without a session, redirecting to login.");
    page.write().outcome = Some(AddToCartOutcome::LoginRequired {
      prompt: LOGIN_REQUIRED_PROMPT,
      redirect: Route::Login,
    });
    Ok(FlowControl::Halt)
  });

  let slots = services.slots.clone();
  flow.on("load_cart", move |page: PageData<ProductState>| {
    let slots = slots.clone();
    async move {
      let mut state = page.write();
      let store = CartStore::for_session(slots, &state.session)?;
      let items = store.load();
      state.pending = Some(PendingCart { store, items });
      Ok::<_, CheckoutError>(FlowControl::Continue)
    }
  });

  let base_url = services.api.base_url().to_string();
  flow.on("merge_line_item", move |page: PageData<ProductState>| {
    let base_url = base_url.clone();
    async move {
      let mut guard = page.write();
      let state = &mut *guard;
      let (Some(product), Some(pending)) = (state.product.as_ref(), state.pending.as_mut()) else {
        return Err(CheckoutError::Internal("merge without product or loaded cart".to_string()));
      };
      let snapshot = product.snapshot(&base_url);
      cart::merge_line(&mut pending.items, &snapshot, state.quantity)?;
      Ok::<_, CheckoutError>(FlowControl::Continue)
    }
  });

  flow.on("persist_cart", |page: PageData<ProductState>| async move {
    let mut state = page.write();
    let pending = state
      .pending
      .take()
      .ok_or_else(|| CheckoutError::Internal("no cart to persist".to_string()))?;
    pending.store.save(&pending.items)?;
    let product_id = state.product_id.clone();
    let quantity_in_cart = pending
      .items
      .iter()
      .find(|i| i.product_id == product_id)
      .map_or(0, |i| i.quantity);
    info!(%product_id, quantity_in_cart, user_id = pending.store.user_id(), "Added to cart.");
    state.outcome = Some(AddToCartOutcome::Added {
      product_id,
      quantity_in_cart,
      redirect: Route::Shipping,
    });
    Ok::<_, CheckoutError>(FlowControl::Continue)
  });

  flow
}
