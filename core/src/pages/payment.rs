// binaa/src/pages/payment.rs
use crate::handoff::PaymentView;
use crate::pricing::CartTotals;
use crate::storage::SlotStore;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Payment options offered by the (mock) payment page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
  #[default]
  CreditCard,
  ApplePay,
}

impl PaymentMethod {
  pub fn label(self) -> &'static str {
    match self {
      PaymentMethod::CreditCard => "بطاقة ائتمان / مدى",
      PaymentMethod::ApplePay => "Apple Pay",
    }
  }

  /// Card details are only asked for when paying by card.
  pub fn needs_card_form(self) -> bool {
    self == PaymentMethod::CreditCard
  }
}

/// Reads the hand-off slot once when mounted. No payment is processed.
#[derive(Debug, Clone)]
pub struct PaymentPage {
  view: PaymentView,
  method: PaymentMethod,
}

impl PaymentPage {
  pub fn mount(slots: &dyn SlotStore) -> Self {
    let view = PaymentView::from_slot(slots);
    debug!(has_summary = view.has_summary, grand_total = %view.totals.grand_total, "Payment page mounted.");
    Self {
      view,
      method: PaymentMethod::default(),
    }
  }

  pub fn totals(&self) -> CartTotals {
    self.view.totals
  }

  pub fn view(&self) -> &PaymentView {
    &self.view
  }

  pub fn method(&self) -> PaymentMethod {
    self.method
  }

  pub fn select_method(&mut self, method: PaymentMethod) {
    self.method = method;
  }
}
