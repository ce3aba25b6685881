// binaa/src/wizard/step.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four checkout steps, in order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum WizardStep {
  #[default]
  Products = 1,
  CustomerInfo = 2,
  ShippingMethod = 3,
  Totals = 4,
}

impl WizardStep {
  pub const ALL: [WizardStep; 4] = [
    WizardStep::Products,
    WizardStep::CustomerInfo,
    WizardStep::ShippingMethod,
    WizardStep::Totals,
  ];

  pub fn number(self) -> u8 {
    self as u8
  }

  pub fn from_number(n: u8) -> Option<Self> {
    Self::ALL.into_iter().find(|s| s.number() == n)
  }

  pub fn next(self) -> Option<Self> {
    Self::from_number(self.number() + 1)
  }

  pub fn previous(self) -> Option<Self> {
    self.number().checked_sub(1).and_then(Self::from_number)
  }

  pub fn title(self) -> &'static str {
    match self {
      WizardStep::Products => "المنتجات",
      WizardStep::CustomerInfo => "بيانات العميل",
      WizardStep::ShippingMethod => "طريقة الشحن",
      WizardStep::Totals => "الإجمالي والدفع",
    }
  }

  pub fn subtitle(self) -> &'static str {
    match self {
      WizardStep::Products => "مراجعة سلة المشتريات",
      WizardStep::CustomerInfo => "معلومات التوصيل",
      WizardStep::ShippingMethod => "يحددها البائع لكل منتج",
      WizardStep::Totals => "مراجعة المبلغ والدفع",
    }
  }

  /// Steps that show the cart list. Only the first one lets the buyer edit it.
  pub fn shows_cart(self) -> bool {
    matches!(self, WizardStep::Products | WizardStep::Totals)
  }

  pub fn cart_editable(self) -> bool {
    self == WizardStep::Products
  }
}

impl From<WizardStep> for u8 {
  fn from(step: WizardStep) -> u8 {
    step.number()
  }
}

impl TryFrom<u8> for WizardStep {
  type Error = String;

  fn try_from(n: u8) -> Result<Self, Self::Error> {
    Self::from_number(n).ok_or_else(|| format!("no wizard step {n}"))
  }
}

impl fmt::Display for WizardStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({})", self.number(), self.title())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn steps_are_linear() {
    assert_eq!(WizardStep::Products.previous(), None);
    assert_eq!(WizardStep::Products.next(), Some(WizardStep::CustomerInfo));
    assert_eq!(WizardStep::Totals.next(), None);
    assert!(WizardStep::CustomerInfo < WizardStep::Totals);
  }
}
