// binaa/src/wizard/customer.rs
use crate::session::User;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

const MOBILE_MESSAGE: &str = "رقم الجوال يجب أن يبدأ ب 05 ويحتوي على 10 أرقام";
const POSTAL_MESSAGE: &str = "الرمز البريدي يجب أن يتكون من 5 أرقام";

/// Delivery details collected on step 2. Never sent anywhere; the payment
/// page is a mock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
  #[validate(length(min = 2, max = 25, message = "الاسم الأول يجب أن يكون بين 2 و 25 حرفاً"))]
  pub first_name: String,
  #[validate(length(min = 2, max = 25, message = "الاسم الأخير يجب أن يكون بين 2 و 25 حرفاً"))]
  pub last_name: String,
  #[validate(custom = "validate_mobile")]
  pub phone: String,
  #[validate(length(min = 1, message = "المدينة مطلوبة"))]
  pub city: String,
  #[validate(length(min = 1, message = "الحي مطلوب"))]
  pub district: String,
  #[validate(length(min = 5, max = 200, message = "العنوان يجب أن يكون بين 5 و 200 حرف"))]
  pub address: String,
  #[validate(custom = "validate_postal_code")]
  pub postal_code: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
}

impl CustomerInfo {
  /// Form defaults from the signed-in profile: first word of the name, the
  /// rest of it, and the phone number.
  pub fn prefill(user: &User) -> Self {
    let mut words = user.name.split(' ');
    let first_name = words.next().unwrap_or_default().to_string();
    let last_name = words.collect::<Vec<_>>().join(" ");
    Self {
      first_name,
      last_name,
      phone: user.phone.clone().unwrap_or_default(),
      ..Self::default()
    }
  }

  pub fn is_complete(&self) -> bool {
    self.validate().is_ok()
  }
}

fn error_with(code: &'static str, message: &'static str) -> ValidationError {
  let mut err = ValidationError::new(code);
  err.message = Some(Cow::Borrowed(message));
  err
}

fn all_digits(value: &str, len: usize) -> bool {
  value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

fn validate_mobile(phone: &str) -> Result<(), ValidationError> {
  if phone.starts_with("05") && all_digits(phone, 10) {
    Ok(())
  } else {
    Err(error_with("mobile", MOBILE_MESSAGE))
  }
}

fn validate_postal_code(code: &str) -> Result<(), ValidationError> {
  if all_digits(code, 5) {
    Ok(())
  } else {
    Err(error_with("postal_code", POSTAL_MESSAGE))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::session::Role;

  fn filled() -> CustomerInfo {
    CustomerInfo {
      first_name: "أحمد".into(),
      last_name: "محمد".into(),
      phone: "0551234567".into(),
      city: "الرياض".into(),
      district: "النرجس".into(),
      address: "شارع الملك فهد، مبنى 12".into(),
      postal_code: "12345".into(),
      notes: None,
    }
  }

  #[test]
  fn complete_form_validates() {
    assert!(filled().validate().is_ok());
  }

  #[test]
  fn bad_phone_and_postal_code_are_reported() {
    let info = CustomerInfo {
      phone: "+966551234567".into(),
      postal_code: "1234".into(),
      ..filled()
    };
    let errors = info.validate().unwrap_err();
    let fields = errors.field_errors();
    assert!(fields.contains_key("phone"));
    assert!(fields.contains_key("postal_code"));
    assert_eq!(fields.len(), 2);
  }

  #[test]
  fn prefill_splits_the_profile_name() {
    let user = User {
      id: "u1".into(),
      role: Role::Customer,
      name: "Ahmad bin Ali".into(),
      phone: Some("0550000000".into()),
      email: None,
    };
    let info = CustomerInfo::prefill(&user);
    assert_eq!(info.first_name, "Ahmad");
    assert_eq!(info.last_name, "bin Ali");
    assert_eq!(info.phone, "0550000000");
    assert!(info.city.is_empty());
  }
}
