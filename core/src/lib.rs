// binaa/src/lib.rs

//! Binaa: the cart and checkout engine of a building-materials storefront.
//!
//! Binaa keeps a per-user cart in durable key/value slots and drives the
//! checkout pages that use it:
//!  - A product page that merges the chosen quantity into the signed-in
//!    user's cart.
//!  - A shipping page running the four-step checkout wizard (products,
//!    delivery details, per-seller shipping, totals).
//!  - A payment page reading the frozen checkout summary.
//!
//! Totals are advisory: subtotal, per-line shipping, flat-rate tax and grand
//! total are recomputed from the cart whenever they are shown.

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod flow;
pub mod handoff;
pub mod pages;
pub mod pricing;
pub mod scope;
pub mod session;
pub mod storage;
pub mod wizard;

// --- Re-exports for the Public API ---

pub use crate::api::{HttpStorefrontApi, Order, Product, StorefrontApi};
pub use crate::cart::{Cart, CartLineItem, CartStore, ProductSnapshot, ShippingMethod};
pub use crate::config::CheckoutConfig;
pub use crate::error::{CheckoutError, CheckoutResult};
pub use crate::flow::{Flow, FlowControl, FlowOutcome, PageData};
pub use crate::handoff::{CheckoutSummary, PaymentView, SummarySlot};
pub use crate::pages::{PageServices, PaymentPage, ProductPage, Route, ShippingPage};
pub use crate::pricing::{CartTotals, PricingPolicy};
pub use crate::scope::PageScope;
pub use crate::session::{Role, Session, SessionStore, User};
pub use crate::storage::{FileStore, MemoryStore, SlotStore};
pub use crate::wizard::{CustomerInfo, Wizard, WizardEvent, WizardStep};
