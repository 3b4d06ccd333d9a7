//! Page objects for the Demo Web Shop.
//!
//! Each page object borrows an [`Interactions`](crate::page_object::Interactions)
//! helper; literal selectors live in [`selectors`].

pub mod billing;
pub mod cart;
pub mod category;
pub mod confirm;
pub mod home;
pub mod payment;
pub mod selectors;
pub mod shipping;

pub use billing::BillingAddressPage;
pub use cart::ShoppingCartPage;
pub use category::{AccumulationReport, ProductCategoryPage};
pub use confirm::ConfirmOrderPage;
pub use home::HomePage;
pub use payment::{PaymentInformationPage, PaymentMethodPage};
pub use shipping::{PickupSelection, ShippingAddressPage};
