//! Shopwright: page-object guest checkout for the Demo Web Shop
//!
//! Drives a browser through product browsing, the shopping cart and the
//! multi-step guest checkout, then reads the order confirmation back.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Scenario     │──►│ Checkout     │──►│ Site adapter │──►│ PageDriver   │
//! │ runner       │   │ orchestrator │   │ + page objs  │   │ (CDP / mock) │
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! Page objects never hold element handles: every query goes back through
//! the [`PageDriver`], so values are always read from the live page.

#![warn(missing_docs)]

/// Real browser control over CDP
#[cfg(feature = "browser")]
pub mod browser;

pub mod checkout;
pub mod config;
pub mod driver;
pub mod extract;
pub mod fixture;
pub mod locator;
pub mod model;
pub mod page_object;
pub mod pages;
pub mod result;
pub mod scenario;
pub mod site;
pub mod wait;

#[cfg(feature = "browser")]
pub use browser::{Browser, BrowserConfig, ChromiumDriver};
pub use checkout::{CheckoutOrchestrator, CheckoutStep, StepRecord, StepStatus};
pub use config::{SuiteConfig, Timings};
pub use driver::{MockDom, MockDriver, MockElement, PageDriver};
pub use extract::{extract_amount, find_amount, find_order_number, order_number_from_href};
pub use fixture::TestData;
pub use locator::{SelectBy, Selector};
pub use model::{
    CartLine, CartTotals, GuestUserProfile, OrderConfirmation, PaymentMethod, ProductConfiguration,
    ProductData,
};
pub use page_object::{Interactions, PageObject};
pub use result::{ShopError, ShopResult};
pub use scenario::{Scenario, ScenarioOutcome, ScenarioRunner, ScenarioStatus};
pub use site::{CheckoutSite, DemoWebShop};
pub use wait::{LoadState, WaitOptions, WaitResult};
