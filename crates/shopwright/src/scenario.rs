//! Runner-facing scenarios.
//!
//! Each scenario owns one page for its whole life. It runs under the suite
//! timeout and the page is closed afterwards no matter how the run ended.

use crate::checkout::{CheckoutOrchestrator, StepRecord, StepStatus};
use crate::config::SuiteConfig;
use crate::driver::PageDriver;
use crate::model::{GuestUserProfile, OrderConfirmation, PaymentMethod, CURRENCY_TOLERANCE};
use crate::page_object::Interactions;
use crate::pages::{BillingAddressPage, HomePage, ProductCategoryPage, ShoppingCartPage};
use crate::result::{ShopError, ShopResult};
use crate::site::DemoWebShop;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use tokio::time::Instant;
use uuid::Uuid;

/// Products every scenario puts in the cart
pub const PRODUCTS_TO_ADD: usize = 4;

/// The suite's scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scenario {
    /// Add products and check the header count
    #[serde(rename = "TC001")]
    AddProducts,
    /// Check the cart and reach the checkout
    #[serde(rename = "TC002")]
    CartToCheckout,
    /// Place an order as a guest
    #[serde(rename = "TC003")]
    GuestCheckout,
    /// Place an order and validate prices along the way
    #[serde(rename = "TC004")]
    PriceValidation,
}

impl Scenario {
    /// Every scenario in suite order
    pub const ALL: [Self; 4] = [
        Self::AddProducts,
        Self::CartToCheckout,
        Self::GuestCheckout,
        Self::PriceValidation,
    ];

    /// Identifier, e.g. "TC003"
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::AddProducts => "TC001",
            Self::CartToCheckout => "TC002",
            Self::GuestCheckout => "TC003",
            Self::PriceValidation => "TC004",
        }
    }

    /// Title
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::AddProducts => "Add multiple products to cart",
            Self::CartToCheckout => "Verify shopping cart items and calculations",
            Self::GuestCheckout => "Complete checkout process and verify order",
            Self::PriceValidation => "End-to-end order placement with price validation",
        }
    }

    /// Whether the scenario places an order
    #[must_use]
    pub const fn places_order(self) -> bool {
        matches!(self, Self::GuestCheckout | Self::PriceValidation)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id(), self.title())
    }
}

impl FromStr for Scenario {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sc| sc.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ShopError::EnvironmentMisconfiguration {
                key: "scenario".to_string(),
                message: format!("unknown scenario '{s}', expected one of TC001-TC004"),
            })
    }
}

/// Final state of a scenario run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    /// Every step passed
    Passed,
    /// A step failed
    Failed,
    /// The suite timeout expired
    TimedOut,
}

/// One runner-level step of a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioStep {
    /// Step title
    pub name: String,
    /// Outcome
    pub status: StepStatus,
    /// Wall time spent in the step
    pub duration_ms: u64,
    /// Failure text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of running one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Run identifier
    pub run_id: Uuid,
    /// Scenario
    pub scenario: Scenario,
    /// Scenario title
    pub title: String,
    /// Final state
    pub status: ScenarioStatus,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// Wall time
    pub duration_ms: u64,
    /// Runner-level steps
    pub steps: Vec<ScenarioStep>,
    /// Checkout steps, when the scenario reached the checkout walk
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checkout_steps: Vec<StepRecord>,
    /// Failure text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Placed order, for scenarios that place one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<OrderConfirmation>,
}

impl ScenarioOutcome {
    /// Passing outcome with no steps, stamped with a fresh run id
    #[must_use]
    pub fn new(scenario: Scenario) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            scenario,
            title: scenario.title().to_string(),
            status: ScenarioStatus::Passed,
            started_at: Utc::now(),
            duration_ms: 0,
            steps: Vec::new(),
            checkout_steps: Vec::new(),
            error: None,
            confirmation: None,
        }
    }

    /// Whether the scenario passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == ScenarioStatus::Passed
    }

    /// Name of the failed runner step, if any
    #[must_use]
    pub fn failed_step(&self) -> Option<&str> {
        self.steps
            .iter()
            .find(|s| s.status == StepStatus::Failed)
            .map(|s| s.name.as_str())
    }
}

#[derive(Debug, Default)]
struct Recorder {
    steps: Vec<ScenarioStep>,
    checkout_steps: Vec<StepRecord>,
    confirmation: Option<OrderConfirmation>,
}

impl Recorder {
    async fn step<T>(
        &mut self,
        name: &str,
        action: impl Future<Output = ShopResult<T>>,
    ) -> ShopResult<T> {
        tracing::info!(step = name, "scenario step");
        let start = Instant::now();
        let result = action.await;
        let duration_ms = start.elapsed().as_millis() as u64;
        self.steps.push(ScenarioStep {
            name: name.to_string(),
            status: if result.is_ok() {
                StepStatus::Passed
            } else {
                StepStatus::Failed
            },
            duration_ms,
            error: result.as_ref().err().map(ToString::to_string),
        });
        result
    }
}

fn ensure(condition: bool, message: impl FnOnce() -> String) -> ShopResult<()> {
    if condition {
        Ok(())
    } else {
        Err(ShopError::assertion(message()))
    }
}

/// Runs scenarios against pages supplied by the caller
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    config: SuiteConfig,
    profile: GuestUserProfile,
    products_to_add: usize,
    payment: PaymentMethod,
    seed: Option<u64>,
}

impl ScenarioRunner {
    /// Create a runner for a configuration and guest profile
    #[must_use]
    pub fn new(config: SuiteConfig, profile: GuestUserProfile) -> Self {
        Self {
            config,
            profile,
            products_to_add: PRODUCTS_TO_ADD,
            payment: PaymentMethod::default(),
            seed: None,
        }
    }

    /// Number of products to add before checking out
    #[must_use]
    pub const fn with_products_to_add(mut self, n: usize) -> Self {
        self.products_to_add = n;
        self
    }

    /// Payment method for scenarios that place an order
    #[must_use]
    pub const fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment = method;
        self
    }

    /// Seed product picks so runs are repeatable
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Suite configuration
    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Run one scenario on `driver`, then close the page
    pub async fn run<D: PageDriver + ?Sized>(&self, scenario: Scenario, driver: &D) -> ScenarioOutcome {
        let mut outcome = ScenarioOutcome::new(scenario);
        let mut recorder = Recorder::default();
        let start = Instant::now();
        tracing::info!(scenario = scenario.id(), title = scenario.title(), "scenario started");

        let timeout = self.config.suite_timeout;
        let result = match tokio::time::timeout(timeout, self.body(scenario, driver, &mut recorder)).await {
            Ok(result) => result,
            Err(_) => {
                outcome.status = ScenarioStatus::TimedOut;
                Err(ShopError::ScenarioTimeout {
                    scenario: scenario.id().to_string(),
                    ms: timeout.as_millis() as u64,
                })
            }
        };

        close_page(driver).await;

        outcome.duration_ms = start.elapsed().as_millis() as u64;
        outcome.steps = recorder.steps;
        outcome.checkout_steps = recorder.checkout_steps;
        outcome.confirmation = recorder.confirmation;
        match result {
            Ok(()) => {
                tracing::info!(scenario = scenario.id(), duration_ms = outcome.duration_ms, "scenario passed");
            }
            Err(e) => {
                if outcome.status == ScenarioStatus::Passed {
                    outcome.status = ScenarioStatus::Failed;
                }
                tracing::error!(scenario = scenario.id(), error = %e, "scenario failed");
                outcome.error = Some(e.to_string());
            }
        }
        outcome
    }

    /// Run scenarios, each on a fresh page from `open_page`.
    ///
    /// With `parallel` the scenarios run concurrently; they share nothing
    /// but the runner's configuration.
    pub async fn run_all<D, F, Fut>(
        &self,
        scenarios: &[Scenario],
        parallel: bool,
        open_page: F,
    ) -> Vec<ScenarioOutcome>
    where
        D: PageDriver,
        F: Fn() -> Fut,
        Fut: Future<Output = ShopResult<D>>,
    {
        if parallel {
            join_all(scenarios.iter().map(|s| self.run_on_new_page(*s, &open_page))).await
        } else {
            let mut outcomes = Vec::with_capacity(scenarios.len());
            for scenario in scenarios {
                outcomes.push(self.run_on_new_page(*scenario, &open_page).await);
            }
            outcomes
        }
    }

    async fn run_on_new_page<D, F, Fut>(&self, scenario: Scenario, open_page: &F) -> ScenarioOutcome
    where
        D: PageDriver,
        F: Fn() -> Fut,
        Fut: Future<Output = ShopResult<D>>,
    {
        match open_page().await {
            Ok(driver) => self.run(scenario, &driver).await,
            Err(e) => {
                tracing::error!(scenario = scenario.id(), error = %e, "could not open a page");
                let mut outcome = ScenarioOutcome::new(scenario);
                outcome.status = ScenarioStatus::Failed;
                outcome.error = Some(e.to_string());
                outcome
            }
        }
    }

    fn rng(&self) -> StdRng {
        self.seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64)
    }

    async fn body<D: PageDriver + ?Sized>(
        &self,
        scenario: Scenario,
        driver: &D,
        rec: &mut Recorder,
    ) -> ShopResult<()> {
        let ui = Interactions::new(driver, &self.config);
        let home = HomePage::new(ui);
        let cart = ShoppingCartPage::new(ui);
        let n = self.products_to_add;
        let mut rng = self.rng();

        if scenario == Scenario::AddProducts {
            rec.step("Navigate to home page", async {
                home.go_to_home().await?;
                let title = home.page_title().await?;
                ensure(title.contains("Demo Web Shop"), || {
                    format!("home page title '{title}' does not contain 'Demo Web Shop'")
                })
            })
            .await?;
        } else {
            rec.step("Navigate to home page", home.go_to_home()).await?;
        }

        let report = rec
            .step("Add laptops to cart", async {
                ProductCategoryPage::new(ui)
                    .add_until_minimum(n, &mut rng)
                    .await
            })
            .await?;
        tracing::info!(added = report.added, failures = report.failures, "cart filled");

        match scenario {
            Scenario::AddProducts => {
                rec.step("Verify cart item count", async {
                    let count = home.header_cart_count().await?;
                    ensure(count >= n, || {
                        format!("cart should have at least {n} items, header shows {count}")
                    })
                })
                .await
            }
            Scenario::CartToCheckout => {
                rec.step("Select shopping cart and view items", async {
                    home.go_to_shopping_cart().await?;
                    let title = cart.page_title().await?;
                    ensure(title.contains("Shopping Cart"), || {
                        format!("cart page title '{title}' does not contain 'Shopping Cart'")
                    })
                })
                .await?;
                rec.step("Verify products are in cart", verify_item_count(&cart, n))
                    .await?;
                rec.step("Accept terms and proceed to checkout", async {
                    cart.accept_terms_of_service().await?;
                    cart.proceed_to_checkout().await?;
                    BillingAddressPage::new(ui).acknowledge_guest_prompt().await?;
                    Ok(())
                })
                .await
            }
            Scenario::GuestCheckout => {
                rec.step("Go to cart and proceed to checkout", async {
                    home.go_to_shopping_cart().await?;
                    cart.accept_terms_of_service().await?;
                    cart.proceed_to_checkout().await
                })
                .await?;
                let confirmation = self.checkout(ui, rec).await?;
                rec.step("Verify order confirmation", async {
                    verify_order_number(&confirmation)
                })
                .await
            }
            Scenario::PriceValidation => {
                let subtotal = rec
                    .step("Verify cart", async {
                        home.go_to_shopping_cart().await?;
                        verify_item_count(&cart, n).await?;
                        for line in cart.lines().await? {
                            ensure(line.is_consistent(), || {
                                format!(
                                    "line '{}' shows {} for {} x {}",
                                    line.product_name,
                                    line.line_subtotal,
                                    line.quantity,
                                    line.unit_price
                                )
                            })?;
                        }
                        let totals = cart.totals().await?;
                        ensure(totals.is_consistent(), || {
                            format!(
                                "cart total {} is not subtotal {} + shipping {} + tax {}",
                                totals.total, totals.subtotal, totals.shipping, totals.tax
                            )
                        })?;
                        Ok(totals.subtotal)
                    })
                    .await?;
                rec.step("Proceed to checkout", async {
                    cart.accept_terms_of_service().await?;
                    cart.proceed_to_checkout().await
                })
                .await?;
                let confirmation = self.checkout(ui, rec).await?;
                rec.step("Verify order confirmation", async {
                    verify_order_number(&confirmation)?;
                    verify_order_total(&confirmation, subtotal)
                })
                .await
            }
        }
    }

    async fn checkout<D: PageDriver + ?Sized>(
        &self,
        ui: Interactions<'_, D>,
        rec: &mut Recorder,
    ) -> ShopResult<OrderConfirmation> {
        let site = DemoWebShop::new(ui);
        let mut checkout = CheckoutOrchestrator::new(&site).with_payment_method(self.payment);
        let result = rec
            .step("Complete guest checkout", checkout.complete_checkout(&self.profile))
            .await;
        rec.checkout_steps = checkout.into_steps();
        let confirmation = result?;
        rec.confirmation = Some(confirmation.clone());
        Ok(confirmation)
    }
}

async fn verify_item_count<D: PageDriver + ?Sized>(
    cart: &ShoppingCartPage<'_, D>,
    n: usize,
) -> ShopResult<()> {
    let count = cart.item_count().await?;
    ensure(count >= n, || {
        format!("cart should have at least {n} items, found {count}")
    })
}

fn verify_order_number(confirmation: &OrderConfirmation) -> ShopResult<()> {
    ensure(confirmation.numeric_order_number().is_some(), || {
        format!("order number '{}' is not numeric", confirmation.order_number)
    })
}

// Cash on delivery adds a fee, so the order total may exceed the cart
// subtotal but never fall below it.
fn verify_order_total(confirmation: &OrderConfirmation, cart_subtotal: Decimal) -> ShopResult<()> {
    match confirmation.order_total {
        Some(total) => ensure(total + CURRENCY_TOLERANCE >= cart_subtotal, || {
            format!("order total {total} is below cart subtotal {cart_subtotal}")
        }),
        None => {
            tracing::warn!("order total not shown on the completed page");
            Ok(())
        }
    }
}

async fn close_page<D: PageDriver + ?Sized>(driver: &D) {
    match driver.close().await {
        Ok(()) => tracing::debug!("page closed"),
        Err(e) if e.is_page_closed() => tracing::debug!("page was already closed"),
        Err(e) => tracing::warn!(error = %e, "closing the page failed"),
    }
}
