//! Product listing and product detail pages.

use crate::driver::PageDriver;
use crate::locator::{SelectBy, Selector};
use crate::model::ProductConfiguration;
use crate::page_object::{Interactions, PageObject};
use crate::pages::selectors;
use crate::result::{ShopError, ShopResult};
use crate::wait;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Listing path the accumulation loop works from
pub const NOTEBOOKS_PATH: &str = "notebooks";

/// Product whose detail page needs attribute choices before it can be added
pub const CONFIGURABLE_COMPUTER: &str = "Build your own cheap computer";

/// Outcome of [`ProductCategoryPage::add_until_minimum`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccumulationReport {
    /// Products added successfully
    pub added: usize,
    /// Failed add attempts
    pub failures: usize,
    /// Add-to-cart buttons seen on the last pass
    pub available: usize,
}

impl AccumulationReport {
    /// Whether the loop reached `required` additions
    #[must_use]
    pub const fn reached(&self, required: usize) -> bool {
        self.added >= required
    }
}

/// Category listing and product detail pages
#[derive(Debug)]
pub struct ProductCategoryPage<'a, D: PageDriver + ?Sized> {
    ui: Interactions<'a, D>,
}

impl<D: PageDriver + ?Sized> PageObject for ProductCategoryPage<'_, D> {
    fn url_pattern(&self) -> &str {
        "/notebooks"
    }

    fn page_name(&self) -> &str {
        "Notebooks"
    }
}

impl<'a, D: PageDriver + ?Sized> ProductCategoryPage<'a, D> {
    /// Create the page object
    #[must_use]
    pub const fn new(ui: Interactions<'a, D>) -> Self {
        Self { ui }
    }

    /// Add random notebooks from the listing until `min` were added.
    ///
    /// Each pass counts the listing's add-to-cart buttons and clicks one at
    /// random. A failed click is retried without reloading the page; more
    /// than `Timings::max_add_failures` failures abort the loop. An empty
    /// listing ends the loop early with whatever was added so far.
    pub async fn add_until_minimum<R: Rng>(
        &self,
        min: usize,
        rng: &mut R,
    ) -> ShopResult<AccumulationReport> {
        let timings = self.ui.timings();
        let buttons = Selector::css(selectors::LISTING_ADD_TO_CART);
        let mut report = AccumulationReport::default();

        tracing::info!(min, "adding notebooks to cart");
        self.ui.open(NOTEBOOKS_PATH).await?;

        while report.added < min {
            report.available = self.ui.driver().count(&buttons).await?;
            if report.available == 0 {
                tracing::warn!(added = report.added, "no notebooks available to add");
                break;
            }

            let index = rng.random_range(0..report.available);
            let button = buttons.clone().nth(i32::try_from(index).unwrap_or(i32::MAX));
            let attempt = self
                .ui
                .click_button(&button, "Add to cart", self.page_name(), timings.add_button_visible)
                .await;

            match attempt {
                Ok(()) => {
                    report.added += 1;
                    tracing::info!(added = report.added, min, index, "notebook added");
                    wait::settle(timings.add_settle).await;
                }
                Err(e) if e.is_page_closed() => return Err(e),
                Err(e) => {
                    report.failures += 1;
                    tracing::warn!(failures = report.failures, error = %e, "add to cart failed, retrying");
                    if report.failures > timings.max_add_failures {
                        return Err(ShopError::AccumulationExhausted {
                            added: report.added,
                            required: min,
                            failures: report.failures,
                        });
                    }
                    wait::settle(timings.add_retry).await;
                }
            }
        }

        tracing::info!(added = report.added, failures = report.failures, "accumulation finished");
        Ok(report)
    }

    /// Add one product through its detail page, then return to the listing
    pub async fn add_product_to_cart(
        &self,
        name: &str,
        quantity: u32,
        configuration: Option<&ProductConfiguration>,
    ) -> ShopResult<()> {
        let timings = self.ui.timings();
        self.ui
            .click_button(
                &selectors::product_title_link(name),
                name,
                self.page_name(),
                timings.control,
            )
            .await?;
        self.ui.network_idle().await?;

        if name.contains(CONFIGURABLE_COMPUTER) {
            let default = ProductConfiguration::default();
            self.configure(configuration.unwrap_or(&default)).await?;
        }

        if quantity > 1 {
            self.ui
                .fill_input(
                    &Selector::css(selectors::DETAIL_QUANTITY),
                    "Quantity",
                    name,
                    &quantity.to_string(),
                )
                .await?;
        }

        self.ui
            .click_button(
                &Selector::css(selectors::DETAIL_ADD_TO_CART),
                "Add to cart",
                name,
                timings.control,
            )
            .await?;
        self.ui
            .wait_visible(
                &Selector::css(selectors::SUCCESS_BAR),
                &format!("see confirmation for {name}"),
                timings.add_notification,
            )
            .await?;

        let close = Selector::css(selectors::SUCCESS_BAR_CLOSE);
        if self.ui.driver().is_visible(&close).await? {
            self.ui.driver().click(&close).await?;
        }

        self.ui.driver().go_back().await?;
        self.ui.network_idle().await
    }

    async fn configure(&self, configuration: &ProductConfiguration) -> ShopResult<()> {
        let page = CONFIGURABLE_COMPUTER;
        for (selector, field, label) in [
            (selectors::ATTRIBUTE_RAM, "RAM", configuration.ram.as_str()),
            (selectors::ATTRIBUTE_HDD, "HDD", configuration.hdd.as_str()),
            (selectors::ATTRIBUTE_PROCESSOR, "Processor", configuration.processor.as_str()),
        ] {
            self.ui
                .select_dropdown(
                    &Selector::css(selector),
                    field,
                    page,
                    &SelectBy::Label(label.to_string()),
                )
                .await?;
        }
        wait::settle(self.ui.timings().attribute_settle).await;
        Ok(())
    }

    /// Listed price of a product, zero when unreadable
    pub async fn product_price(&self, name: &str) -> ShopResult<Decimal> {
        self.ui.amount_of(&selectors::product_price(name)).await
    }
}
