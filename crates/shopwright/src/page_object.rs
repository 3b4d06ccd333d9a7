//! Page Object Model support.
//!
//! Page objects wrap a [`PageDriver`] and expose the shop's pages as typed
//! operations. Every click, fill and select goes through [`Interactions`],
//! which waits for the control and names the failed action in the error.

use crate::config::{SuiteConfig, Timings};
use crate::driver::PageDriver;
use crate::extract::extract_amount;
use crate::locator::{SelectBy, Selector};
use crate::result::{ShopError, ShopResult};
use crate::wait::{self, LoadState, WaitOptions};
use rust_decimal::Decimal;
use std::time::Duration;

/// Trait for page objects representing a page of the shop.
///
/// # Example
///
/// ```ignore
/// struct LoginPage<'a, D: PageDriver + ?Sized> {
///     ui: Interactions<'a, D>,
/// }
///
/// impl<D: PageDriver + ?Sized> PageObject for LoginPage<'_, D> {
///     fn url_pattern(&self) -> &str {
///         "/login"
///     }
///
///     fn page_name(&self) -> &str {
///         "Login"
///     }
/// }
/// ```
pub trait PageObject {
    /// URL pattern that matches this page (e.g., "/cart", "/onepagecheckout")
    fn url_pattern(&self) -> &str;

    /// Human-readable page or step name used in error messages
    fn page_name(&self) -> &str;

    /// Whether `url` belongs to this page
    fn matches_url(&self, url: &str) -> bool {
        url.contains(self.url_pattern())
    }
}

/// Shared interaction helper for page objects
#[derive(Debug)]
pub struct Interactions<'a, D: PageDriver + ?Sized> {
    driver: &'a D,
    config: &'a SuiteConfig,
}

impl<D: PageDriver + ?Sized> Clone for Interactions<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: PageDriver + ?Sized> Copy for Interactions<'_, D> {}

impl<'a, D: PageDriver + ?Sized> Interactions<'a, D> {
    /// Create a helper for a driver and suite configuration
    #[must_use]
    pub const fn new(driver: &'a D, config: &'a SuiteConfig) -> Self {
        Self { driver, config }
    }

    /// Underlying driver
    #[must_use]
    pub const fn driver(&self) -> &'a D {
        self.driver
    }

    /// Suite configuration
    #[must_use]
    pub const fn config(&self) -> &'a SuiteConfig {
        self.config
    }

    /// Wait timings
    #[must_use]
    pub const fn timings(&self) -> &'a Timings {
        &self.config.timings
    }

    /// Poll options for a timeout, using the configured poll interval
    #[must_use]
    pub fn options(&self, timeout: Duration) -> WaitOptions {
        WaitOptions::new(timeout).with_poll_interval(self.timings().poll_interval)
    }

    /// Open a site-relative path and wait for the load event
    pub async fn open(&self, path: &str) -> ShopResult<()> {
        let url = self.config.url(path);
        self.driver.goto(&url).await?;
        self.driver.wait_for_load(LoadState::Load).await
    }

    /// Wait for the network to go quiet after an action
    pub async fn network_idle(&self) -> ShopResult<()> {
        self.driver.wait_for_load(LoadState::NetworkIdle).await
    }

    /// Visibility probe that reports `false` instead of failing on timeout
    pub async fn probe_visible(&self, selector: &Selector, timeout: Duration) -> ShopResult<bool> {
        let options = self.options(timeout);
        let result = wait::poll_until(&options, format!("see {selector}"), || {
            self.driver.is_visible(selector)
        })
        .await?;
        Ok(result.success)
    }

    /// Wait until `selector` is visible or fail naming `action`
    pub async fn wait_visible(
        &self,
        selector: &Selector,
        action: &str,
        timeout: Duration,
    ) -> ShopResult<()> {
        let options = self.options(timeout);
        wait::require(&options, action, || self.driver.is_visible(selector))
            .await
            .map(|_| ())
    }

    /// Click a button, e.g. "click Continue on Billing Address"
    pub async fn click_button(
        &self,
        selector: &Selector,
        button: &str,
        page: &str,
        timeout: Duration,
    ) -> ShopResult<()> {
        let action = format!("click {button} on {page}");
        self.wait_visible(selector, &action, timeout).await?;
        tracing::debug!(%selector, "{action}");
        self.driver
            .click(selector)
            .await
            .map_err(|e| ShopError::interaction(action, e.to_string()))
    }

    /// Fill a text input, e.g. "fill First Name on Billing Address"
    pub async fn fill_input(
        &self,
        selector: &Selector,
        field: &str,
        page: &str,
        value: &str,
    ) -> ShopResult<()> {
        let action = format!("fill {field} on {page}");
        self.wait_visible(selector, &action, self.timings().control)
            .await?;
        self.driver
            .fill(selector, value)
            .await
            .map_err(|e| ShopError::interaction(action, e.to_string()))
    }

    /// Choose a dropdown option, e.g. "select Country on Billing Address"
    pub async fn select_dropdown(
        &self,
        selector: &Selector,
        field: &str,
        page: &str,
        by: &SelectBy,
    ) -> ShopResult<()> {
        let action = format!("select {field} on {page}");
        self.wait_visible(selector, &action, self.timings().control)
            .await?;
        self.driver
            .select_option(selector, by)
            .await
            .map_err(|e| ShopError::interaction(action, e.to_string()))
    }

    /// Tick a checkbox or radio, e.g. "select Credit Card on Payment Method"
    pub async fn check_box(
        &self,
        selector: &Selector,
        what: &str,
        page: &str,
        timeout: Duration,
    ) -> ShopResult<()> {
        let action = format!("{what} on {page}");
        self.wait_visible(selector, &action, timeout).await?;
        tracing::debug!(%selector, "{action}");
        self.driver
            .check(selector)
            .await
            .map_err(|e| ShopError::interaction(action, e.to_string()))
    }

    /// Trimmed text of the first match, empty when absent
    pub async fn text_of(&self, selector: &Selector) -> ShopResult<String> {
        Ok(self
            .driver
            .text_content(selector)
            .await?
            .map(|t| t.trim().to_string())
            .unwrap_or_default())
    }

    /// Amount shown by the first match, zero when absent or unparsable
    pub async fn amount_of(&self, selector: &Selector) -> ShopResult<Decimal> {
        Ok(extract_amount(&self.text_of(selector).await?))
    }
}
