//! Shipping step: in-store pickup.
//!
//! This is the only place that falls back to scripting the page directly.
//! The checkbox is driven by an inline `onclick` handler that a synthetic
//! click does not always trigger.

use crate::driver::PageDriver;
use crate::locator::Selector;
use crate::page_object::{Interactions, PageObject};
use crate::pages::selectors;
use crate::result::{ShopError, ShopResult};
use crate::wait;

/// How the pickup checkbox ended up checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupSelection {
    /// It was checked when the step opened
    AlreadySelected,
    /// A native check did it
    Checked,
    /// The script fallback did it
    Scripted,
}

/// Shipping address step of the one-page checkout
#[derive(Debug)]
pub struct ShippingAddressPage<'a, D: PageDriver + ?Sized> {
    ui: Interactions<'a, D>,
}

impl<D: PageDriver + ?Sized> PageObject for ShippingAddressPage<'_, D> {
    fn url_pattern(&self) -> &str {
        "/onepagecheckout"
    }

    fn page_name(&self) -> &str {
        "Shipping Address"
    }
}

impl<'a, D: PageDriver + ?Sized> ShippingAddressPage<'a, D> {
    /// Create the page object
    #[must_use]
    pub const fn new(ui: Interactions<'a, D>) -> Self {
        Self { ui }
    }

    fn checkbox() -> Selector {
        Selector::css(selectors::PICKUP_IN_STORE)
    }

    /// Whether in-store pickup is checked
    pub async fn is_pickup_selected(&self) -> ShopResult<bool> {
        self.ui.driver().is_checked(&Self::checkbox()).await
    }

    async fn wait_checked(&self) -> ShopResult<bool> {
        let options = self.ui.options(self.ui.timings().pickup_toggle_timeout);
        let checkbox = Self::checkbox();
        let driver = self.ui.driver();
        let checkbox = &checkbox;
        let result = wait::poll_until(&options, "pickup checked", move || {
            driver.is_checked(checkbox)
        })
        .await?;
        Ok(result.success)
    }

    /// Make sure in-store pickup is checked, touching it only when it is not
    pub async fn select_in_store_pickup(&self) -> ShopResult<PickupSelection> {
        let action = format!("select In-Store Pickup on {}", self.page_name());
        let checkbox = Self::checkbox();
        self.ui
            .wait_visible(&checkbox, &action, self.ui.timings().control)
            .await?;
        if self.is_pickup_selected().await? {
            tracing::debug!("in-store pickup already selected");
            return Ok(PickupSelection::AlreadySelected);
        }

        self.ui.driver().scroll_into_view(&checkbox).await?;
        match self.ui.driver().check(&checkbox).await {
            Ok(()) => {
                if self.wait_checked().await? {
                    return Ok(PickupSelection::Checked);
                }
            }
            Err(e) if e.is_page_closed() => return Err(e),
            Err(e) => tracing::debug!(error = %e, "native pickup check failed"),
        }

        tracing::warn!("pickup checkbox did not stick, toggling through page script");
        self.ui
            .driver()
            .evaluate(selectors::PICKUP_TOGGLE_SCRIPT)
            .await?;
        if self.wait_checked().await? {
            Ok(PickupSelection::Scripted)
        } else {
            Err(ShopError::interaction(
                action,
                "checkbox stayed unchecked after script toggle",
            ))
        }
    }

    /// Press Continue
    pub async fn continue_to_payment(&self) -> ShopResult<()> {
        let button = Selector::css(selectors::SHIPPING_CONTINUE);
        // Only scroll when present; absence is reported by the click wait.
        if self.ui.driver().count(&button).await? > 0 {
            self.ui.driver().scroll_into_view(&button).await?;
        }
        self.ui
            .click_button(
                &button,
                "Continue",
                self.page_name(),
                self.ui.timings().control,
            )
            .await?;
        self.ui.network_idle().await
    }
}
