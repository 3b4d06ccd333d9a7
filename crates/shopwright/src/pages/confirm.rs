//! Confirm order step and the order completed page.

use crate::driver::PageDriver;
use crate::extract::{find_amount, find_order_number, order_number_from_href};
use crate::locator::Selector;
use crate::page_object::{Interactions, PageObject};
use crate::pages::selectors;
use crate::result::ShopResult;
use rust_decimal::Decimal;

/// Confirm button and order result reader
#[derive(Debug)]
pub struct ConfirmOrderPage<'a, D: PageDriver + ?Sized> {
    ui: Interactions<'a, D>,
}

impl<D: PageDriver + ?Sized> PageObject for ConfirmOrderPage<'_, D> {
    fn url_pattern(&self) -> &str {
        "/checkout/completed"
    }

    fn page_name(&self) -> &str {
        "Confirm Order"
    }
}

impl<'a, D: PageDriver + ?Sized> ConfirmOrderPage<'a, D> {
    /// Create the page object
    #[must_use]
    pub const fn new(ui: Interactions<'a, D>) -> Self {
        Self { ui }
    }

    /// Place the order. Never retried.
    pub async fn confirm_order(&self) -> ShopResult<()> {
        self.ui
            .click_button(
                &Selector::css(selectors::CONFIRM_ORDER),
                "Confirm Order",
                self.page_name(),
                self.ui.timings().control,
            )
            .await?;
        self.ui.network_idle().await
    }

    /// Whether the completed page is showing its order number label
    pub async fn is_complete(&self) -> ShopResult<bool> {
        self.ui
            .probe_visible(
                &selectors::order_number_text(),
                self.ui.timings().confirmation_read,
            )
            .await
    }

    /// Order number shown after confirmation.
    ///
    /// Tries the labelled element, then the whole page, then the order
    /// details link. `None` when none of them carries a number.
    pub async fn order_number(&self) -> ShopResult<Option<String>> {
        let label = selectors::order_number_text();
        if self.is_complete().await? {
            let text = self.ui.text_of(&label).await?;
            if let Some(number) = find_order_number(&text) {
                return Ok(Some(number));
            }
        }

        let content = self.ui.driver().content().await?;
        if let Some(number) = find_order_number(&content) {
            tracing::debug!("order number read from page content");
            return Ok(Some(number));
        }

        let href = self
            .ui
            .driver()
            .attribute(&selectors::order_details_link(), "href")
            .await?;
        let number = href.as_deref().and_then(order_number_from_href);
        if number.is_some() {
            tracing::debug!("order number read from order details link");
        } else {
            tracing::warn!("no order number on the completed page");
        }
        Ok(number)
    }

    /// Order total, `None` when the total section is not rendered
    pub async fn order_total(&self) -> ShopResult<Option<Decimal>> {
        let cell = selectors::order_total_value();
        if self.ui.driver().count(&cell).await? == 0 {
            return Ok(None);
        }
        Ok(find_amount(&self.ui.text_of(&cell).await?))
    }

    /// Follow the order details link
    pub async fn open_order_details(&self) -> ShopResult<()> {
        self.ui
            .click_button(
                &selectors::order_details_link(),
                "order details",
                "Order Completed",
                self.ui.timings().control,
            )
            .await?;
        self.ui.network_idle().await
    }

    /// Title of the current page
    pub async fn page_title(&self) -> ShopResult<String> {
        self.ui.driver().title().await
    }
}
