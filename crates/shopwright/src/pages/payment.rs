//! Payment method and payment information steps.

use crate::driver::PageDriver;
use crate::locator::Selector;
use crate::model::PaymentMethod;
use crate::page_object::{Interactions, PageObject};
use crate::pages::selectors;
use crate::result::ShopResult;

/// Payment method step
#[derive(Debug)]
pub struct PaymentMethodPage<'a, D: PageDriver + ?Sized> {
    ui: Interactions<'a, D>,
}

impl<D: PageDriver + ?Sized> PageObject for PaymentMethodPage<'_, D> {
    fn url_pattern(&self) -> &str {
        "/onepagecheckout"
    }

    fn page_name(&self) -> &str {
        "Payment Method"
    }
}

impl<'a, D: PageDriver + ?Sized> PaymentMethodPage<'a, D> {
    /// Create the page object
    #[must_use]
    pub const fn new(ui: Interactions<'a, D>) -> Self {
        Self { ui }
    }

    /// Choose a payment method.
    ///
    /// The site preselects the first method, so a missing radio for the
    /// default choice is not an error.
    pub async fn choose(&self, method: PaymentMethod) -> ShopResult<()> {
        let radio = selectors::payment_method_radio(method);
        if method == PaymentMethod::default() && self.ui.driver().count(&radio).await? == 0 {
            tracing::debug!(%method, "payment radio not rendered, using preselected method");
            return Ok(());
        }
        self.ui
            .check_box(
                &radio,
                &format!("select {method}"),
                self.page_name(),
                self.ui.timings().payment_control,
            )
            .await
    }

    /// Press Continue
    pub async fn continue_to_payment_info(&self) -> ShopResult<()> {
        self.ui
            .click_button(
                &Selector::css(selectors::PAYMENT_METHOD_CONTINUE),
                "Continue",
                self.page_name(),
                self.ui.timings().payment_control,
            )
            .await?;
        self.ui.network_idle().await
    }
}

/// Payment information step; a pass-through for cash on delivery
#[derive(Debug)]
pub struct PaymentInformationPage<'a, D: PageDriver + ?Sized> {
    ui: Interactions<'a, D>,
}

impl<D: PageDriver + ?Sized> PageObject for PaymentInformationPage<'_, D> {
    fn url_pattern(&self) -> &str {
        "/onepagecheckout"
    }

    fn page_name(&self) -> &str {
        "Payment Information"
    }
}

impl<'a, D: PageDriver + ?Sized> PaymentInformationPage<'a, D> {
    /// Create the page object
    #[must_use]
    pub const fn new(ui: Interactions<'a, D>) -> Self {
        Self { ui }
    }

    /// Press Continue
    pub async fn continue_to_confirm(&self) -> ShopResult<()> {
        self.ui
            .click_button(
                &Selector::css(selectors::PAYMENT_INFO_CONTINUE),
                "Continue",
                self.page_name(),
                self.ui.timings().payment_control,
            )
            .await?;
        self.ui.network_idle().await
    }
}
