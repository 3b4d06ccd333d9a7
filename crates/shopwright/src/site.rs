//! Site adapter for the checkout walk.
//!
//! The orchestrator only knows [`CheckoutSite`]: one action per step plus a
//! readiness wait telling it the step's controls are on screen. All markup
//! knowledge sits behind the Demo Web Shop implementation.

use crate::checkout::CheckoutStep;
use crate::driver::PageDriver;
use crate::locator::Selector;
use crate::model::{GuestUserProfile, PaymentMethod};
use crate::page_object::Interactions;
use crate::pages::{
    selectors, BillingAddressPage, ConfirmOrderPage, PaymentInformationPage, PaymentMethodPage,
    PickupSelection, ShippingAddressPage,
};
use crate::result::ShopResult;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Per-step actions and readiness signals of a checkout
#[async_trait]
pub trait CheckoutSite: Send + Sync {
    /// Wait until the controls of `step` are on screen
    async fn wait_ready(&self, step: CheckoutStep) -> ShopResult<()>;

    /// Continue as guest if asked; returns whether the prompt was shown
    async fn acknowledge_guest_checkout(&self) -> ShopResult<bool>;

    /// Fill and submit the billing address
    async fn submit_billing_address(&self, profile: &GuestUserProfile) -> ShopResult<()>;

    /// Choose in-store pickup and continue
    async fn select_shipping_method(&self) -> ShopResult<PickupSelection>;

    /// Choose a payment method and continue
    async fn select_payment_method(&self, method: PaymentMethod) -> ShopResult<()>;

    /// Continue past payment information
    async fn submit_payment_information(&self) -> ShopResult<()>;

    /// Place the order
    async fn confirm_order(&self) -> ShopResult<()>;

    /// Order number on the completed page
    async fn order_number(&self) -> ShopResult<Option<String>>;

    /// Order total on the completed page
    async fn order_total(&self) -> ShopResult<Option<Decimal>>;
}

/// [`CheckoutSite`] for the Demo Web Shop one-page checkout
#[derive(Debug)]
pub struct DemoWebShop<'a, D: PageDriver + ?Sized> {
    ui: Interactions<'a, D>,
}

impl<'a, D: PageDriver + ?Sized> DemoWebShop<'a, D> {
    /// Create the adapter
    #[must_use]
    pub const fn new(ui: Interactions<'a, D>) -> Self {
        Self { ui }
    }

    /// Interaction helper shared with the page objects
    #[must_use]
    pub const fn interactions(&self) -> Interactions<'a, D> {
        self.ui
    }
}

#[async_trait]
impl<'a, D: PageDriver + ?Sized> CheckoutSite for DemoWebShop<'a, D> {
    async fn wait_ready(&self, step: CheckoutStep) -> ShopResult<()> {
        let timings = self.ui.timings();
        let (signal, timeout) = match step {
            CheckoutStep::GuestCheckout => return Ok(()),
            CheckoutStep::BillingAddress => (
                Selector::css(selectors::BILLING_FIRST_NAME),
                timings.control,
            ),
            CheckoutStep::ShippingMethod => (
                Selector::css(selectors::PICKUP_IN_STORE)
                    .or(Selector::css(selectors::SHIPPING_CONTINUE)),
                timings.control,
            ),
            CheckoutStep::PaymentMethod => (
                Selector::css(selectors::PAYMENT_METHOD_CONTINUE),
                timings.payment_control,
            ),
            CheckoutStep::PaymentInformation => (
                Selector::css(selectors::PAYMENT_INFO_CONTINUE),
                timings.payment_control,
            ),
            CheckoutStep::ConfirmOrder => {
                (Selector::css(selectors::CONFIRM_ORDER), timings.control)
            }
            // The order reader probes the label itself before its fallbacks.
            CheckoutStep::ExtractOrder => return Ok(()),
        };
        self.ui
            .wait_visible(&signal, &format!("reach {}", step.name()), timeout)
            .await
    }

    async fn acknowledge_guest_checkout(&self) -> ShopResult<bool> {
        BillingAddressPage::new(self.ui).acknowledge_guest_prompt().await
    }

    async fn submit_billing_address(&self, profile: &GuestUserProfile) -> ShopResult<()> {
        let page = BillingAddressPage::new(self.ui);
        page.fill_billing_address(profile).await?;
        page.continue_to_shipping().await
    }

    async fn select_shipping_method(&self) -> ShopResult<PickupSelection> {
        let page = ShippingAddressPage::new(self.ui);
        let selection = page.select_in_store_pickup().await?;
        page.continue_to_payment().await?;
        Ok(selection)
    }

    async fn select_payment_method(&self, method: PaymentMethod) -> ShopResult<()> {
        let page = PaymentMethodPage::new(self.ui);
        page.choose(method).await?;
        page.continue_to_payment_info().await
    }

    async fn submit_payment_information(&self) -> ShopResult<()> {
        PaymentInformationPage::new(self.ui)
            .continue_to_confirm()
            .await
    }

    async fn confirm_order(&self) -> ShopResult<()> {
        ConfirmOrderPage::new(self.ui).confirm_order().await
    }

    async fn order_number(&self) -> ShopResult<Option<String>> {
        ConfirmOrderPage::new(self.ui).order_number().await
    }

    async fn order_total(&self) -> ShopResult<Option<Decimal>> {
        ConfirmOrderPage::new(self.ui).order_total().await
    }
}
