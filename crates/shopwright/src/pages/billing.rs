//! Guest prompt and billing address step of the one-page checkout.

use crate::driver::PageDriver;
use crate::locator::{SelectBy, Selector};
use crate::model::GuestUserProfile;
use crate::page_object::{Interactions, PageObject};
use crate::pages::selectors;
use crate::result::ShopResult;
use crate::wait::{self, WaitOptions};

/// Billing address form, including the optional "Checkout as Guest" prompt
#[derive(Debug)]
pub struct BillingAddressPage<'a, D: PageDriver + ?Sized> {
    ui: Interactions<'a, D>,
}

impl<D: PageDriver + ?Sized> PageObject for BillingAddressPage<'_, D> {
    fn url_pattern(&self) -> &str {
        "/onepagecheckout"
    }

    fn page_name(&self) -> &str {
        "Billing Address"
    }
}

impl<'a, D: PageDriver + ?Sized> BillingAddressPage<'a, D> {
    /// Create the page object
    #[must_use]
    pub const fn new(ui: Interactions<'a, D>) -> Self {
        Self { ui }
    }

    /// Press "Checkout as Guest" if the login prompt is shown.
    ///
    /// Returns whether the prompt was present. Absence is not an error.
    pub async fn acknowledge_guest_prompt(&self) -> ShopResult<bool> {
        let prompt = Selector::css(selectors::GUEST_CHECKOUT);
        if !self
            .ui
            .probe_visible(&prompt, self.ui.timings().guest_prompt_probe)
            .await?
        {
            tracing::debug!("guest checkout prompt not shown");
            return Ok(false);
        }
        self.ui
            .click_button(
                &prompt,
                "Checkout as Guest",
                "Checkout",
                self.ui.timings().control,
            )
            .await?;
        self.ui.network_idle().await?;
        Ok(true)
    }

    /// Whether the billing form is on screen
    pub async fn is_ready(&self) -> ShopResult<bool> {
        self.ui
            .driver()
            .is_visible(&Selector::css(selectors::BILLING_FIRST_NAME))
            .await
    }

    /// Fill every billing field from the profile
    pub async fn fill_billing_address(&self, profile: &GuestUserProfile) -> ShopResult<()> {
        profile.validate()?;
        let page = self.page_name();

        self.fill(selectors::BILLING_FIRST_NAME, "First Name", &profile.first_name)
            .await?;
        self.fill(selectors::BILLING_LAST_NAME, "Last Name", &profile.last_name)
            .await?;
        self.fill(selectors::BILLING_EMAIL, "Email", &profile.email)
            .await?;
        self.fill(selectors::BILLING_COMPANY, "Company", &profile.company)
            .await?;

        self.ui
            .select_dropdown(
                &Selector::css(selectors::BILLING_COUNTRY),
                "Country",
                page,
                &SelectBy::Label(profile.country.clone()),
            )
            .await?;
        if !profile.state.trim().is_empty() {
            self.select_state(&profile.state).await?;
        }

        self.fill(selectors::BILLING_CITY, "City", &profile.city).await?;
        self.fill(selectors::BILLING_ADDRESS1, "Address 1", &profile.address1)
            .await?;
        self.fill(selectors::BILLING_ADDRESS2, "Address 2", &profile.address2)
            .await?;
        self.fill(selectors::BILLING_ZIP, "Zip / Postal Code", &profile.zip_code)
            .await?;
        self.fill(selectors::BILLING_PHONE, "Phone Number", &profile.phone_number)
            .await?;
        if let Some(fax) = &profile.fax_number {
            self.fill(selectors::BILLING_FAX, "Fax Number", fax).await?;
        }
        Ok(())
    }

    /// Press Continue
    pub async fn continue_to_shipping(&self) -> ShopResult<()> {
        self.ui
            .click_button(
                &Selector::css(selectors::BILLING_CONTINUE),
                "Continue",
                self.page_name(),
                self.ui.timings().control,
            )
            .await?;
        self.ui.network_idle().await
    }

    async fn fill(&self, css: &str, field: &str, value: &str) -> ShopResult<()> {
        self.ui
            .fill_input(&Selector::css(css), field, self.page_name(), value)
            .await
    }

    // The state list is rebuilt by script after a country change.
    async fn select_state(&self, state: &str) -> ShopResult<()> {
        let dropdown = Selector::css(selectors::BILLING_STATE);
        let action = format!("select State / Province on {}", self.page_name());
        let options = WaitOptions::new(self.ui.timings().dependent_dropdown_timeout)
            .with_poll_interval(self.ui.timings().dependent_dropdown_poll);
        let driver = self.ui.driver();
        let listed = &dropdown;
        let waited = wait::require(&options, action, move || async move {
            let labels = driver.option_labels(listed).await?;
            Ok(labels.iter().any(|l| l == state))
        })
        .await?;
        tracing::debug!(elapsed_ms = waited.elapsed.as_millis() as u64, state, "state list ready");
        self.ui
            .select_dropdown(
                &dropdown,
                "State / Province",
                self.page_name(),
                &SelectBy::Label(state.to_string()),
            )
            .await
    }
}
