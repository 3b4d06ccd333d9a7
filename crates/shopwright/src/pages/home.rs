//! Home page and site header.

use crate::driver::PageDriver;
use crate::extract::parse_cart_badge;
use crate::page_object::{Interactions, PageObject};
use crate::pages::selectors;
use crate::result::ShopResult;
use crate::wait;

/// Home page, top menu and header cart link
#[derive(Debug)]
pub struct HomePage<'a, D: PageDriver + ?Sized> {
    ui: Interactions<'a, D>,
}

impl<D: PageDriver + ?Sized> PageObject for HomePage<'_, D> {
    fn url_pattern(&self) -> &str {
        "/"
    }

    fn page_name(&self) -> &str {
        "Home"
    }
}

impl<'a, D: PageDriver + ?Sized> HomePage<'a, D> {
    /// Create the page object
    #[must_use]
    pub const fn new(ui: Interactions<'a, D>) -> Self {
        Self { ui }
    }

    /// Open the shop's root page
    pub async fn go_to_home(&self) -> ShopResult<()> {
        self.ui.open("").await?;
        self.ui.network_idle().await
    }

    /// Title of the current page
    pub async fn page_title(&self) -> ShopResult<String> {
        self.ui.driver().title().await
    }

    /// Open the Computers category from the top menu
    pub async fn go_to_computers(&self) -> ShopResult<()> {
        self.ui
            .click_button(
                &selectors::top_menu("Computers"),
                "Computers",
                self.page_name(),
                self.ui.timings().control,
            )
            .await?;
        self.ui.network_idle().await
    }

    /// Open Notebooks through the Computers menu
    pub async fn go_to_notebooks(&self) -> ShopResult<()> {
        self.ui.driver().hover(&selectors::top_menu("Computers")).await?;
        wait::settle(self.ui.timings().menu_hover).await;
        self.ui
            .click_button(
                &selectors::category_link("Notebooks"),
                "Notebooks",
                self.page_name(),
                self.ui.timings().control,
            )
            .await?;
        self.ui.network_idle().await
    }

    /// Item count shown in the header cart link, zero when unreadable
    pub async fn header_cart_count(&self) -> ShopResult<usize> {
        Ok(parse_cart_badge(&self.ui.text_of(&selectors::header_cart()).await?))
    }

    /// Open the shopping cart from the header link
    pub async fn go_to_shopping_cart(&self) -> ShopResult<()> {
        let link = selectors::header_cart();
        self.ui.driver().scroll_into_view(&link).await?;
        self.ui
            .click_button(&link, "Shopping cart", self.page_name(), self.ui.timings().control)
            .await?;
        self.ui.network_idle().await
    }
}
