//! Shopping cart page.
//!
//! Read-only queries are recomputed from the page on every call; nothing is
//! cached between them.

use crate::driver::PageDriver;
use crate::extract::parse_quantity;
use crate::locator::Selector;
use crate::model::{CartLine, CartTotals, ProductData};
use crate::page_object::{Interactions, PageObject};
use crate::pages::selectors;
use crate::result::ShopResult;
use rust_decimal::Decimal;

/// Cart state reader and checkout entry point
#[derive(Debug)]
pub struct ShoppingCartPage<'a, D: PageDriver + ?Sized> {
    ui: Interactions<'a, D>,
}

impl<D: PageDriver + ?Sized> PageObject for ShoppingCartPage<'_, D> {
    fn url_pattern(&self) -> &str {
        "/cart"
    }

    fn page_name(&self) -> &str {
        "Shopping Cart"
    }
}

impl<'a, D: PageDriver + ?Sized> ShoppingCartPage<'a, D> {
    /// Create the page object
    #[must_use]
    pub const fn new(ui: Interactions<'a, D>) -> Self {
        Self { ui }
    }

    /// Open the cart directly
    pub async fn go_to_cart(&self) -> ShopResult<()> {
        self.ui.open("cart").await?;
        self.ui.network_idle().await
    }

    /// Title of the current page
    pub async fn page_title(&self) -> ShopResult<String> {
        self.ui.driver().title().await
    }

    async fn row_count(&self) -> ShopResult<usize> {
        self.ui
            .driver()
            .count(&Selector::css(selectors::CART_ROW))
            .await
    }

    /// Total quantity in the cart.
    ///
    /// Sums the quantity inputs of every row, counting an unreadable value as
    /// one, and never reports fewer than the number of rows. A closed page is
    /// an error, not an unreadable value.
    pub async fn item_count(&self) -> ShopResult<usize> {
        let rows = self.row_count().await?;
        if rows == 0 {
            return Ok(0);
        }
        let mut total = 0usize;
        for i in 0..rows {
            let value = match self
                .ui
                .driver()
                .input_value(&selectors::nth_row_cell(i, selectors::CART_QUANTITY))
                .await
            {
                Ok(value) => value,
                Err(e) if e.is_page_closed() => return Err(e),
                Err(e) => {
                    tracing::debug!(row = i, error = %e, "unreadable cart quantity");
                    None
                }
            };
            total += parse_quantity(value.as_deref()) as usize;
        }
        Ok(total.max(rows))
    }

    /// Every cart row
    pub async fn lines(&self) -> ShopResult<Vec<CartLine>> {
        let rows = self.row_count().await?;
        let mut lines = Vec::with_capacity(rows);
        for i in 0..rows {
            let quantity = self
                .ui
                .driver()
                .input_value(&selectors::nth_row_cell(i, selectors::CART_QUANTITY))
                .await?;
            lines.push(CartLine {
                product_name: self
                    .ui
                    .text_of(&selectors::nth_row_cell(i, selectors::CART_PRODUCT_NAME))
                    .await?,
                unit_price: self
                    .ui
                    .amount_of(&selectors::nth_row_cell(i, selectors::CART_UNIT_PRICE))
                    .await?,
                quantity: parse_quantity(quantity.as_deref()),
                line_subtotal: self
                    .ui
                    .amount_of(&selectors::nth_row_cell(i, selectors::CART_SUBTOTAL))
                    .await?,
            });
        }
        Ok(lines)
    }

    /// Quantity of the row whose text contains `name`, zero when unreadable
    pub async fn product_quantity(&self, name: &str) -> ShopResult<u32> {
        let value = self
            .ui
            .driver()
            .attribute(
                &selectors::cart_row_cell(name, selectors::CART_QUANTITY),
                "value",
            )
            .await?;
        Ok(value
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0))
    }

    /// Unit price of a product's row
    pub async fn product_unit_price(&self, name: &str) -> ShopResult<Decimal> {
        self.ui
            .amount_of(&selectors::cart_row_cell(name, selectors::CART_UNIT_PRICE))
            .await
    }

    /// Line total of a product's row
    pub async fn product_line_total(&self, name: &str) -> ShopResult<Decimal> {
        self.ui
            .amount_of(&selectors::cart_row_cell(name, selectors::CART_SUBTOTAL))
            .await
    }

    /// Sub-Total summary value
    pub async fn subtotal(&self) -> ShopResult<Decimal> {
        self.ui.amount_of(&selectors::cart_summary_value("Sub-Total")).await
    }

    /// Shipping summary value
    pub async fn shipping(&self) -> ShopResult<Decimal> {
        self.ui.amount_of(&selectors::cart_summary_value("Shipping")).await
    }

    /// Tax summary value
    pub async fn tax(&self) -> ShopResult<Decimal> {
        self.ui.amount_of(&selectors::cart_summary_value("Tax")).await
    }

    /// Total summary value
    pub async fn total(&self) -> ShopResult<Decimal> {
        self.ui.amount_of(&selectors::cart_summary_value("Total")).await
    }

    /// All summary values at once
    pub async fn totals(&self) -> ShopResult<CartTotals> {
        Ok(CartTotals {
            subtotal: self.subtotal().await?,
            shipping: self.shipping().await?,
            tax: self.tax().await?,
            total: self.total().await?,
        })
    }

    /// Whether every product has a visible row with the expected quantity
    pub async fn contains_products(&self, products: &[ProductData]) -> ShopResult<bool> {
        for product in products {
            if !self
                .ui
                .driver()
                .is_visible(&selectors::cart_row(&product.name))
                .await?
            {
                return Ok(false);
            }
            if self.product_quantity(&product.name).await? != product.quantity {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Sum of cart unit price times expected quantity
    pub async fn expected_total(&self, products: &[ProductData]) -> ShopResult<Decimal> {
        let mut total = Decimal::ZERO;
        for product in products {
            total += self.product_unit_price(&product.name).await? * Decimal::from(product.quantity);
        }
        Ok(total)
    }

    /// Tick the terms of service box
    pub async fn accept_terms_of_service(&self) -> ShopResult<()> {
        self.ui
            .check_box(
                &selectors::terms_checkbox(),
                "accept terms of service",
                self.page_name(),
                self.ui.timings().control,
            )
            .await
    }

    /// Press Checkout
    pub async fn proceed_to_checkout(&self) -> ShopResult<()> {
        self.ui
            .click_button(
                &Selector::css(selectors::CHECKOUT_BUTTON),
                "Checkout",
                self.page_name(),
                self.ui.timings().control,
            )
            .await?;
        self.ui.network_idle().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::driver::{MockDriver, MockElement};
    use proptest::prelude::*;
    use std::str::FromStr;

    fn config() -> SuiteConfig {
        SuiteConfig::new("https://shop.example").unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn add_row(driver: &MockDriver, index: usize, name: &str, qty: &str, unit: &str, line: &str) {
        driver.insert(selectors::CART_ROW, MockElement::new().with_text(name));
        driver.insert(
            selectors::nth_row_cell(index, selectors::CART_QUANTITY),
            MockElement::new().with_value(qty),
        );
        driver.insert(
            selectors::nth_row_cell(index, selectors::CART_PRODUCT_NAME),
            MockElement::new().with_text(name),
        );
        driver.insert(
            selectors::nth_row_cell(index, selectors::CART_UNIT_PRICE),
            MockElement::new().with_text(unit),
        );
        driver.insert(
            selectors::nth_row_cell(index, selectors::CART_SUBTOTAL),
            MockElement::new().with_text(line),
        );
        driver.insert(selectors::cart_row(name), MockElement::new());
        driver.insert(
            selectors::cart_row_cell(name, selectors::CART_QUANTITY),
            MockElement::new().with_attr("value", qty),
        );
        driver.insert(
            selectors::cart_row_cell(name, selectors::CART_UNIT_PRICE),
            MockElement::new().with_text(unit),
        );
        driver.insert(
            selectors::cart_row_cell(name, selectors::CART_SUBTOTAL),
            MockElement::new().with_text(line),
        );
    }

    fn product(name: &str, quantity: u32) -> ProductData {
        ProductData {
            category: "Notebooks".to_string(),
            name: name.to_string(),
            price: Decimal::ZERO,
            quantity,
            kind: "simple".to_string(),
            configuration: None,
        }
    }

    mod count_tests {
        use super::*;

        #[tokio::test]
        async fn test_empty_cart_counts_zero() {
            let driver = MockDriver::new();
            let config = config();
            let cart = ShoppingCartPage::new(Interactions::new(&driver, &config));
            assert_eq!(cart.item_count().await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_sums_quantities() {
            let driver = MockDriver::new();
            add_row(&driver, 0, "14.1-inch Laptop", "2", "1590.00", "3180.00");
            add_row(&driver, 1, "Asus N551JK", "3", "1500.00", "4500.00");
            let config = config();
            let cart = ShoppingCartPage::new(Interactions::new(&driver, &config));
            assert_eq!(cart.item_count().await.unwrap(), 5);
        }

        #[tokio::test]
        async fn test_unreadable_quantity_counts_one() {
            let driver = MockDriver::new();
            add_row(&driver, 0, "14.1-inch Laptop", "abc", "1590.00", "1590.00");
            add_row(&driver, 1, "Asus N551JK", "", "1500.00", "1500.00");
            let config = config();
            let cart = ShoppingCartPage::new(Interactions::new(&driver, &config));
            assert_eq!(cart.item_count().await.unwrap(), 2);
        }

        #[tokio::test]
        async fn test_missing_quantity_input_counts_one() {
            let driver = MockDriver::new();
            driver.insert(selectors::CART_ROW, MockElement::new());
            driver.insert(selectors::CART_ROW, MockElement::new());
            let config = config();
            let cart = ShoppingCartPage::new(Interactions::new(&driver, &config));
            assert_eq!(cart.item_count().await.unwrap(), 2);
        }

        #[tokio::test]
        async fn test_page_closed_mid_count_is_an_error() {
            let driver = MockDriver::new();
            add_row(&driver, 0, "14.1-inch Laptop", "2", "1590.00", "3180.00");
            add_row(&driver, 1, "Asus N551JK", "3", "1500.00", "4500.00");
            driver.close_after_calls(1);
            let config = config();
            let cart = ShoppingCartPage::new(Interactions::new(&driver, &config));
            let err = cart.item_count().await.unwrap_err();
            assert!(err.is_page_closed());
        }
    }

    mod row_tests {
        use super::*;

        #[tokio::test]
        async fn test_lines_are_consistent() {
            let driver = MockDriver::new();
            add_row(&driver, 0, "14.1-inch Laptop", "2", "$1,590.00", "$3,180.00");
            let config = config();
            let cart = ShoppingCartPage::new(Interactions::new(&driver, &config));
            let lines = cart.lines().await.unwrap();
            assert_eq!(lines.len(), 1);
            assert_eq!(lines[0].product_name, "14.1-inch Laptop");
            assert_eq!(lines[0].quantity, 2);
            assert_eq!(lines[0].unit_price, dec("1590.00"));
            assert!(lines[0].is_consistent());
        }

        #[tokio::test]
        async fn test_product_lookups() {
            let driver = MockDriver::new();
            add_row(&driver, 0, "14.1-inch Laptop", "2", "1590.00", "3180.00");
            let config = config();
            let cart = ShoppingCartPage::new(Interactions::new(&driver, &config));
            assert_eq!(cart.product_quantity("14.1-inch Laptop").await.unwrap(), 2);
            assert_eq!(
                cart.product_unit_price("14.1-inch Laptop").await.unwrap(),
                dec("1590.00")
            );
            assert_eq!(
                cart.product_line_total("14.1-inch Laptop").await.unwrap(),
                dec("3180.00")
            );
        }

        #[tokio::test]
        async fn test_unknown_product_reads_zero() {
            let driver = MockDriver::new();
            let config = config();
            let cart = ShoppingCartPage::new(Interactions::new(&driver, &config));
            assert_eq!(cart.product_quantity("Nothing").await.unwrap(), 0);
            assert_eq!(cart.product_unit_price("Nothing").await.unwrap(), Decimal::ZERO);
        }

        #[tokio::test]
        async fn test_contains_products_and_expected_total() {
            let driver = MockDriver::new();
            add_row(&driver, 0, "14.1-inch Laptop", "2", "1590.00", "3180.00");
            let config = config();
            let cart = ShoppingCartPage::new(Interactions::new(&driver, &config));

            let expected = [product("14.1-inch Laptop", 2)];
            assert!(cart.contains_products(&expected).await.unwrap());
            assert_eq!(cart.expected_total(&expected).await.unwrap(), dec("3180.00"));

            assert!(!cart
                .contains_products(&[product("14.1-inch Laptop", 1)])
                .await
                .unwrap());
            assert!(!cart
                .contains_products(&[product("Missing", 1)])
                .await
                .unwrap());
        }
    }

    mod totals_tests {
        use super::*;

        #[tokio::test]
        async fn test_summary_values() {
            let driver = MockDriver::new();
            for (label, value) in [
                ("Sub-Total", "3,180.00"),
                ("Shipping", "0.00"),
                ("Tax", "0.00"),
                ("Total", "3,180.00"),
            ] {
                driver.insert(
                    selectors::cart_summary_value(label),
                    MockElement::new().with_text(value),
                );
            }
            let config = config();
            let cart = ShoppingCartPage::new(Interactions::new(&driver, &config));
            let totals = cart.totals().await.unwrap();
            assert_eq!(totals.subtotal, dec("3180.00"));
            assert_eq!(totals.total, dec("3180.00"));
            assert!(totals.is_consistent());
        }

        #[tokio::test]
        async fn test_missing_summary_is_zero() {
            let driver = MockDriver::new();
            let config = config();
            let cart = ShoppingCartPage::new(Interactions::new(&driver, &config));
            assert_eq!(cart.totals().await.unwrap(), CartTotals::default());
        }
    }

    mod checkout_entry_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_terms_then_checkout() {
            let driver = MockDriver::new();
            driver.insert(selectors::terms_checkbox(), MockElement::new().checkbox(false));
            driver.insert(selectors::CHECKOUT_BUTTON, MockElement::new());
            let config = config();
            let cart = ShoppingCartPage::new(Interactions::new(&driver, &config));
            cart.accept_terms_of_service().await.unwrap();
            cart.proceed_to_checkout().await.unwrap();
            assert!(driver.is_checked(&selectors::terms_checkbox()).await.unwrap());
            assert!(driver.was_called("click:button#checkout"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_hidden_terms_box_names_action() {
            let driver = MockDriver::new();
            driver.insert(selectors::terms_checkbox(), MockElement::new().checkbox(false).hidden());
            let config = config();
            let cart = ShoppingCartPage::new(Interactions::new(&driver, &config));
            let err = cart.accept_terms_of_service().await.unwrap_err();
            assert_eq!(
                err.to_string(),
                "Failed to accept terms of service on Shopping Cart (timed out after 5000ms)"
            );
            assert!(!driver.was_called("check:"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_missing_checkout_button_names_action() {
            let driver = MockDriver::new();
            let config = config();
            let cart = ShoppingCartPage::new(Interactions::new(&driver, &config));
            let err = cart.proceed_to_checkout().await.unwrap_err();
            assert!(err
                .to_string()
                .starts_with("Failed to click Checkout on Shopping Cart"));
        }
    }

    mod property_tests {
        use super::*;

        proptest! {
            #[test]
            fn prop_count_at_least_rows(quantities in proptest::collection::vec("[0-9a-z]{0,2}", 0..6)) {
                let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
                let count = rt.block_on(async {
                    let driver = MockDriver::new();
                    for (i, q) in quantities.iter().enumerate() {
                        add_row(&driver, i, &format!("Laptop {i}"), q, "1.00", "1.00");
                    }
                    let config = config();
                    let cart = ShoppingCartPage::new(Interactions::new(&driver, &config));
                    cart.item_count().await.unwrap()
                });
                prop_assert!(count >= quantities.len());
                if quantities.is_empty() {
                    prop_assert_eq!(count, 0);
                }
            }
        }
    }
}
