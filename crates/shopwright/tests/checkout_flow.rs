//! End-to-end walks against a scripted in-memory Demo Web Shop.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use rand::rngs::StdRng;
use rand::SeedableRng;
use shopwright::checkout::StepStatus;
use shopwright::pages::{selectors, HomePage, ProductCategoryPage};
use shopwright::{
    CheckoutOrchestrator, CheckoutSite, CheckoutStep, DemoWebShop, Interactions, MockDom,
    MockDriver, MockElement, PageDriver, Scenario, ScenarioRunner, ScenarioStatus, Selector,
    ShopError, SuiteConfig, TestData,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const BASE: &str = "https://shop.example";
const ORDER_NUMBER: &str = "2207822";
const NOTEBOOK_PRICE: u32 = 1590;

#[derive(Debug, Clone, Copy, Default)]
struct Script {
    pickup_prechecked: bool,
    cart_emptied_at_shipping: bool,
}

fn css(s: &str) -> Selector {
    Selector::css(s)
}

fn header(count: usize) -> MockElement {
    MockElement::new().with_text(format!("Shopping cart ({count})"))
}

fn test_data() -> TestData {
    TestData::load(concat!(env!("CARGO_MANIFEST_DIR"), "/../../test-data/users.json")).unwrap()
}

fn config() -> SuiteConfig {
    SuiteConfig::new(BASE).unwrap()
}

fn cart_page(dom: &mut MockDom, count: usize) {
    dom.clear();
    dom.url = format!("{BASE}/cart");
    dom.title = "Demo Web Shop. Shopping Cart".to_string();
    dom.insert(&selectors::header_cart(), header(count));
    for i in 0..count {
        let name = format!("Notebook {i}");
        dom.insert(&css(selectors::CART_ROW), MockElement::new().with_text(&name));
        dom.insert(
            &selectors::nth_row_cell(i, selectors::CART_PRODUCT_NAME),
            MockElement::new().with_text(&name),
        );
        dom.insert(
            &selectors::nth_row_cell(i, selectors::CART_QUANTITY),
            MockElement::new().with_value("1"),
        );
        for cell in [selectors::CART_UNIT_PRICE, selectors::CART_SUBTOTAL] {
            dom.insert(
                &selectors::nth_row_cell(i, cell),
                MockElement::new().with_text(format!("{NOTEBOOK_PRICE}.00")),
            );
        }
    }
    let subtotal = format!("{}.00", NOTEBOOK_PRICE as usize * count);
    for (label, value) in [
        ("Sub-Total", subtotal.as_str()),
        ("Shipping", "0.00"),
        ("Tax", "0.00"),
        ("Total", subtotal.as_str()),
    ] {
        dom.insert(
            &selectors::cart_summary_value(label),
            MockElement::new().with_text(value),
        );
    }
    dom.insert(&selectors::terms_checkbox(), MockElement::new().checkbox(false));
    dom.insert(&css(selectors::CHECKOUT_BUTTON), MockElement::new());
}

fn billing_form(dom: &mut MockDom) {
    dom.clear();
    dom.url = format!("{BASE}/onepagecheckout");
    for field in [
        selectors::BILLING_FIRST_NAME,
        selectors::BILLING_LAST_NAME,
        selectors::BILLING_EMAIL,
        selectors::BILLING_COMPANY,
        selectors::BILLING_CITY,
        selectors::BILLING_ADDRESS1,
        selectors::BILLING_ADDRESS2,
        selectors::BILLING_ZIP,
        selectors::BILLING_PHONE,
        selectors::BILLING_FAX,
        selectors::BILLING_CONTINUE,
    ] {
        dom.insert(&css(field), MockElement::new());
    }
    dom.insert(
        &css(selectors::BILLING_COUNTRY),
        MockElement::new().with_options([("Select country", "0"), ("United States", "1")]),
    );
    dom.insert(
        &css(selectors::BILLING_STATE),
        MockElement::new().with_options([("Other (Non US)", "0")]),
    );
}

fn completed_page(dom: &mut MockDom) {
    dom.clear();
    dom.url = format!("{BASE}/checkout/completed/");
    dom.title = "Demo Web Shop. Checkout".to_string();
    dom.content = format!("<ul><li>Order number: {ORDER_NUMBER}</li></ul>");
    dom.insert(
        &selectors::order_number_text(),
        MockElement::new().with_text(format!("Order number: {ORDER_NUMBER}")),
    );
    dom.insert(
        &selectors::order_details_link(),
        MockElement::new().with_attr("href", format!("/orderdetails/{ORDER_NUMBER}")),
    );
}

/// Wire page scripts so clicks move through the shop like the real site
fn install_shop(driver: &MockDriver, script: Script) -> Arc<AtomicUsize> {
    let added = Arc::new(AtomicUsize::new(0));

    let count = Arc::clone(&added);
    driver.on_goto(format!("{BASE}/"), move |dom| {
        dom.title = "Demo Web Shop".to_string();
        dom.insert(&selectors::header_cart(), header(count.load(Ordering::SeqCst)));
    });

    let count = Arc::clone(&added);
    driver.on_goto(format!("{BASE}/notebooks"), move |dom| {
        dom.title = "Demo Web Shop. Notebooks".to_string();
        for _ in 0..5 {
            dom.insert(&css(selectors::LISTING_ADD_TO_CART), MockElement::new());
        }
        dom.insert(&selectors::header_cart(), header(count.load(Ordering::SeqCst)));
    });

    let count = Arc::clone(&added);
    driver.on_click(selectors::LISTING_ADD_TO_CART, move |dom| {
        let n = count.fetch_add(1, Ordering::SeqCst) + 1;
        dom.set(&selectors::header_cart(), vec![header(n)]);
    });

    let count = Arc::clone(&added);
    driver.on_click(selectors::header_cart(), move |dom| {
        cart_page(dom, count.load(Ordering::SeqCst));
    });

    driver.on_click(selectors::CHECKOUT_BUTTON, |dom| {
        dom.clear();
        dom.url = format!("{BASE}/login/checkoutasguest");
        dom.insert(&css(selectors::GUEST_CHECKOUT), MockElement::new());
    });

    driver.on_click(selectors::GUEST_CHECKOUT, billing_form);

    driver.on_change(selectors::BILLING_COUNTRY, |dom| {
        dom.set(
            &css(selectors::BILLING_STATE),
            vec![MockElement::new().with_options([("New Jersey", "40"), ("New York", "41")])],
        );
    });

    driver.on_click(selectors::BILLING_CONTINUE, move |dom| {
        dom.insert(
            &css(selectors::PICKUP_IN_STORE),
            MockElement::new().checkbox(script.pickup_prechecked),
        );
        dom.insert(&css(selectors::SHIPPING_CONTINUE), MockElement::new());
    });

    driver.on_click(selectors::SHIPPING_CONTINUE, move |dom| {
        if script.cart_emptied_at_shipping {
            return;
        }
        dom.insert(
            &selectors::payment_method_radio(shopwright::PaymentMethod::CashOnDelivery),
            MockElement::new().with_attr("type", "radio"),
        );
        dom.insert(&css(selectors::PAYMENT_METHOD_CONTINUE), MockElement::new());
    });

    driver.on_click(selectors::PAYMENT_METHOD_CONTINUE, |dom| {
        dom.insert(&css(selectors::PAYMENT_INFO_CONTINUE), MockElement::new());
    });

    driver.on_click(selectors::PAYMENT_INFO_CONTINUE, |dom| {
        dom.insert(&css(selectors::CONFIRM_ORDER), MockElement::new());
    });

    driver.on_click(selectors::CONFIRM_ORDER, completed_page);

    added
}

/// Put products in the cart and press Checkout
async fn reach_checkout(driver: &MockDriver, config: &SuiteConfig, products: usize) {
    let ui = Interactions::new(driver, config);
    let mut rng = StdRng::seed_from_u64(11);
    HomePage::new(ui).go_to_home().await.unwrap();
    ProductCategoryPage::new(ui)
        .add_until_minimum(products, &mut rng)
        .await
        .unwrap();
    let home = HomePage::new(ui);
    home.go_to_shopping_cart().await.unwrap();
    let cart = shopwright::pages::ShoppingCartPage::new(ui);
    cart.accept_terms_of_service().await.unwrap();
    cart.proceed_to_checkout().await.unwrap();
}

mod scenario_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_every_scenario_passes() {
        let data = test_data();
        let runner = ScenarioRunner::new(config(), data.guest_user).with_seed(3);
        for scenario in Scenario::ALL {
            let driver = MockDriver::new();
            install_shop(&driver, Script::default());
            let outcome = runner.run(scenario, &driver).await;
            assert!(
                outcome.passed(),
                "{} failed at {:?}: {:?}",
                scenario.id(),
                outcome.failed_step(),
                outcome.error
            );
            assert_eq!(outcome.confirmation.is_some(), scenario.places_order());
            assert!(driver.was_called("close"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_guest_checkout_reports_order_and_steps() {
        let driver = MockDriver::new();
        install_shop(&driver, Script::default());
        let runner = ScenarioRunner::new(config(), test_data().guest_user).with_seed(5);
        let outcome = runner.run(Scenario::GuestCheckout, &driver).await;

        let confirmation = outcome.confirmation.clone().unwrap();
        assert_eq!(confirmation.order_number, ORDER_NUMBER);
        assert_eq!(confirmation.order_total, None);
        assert_eq!(outcome.checkout_steps.len(), CheckoutStep::ALL.len());
        assert!(outcome
            .checkout_steps
            .iter()
            .all(|s| s.status == StepStatus::Passed));
        assert_eq!(driver.call_count(&format!("click:{}", selectors::CONFIRM_ORDER)), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_runs_use_separate_pages() {
        let runner = ScenarioRunner::new(config(), test_data().guest_user).with_seed(9);
        let outcomes = runner
            .run_all(&Scenario::ALL, true, || async {
                let driver = MockDriver::new();
                install_shop(&driver, Script::default());
                Ok::<_, ShopError>(driver)
            })
            .await;
        assert_eq!(outcomes.len(), 4);
        assert!(outcomes.iter().all(|o| o.status == ScenarioStatus::Passed));
        let ids: Vec<_> = outcomes.iter().map(|o| o.scenario.id()).collect();
        assert_eq!(ids, ["TC001", "TC002", "TC003", "TC004"]);
    }
}

mod checkout_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_billing_submission_lands_on_shipping() {
        let driver = MockDriver::new();
        install_shop(&driver, Script::default());
        let config = config();
        reach_checkout(&driver, &config, 1).await;

        let site = DemoWebShop::new(Interactions::new(&driver, &config));
        assert!(site.acknowledge_guest_checkout().await.unwrap());
        site.wait_ready(CheckoutStep::BillingAddress).await.unwrap();
        site.submit_billing_address(&test_data().guest_user)
            .await
            .unwrap();
        site.wait_ready(CheckoutStep::ShippingMethod).await.unwrap();
        assert!(driver
            .is_visible(&css(selectors::PICKUP_IN_STORE))
            .await
            .unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_prechecked_pickup_is_not_toggled() {
        let driver = MockDriver::new();
        install_shop(
            &driver,
            Script {
                pickup_prechecked: true,
                ..Script::default()
            },
        );
        let config = config();
        reach_checkout(&driver, &config, 1).await;

        let site = DemoWebShop::new(Interactions::new(&driver, &config));
        let mut checkout = CheckoutOrchestrator::new(&site);
        let confirmation = checkout
            .complete_checkout(&test_data().guest_user)
            .await
            .unwrap();
        assert_eq!(confirmation.numeric_order_number(), Some(2_207_822));
        assert!(!driver.was_called("check:input#PickUpInStore"));
        assert_eq!(checkout.steps()[2].detail.as_deref(), Some("AlreadySelected"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cart_emptied_mid_flow_fails_at_named_step() {
        let driver = MockDriver::new();
        install_shop(
            &driver,
            Script {
                cart_emptied_at_shipping: true,
                ..Script::default()
            },
        );
        let config = config();
        reach_checkout(&driver, &config, 2).await;

        let site = DemoWebShop::new(Interactions::new(&driver, &config));
        let err = CheckoutOrchestrator::new(&site)
            .complete_checkout(&test_data().guest_user)
            .await
            .unwrap_err();
        let step = err.failed_step().unwrap();
        assert!(step == "Shipping Method" || step == "Payment Method", "{step}");
        assert!(matches!(err, ShopError::CheckoutAborted { .. }));
        assert!(!driver.was_called(&format!("click:{}", selectors::CONFIRM_ORDER)));
    }
}

mod accumulation_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_cart_count_never_decreases() {
        let driver = MockDriver::new();
        let added = install_shop(&driver, Script::default());
        let config = config();
        let ui = Interactions::new(&driver, &config);
        let home = HomePage::new(ui);
        let category = ProductCategoryPage::new(ui);
        let mut rng = StdRng::seed_from_u64(21);

        home.go_to_home().await.unwrap();
        let mut previous = home.header_cart_count().await.unwrap();
        for _ in 0..3 {
            let report = category.add_until_minimum(2, &mut rng).await.unwrap();
            assert_eq!(report.added, 2);
            let count = home.header_cart_count().await.unwrap();
            assert!(count >= previous);
            previous = count;
        }
        assert_eq!(previous, 6);
        assert_eq!(added.load(Ordering::SeqCst), 6);
    }
}
