//! Selectors for the Demo Web Shop markup.
//!
//! Every literal selector string used against the site lives here.

use crate::locator::Selector;
use crate::model::PaymentMethod;

// Header and navigation
pub const HEADER_CART_LINK: &str = "a.ico-cart";
pub const TOP_MENU_LINK: &str = ".top-menu a";
pub const CATEGORY_NAV_LINK: &str = ".block-category-navigation a";

// Category listing
pub const LISTING_ADD_TO_CART: &str = "input.button-2.product-box-add-to-cart-button";
pub const PRODUCT_ITEM: &str = ".product-item";
pub const PRODUCT_TITLE_LINK: &str = "h2.product-title a";
pub const PRODUCT_PRICE: &str = ".price";

// Product detail
pub const DETAIL_QUANTITY: &str = "input.qty-input";
pub const DETAIL_ADD_TO_CART: &str = "input.button-1.add-to-cart-button";
pub const SUCCESS_BAR: &str = ".bar-notification.success";
pub const SUCCESS_BAR_CLOSE: &str = ".bar-notification.success .close";
pub const ATTRIBUTE_RAM: &str = "select#product_attribute_72_5_18";
pub const ATTRIBUTE_HDD: &str = "select#product_attribute_72_6_19";
pub const ATTRIBUTE_PROCESSOR: &str = "select#product_attribute_72_3_20";

// Cart
pub const CART_ROW: &str = ".cart-item-row";
pub const CART_QUANTITY: &str = "input.qty-input";
pub const CART_UNIT_PRICE: &str = ".product-unit-price";
pub const CART_SUBTOTAL: &str = ".product-subtotal";
pub const CART_PRODUCT_NAME: &str = ".product-name";
pub const CART_SUMMARY_LABEL: &str = ".cart-total-right";
pub const TERMS_CHECKBOX: &str = r#"input[type="checkbox"][id*="terms"]"#;
pub const CHECKOUT_BUTTON: &str = "button#checkout";

// Checkout: guest prompt
pub const GUEST_CHECKOUT: &str = r#"input[value="Checkout as Guest"]"#;

// Checkout: billing
pub const BILLING_FIRST_NAME: &str = "input#BillingNewAddress_FirstName";
pub const BILLING_LAST_NAME: &str = "input#BillingNewAddress_LastName";
pub const BILLING_EMAIL: &str = "input#BillingNewAddress_Email";
pub const BILLING_COMPANY: &str = "input#BillingNewAddress_Company";
pub const BILLING_COUNTRY: &str = "select#BillingNewAddress_CountryId";
pub const BILLING_STATE: &str = "select#BillingNewAddress_StateProvinceId";
pub const BILLING_CITY: &str = "input#BillingNewAddress_City";
pub const BILLING_ADDRESS1: &str = "input#BillingNewAddress_Address1";
pub const BILLING_ADDRESS2: &str = "input#BillingNewAddress_Address2";
pub const BILLING_ZIP: &str = "input#BillingNewAddress_ZipPostalCode";
pub const BILLING_PHONE: &str = "input#BillingNewAddress_PhoneNumber";
pub const BILLING_FAX: &str = "input#BillingNewAddress_FaxNumber";
pub const BILLING_CONTINUE: &str = r#"input[onclick^="Billing.save()"]"#;

// Checkout: shipping
pub const PICKUP_IN_STORE: &str = r#"input#PickUpInStore[type="checkbox"]"#;
pub const SHIPPING_CONTINUE: &str =
    r#"input[type="button"].new-address-next-step-button[onclick*="Shipping.save()"]"#;

// Checkout: payment
pub const PAYMENT_METHOD_CONTINUE: &str =
    r#"input[type="button"].payment-method-next-step-button[onclick*="PaymentMethod.save()"]"#;
pub const PAYMENT_INFO_CONTINUE: &str =
    r#"input[type="button"].payment-info-next-step-button[onclick*="PaymentInfo.save()"]"#;

// Checkout: confirm
pub const CONFIRM_ORDER: &str =
    r#"input[type="button"].confirm-order-next-step-button[onclick*="ConfirmOrder.save()"]"#;

// Order confirmation
pub const ORDER_NUMBER_LABEL: &str = "Order number:";
pub const ORDER_DETAILS_LINK: &str = r#"a[href*="/orderdetails"]"#;
pub const ORDER_TOTAL_VALUES: &str = ".cart-total .value-summary";

/// Script that ticks the pickup box through the page's own handler
pub const PICKUP_TOGGLE_SCRIPT: &str = "(() => { \
    const el = document.querySelector('input#PickUpInStore'); \
    if (!el) return false; \
    el.checked = true; \
    if (window.Shipping && typeof Shipping.togglePickUpInStore === 'function') { \
        Shipping.togglePickUpInStore(el); \
    } \
    el.dispatchEvent(new Event('change', { bubbles: true })); \
    return el.checked; \
})()";

/// Top-menu entry by label
#[must_use]
pub fn top_menu(label: &str) -> Selector {
    Selector::css_with_text(TOP_MENU_LINK, label).first()
}

/// Side category navigation entry by label
#[must_use]
pub fn category_link(label: &str) -> Selector {
    Selector::css_with_text(CATEGORY_NAV_LINK, label).first()
}

/// Header cart link
#[must_use]
pub fn header_cart() -> Selector {
    Selector::css(HEADER_CART_LINK).first()
}

/// Listing tile of a product
#[must_use]
pub fn product_item(name: &str) -> Selector {
    Selector::css_with_text(PRODUCT_ITEM, name).first()
}

/// Detail page link inside a product tile
#[must_use]
pub fn product_title_link(name: &str) -> Selector {
    product_item(name).descendant(PRODUCT_TITLE_LINK).first()
}

/// Price inside a product tile
#[must_use]
pub fn product_price(name: &str) -> Selector {
    product_item(name).descendant(PRODUCT_PRICE).first()
}

/// Cart row containing a product name
#[must_use]
pub fn cart_row(name: &str) -> Selector {
    Selector::css_with_text(CART_ROW, name).first()
}

/// Cell inside the cart row of a product
#[must_use]
pub fn cart_row_cell(name: &str, cell: &str) -> Selector {
    cart_row(name).descendant(cell).first()
}

/// Cell inside the n-th cart row
#[must_use]
pub fn nth_row_cell(index: usize, cell: &str) -> Selector {
    Selector::css(CART_ROW)
        .nth(i32::try_from(index).unwrap_or(i32::MAX))
        .descendant(cell)
        .first()
}

/// Value cell next to a labelled cart summary row, e.g. "Sub-Total".
///
/// Takes the last labelled row: "Total" also matches "Sub-Total", and the
/// grand total is the final row.
#[must_use]
pub fn cart_summary_value(label: &str) -> Selector {
    Selector::css_with_text(CART_SUMMARY_LABEL, label)
        .next_sibling()
        .last()
}

/// Terms of service checkbox
#[must_use]
pub fn terms_checkbox() -> Selector {
    Selector::css(TERMS_CHECKBOX).first()
}

/// Payment method radio button
#[must_use]
pub fn payment_method_radio(method: PaymentMethod) -> Selector {
    Selector::css(format!("input#paymentmethod_{}", method.radio_index()))
}

/// Element carrying the "Order number:" label
#[must_use]
pub fn order_number_text() -> Selector {
    Selector::text(ORDER_NUMBER_LABEL).first()
}

/// Order details link
#[must_use]
pub fn order_details_link() -> Selector {
    Selector::css(ORDER_DETAILS_LINK).first()
}

/// Last value cell of the order total section
#[must_use]
pub fn order_total_value() -> Selector {
    Selector::css(ORDER_TOTAL_VALUES).last()
}
