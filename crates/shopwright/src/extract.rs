//! Text extraction shared by every reader that scrapes numbers off the page.
//!
//! Prices, order numbers and cart badges are all recovered from rendered text.
//! Each rule lives here exactly once so the cart, listing and confirmation
//! readers cannot drift apart.

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

// Patterns are literals; compilation cannot fail.
#[allow(clippy::expect_used)]
static AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\d,.]*\d[\d,.]*").expect("amount pattern"));

#[allow(clippy::expect_used)]
static ORDER_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Order number[:\s]+(\d+)").expect("order number pattern")
});

#[allow(clippy::expect_used)]
static ORDER_DETAILS_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/orderdetails/(\d+)").expect("order details pattern"));

#[allow(clippy::expect_used)]
static CART_BADGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)\)").expect("cart badge pattern"));

/// Find the first amount in free text.
///
/// Takes the first run of digits, commas and periods, drops the commas and
/// parses what remains as a decimal. Currency symbols and labels around the
/// number are ignored. A trailing sentence period is tolerated.
///
/// ```
/// use rust_decimal::Decimal;
/// use shopwright::find_amount;
///
/// assert_eq!(find_amount("$2,207.50"), Some(Decimal::new(220_750, 2)));
/// assert_eq!(find_amount("no digits here"), None);
/// ```
#[must_use]
pub fn find_amount(text: &str) -> Option<Decimal> {
    let raw = AMOUNT.find(text)?.as_str().replace(',', "");
    // Keep at most one decimal point, like a lenient float parser would.
    let mut parts = raw.splitn(3, '.');
    let whole = parts.next().unwrap_or_default();
    let candidate = match parts.next() {
        Some(frac) if !frac.is_empty() => format!("{whole}.{frac}"),
        _ => whole.to_string(),
    };
    if candidate.is_empty() {
        return None;
    }
    Decimal::from_str(&candidate).ok()
}

/// Amount in free text, or zero when there is none.
///
/// This is the rule every price reader uses.
#[must_use]
pub fn extract_amount(text: &str) -> Decimal {
    find_amount(text).unwrap_or(Decimal::ZERO)
}

/// Order number following an "Order number:" label
#[must_use]
pub fn find_order_number(text: &str) -> Option<String> {
    ORDER_NUMBER
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Order number at the end of an order-details link target
#[must_use]
pub fn order_number_from_href(href: &str) -> Option<String> {
    ORDER_DETAILS_HREF
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Item count from a header cart link such as "Shopping cart (4)"
#[must_use]
pub fn parse_cart_badge(text: &str) -> usize {
    CART_BADGE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Quantity from a cart row input; unreadable, blank or zero counts as one
#[must_use]
pub fn parse_quantity(value: Option<&str>) -> u32 {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|q| *q > 0)
        .unwrap_or(1)
}
