//! Values that flow through a checkout walk.
//!
//! Everything here is request-scoped: profiles come from fixture data, cart
//! values are re-read from the page on every query, and the confirmation is
//! produced once at the end of a successful checkout.

use crate::result::{ShopError, ShopResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tolerance used when comparing scraped currency amounts (one cent)
pub const CURRENCY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Guest shopper identity and address used by the billing step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestUserProfile {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Contact email
    pub email: String,
    /// Company (optional on the site, kept as plain text)
    #[serde(default)]
    pub company: String,
    /// Country, matched against the dropdown label
    pub country: String,
    /// State or province, matched against the dropdown label
    #[serde(default)]
    pub state: String,
    /// City
    pub city: String,
    /// First address line
    pub address1: String,
    /// Second address line
    #[serde(default)]
    pub address2: String,
    /// Zip or postal code
    pub zip_code: String,
    /// Phone number
    pub phone_number: String,
    /// Fax number
    #[serde(default, deserialize_with = "empty_as_none")]
    pub fax_number: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

impl GuestUserProfile {
    /// Check that every field the billing form requires is populated.
    ///
    /// Reports the first missing field in form order.
    pub fn validate(&self) -> ShopResult<()> {
        let required: [(&'static str, &str); 8] = [
            ("firstName", self.first_name.as_str()),
            ("lastName", self.last_name.as_str()),
            ("email", self.email.as_str()),
            ("country", self.country.as_str()),
            ("city", self.city.as_str()),
            ("address1", self.address1.as_str()),
            ("zipCode", self.zip_code.as_str()),
            ("phoneNumber", self.phone_number.as_str()),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(ShopError::InvalidProfile { field: *field }),
            None => Ok(()),
        }
    }

    /// Full name as shown on the order summary
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A product row in the shopping cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product name as rendered
    pub product_name: String,
    /// Unit price
    pub unit_price: Decimal,
    /// Quantity
    pub quantity: u32,
    /// Line subtotal
    pub line_subtotal: Decimal,
}

impl CartLine {
    /// Unit price times quantity
    #[must_use]
    pub fn expected_subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    /// Whether the rendered subtotal matches price times quantity
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        (self.line_subtotal - self.expected_subtotal()).abs() <= CURRENCY_TOLERANCE
    }
}

/// Summary block of the shopping cart
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    /// Sum of line subtotals
    pub subtotal: Decimal,
    /// Shipping cost
    pub shipping: Decimal,
    /// Tax
    pub tax: Decimal,
    /// Grand total
    pub total: Decimal,
}

impl CartTotals {
    /// Subtotal plus shipping plus tax
    #[must_use]
    pub fn expected_total(&self) -> Decimal {
        self.subtotal + self.shipping + self.tax
    }

    /// Whether the grand total adds up within rounding tolerance
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        (self.total - self.expected_total()).abs() <= CURRENCY_TOLERANCE
    }
}

/// Terminal result of a successful checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    /// Order number exactly as rendered
    pub order_number: String,
    /// Order total, when the total section could be read
    pub order_total: Option<Decimal>,
}

impl OrderConfirmation {
    /// Order number parsed as an integer
    #[must_use]
    pub fn numeric_order_number(&self) -> Option<u64> {
        self.order_number.parse().ok()
    }
}

/// Payment methods offered by the checkout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    /// Cash on delivery (reference choice)
    #[default]
    CashOnDelivery,
    /// Check or money order
    CheckMoneyOrder,
    /// Credit card
    CreditCard,
    /// Purchase order
    PurchaseOrder,
}

impl PaymentMethod {
    /// Position of the method's radio button in the payment list
    #[must_use]
    pub const fn radio_index(self) -> usize {
        match self {
            Self::CashOnDelivery => 0,
            Self::CheckMoneyOrder => 1,
            Self::CreditCard => 2,
            Self::PurchaseOrder => 3,
        }
    }

    /// Display label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CashOnDelivery => "Cash On Delivery (COD)",
            Self::CheckMoneyOrder => "Check / Money Order",
            Self::CreditCard => "Credit Card",
            Self::PurchaseOrder => "Purchase Order",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Optional attribute choices for configurable products
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductConfiguration {
    /// Processor option label
    pub processor: String,
    /// RAM option label
    pub ram: String,
    /// Disk option label
    pub hdd: String,
}

impl Default for ProductConfiguration {
    /// The "Build your own cheap computer" build the suite orders
    fn default() -> Self {
        Self {
            processor: "Medium [+$15.00]".to_string(),
            ram: "2 GB".to_string(),
            hdd: "320 GB".to_string(),
        }
    }
}

/// Expected product in the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductData {
    /// Category name
    pub category: String,
    /// Product name
    pub name: String,
    /// Listed price
    pub price: Decimal,
    /// Quantity to order
    pub quantity: u32,
    /// Product type, e.g. "simple" or "configurable"
    #[serde(rename = "type")]
    pub kind: String,
    /// Attribute choices for configurable products
    #[serde(default)]
    pub configuration: Option<ProductConfiguration>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample_profile() -> GuestUserProfile {
        GuestUserProfile {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            company: "Analytical Engines".to_string(),
            country: "United States".to_string(),
            state: "New York".to_string(),
            city: "New York".to_string(),
            address1: "1 Main St".to_string(),
            address2: String::new(),
            zip_code: "10001".to_string(),
            phone_number: "5551234567".to_string(),
            fax_number: None,
        }
    }

    mod profile_tests {
        use super::*;

        #[test]
        fn test_valid_profile() {
            assert!(sample_profile().validate().is_ok());
        }

        #[test]
        fn test_missing_required_field() {
            let mut profile = sample_profile();
            profile.city = "  ".to_string();
            let err = profile.validate().unwrap_err();
            assert!(matches!(err, ShopError::InvalidProfile { field: "city" }));
        }

        #[test]
        fn test_first_missing_field_reported() {
            let mut profile = sample_profile();
            profile.email.clear();
            profile.phone_number.clear();
            let err = profile.validate().unwrap_err();
            assert!(matches!(err, ShopError::InvalidProfile { field: "email" }));
        }

        #[test]
        fn test_optional_fields_may_be_empty() {
            let mut profile = sample_profile();
            profile.company.clear();
            profile.address2.clear();
            profile.state.clear();
            profile.fax_number = None;
            assert!(profile.validate().is_ok());
        }

        #[test]
        fn test_deserialize_camel_case() {
            let json = r#"{
                "firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.com",
                "company": "", "country": "United States", "state": "New York",
                "city": "New York", "address1": "1 Main St", "address2": "",
                "zipCode": "10001", "phoneNumber": "5551234567", "faxNumber": ""
            }"#;
            let profile: GuestUserProfile = serde_json::from_str(json).unwrap();
            assert_eq!(profile.zip_code, "10001");
            assert_eq!(profile.fax_number, None);
            assert_eq!(profile.full_name(), "Ada Lovelace");
        }

        #[test]
        fn test_fax_kept_when_present() {
            let json = r#"{
                "firstName": "A", "lastName": "B", "email": "a@b.c", "country": "X",
                "city": "Y", "address1": "Z", "zipCode": "1", "phoneNumber": "2",
                "faxNumber": "555"
            }"#;
            let profile: GuestUserProfile = serde_json::from_str(json).unwrap();
            assert_eq!(profile.fax_number.as_deref(), Some("555"));
        }
    }

    mod cart_tests {
        use super::*;

        #[test]
        fn test_line_consistency() {
            let line = CartLine {
                product_name: "14.1-inch Laptop".to_string(),
                unit_price: dec("1590.00"),
                quantity: 2,
                line_subtotal: dec("3180.00"),
            };
            assert!(line.is_consistent());

            let off = CartLine {
                line_subtotal: dec("3179.00"),
                ..line
            };
            assert!(!off.is_consistent());
        }

        #[test]
        fn test_totals_consistency() {
            let totals = CartTotals {
                subtotal: dec("1590.00"),
                shipping: dec("0.00"),
                tax: dec("0.00"),
                total: dec("1590.00"),
            };
            assert!(totals.is_consistent());
            assert_eq!(totals.expected_total(), dec("1590.00"));

            let rounded = CartTotals {
                total: dec("1590.01"),
                ..totals
            };
            assert!(rounded.is_consistent());

            let wrong = CartTotals {
                total: dec("1600.00"),
                ..totals
            };
            assert!(!wrong.is_consistent());
        }
    }

    mod confirmation_tests {
        use super::*;

        #[test]
        fn test_numeric_order_number() {
            let confirmation = OrderConfirmation {
                order_number: "2207822".to_string(),
                order_total: None,
            };
            assert_eq!(confirmation.numeric_order_number(), Some(2_207_822));
        }
    }

    mod payment_method_tests {
        use super::*;

        #[test]
        fn test_default_is_cash_on_delivery() {
            assert_eq!(PaymentMethod::default(), PaymentMethod::CashOnDelivery);
            assert_eq!(PaymentMethod::default().radio_index(), 0);
        }

        #[test]
        fn test_serde_kebab_case() {
            let method: PaymentMethod = serde_json::from_str("\"check-money-order\"").unwrap();
            assert_eq!(method, PaymentMethod::CheckMoneyOrder);
            assert_eq!(method.to_string(), "Check / Money Order");
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_line_with_exact_subtotal_is_consistent(
                cents in 0i64..1_000_000,
                quantity in 1u32..50
            ) {
                let unit_price = Decimal::new(cents, 2);
                let line = CartLine {
                    product_name: "p".to_string(),
                    unit_price,
                    quantity,
                    line_subtotal: unit_price * Decimal::from(quantity),
                };
                prop_assert!(line.is_consistent());
            }

            #[test]
            fn prop_totals_sum_is_consistent(
                sub in 0i64..1_000_000,
                ship in 0i64..10_000,
                tax in 0i64..10_000
            ) {
                let totals = CartTotals {
                    subtotal: Decimal::new(sub, 2),
                    shipping: Decimal::new(ship, 2),
                    tax: Decimal::new(tax, 2),
                    total: Decimal::new(sub + ship + tax, 2),
                };
                prop_assert!(totals.is_consistent());
            }
        }
    }
}
