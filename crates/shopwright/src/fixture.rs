//! Test data fixtures.
//!
//! The suite reads its guest shopper from a JSON file:
//!
//! ```json
//! { "guestUser": { "firstName": "Ada", "lastName": "Lovelace", ... } }
//! ```
//!
//! The profile is validated once at load time and is read-only afterwards.

use crate::model::{GuestUserProfile, ProductData};
use crate::result::{ShopError, ShopResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default location of the fixture file, relative to the working directory
pub const DEFAULT_TEST_DATA_PATH: &str = "test-data/users.json";

/// Contents of a test data file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestData {
    /// Shopper used by the checkout scenarios
    pub guest_user: GuestUserProfile,
    /// Products expected in the cart, when a file lists them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<ProductData>,
}

impl TestData {
    /// Parse and validate test data from JSON text
    pub fn from_json(json: &str) -> ShopResult<Self> {
        let data: Self = serde_json::from_str(json).map_err(|e| ShopError::Fixture {
            message: format!("failed to read user data: {e}"),
        })?;
        data.guest_user.validate()?;
        Ok(data)
    }

    /// Load and validate test data from a file
    pub fn load(path: impl AsRef<Path>) -> ShopResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ShopError::Fixture {
            message: format!("failed to read user data from {}: {e}", path.display()),
        })?;
        let data = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), products = data.products.len(), "test data loaded");
        Ok(data)
    }
}
