//! Result and error types for Shopwright.

use thiserror::Error;

/// Result type for Shopwright operations
pub type ShopResult<T> = Result<T, ShopError>;

/// Errors that can occur while walking the shop
#[derive(Debug, Error)]
pub enum ShopError {
    /// A required control never became visible or interactable in time
    #[error("Failed to {action} (timed out after {ms}ms)")]
    InteractionTimeout {
        /// Human-readable action, e.g. "click Continue on Billing Address"
        action: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// The control was found but interacting with it failed
    #[error("Failed to {action}: {message}")]
    Interaction {
        /// Human-readable action
        action: String,
        /// Underlying cause
        message: String,
    },

    /// A text-scraping pattern found nothing where a value is mandatory
    #[error("Could not extract {what} from the page")]
    ExtractionMiss {
        /// What was being extracted
        what: String,
    },

    /// A checkout step failed; the remaining steps were not run
    #[error("Checkout aborted at step '{step}': {source}")]
    CheckoutAborted {
        /// Name of the failing step
        step: String,
        /// Underlying failure
        #[source]
        source: Box<ShopError>,
    },

    /// Required external configuration is missing or malformed
    #[error("Environment misconfiguration ({key}): {message}")]
    EnvironmentMisconfiguration {
        /// Variable or setting name
        key: String,
        /// Error message
        message: String,
    },

    /// Guest profile is missing a required field
    #[error("Guest profile is missing required field '{field}'")]
    InvalidProfile {
        /// Field name
        field: &'static str,
    },

    /// The add-to-cart loop hit its failure ceiling
    #[error("Added {added} of {required} products before giving up after {failures} failed attempts")]
    AccumulationExhausted {
        /// Products successfully added
        added: usize,
        /// Products requested
        required: usize,
        /// Failed attempts
        failures: usize,
    },

    /// A whole scenario exceeded the suite timeout
    #[error("Scenario '{scenario}' timed out after {ms}ms")]
    ScenarioTimeout {
        /// Scenario identifier
        scenario: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Browser launch or connection error
    #[error("Browser error: {message}")]
    Browser {
        /// Error message
        message: String,
    },

    /// Low-level page driver error
    #[error("Page driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Fixture error (test data could not be loaded)
    #[error("Fixture error: {message}")]
    Fixture {
        /// Error message
        message: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ShopError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create an interaction error for a named action
    #[must_use]
    pub fn interaction(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Interaction {
            action: action.into(),
            message: message.into(),
        }
    }

    /// Create an extraction miss
    #[must_use]
    pub fn extraction_miss(what: impl Into<String>) -> Self {
        Self::ExtractionMiss { what: what.into() }
    }

    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Wrap an error as the abort reason of a checkout step
    #[must_use]
    pub fn aborted(step: impl Into<String>, source: Self) -> Self {
        Self::CheckoutAborted {
            step: step.into(),
            source: Box::new(source),
        }
    }

    /// Name of the checkout step that failed, if this is a checkout abort
    #[must_use]
    pub fn failed_step(&self) -> Option<&str> {
        match self {
            Self::CheckoutAborted { step, .. } => Some(step),
            _ => None,
        }
    }

    /// Whether this error means the page or browser is already gone
    #[must_use]
    pub fn is_page_closed(&self) -> bool {
        match self {
            Self::Driver { message } | Self::Browser { message } => {
                let lower = message.to_ascii_lowercase();
                lower.contains("closed") || (lower.contains("target") && lower.contains("not found"))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_timeout_names_action() {
        let err = ShopError::InteractionTimeout {
            action: "click Continue on Billing Address".to_string(),
            ms: 5000,
        };
        assert_eq!(
            err.to_string(),
            "Failed to click Continue on Billing Address (timed out after 5000ms)"
        );
    }

    #[test]
    fn test_aborted_reports_step_and_cause() {
        let err = ShopError::aborted(
            "Shipping Method",
            ShopError::interaction("click Continue on Shipping Address", "detached"),
        );
        assert_eq!(err.failed_step(), Some("Shipping Method"));
        let text = err.to_string();
        assert!(text.contains("Shipping Method"));
        assert!(text.contains("click Continue on Shipping Address"));
    }

    #[test]
    fn test_failed_step_none_for_other_errors() {
        assert!(ShopError::extraction_miss("order number")
            .failed_step()
            .is_none());
    }

    #[test]
    fn test_is_page_closed() {
        assert!(ShopError::driver("Page closed").is_page_closed());
        assert!(ShopError::driver("No target with given id not found").is_page_closed());
        assert!(!ShopError::driver("evaluation failed").is_page_closed());
        assert!(!ShopError::assertion("closed").is_page_closed());
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "users.json");
        let err: ShopError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }
}
