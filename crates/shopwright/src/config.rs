//! Suite configuration and wait timings.
//!
//! Environment variables (optionally loaded from a `.env` file):
//!
//! | Variable             | Meaning                                  | Default  |
//! |----------------------|------------------------------------------|----------|
//! | `BASE_URL`           | Shop root URL (required)                 | -        |
//! | `DEFAULT_TIMEOUT`    | Whole-scenario timeout in ms             | 60000    |
//! | `ACTION_TIMEOUT`     | Per-action timeout in ms                 | 10000    |
//! | `NAVIGATION_TIMEOUT` | Navigation/load-state timeout in ms      | 30000    |
//! | `VIEWPORT_WIDTH`     | Browser viewport width                   | 1920     |
//! | `VIEWPORT_HEIGHT`    | Browser viewport height                  | 1080     |
//! | `HEADLESS`           | Run without a visible window             | true     |
//! | `CHROMIUM_PATH`      | Browser executable override              | auto     |

use crate::result::{ShopError, ShopResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Base URL used when documenting the reference site
pub const REFERENCE_BASE_URL: &str = "https://demowebshop.tricentis.com";

/// Default whole-scenario timeout (60 seconds)
pub const DEFAULT_SUITE_TIMEOUT_MS: u64 = 60_000;

/// Default per-action timeout (10 seconds)
pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 10_000;

/// Default navigation timeout (30 seconds)
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Wait and settle durations used by the page objects.
///
/// Defaults reproduce the timings the suite was tuned against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timings {
    /// Visibility probe for the optional guest-checkout prompt
    pub guest_prompt_probe: Duration,
    /// Standard wait for a control before clicking or filling it.
    /// Follows `ACTION_TIMEOUT` when that is set.
    pub control: Duration,
    /// Extended wait for the payment step buttons
    pub payment_control: Duration,
    /// Floor between polls while a dependent dropdown repopulates
    pub dependent_dropdown_poll: Duration,
    /// Upper bound for a dependent dropdown to repopulate
    pub dependent_dropdown_timeout: Duration,
    /// Upper bound for the pickup checkbox to reflect a toggle
    pub pickup_toggle_timeout: Duration,
    /// Pause after hovering a menu before clicking a submenu entry
    pub menu_hover: Duration,
    /// Wait for an add-to-cart button to become visible
    pub add_button_visible: Duration,
    /// Pause after a successful add-to-cart
    pub add_settle: Duration,
    /// Pause after a failed add-to-cart before retrying
    pub add_retry: Duration,
    /// Failed add-to-cart attempts tolerated before giving up
    pub max_add_failures: usize,
    /// Wait for the add-to-cart success notification
    pub add_notification: Duration,
    /// Pause after configuring product attributes
    pub attribute_settle: Duration,
    /// Wait for the first read of confirmation text
    pub confirmation_read: Duration,
    /// Poll interval for bounded waits
    pub poll_interval: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            guest_prompt_probe: Duration::from_millis(3000),
            control: Duration::from_millis(5000),
            payment_control: Duration::from_millis(8000),
            dependent_dropdown_poll: Duration::from_millis(500),
            dependent_dropdown_timeout: Duration::from_millis(5000),
            pickup_toggle_timeout: Duration::from_millis(1500),
            menu_hover: Duration::from_millis(500),
            add_button_visible: Duration::from_millis(3000),
            add_settle: Duration::from_millis(2000),
            add_retry: Duration::from_millis(1500),
            max_add_failures: 10,
            add_notification: Duration::from_millis(10_000),
            attribute_settle: Duration::from_millis(1000),
            confirmation_read: Duration::from_millis(5000),
            poll_interval: Duration::from_millis(50),
        }
    }
}

impl Timings {
    /// Create timings with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the failure ceiling of the add-to-cart loop
    #[must_use]
    pub const fn with_max_add_failures(mut self, max: usize) -> Self {
        self.max_add_failures = max;
        self
    }

    /// Set the settle and retry pauses of the add-to-cart loop
    #[must_use]
    pub const fn with_add_pauses(mut self, settle: Duration, retry: Duration) -> Self {
        self.add_settle = settle;
        self.add_retry = retry;
        self
    }
}

/// Configuration for a suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Shop root URL, without trailing slash
    pub base_url: String,
    /// Whole-scenario timeout
    pub suite_timeout: Duration,
    /// Per-action timeout
    pub action_timeout: Duration,
    /// Navigation timeout
    pub navigation_timeout: Duration,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Run in headless mode
    pub headless: bool,
    /// Browser executable override
    pub chromium_path: Option<String>,
    /// Wait and settle durations
    pub timings: Timings,
}

impl SuiteConfig {
    /// Create a configuration for a base URL with defaults for everything else
    pub fn new(base_url: impl Into<String>) -> ShopResult<Self> {
        let base_url = normalize_base_url(&base_url.into())?;
        Ok(Self {
            base_url,
            suite_timeout: Duration::from_millis(DEFAULT_SUITE_TIMEOUT_MS),
            action_timeout: Duration::from_millis(DEFAULT_ACTION_TIMEOUT_MS),
            navigation_timeout: Duration::from_millis(DEFAULT_NAVIGATION_TIMEOUT_MS),
            viewport_width: 1920,
            viewport_height: 1080,
            headless: true,
            chromium_path: None,
            timings: Timings::default(),
        })
    }

    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> ShopResult<Self> {
        // A missing .env is normal; variables may come from the shell.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from a specific `.env` file, then the process environment
    pub fn from_env_file(path: &Path) -> ShopResult<Self> {
        dotenvy::from_path(path).map_err(|e| ShopError::EnvironmentMisconfiguration {
            key: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> ShopResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ShopError::EnvironmentMisconfiguration {
                key: "BASE_URL".to_string(),
                message: "BASE_URL environment variable is not set".to_string(),
            })?;

        let mut config = Self::new(base_url)?;
        if let Some(ms) = parse_var(&lookup, "DEFAULT_TIMEOUT")? {
            config.suite_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var(&lookup, "ACTION_TIMEOUT")? {
            config = config.with_action_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = parse_var(&lookup, "NAVIGATION_TIMEOUT")? {
            config.navigation_timeout = Duration::from_millis(ms);
        }
        if let Some(width) = parse_var(&lookup, "VIEWPORT_WIDTH")? {
            config.viewport_width = width;
        }
        if let Some(height) = parse_var(&lookup, "VIEWPORT_HEIGHT")? {
            config.viewport_height = height;
        }
        if let Some(headless) = lookup("HEADLESS") {
            config.headless = parse_bool("HEADLESS", &headless)?;
        }
        config.chromium_path = lookup("CHROMIUM_PATH").filter(|p| !p.trim().is_empty());
        Ok(config)
    }

    /// Absolute URL for a site-relative path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Set the whole-scenario timeout
    #[must_use]
    pub const fn with_suite_timeout(mut self, timeout: Duration) -> Self {
        self.suite_timeout = timeout;
        self
    }

    /// Set the per-action timeout.
    ///
    /// Control waits use it from here on; the payment step keeps its longer
    /// wait unless the new timeout exceeds it.
    #[must_use]
    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self.timings.control = timeout;
        self.timings.payment_control = self.timings.payment_control.max(timeout);
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set the browser executable
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Replace the wait timings
    #[must_use]
    pub const fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }
}

fn normalize_base_url(raw: &str) -> ShopResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ShopError::EnvironmentMisconfiguration {
            key: "BASE_URL".to_string(),
            message: format!("'{raw}' is not an http(s) URL"),
        });
    }
    Ok(trimmed.to_string())
}

fn parse_var<F, T>(lookup: &F, key: &str) -> ShopResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            ShopError::EnvironmentMisconfiguration {
                key: key.to_string(),
                message: format!("'{raw}' is not a valid number"),
            }
        }),
    }
}

fn parse_bool(key: &str, raw: &str) -> ShopResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ShopError::EnvironmentMisconfiguration {
            key: key.to_string(),
            message: format!("'{raw}' is not a boolean"),
        }),
    }
}
