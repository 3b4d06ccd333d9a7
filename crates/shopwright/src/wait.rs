//! Wait mechanisms.
//!
//! Every bounded wait in the suite goes through [`poll_until`], which runs on
//! the tokio clock so tests can drive it with a paused runtime.

use crate::result::{ShopError, ShopResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Page load states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadState {
    /// The `load` event has fired
    #[default]
    Load,
    /// `DOMContentLoaded` has fired
    DomContentLoaded,
    /// No outstanding requests
    NetworkIdle,
}

impl LoadState {
    /// Get the event name for this load state
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::DomContentLoaded => "DOMContentLoaded",
            Self::NetworkIdle => "networkidle",
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout
    pub timeout: Duration,
    /// Polling interval
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl WaitOptions {
    /// Create wait options with a timeout and the default poll interval
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Set polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Timeout in whole milliseconds
    #[must_use]
    pub const fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

/// Result of a wait operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitResult {
    /// Whether the condition was met
    pub success: bool,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
    /// Last error the condition reported while polling
    pub last_error: Option<String>,
}

impl WaitResult {
    /// Create a successful wait result
    #[must_use]
    pub fn success(elapsed: Duration, waited_for: impl Into<String>) -> Self {
        Self {
            success: true,
            elapsed,
            waited_for: waited_for.into(),
            last_error: None,
        }
    }

    /// Create a timeout wait result
    #[must_use]
    pub fn timeout(elapsed: Duration, waited_for: impl Into<String>) -> Self {
        Self {
            success: false,
            elapsed,
            waited_for: waited_for.into(),
            last_error: None,
        }
    }

    /// Turn an expired wait into an interaction error
    pub fn into_result(self, options: &WaitOptions) -> ShopResult<Self> {
        if self.success {
            return Ok(self);
        }
        match self.last_error {
            Some(message) => Err(ShopError::Interaction {
                action: self.waited_for,
                message,
            }),
            None => Err(ShopError::InteractionTimeout {
                action: self.waited_for,
                ms: options.timeout_ms(),
            }),
        }
    }
}

/// Poll `condition` until it holds or the timeout expires.
///
/// An expired wait is `Ok` with `success == false`. Condition errors are
/// retried until the deadline, except a closed page, which returns at once.
pub async fn poll_until<F, Fut>(
    options: &WaitOptions,
    waited_for: impl Into<String>,
    mut condition: F,
) -> ShopResult<WaitResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ShopResult<bool>>,
{
    let waited_for = waited_for.into();
    let start = Instant::now();

    loop {
        let last_error = match condition().await {
            Ok(true) => return Ok(WaitResult::success(start.elapsed(), waited_for)),
            Ok(false) => None,
            Err(e) if e.is_page_closed() => return Err(e),
            Err(e) => Some(e.to_string()),
        };
        if start.elapsed() >= options.timeout {
            let mut result = WaitResult::timeout(start.elapsed(), waited_for);
            result.last_error = last_error;
            return Ok(result);
        }
        tokio::time::sleep(options.poll_interval).await;
    }
}

/// Poll `condition` and fail with an interaction error when it never holds
pub async fn require<F, Fut>(
    options: &WaitOptions,
    action: impl Into<String>,
    condition: F,
) -> ShopResult<WaitResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ShopResult<bool>>,
{
    poll_until(options, action, condition)
        .await?
        .into_result(options)
}

/// Fixed pause used where the page offers no observable signal
pub async fn settle(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
