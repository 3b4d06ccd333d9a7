//! Browser control over the Chrome DevTools Protocol.
//!
//! Compiled with the `browser` feature. Element lookups are evaluated as
//! JavaScript built from [`Selector::to_query`]; pointer input goes through
//! CDP `Input.dispatchMouseEvent` so page scripts see real clicks.

use crate::config::SuiteConfig;
use crate::driver::PageDriver;
use crate::locator::{SelectBy, Selector};
use crate::result::{ShopError, ShopResult};
use crate::wait::{self, LoadState, WaitOptions};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType, MouseButton,
};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Browser configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Navigation timeout
    pub navigation_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            chromium_path: None,
            sandbox: true,
            navigation_timeout: Duration::from_secs(30),
        }
    }
}

impl BrowserConfig {
    /// Derive browser settings from a suite configuration
    #[must_use]
    pub fn from_suite(config: &SuiteConfig) -> Self {
        Self {
            headless: config.headless,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            chromium_path: config.chromium_path.clone(),
            sandbox: true,
            navigation_timeout: config.navigation_timeout,
        }
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

fn cdp_err(e: impl std::fmt::Display) -> ShopError {
    ShopError::Driver {
        message: e.to_string(),
    }
}

/// Browser instance with a live CDP connection
#[derive(Debug)]
pub struct Browser {
    config: BrowserConfig,
    inner: Arc<Mutex<CdpBrowser>>,
    #[allow(dead_code)]
    handle: tokio::task::JoinHandle<()>,
}

impl Browser {
    /// Launch a new browser instance
    pub async fn launch(config: BrowserConfig) -> ShopResult<Self> {
        let mut builder = CdpConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .viewport(Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
                ..Viewport::default()
            })
            .request_timeout(config.navigation_timeout);

        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder
            .build()
            .map_err(|message| ShopError::Browser { message })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| ShopError::Browser {
                    message: e.to_string(),
                })?;

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        tracing::debug!(headless = config.headless, "browser launched");
        Ok(Self {
            config,
            inner: Arc::new(Mutex::new(browser)),
            handle,
        })
    }

    /// Open a fresh page and wrap it in a driver
    pub async fn new_driver(&self) -> ShopResult<ChromiumDriver> {
        let browser = self.inner.lock().await;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ShopError::Browser {
                message: e.to_string(),
            })?;
        Ok(ChromiumDriver {
            page,
            navigation_timeout: self.config.navigation_timeout,
        })
    }

    /// Get the browser configuration
    #[must_use]
    pub const fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Close the browser
    pub async fn close(self) -> ShopResult<()> {
        let mut browser = self.inner.lock().await;
        browser.close().await.map_err(|e| ShopError::Browser {
            message: e.to_string(),
        })?;
        Ok(())
    }
}

/// [`PageDriver`] backed by a chromiumoxide page
#[derive(Debug, Clone)]
pub struct ChromiumDriver {
    page: CdpPage,
    navigation_timeout: Duration,
}

impl ChromiumDriver {
    async fn eval<T: DeserializeOwned>(&self, script: String) -> ShopResult<T> {
        let result = self.page.evaluate(script).await.map_err(cdp_err)?;
        result.into_value().map_err(cdp_err)
    }

    /// Run `body` with `e` bound to the first match, or return `fallback`
    async fn with_element<T: DeserializeOwned>(
        &self,
        selector: &Selector,
        body: &str,
        fallback: &str,
    ) -> ShopResult<T> {
        self.eval(format!(
            "(() => {{ const e = {}; if (!e) return {fallback}; {body} }})()",
            selector.to_query()
        ))
        .await
    }

    async fn mouse(&self, kind: DispatchMouseEventType, x: f64, y: f64) -> ShopResult<()> {
        let mut params = DispatchMouseEventParams::builder().r#type(kind.clone()).x(x).y(y);
        if kind != DispatchMouseEventType::MouseMoved {
            params = params.button(MouseButton::Left).click_count(1);
        }
        let params = params.build().map_err(cdp_err)?;
        self.page.execute(params).await.map_err(cdp_err)?;
        Ok(())
    }

    /// Scroll the first match to the viewport centre and return its centre point
    async fn center_of(&self, selector: &Selector) -> ShopResult<(f64, f64)> {
        let point: Option<(f64, f64)> = self
            .with_element(
                selector,
                "e.scrollIntoView({block: 'center', inline: 'center'}); \
                 const r = e.getBoundingClientRect(); \
                 if (r.width === 0 && r.height === 0) return null; \
                 return [r.left + r.width / 2, r.top + r.height / 2];",
                "null",
            )
            .await?;
        point.ok_or_else(|| {
            ShopError::driver(format!("no visible element matches {selector}"))
        })
    }

    async fn ready_state_reached(&self, state: LoadState) -> ShopResult<bool> {
        let script = match state {
            LoadState::DomContentLoaded => "document.readyState !== 'loading'",
            LoadState::Load => "document.readyState === 'complete'",
            LoadState::NetworkIdle => {
                "document.readyState === 'complete' && (!window.jQuery || window.jQuery.active === 0)"
            }
        };
        self.eval(script.to_string()).await
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn goto(&self, url: &str) -> ShopResult<()> {
        tracing::debug!(url, "navigating");
        match tokio::time::timeout(self.navigation_timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(ShopError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(ShopError::Navigation {
                url: url.to_string(),
                message: format!(
                    "timed out after {}ms",
                    self.navigation_timeout.as_millis()
                ),
            }),
        }
    }

    async fn wait_for_load(&self, state: LoadState) -> ShopResult<()> {
        let options = WaitOptions::new(self.navigation_timeout)
            .with_poll_interval(Duration::from_millis(100));
        wait::require(&options, format!("reach {state} state"), || {
            self.ready_state_reached(state)
        })
        .await
        .map(|_| ())
    }

    async fn url(&self) -> ShopResult<String> {
        Ok(self.page.url().await.map_err(cdp_err)?.unwrap_or_default())
    }

    async fn title(&self) -> ShopResult<String> {
        Ok(self
            .page
            .get_title()
            .await
            .map_err(cdp_err)?
            .unwrap_or_default())
    }

    async fn content(&self) -> ShopResult<String> {
        self.page.content().await.map_err(cdp_err)
    }

    async fn count(&self, selector: &Selector) -> ShopResult<usize> {
        self.eval(selector.to_count_query()).await
    }

    async fn is_visible(&self, selector: &Selector) -> ShopResult<bool> {
        self.with_element(
            selector,
            "const s = getComputedStyle(e); \
             return s.visibility !== 'hidden' && s.display !== 'none' && \
             !!(e.offsetWidth || e.offsetHeight || e.getClientRects().length);",
            "false",
        )
        .await
    }

    async fn is_checked(&self, selector: &Selector) -> ShopResult<bool> {
        self.with_element(selector, "return !!e.checked;", "false")
            .await
    }

    async fn text_content(&self, selector: &Selector) -> ShopResult<Option<String>> {
        self.with_element(selector, "return e.textContent;", "null")
            .await
    }

    async fn input_value(&self, selector: &Selector) -> ShopResult<Option<String>> {
        self.with_element(selector, "return e.value ?? null;", "null")
            .await
    }

    async fn attribute(&self, selector: &Selector, name: &str) -> ShopResult<Option<String>> {
        let name = serde_json::to_string(name)?;
        self.with_element(selector, &format!("return e.getAttribute({name});"), "null")
            .await
    }

    async fn click(&self, selector: &Selector) -> ShopResult<()> {
        let (x, y) = self.center_of(selector).await?;
        self.mouse(DispatchMouseEventType::MouseMoved, x, y).await?;
        self.mouse(DispatchMouseEventType::MousePressed, x, y).await?;
        self.mouse(DispatchMouseEventType::MouseReleased, x, y).await
    }

    async fn fill(&self, selector: &Selector, value: &str) -> ShopResult<()> {
        let value = serde_json::to_string(value)?;
        let found: bool = self
            .with_element(
                selector,
                &format!(
                    "e.focus(); e.value = {value}; \
                     e.dispatchEvent(new Event('input', {{bubbles: true}})); \
                     e.dispatchEvent(new Event('change', {{bubbles: true}})); \
                     return true;"
                ),
                "false",
            )
            .await?;
        if found {
            Ok(())
        } else {
            Err(ShopError::driver(format!("no element matches {selector}")))
        }
    }

    async fn select_option(&self, selector: &Selector, by: &SelectBy) -> ShopResult<()> {
        let wanted = serde_json::to_string(by.as_str())?;
        let matcher = match by {
            SelectBy::Label(_) => format!("o.text.trim() === {wanted}"),
            SelectBy::Value(_) => format!("o.value === {wanted}"),
        };
        let outcome: String = self
            .with_element(
                selector,
                &format!(
                    "const o = Array.from(e.options || []).find(o => {matcher}); \
                     if (!o) return 'no-option'; \
                     e.value = o.value; \
                     e.dispatchEvent(new Event('change', {{bubbles: true}})); \
                     return 'ok';"
                ),
                "'no-element'",
            )
            .await?;
        match outcome.as_str() {
            "ok" => Ok(()),
            "no-option" => Err(ShopError::driver(format!(
                "{selector} has no option with {by}"
            ))),
            _ => Err(ShopError::driver(format!("no element matches {selector}"))),
        }
    }

    async fn option_labels(&self, selector: &Selector) -> ShopResult<Vec<String>> {
        self.with_element(
            selector,
            "return Array.from(e.options || []).map(o => o.text.trim());",
            "[]",
        )
        .await
    }

    async fn check(&self, selector: &Selector) -> ShopResult<()> {
        if self.is_checked(selector).await? {
            return Ok(());
        }
        self.click(selector).await
    }

    async fn hover(&self, selector: &Selector) -> ShopResult<()> {
        let (x, y) = self.center_of(selector).await?;
        self.mouse(DispatchMouseEventType::MouseMoved, x, y).await
    }

    async fn scroll_into_view(&self, selector: &Selector) -> ShopResult<()> {
        let found: bool = self
            .with_element(
                selector,
                "e.scrollIntoView({block: 'center'}); return true;",
                "false",
            )
            .await?;
        if found {
            Ok(())
        } else {
            Err(ShopError::driver(format!("no element matches {selector}")))
        }
    }

    async fn evaluate(&self, script: &str) -> ShopResult<serde_json::Value> {
        let result = self.page.evaluate(script).await.map_err(cdp_err)?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn go_back(&self) -> ShopResult<()> {
        self.page
            .evaluate("history.back()")
            .await
            .map_err(cdp_err)?;
        self.wait_for_load(LoadState::Load).await
    }

    async fn close(&self) -> ShopResult<()> {
        self.page.clone().close().await.map_err(cdp_err)
    }
}
