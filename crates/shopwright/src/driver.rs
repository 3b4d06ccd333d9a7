//! Page driver abstraction.
//!
//! Page objects only ever talk to a [`PageDriver`]. The CDP implementation
//! lives in [`crate::browser`] behind the `browser` feature; [`MockDriver`]
//! is an in-memory page used by unit and integration tests.
//!
//! # Implementations
//!
//! - `ChromiumDriver` - real browser via chromiumoxide
//! - `MockDriver` - scripted DOM for tests

use crate::locator::{SelectBy, Selector};
use crate::result::{ShopError, ShopResult};
use crate::wait::LoadState;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Abstract page driver.
///
/// Every query resolves its selector afresh; no element handles are held
/// across calls.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL
    async fn goto(&self, url: &str) -> ShopResult<()>;

    /// Wait until the page reaches a load state
    async fn wait_for_load(&self, state: LoadState) -> ShopResult<()>;

    /// Current URL
    async fn url(&self) -> ShopResult<String>;

    /// Page title
    async fn title(&self) -> ShopResult<String>;

    /// Full page HTML
    async fn content(&self) -> ShopResult<String>;

    /// Number of matching elements
    async fn count(&self, selector: &Selector) -> ShopResult<usize>;

    /// Whether the first match exists and is rendered
    async fn is_visible(&self, selector: &Selector) -> ShopResult<bool>;

    /// Whether the first match is a checked checkbox or radio
    async fn is_checked(&self, selector: &Selector) -> ShopResult<bool>;

    /// Text content of the first match
    async fn text_content(&self, selector: &Selector) -> ShopResult<Option<String>>;

    /// Form value of the first match
    async fn input_value(&self, selector: &Selector) -> ShopResult<Option<String>>;

    /// Attribute of the first match
    async fn attribute(&self, selector: &Selector, name: &str) -> ShopResult<Option<String>>;

    /// Click the first match
    async fn click(&self, selector: &Selector) -> ShopResult<()>;

    /// Replace the value of the first match
    async fn fill(&self, selector: &Selector, value: &str) -> ShopResult<()>;

    /// Choose an option in the first matching dropdown
    async fn select_option(&self, selector: &Selector, by: &SelectBy) -> ShopResult<()>;

    /// Labels of the options of the first matching dropdown
    async fn option_labels(&self, selector: &Selector) -> ShopResult<Vec<String>>;

    /// Check the first matching checkbox if it is not checked
    async fn check(&self, selector: &Selector) -> ShopResult<()>;

    /// Move the pointer over the first match
    async fn hover(&self, selector: &Selector) -> ShopResult<()>;

    /// Scroll the first match into view
    async fn scroll_into_view(&self, selector: &Selector) -> ShopResult<()>;

    /// Evaluate JavaScript in the page
    async fn evaluate(&self, script: &str) -> ShopResult<serde_json::Value>;

    /// Go back in history
    async fn go_back(&self) -> ShopResult<()>;

    /// Close the page
    async fn close(&self) -> ShopResult<()>;
}

/// Dropdown option of a mock element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockOption {
    /// Visible label
    pub label: String,
    /// Submitted value
    pub value: String,
}

/// One element of the mock page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Rendered and interactable
    pub visible: bool,
    /// Checkbox/radio state
    pub checked: bool,
    /// Form value
    pub value: String,
    /// Text content
    pub text: String,
    /// Attributes
    pub attributes: HashMap<String, String>,
    /// Dropdown options
    pub options: Vec<MockOption>,
    /// Upcoming clicks that fail as if intercepted
    pub fail_clicks: usize,
}

impl Default for MockElement {
    fn default() -> Self {
        Self {
            visible: true,
            checked: false,
            value: String::new(),
            text: String::new(),
            attributes: HashMap::new(),
            options: Vec::new(),
            fail_clicks: 0,
        }
    }
}

impl MockElement {
    /// A visible element with no content
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set form value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Add dropdown options as (label, value) pairs
    #[must_use]
    pub fn with_options<I, L, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (L, V)>,
        L: Into<String>,
        V: Into<String>,
    {
        self.options.extend(options.into_iter().map(|(l, v)| MockOption {
            label: l.into(),
            value: v.into(),
        }));
        self
    }

    /// Make the element a checkbox
    #[must_use]
    pub fn checkbox(self, checked: bool) -> Self {
        let mut el = self.with_attr("type", "checkbox");
        el.checked = checked;
        el
    }

    /// Make the element present but not rendered
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Fail the next `n` clicks
    #[must_use]
    pub const fn failing_clicks(mut self, n: usize) -> Self {
        self.fail_clicks = n;
        self
    }
}

/// In-memory page state
#[derive(Debug, Default)]
pub struct MockDom {
    elements: HashMap<String, Vec<MockElement>>,
    /// Current URL
    pub url: String,
    /// Page title
    pub title: String,
    /// Page HTML
    pub content: String,
    /// Whether the page has been closed
    pub closed: bool,
}

// Elements live under the selector with any outer `nth` stripped, so
// registering under `sel.first()` and querying `sel.last()` agree.
fn storage_key(selector: &Selector) -> String {
    match selector {
        Selector::Nth { base, .. } => storage_key(base),
        other => other.to_string(),
    }
}

impl MockDom {
    /// Append an element under a selector
    pub fn insert(&mut self, selector: &Selector, element: MockElement) {
        self.elements
            .entry(storage_key(selector))
            .or_default()
            .push(element);
    }

    /// Replace every element under a selector
    pub fn set(&mut self, selector: &Selector, elements: Vec<MockElement>) {
        self.elements.insert(storage_key(selector), elements);
    }

    /// Remove every element under a selector
    pub fn remove(&mut self, selector: &Selector) {
        self.elements.remove(&storage_key(selector));
    }

    /// Remove every element
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// First element registered under a selector
    pub fn first_mut(&mut self, selector: &Selector) -> Option<&mut MockElement> {
        self.elements
            .get_mut(&storage_key(selector))
            .and_then(|els| els.first_mut())
    }

    /// Elements registered under a selector
    #[must_use]
    pub fn all(&self, selector: &Selector) -> &[MockElement] {
        self.elements
            .get(&storage_key(selector))
            .map_or(&[][..], Vec::as_slice)
    }

    fn locate(&self, selector: &Selector) -> Vec<(String, usize)> {
        match selector {
            Selector::Nth { base, index } => {
                let all = self.locate(base);
                let len = all.len() as i64;
                let i = if *index < 0 {
                    len + i64::from(*index)
                } else {
                    i64::from(*index)
                };
                if (0..len).contains(&i) {
                    vec![all[i as usize].clone()]
                } else {
                    Vec::new()
                }
            }
            Selector::Or(a, b) => {
                let mut found = self.locate(a);
                found.extend(self.locate(b));
                found
            }
            other => {
                let key = other.to_string();
                let n = self.elements.get(&key).map_or(0, Vec::len);
                (0..n).map(|i| (key.clone(), i)).collect()
            }
        }
    }

    fn element(&self, loc: &(String, usize)) -> Option<&MockElement> {
        self.elements.get(&loc.0).and_then(|els| els.get(loc.1))
    }

    fn element_mut(&mut self, loc: &(String, usize)) -> Option<&mut MockElement> {
        self.elements.get_mut(&loc.0).and_then(|els| els.get_mut(loc.1))
    }

    fn first(&self, selector: &Selector) -> Option<&MockElement> {
        self.locate(selector)
            .first()
            .and_then(|loc| self.element(loc))
    }
}

/// Page mutation run when the mock reacts to an action
pub type MockHandler = Arc<dyn Fn(&mut MockDom) + Send + Sync>;

/// Mock driver for unit testing.
///
/// Elements are registered under the `Display` form of a selector. `Nth` and
/// `Or` selectors are resolved structurally, everything else by that key.
/// Handlers registered with [`MockDriver::on_click`], [`MockDriver::on_change`]
/// and [`MockDriver::on_goto`] play the role of page scripts.
#[derive(Default)]
pub struct MockDriver {
    dom: Mutex<MockDom>,
    click_handlers: Mutex<HashMap<String, MockHandler>>,
    change_handlers: Mutex<HashMap<String, MockHandler>>,
    goto_handlers: Mutex<HashMap<String, MockHandler>>,
    evaluate_results: Mutex<Vec<(String, serde_json::Value)>>,
    call_history: Mutex<Vec<String>>,
    calls_until_close: Mutex<Option<usize>>,
}

impl fmt::Debug for MockDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockDriver")
            .field("dom", &self.dom)
            .field("call_history", &self.call_history)
            .finish_non_exhaustive()
    }
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking test handler must not wedge the rest of the run.
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutate the page directly
    pub fn with_dom<R>(&self, f: impl FnOnce(&mut MockDom) -> R) -> R {
        f(&mut guard(&self.dom))
    }

    /// Add an element
    pub fn insert(&self, selector: impl Into<Selector>, element: MockElement) {
        self.with_dom(|dom| dom.insert(&selector.into(), element));
    }

    /// React to clicks (and state-changing checks) on a selector
    pub fn on_click<F>(&self, selector: impl Into<Selector>, handler: F)
    where
        F: Fn(&mut MockDom) + Send + Sync + 'static,
    {
        guard(&self.click_handlers).insert(storage_key(&selector.into()), Arc::new(handler));
    }

    /// React to a dropdown selection on a selector
    pub fn on_change<F>(&self, selector: impl Into<Selector>, handler: F)
    where
        F: Fn(&mut MockDom) + Send + Sync + 'static,
    {
        guard(&self.change_handlers).insert(storage_key(&selector.into()), Arc::new(handler));
    }

    /// Build the page when a URL is opened
    pub fn on_goto<F>(&self, url: impl Into<String>, handler: F)
    where
        F: Fn(&mut MockDom) + Send + Sync + 'static,
    {
        guard(&self.goto_handlers).insert(url.into(), Arc::new(handler));
    }

    /// Return `value` from `evaluate` for scripts containing `fragment`
    pub fn on_evaluate(&self, fragment: impl Into<String>, value: serde_json::Value) {
        guard(&self.evaluate_results).push((fragment.into(), value));
    }

    /// Close the page once `n` more driver calls have gone through
    pub fn close_after_calls(&self, n: usize) {
        *guard(&self.calls_until_close) = Some(n);
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        guard(&self.call_history).clone()
    }

    /// Check if a call starting with `prefix` was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        guard(&self.call_history)
            .iter()
            .any(|c| c.starts_with(prefix))
    }

    /// Number of calls starting with `prefix`
    #[must_use]
    pub fn call_count(&self, prefix: &str) -> usize {
        guard(&self.call_history)
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        guard(&self.call_history).push(call);
    }

    fn open_dom(&self) -> ShopResult<MutexGuard<'_, MockDom>> {
        let mut dom = guard(&self.dom);
        if let Some(left) = guard(&self.calls_until_close).as_mut() {
            if *left == 0 {
                dom.closed = true;
            } else {
                *left -= 1;
            }
        }
        if dom.closed {
            return Err(ShopError::driver("Target page, context or browser has been closed"));
        }
        Ok(dom)
    }

    fn read<T>(&self, selector: &Selector, f: impl FnOnce(&MockElement) -> T) -> ShopResult<Option<T>> {
        let dom = self.open_dom()?;
        Ok(dom.first(selector).map(f))
    }

    fn run_handler(&self, handlers: &Mutex<HashMap<String, MockHandler>>, key: &str) {
        let handler = guard(handlers).get(key).cloned();
        if let Some(handler) = handler {
            handler(&mut guard(&self.dom));
        }
    }

    fn interactable(dom: &MockDom, selector: &Selector) -> ShopResult<(String, usize)> {
        let loc = dom
            .locate(selector)
            .into_iter()
            .next()
            .ok_or_else(|| ShopError::driver(format!("no element matches {selector}")))?;
        match dom.element(&loc) {
            Some(el) if el.visible => Ok(loc),
            _ => Err(ShopError::driver(format!("element {selector} is not visible"))),
        }
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn goto(&self, url: &str) -> ShopResult<()> {
        self.record(format!("goto:{url}"));
        {
            let mut dom = self.open_dom()?;
            dom.url = url.to_string();
            dom.clear();
        }
        self.run_handler(&self.goto_handlers, url);
        Ok(())
    }

    async fn wait_for_load(&self, state: LoadState) -> ShopResult<()> {
        self.record(format!("wait_for_load:{state}"));
        self.open_dom().map(|_| ())
    }

    async fn url(&self) -> ShopResult<String> {
        Ok(self.open_dom()?.url.clone())
    }

    async fn title(&self) -> ShopResult<String> {
        Ok(self.open_dom()?.title.clone())
    }

    async fn content(&self) -> ShopResult<String> {
        Ok(self.open_dom()?.content.clone())
    }

    async fn count(&self, selector: &Selector) -> ShopResult<usize> {
        Ok(self.open_dom()?.locate(selector).len())
    }

    async fn is_visible(&self, selector: &Selector) -> ShopResult<bool> {
        Ok(self.read(selector, |el| el.visible)?.unwrap_or(false))
    }

    async fn is_checked(&self, selector: &Selector) -> ShopResult<bool> {
        Ok(self.read(selector, |el| el.checked)?.unwrap_or(false))
    }

    async fn text_content(&self, selector: &Selector) -> ShopResult<Option<String>> {
        self.read(selector, |el| el.text.clone())
    }

    async fn input_value(&self, selector: &Selector) -> ShopResult<Option<String>> {
        self.read(selector, |el| el.value.clone())
    }

    async fn attribute(&self, selector: &Selector, name: &str) -> ShopResult<Option<String>> {
        Ok(self
            .read(selector, |el| el.attributes.get(name).cloned())?
            .flatten())
    }

    async fn click(&self, selector: &Selector) -> ShopResult<()> {
        let key = {
            let mut dom = self.open_dom()?;
            let loc = Self::interactable(&dom, selector)?;
            if let Some(el) = dom.element_mut(&loc) {
                if el.fail_clicks > 0 {
                    el.fail_clicks -= 1;
                    drop(dom);
                    self.record(format!("click_failed:{selector}"));
                    return Err(ShopError::driver(format!(
                        "click on {selector} was intercepted"
                    )));
                }
                match el.attributes.get("type").map(String::as_str) {
                    Some("checkbox") => el.checked = !el.checked,
                    Some("radio") => el.checked = true,
                    _ => {}
                }
            }
            loc.0
        };
        self.record(format!("click:{selector}"));
        self.run_handler(&self.click_handlers, &key);
        Ok(())
    }

    async fn fill(&self, selector: &Selector, value: &str) -> ShopResult<()> {
        {
            let mut dom = self.open_dom()?;
            let loc = Self::interactable(&dom, selector)?;
            if let Some(el) = dom.element_mut(&loc) {
                el.value = value.to_string();
            }
        }
        self.record(format!("fill:{selector}={value}"));
        Ok(())
    }

    async fn select_option(&self, selector: &Selector, by: &SelectBy) -> ShopResult<()> {
        let key = {
            let mut dom = self.open_dom()?;
            let loc = Self::interactable(&dom, selector)?;
            if let Some(el) = dom.element_mut(&loc) {
                let chosen = el
                    .options
                    .iter()
                    .find(|o| match by {
                        SelectBy::Label(label) => o.label == *label,
                        SelectBy::Value(value) => o.value == *value,
                    })
                    .map(|o| o.value.clone())
                    .ok_or_else(|| {
                        ShopError::driver(format!("{selector} has no option with {by}"))
                    })?;
                el.value = chosen;
            }
            loc.0
        };
        self.record(format!("select:{selector}={}", by.as_str()));
        self.run_handler(&self.change_handlers, &key);
        Ok(())
    }

    async fn option_labels(&self, selector: &Selector) -> ShopResult<Vec<String>> {
        Ok(self
            .read(selector, |el| {
                el.options.iter().map(|o| o.label.clone()).collect()
            })?
            .unwrap_or_default())
    }

    async fn check(&self, selector: &Selector) -> ShopResult<()> {
        let (key, changed) = {
            let mut dom = self.open_dom()?;
            let loc = Self::interactable(&dom, selector)?;
            let changed = match dom.element_mut(&loc) {
                Some(el) if !el.checked => {
                    el.checked = true;
                    true
                }
                _ => false,
            };
            (loc.0, changed)
        };
        self.record(format!("check:{selector}"));
        if changed {
            self.run_handler(&self.click_handlers, &key);
        }
        Ok(())
    }

    async fn hover(&self, selector: &Selector) -> ShopResult<()> {
        {
            let dom = self.open_dom()?;
            Self::interactable(&dom, selector)?;
        }
        self.record(format!("hover:{selector}"));
        Ok(())
    }

    async fn scroll_into_view(&self, selector: &Selector) -> ShopResult<()> {
        {
            let dom = self.open_dom()?;
            if dom.locate(selector).is_empty() {
                return Err(ShopError::driver(format!("no element matches {selector}")));
            }
        }
        self.record(format!("scroll:{selector}"));
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> ShopResult<serde_json::Value> {
        self.open_dom()?;
        self.record(format!("evaluate:{script}"));
        let found = guard(&self.evaluate_results)
            .iter()
            .find(|(fragment, _)| script.contains(fragment.as_str()))
            .map(|(_, value)| value.clone());
        Ok(found.unwrap_or(serde_json::Value::Null))
    }

    async fn go_back(&self) -> ShopResult<()> {
        self.open_dom()?;
        self.record("go_back".to_string());
        Ok(())
    }

    async fn close(&self) -> ShopResult<()> {
        self.record("close".to_string());
        let mut dom = self.open_dom()?;
        dom.closed = true;
        Ok(())
    }
}
