#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bankin_report::config::selectors;
use bankin_report::scraper::{PageDriver, ScrapeError};

/// Scripted in-memory [`PageDriver`] for exercising the retry and
/// orchestration logic without a browser.
///
/// Element content can be declared globally or per page URL; navigation
/// and submit-wait failures are injected as countdowns that drain one
/// failure per call.
pub struct MockDriver {
    state: Mutex<DriverState>,
}

#[derive(Default)]
struct DriverState {
    url: String,
    url_after_submit: Option<String>,
    goto_failures: HashMap<String, u32>,
    nav_wait_failures: u32,
    elements: HashMap<String, Vec<String>>,
    page_elements: HashMap<(String, String), Vec<String>>,
    goto_log: Vec<String>,
    clicks: Vec<String>,
    typed: Vec<(String, String)>,
}

impl DriverState {
    fn lookup(&self, selector: &str) -> Option<&Vec<String>> {
        self.page_elements
            .get(&(self.url.clone(), selector.to_string()))
            .or_else(|| self.elements.get(selector))
    }
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DriverState::default()),
        }
    }

    pub fn with_url(self, url: &str) -> Self {
        self.state.lock().unwrap().url = url.to_string();
        self
    }

    /// Page the driver "lands on" after the submit button is clicked.
    pub fn url_after_submit(self, url: &str) -> Self {
        self.state.lock().unwrap().url_after_submit = Some(url.to_string());
        self
    }

    pub fn with_element(self, selector: &str, text: &str) -> Self {
        self.with_elements(selector, &[text])
    }

    pub fn with_elements(self, selector: &str, texts: &[&str]) -> Self {
        self.state
            .lock()
            .unwrap()
            .elements
            .insert(selector.to_string(), texts.iter().map(|t| t.to_string()).collect());
        self
    }

    /// Element content visible only while the page is on `url`.
    pub fn with_page_element(self, url: &str, selector: &str, texts: &[&str]) -> Self {
        self.state.lock().unwrap().page_elements.insert(
            (url.to_string(), selector.to_string()),
            texts.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    /// The next `times` calls to `goto(url)` fail.
    pub fn failing_goto(self, url: &str, times: u32) -> Self {
        self.state
            .lock()
            .unwrap()
            .goto_failures
            .insert(url.to_string(), times);
        self
    }

    /// The next `times` calls to `wait_for_navigation` fail.
    pub fn failing_nav_waits(self, times: u32) -> Self {
        self.state.lock().unwrap().nav_wait_failures = times;
        self
    }

    pub fn goto_log(&self) -> Vec<String> {
        self.state.lock().unwrap().goto_log.clone()
    }

    pub fn goto_count(&self, url: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .goto_log
            .iter()
            .filter(|logged| logged.as_str() == url)
            .count()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn typed(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().typed.clone()
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn goto(&self, url: &str) -> Result<(), ScrapeError> {
        let mut state = self.state.lock().unwrap();
        state.goto_log.push(url.to_string());
        if let Some(remaining) = state.goto_failures.get_mut(url) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ScrapeError::Driver("connection reset".to_string()));
            }
        }
        state.url = url.to_string();
        Ok(())
    }

    async fn wait_for_navigation(&self) -> Result<(), ScrapeError> {
        let mut state = self.state.lock().unwrap();
        if state.nav_wait_failures > 0 {
            state.nav_wait_failures -= 1;
            return Err(ScrapeError::Driver(
                "timeout waiting for navigation".to_string(),
            ));
        }
        Ok(())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), ScrapeError> {
        let state = self.state.lock().unwrap();
        if state.lookup(selector).is_some() {
            Ok(())
        } else {
            Err(ScrapeError::ElementTimeout {
                selector: selector.to_string(),
                timeout,
            })
        }
    }

    async fn click(&self, selector: &str) -> Result<(), ScrapeError> {
        let mut state = self.state.lock().unwrap();
        state.clicks.push(selector.to_string());
        if selector == selectors::SUBMIT_BUTTON {
            if let Some(url) = state.url_after_submit.take() {
                state.url = url;
            }
        }
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<(), ScrapeError> {
        self.state
            .lock()
            .unwrap()
            .typed
            .push((selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn element_text(&self, selector: &str) -> Result<Option<String>, ScrapeError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .lookup(selector)
            .and_then(|texts| texts.first())
            .cloned())
    }

    async fn element_texts(&self, selector: &str) -> Result<Vec<String>, ScrapeError> {
        let state = self.state.lock().unwrap();
        Ok(state.lookup(selector).cloned().unwrap_or_default())
    }

    async fn click_nth(&self, selector: &str, index: usize) -> Result<(), ScrapeError> {
        let mut state = self.state.lock().unwrap();
        let count = state.lookup(selector).map(|texts| texts.len()).unwrap_or(0);
        if index >= count {
            return Err(ScrapeError::MissingElement {
                selector: format!("{selector} (index {index})"),
            });
        }
        state.clicks.push(format!("{selector}[{index}]"));
        Ok(())
    }

    async fn current_url(&self) -> Result<String, ScrapeError> {
        Ok(self.state.lock().unwrap().url.clone())
    }
}
