//! Generic element interaction actions
//!
//! Thin adapter over the interaction driver used by page objects and the
//! form engine. Every action logs what it is about to do and propagates
//! driver failures unchanged; retry, when wanted, is the caller's job.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::driver::{Driver, Expectation, SelectBy, Target, WaitState};
use crate::error::{HarnessError, HarnessResult};

/// Generic actions bound to one driver and a default timeout
#[derive(Clone)]
pub struct Actions {
    driver: Arc<dyn Driver>,
    timeout: Duration,
}

impl Actions {
    pub fn new(driver: Arc<dyn Driver>, timeout: Duration) -> Self {
        Self { driver, timeout }
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // ==================== Selector-based actions ====================

    pub async fn fill_textbox(&self, locator: &str, value: &str) -> HarnessResult<()> {
        info!(locator, "filling textbox");
        let target = Target::css(locator);
        self.driver.wait_for(&target, WaitState::Visible, self.timeout).await?;
        self.driver.fill(&target, value).await
    }

    pub async fn fill_textarea(&self, locator: &str, value: &str) -> HarnessResult<()> {
        info!(locator, "filling textarea");
        let target = Target::css(locator);
        self.driver.wait_for(&target, WaitState::Visible, self.timeout).await?;
        self.driver.fill(&target, value).await
    }

    pub async fn select_radio(&self, locator: &str) -> HarnessResult<()> {
        info!(locator, "selecting radio button");
        let target = Target::css(locator);
        self.driver.wait_for(&target, WaitState::Visible, self.timeout).await?;
        self.driver.check(&target, true).await
    }

    pub async fn select_checkbox(&self, locator: &str, check: bool) -> HarnessResult<()> {
        info!(locator, check, "setting checkbox");
        let target = Target::css(locator);
        self.driver.wait_for(&target, WaitState::Visible, self.timeout).await?;
        self.driver.check(&target, check).await
    }

    pub async fn select_dropdown(
        &self,
        target: &Target,
        by: SelectBy,
        option: &str,
    ) -> HarnessResult<()> {
        info!(target = %target, option, "selecting dropdown option");
        self.driver.wait_for(target, WaitState::Visible, self.timeout).await?;
        self.driver.select(target, by, option).await
    }

    /// Click an element. Probes visibility first; when the element is not
    /// yet visible it is scrolled into view and waited for, then clicked.
    pub async fn click(&self, locator: &str) -> HarnessResult<()> {
        self.click_target(&Target::css(locator)).await
    }

    pub async fn click_target(&self, target: &Target) -> HarnessResult<()> {
        info!(target = %target, "clicking element");
        if !self.driver.is_visible(target).await? {
            debug!(target = %target, "element not visible yet, scrolling into view");
            self.driver.scroll_into_view(target).await?;
            self.driver.wait_for(target, WaitState::Visible, self.timeout).await?;
        }
        self.driver.click(target).await
    }

    pub async fn upload_file(&self, locator: &str, file: &Path) -> HarnessResult<()> {
        info!(locator, file = %file.display(), "uploading file");
        self.driver.upload(&Target::css(locator), file).await
    }

    // ==================== Accessibility-based actions ====================

    pub async fn fill_by_label(&self, label: &str, value: &str, exact: bool) -> HarnessResult<()> {
        info!(label, "filling input by label");
        self.driver.fill(&Target::label(label).exact(exact), value).await
    }

    pub async fn fill_by_placeholder(&self, placeholder: &str, value: &str) -> HarnessResult<()> {
        info!(placeholder, "filling input by placeholder");
        self.driver.fill(&Target::placeholder(placeholder), value).await
    }

    pub async fn check_by_label(&self, label: &str, on: bool, exact: bool) -> HarnessResult<()> {
        info!(label, on, "setting checkbox by label");
        self.driver.check(&Target::label(label).exact(exact), on).await
    }

    pub async fn click_by_role(
        &self,
        role: &str,
        name: Option<&str>,
        exact: bool,
    ) -> HarnessResult<()> {
        info!(role, name = name.unwrap_or(""), "clicking by role");
        let target = Target::role(role, name.map(str::to_string)).exact(exact);
        self.driver.click(&target).await
    }

    pub async fn click_button(&self, name: &str, exact: bool) -> HarnessResult<()> {
        self.click_by_role("button", Some(name), exact).await
    }

    pub async fn click_link(&self, name: &str, exact: bool) -> HarnessResult<()> {
        self.click_by_role("link", Some(name), exact).await
    }

    pub async fn click_by_text(&self, text: &str, exact: bool) -> HarnessResult<()> {
        info!(text, "clicking by visible text");
        self.driver.click(&Target::text(text).exact(exact)).await
    }

    // ==================== Reads and probes ====================

    pub async fn get_text(&self, locator: &str) -> HarnessResult<String> {
        let target = Target::css(locator);
        self.driver.wait_for(&target, WaitState::Visible, self.timeout).await?;
        self.driver.inner_text(&target).await
    }

    pub async fn input_value(&self, locator: &str) -> HarnessResult<String> {
        self.driver.input_value(&Target::css(locator)).await
    }

    /// Visibility probe; returns false instead of failing on absence
    pub async fn is_visible(&self, locator: &str) -> bool {
        self.driver
            .is_visible(&Target::css(locator))
            .await
            .unwrap_or(false)
    }

    pub async fn wait_for_element(&self, locator: &str, state: WaitState) -> HarnessResult<()> {
        debug!(locator, ?state, "waiting for element");
        self.driver
            .wait_for(&Target::css(locator), state, self.timeout)
            .await
    }

    pub async fn scroll_to_element(&self, locator: &str) -> HarnessResult<()> {
        self.driver.scroll_into_view(&Target::css(locator)).await
    }

    pub async fn take_screenshot(&self, path: &Path) -> HarnessResult<()> {
        info!(path = %path.display(), "taking screenshot");
        self.driver.screenshot(path, true).await
    }

    // ==================== Retry-capable assertions ====================

    pub async fn assert_value(
        &self,
        target: &Target,
        expected: &str,
        timeout: Option<Duration>,
    ) -> HarnessResult<()> {
        self.expect(target, Expectation::HasValue { value: expected.to_string() }, timeout)
            .await
    }

    pub async fn assert_text(
        &self,
        locator: &str,
        expected: &str,
        timeout: Option<Duration>,
    ) -> HarnessResult<()> {
        self.expect(
            &Target::css(locator),
            Expectation::HasText { text: expected.to_string() },
            timeout,
        )
        .await
    }

    pub async fn assert_visible(&self, locator: &str, timeout: Option<Duration>) -> HarnessResult<()> {
        self.expect(&Target::css(locator), Expectation::Visible, timeout).await
    }

    pub async fn assert_enabled(&self, locator: &str, timeout: Option<Duration>) -> HarnessResult<()> {
        self.expect(&Target::css(locator), Expectation::Enabled, timeout).await
    }

    pub async fn assert_checked(
        &self,
        target: &Target,
        checked: bool,
        timeout: Option<Duration>,
    ) -> HarnessResult<()> {
        self.expect(target, Expectation::Checked { checked }, timeout).await
    }

    pub async fn assert_selected(
        &self,
        target: &Target,
        value: &str,
        timeout: Option<Duration>,
    ) -> HarnessResult<()> {
        self.expect(target, Expectation::SelectedValue { value: value.to_string() }, timeout)
            .await
    }

    async fn expect(
        &self,
        target: &Target,
        expectation: Expectation,
        timeout: Option<Duration>,
    ) -> HarnessResult<()> {
        let timeout = timeout.unwrap_or(self.timeout);
        debug!(target = %target, expectation = %expectation, "asserting element state");
        self.driver
            .expect(target, &expectation, timeout)
            .await
            .map_err(|e| match e {
                HarnessError::Interaction { target, reason } => HarnessError::Assertion {
                    field: target,
                    reason,
                },
                other => other,
            })
    }
}
