//! Browser session lifecycle
//!
//! One session per test: launch acquires the browser, `close` (or `Drop`)
//! releases it, so a panicking test still tears the bridge down. Page
//! objects handed out by the session share the one driver.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::actions::Actions;
use crate::config::TestConfig;
use crate::driver::Driver;
use crate::error::HarnessResult;
use crate::page::BasePage;
use crate::pages::RegistrationPage;
use crate::playwright::{PlaywrightConfig, PlaywrightDriver};
use crate::report::ReportSink;

pub struct BrowserSession {
    driver: Arc<PlaywrightDriver>,
    report: ReportSink,
    base_url: String,
    timeout: Duration,
    closed: bool,
}

impl BrowserSession {
    /// Start the bridge and launch the configured browser
    pub async fn launch(config: &TestConfig) -> HarnessResult<Self> {
        crate::logging::init();
        info!(env = %config.env, browser = config.browser.kind.as_str(), "launching browser session");

        let driver = PlaywrightDriver::launch(PlaywrightConfig::from(&config.browser)).await?;
        let report = ReportSink::new(&config.reporting)?;

        Ok(Self {
            driver: Arc::new(driver),
            report,
            base_url: config.application.base_url.clone(),
            timeout: Duration::from_millis(config.browser.timeout_ms),
            closed: false,
        })
    }

    pub fn driver(&self) -> Arc<dyn Driver> {
        self.driver.clone()
    }

    pub fn report(&self) -> &ReportSink {
        &self.report
    }

    pub fn actions(&self) -> Actions {
        Actions::new(self.driver(), self.timeout)
    }

    /// Page object sharing this session's driver and report sink
    pub fn base_page(&self) -> BasePage {
        BasePage::new(self.actions(), self.report.clone(), self.base_url.clone())
    }

    pub fn registration_page(&self) -> RegistrationPage {
        RegistrationPage::new(self.base_page())
    }

    /// Capture a full-page screenshot and an HTML snapshot for a failed test
    pub async fn capture_failure(&self, test_name: &str) -> HarnessResult<()> {
        let shot = self.report.screenshot_path(test_name);
        self.driver.screenshot(&shot, true).await?;
        info!(path = %shot.display(), "captured failure screenshot");

        let html = self.driver.content().await?;
        self.report.save_html(test_name, &html)?;
        Ok(())
    }

    /// Orderly teardown of the browser and bridge process
    pub async fn close(mut self) -> HarnessResult<()> {
        self.closed = true;
        self.driver.close().await
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Best-effort: the bridge child is killed with the handle; an
        // un-closed session only loses the orderly browser shutdown.
        if !self.closed {
            warn!("browser session dropped without close(), killing bridge");
        }
    }
}
