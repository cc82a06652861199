//! Playwright driver over a persistent Node.js bridge
//!
//! A single Node child process runs the embedded bridge script and holds
//! the browser, context, and page for the lifetime of the session. Requests
//! and responses are JSON lines over stdin/stdout, strictly one at a time:
//! execution is synchronous per test, so there is no request pipelining.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{BrowserConfig, BrowserKind, Viewport};
use crate::driver::{Driver, Expectation, SelectBy, Target, WaitState};
use crate::error::{HarnessError, HarnessResult};

const BRIDGE_SCRIPT: &str = include_str!("playwright/bridge.js");

/// Margin added to the interaction timeout when waiting for a bridge reply
const RESPONSE_MARGIN: Duration = Duration::from_secs(10);

/// Configuration for the Playwright driver
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub kind: BrowserKind,
    pub headless: bool,
    pub slow_mo_ms: u64,
    pub viewport: Viewport,
    /// Default timeout for element interactions inside the browser
    pub timeout_ms: u64,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            kind: BrowserKind::Chromium,
            headless: true,
            slow_mo_ms: 0,
            viewport: Viewport::default(),
            timeout_ms: 30_000,
        }
    }
}

impl From<&BrowserConfig> for PlaywrightConfig {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            kind: config.kind,
            headless: config.headless,
            slow_mo_ms: config.slow_mo_ms,
            viewport: config.viewport.clone(),
            timeout_ms: config.timeout_ms,
        }
    }
}

#[derive(Debug, Serialize)]
struct BridgeRequest<'a> {
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct BridgeResponse {
    id: u64,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<BridgeErrorBody>,
}

#[derive(Debug, Deserialize)]
struct BridgeErrorBody {
    message: String,
}

struct Bridge {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
}

impl Drop for Bridge {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
    }
}

/// Browser driver backed by Playwright via the Node bridge
pub struct PlaywrightDriver {
    config: PlaywrightConfig,
    bridge: Mutex<Bridge>,
}

impl PlaywrightDriver {
    /// Verify Playwright is installed, start the bridge, and launch the
    /// configured browser.
    pub async fn launch(config: PlaywrightConfig) -> HarnessResult<Self> {
        Self::check_playwright_installed()?;

        // Per-process path so parallel test binaries do not race on the file
        let script_path =
            std::env::temp_dir().join(format!("webharness_bridge_{}.js", std::process::id()));
        std::fs::write(&script_path, BRIDGE_SCRIPT)?;

        info!(browser = config.kind.as_str(), headless = config.headless, "starting browser bridge");

        let mut child = Command::new("node")
            .arg(&script_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| HarnessError::Bridge(format!("failed to spawn node: {}", e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| HarnessError::Bridge("failed to open bridge stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| HarnessError::Bridge("failed to open bridge stdout".to_string()))?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    warn!("[bridge] {}", line);
                }
            });
        }

        let driver = Self {
            config,
            bridge: Mutex::new(Bridge {
                child,
                stdin,
                stdout: BufReader::new(stdout).lines(),
                next_id: 1,
            }),
        };

        let pong = driver.call("ping", json!({})).await?;
        if pong.as_str() != Some("pong") {
            return Err(HarnessError::Bridge(
                "bridge did not answer ping".to_string(),
            ));
        }

        driver
            .call(
                "launch",
                json!({
                    "browser": driver.config.kind.as_str(),
                    "headless": driver.config.headless,
                    "slowMo": driver.config.slow_mo_ms,
                    "viewport": driver.config.viewport,
                    "defaultTimeout": driver.config.timeout_ms,
                }),
            )
            .await?;

        info!("browser launched");
        Ok(driver)
    }

    /// Close the browser and stop the bridge process
    pub async fn close(&self) -> HarnessResult<()> {
        let _ = self.call("shutdown", json!({})).await;
        let mut bridge = self.bridge.lock().await;
        let _ = bridge.child.kill().await;
        info!("browser bridge stopped");
        Ok(())
    }

    fn check_playwright_installed() -> HarnessResult<()> {
        let status = std::process::Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(HarnessError::BrowserNotFound),
        }
    }

    async fn call(&self, method: &str, params: Value) -> HarnessResult<Value> {
        let mut bridge = self.bridge.lock().await;
        let id = bridge.next_id;
        bridge.next_id += 1;

        let request = BridgeRequest { id, method, params };
        let line = serde_json::to_string(&request)?;
        debug!(method, id, "bridge request");

        bridge.stdin.write_all(line.as_bytes()).await?;
        bridge.stdin.write_all(b"\n").await?;
        bridge.stdin.flush().await?;

        let deadline = Duration::from_millis(self.config.timeout_ms) + RESPONSE_MARGIN;
        loop {
            let next = tokio::time::timeout(deadline, bridge.stdout.next_line())
                .await
                .map_err(|_| HarnessError::Timeout {
                    what: format!("bridge reply to '{}'", method),
                    ms: deadline.as_millis() as u64,
                })?;

            let line = next?.ok_or_else(|| {
                HarnessError::Bridge("bridge closed its stdout".to_string())
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let response: BridgeResponse = match serde_json::from_str(&line) {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, "unparseable bridge response line");
                    continue;
                }
            };

            // Requests are strictly sequential; a stale id means the
            // previous call timed out and its reply arrived late.
            if response.id != id {
                debug!(got = response.id, expected = id, "skipping stale bridge reply");
                continue;
            }

            return match response.error {
                Some(err) => Err(HarnessError::Bridge(err.message)),
                None => Ok(response.result.unwrap_or(Value::Null)),
            };
        }
    }

    fn interaction(target: &Target, e: HarnessError) -> HarnessError {
        match e {
            HarnessError::Bridge(reason) => HarnessError::Interaction {
                target: target.to_string(),
                reason,
            },
            other => other,
        }
    }
}

#[async_trait]
impl Driver for PlaywrightDriver {
    async fn goto(&self, url: &str) -> HarnessResult<()> {
        self.call("goto", json!({ "url": url })).await?;
        Ok(())
    }

    async fn title(&self) -> HarnessResult<String> {
        let value = self.call("title", json!({})).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn current_url(&self) -> HarnessResult<String> {
        let value = self.call("url", json!({})).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn content(&self) -> HarnessResult<String> {
        let value = self.call("content", json!({})).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn fill(&self, target: &Target, value: &str) -> HarnessResult<()> {
        self.call("fill", json!({ "target": target, "value": value }))
            .await
            .map_err(|e| Self::interaction(target, e))?;
        Ok(())
    }

    async fn click(&self, target: &Target) -> HarnessResult<()> {
        self.call("click", json!({ "target": target }))
            .await
            .map_err(|e| Self::interaction(target, e))?;
        Ok(())
    }

    async fn check(&self, target: &Target, on: bool) -> HarnessResult<()> {
        self.call("check", json!({ "target": target, "on": on }))
            .await
            .map_err(|e| Self::interaction(target, e))?;
        Ok(())
    }

    async fn select(&self, target: &Target, by: SelectBy, option: &str) -> HarnessResult<()> {
        self.call(
            "selectOption",
            json!({ "target": target, "by": by, "option": option }),
        )
        .await
        .map_err(|e| Self::interaction(target, e))?;
        Ok(())
    }

    async fn upload(&self, target: &Target, file: &Path) -> HarnessResult<()> {
        self.call("upload", json!({ "target": target, "path": file }))
            .await
            .map_err(|e| Self::interaction(target, e))?;
        Ok(())
    }

    async fn inner_text(&self, target: &Target) -> HarnessResult<String> {
        let value = self
            .call("innerText", json!({ "target": target }))
            .await
            .map_err(|e| Self::interaction(target, e))?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn input_value(&self, target: &Target) -> HarnessResult<String> {
        let value = self
            .call("inputValue", json!({ "target": target }))
            .await
            .map_err(|e| Self::interaction(target, e))?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn is_visible(&self, target: &Target) -> HarnessResult<bool> {
        let value = self
            .call("isVisible", json!({ "target": target }))
            .await
            .map_err(|e| Self::interaction(target, e))?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn scroll_into_view(&self, target: &Target) -> HarnessResult<()> {
        self.call("scrollIntoView", json!({ "target": target }))
            .await
            .map_err(|e| Self::interaction(target, e))?;
        Ok(())
    }

    async fn wait_for(
        &self,
        target: &Target,
        state: WaitState,
        timeout: Duration,
    ) -> HarnessResult<()> {
        self.call(
            "waitFor",
            json!({
                "target": target,
                "state": state,
                "timeoutMs": timeout.as_millis() as u64,
            }),
        )
        .await
        .map_err(|e| Self::interaction(target, e))?;
        Ok(())
    }

    async fn expect(
        &self,
        target: &Target,
        expectation: &Expectation,
        timeout: Duration,
    ) -> HarnessResult<()> {
        self.call(
            "expect",
            json!({
                "target": target,
                "expectation": expectation,
                "timeoutMs": timeout.as_millis() as u64,
            }),
        )
        .await
        .map_err(|e| Self::interaction(target, e))?;
        Ok(())
    }

    async fn screenshot(&self, path: &Path, full_page: bool) -> HarnessResult<()> {
        self.call("screenshot", json!({ "path": path, "fullPage": full_page }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_follows_browser_config() {
        let browser = BrowserConfig {
            kind: BrowserKind::Webkit,
            headless: false,
            slow_mo_ms: 50,
            timeout_ms: 5_000,
            viewport: Viewport { width: 800, height: 600 },
        };
        let config = PlaywrightConfig::from(&browser);
        assert_eq!(config.kind, BrowserKind::Webkit);
        assert!(!config.headless);
        assert_eq!(config.timeout_ms, 5_000);
        assert_eq!(config.viewport.width, 800);
    }

    #[test]
    fn bridge_script_handles_every_wire_method() {
        for method in [
            "ping", "launch", "goto", "title", "url", "content", "fill", "click", "check",
            "selectOption", "upload", "innerText", "inputValue", "isVisible", "scrollIntoView",
            "waitFor", "expect", "screenshot", "shutdown",
        ] {
            assert!(
                BRIDGE_SCRIPT.contains(&format!("async {}(", method)),
                "bridge script missing handler for {}",
                method
            );
        }
    }
}
