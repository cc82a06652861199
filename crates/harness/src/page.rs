//! Base page object and the form engine
//!
//! `BasePage` turns a flat `{field_name: value}` payload plus a
//! [`FieldMapping`] into element interactions (fill) or state assertions
//! (verify). All per-type and per-method behavior lives in the two dispatch
//! functions here; adding a form field is a mapping change, not a code
//! change.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::actions::Actions;
use crate::driver::{Driver, Expectation, SelectBy, Target, WaitState};
use crate::error::{HarnessError, HarnessResult};
use crate::forms::{is_truthy, value_text, FieldKind, FieldMapping, FieldSpec, LocateMethod};
use crate::report::ReportSink;

/// Settle delay after opening a custom dropdown, before picking the option
pub const CUSTOM_DROPDOWN_SETTLE: Duration = Duration::from_millis(500);

pub struct BasePage {
    actions: Actions,
    report: ReportSink,
    base_url: String,
}

impl BasePage {
    pub fn new(actions: Actions, report: ReportSink, base_url: impl Into<String>) -> Self {
        Self {
            actions,
            report,
            base_url: base_url.into(),
        }
    }

    pub fn actions(&self) -> &Actions {
        &self.actions
    }

    pub fn report(&self) -> &ReportSink {
        &self.report
    }

    fn driver(&self) -> &Arc<dyn Driver> {
        self.actions.driver()
    }

    /// Navigate to a path under the base URL, or to an absolute URL
    pub async fn navigate_to(&self, path: &str) -> HarnessResult<()> {
        let url = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        };
        info!(url, "navigating");
        self.driver().goto(&url).await
    }

    pub async fn title(&self) -> HarnessResult<String> {
        self.driver().title().await
    }

    pub async fn current_url(&self) -> HarnessResult<String> {
        self.driver().current_url().await
    }

    /// Fill every mapped field present in `data`.
    ///
    /// Payload keys with no mapping entry are logged and skipped, so a
    /// superset payload is fine. The first interaction failure aborts the
    /// whole fill; the error and a screenshot are attached to the report
    /// before it propagates.
    pub async fn fill_form_data(&self, mapping: &FieldMapping, data: &Value) -> HarnessResult<()> {
        let entries = data.as_object().ok_or_else(|| {
            HarnessError::Config("form payload must be a JSON object".to_string())
        })?;

        for (name, value) in entries {
            let Some(spec) = mapping.get(name) else {
                warn!(field = %name, "no mapping entry for payload field, skipping");
                continue;
            };
            if let Err(err) = self.fill_field(spec, value).await {
                self.attach_failure(name, &err).await;
                return Err(err);
            }
            debug!(field = %name, "field filled");
        }
        Ok(())
    }

    async fn fill_field(&self, spec: &FieldSpec, value: &Value) -> HarnessResult<()> {
        let locator = spec.resolved_locator(value);
        match spec.method {
            LocateMethod::GetByLabel => match spec.kind {
                FieldKind::Checkbox | FieldKind::Radio => {
                    self.actions
                        .check_by_label(&locator, is_truthy(value), spec.exact)
                        .await
                }
                FieldKind::Link | FieldKind::Button => {
                    self.click_if_truthy(Target::label(&locator).exact(spec.exact), value)
                        .await
                }
                _ => {
                    self.actions
                        .fill_by_label(&locator, &value_text(value), spec.exact)
                        .await
                }
            },
            LocateMethod::GetByPlaceholder => {
                self.actions
                    .fill_by_placeholder(&locator, &value_text(value))
                    .await
            }
            LocateMethod::GetByRole => {
                let target =
                    Target::role(&locator, spec.label.clone()).exact(spec.exact);
                self.click_if_truthy(target, value).await
            }
            LocateMethod::GetByText => {
                self.click_if_truthy(Target::text(&locator).exact(spec.exact), value)
                    .await
            }
            LocateMethod::Locator => self.fill_by_kind(spec, &locator, value).await,
        }
    }

    async fn fill_by_kind(
        &self,
        spec: &FieldSpec,
        locator: &str,
        value: &Value,
    ) -> HarnessResult<()> {
        match spec.kind {
            FieldKind::Textbox => self.actions.fill_textbox(locator, &value_text(value)).await,
            FieldKind::Textarea => self.actions.fill_textarea(locator, &value_text(value)).await,
            FieldKind::Radio => self.actions.select_radio(locator).await,
            FieldKind::Checkbox => {
                self.actions.select_checkbox(locator, is_truthy(value)).await
            }
            FieldKind::Dropdown => {
                let target =
                    Target::css(locator).in_frame(spec.iframe_locator.clone());
                let by = spec.select_by.unwrap_or(SelectBy::Value);
                self.actions
                    .select_dropdown(&target, by, &value_text(value))
                    .await
            }
            FieldKind::File => {
                self.actions
                    .upload_file(locator, Path::new(&value_text(value)))
                    .await
            }
            FieldKind::Link | FieldKind::Button => {
                self.click_if_truthy(Target::css(locator), value).await
            }
            FieldKind::CustomDropdown => self.pick_custom_option(spec, value, None).await,
            FieldKind::CustomDropdownIframe => {
                self.pick_custom_option(spec, value, spec.iframe_locator.clone())
                    .await
            }
        }
    }

    /// Open a custom dropdown, let its option list settle, pick by text
    async fn pick_custom_option(
        &self,
        spec: &FieldSpec,
        value: &Value,
        iframe: Option<String>,
    ) -> HarnessResult<()> {
        let opener = if let Some(label) = &spec.label {
            Target::label(label).exact(spec.exact)
        } else if let Some(placeholder) = &spec.placeholder {
            Target::placeholder(placeholder)
        } else {
            Target::css(&spec.locator)
        };
        self.actions.click_target(&opener).await?;

        tokio::time::sleep(CUSTOM_DROPDOWN_SETTLE).await;

        let option = Target::text(value_text(value)).exact(spec.exact).in_frame(iframe);
        self.driver()
            .wait_for(&option, WaitState::Visible, self.actions.timeout())
            .await?;
        self.driver().click(&option).await
    }

    /// Links and buttons activate only on a truthy payload value
    async fn click_if_truthy(&self, target: Target, value: &Value) -> HarnessResult<()> {
        if is_truthy(value) {
            self.actions.click_target(&target).await
        } else {
            debug!(target = %target, "skipping click, value not truthy");
            Ok(())
        }
    }

    /// Assert each mapped field's observable state matches `expected`.
    ///
    /// Locates elements exactly like [`fill_form_data`](Self::fill_form_data)
    /// and applies the type-specific assertion, retrying internally until
    /// `timeout` (defaulting to the actions timeout). An unmet assertion
    /// names the logical field.
    pub async fn verify_form_data(
        &self,
        mapping: &FieldMapping,
        expected: &Value,
        timeout: Option<Duration>,
    ) -> HarnessResult<()> {
        let entries = expected.as_object().ok_or_else(|| {
            HarnessError::Config("expected form data must be a JSON object".to_string())
        })?;

        for (name, value) in entries {
            let Some(spec) = mapping.get(name) else {
                warn!(field = %name, "no mapping entry for expected field, skipping");
                continue;
            };
            if let Err(err) = self.verify_field(spec, value, timeout).await {
                let err = name_assertion(err, name);
                self.attach_failure(name, &err).await;
                return Err(err);
            }
            debug!(field = %name, "field verified");
        }
        Ok(())
    }

    async fn verify_field(
        &self,
        spec: &FieldSpec,
        value: &Value,
        timeout: Option<Duration>,
    ) -> HarnessResult<()> {
        let locator = spec.resolved_locator(value);
        let target = match spec.method {
            LocateMethod::Locator => {
                Target::css(&locator).in_frame(spec.iframe_locator.clone())
            }
            LocateMethod::GetByLabel => Target::label(&locator).exact(spec.exact),
            LocateMethod::GetByPlaceholder => Target::placeholder(&locator),
            LocateMethod::GetByRole => {
                Target::role(&locator, spec.label.clone()).exact(spec.exact)
            }
            LocateMethod::GetByText => Target::text(&locator).exact(spec.exact),
        };

        match spec.kind {
            FieldKind::Textbox | FieldKind::Textarea => {
                self.actions
                    .assert_value(&target, &value_text(value), timeout)
                    .await
            }
            FieldKind::Checkbox => {
                self.actions
                    .assert_checked(&target, is_truthy(value), timeout)
                    .await
            }
            FieldKind::Radio => {
                self.actions
                    .assert_checked(&target, is_truthy(value), timeout)
                    .await
            }
            FieldKind::Dropdown => {
                self.actions
                    .assert_selected(&target, &value_text(value), timeout)
                    .await
            }
            FieldKind::Link => {
                if is_truthy(value) {
                    self.expect_on(&target, Expectation::Visible, timeout).await
                } else {
                    Ok(())
                }
            }
            FieldKind::Button => {
                if is_truthy(value) {
                    self.expect_on(&target, Expectation::Enabled, timeout).await
                } else {
                    Ok(())
                }
            }
            FieldKind::File | FieldKind::CustomDropdown | FieldKind::CustomDropdownIframe => {
                debug!(locator = %spec.locator, "no verification rule for field kind, skipping");
                Ok(())
            }
        }
    }

    async fn expect_on(
        &self,
        target: &Target,
        expectation: Expectation,
        timeout: Option<Duration>,
    ) -> HarnessResult<()> {
        let timeout = timeout.unwrap_or(self.actions.timeout());
        self.driver().expect(target, &expectation, timeout).await
    }

    /// Attach error text and a screenshot before the failure propagates.
    /// Artifact capture is best-effort; its own failures only warn.
    async fn attach_failure(&self, field: &str, err: &HarnessError) {
        warn!(field, error = %err, "form step failed");
        if let Err(save) = self.report.save_error(field, &err.to_string()) {
            warn!(error = %save, "could not save error text");
        }
        let shot = self.report.screenshot_path(field);
        if let Err(capture) = self.driver().screenshot(&shot, true).await {
            warn!(error = %capture, "could not capture failure screenshot");
        }
    }
}

fn name_assertion(err: HarnessError, field: &str) -> HarnessError {
    match err {
        HarnessError::Assertion { reason, .. } => HarnessError::Assertion {
            field: field.to_string(),
            reason,
        },
        HarnessError::Interaction { reason, .. } => HarnessError::Assertion {
            field: field.to_string(),
            reason,
        },
        other => other,
    }
}
