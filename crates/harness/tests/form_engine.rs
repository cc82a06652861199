//! Form engine behavior against a recording in-memory driver

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use webharness::actions::Actions;
use webharness::config::ReportingConfig;
use webharness::driver::{Driver, Expectation, LocateBy, SelectBy, Target, WaitState};
use webharness::error::{HarnessError, HarnessResult};
use webharness::forms::{FieldMapping, FieldSpec, LocateMethod};
use webharness::page::BasePage;
use webharness::report::ReportSink;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Goto(String),
    Fill { target: Target, value: String },
    Click(Target),
    Check { target: Target, on: bool },
    Select { target: Target, by: SelectBy, option: String },
    Upload { target: Target, path: PathBuf },
    WaitFor(Target),
    Expect { target: Target, expectation: Expectation },
    ScrollIntoView(Target),
    Screenshot(PathBuf),
}

/// Records every driver call; optionally fails fills or expectations whose
/// target contains a configured substring.
#[derive(Default)]
struct RecordingDriver {
    calls: Mutex<Vec<Call>>,
    fail_fill_on: Option<String>,
    fail_expect_on: Option<String>,
}

impl RecordingDriver {
    fn new() -> Self {
        Self::default()
    }

    fn failing_fill(substring: &str) -> Self {
        Self {
            fail_fill_on: Some(substring.to_string()),
            ..Self::default()
        }
    }

    fn failing_expect(substring: &str) -> Self {
        Self {
            fail_expect_on: Some(substring.to_string()),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Driver for RecordingDriver {
    async fn goto(&self, url: &str) -> HarnessResult<()> {
        self.record(Call::Goto(url.to_string()));
        Ok(())
    }

    async fn title(&self) -> HarnessResult<String> {
        Ok("recording".to_string())
    }

    async fn current_url(&self) -> HarnessResult<String> {
        Ok("about:blank".to_string())
    }

    async fn content(&self) -> HarnessResult<String> {
        Ok("<html></html>".to_string())
    }

    async fn fill(&self, target: &Target, value: &str) -> HarnessResult<()> {
        if let Some(bad) = &self.fail_fill_on {
            if target.value.contains(bad.as_str()) {
                return Err(HarnessError::Interaction {
                    target: target.to_string(),
                    reason: "element not actionable".to_string(),
                });
            }
        }
        self.record(Call::Fill {
            target: target.clone(),
            value: value.to_string(),
        });
        Ok(())
    }

    async fn click(&self, target: &Target) -> HarnessResult<()> {
        self.record(Call::Click(target.clone()));
        Ok(())
    }

    async fn check(&self, target: &Target, on: bool) -> HarnessResult<()> {
        self.record(Call::Check {
            target: target.clone(),
            on,
        });
        Ok(())
    }

    async fn select(&self, target: &Target, by: SelectBy, option: &str) -> HarnessResult<()> {
        self.record(Call::Select {
            target: target.clone(),
            by,
            option: option.to_string(),
        });
        Ok(())
    }

    async fn upload(&self, target: &Target, file: &Path) -> HarnessResult<()> {
        self.record(Call::Upload {
            target: target.clone(),
            path: file.to_path_buf(),
        });
        Ok(())
    }

    async fn inner_text(&self, _target: &Target) -> HarnessResult<String> {
        Ok(String::new())
    }

    async fn input_value(&self, _target: &Target) -> HarnessResult<String> {
        Ok(String::new())
    }

    async fn is_visible(&self, _target: &Target) -> HarnessResult<bool> {
        Ok(true)
    }

    async fn scroll_into_view(&self, target: &Target) -> HarnessResult<()> {
        self.record(Call::ScrollIntoView(target.clone()));
        Ok(())
    }

    async fn wait_for(
        &self,
        target: &Target,
        _state: WaitState,
        _timeout: Duration,
    ) -> HarnessResult<()> {
        self.record(Call::WaitFor(target.clone()));
        Ok(())
    }

    async fn expect(
        &self,
        target: &Target,
        expectation: &Expectation,
        _timeout: Duration,
    ) -> HarnessResult<()> {
        if let Some(bad) = &self.fail_expect_on {
            if target.value.contains(bad.as_str()) {
                return Err(HarnessError::Interaction {
                    target: target.to_string(),
                    reason: format!("expectation not met: {}", expectation),
                });
            }
        }
        self.record(Call::Expect {
            target: target.clone(),
            expectation: expectation.clone(),
        });
        Ok(())
    }

    async fn screenshot(&self, path: &Path, _full_page: bool) -> HarnessResult<()> {
        self.record(Call::Screenshot(path.to_path_buf()));
        Ok(())
    }
}

struct Fixture {
    driver: Arc<RecordingDriver>,
    page: BasePage,
    _reports: tempfile::TempDir,
}

fn fixture(driver: RecordingDriver) -> Fixture {
    let reports = tempfile::tempdir().unwrap();
    let reporting = ReportingConfig {
        screenshots_dir: reports.path().join("shots").to_string_lossy().into_owned(),
        snapshots_dir: reports.path().join("snaps").to_string_lossy().into_owned(),
    };
    let sink = ReportSink::new(&reporting).unwrap();

    let driver = Arc::new(driver);
    let actions = Actions::new(driver.clone(), Duration::from_millis(200));
    let page = BasePage::new(actions, sink, "https://app.example.com");
    Fixture {
        driver,
        page,
        _reports: reports,
    }
}

fn registration_mapping() -> FieldMapping {
    FieldMapping::new()
        .field("email", FieldSpec::textbox("#email"))
        .field("phone", FieldSpec::textbox("#phone"))
        .field("bio", FieldSpec::textarea("#bio"))
        .field(
            "gender",
            FieldSpec::radio(r#"input[name="gender"][value="{value}"]"#),
        )
        .field("terms", FieldSpec::checkbox("#terms"))
        .field("newsletter", FieldSpec::checkbox("#newsletter"))
        .field(
            "country",
            FieldSpec::dropdown("#country").select_by(SelectBy::Label),
        )
        .field("submit", FieldSpec::button("#submitBtn"))
}

fn fills(calls: &[Call]) -> Vec<(String, String)> {
    calls
        .iter()
        .filter_map(|c| match c {
            Call::Fill { target, value } => Some((target.value.clone(), value.clone())),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn fills_only_mapped_fields_and_skips_unmapped() {
    let f = fixture(RecordingDriver::new());
    let data = json!({
        "email": "jane@example.com",
        "middle_name": "unmapped",
    });

    f.page
        .fill_form_data(&registration_mapping(), &data)
        .await
        .unwrap();

    let filled = fills(&f.driver.calls());
    assert_eq!(filled, vec![("#email".to_string(), "jane@example.com".to_string())]);
}

#[tokio::test]
async fn substitutes_dynamic_radio_locator() {
    let f = fixture(RecordingDriver::new());

    f.page
        .fill_form_data(&registration_mapping(), &json!({ "gender": "male" }))
        .await
        .unwrap();

    let calls = f.driver.calls();
    assert!(calls.contains(&Call::Check {
        target: Target::css(r#"input[name="gender"][value="male"]"#),
        on: true,
    }));
}

#[tokio::test]
async fn routes_checkbox_booleans_to_check_and_uncheck() {
    let f = fixture(RecordingDriver::new());

    f.page
        .fill_form_data(
            &registration_mapping(),
            &json!({ "terms": true, "newsletter": false }),
        )
        .await
        .unwrap();

    let calls = f.driver.calls();
    assert!(calls.contains(&Call::Check {
        target: Target::css("#terms"),
        on: true,
    }));
    assert!(calls.contains(&Call::Check {
        target: Target::css("#newsletter"),
        on: false,
    }));
}

#[tokio::test]
async fn selects_dropdown_with_configured_strategy_and_frame() {
    let f = fixture(RecordingDriver::new());
    let mapping = FieldMapping::new().field(
        "plan",
        FieldSpec::dropdown("#plan")
            .select_by(SelectBy::Index)
            .in_frame("#checkout-frame"),
    );

    f.page
        .fill_form_data(&mapping, &json!({ "plan": "2" }))
        .await
        .unwrap();

    let calls = f.driver.calls();
    assert!(calls.contains(&Call::Select {
        target: Target::css("#plan").in_frame(Some("#checkout-frame".to_string())),
        by: SelectBy::Index,
        option: "2".to_string(),
    }));
}

#[tokio::test]
async fn custom_dropdown_opens_settles_then_picks_by_text() {
    let f = fixture(RecordingDriver::new());
    let mapping = FieldMapping::new().field(
        "payment",
        FieldSpec::custom_dropdown_iframe("payment", "#payframe").opened_by_label("Payment method"),
    );

    f.page
        .fill_form_data(&mapping, &json!({ "payment": "Credit Card" }))
        .await
        .unwrap();

    let opener = Target::label("Payment method");
    let option = Target::text("Credit Card").in_frame(Some("#payframe".to_string()));
    let calls = f.driver.calls();
    assert_eq!(
        calls,
        vec![
            Call::Click(opener),
            Call::WaitFor(option.clone()),
            Call::Click(option),
        ]
    );
}

#[tokio::test]
async fn buttons_and_links_click_only_on_truthy_values() {
    let f = fixture(RecordingDriver::new());
    let mapping = registration_mapping().field("details", FieldSpec::link("a.details"));

    f.page
        .fill_form_data(&mapping, &json!({ "submit": false, "details": "" }))
        .await
        .unwrap();
    assert!(f.driver.calls().is_empty());

    f.page
        .fill_form_data(&mapping, &json!({ "submit": true }))
        .await
        .unwrap();
    assert!(f.driver.calls().contains(&Call::Click(Target::css("#submitBtn"))));
}

#[tokio::test]
async fn accessible_methods_dispatch_before_kind() {
    let f = fixture(RecordingDriver::new());
    let mapping = FieldMapping::new()
        .field(
            "search",
            FieldSpec::textbox("Search").method(LocateMethod::GetByPlaceholder),
        )
        .field(
            "terms",
            FieldSpec::checkbox("Terms of Service")
                .method(LocateMethod::GetByLabel)
                .exact(true),
        );

    f.page
        .fill_form_data(&mapping, &json!({ "search": "rust", "terms": true }))
        .await
        .unwrap();

    let calls = f.driver.calls();
    assert!(calls.contains(&Call::Fill {
        target: Target::placeholder("Search"),
        value: "rust".to_string(),
    }));
    assert!(calls.contains(&Call::Check {
        target: Target::label("Terms of Service").exact(true),
        on: true,
    }));
}

#[tokio::test]
async fn fill_aborts_on_first_failure_and_captures_artifacts() {
    let f = fixture(RecordingDriver::failing_fill("#email"));
    let data = json!({
        "email": "jane@example.com",
        "phone": "555-0100",
    });

    let err = f
        .page
        .fill_form_data(&registration_mapping(), &data)
        .await
        .unwrap_err();
    assert!(matches!(err, HarnessError::Interaction { .. }));

    // phone sorts after email and must never be reached
    let calls = f.driver.calls();
    assert!(fills(&calls).is_empty());
    assert!(calls
        .iter()
        .any(|c| matches!(c, Call::Screenshot(path) if path.to_string_lossy().contains("email"))));
}

#[tokio::test]
async fn verify_dispatches_type_specific_expectations() {
    let f = fixture(RecordingDriver::new());
    let expected = json!({
        "email": "jane@example.com",
        "terms": true,
        "country": "Norway",
        "gender": "female",
        "submit": true,
    });

    f.page
        .verify_form_data(&registration_mapping(), &expected, None)
        .await
        .unwrap();

    let expectations: Vec<(Target, Expectation)> = f
        .driver
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Expect { target, expectation } => Some((target, expectation)),
            _ => None,
        })
        .collect();

    assert!(expectations.contains(&(
        Target::css("#email"),
        Expectation::HasValue {
            value: "jane@example.com".to_string()
        }
    )));
    assert!(expectations.contains(&(
        Target::css("#terms"),
        Expectation::Checked { checked: true }
    )));
    assert!(expectations.contains(&(
        Target::css("#country"),
        Expectation::SelectedValue {
            value: "Norway".to_string()
        }
    )));
    assert!(expectations.contains(&(
        Target::css(r#"input[name="gender"][value="female"]"#),
        Expectation::Checked { checked: true }
    )));
    assert!(expectations.contains(&(Target::css("#submitBtn"), Expectation::Enabled)));
}

#[tokio::test]
async fn failed_verification_names_the_logical_field() {
    let f = fixture(RecordingDriver::failing_expect("#email"));

    let err = f
        .page
        .verify_form_data(
            &registration_mapping(),
            &json!({ "email": "jane@example.com" }),
            Some(Duration::from_millis(50)),
        )
        .await
        .unwrap_err();

    match err {
        HarnessError::Assertion { field, reason } => {
            assert_eq!(field, "email");
            assert!(reason.contains("expectation not met"));
        }
        other => panic!("expected assertion error, got {}", other),
    }
}

#[tokio::test]
async fn untruthy_link_expectation_is_skipped() {
    let f = fixture(RecordingDriver::new());
    let mapping = FieldMapping::new().field("details", FieldSpec::link("a.details"));

    f.page
        .verify_form_data(&mapping, &json!({ "details": false }), None)
        .await
        .unwrap();
    assert!(f.driver.calls().is_empty());

    f.page
        .verify_form_data(&mapping, &json!({ "details": true }), None)
        .await
        .unwrap();
    assert_eq!(
        f.driver.calls(),
        vec![Call::Expect {
            target: Target::css("a.details"),
            expectation: Expectation::Visible,
        }]
    );
}

#[tokio::test]
async fn navigate_joins_relative_paths_against_base_url() {
    let f = fixture(RecordingDriver::new());

    f.page.navigate_to("/register").await.unwrap();
    f.page.navigate_to("https://other.example.com/x").await.unwrap();

    assert_eq!(
        f.driver.calls(),
        vec![
            Call::Goto("https://app.example.com/register".to_string()),
            Call::Goto("https://other.example.com/x".to_string()),
        ]
    );
}

#[test]
fn locate_strategy_enum_is_closed() {
    // unknown strategies fail at parse time, not at dispatch time
    let err = serde_json::from_str::<LocateBy>("\"quantum\"");
    assert!(err.is_err());
}
