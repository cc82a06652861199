//! Registration form page object
//!
//! The whole form surface is the field mapping; methods below are thin
//! wrappers over the engine. Add a field to the mapping when the form
//! changes, not a new method.

use std::time::Duration;

use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::info;

use crate::driver::{SelectBy, Target, WaitState};
use crate::error::{HarnessError, HarnessResult};
use crate::forms::{FieldMapping, FieldSpec};
use crate::page::BasePage;

const SUBMIT_BUTTON: &str = "#submitBtn";
const SUCCESS_MESSAGE: &str = ".success-message";
const ERROR_MESSAGE: &str = ".error-message";
const REGISTRATION_FORM: &str = "#registrationForm";

static FIELD_MAPPING: Lazy<FieldMapping> = Lazy::new(|| {
    FieldMapping::new()
        .field("first_name", FieldSpec::textbox("#firstName"))
        .field("last_name", FieldSpec::textbox("#lastName"))
        .field("email", FieldSpec::textbox("#email"))
        .field("password", FieldSpec::textbox("#password"))
        .field("confirm_password", FieldSpec::textbox("#confirmPassword"))
        .field("phone", FieldSpec::textbox("#phone"))
        .field("date_of_birth", FieldSpec::textbox("#dob"))
        .field("bio", FieldSpec::textarea("#bio"))
        // Dynamic locator, resolved per payload value
        .field(
            "gender",
            FieldSpec::radio(r#"input[name="gender"][value="{value}"]"#),
        )
        .field(
            "country",
            FieldSpec::dropdown("#country").select_by(SelectBy::Value),
        )
        .field("terms_conditions", FieldSpec::checkbox("#terms"))
        .field("newsletter", FieldSpec::checkbox("#newsletter"))
        .field("profile_picture", FieldSpec::file("#profilePicture"))
});

pub struct RegistrationPage {
    page: BasePage,
}

impl RegistrationPage {
    pub fn new(page: BasePage) -> Self {
        Self { page }
    }

    pub fn field_mapping() -> &'static FieldMapping {
        &FIELD_MAPPING
    }

    pub fn base(&self) -> &BasePage {
        &self.page
    }

    /// Open the registration page and wait for the form to render
    pub async fn open(&self, path: &str) -> HarnessResult<()> {
        self.page.navigate_to(path).await?;
        self.page
            .actions()
            .wait_for_element(REGISTRATION_FORM, WaitState::Visible)
            .await
    }

    pub async fn fill_registration_form(&self, data: &Value) -> HarnessResult<()> {
        info!("filling registration form");
        self.page.fill_form_data(&FIELD_MAPPING, data).await
    }

    pub async fn submit_form(&self) -> HarnessResult<()> {
        info!("submitting registration form");
        self.page.actions().click(SUBMIT_BUTTON).await
    }

    pub async fn success_message(&self) -> HarnessResult<String> {
        self.page.actions().get_text(SUCCESS_MESSAGE).await
    }

    pub async fn error_message(&self) -> HarnessResult<String> {
        self.page.actions().get_text(ERROR_MESSAGE).await
    }

    pub async fn is_registration_form_displayed(&self) -> bool {
        self.page.actions().is_visible(REGISTRATION_FORM).await
    }

    /// Clear a mapped field by filling it with an empty string
    pub async fn clear_field(&self, field_name: &str) -> HarnessResult<()> {
        let spec = self.spec(field_name)?;
        self.page
            .actions()
            .driver()
            .fill(&Target::css(&spec.locator), "")
            .await
    }

    pub async fn field_value(&self, field_name: &str) -> HarnessResult<String> {
        let spec = self.spec(field_name)?;
        self.page.actions().input_value(&spec.locator).await
    }

    /// Assert the form shows the expected values
    pub async fn verify_registration_form(
        &self,
        expected: &Value,
        timeout: Option<Duration>,
    ) -> HarnessResult<()> {
        self.page
            .verify_form_data(&FIELD_MAPPING, expected, timeout)
            .await
    }

    fn spec(&self, field_name: &str) -> HarnessResult<&'static FieldSpec> {
        FIELD_MAPPING.get(field_name).ok_or_else(|| {
            HarnessError::Config(format!(
                "field '{}' not found in registration form mapping",
                field_name
            ))
        })
    }
}
