//! Declarative field mappings
//!
//! A form is described as a map from logical field name to a [`FieldSpec`]
//! telling the engine what kind of control it is and how to find it. New
//! form fields are added by extending the mapping, not by writing code.
//! Mappings load from YAML or JSON files or are built in code.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::driver::SelectBy;
use crate::error::{HarnessError, HarnessResult};

/// Placeholder in a locator that is replaced with the payload value
pub const VALUE_PLACEHOLDER: &str = "{value}";

/// What kind of form control a field is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Textbox,
    Textarea,
    Radio,
    Checkbox,
    Dropdown,
    File,
    Link,
    Button,
    /// Non-native dropdown opened by clicking, picked by visible option text
    CustomDropdown,
    /// Custom dropdown whose options render inside an embedded frame
    CustomDropdownIframe,
}

/// How the element is located
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocateMethod {
    /// CSS/XPath selector from `locator` (the default)
    #[default]
    Locator,
    GetByLabel,
    GetByPlaceholder,
    GetByRole,
    GetByText,
}

/// One field's declarative description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Selector, role name, label, or text depending on `method`.
    /// May contain a `{value}` placeholder substituted per payload value.
    pub locator: String,

    #[serde(rename = "type")]
    pub kind: FieldKind,

    #[serde(default)]
    pub method: LocateMethod,

    #[serde(default)]
    pub exact: bool,

    /// Option matching strategy for native dropdowns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select_by: Option<SelectBy>,

    /// Frame selector scoping the lookup, for dropdowns inside an iframe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iframe_locator: Option<String>,

    /// Label text opening a custom dropdown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Placeholder text opening a custom dropdown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl FieldSpec {
    pub fn new(kind: FieldKind, locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            kind,
            method: LocateMethod::Locator,
            exact: false,
            select_by: None,
            iframe_locator: None,
            label: None,
            placeholder: None,
        }
    }

    pub fn textbox(locator: impl Into<String>) -> Self {
        Self::new(FieldKind::Textbox, locator)
    }

    pub fn textarea(locator: impl Into<String>) -> Self {
        Self::new(FieldKind::Textarea, locator)
    }

    pub fn radio(locator: impl Into<String>) -> Self {
        Self::new(FieldKind::Radio, locator)
    }

    pub fn checkbox(locator: impl Into<String>) -> Self {
        Self::new(FieldKind::Checkbox, locator)
    }

    pub fn dropdown(locator: impl Into<String>) -> Self {
        Self::new(FieldKind::Dropdown, locator)
    }

    pub fn file(locator: impl Into<String>) -> Self {
        Self::new(FieldKind::File, locator)
    }

    pub fn link(locator: impl Into<String>) -> Self {
        Self::new(FieldKind::Link, locator)
    }

    pub fn button(locator: impl Into<String>) -> Self {
        Self::new(FieldKind::Button, locator)
    }

    pub fn custom_dropdown(locator: impl Into<String>) -> Self {
        Self::new(FieldKind::CustomDropdown, locator)
    }

    pub fn custom_dropdown_iframe(locator: impl Into<String>, iframe: impl Into<String>) -> Self {
        Self::new(FieldKind::CustomDropdownIframe, locator).in_frame(iframe)
    }

    pub fn method(mut self, method: LocateMethod) -> Self {
        self.method = method;
        self
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn select_by(mut self, by: SelectBy) -> Self {
        self.select_by = Some(by);
        self
    }

    pub fn in_frame(mut self, iframe: impl Into<String>) -> Self {
        self.iframe_locator = Some(iframe.into());
        self
    }

    pub fn opened_by_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn opened_by_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Locator with the `{value}` placeholder substituted when the payload
    /// value is textual. Non-textual values leave the locator untouched.
    pub fn resolved_locator(&self, value: &Value) -> String {
        match value.as_str() {
            Some(text) if self.locator.contains(VALUE_PLACEHOLDER) => {
                self.locator.replace(VALUE_PLACEHOLDER, text)
            }
            _ => self.locator.clone(),
        }
    }
}

/// Ordered map from logical field name to its spec
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    fields: BTreeMap<String, FieldSpec>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion
    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(name.into(), spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn from_yaml(yaml: &str) -> HarnessResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json(json: &str) -> HarnessResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a `.yaml`/`.yml` or `.json` file, by extension
    pub fn from_file(path: &Path) -> HarnessResult<Self> {
        let raw = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&raw),
            Some("json") => Self::from_json(&raw),
            other => Err(HarnessError::Config(format!(
                "unsupported field mapping extension {:?} for {}",
                other,
                path.display()
            ))),
        }
    }
}

/// Truthiness mirrored from the payload's JSON semantics: `null`, `false`,
/// zero, the empty string, and empty containers are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Payload value rendered as the string an input would hold
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn parses_yaml_mapping() {
        let yaml = r##"
email:
  locator: "#email"
  type: textbox
gender:
  locator: 'input[name="gender"][value="{value}"]'
  type: radio
country:
  locator: "#country"
  type: dropdown
  select_by: label
payment:
  locator: "text=Credit Card"
  type: custom_dropdown_iframe
  iframe_locator: "#payframe"
  label: "Payment method"
"##;
        let mapping = FieldMapping::from_yaml(yaml).unwrap();
        assert_eq!(mapping.len(), 4);
        assert_eq!(mapping.get("email").unwrap().kind, FieldKind::Textbox);
        assert_eq!(
            mapping.get("country").unwrap().select_by,
            Some(SelectBy::Label)
        );
        let payment = mapping.get("payment").unwrap();
        assert_eq!(payment.kind, FieldKind::CustomDropdownIframe);
        assert_eq!(payment.iframe_locator.as_deref(), Some("#payframe"));
        assert_eq!(payment.label.as_deref(), Some("Payment method"));
    }

    #[test]
    fn method_defaults_to_locator() {
        let mapping = FieldMapping::from_json(
            r##"{"terms": {"locator": "Terms of Service", "type": "checkbox", "method": "get_by_label"},
                "bio": {"locator": "#bio", "type": "textarea"}}"##,
        )
        .unwrap();
        assert_eq!(mapping.get("terms").unwrap().method, LocateMethod::GetByLabel);
        assert_eq!(mapping.get("bio").unwrap().method, LocateMethod::Locator);
        assert!(!mapping.get("bio").unwrap().exact);
    }

    #[test]
    fn substitutes_value_placeholder_for_text_values_only() {
        let spec = FieldSpec::radio(r#"input[name="gender"][value="{value}"]"#);
        assert_eq!(
            spec.resolved_locator(&json!("male")),
            r#"input[name="gender"][value="male"]"#
        );
        // non-textual payloads leave the placeholder in place
        assert_eq!(
            spec.resolved_locator(&json!(true)),
            r#"input[name="gender"][value="{value}"]"#
        );
        let plain = FieldSpec::textbox("#email");
        assert_eq!(plain.resolved_locator(&json!("x@y.z")), "#email");
    }

    #[test_case(json!(true), true; "bool true")]
    #[test_case(json!("yes"), true; "non empty string")]
    #[test_case(json!(1), true; "non zero number")]
    #[test_case(json!(["x"]), true; "non empty array")]
    #[test_case(json!(false), false; "bool false")]
    #[test_case(json!(""), false; "empty string")]
    #[test_case(json!(0), false; "zero")]
    #[test_case(Value::Null, false; "null")]
    fn truthiness_follows_payload_semantics(value: Value, expected: bool) {
        assert_eq!(is_truthy(&value), expected);
    }

    #[test]
    fn unknown_field_type_fails_to_parse() {
        let err = FieldMapping::from_json(
            r##"{"email": {"locator": "#email", "type": "telepathy"}}"##,
        );
        assert!(err.is_err());
    }

    #[test]
    fn value_text_renders_scalars() {
        assert_eq!(value_text(&json!("abc")), "abc");
        assert_eq!(value_text(&json!(42)), "42");
        assert_eq!(value_text(&Value::Null), "");
    }
}
