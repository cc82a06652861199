//! Interaction driver interface
//!
//! The form engine and generic actions talk to the browser through this
//! trait. The production implementation is [`crate::playwright::PlaywrightDriver`];
//! tests substitute an in-memory recorder.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HarnessResult;

/// How to locate an element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocateBy {
    /// CSS or XPath selector (the default strategy)
    #[default]
    Selector,
    /// Accessible label text
    Label,
    /// Placeholder text
    Placeholder,
    /// ARIA role plus accessible name
    Role,
    /// Visible text content
    Text,
}

/// Declarative element handle passed to the driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub strategy: LocateBy,

    /// Selector, label, placeholder, role name, or text depending on strategy
    pub value: String,

    /// Accessible name, only meaningful for [`LocateBy::Role`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub exact: bool,

    /// Selector of an embedded frame to scope the lookup into
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iframe: Option<String>,
}

impl Target {
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            strategy: LocateBy::Selector,
            value: selector.into(),
            name: None,
            exact: false,
            iframe: None,
        }
    }

    pub fn label(label: impl Into<String>) -> Self {
        Self {
            strategy: LocateBy::Label,
            value: label.into(),
            name: None,
            exact: false,
            iframe: None,
        }
    }

    pub fn placeholder(placeholder: impl Into<String>) -> Self {
        Self {
            strategy: LocateBy::Placeholder,
            value: placeholder.into(),
            name: None,
            exact: false,
            iframe: None,
        }
    }

    pub fn role(role: impl Into<String>, name: Option<String>) -> Self {
        Self {
            strategy: LocateBy::Role,
            value: role.into(),
            name,
            exact: false,
            iframe: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            strategy: LocateBy::Text,
            value: text.into(),
            name: None,
            exact: false,
            iframe: None,
        }
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn in_frame(mut self, iframe: Option<String>) -> Self {
        self.iframe = iframe;
        self
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = match &self.iframe {
            Some(frame) => format!(" in frame '{}'", frame),
            None => String::new(),
        };
        match self.strategy {
            LocateBy::Selector => write!(f, "selector '{}'{}", self.value, scope),
            LocateBy::Label => write!(f, "label '{}'{}", self.value, scope),
            LocateBy::Placeholder => write!(f, "placeholder '{}'{}", self.value, scope),
            LocateBy::Role => match &self.name {
                Some(name) => write!(f, "role '{}' named '{}'{}", self.value, name, scope),
                None => write!(f, "role '{}'{}", self.value, scope),
            },
            LocateBy::Text => write!(f, "text '{}'{}", self.value, scope),
        }
    }
}

/// How a native `<select>` option is identified
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectBy {
    #[default]
    Value,
    Label,
    Index,
}

/// Element lifecycle state to wait for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
}

/// Retry-capable assertion on observable element state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expectation {
    HasValue { value: String },
    HasText { text: String },
    Checked { checked: bool },
    SelectedValue { value: String },
    Visible,
    Enabled,
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::HasValue { value } => write!(f, "value == '{}'", value),
            Expectation::HasText { text } => write!(f, "text == '{}'", text),
            Expectation::Checked { checked } => write!(f, "checked == {}", checked),
            Expectation::SelectedValue { value } => write!(f, "selected value == '{}'", value),
            Expectation::Visible => write!(f, "visible"),
            Expectation::Enabled => write!(f, "enabled"),
        }
    }
}

/// Browser interaction driver.
///
/// Implementations must locate elements by every [`LocateBy`] strategy,
/// wait for state with a bounded timeout, and poll assertions internally
/// until they pass or the timeout elapses.
#[async_trait]
pub trait Driver: Send + Sync {
    async fn goto(&self, url: &str) -> HarnessResult<()>;

    async fn title(&self) -> HarnessResult<String>;

    async fn current_url(&self) -> HarnessResult<String>;

    /// Full HTML of the current page, for failure snapshots
    async fn content(&self) -> HarnessResult<String>;

    async fn fill(&self, target: &Target, value: &str) -> HarnessResult<()>;

    async fn click(&self, target: &Target) -> HarnessResult<()>;

    /// Check (`on = true`) or uncheck a checkbox or radio button
    async fn check(&self, target: &Target, on: bool) -> HarnessResult<()>;

    async fn select(&self, target: &Target, by: SelectBy, option: &str) -> HarnessResult<()>;

    async fn upload(&self, target: &Target, file: &Path) -> HarnessResult<()>;

    async fn inner_text(&self, target: &Target) -> HarnessResult<String>;

    async fn input_value(&self, target: &Target) -> HarnessResult<String>;

    /// Non-throwing visibility probe; absence is `Ok(false)`, not an error
    async fn is_visible(&self, target: &Target) -> HarnessResult<bool>;

    async fn scroll_into_view(&self, target: &Target) -> HarnessResult<()>;

    async fn wait_for(&self, target: &Target, state: WaitState, timeout: Duration)
        -> HarnessResult<()>;

    /// Assert observable state, retrying internally until `timeout`
    async fn expect(
        &self,
        target: &Target,
        expectation: &Expectation,
        timeout: Duration,
    ) -> HarnessResult<()>;

    async fn screenshot(&self, path: &Path, full_page: bool) -> HarnessResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_display_names_strategy() {
        assert_eq!(Target::css("#email").to_string(), "selector '#email'");
        assert_eq!(
            Target::role("button", Some("Submit".into())).to_string(),
            "role 'button' named 'Submit'"
        );
        assert_eq!(
            Target::text("India").in_frame(Some("#payframe".into())).to_string(),
            "text 'India' in frame '#payframe'"
        );
    }

    #[test]
    fn target_serializes_for_the_wire() {
        let target = Target::label("Email").exact(true);
        let json = serde_json::to_value(&target).unwrap();
        assert_eq!(json["strategy"], "label");
        assert_eq!(json["value"], "Email");
        assert_eq!(json["exact"], true);
        assert!(json.get("iframe").is_none());
    }
}
