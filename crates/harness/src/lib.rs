//! WebHarness browser test framework
//!
//! Rust-controlled UI test automation built on a Playwright bridge
//! subprocess:
//! - Launches the browser through a persistent Node.js bridge speaking
//!   JSON lines
//! - Fills and verifies forms from declarative field mappings instead of
//!   per-field code
//! - Loads per-environment configuration and test data
//! - Captures screenshots and HTML snapshots on failure
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Test (Rust)                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BrowserSession                                             │
//! │    ├── launch(&TestConfig) -> session + ReportSink          │
//! │    ├── base_page() / registration_page()                    │
//! │    ├── capture_failure(test_name)                           │
//! │    └── close()                                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BasePage + FieldMapping                                    │
//! │    ├── fill_form_data(mapping, data)                        │
//! │    │     name -> FieldSpec { locator, type, method, ... }   │
//! │    └── verify_form_data(mapping, expected, timeout)         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Actions over dyn Driver                                    │
//! │    └── PlaywrightDriver <-> bridge.js (JSON lines, stdio)   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod actions;
pub mod api;
pub mod config;
pub mod db;
pub mod driver;
pub mod error;
pub mod forms;
pub mod logging;
pub mod page;
pub mod pages;
pub mod playwright;
pub mod report;
pub mod retry;
pub mod session;

pub use actions::Actions;
pub use config::{BrowserKind, TestConfig};
pub use driver::{Driver, Expectation, LocateBy, SelectBy, Target, WaitState};
pub use error::{HarnessError, HarnessResult};
pub use forms::{FieldKind, FieldMapping, FieldSpec, LocateMethod};
pub use page::BasePage;
pub use pages::RegistrationPage;
pub use playwright::PlaywrightDriver;
pub use report::ReportSink;
pub use retry::retry;
pub use session::BrowserSession;
