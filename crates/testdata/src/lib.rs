//! WebHarness test data management
//!
//! Resolves, caches, merges, and persists structured test data from a
//! file-based store, with per-environment override layering:
//!
//! ```text
//! testdata/
//!   test_mapping.json        # test case id -> { data_file, dataset, description }
//!   registration_data.json   # dataset name -> field/value payload
//!   qa/
//!     registration_data.json # overrides the shared file when env = "qa"
//! ```
//!
//! One [`TestDataManager`] is constructed per test session and passed
//! explicitly to consumers; there is no global instance.

pub mod error;
pub mod generate;
pub mod manager;

pub use error::{DataError, DataResult};
pub use manager::{MappingEntry, TestDataManager};
