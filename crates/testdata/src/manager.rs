//! Environment-aware test data manager
//!
//! Test cases are mapped to data files via `test_mapping.json`; data files
//! are plain JSON objects keyed by dataset name. A per-environment
//! subdirectory may override any shared file without duplicating the rest.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::error::{DataError, DataResult};

/// Name of the mapping file inside the data directory
pub const MAPPING_FILE: &str = "test_mapping.json";

/// Environment selector variable, used when no environment is passed explicitly
pub const ENV_VAR: &str = "TEST_ENV";

/// Environment used when neither an argument nor [`ENV_VAR`] is set
pub const DEFAULT_ENV: &str = "dev";

/// A single entry in `test_mapping.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Base name of the data file, resolved environment-aware at lookup time
    pub data_file: String,

    /// Dataset inside the file; when absent the caller-supplied key is used
    #[serde(default)]
    pub dataset: Option<String>,

    #[serde(default)]
    pub description: String,
}

/// Manager for environment-specific test data stored as JSON files
#[derive(Debug)]
pub struct TestDataManager {
    data_dir: PathBuf,
    env: String,
    mapping_path: PathBuf,
    mapping: Map<String, Value>,
    cache: HashMap<String, Value>,
}

impl TestDataManager {
    /// Create a manager rooted at `data_dir` for the given environment.
    ///
    /// Loads `test_mapping.json`; when the file is missing a placeholder
    /// mapping is written and the manager starts with an empty mapping.
    pub fn new(data_dir: impl Into<PathBuf>, env: &str) -> DataResult<Self> {
        let data_dir = data_dir.into();
        let env = env.to_lowercase();
        let mapping_path = data_dir.join(MAPPING_FILE);
        let mapping = Self::load_mapping(&data_dir, &mapping_path)?;

        info!(env = %env, dir = %data_dir.display(), "initialized test data manager");

        Ok(Self {
            data_dir,
            env,
            mapping_path,
            mapping,
            cache: HashMap::new(),
        })
    }

    /// Create a manager with the environment taken from `TEST_ENV`
    /// (falling back to `dev`).
    pub fn from_env(data_dir: impl Into<PathBuf>) -> DataResult<Self> {
        let env = std::env::var(ENV_VAR).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        Self::new(data_dir, &env)
    }

    /// Active environment name
    pub fn env(&self) -> &str {
        &self.env
    }

    fn load_mapping(data_dir: &Path, mapping_path: &Path) -> DataResult<Map<String, Value>> {
        if !mapping_path.exists() {
            warn!(path = %mapping_path.display(), "test mapping file not found, creating placeholder");
            Self::write_placeholder_mapping(data_dir, mapping_path)?;
            return Ok(Map::new());
        }

        let raw = std::fs::read_to_string(mapping_path)?;
        let value: Value =
            serde_json::from_str(&raw).map_err(|source| DataError::InvalidJson {
                path: mapping_path.to_path_buf(),
                source,
            })?;

        match value {
            Value::Object(map) => {
                debug!(entries = map.len(), "loaded test mapping");
                Ok(map)
            }
            _ => Err(DataError::InvalidFormat {
                path: mapping_path.to_path_buf(),
                reason: "top level must be a JSON object".to_string(),
            }),
        }
    }

    fn write_placeholder_mapping(data_dir: &Path, mapping_path: &Path) -> DataResult<()> {
        std::fs::create_dir_all(data_dir)?;
        let placeholder = json!({
            "_comment": "Map test case IDs to data files and datasets",
            "_example": {
                "test_case_id": {
                    "data_file": "test_data.json",
                    "dataset": "dataset_name",
                    "description": "Description of the test case"
                }
            }
        });
        std::fs::write(mapping_path, serde_json::to_string_pretty(&placeholder)?)?;
        Ok(())
    }

    /// Resolve a base file name to a concrete path.
    ///
    /// Priority: `<data_dir>/<env>/<name>` then `<data_dir>/<name>`.
    fn resolve_file(&self, name: &str) -> DataResult<PathBuf> {
        let env_path = self.data_dir.join(&self.env).join(name);
        if env_path.exists() {
            debug!(path = %env_path.display(), "using environment-specific data file");
            return Ok(env_path);
        }

        let base_path = self.data_dir.join(name);
        if base_path.exists() {
            debug!(path = %base_path.display(), "using base data file");
            return Ok(base_path);
        }

        Err(DataError::NotFound {
            name: name.to_string(),
            env_path,
            base_path,
        })
    }

    fn load_file(&self, path: &Path) -> DataResult<Map<String, Value>> {
        let raw = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&raw).map_err(|source| DataError::InvalidJson {
            path: path.to_path_buf(),
            source,
        })?;
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(DataError::InvalidFormat {
                path: path.to_path_buf(),
                reason: "top level must be a JSON object mapping dataset name to data".to_string(),
            }),
        }
    }

    fn extract_dataset(path: &Path, all: Map<String, Value>, name: &str) -> DataResult<Value> {
        match all.get(name) {
            Some(v) => Ok(v.clone()),
            None => Err(DataError::UnknownDataset {
                name: name.to_string(),
                path: path.to_path_buf(),
                available: all.keys().cloned().collect(),
            }),
        }
    }

    /// Get test data for a test case id, honoring the environment overlay.
    /// Results are cached; every call returns an independent deep copy.
    pub fn get_test_data(&mut self, test_case_id: &str, data_key: Option<&str>) -> DataResult<Value> {
        self.get_test_data_with(test_case_id, data_key, true)
    }

    /// As [`get_test_data`](Self::get_test_data) with explicit cache control
    pub fn get_test_data_with(
        &mut self,
        test_case_id: &str,
        data_key: Option<&str>,
        use_cache: bool,
    ) -> DataResult<Value> {
        let cache_key = match data_key {
            Some(key) => format!("{}:{}", test_case_id, key),
            None => test_case_id.to_string(),
        };

        if use_cache {
            if let Some(cached) = self.cache.get(&cache_key) {
                debug!(key = %cache_key, "returning cached test data");
                return Ok(cached.clone());
            }
        }

        let entry = self.mapping_entry(test_case_id)?;
        let path = self.resolve_file(&entry.data_file)?;
        let all = self.load_file(&path)?;

        // The mapping's dataset wins; the caller-supplied key is the fallback.
        let dataset = entry.dataset.as_deref().or(data_key);
        let data = match dataset {
            Some(name) => Self::extract_dataset(&path, all, name)?,
            None => Value::Object(all),
        };

        self.cache.insert(cache_key, data.clone());
        info!(
            test_case = %test_case_id,
            file = %path.display(),
            env = %self.env,
            "retrieved test data"
        );
        Ok(data)
    }

    fn mapping_entry(&self, test_case_id: &str) -> DataResult<MappingEntry> {
        let raw = self.mapping.get(test_case_id).ok_or_else(|| {
            warn!(test_case = %test_case_id, "test case not found in mapping");
            DataError::UnknownTestCase {
                id: test_case_id.to_string(),
                available: self.list_test_cases(),
            }
        })?;

        serde_json::from_value(raw.clone()).map_err(|e| DataError::InvalidMapping {
            id: test_case_id.to_string(),
            reason: e.to_string(),
        })
    }

    /// Get data directly from a file without a mapping entry. Uncached;
    /// use [`get_data_from_file_with`](Self::get_data_from_file_with) to opt in.
    pub fn get_data_from_file(&mut self, file_name: &str, data_key: Option<&str>) -> DataResult<Value> {
        self.get_data_from_file_with(file_name, data_key, false)
    }

    /// As [`get_data_from_file`](Self::get_data_from_file) with explicit cache control
    pub fn get_data_from_file_with(
        &mut self,
        file_name: &str,
        data_key: Option<&str>,
        use_cache: bool,
    ) -> DataResult<Value> {
        let cache_key = match data_key {
            Some(key) => format!("{}:{}", file_name, key),
            None => file_name.to_string(),
        };

        if use_cache {
            if let Some(cached) = self.cache.get(&cache_key) {
                debug!(key = %cache_key, "returning cached file data");
                return Ok(cached.clone());
            }
        }

        let path = self.resolve_file(file_name)?;
        let all = self.load_file(&path)?;
        let data = match data_key {
            Some(name) => Self::extract_dataset(&path, all, name)?,
            None => Value::Object(all),
        };

        if use_cache {
            self.cache.insert(cache_key, data.clone());
        }
        info!(file = %path.display(), env = %self.env, "loaded data file");
        Ok(data)
    }

    /// List the dataset names available in a data file
    pub fn get_all_datasets(&self, file_name: &str) -> DataResult<Vec<String>> {
        let path = self.resolve_file(file_name)?;
        let all = self.load_file(&path)?;
        Ok(all.keys().cloned().collect())
    }

    /// Merge JSON objects; keys from later objects override earlier ones.
    /// Shallow merge only: nested objects are replaced, not merged.
    pub fn merge_data(&self, parts: &[Value]) -> Value {
        let mut merged = Map::new();
        for part in parts {
            if let Value::Object(map) = part {
                for (k, v) in map {
                    merged.insert(k.clone(), v.clone());
                }
            } else {
                warn!("skipping non-object value in merge");
            }
        }
        debug!(parts = parts.len(), "merged data dictionaries");
        Value::Object(merged)
    }

    /// Shallow-copy `base` and apply flat key overrides on top
    pub fn override_data(&self, base: &Value, overrides: Value) -> Value {
        let mut result = match base {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        if let Value::Object(map) = overrides {
            debug!(count = map.len(), "applying data overrides");
            for (k, v) in map {
                result.insert(k, v);
            }
        }
        Value::Object(result)
    }

    /// Save data to `<data_dir>/<file_name>` (not environment-scoped)
    pub fn save_test_data(&self, file_name: &str, data: &Value, overwrite: bool) -> DataResult<()> {
        let path = self.data_dir.join(file_name);
        if path.exists() && !overwrite {
            return Err(DataError::AlreadyExists(path));
        }

        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::write(&path, serde_json::to_string_pretty(data)?)?;
        info!(path = %path.display(), "saved test data");
        Ok(())
    }

    /// Insert or replace a mapping entry and persist the whole mapping file
    pub fn update_test_mapping(
        &mut self,
        test_case_id: &str,
        data_file: &str,
        dataset: &str,
        description: &str,
    ) -> DataResult<()> {
        let entry = MappingEntry {
            data_file: data_file.to_string(),
            dataset: Some(dataset.to_string()),
            description: description.to_string(),
        };
        self.mapping
            .insert(test_case_id.to_string(), serde_json::to_value(&entry)?);

        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::write(
            &self.mapping_path,
            serde_json::to_string_pretty(&Value::Object(self.mapping.clone()))?,
        )?;
        info!(test_case = %test_case_id, "updated test mapping");
        Ok(())
    }

    /// All mapped test case ids, excluding reserved `_`-prefixed keys
    pub fn list_test_cases(&self) -> Vec<String> {
        self.mapping
            .keys()
            .filter(|k| !k.starts_with('_'))
            .cloned()
            .collect()
    }

    /// Check that data for a test case resolves end to end. This is the one
    /// operation that converts failures into a boolean instead of propagating.
    pub fn validate_test_data(&mut self, test_case_id: &str) -> bool {
        match self.get_test_data_with(test_case_id, None, false) {
            Ok(_) => true,
            Err(e) => {
                warn!(test_case = %test_case_id, error = %e, "test data validation failed");
                false
            }
        }
    }

    /// Drop all cached entries
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        debug!("data cache cleared");
    }
}

impl From<serde_json::Error> for DataError {
    fn from(e: serde_json::Error) -> Self {
        DataError::InvalidJson {
            path: PathBuf::new(),
            source: e,
        }
    }
}
