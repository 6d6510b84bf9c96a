use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const MAX_LABEL_LENGTH: usize = 64;

/// Where status filtering happens. Fixed for the lifetime of a controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilterMode {
    /// Status narrows the derived view only; pagination is untouched.
    #[default]
    Local,
    /// Status is sent with every page request; changing it refetches page 1.
    Server,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Name used in logs, e.g. `"my-jobs"`.
    pub label: String,
    pub page_size: u32,
    pub status_filter: StatusFilterMode,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            label: "collection".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            status_filter: StatusFilterMode::Local,
        }
    }
}

impl CollectionConfig {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_status_filter(mut self, mode: StatusFilterMode) -> Self {
        self.status_filter = mode;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.label.trim().is_empty() {
            return Err(ConfigError::Invalid("label cannot be empty".into()));
        }
        if self.label.len() > MAX_LABEL_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "label exceeds {MAX_LABEL_LENGTH} characters"
            )));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be > 0".into()));
        }
        if self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "page_size must be <= {MAX_PAGE_SIZE}"
            )));
        }
        Ok(())
    }
}
