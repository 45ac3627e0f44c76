// Queue Domain Model

use super::option::{OptionSet, OptionValue};
use serde::Serialize;

/// Queue identifier
pub type QueueName = String;

/// Option key a bare integer queue declaration expands to
pub const LIMIT_KEY: &str = "limit";

/// Normalized queue declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueSpec {
    pub name: QueueName,
    pub options: OptionSet,
}

impl QueueSpec {
    pub fn new(name: impl Into<String>, options: OptionSet) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }

    /// `{limit: value}` shorthand
    pub fn with_limit(name: impl Into<String>, limit: i64) -> Self {
        Self::new(name, OptionSet::new().with(LIMIT_KEY, OptionValue::Int(limit)))
    }

    /// Concurrency limit, if declared
    pub fn limit(&self) -> Option<i64> {
        self.options.get(LIMIT_KEY).and_then(OptionValue::as_int)
    }
}
