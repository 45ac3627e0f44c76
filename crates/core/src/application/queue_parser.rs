// Queue spec parsing
// Expands validated queue declarations into uniform (name, options) specs

use crate::domain::{OptionKey, OptionSet, OptionValue, QueueSpec};
use crate::error::{ConfigError, Result};

/// Parse validated queue declarations
///
/// An integer becomes `{limit: value}`, an option set passes through as is.
/// Order is kept and duplicate names are not merged.
pub fn parse_queues(queues: &OptionSet) -> Result<Vec<QueueSpec>> {
    queues
        .iter()
        .map(|(name, declaration)| match declaration {
            OptionValue::Int(limit) => Ok(QueueSpec::with_limit(name, *limit)),
            OptionValue::Pairs(options) => Ok(QueueSpec::new(name, options.clone())),
            other => Err(ConfigError::invalid(
                OptionKey::Queues,
                other,
                format!("queue {} has no parseable declaration", name),
            )),
        })
        .collect()
}
