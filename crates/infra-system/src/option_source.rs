// Option source: options file layered under JOBRUN__* environment variables
// reason: config crate for format detection and layering, serde_json as the
// neutral value shape handed to the conversion below
use std::path::Path;

use config::{Config as Settings, Environment, File};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use jobrun_core::domain::config::INFINITY;
use jobrun_core::port::{CapabilityRegistry, Export};
use jobrun_core::{CapabilityRef, OptionKey, OptionSet, OptionValue};

/// Environment variables named `JOBRUN__<KEY>` override file options
pub const ENV_PREFIX: &str = "JOBRUN";
pub const ENV_SEPARATOR: &str = "__";

/// Table of extra component declarations: `name = ["init/1", ...]`
pub const CAPABILITIES_KEY: &str = "capabilities";

/// Option source errors
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to load options: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Options must be a table, got {0}")]
    NotATable(String),

    #[error("Invalid capability declaration for {name}: {reason}")]
    Capability { name: String, reason: String },
}

/// Raw options plus the component declarations found next to them
#[derive(Debug, Default)]
pub struct LoadedOptions {
    pub options: OptionSet,
    pub capabilities: Vec<(CapabilityRef, Vec<Export>)>,
}

impl LoadedOptions {
    /// Declare every loaded component in `registry`
    pub fn declare_into(&self, registry: &mut CapabilityRegistry) {
        for (capability, exports) in &self.capabilities {
            registry.declare(capability.clone(), exports.iter().cloned());
        }
    }
}

/// Load options from `path` (format by extension) and the environment
///
/// Keys from the file keep their case, so queue names and capability
/// declarations round-trip as written. Environment keys arrive lowercased.
///
/// # Errors
/// - SourceError::Load if the file is missing or unparseable
/// - SourceError::Capability for a malformed `capabilities` entry
pub fn load_options(path: Option<&Path>) -> Result<LoadedOptions, SourceError> {
    let mut builder = Settings::builder();
    if let Some(path) = path {
        debug!(path = %path.display(), "Loading options file");
        builder = builder.add_source(File::from(path));
    }
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let raw: Value = builder.build()?.try_deserialize()?;
    options_from_json(&raw)
}

/// Convert a JSON-shaped option table into typed options
///
/// Strings under capability keys become capability references; strings
/// under `name`, `log_severity` and `testing` become symbols, as does
/// `shutdown_grace_period = "infinity"`. Extension entries are a name or a
/// `[name, {options}]` pair.
pub fn options_from_json(raw: &Value) -> Result<LoadedOptions, SourceError> {
    let Value::Object(table) = raw else {
        return Err(SourceError::NotATable(raw.to_string()));
    };

    let mut loaded = LoadedOptions::default();
    for (key, value) in table {
        if key == CAPABILITIES_KEY {
            loaded.capabilities = capability_declarations(value)?;
        } else {
            loaded.options.push(key.as_str(), convert_option(key, value));
        }
    }

    debug!(
        options = loaded.options.len(),
        capabilities = loaded.capabilities.len(),
        "Options converted"
    );
    Ok(loaded)
}

fn capability_declarations(value: &Value) -> Result<Vec<(CapabilityRef, Vec<Export>)>, SourceError> {
    let Value::Object(entries) = value else {
        return Err(SourceError::Capability {
            name: CAPABILITIES_KEY.to_string(),
            reason: "expected a table of name = [exports]".to_string(),
        });
    };

    entries
        .iter()
        .map(|(name, exports)| {
            let invalid = |reason: String| SourceError::Capability {
                name: name.clone(),
                reason,
            };
            let Value::Array(exports) = exports else {
                return Err(invalid("expected a list of name/arity strings".to_string()));
            };
            let exports = exports
                .iter()
                .map(|export| {
                    export
                        .as_str()
                        .ok_or_else(|| format!("expected a string, got {}", export))
                        .and_then(str::parse::<Export>)
                        .map_err(invalid)
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok((CapabilityRef::new(name.as_str()), exports))
        })
        .collect()
}

fn convert_option(key: &str, value: &Value) -> OptionValue {
    match (OptionKey::from_key(key), value) {
        (
            Some(OptionKey::Engine | OptionKey::Notifier | OptionKey::PersistenceBackend),
            Value::String(s),
        ) => OptionValue::capability(s.as_str()),
        (
            Some(OptionKey::Name | OptionKey::LogSeverity | OptionKey::Testing),
            Value::String(s),
        ) => OptionValue::symbol(s.as_str()),
        (Some(OptionKey::ShutdownGracePeriod), Value::String(s)) if s == INFINITY => {
            OptionValue::symbol(s.as_str())
        }
        (Some(OptionKey::Extensions), Value::Array(items)) => {
            OptionValue::List(items.iter().map(convert_extension).collect())
        }
        _ => convert_value(value),
    }
}

fn convert_extension(value: &Value) -> OptionValue {
    match value {
        Value::String(name) => OptionValue::capability(name.as_str()),
        Value::Array(pair) => match pair.as_slice() {
            [Value::String(name), Value::Object(options)] => {
                OptionValue::extension(CapabilityRef::new(name.as_str()), convert_table(options))
            }
            _ => convert_value(value),
        },
        _ => convert_value(value),
    }
}

fn convert_table(table: &Map<String, Value>) -> OptionSet {
    table
        .iter()
        .map(|(k, v)| (k.as_str(), convert_value(v)))
        .collect()
}

fn convert_value(value: &Value) -> OptionValue {
    match value {
        Value::Null => OptionValue::Nil,
        Value::Bool(b) => OptionValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => OptionValue::Int(i),
            None => OptionValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => OptionValue::Str(s.clone()),
        Value::Array(items) => OptionValue::List(items.iter().map(convert_value).collect()),
        Value::Object(table) => OptionValue::Pairs(convert_table(table)),
    }
}
