// Option validation
//
// One pass over the migrated option set; the first violation aborts the build.
// The typed readers below are shared with record assembly so that checking a
// value and converting it can never disagree.

use crate::domain::config::INFINITY;
use crate::domain::{
    Callable, CapabilityRef, ExtensionSpec, GracePeriod, LogSeverity, OptionKey, OptionSet,
    OptionValue, TestingMode,
};
use crate::error::{ConfigError, Result};
use crate::port::{CapabilityRegistry, Export};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

static PREFIX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z0-9_]+$").expect("prefix pattern is valid"));

/// Validate every option in `options`
///
/// # Errors
/// - ConfigError::UnknownOption for a key outside the option surface
/// - ConfigError::InvalidOption for a value of the wrong type or shape
/// - ConfigError::Capability for an unresolvable or incomplete component
pub fn validate(options: &OptionSet, registry: &CapabilityRegistry) -> Result<()> {
    for (key, value) in options.iter() {
        validate_option(key, value, registry)?;
    }
    debug!(options = options.len(), "Options validated");
    Ok(())
}

/// Validate a single `(key, value)` pair
pub fn validate_option(key: &str, value: &OptionValue, registry: &CapabilityRegistry) -> Result<()> {
    let Some(key) = OptionKey::from_key(key) else {
        return Err(ConfigError::UnknownOption {
            key: key.to_string(),
            value: value.clone(),
        });
    };

    match key {
        OptionKey::DispatchCooldown => positive_millis(key, value).map(drop),
        OptionKey::ShutdownGracePeriod => grace_period(value).map(drop),
        OptionKey::Engine => {
            required_capability(key, value, registry, &Export::ENGINE_INIT).map(drop)
        }
        OptionKey::Notifier => {
            required_capability(key, value, registry, &Export::NOTIFIER_LISTEN).map(drop)
        }
        OptionKey::PersistenceBackend => {
            required_capability(key, value, registry, &Export::BACKEND_CONFIG).map(drop)
        }
        OptionKey::Name => Ok(()),
        OptionKey::Node => node(value).map(drop),
        OptionKey::Prefix => prefix(value).map(drop),
        OptionKey::LogSeverity => log_severity(value).map(drop),
        OptionKey::DynamicBackendResolver => backend_resolver(value).map(drop),
        OptionKey::Testing => testing_mode(value).map(drop),
        OptionKey::Queues => queue_declarations(value).map(drop),
        OptionKey::Extensions => {
            for spec in extension_list(value)?.unwrap_or_default() {
                registry
                    .require(&spec.capability, &Export::EXTENSION_INIT)
                    .map_err(|violation| ConfigError::Capability {
                        key,
                        capability: spec.capability.clone(),
                        violation,
                    })?;
            }
            Ok(())
        }
    }
}

pub(crate) fn positive_millis(key: OptionKey, value: &OptionValue) -> Result<Duration> {
    match value {
        OptionValue::Int(n) if *n > 0 => Ok(Duration::from_millis(n.unsigned_abs())),
        _ => Err(ConfigError::invalid(key, value, "expected a positive integer")),
    }
}

pub(crate) fn grace_period(value: &OptionValue) -> Result<GracePeriod> {
    match value {
        OptionValue::Symbol(s) if s == INFINITY => Ok(GracePeriod::Infinite),
        OptionValue::Int(_) => {
            positive_millis(OptionKey::ShutdownGracePeriod, value).map(GracePeriod::Finite)
        }
        _ => Err(ConfigError::invalid(
            OptionKey::ShutdownGracePeriod,
            value,
            "expected a positive integer or infinity",
        )),
    }
}

pub(crate) fn capability_ref(key: OptionKey, value: &OptionValue) -> Result<CapabilityRef> {
    match value {
        OptionValue::Capability(capability) => Ok(capability.clone()),
        _ => Err(ConfigError::invalid(key, value, "expected a capability reference")),
    }
}

fn required_capability(
    key: OptionKey,
    value: &OptionValue,
    registry: &CapabilityRegistry,
    export: &Export,
) -> Result<CapabilityRef> {
    let capability = capability_ref(key, value)?;
    registry
        .require(&capability, export)
        .map_err(|violation| ConfigError::Capability {
            key,
            capability: capability.clone(),
            violation,
        })?;
    Ok(capability)
}

/// Node name, trimmed
pub(crate) fn node(value: &OptionValue) -> Result<String> {
    match value {
        OptionValue::Str(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(ConfigError::invalid(
            OptionKey::Node,
            value,
            "expected a non-empty string",
        )),
    }
}

pub(crate) fn prefix(value: &OptionValue) -> Result<String> {
    match value {
        OptionValue::Str(s) if PREFIX_PATTERN.is_match(s) => Ok(s.clone()),
        _ => Err(ConfigError::invalid(
            OptionKey::Prefix,
            value,
            "expected an alphanumeric string (letters, digits, underscores)",
        )),
    }
}

/// `None` when logging is disabled with `false`
pub(crate) fn log_severity(value: &OptionValue) -> Result<Option<LogSeverity>> {
    let invalid = || {
        ConfigError::invalid(
            OptionKey::LogSeverity,
            value,
            "expected false or one of emergency, alert, critical, error, warning, notice, info, debug",
        )
    };
    match value {
        OptionValue::Bool(false) => Ok(None),
        OptionValue::Symbol(s) => s.parse::<LogSeverity>().map(Some).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

pub(crate) fn backend_resolver(value: &OptionValue) -> Result<Option<Callable>> {
    match value {
        OptionValue::Nil => Ok(None),
        OptionValue::Callable(callable) if callable.arity() == 0 => Ok(Some(callable.clone())),
        _ => Err(ConfigError::invalid(
            OptionKey::DynamicBackendResolver,
            value,
            "expected nil or a zero-argument callable",
        )),
    }
}

pub(crate) fn testing_mode(value: &OptionValue) -> Result<TestingMode> {
    value
        .as_symbol()
        .and_then(|s| s.parse::<TestingMode>().ok())
        .ok_or_else(|| {
            ConfigError::invalid(
                OptionKey::Testing,
                value,
                "expected one of disabled, inline, manual",
            )
        })
}

/// Queue declarations; `None` when queues are disabled with `false`
pub(crate) fn queue_declarations(value: &OptionValue) -> Result<Option<&OptionSet>> {
    let queues = match value {
        OptionValue::Bool(false) => return Ok(None),
        OptionValue::Pairs(queues) if queues.has_unique_keys() => queues,
        _ => {
            return Err(ConfigError::invalid(
                OptionKey::Queues,
                value,
                "expected false or queue declarations with unique names",
            ))
        }
    };

    for (name, declaration) in queues.iter() {
        match declaration {
            OptionValue::Int(limit) if *limit > 0 => {}
            OptionValue::Pairs(options) if options.has_unique_keys() => {}
            _ => {
                return Err(ConfigError::invalid(
                    OptionKey::Queues,
                    declaration,
                    format!(
                        "queue {} expects a positive limit or options with unique keys",
                        name
                    ),
                ))
            }
        }
    }

    Ok(Some(queues))
}

/// Extension entries in declaration order; `None` when disabled with `false`
pub(crate) fn extension_list(value: &OptionValue) -> Result<Option<Vec<ExtensionSpec>>> {
    match value {
        OptionValue::Bool(false) => Ok(None),
        OptionValue::List(items) => items
            .iter()
            .map(extension_spec)
            .collect::<Result<Vec<_>>>()
            .map(Some),
        _ => Err(ConfigError::invalid(
            OptionKey::Extensions,
            value,
            "expected false or a list of extensions",
        )),
    }
}

/// A bare capability or a `(capability, options)` pair
fn extension_spec(value: &OptionValue) -> Result<ExtensionSpec> {
    match value {
        OptionValue::Capability(capability) => Ok(ExtensionSpec::bare(capability.clone())),
        OptionValue::Tuple(items) => match items.as_slice() {
            [OptionValue::Capability(capability), OptionValue::Pairs(options)]
                if options.has_unique_keys() =>
            {
                Ok(ExtensionSpec::new(capability.clone(), options.clone()))
            }
            [OptionValue::Capability(_), OptionValue::Pairs(_)] => Err(ConfigError::invalid(
                OptionKey::Extensions,
                value,
                "extension options must have unique keys",
            )),
            _ => Err(ConfigError::invalid(
                OptionKey::Extensions,
                value,
                "expected a capability or a (capability, options) pair",
            )),
        },
        _ => Err(ConfigError::invalid(
            OptionKey::Extensions,
            value,
            "expected a capability or a (capability, options) pair",
        )),
    }
}
