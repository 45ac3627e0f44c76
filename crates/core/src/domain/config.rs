// Config Record - the immutable, validated result of a build

use super::constants::{
    BASIC_ENGINE, DEFAULT_DISPATCH_COOLDOWN_MS, DEFAULT_NAME, DEFAULT_NOTIFIER, DEFAULT_PREFIX,
    DEFAULT_SHUTDOWN_GRACE_PERIOD_MS,
};
use super::extension::ExtensionSpec;
use super::key::OptionKey;
use super::option::{Callable, CapabilityRef, OptionValue};
use super::queue::QueueSpec;
use crate::error::{ConfigError, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Log severities, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSeverity {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl LogSeverity {
    pub const ALL: [LogSeverity; 8] = [
        LogSeverity::Emergency,
        LogSeverity::Alert,
        LogSeverity::Critical,
        LogSeverity::Error,
        LogSeverity::Warning,
        LogSeverity::Notice,
        LogSeverity::Info,
        LogSeverity::Debug,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogSeverity::Emergency => "emergency",
            LogSeverity::Alert => "alert",
            LogSeverity::Critical => "critical",
            LogSeverity::Error => "error",
            LogSeverity::Warning => "warning",
            LogSeverity::Notice => "notice",
            LogSeverity::Info => "info",
            LogSeverity::Debug => "debug",
        }
    }

    /// Closest `tracing` level; tracing has no levels above ERROR
    pub fn tracing_level(&self) -> tracing::Level {
        match self {
            LogSeverity::Emergency
            | LogSeverity::Alert
            | LogSeverity::Critical
            | LogSeverity::Error => tracing::Level::ERROR,
            LogSeverity::Warning => tracing::Level::WARN,
            LogSeverity::Notice | LogSeverity::Info => tracing::Level::INFO,
            LogSeverity::Debug => tracing::Level::DEBUG,
        }
    }
}

impl FromStr for LogSeverity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| format!("unknown log severity: {}", s))
    }
}

impl fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How long running jobs get to finish on shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GracePeriod {
    Finite(Duration),
    Infinite,
}

impl Serialize for GracePeriod {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            GracePeriod::Finite(d) => serialize_millis(d, serializer),
            GracePeriod::Infinite => serializer.serialize_str(INFINITY),
        }
    }
}

/// Symbol accepted for an infinite grace period
pub const INFINITY: &str = "infinity";

/// Testing mode; anything but `Disabled` turns queues and extensions off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestingMode {
    #[default]
    Disabled,
    Inline,
    Manual,
}

impl TestingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestingMode::Disabled => "disabled",
            TestingMode::Inline => "inline",
            TestingMode::Manual => "manual",
        }
    }
}

impl FromStr for TestingMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "disabled" => Ok(TestingMode::Disabled),
            "inline" => Ok(TestingMode::Inline),
            "manual" => Ok(TestingMode::Manual),
            other => Err(format!("unknown testing mode: {}", other)),
        }
    }
}

fn serialize_millis<S: Serializer>(
    d: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// `None` renders as `false`, the "disabled" marker of the option surface
fn serialize_false_or<T: Serialize, S: Serializer>(
    value: &Option<T>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match value {
        Some(v) => v.serialize(serializer),
        None => serializer.serialize_bool(false),
    }
}

/// Typed fields collected from validated options, before defaults apply
///
/// `node` and `persistence_backend` have no default; [`Config::try_from`]
/// fails if either is missing.
#[derive(Debug, Clone, Default)]
pub struct ConfigFields {
    pub dispatch_cooldown: Option<Duration>,
    pub engine: Option<CapabilityRef>,
    pub dynamic_backend_resolver: Option<Callable>,
    pub log_severity: Option<Option<LogSeverity>>,
    pub name: Option<OptionValue>,
    pub node: Option<String>,
    pub notifier: Option<CapabilityRef>,
    pub extensions: Option<Option<Vec<ExtensionSpec>>>,
    pub prefix: Option<String>,
    pub queues: Option<Option<Vec<QueueSpec>>>,
    pub persistence_backend: Option<CapabilityRef>,
    pub shutdown_grace_period: Option<GracePeriod>,
    pub testing: Option<TestingMode>,
}

/// Validated, immutable configuration for one runtime instance
///
/// Only obtainable through [`Config::try_from`] on [`ConfigFields`], which the
/// builder calls after validation. Fields are read through accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    #[serde(serialize_with = "serialize_millis")]
    dispatch_cooldown: Duration,
    engine: CapabilityRef,
    dynamic_backend_resolver: Option<Callable>,
    #[serde(serialize_with = "serialize_false_or")]
    log_severity: Option<LogSeverity>,
    name: OptionValue,
    node: String,
    notifier: CapabilityRef,
    #[serde(serialize_with = "serialize_false_or")]
    extensions: Option<Vec<ExtensionSpec>>,
    prefix: String,
    #[serde(serialize_with = "serialize_false_or")]
    queues: Option<Vec<QueueSpec>>,
    persistence_backend: CapabilityRef,
    shutdown_grace_period: GracePeriod,
    testing: TestingMode,
}

impl TryFrom<ConfigFields> for Config {
    type Error = ConfigError;

    fn try_from(fields: ConfigFields) -> Result<Self> {
        let node = fields.node.ok_or(ConfigError::MissingField(OptionKey::Node))?;
        let persistence_backend = fields
            .persistence_backend
            .ok_or(ConfigError::MissingField(OptionKey::PersistenceBackend))?;

        Ok(Self {
            dispatch_cooldown: fields
                .dispatch_cooldown
                .unwrap_or(Duration::from_millis(DEFAULT_DISPATCH_COOLDOWN_MS)),
            engine: fields.engine.unwrap_or(BASIC_ENGINE),
            dynamic_backend_resolver: fields.dynamic_backend_resolver,
            log_severity: fields.log_severity.flatten(),
            name: fields
                .name
                .unwrap_or_else(|| OptionValue::symbol(DEFAULT_NAME)),
            node,
            notifier: fields.notifier.unwrap_or(DEFAULT_NOTIFIER),
            extensions: fields.extensions.unwrap_or_else(|| Some(Vec::new())),
            prefix: fields.prefix.unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            queues: fields.queues.unwrap_or_else(|| Some(Vec::new())),
            persistence_backend,
            shutdown_grace_period: fields.shutdown_grace_period.unwrap_or(GracePeriod::Finite(
                Duration::from_millis(DEFAULT_SHUTDOWN_GRACE_PERIOD_MS),
            )),
            testing: fields.testing.unwrap_or_default(),
        })
    }
}

impl Config {
    pub fn dispatch_cooldown(&self) -> Duration {
        self.dispatch_cooldown
    }

    pub fn engine(&self) -> &CapabilityRef {
        &self.engine
    }

    pub fn dynamic_backend_resolver(&self) -> Option<&Callable> {
        self.dynamic_backend_resolver.as_ref()
    }

    /// `None` when logging is disabled
    pub fn log_severity(&self) -> Option<LogSeverity> {
        self.log_severity
    }

    pub fn name(&self) -> &OptionValue {
        &self.name
    }

    /// Node name with surrounding whitespace trimmed
    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn notifier(&self) -> &CapabilityRef {
        &self.notifier
    }

    /// `None` when extensions are disabled
    pub fn extensions(&self) -> Option<&[ExtensionSpec]> {
        self.extensions.as_deref()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `None` when queues are disabled
    pub fn queues(&self) -> Option<&[QueueSpec]> {
        self.queues.as_deref()
    }

    pub fn persistence_backend(&self) -> &CapabilityRef {
        &self.persistence_backend
    }

    pub fn shutdown_grace_period(&self) -> GracePeriod {
        self.shutdown_grace_period
    }

    pub fn testing(&self) -> TestingMode {
        self.testing
    }

    pub fn is_testing(&self) -> bool {
        self.testing != TestingMode::Disabled
    }

    /// Queue declaration by name; the last declaration wins
    pub fn queue(&self, name: &str) -> Option<&QueueSpec> {
        self.queues()?.iter().rev().find(|q| q.name == name)
    }

    pub fn extension(&self, capability: &CapabilityRef) -> Option<&ExtensionSpec> {
        self.extensions()?
            .iter()
            .find(|e| &e.capability == capability)
    }

    pub fn has_extension(&self, capability: &CapabilityRef) -> bool {
        self.extension(capability).is_some()
    }

    /// Backend handle to use right now
    ///
    /// Calls the dynamic resolver when one is configured, otherwise hands
    /// back the static backend reference.
    pub fn resolve_backend(&self) -> OptionValue {
        match &self.dynamic_backend_resolver {
            Some(resolver) => resolver.call(&[]),
            None => OptionValue::Capability(self.persistence_backend.clone()),
        }
    }

    /// Identity string of this instance: rendered name, a dot, then the node
    ///
    /// Dots inside the name or node are not escaped, so name `a.b` on node
    /// `c` and name `a` on node `b.c` share the ident `a.b.c`. Idents are
    /// distinct only while names stay dot-free or nodes are unique across
    /// names.
    pub fn to_ident(&self) -> String {
        format!("{}.{}", self.name, self.node)
    }

    /// Whether `ident` names this instance
    pub fn match_ident(&self, ident: &str) -> bool {
        self.to_ident() == ident
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(node: &str) -> ConfigFields {
        ConfigFields {
            node: Some(node.to_string()),
            persistence_backend: Some(CapabilityRef::new("app.repo")),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_apply_to_unset_fields() {
        let config = Config::try_from(fields("web.1")).unwrap();

        assert_eq!(config.dispatch_cooldown(), Duration::from_millis(5));
        assert_eq!(config.engine(), &BASIC_ENGINE);
        assert_eq!(config.notifier(), &DEFAULT_NOTIFIER);
        assert_eq!(config.log_severity(), None);
        assert_eq!(config.name(), &OptionValue::symbol("Jobrun"));
        assert_eq!(config.prefix(), "public");
        assert_eq!(config.queues(), Some(&[][..]));
        assert_eq!(config.extensions(), Some(&[][..]));
        assert_eq!(
            config.shutdown_grace_period(),
            GracePeriod::Finite(Duration::from_millis(15_000))
        );
        assert!(!config.is_testing());
    }

    #[test]
    fn test_missing_required_fields_fail_construction() {
        let err = Config::try_from(ConfigFields {
            persistence_backend: Some(CapabilityRef::new("app.repo")),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(OptionKey::Node)));

        let err = Config::try_from(ConfigFields {
            node: Some("web.1".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField(OptionKey::PersistenceBackend)
        ));
    }

    #[test]
    fn test_ident_renders_name_and_node() {
        let config = Config::try_from(fields("web.1")).unwrap();
        assert_eq!(config.to_ident(), "Jobrun.web.1");
        assert!(config.match_ident("Jobrun.web.1"));
        assert!(!config.match_ident("Jobrun.web.2"));

        let named = Config::try_from(ConfigFields {
            name: Some(OptionValue::str("Jobrun")),
            ..fields("web.1")
        })
        .unwrap();
        assert_eq!(named.to_ident(), "\"Jobrun\".web.1");
        assert_ne!(named.to_ident(), config.to_ident());
    }

    #[test]
    fn test_queue_lookup_prefers_last_declaration() {
        let config = Config::try_from(ConfigFields {
            queues: Some(Some(vec![
                QueueSpec::with_limit("default", 10),
                QueueSpec::with_limit("mailers", 2),
                QueueSpec::with_limit("default", 20),
            ])),
            ..fields("web.1")
        })
        .unwrap();

        assert_eq!(config.queue("default").and_then(QueueSpec::limit), Some(20));
        assert!(config.queue("missing").is_none());
    }

    #[test]
    fn test_resolve_backend_prefers_dynamic_resolver() {
        let config = Config::try_from(fields("web.1")).unwrap();
        assert_eq!(config.resolve_backend(), OptionValue::capability("app.repo"));

        let dynamic = Config::try_from(ConfigFields {
            dynamic_backend_resolver: Some(Callable::thunk(|| {
                OptionValue::capability("tenant.repo")
            })),
            ..fields("web.1")
        })
        .unwrap();
        assert_eq!(dynamic.resolve_backend(), OptionValue::capability("tenant.repo"));
    }

    #[test]
    fn test_serializes_disabled_lists_as_false() {
        let config = Config::try_from(ConfigFields {
            queues: Some(None),
            extensions: Some(None),
            shutdown_grace_period: Some(GracePeriod::Infinite),
            ..fields("web.1")
        })
        .unwrap();

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["queues"], serde_json::json!(false));
        assert_eq!(json["extensions"], serde_json::json!(false));
        assert_eq!(json["log_severity"], serde_json::json!(false));
        assert_eq!(json["shutdown_grace_period"], serde_json::json!("infinity"));
        assert_eq!(json["dispatch_cooldown"], serde_json::json!(5));
        assert_eq!(json["node"], serde_json::json!("web.1"));
    }

    #[test]
    fn test_log_severity_parse_and_tracing_level() {
        assert_eq!("warning".parse::<LogSeverity>(), Ok(LogSeverity::Warning));
        assert!("verbose".parse::<LogSeverity>().is_err());
        assert_eq!(LogSeverity::Critical.tracing_level(), tracing::Level::ERROR);
        assert_eq!(LogSeverity::Notice.tracing_level(), tracing::Level::INFO);
        assert!(LogSeverity::Emergency < LogSeverity::Debug);
    }
}
