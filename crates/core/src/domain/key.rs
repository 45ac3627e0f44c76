// Recognized option keys

use serde::Serialize;
use std::fmt;

/// Every option key the validator accepts
///
/// Legacy keys (`crontab`, `timezone`, `poll_interval`) are not listed here:
/// they are rewritten into extensions before validation and never reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKey {
    DispatchCooldown,
    DynamicBackendResolver,
    Engine,
    Extensions,
    LogSeverity,
    Name,
    Node,
    Notifier,
    PersistenceBackend,
    Prefix,
    Queues,
    ShutdownGracePeriod,
    Testing,
}

impl OptionKey {
    pub const ALL: [OptionKey; 13] = [
        OptionKey::DispatchCooldown,
        OptionKey::DynamicBackendResolver,
        OptionKey::Engine,
        OptionKey::Extensions,
        OptionKey::LogSeverity,
        OptionKey::Name,
        OptionKey::Node,
        OptionKey::Notifier,
        OptionKey::PersistenceBackend,
        OptionKey::Prefix,
        OptionKey::Queues,
        OptionKey::ShutdownGracePeriod,
        OptionKey::Testing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKey::DispatchCooldown => "dispatch_cooldown",
            OptionKey::DynamicBackendResolver => "dynamic_backend_resolver",
            OptionKey::Engine => "engine",
            OptionKey::Extensions => "extensions",
            OptionKey::LogSeverity => "log_severity",
            OptionKey::Name => "name",
            OptionKey::Node => "node",
            OptionKey::Notifier => "notifier",
            OptionKey::PersistenceBackend => "persistence_backend",
            OptionKey::Prefix => "prefix",
            OptionKey::Queues => "queues",
            OptionKey::ShutdownGracePeriod => "shutdown_grace_period",
            OptionKey::Testing => "testing",
        }
    }

    /// Look up a raw key; `None` means the key is not part of the option surface
    pub fn from_key(key: &str) -> Option<OptionKey> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
