// Domain Layer - option model and the config record

pub mod config;
pub mod constants;
pub mod extension;
pub mod key;
pub mod option;
pub mod queue;

// Re-exports
pub use config::{Config, ConfigFields, GracePeriod, LogSeverity, TestingMode};
pub use extension::ExtensionSpec;
pub use key::OptionKey;
pub use option::{Callable, CapabilityRef, OptionSet, OptionValue};
pub use queue::{QueueName, QueueSpec};
