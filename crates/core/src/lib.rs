// jobrun Core - configuration validation and normalization
// NO infrastructure dependencies: environment and components come in through ports

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use application::{build_config, ConfigBuilder};
pub use domain::{
    CapabilityRef, Config, ExtensionSpec, GracePeriod, LogSeverity, OptionKey, OptionSet,
    OptionValue, QueueSpec, TestingMode,
};
pub use error::{ConfigError, ErrorKind, Result};
pub use port::{CapabilityRegistry, EnvironmentProvider};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
