// jobrun Infrastructure - System Adapters
// Implements: EnvironmentProvider, option file loading

pub mod option_source;
pub mod system_environment;

pub use option_source::{load_options, options_from_json, LoadedOptions, SourceError};
pub use system_environment::SystemEnvironment;
