// Application Layer - the config build pipeline

pub mod builder;
pub mod extensions;
pub mod migration; // Runs before validation
pub mod node_identity;
pub mod queue_parser;
pub mod validation;

// Re-exports
pub use builder::{build_config, ConfigBuilder};
pub use extensions::normalize_extensions;
pub use migration::{apply_testing_mode, migrate_legacy_options};
pub use node_identity::resolve_node;
pub use queue_parser::parse_queues;
pub use validation::{validate, validate_option};
