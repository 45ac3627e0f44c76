// Port Layer - Interfaces for external collaborators

pub mod capability;
pub mod environment; // For deterministic node identity in tests

// Re-exports
pub use capability::{
    CapabilityError, CapabilityRegistry, Engine, Export, Extension, Notifier, PersistenceBackend,
};
pub use environment::{EnvironmentError, EnvironmentProvider};
