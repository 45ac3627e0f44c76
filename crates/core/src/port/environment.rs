// Environment Provider Port
// Ambient process/OS signals used to derive the node identity

use thiserror::Error;

/// Environment errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("Host name unavailable: {0}")]
    HostNameUnavailable(String),
}

/// Environment provider interface (allows injecting signals in tests)
///
/// Implementations:
/// - SystemEnvironment (infra-system): process env + OS host name
/// - mocks::MockEnvironment: fixed values
#[cfg_attr(test, mockall::automock)]
pub trait EnvironmentProvider: Send + Sync {
    /// Identity of the live distributed runtime this process has joined, if any
    fn distributed_identity(&self) -> Option<String>;

    /// Environment variable lookup
    fn var(&self, name: &str) -> Option<String>;

    /// Local host name
    ///
    /// # Errors
    /// - EnvironmentError::HostNameUnavailable if the OS cannot report one
    fn host_name(&self) -> Result<String, EnvironmentError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;

    /// Environment with fixed signals
    #[derive(Debug, Clone, Default)]
    pub struct MockEnvironment {
        distributed_identity: Option<String>,
        vars: HashMap<String, String>,
        host_name: Option<String>,
    }

    impl MockEnvironment {
        pub fn new(host_name: impl Into<String>) -> Self {
            Self {
                host_name: Some(host_name.into()),
                ..Default::default()
            }
        }

        /// Environment where host name resolution fails
        pub fn without_host_name() -> Self {
            Self::default()
        }

        pub fn with_distributed_identity(mut self, identity: impl Into<String>) -> Self {
            self.distributed_identity = Some(identity.into());
            self
        }

        pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
            self.vars.insert(name.into(), value.into());
            self
        }
    }

    impl EnvironmentProvider for MockEnvironment {
        fn distributed_identity(&self) -> Option<String> {
            self.distributed_identity.clone()
        }

        fn var(&self, name: &str) -> Option<String> {
            self.vars.get(name).cloned()
        }

        fn host_name(&self) -> Result<String, EnvironmentError> {
            self.host_name
                .clone()
                .ok_or_else(|| EnvironmentError::HostNameUnavailable("mock has no host".into()))
        }
    }
}
