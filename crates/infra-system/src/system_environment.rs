// System environment implementation
// reason: sysinfo for cross-platform host name lookup
use sysinfo::System;
use tracing::debug;

use jobrun_core::port::environment::{EnvironmentError, EnvironmentProvider};

/// Environment backed by the live process and OS
///
/// The distributed identity is not something the OS knows about: the
/// embedding runtime passes it in once it has joined a cluster.
#[derive(Debug, Clone, Default)]
pub struct SystemEnvironment {
    cluster_identity: Option<String>,
}

impl SystemEnvironment {
    /// Create a system environment with no distributed identity
    ///
    /// # Example
    /// ```ignore
    /// let env = SystemEnvironment::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `identity` as the live distributed-runtime identity
    pub fn with_cluster_identity(mut self, identity: impl Into<String>) -> Self {
        self.cluster_identity = Some(identity.into());
        self
    }
}

impl EnvironmentProvider for SystemEnvironment {
    fn distributed_identity(&self) -> Option<String> {
        self.cluster_identity.clone()
    }

    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn host_name(&self) -> Result<String, EnvironmentError> {
        let host = System::host_name().ok_or_else(|| {
            EnvironmentError::HostNameUnavailable("OS did not report a host name".to_string())
        })?;
        debug!(host = %host, "Resolved host name");
        Ok(host)
    }
}
