// Node identity resolution

use crate::domain::constants::DYNO_VAR;
use crate::port::{EnvironmentError, EnvironmentProvider};
use tracing::debug;

/// Resolve a name for the current node
///
/// Precedence: live distributed-runtime identity, then the `DYNO` variable,
/// then the host name. Blank signals count as absent.
///
/// # Errors
/// - EnvironmentError::HostNameUnavailable when falling through to a host
///   name that cannot be resolved
pub fn resolve_node(env: &dyn EnvironmentProvider) -> Result<String, EnvironmentError> {
    if let Some(identity) = env.distributed_identity().filter(|s| !s.trim().is_empty()) {
        debug!(node = %identity, "Node from distributed identity");
        return Ok(identity);
    }

    if let Some(dyno) = env.var(DYNO_VAR).filter(|s| !s.trim().is_empty()) {
        debug!(node = %dyno, "Node from {}", DYNO_VAR);
        return Ok(dyno);
    }

    let host = env.host_name()?;
    if host.trim().is_empty() {
        return Err(EnvironmentError::HostNameUnavailable(
            "host name is empty".to_string(),
        ));
    }
    debug!(node = %host, "Node from host name");
    Ok(host)
}
