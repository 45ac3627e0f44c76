// Configuration defaults and well-known capability references (no magic values)

use super::option::CapabilityRef;

/// Default dispatch cooldown (5ms)
pub const DEFAULT_DISPATCH_COOLDOWN_MS: u64 = 5;

/// Default shutdown grace period (15s)
pub const DEFAULT_SHUTDOWN_GRACE_PERIOD_MS: u64 = 15_000;

/// Default table prefix in the backing store
pub const DEFAULT_PREFIX: &str = "public";

/// Default instance name (rendered as a bare symbol)
pub const DEFAULT_NAME: &str = "Jobrun";

/// Built-in execution engine
pub const BASIC_ENGINE: CapabilityRef = CapabilityRef::from_static("jobrun.engine.basic");

/// Built-in notification transport
pub const DEFAULT_NOTIFIER: CapabilityRef = CapabilityRef::from_static("jobrun.notifier.postgres");

/// Extension that runs scheduled (cron) jobs
pub const CRON_EXTENSION: CapabilityRef = CapabilityRef::from_static("jobrun.extension.cron");

/// Extension that stages scheduled jobs for execution; always on unless disabled
pub const STAGER_EXTENSION: CapabilityRef = CapabilityRef::from_static("jobrun.extension.stager");

/// Platform-assigned instance id variable
pub const DYNO_VAR: &str = "DYNO";
