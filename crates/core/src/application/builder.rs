// Config build pipeline
//
// raw options -> legacy migration -> testing mode -> node default
//   -> validation -> queue parsing + extension normalization -> record

use super::extensions::normalize_extensions;
use super::migration::{apply_testing_mode, migrate_legacy_options};
use super::node_identity::resolve_node;
use super::queue_parser::parse_queues;
use super::validation::{self, validate};
use crate::domain::{Config, ConfigFields, OptionKey, OptionSet, OptionValue};
use crate::error::Result;
use crate::port::{CapabilityRegistry, EnvironmentProvider};
use tracing::{debug, info};

/// Builds [`Config`] records against an environment and a capability registry
pub struct ConfigBuilder<'a> {
    env: &'a dyn EnvironmentProvider,
    registry: &'a CapabilityRegistry,
}

impl<'a> ConfigBuilder<'a> {
    pub fn new(env: &'a dyn EnvironmentProvider, registry: &'a CapabilityRegistry) -> Self {
        Self { env, registry }
    }

    /// Build a validated config record from raw options
    ///
    /// # Errors
    /// Fails on the first unknown option, invalid value, capability
    /// violation or missing required field, or when the node name has to be
    /// derived and the host name cannot be resolved.
    pub fn build(&self, options: OptionSet) -> Result<Config> {
        debug!(options = options.len(), "Building config");

        let options = migrate_legacy_options(options);
        let options = apply_testing_mode(options);
        let options = self.with_default_node(options)?;

        validate(&options, self.registry)?;

        let config = assemble(options)?;
        info!(
            ident = %config.to_ident(),
            queues = config.queues().map_or(0, <[_]>::len),
            extensions = config.extensions().map_or(0, <[_]>::len),
            "Config built"
        );
        Ok(config)
    }

    fn with_default_node(&self, mut options: OptionSet) -> Result<OptionSet> {
        if !options.contains_key(OptionKey::Node.as_str()) {
            let node = resolve_node(self.env)?;
            options.push(OptionKey::Node.as_str(), OptionValue::Str(node));
        }
        Ok(options)
    }
}

/// Build a config record in one call
pub fn build_config(
    options: OptionSet,
    env: &dyn EnvironmentProvider,
    registry: &CapabilityRegistry,
) -> Result<Config> {
    ConfigBuilder::new(env, registry).build(options)
}

/// Convert validated options into a record; a repeated key takes its last value
fn assemble(options: OptionSet) -> Result<Config> {
    let mut fields = ConfigFields::default();

    for (key, value) in options.iter() {
        let Some(key) = OptionKey::from_key(key) else {
            continue;
        };
        match key {
            OptionKey::DispatchCooldown => {
                fields.dispatch_cooldown = Some(validation::positive_millis(key, value)?)
            }
            OptionKey::Engine => fields.engine = Some(validation::capability_ref(key, value)?),
            OptionKey::DynamicBackendResolver => {
                fields.dynamic_backend_resolver = validation::backend_resolver(value)?
            }
            OptionKey::LogSeverity => {
                fields.log_severity = Some(validation::log_severity(value)?)
            }
            OptionKey::Name => fields.name = Some(value.clone()),
            OptionKey::Node => fields.node = Some(validation::node(value)?),
            OptionKey::Notifier => fields.notifier = Some(validation::capability_ref(key, value)?),
            OptionKey::Extensions => {
                fields.extensions =
                    Some(validation::extension_list(value)?.map(normalize_extensions))
            }
            OptionKey::Prefix => fields.prefix = Some(validation::prefix(value)?),
            OptionKey::Queues => {
                fields.queues = Some(match validation::queue_declarations(value)? {
                    Some(queues) => Some(parse_queues(queues)?),
                    None => None,
                })
            }
            OptionKey::PersistenceBackend => {
                fields.persistence_backend = Some(validation::capability_ref(key, value)?)
            }
            OptionKey::ShutdownGracePeriod => {
                fields.shutdown_grace_period = Some(validation::grace_period(value)?)
            }
            OptionKey::Testing => fields.testing = Some(validation::testing_mode(value)?),
        }
    }

    Config::try_from(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constants::{CRON_EXTENSION, STAGER_EXTENSION};
    use crate::domain::{CapabilityRef, ExtensionSpec, QueueSpec};
    use crate::error::ErrorKind;
    use crate::port::capability::mocks::NoopComponent;
    use crate::port::environment::mocks::MockEnvironment;

    fn registry() -> CapabilityRegistry {
        let mut registry = CapabilityRegistry::with_builtins();
        registry.register_backend(CapabilityRef::new("app.repo"), NoopComponent);
        registry.register_extension(CapabilityRef::new("app.pruner"), NoopComponent);
        registry
    }

    fn base() -> OptionSet {
        OptionSet::new().with("persistence_backend", OptionValue::capability("app.repo"))
    }

    fn build(options: OptionSet) -> Result<Config> {
        let env = MockEnvironment::new("host-a");
        build_config(options, &env, &registry())
    }

    #[test]
    fn test_minimal_options_build_with_defaults() {
        let config = build(base()).unwrap();

        assert_eq!(config.node(), "host-a");
        assert_eq!(config.prefix(), "public");
        assert_eq!(
            config.extensions(),
            Some(&[ExtensionSpec::bare(STAGER_EXTENSION)][..])
        );
        assert_eq!(config.queues(), Some(&[][..]));
    }

    #[test]
    fn test_missing_backend_is_a_construction_failure() {
        let err = build(OptionSet::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingField);
        assert_eq!(err.key(), Some("persistence_backend"));
    }

    #[test]
    fn test_explicit_node_skips_environment() {
        let env = MockEnvironment::without_host_name();
        let config = build_config(base().with("node", "web.1"), &env, &registry()).unwrap();
        assert_eq!(config.node(), "web.1");
    }

    #[test]
    fn test_unresolvable_host_fails_build() {
        let env = MockEnvironment::without_host_name();
        let err = build_config(base(), &env, &registry()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Environment);
    }

    #[test]
    fn test_validation_sees_migrated_options() {
        // poll_interval is not part of the validated surface, yet the build passes
        let config = build(base().with("poll_interval", 2000)).unwrap();
        let stager = config.extension(&STAGER_EXTENSION).unwrap();
        assert_eq!(stager.options, OptionSet::new().with("interval", 2000));
    }

    #[test]
    fn test_crontab_requires_registered_cron_extension() {
        let crontab = OptionValue::List(vec![OptionValue::str("* * * * * app.Worker")]);
        let mut bare_registry = CapabilityRegistry::new();
        bare_registry.register_backend(CapabilityRef::new("app.repo"), NoopComponent);
        bare_registry.declare(
            STAGER_EXTENSION,
            [crate::port::Export::EXTENSION_INIT],
        );

        let env = MockEnvironment::new("host-a");
        let err = build_config(base().with("crontab", crontab), &env, &bare_registry).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CapabilityViolation);
        assert!(err.to_string().contains(CRON_EXTENSION.as_str()));
    }

    #[test]
    fn test_queues_are_parsed_and_extensions_normalized() {
        let options = base()
            .with(
                "queues",
                OptionValue::pairs([
                    ("default", OptionValue::Int(10)),
                    (
                        "events",
                        OptionValue::pairs([
                            ("limit", OptionValue::Int(5)),
                            ("paused", OptionValue::Bool(true)),
                        ]),
                    ),
                ]),
            )
            .with(
                "extensions",
                OptionValue::List(vec![
                    OptionValue::capability("app.pruner"),
                    OptionValue::extension(
                        STAGER_EXTENSION,
                        OptionSet::new().with("interval", 250),
                    ),
                ]),
            );

        let config = build(options).unwrap();

        assert_eq!(
            config.queues().unwrap(),
            &[
                QueueSpec::with_limit("default", 10),
                QueueSpec::new(
                    "events",
                    OptionSet::new().with("limit", 5).with("paused", true)
                ),
            ]
        );
        // the migrated default stager loses to the user's declaration
        assert_eq!(
            config.extensions().unwrap(),
            &[
                ExtensionSpec::bare(CapabilityRef::new("app.pruner")),
                ExtensionSpec::new(STAGER_EXTENSION, OptionSet::new().with("interval", 250)),
            ]
        );
    }

    #[test]
    fn test_testing_mode_builds_with_queues_and_extensions_disabled() {
        let options = base()
            .with("testing", OptionValue::symbol("inline"))
            .with("queues", OptionValue::pairs([("default", OptionValue::Int(10))]));

        let config = build(options).unwrap();

        assert!(config.is_testing());
        assert_eq!(config.queues(), None);
        assert_eq!(config.extensions(), None);
    }

    #[test]
    fn test_repeated_key_takes_last_value() {
        let config = build(base().with("prefix", "first").with("prefix", "second")).unwrap();
        assert_eq!(config.prefix(), "second");
    }
}
