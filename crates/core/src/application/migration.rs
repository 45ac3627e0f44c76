// Legacy option migration
//
// Runs before validation. Rewrites deprecated options into extension entries
// so the validator only ever sees the current option surface. Never fails:
// malformed legacy values are dropped and anything else is left for the
// validator to reject.

use crate::domain::config::TestingMode;
use crate::domain::constants::{CRON_EXTENSION, STAGER_EXTENSION};
use crate::domain::{ExtensionSpec, OptionKey, OptionSet, OptionValue};
use tracing::{debug, warn};

pub const CRONTAB_KEY: &str = "crontab";
pub const TIMEZONE_KEY: &str = "timezone";
pub const POLL_INTERVAL_KEY: &str = "poll_interval";

/// Option key the stager extension takes its polling interval under
pub const INTERVAL_KEY: &str = "interval";

/// Rewrite `crontab`/`timezone` and `poll_interval` into extensions
///
/// Each migration prepends its extension, so after both run the stager entry
/// comes first, then cron, then whatever the user declared.
pub fn migrate_legacy_options(options: OptionSet) -> OptionSet {
    let options = migrate_crontab(options);
    migrate_poll_interval(options)
}

/// `extensions` is absent or a list: migration may add to it
fn accepts_extensions(options: &OptionSet) -> bool {
    matches!(
        options.get(OptionKey::Extensions.as_str()),
        None | Some(OptionValue::List(_))
    )
}

fn prepend_extension(options: &mut OptionSet, spec: ExtensionSpec) {
    let key = OptionKey::Extensions.as_str();
    let mut extensions = match options.remove(key) {
        Some(OptionValue::List(items)) => items,
        _ => Vec::new(),
    };
    extensions.insert(0, spec.into());
    options.put(key, OptionValue::List(extensions));
}

fn migrate_crontab(mut options: OptionSet) -> OptionSet {
    let accepts = accepts_extensions(&options);
    let crontab = options.remove(CRONTAB_KEY);
    let timezone = options.remove(TIMEZONE_KEY);

    match crontab {
        Some(OptionValue::List(entries)) if !entries.is_empty() && accepts => {
            warn!(
                entries = entries.len(),
                "crontab option is deprecated; configure the cron extension instead"
            );
            let mut cron_options = OptionSet::new().with(CRONTAB_KEY, OptionValue::List(entries));
            if let Some(timezone) = timezone {
                cron_options.push(TIMEZONE_KEY, timezone);
            }
            prepend_extension(&mut options, ExtensionSpec::new(CRON_EXTENSION, cron_options));
        }
        Some(_) => debug!("Dropping crontab option without migration"),
        None => {}
    }

    options
}

fn migrate_poll_interval(mut options: OptionSet) -> OptionSet {
    if !accepts_extensions(&options) {
        options.remove(POLL_INTERVAL_KEY);
        return options;
    }

    match options.remove(POLL_INTERVAL_KEY) {
        Some(OptionValue::Int(interval)) => {
            warn!(
                interval,
                "poll_interval option is deprecated; configure the stager extension instead"
            );
            let stager_options = OptionSet::new().with(INTERVAL_KEY, OptionValue::Int(interval));
            prepend_extension(&mut options, ExtensionSpec::new(STAGER_EXTENSION, stager_options));
        }
        None => prepend_extension(&mut options, ExtensionSpec::bare(STAGER_EXTENSION)),
        // TODO: surface a non-integer poll_interval as an InvalidOption once
        // callers have migrated off the legacy key; today it is dropped.
        Some(other) => debug!(value = %other, "Dropping malformed poll_interval option"),
    }

    options
}

/// Testing modes other than `disabled` run no queues and no extensions
///
/// Leaves an unrecognized `testing` value alone for the validator to reject.
pub fn apply_testing_mode(mut options: OptionSet) -> OptionSet {
    let mode = options
        .get(OptionKey::Testing.as_str())
        .and_then(OptionValue::as_symbol)
        .and_then(|s| s.parse::<TestingMode>().ok());

    if matches!(mode, Some(TestingMode::Inline | TestingMode::Manual)) {
        debug!("Testing mode active; disabling queues and extensions");
        options.put(OptionKey::Queues.as_str(), false);
        options.put(OptionKey::Extensions.as_str(), false);
    }

    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extensions(options: &OptionSet) -> &[OptionValue] {
        match options.get("extensions") {
            Some(OptionValue::List(items)) => items,
            other => panic!("expected extension list, got {:?}", other),
        }
    }

    fn crontab() -> OptionValue {
        OptionValue::List(vec![OptionValue::Tuple(vec![
            OptionValue::str("* * * * *"),
            OptionValue::capability("app.workers.minutely"),
        ])])
    }

    #[test]
    fn test_crontab_and_timezone_become_cron_extension() {
        let options = OptionSet::new()
            .with("crontab", crontab())
            .with("timezone", "America/Chicago");

        let migrated = migrate_legacy_options(options);

        assert!(!migrated.contains_key("crontab"));
        assert!(!migrated.contains_key("timezone"));
        let expected_cron = ExtensionSpec::new(
            CRON_EXTENSION,
            OptionSet::new()
                .with("crontab", crontab())
                .with("timezone", "America/Chicago"),
        );
        assert_eq!(
            extensions(&migrated),
            &[
                ExtensionSpec::bare(STAGER_EXTENSION).into(),
                OptionValue::from(expected_cron),
            ]
        );
    }

    #[test]
    fn test_empty_crontab_is_dropped_with_timezone() {
        let options = OptionSet::new()
            .with("crontab", OptionValue::List(vec![]))
            .with("timezone", "Etc/UTC");

        let migrated = migrate_legacy_options(options);

        assert!(!migrated.contains_key("crontab"));
        assert!(!migrated.contains_key("timezone"));
        assert_eq!(
            extensions(&migrated),
            &[OptionValue::from(ExtensionSpec::bare(STAGER_EXTENSION))]
        );
    }

    #[test]
    fn test_poll_interval_becomes_stager_options() {
        let migrated = migrate_legacy_options(OptionSet::new().with("poll_interval", 5000));

        assert!(!migrated.contains_key("poll_interval"));
        let expected = ExtensionSpec::new(STAGER_EXTENSION, OptionSet::new().with("interval", 5000));
        assert_eq!(extensions(&migrated), &[OptionValue::from(expected)]);
    }

    #[test]
    fn test_malformed_poll_interval_is_silently_dropped() {
        let migrated = migrate_legacy_options(OptionSet::new().with("poll_interval", "fast"));

        assert!(!migrated.contains_key("poll_interval"));
        assert!(!migrated.contains_key("extensions"));
    }

    #[test]
    fn test_migrated_entries_are_prepended_to_user_extensions() {
        let options = OptionSet::new().with(
            "extensions",
            OptionValue::List(vec![OptionValue::capability("app.pruner")]),
        );

        let migrated = migrate_legacy_options(options);

        assert_eq!(
            extensions(&migrated),
            &[
                ExtensionSpec::bare(STAGER_EXTENSION).into(),
                OptionValue::capability("app.pruner"),
            ]
        );
    }

    #[test]
    fn test_disabled_extensions_stay_disabled() {
        let options = OptionSet::new()
            .with("extensions", false)
            .with("crontab", crontab())
            .with("poll_interval", 1000);

        let migrated = migrate_legacy_options(options);

        assert_eq!(migrated.get("extensions"), Some(&OptionValue::Bool(false)));
        assert!(!migrated.contains_key("crontab"));
        assert!(!migrated.contains_key("poll_interval"));
    }

    #[test]
    fn test_testing_mode_disables_queues_and_extensions() {
        let options = OptionSet::new()
            .with("testing", OptionValue::symbol("manual"))
            .with("queues", OptionValue::pairs([("default", OptionValue::Int(10))]));

        let normalized = apply_testing_mode(migrate_legacy_options(options));

        assert_eq!(normalized.get("queues"), Some(&OptionValue::Bool(false)));
        assert_eq!(normalized.get("extensions"), Some(&OptionValue::Bool(false)));
    }

    #[test]
    fn test_testing_disabled_leaves_options_alone() {
        let options = OptionSet::new()
            .with("testing", OptionValue::symbol("disabled"))
            .with("queues", OptionValue::pairs([("default", OptionValue::Int(10))]));

        let normalized = apply_testing_mode(options.clone());
        assert_eq!(normalized, options);
    }
}
