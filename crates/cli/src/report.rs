// Table rendering for `jobrun check`

use jobrun_core::{Config, GracePeriod};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct SettingRow {
    setting: &'static str,
    value: String,
}

impl SettingRow {
    fn new(setting: &'static str, value: impl ToString) -> Self {
        Self {
            setting,
            value: value.to_string(),
        }
    }
}

fn disabled_or<T>(items: Option<&[T]>, render: impl Fn(&T) -> String) -> String {
    match items {
        None => "disabled".to_string(),
        Some([]) => "none".to_string(),
        Some(items) => items.iter().map(render).collect::<Vec<_>>().join(", "),
    }
}

pub fn summary_table(config: &Config) -> String {
    let grace = match config.shutdown_grace_period() {
        GracePeriod::Finite(d) => format!("{}ms", d.as_millis()),
        GracePeriod::Infinite => "infinity".to_string(),
    };
    let queues = disabled_or(config.queues(), |q| match q.limit() {
        Some(limit) => format!("{}({})", q.name, limit),
        None => q.name.clone(),
    });
    let extensions = disabled_or(config.extensions(), |e| e.capability.to_string());

    let rows = vec![
        SettingRow::new("ident", config.to_ident()),
        SettingRow::new("node", config.node()),
        SettingRow::new("prefix", config.prefix()),
        SettingRow::new("engine", config.engine()),
        SettingRow::new("notifier", config.notifier()),
        SettingRow::new("persistence_backend", config.persistence_backend()),
        SettingRow::new(
            "dispatch_cooldown",
            format!("{}ms", config.dispatch_cooldown().as_millis()),
        ),
        SettingRow::new("shutdown_grace_period", grace),
        SettingRow::new(
            "log_severity",
            config
                .log_severity()
                .map_or_else(|| "off".to_string(), |s| s.to_string()),
        ),
        SettingRow::new("testing", config.testing().as_str()),
        SettingRow::new("queues", queues),
        SettingRow::new("extensions", extensions),
    ];

    Table::new(rows).to_string()
}
