use std::{path::Path, time::Duration};

use anyhow::Context;

use crate::logger::LogLevel;

/// Defines a config struct together with its partially-deserializable
/// twin. Each field tuple is (name, type, partial type, default).
macro_rules! config {
    ($struct_name:ident, $( ($field:ident, $field_type:ty, $partial_field_type:ty, $default:expr) ),* $(,)?) => {
        paste::paste! {
            #[derive(Debug, Clone, serde::Serialize)]
            pub struct $struct_name {
                $(
                    $field: $field_type,
                )*
            }

            #[derive(Debug, Clone, serde::Deserialize)]
            pub struct [<Partial $struct_name>] {
                $(
                    $field: $partial_field_type,
                )*
            }

            impl $struct_name {
                pub fn from_partial(partial: [<Partial $struct_name>]) -> Self {
                    Self {
                        $(
                            $field: partial.$field.into_or($default),
                        )*
                    }
                }

                /// Loads the config from a JSON file; fields missing there
                /// fall back to their defaults.
                pub fn from_file<Q: AsRef<Path>>(path: Q) -> anyhow::Result<Self> {
                    let text = std::fs::read_to_string(path.as_ref()).with_context(|| {
                        format!("failed to read config file {}", path.as_ref().display())
                    })?;
                    let partial: [<Partial $struct_name>] = serde_json::from_str(&text)
                        .with_context(|| {
                            format!("failed to parse config file {}", path.as_ref().display())
                        })?;
                    Ok(Self::from_partial(partial))
                }

                $(
                    pub fn [<with_ $field>](mut self, $field: $field_type) -> Self {
                        self.$field = $field;
                        self
                    }

                    pub fn [<set_ $field>](&mut self, $field: $field_type) {
                        self.$field = $field;
                    }

                    pub fn [<get_ $field>](&self) -> &$field_type {
                        &self.$field
                    }
                )*
            }

            impl Default for $struct_name {
                fn default() -> Self {
                    $struct_name {
                        $(
                            $field: $default,
                        )*
                    }
                }
            }

            impl IntoOr<$struct_name> for Option<[<Partial $struct_name>]> {
                fn into_or(self, or: $struct_name) -> $struct_name {
                    match self {
                        Some(partial) => $struct_name::from_partial(partial),
                        None => or,
                    }
                }
            }
        }
    };
}

pub trait IntoOr<T> {
    fn into_or(self, or: T) -> T;
}

impl<T> IntoOr<Option<T>> for Option<T> {
    fn into_or(self, or: Option<T>) -> Option<T> {
        match self {
            Some(value) => Some(value),
            None => or,
        }
    }
}

impl<T> IntoOr<T> for Option<T> {
    fn into_or(self, or: T) -> T {
        self.unwrap_or(or)
    }
}

/// Every config carries a logger section.
pub trait GeneralConfig {
    fn logger(&self) -> &LoggerConfig;
}

config!(
    LoggerConfig,
    (enabled, bool, Option<bool>, true),
    (log_file, bool, Option<bool>, false),
    (log_level, LogLevel, Option<LogLevel>, LogLevel::Info),
);

config!(
    SimulationConfig,
    (fair, bool, Option<bool>, false),
    (workers, usize, Option<usize>, 4),
    (run_for, Option<Duration>, Option<Duration>, None),
    (logger, LoggerConfig, Option<PartialLoggerConfig>, LoggerConfig::default()),
);

impl GeneralConfig for SimulationConfig {
    fn logger(&self) -> &LoggerConfig {
        &self.logger
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_partial_fields() {
        let partial: PartialSimulationConfig =
            serde_json::from_str(r#"{ "fair": true }"#).unwrap();
        let config = SimulationConfig::from_partial(partial);

        assert!(*config.get_fair());
        assert_eq!(*config.get_workers(), 4);
        assert_eq!(*config.get_run_for(), None);
        assert!(*config.get_logger().get_enabled());
    }

    #[test]
    fn nested_sections_deserialize() {
        let partial: PartialSimulationConfig = serde_json::from_str(
            r#"{ "workers": 2, "logger": { "log_level": "Warn" } }"#,
        )
        .unwrap();
        let config = SimulationConfig::from_partial(partial);

        assert_eq!(*config.get_workers(), 2);
        assert_eq!(*config.get_logger().get_log_level(), LogLevel::Warn);
    }

    #[test]
    fn builder_setters_chain() {
        let config = SimulationConfig::default()
            .with_fair(true)
            .with_workers(8);

        assert!(*config.get_fair());
        assert_eq!(*config.get_workers(), 8);
    }
}
