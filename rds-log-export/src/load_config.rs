/// `load_config` module: Loads a static YAML config, applies environment overrides, and validates the result into an [`ExportConfig`].
///
/// # Responsibilities
/// - Parse the user-supplied YAML file into a loosely-typed intermediate struct
/// - Overlay `AWS_REGION` and `LOG_EXPORT_*` environment variables on top of it
/// - Fill defaults, then run [`ExportConfig::validate`] so the job only ever sees a usable config
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::{Context, Result};
use rds_log_export_core::config::{
    ExportConfig, DEFAULT_MAX_PORTIONS_PER_LOG, DEFAULT_WATERMARK_KEY,
};
use rds_log_export_core::select::LogSelection;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{error, info};

/// Config file as written by the operator. Every field may instead come from the environment.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    pub region: Option<String>,
    pub bucket: Option<String>,
    pub object_prefix: Option<String>,
    pub db_instance_identifier: Option<String>,
    pub log_name_filter: Option<String>,
    pub watermark_key: Option<String>,
    pub max_logs_per_run: Option<usize>,
    pub selection: Option<LogSelection>,
    pub max_portions_per_log: Option<usize>,
}

impl RawConfig {
    /// Overrides file values with environment values obtained through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string_overrides = [
            ("AWS_REGION", &mut self.region),
            ("LOG_EXPORT_BUCKET", &mut self.bucket),
            ("LOG_EXPORT_OBJECT_PREFIX", &mut self.object_prefix),
            ("LOG_EXPORT_DB_INSTANCE", &mut self.db_instance_identifier),
            ("LOG_EXPORT_LOG_NAME_FILTER", &mut self.log_name_filter),
            ("LOG_EXPORT_WATERMARK_KEY", &mut self.watermark_key),
        ];
        for (var, field) in string_overrides {
            if let Some(value) = lookup(var) {
                info!(var, "Config value overridden from environment");
                *field = Some(value);
            }
        }

        if let Some(value) = lookup("LOG_EXPORT_MAX_LOGS") {
            self.max_logs_per_run = Some(parse_env("LOG_EXPORT_MAX_LOGS", &value)?);
        }
        if let Some(value) = lookup("LOG_EXPORT_MAX_PORTIONS") {
            self.max_portions_per_log = Some(parse_env("LOG_EXPORT_MAX_PORTIONS", &value)?);
        }
        if let Some(value) = lookup("LOG_EXPORT_SELECTION") {
            self.selection = Some(parse_env("LOG_EXPORT_SELECTION", &value)?);
        }
        Ok(())
    }

    /// Fills defaults and validates.
    pub fn into_export_config(self) -> Result<ExportConfig> {
        let config = ExportConfig {
            region: self.region,
            bucket: self
                .bucket
                .context("bucket is required (config key `bucket` or LOG_EXPORT_BUCKET)")?,
            object_prefix: self.object_prefix.unwrap_or_default(),
            db_instance_identifier: self.db_instance_identifier.context(
                "db_instance_identifier is required (config key `db_instance_identifier` or LOG_EXPORT_DB_INSTANCE)",
            )?,
            log_name_filter: self.log_name_filter.unwrap_or_default(),
            watermark_key: self
                .watermark_key
                .unwrap_or_else(|| DEFAULT_WATERMARK_KEY.to_string()),
            max_logs_per_run: self.max_logs_per_run,
            selection: self.selection.unwrap_or_default(),
            max_portions_per_log: self
                .max_portions_per_log
                .unwrap_or(DEFAULT_MAX_PORTIONS_PER_LOG),
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse_env<T>(var: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| {
        error!(var, value, error = %e, "Invalid environment override");
        anyhow::anyhow!("{var} has an invalid value '{value}': {e}")
    })
}

/// Loads the YAML config at `path`, applies process environment overrides and validates.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ExportConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let mut raw: RawConfig = if config_content.trim().is_empty() {
        RawConfig::default()
    } else {
        match serde_yaml::from_str(&config_content) {
            Ok(conf) => {
                info!(config_path = ?path_ref, "Parsed config YAML successfully");
                conf
            }
            Err(e) => {
                error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
                return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
            }
        }
    };

    raw.apply_env(|var| std::env::var(var).ok())?;
    let config = raw.into_export_config()?;
    config.trace_loaded();
    Ok(config)
}
