//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{path::PathBuf, str::FromStr};

use clap::{Args, Parser, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "errata";
const ENV_PREFIX: &str = "ERRATA";
pub const DEFAULT_ENTRIES_PATH: &str = "error_entries.json";
pub const DEFAULT_TEMPLATE_PATH: &str = "index.html";
pub const DEFAULT_OUTPUT_PATH: &str = "build/index.html";
pub const DEFAULT_CACHE_DIR: &str = ".cache";

/// Command-line arguments for the errata binary.
#[derive(Debug, Parser)]
#[command(
    name = "errata",
    version,
    about = "Render error entries into an HTML template"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "ERRATA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: BuildOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct BuildOverrides {
    /// Where to write the rebuilt document.
    #[arg(short = 'o', long = "output", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// JSON document holding the entries under an `errors` array.
    #[arg(long = "entries", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub entries: Option<PathBuf>,

    /// HTML template containing the entry markers.
    #[arg(long = "template", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub template: Option<PathBuf>,

    /// Directory holding cached fragments.
    #[arg(long = "cache-dir", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub cache_dir: Option<PathBuf>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub build: BuildSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    pub entries: PathBuf,
    pub template: PathBuf,
    pub output: PathBuf,
    pub cache_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    build: RawBuildSettings,
    logging: RawLoggingSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &BuildOverrides) {
        if let Some(path) = overrides.output.as_ref() {
            self.build.output = Some(path.clone());
        }
        if let Some(path) = overrides.entries.as_ref() {
            self.build.entries = Some(path.clone());
        }
        if let Some(path) = overrides.template.as_ref() {
            self.build.template = Some(path.clone());
        }
        if let Some(dir) = overrides.cache_dir.as_ref() {
            self.build.cache_dir = Some(dir.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings { build, logging } = raw;

        Ok(Self {
            build: build_build_settings(build)?,
            logging: build_logging_settings(logging)?,
        })
    }
}

fn build_build_settings(build: RawBuildSettings) -> Result<BuildSettings, LoadError> {
    Ok(BuildSettings {
        entries: non_empty_path(build.entries, DEFAULT_ENTRIES_PATH, "build.entries")?,
        template: non_empty_path(build.template, DEFAULT_TEMPLATE_PATH, "build.template")?,
        output: non_empty_path(build.output, DEFAULT_OUTPUT_PATH, "build.output")?,
        cache_dir: non_empty_path(build.cache_dir, DEFAULT_CACHE_DIR, "build.cache_dir")?,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn non_empty_path(
    value: Option<PathBuf>,
    default: &str,
    key: &'static str,
) -> Result<PathBuf, LoadError> {
    let path = value.unwrap_or_else(|| PathBuf::from(default));
    if path.as_os_str().is_empty() {
        return Err(LoadError::invalid(key, "path must not be empty"));
    }
    Ok(path)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawBuildSettings {
    entries: Option<PathBuf>,
    template: Option<PathBuf>,
    output: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_conventional_layout() {
        let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

        assert_eq!(
            settings.build,
            BuildSettings {
                entries: PathBuf::from("error_entries.json"),
                template: PathBuf::from("index.html"),
                output: PathBuf::from("build/index.html"),
                cache_dir: PathBuf::from(".cache"),
            }
        );
        assert_eq!(settings.logging.level, LevelFilter::INFO);
        assert!(matches!(settings.logging.format, LogFormat::Compact));
    }

    #[test]
    fn cli_overrides_take_highest_precedence() {
        let mut raw = RawSettings::default();
        raw.build.output = Some(PathBuf::from("from-file.html"));
        raw.logging.level = Some("info".to_string());

        let overrides = BuildOverrides {
            output: Some(PathBuf::from("site/errors.html")),
            log_level: Some("debug".to_string()),
            ..Default::default()
        };

        raw.apply_overrides(&overrides);
        let settings = Settings::from_raw(raw).expect("valid settings");

        assert_eq!(settings.build.output, PathBuf::from("site/errors.html"));
        assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    }

    #[test]
    fn cli_json_logging_enforces_format() {
        let mut raw = RawSettings::default();
        let overrides = BuildOverrides {
            log_json: Some(true),
            ..Default::default()
        };

        raw.apply_overrides(&overrides);
        let settings = Settings::from_raw(raw).expect("valid settings");

        assert!(matches!(settings.logging.format, LogFormat::Json));
    }

    #[test]
    fn empty_cache_dir_is_rejected() {
        let mut raw = RawSettings::default();
        raw.build.cache_dir = Some(PathBuf::new());

        let err = Settings::from_raw(raw).expect_err("empty path");
        assert!(matches!(
            err,
            LoadError::Invalid {
                key: "build.cache_dir",
                ..
            }
        ));
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let mut raw = RawSettings::default();
        raw.logging.level = Some("chatty".to_string());

        let err = Settings::from_raw(raw).expect_err("bad level");
        assert!(matches!(
            err,
            LoadError::Invalid {
                key: "logging.level",
                ..
            }
        ));
    }

    #[test]
    fn parse_short_output_flag() {
        let args = CliArgs::parse_from(["errata", "-o", "public/index.html"]);
        assert_eq!(
            args.overrides.output.as_deref(),
            Some(std::path::Path::new("public/index.html"))
        );
    }

    #[test]
    fn parse_all_path_overrides() {
        let args = CliArgs::parse_from([
            "errata",
            "--entries",
            "data/entries.json",
            "--template",
            "site/index.html",
            "--cache-dir",
            "/tmp/errata-cache",
            "--log-json",
            "true",
        ]);

        assert_eq!(
            args.overrides.entries.as_deref(),
            Some(std::path::Path::new("data/entries.json"))
        );
        assert_eq!(
            args.overrides.template.as_deref(),
            Some(std::path::Path::new("site/index.html"))
        );
        assert_eq!(
            args.overrides.cache_dir.as_deref(),
            Some(std::path::Path::new("/tmp/errata-cache"))
        );
        assert_eq!(args.overrides.log_json, Some(true));
    }
}
