use std::path::{Path, PathBuf};
use std::{env, str::FromStr};

use crate::geo::DistanceSpace;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            Self::Off => log::LevelFilter::Off,
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Runtime options for the `popmap` binary.
#[derive(Clone, Debug)]
pub struct PlanOptions {
    /// Override the input's coordinate space.
    pub space_override: Option<DistanceSpace>,
    /// Override the profile's distance threshold (miles).
    pub threshold_miles: Option<f64>,
    /// Pretty-print the JSON output.
    pub pretty: bool,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
    pub log_timestamp: bool,
    log_output: Option<PathBuf>,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            space_override: None,
            threshold_miles: None,
            pretty: false,
            log_level: LogLevel::Info,
            log_format: LogFormat::Compact,
            log_timestamp: false,
            log_output: None,
        }
    }
}

impl PlanOptions {
    pub fn from_args() -> Result<Self, String> {
        let mut options = Self::default();
        let mut args = env::args().skip(1).peekable();

        while let Some(arg) = args.next() {
            if arg == "--help" || arg == "-h" {
                return Err(Self::usage().to_string());
            }

            let Some(raw_name) = arg.strip_prefix("--") else {
                return Err(format!("Unexpected argument: {arg}\n\n{}", Self::usage()));
            };

            if raw_name.is_empty() {
                return Err(format!("Invalid option name: {arg}\n\n{}", Self::usage()));
            }

            let (name, value) = split_arg(raw_name, &mut args);

            match name.as_str() {
                "space" => {
                    let raw = value.ok_or_else(|| format!("Missing value for --{name}"))?;
                    options.space_override = Some(match raw.as_str() {
                        "geo" | "geographic" => DistanceSpace::Geographic,
                        "plane" | "normalized-plane" => DistanceSpace::NormalizedPlane,
                        _ => return Err(format!("Invalid value for --{name}: {raw}")),
                    });
                }
                "threshold-miles" => {
                    options.threshold_miles = Some(parse_value::<f64>(&name, value)?);
                }
                "pretty" => {
                    options.pretty = match value {
                        Some(v) => parse_bool(&name, &v)?,
                        None => true,
                    };
                }
                "log-level" => {
                    let raw = value.ok_or_else(|| format!("Missing value for --{name}"))?;
                    options.log_level = match raw.as_str() {
                        "off" => LogLevel::Off,
                        "error" => LogLevel::Error,
                        "warn" => LogLevel::Warn,
                        "info" => LogLevel::Info,
                        "debug" => LogLevel::Debug,
                        "trace" => LogLevel::Trace,
                        _ => return Err(format!("Invalid value for --{name}: {raw}")),
                    };
                }
                "log-format" => {
                    let raw = value.ok_or_else(|| format!("Missing value for --{name}"))?;
                    options.log_format = match raw.as_str() {
                        "compact" => LogFormat::Compact,
                        "pretty" => LogFormat::Pretty,
                        _ => return Err(format!("Invalid value for --{name}: {raw}")),
                    };
                }
                "log-timestamp" => {
                    options.log_timestamp = match value {
                        Some(v) => parse_bool(&name, &v)?,
                        None => true,
                    };
                }
                "log-output" => {
                    let raw = value.ok_or_else(|| format!("Missing value for --{name}"))?;
                    options.log_output = Some(PathBuf::from(raw));
                }
                _ => {
                    return Err(format!("Unknown option: --{name}\n\n{}", Self::usage()));
                }
            }
        }

        Ok(options)
    }

    pub fn log_output_path(&self) -> Option<&Path> {
        self.log_output.as_deref()
    }

    pub fn usage() -> &'static str {
        concat!(
            "Usage:\n",
            "  popmap [options] < plan.json\n\n",
            "Options:\n",
            "  --space <geo|plane>\n",
            "  --threshold-miles <f64>\n",
            "  --pretty[=<bool>]\n",
            "  --log-level <off|error|warn|info|debug|trace>\n",
            "  --log-format <compact|pretty>\n",
            "  --log-timestamp[=<bool>]\n",
            "  --log-output <path>\n",
            "  --help\n",
            "\n",
            "Examples:\n",
            "  popmap --threshold-miles 800 --pretty < plan.json\n",
            "  popmap --space plane --log-level debug < plan.json\n",
        )
    }
}

fn parse_value<T>(name: &str, value: Option<String>) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = value.ok_or_else(|| format!("Missing value for --{name}"))?;
    raw.parse::<T>()
        .map_err(|e| format!("Invalid value for --{name}: {raw} ({e})"))
}

fn parse_bool(name: &str, value: &str) -> Result<bool, String> {
    match value {
        "1" | "true" | "TRUE" | "True" | "yes" | "YES" | "on" | "ON" => Ok(true),
        "0" | "false" | "FALSE" | "False" | "no" | "NO" | "off" | "OFF" => Ok(false),
        _ => Err(format!(
            "Invalid boolean for --{name}: {value} (expected true/false)"
        )),
    }
}

fn split_arg(
    raw_name: &str,
    args: &mut std::iter::Peekable<impl Iterator<Item = String>>,
) -> (String, Option<String>) {
    if let Some((k, v)) = raw_name.split_once('=') {
        return (k.to_string(), Some(v.to_string()));
    }

    let value = match args.peek() {
        Some(next) if !next.starts_with("--") => args.next(),
        _ => None,
    };

    (raw_name.to_string(), value)
}
