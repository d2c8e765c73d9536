// ABOUTME: Runtime settings resolved from environment variables and CLI flags
// ABOUTME: CLI flags take precedence over IMGCAT_* variables, which override defaults

use anyhow::{anyhow, Context, Result};
use imgcat_core::source::{parse_size, FetchConfig};
use imgcat_core::ColorProfile;
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;

pub const MAX_IMAGE_SIZE_ENV: &str = "IMGCAT_MAX_IMAGE_SIZE";
pub const HTTP_TIMEOUT_ENV: &str = "IMGCAT_HTTP_TIMEOUT";
pub const LOG_FILE_ENV: &str = "IMGCAT_LOG_FILE";

#[derive(Debug, Clone)]
pub struct Settings {
    pub profile: ColorProfile,
    pub fetch: FetchConfig,
    pub log_file: Option<PathBuf>,
}

/// One layer of optional overrides
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub profile: Option<ColorProfile>,
    pub timeout: Option<Duration>,
    pub max_size_bytes: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl Overrides {
    /// Read the IMGCAT_* environment variables
    pub fn from_env() -> Result<Self> {
        let max_size_bytes = match std::env::var(MAX_IMAGE_SIZE_ENV) {
            Ok(value) => Some(parse_size(&value).ok_or_else(|| {
                anyhow!(
                    "Invalid {}: '{}' (expected e.g. 10MB, 512KB or a byte count)",
                    MAX_IMAGE_SIZE_ENV,
                    value
                )
            })?),
            Err(_) => None,
        };

        let timeout = match std::env::var(HTTP_TIMEOUT_ENV) {
            Ok(value) => {
                let secs: u64 = value
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid {}: '{}'", HTTP_TIMEOUT_ENV, value))?;
                Some(Duration::from_secs(secs.max(1)))
            }
            Err(_) => None,
        };

        let log_file = std::env::var_os(LOG_FILE_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            profile: None,
            timeout,
            max_size_bytes,
            log_file,
        })
    }

    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            profile: cli.color.profile(),
            timeout: cli.timeout.map(Duration::from_secs),
            max_size_bytes: None,
            log_file: cli.log_file.clone(),
        }
    }

    /// Merge with another layer, giving precedence to the other layer
    pub fn merge(self, other: Overrides) -> Overrides {
        Overrides {
            profile: other.profile.or(self.profile),
            timeout: other.timeout.or(self.timeout),
            max_size_bytes: other.max_size_bytes.or(self.max_size_bytes),
            log_file: other.log_file.or(self.log_file),
        }
    }
}

impl Settings {
    /// Resolve settings for this run: defaults, then environment, then CLI flags
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let overrides = Overrides::from_env()?.merge(Overrides::from_cli(cli));
        Ok(Self::from_overrides(overrides, ColorProfile::detect))
    }

    /// Apply overrides on top of defaults; `detect` runs only when no profile is forced
    pub fn from_overrides(overrides: Overrides, detect: impl FnOnce() -> ColorProfile) -> Self {
        let defaults = FetchConfig::default();

        Self {
            profile: overrides.profile.unwrap_or_else(detect),
            fetch: FetchConfig {
                timeout: overrides.timeout.unwrap_or(defaults.timeout),
                max_size_bytes: overrides.max_size_bytes.unwrap_or(defaults.max_size_bytes),
                ..defaults
            },
            log_file: overrides.log_file,
        }
    }
}
