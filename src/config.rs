use crate::constants;
use crate::environment::{Environment, HostSignals};
use anyhow::{anyhow, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

/// How the bridge decides between real host calls and fallbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Always talk to the host
    Nui,
    /// Plain-browser dev mode; fallbacks short-circuit requests
    Browser,
    /// Classify from host signals at startup
    Auto,
}

impl std::str::FromStr for Mode {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "nui" | "embedded" | "host" => Ok(Mode::Nui),
            "browser" | "dev" | "standalone" => Ok(Mode::Browser),
            "auto" => Ok(Mode::Auto),
            _ => Err(anyhow!(
                "Invalid mode '{s}'. Valid options: nui, browser, auto"
            )),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Nui => write!(f, "nui"),
            Mode::Browser => write!(f, "browser"),
            Mode::Auto => write!(f, "auto"),
        }
    }
}

/// Bridge settings shared by every binary.
/// Configuration priority: CLI args > Environment variables > Defaults
#[derive(Args, Clone, Debug, Default)]
pub struct BridgeArgs {
    /// Host resource name; requests go to https://<resource>/<event>
    #[arg(long, env = "NUI_RESOURCE")]
    pub resource: Option<String>,

    /// Override the request base URL (e.g. a local mock host)
    #[arg(long, env = "NUI_BASE_URL")]
    pub base_url: Option<String>,

    /// Execution mode: nui, browser or auto
    #[arg(long, env = "NUI_MODE", value_parser = clap::value_parser!(Mode))]
    pub mode: Option<Mode>,

    /// Default request timeout in milliseconds (0 disables, else 100-60000)
    #[arg(long, env = "NUI_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Poll interval in milliseconds (250-300000)
    #[arg(long, env = "NUI_POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<u64>,

    /// Path of the persisted preference file
    #[arg(long, env = "NUI_PREFS_PATH")]
    pub prefs_path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub resource: String,
    pub base_url: Option<String>,
    pub mode: Mode,
    pub request_timeout: Option<Duration>,
    pub poll_interval: Duration,
    pub prefs_path: PathBuf,
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Validate URL format (basic check)
fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

fn validate_resource(resource: &str) -> Result<()> {
    if resource.is_empty() {
        return Err(anyhow!("NUI_RESOURCE cannot be empty"));
    }
    if resource.contains('/') || resource.chars().any(char::is_whitespace) {
        return Err(anyhow!(
            "NUI_RESOURCE must be a bare resource name, got '{resource}'"
        ));
    }
    Ok(())
}

impl Config {
    /// Resolve parsed arguments into a validated configuration.
    pub fn from_args(args: BridgeArgs) -> Result<Config> {
        let resource = args
            .resource
            .or_else(crate::webshim::parent_resource_name)
            .unwrap_or_else(|| constants::bridge::DEFAULT_RESOURCE.to_string());
        validate_resource(&resource)?;

        let base_url = args.base_url.filter(|u| !u.is_empty());
        if let Some(ref url) = base_url {
            validate_url(url, "NUI_BASE_URL")?;
        }

        let timeout_ms = args
            .timeout_ms
            .unwrap_or(constants::bridge::DEFAULT_TIMEOUT_MS);
        let request_timeout = if timeout_ms == 0 {
            None
        } else {
            let ms = validate_in_range(timeout_ms, 100, 60_000, "NUI_TIMEOUT_MS")?;
            Some(Duration::from_millis(ms))
        };

        let poll_interval_ms = args
            .poll_interval_ms
            .unwrap_or(constants::poll::DEFAULT_INTERVAL_MS);
        let poll_interval_ms =
            validate_in_range(poll_interval_ms, 250, 300_000, "NUI_POLL_INTERVAL_MS")?;

        Ok(Config {
            resource,
            base_url,
            mode: args.mode.unwrap_or(Mode::Auto),
            request_timeout,
            poll_interval: Duration::from_millis(poll_interval_ms),
            prefs_path: args
                .prefs_path
                .unwrap_or_else(|| PathBuf::from(constants::prefs::DEFAULT_PATH)),
        })
    }

    /// Environment to install at startup for this configuration.
    pub fn environment(&self, signals: &HostSignals) -> Environment {
        match self.mode {
            Mode::Nui => Environment::EmbeddedHost,
            Mode::Browser => Environment::StandaloneBrowser,
            Mode::Auto => Environment::classify(signals),
        }
    }

    /// Log the effective configuration (useful for debugging)
    pub fn log_summary(&self) {
        log::info!("[nui][config] resource: {}", self.resource);
        match &self.base_url {
            Some(url) => log::info!("[nui][config] base url: {url} (override)"),
            None => log::info!("[nui][config] base url: https://{}", self.resource),
        }
        log::info!("[nui][config] mode: {}", self.mode);
        match self.request_timeout {
            Some(t) => log::info!("[nui][config] request timeout: {}ms", t.as_millis()),
            None => log::info!("[nui][config] request timeout: none"),
        }
        log::info!(
            "[nui][config] poll interval: {}ms",
            self.poll_interval.as_millis()
        );
        log::info!("[nui][config] preferences: {}", self.prefs_path.display());
    }
}
