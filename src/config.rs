use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::contexts::ConfigError;
use crate::k8s::NamespaceScope;
use crate::utils::config::{
    clamp_interval, CONFIG_FILE_NAME, DEFAULT_POLL_INTERVAL, MAX_POLL_INTERVAL, MIN_POLL_INTERVAL,
};

/// Startup settings. Read once; the running app changes the target through
/// the reconciler handle, not through this struct.
#[derive(Debug, Clone, PartialEq)]
pub struct TrayConfig {
    pub kubeconfig: PathBuf,
    /// `None` follows the kubeconfig's current-context.
    pub context: Option<String>,
    pub namespace: NamespaceScope,
    pub poll_interval: Duration,
    pub show_metrics: bool,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    kubeconfig: Option<PathBuf>,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    poll_interval: Option<RawInterval>,
    #[serde(default = "default_show_metrics")]
    show_metrics: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawInterval {
    Seconds(f64),
    Text(String),
}

fn default_show_metrics() -> bool {
    true
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            kubeconfig: default_kubeconfig(),
            context: None,
            namespace: NamespaceScope::All,
            poll_interval: DEFAULT_POLL_INTERVAL,
            show_metrics: true,
        }
    }
}

impl TrayConfig {
    /// Loads `~/.k8s-tray.yaml`, or defaults when the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&data)
    }

    fn parse(data: &str) -> Result<Self, ConfigError> {
        // an empty document deserializes to unit, not a mapping
        let raw: RawConfig = if data.trim().is_empty() {
            RawConfig {
                show_metrics: true,
                ..Default::default()
            }
        } else {
            serde_yaml::from_str(data)?
        };

        let poll_interval = match raw.poll_interval {
            None => DEFAULT_POLL_INTERVAL,
            Some(RawInterval::Seconds(secs)) => interval_from_secs(secs),
            Some(RawInterval::Text(text)) => match parse_duration_secs(&text) {
                Some(secs) => interval_from_secs(secs),
                None => return Err(ConfigError::InvalidInterval(text)),
            },
        };

        Ok(Self {
            kubeconfig: raw
                .kubeconfig
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(default_kubeconfig),
            context: raw.context.filter(|c| !c.is_empty()),
            namespace: raw
                .namespace
                .map(|ns| NamespaceScope::from_setting(&ns))
                .unwrap_or_default(),
            poll_interval,
            show_metrics: raw.show_metrics,
        })
    }
}

fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(CONFIG_FILE_NAME)
}

fn default_kubeconfig() -> PathBuf {
    if let Some(path) = std::env::var_os("KUBECONFIG").filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    dirs::home_dir()
        .map(|home| home.join(".kube").join("config"))
        .unwrap_or_default()
}

/// Clamps a signed number of seconds into the supported poll range. Zero
/// and negative values become the minimum.
fn interval_from_secs(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return MIN_POLL_INTERVAL;
    }
    // too large for a Duration is clamped like any other long interval
    Duration::try_from_secs_f64(secs)
        .map(clamp_interval)
        .unwrap_or(MAX_POLL_INTERVAL)
}

/// Parses durations such as `15s`, `1m30s`, `1.5h`, `500ms` or `-5s` into
/// signed seconds. A bare number is taken as seconds.
pub fn parse_duration_secs(text: &str) -> Option<f64> {
    let text = text.trim();
    if let Ok(secs) = text.parse::<f64>() {
        return Some(secs);
    }

    let (sign, mut rest) = match text.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, text.strip_prefix('+').unwrap_or(text)),
    };
    if rest.is_empty() {
        return None;
    }

    let mut total = 0f64;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return None;
        }
        let value: f64 = rest[..number_len].parse().ok()?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        total += match &rest[..unit_len] {
            "ns" => value / 1e9,
            "us" | "µs" => value / 1e6,
            "ms" => value / 1e3,
            "s" => value,
            "m" => value * 60.0,
            "h" => value * 3600.0,
            _ => return None,
        };
        rest = &rest[unit_len..];
    }
    Some(sign * total)
}
