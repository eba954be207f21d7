//! Panel configuration
//!
//! Where the daemon lives, which pin the ESC signal wire is on, and the ESC's
//! throttle window. Values come from key/value pairs (environment variables or
//! a `.env` file on the desktop) and fall back to built-in defaults.

use alloc::string::{String, ToString};

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::pigpio::{DEFAULT_PORT, MAX_USER_GPIO};
use crate::pulse::{PulseError, PulseRange};

/// Daemon host, same variable name the pigpio client libraries read
pub const KEY_HOST: &str = "PIGPIO_ADDR";
/// Daemon port
pub const KEY_PORT: &str = "PIGPIO_PORT";
/// BCM number of the ESC signal pin
pub const KEY_GPIO: &str = "ESC_GPIO";
/// Zero-throttle pulse width in µs
pub const KEY_MIN_PULSE: &str = "ESC_MIN_PULSE_US";
/// Full-throttle pulse width in µs
pub const KEY_MAX_PULSE: &str = "ESC_MAX_PULSE_US";

/// Default ESC signal pin (BCM numbering)
pub const DEFAULT_GPIO: u8 = 25;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}")]
    Invalid { key: &'static str },

    #[error("GPIO {0} is not a user GPIO (0-31)")]
    BadGpio(u8),

    #[error("{0}")]
    Range(PulseError),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PanelConfig {
    pub daemon: DaemonConfig,
    pub esc: EscConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscConfig {
    pub gpio: u8,
    pub range: PulseRange,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            daemon: DaemonConfig {
                host: "localhost".to_string(),
                port: DEFAULT_PORT,
            },
            esc: EscConfig {
                gpio: DEFAULT_GPIO,
                range: PulseRange::default(),
            },
        }
    }
}

impl PanelConfig {
    /// Build a config from a key lookup, keeping defaults for missing keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup(KEY_HOST) {
            let host = host.trim();
            if host.is_empty() {
                return Err(ConfigError::Invalid { key: KEY_HOST });
            }
            config.daemon.host = host.to_string();
        }

        if let Some(port) = parse_key::<u16, _>(&lookup, KEY_PORT)? {
            config.daemon.port = port;
        }

        if let Some(gpio) = parse_key::<u8, _>(&lookup, KEY_GPIO)? {
            if gpio > MAX_USER_GPIO {
                return Err(ConfigError::BadGpio(gpio));
            }
            config.esc.gpio = gpio;
        }

        let defaults = config.esc.range;
        let min = parse_key::<u16, _>(&lookup, KEY_MIN_PULSE)?.unwrap_or(defaults.min().micros());
        let max = parse_key::<u16, _>(&lookup, KEY_MAX_PULSE)?.unwrap_or(defaults.max().micros());
        config.esc.range = PulseRange::new(min, max).map_err(ConfigError::Range)?;

        Ok(config)
    }

    /// `host:port` string for connecting and for display
    pub fn daemon_addr(&self) -> String {
        alloc::format!("{}:{}", self.daemon.host, self.daemon.port)
    }
}

fn parse_key<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: core::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = PanelConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, PanelConfig::default());
        assert_eq!(config.daemon_addr(), "localhost:8888");
        assert_eq!(config.esc.gpio, 25);
    }

    #[test]
    fn test_overrides() {
        let pairs = [
            (KEY_HOST, "192.168.0.98"),
            (KEY_PORT, "9999"),
            (KEY_GPIO, " 18 "),
            (KEY_MIN_PULSE, "1000"),
            (KEY_MAX_PULSE, "2000"),
        ];
        let config = PanelConfig::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(config.daemon_addr(), "192.168.0.98:9999");
        assert_eq!(config.esc.gpio, 18);
        assert_eq!(config.esc.range.min().micros(), 1000);
        assert_eq!(config.esc.range.max().micros(), 2000);
    }

    #[test]
    fn test_unparsable_value_names_key() {
        let pairs = [(KEY_PORT, "eighty")];
        assert_eq!(
            PanelConfig::from_lookup(lookup_from(&pairs)),
            Err(ConfigError::Invalid { key: KEY_PORT })
        );
    }

    #[test]
    fn test_gpio_must_be_user_gpio() {
        let pairs = [(KEY_GPIO, "40")];
        assert_eq!(
            PanelConfig::from_lookup(lookup_from(&pairs)),
            Err(ConfigError::BadGpio(40))
        );
    }

    #[test]
    fn test_partial_range_checked_against_default_other_end() {
        // Only the minimum is overridden and it ends up above the default maximum
        let pairs = [(KEY_MIN_PULSE, "2100")];
        assert!(matches!(
            PanelConfig::from_lookup(lookup_from(&pairs)),
            Err(ConfigError::Range(_))
        ));
    }

    #[test]
    fn test_config_serde_round_trip() {
        let pairs = [(KEY_GPIO, "18"), (KEY_MIN_PULSE, "1000"), (KEY_MAX_PULSE, "1900")];
        let config = PanelConfig::from_lookup(lookup_from(&pairs)).unwrap();

        let bytes = postcard::to_allocvec(&config).unwrap();
        assert_eq!(postcard::from_bytes::<PanelConfig>(&bytes).unwrap(), config);
    }
}
