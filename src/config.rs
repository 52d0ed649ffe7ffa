use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use tracing::info;

use crate::error::ConfigError;

pub const DATA_DIR_VAR: &str = "TRIPMATES_DATA_DIR";
pub const LATENCY_VAR: &str = "TRIPMATES_LATENCY_MS";
pub const LOCATION_INTERVAL_VAR: &str = "TRIPMATES_LOCATION_INTERVAL_SECS";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    /// Delay applied to every sign-in, sign-up and sign-out.
    pub simulated_latency: Duration,
    pub location_interval: Duration,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let data_dir = match env::var(DATA_DIR_VAR) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => {
                let dir = default_data_dir();
                info!("{DATA_DIR_VAR} not set, using default: {}", dir.display());
                dir
            }
        };
        Ok(Self {
            data_dir,
            simulated_latency: Duration::from_millis(try_load(LATENCY_VAR, "1000")?),
            location_interval: interval_secs(try_load(LOCATION_INTERVAL_VAR, "60")?)?,
        })
    }
}

fn interval_secs(secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Invalid {
            key: LOCATION_INTERVAL_VAR,
            value: secs.to_string(),
            reason: "interval must be at least one second".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("tripmates"))
        .unwrap_or_else(|| PathBuf::from(".tripmates"))
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    parse_value(key, &value)
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers() {
        assert_eq!(parse_value::<u64>(LATENCY_VAR, " 250 ").unwrap(), 250);
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_value::<u64>(LATENCY_VAR, "soon").unwrap_err();
        assert!(err.to_string().contains(LATENCY_VAR));
    }

    #[test]
    fn zero_location_interval_is_rejected() {
        let err = interval_secs(0).unwrap_err();
        assert!(err.to_string().contains(LOCATION_INTERVAL_VAR));
        assert_eq!(interval_secs(30).unwrap(), Duration::from_secs(30));
    }

    #[test]
    fn default_dir_ends_in_app_name() {
        assert!(default_data_dir().ends_with("tripmates") || default_data_dir().ends_with(".tripmates"));
    }
}
