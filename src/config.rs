//! Configuration management.

use crate::core::DeviceId;
use crate::error::{AppResult, SessionError};
use config::Config;
use serde::Deserialize;
use std::path::Path;

fn default_log_level() -> String {
    "info".to_string()
}

fn default_auto_connect_rssi() -> i32 {
    -55
}

/// Application settings.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Identifier of the device this session talks to.
    pub device_id: String,
    /// Default log filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Signal threshold in dBm for auto-connect scans.
    #[serde(default = "default_auto_connect_rssi")]
    pub auto_connect_rssi: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device_id: "8C4CAD2B".to_string(),
            log_level: default_log_level(),
            auto_connect_rssi: default_auto_connect_rssi(),
        }
    }
}

impl Settings {
    /// Loads `config/<name>.toml` (or `config/default.toml`).
    pub fn new(config_name: Option<&str>) -> AppResult<Self> {
        let config_path = format!("config/{}", config_name.unwrap_or("default"));
        let s = Config::builder()
            .add_source(config::File::with_name(&config_path))
            .build()
            .map_err(SessionError::Config)?;

        let settings: Settings = s.try_deserialize().map_err(SessionError::Config)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from an explicit file path.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let s = Config::builder()
            .add_source(config::File::from(path))
            .build()
            .map_err(SessionError::Config)?;

        let settings: Settings = s.try_deserialize().map_err(SessionError::Config)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks semantic constraints that parsing cannot.
    pub fn validate(&self) -> AppResult<()> {
        if self.device_id.trim().is_empty() {
            return Err(SessionError::Configuration(
                "device_id must not be empty".to_string(),
            ));
        }
        if !(-100..=0).contains(&self.auto_connect_rssi) {
            return Err(SessionError::Configuration(format!(
                "auto_connect_rssi must be between -100 and 0 dBm, got {}",
                self.auto_connect_rssi
            )));
        }
        Ok(())
    }

    /// The configured device identity.
    pub fn device_id(&self) -> DeviceId {
        DeviceId::new(self.device_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_fill_optional_fields() {
        let settings: Settings = toml::from_str(r#"device_id = "1C709B20""#)
            .expect("Failed to parse settings");
        assert_eq!(settings.device_id, "1C709B20");
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.auto_connect_rssi, -55);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("Failed to create temp file");
        writeln!(
            file,
            "device_id = \"D34DB33F\"\nlog_level = \"debug\"\nauto_connect_rssi = -60"
        )
        .expect("Failed to write settings");

        let settings = Settings::from_file(file.path()).expect("Failed to load settings");
        assert_eq!(settings.device_id, "D34DB33F");
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.auto_connect_rssi, -60);
    }

    #[test]
    fn rejects_empty_device_id() {
        let settings: Settings =
            toml::from_str(r#"device_id = """#).expect("Failed to parse settings");
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_rssi() {
        let settings: Settings = toml::from_str(
            r#"
            device_id = "1C709B20"
            auto_connect_rssi = 20
            "#,
        )
        .expect("Failed to parse settings");
        assert!(settings.validate().is_err());
    }
}
