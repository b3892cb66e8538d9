use serde::{Deserialize, Serialize};

use crate::Cli;
use crate::radar::{BYTES_PER_PIXEL, DEFAULT_ORIGIN, DEFAULT_ROTATION_DIVISOR, RadarError};

pub const MAX_ORIGIN: u16 = 16384;
pub const DEFAULT_NAME: &str = "/polar0";

/// Canvas geometry, fixed for the lifetime of the process.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CanvasConfig {
    pub name: String,
    pub origin: u16,
    pub width: u16,
    pub height: u16,
    pub rotation_divisor: u16,
}

impl CanvasConfig {
    pub fn new(name: &str, origin: u16, rotation_divisor: u16) -> Self {
        CanvasConfig {
            name: name.to_owned(),
            origin,
            width: origin.saturating_mul(2),
            height: origin.saturating_mul(2),
            rotation_divisor,
        }
    }

    pub fn from_args(args: &Cli) -> Result<Self, RadarError> {
        let config = Self::new(&args.name, args.origin, args.rotation_divisor);
        config.validate()?;
        log::debug!(
            "Canvas config {}",
            serde_json::to_string(&config).unwrap_or_default()
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RadarError> {
        if self.origin == 0 || self.origin > MAX_ORIGIN {
            return Err(RadarError::InvalidConfig(format!(
                "origin {} not in 1..={}",
                self.origin, MAX_ORIGIN
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(RadarError::InvalidConfig(format!(
                "canvas {}x{} is empty",
                self.width, self.height
            )));
        }
        if self.origin > self.width || self.origin > self.height {
            return Err(RadarError::InvalidConfig(format!(
                "origin {} lies outside canvas {}x{}",
                self.origin, self.width, self.height
            )));
        }
        if self.rotation_divisor == 0 {
            return Err(RadarError::InvalidConfig(
                "rotation divisor must not be 0".to_string(),
            ));
        }
        if self.name.is_empty() {
            return Err(RadarError::InvalidConfig(
                "frame buffer name is empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn frame_buffer_name(&self) -> String {
        format!("{}.argb", self.name)
    }

    pub fn buffer_len(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self::new(DEFAULT_NAME, DEFAULT_ORIGIN, DEFAULT_ROTATION_DIVISOR)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn defaults_from_command_line() {
        let args = Cli::parse_from(["radar-ppi"]);
        let config = CanvasConfig::from_args(&args).unwrap();
        assert_eq!(config, CanvasConfig::default());
        assert_eq!(config.width, 1024);
        assert_eq!(config.height, 1024);
        assert_eq!(config.rotation_divisor, 170);
        assert_eq!(config.frame_buffer_name(), "/polar0.argb");
        assert_eq!(config.buffer_len(), 1024 * 1024 * 4);
    }

    #[test]
    fn command_line_overrides() {
        let args = Cli::parse_from([
            "radar-ppi",
            "--origin",
            "300",
            "--name",
            "/radar1",
            "--rotation-divisor",
            "2048",
        ]);
        let config = CanvasConfig::from_args(&args).unwrap();
        assert_eq!(config.width, 600);
        assert_eq!(config.height, 600);
        assert_eq!(config.rotation_divisor, 2048);
        assert_eq!(config.frame_buffer_name(), "/radar1.argb");
    }

    #[test]
    fn rejects_bad_geometry() {
        assert!(CanvasConfig::new(DEFAULT_NAME, 0, 170).validate().is_err());
        assert!(CanvasConfig::new(DEFAULT_NAME, MAX_ORIGIN + 1, 170).validate().is_err());
        assert!(CanvasConfig::new(DEFAULT_NAME, 512, 0).validate().is_err());
        assert!(CanvasConfig::new("", 512, 170).validate().is_err());

        let mut config = CanvasConfig::default();
        config.height = 256;
        assert!(matches!(config.validate(), Err(RadarError::InvalidConfig(_))));
    }

    #[test]
    fn serializes_as_json() {
        let json = serde_json::to_string(&CanvasConfig::default()).unwrap();
        assert_eq!(
            json,
            r#"{"name":"/polar0","origin":512,"width":1024,"height":1024,"rotationDivisor":170}"#
        );
    }
}
