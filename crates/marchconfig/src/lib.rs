//! Settings file parsing for sdfmarch.
//!
//! The settings file is TOML with three optional tables. Every field has a
//! default, so an empty file (or no file at all) is valid:
//!
//! ```toml
//! [window]
//! width = 1280
//! height = 720
//! title = "sdfmarch"
//!
//! [render]
//! fps = 60
//! vsync = true
//! exit_after = "30s"
//!
//! [shader]
//! fragment = "scenes/custom.frag"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default)]
    pub render: RenderSettings,
    #[serde(default)]
    pub shader: ShaderSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WindowSettings {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenderSettings {
    /// Frames-per-second cap; omitted or 0 means uncapped.
    #[serde(default)]
    pub fps: Option<f32>,
    #[serde(default = "default_vsync")]
    pub vsync: bool,
    /// Stop rendering and exit after this long, e.g. `"30s"` or `90`.
    #[serde(
        default,
        deserialize_with = "deserialize_duration_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub exit_after: Option<Duration>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            fps: None,
            vsync: default_vsync(),
            exit_after: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShaderSettings {
    /// Replacement for the embedded raymarch fragment shader.
    pub fragment: Option<PathBuf>,
}

impl Settings {
    /// Reads and validates a settings file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parses and validates settings from TOML text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// The fps cap with non-positive values normalized away.
    pub fn fps_cap(&self) -> Option<f32> {
        self.render.fps.filter(|fps| *fps > 0.0)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(
                "window dimensions must be greater than zero".to_string(),
            ));
        }
        if let Some(fps) = self.render.fps {
            if fps < 0.0 || !fps.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "fps must be a non-negative number, got {fps}"
                )));
            }
        }
        Ok(())
    }
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

fn default_title() -> String {
    "sdfmarch".to_string()
}

fn default_vsync() -> bool {
    true
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs_f64(v)))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D2>(self, deserializer: D2) -> Result<Self::Value, D2::Error>
        where
            D2: Deserializer<'de>,
        {
            deserializer.deserialize_any(Visitor)
        }
    }

    deserializer.deserialize_option(Visitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[window]
width = 1280
height = 720
title = "demo viewer"

[render]
fps = 60
vsync = false
exit_after = "90s"

[shader]
fragment = "scenes/tunnel.frag"
"#;

    #[test]
    fn parses_sample_config() {
        let settings = Settings::parse(SAMPLE).expect("sample parses");
        assert_eq!(settings.window.width, 1280);
        assert_eq!(settings.window.height, 720);
        assert_eq!(settings.window.title, "demo viewer");
        assert_eq!(settings.fps_cap(), Some(60.0));
        assert!(!settings.render.vsync);
        assert_eq!(settings.render.exit_after, Some(Duration::from_secs(90)));
        assert_eq!(
            settings.shader.fragment.as_deref(),
            Some(Path::new("scenes/tunnel.frag"))
        );
    }

    #[test]
    fn empty_config_uses_defaults() {
        let settings = Settings::parse("").expect("empty config is valid");
        assert_eq!(settings.window.width, 800);
        assert_eq!(settings.window.height, 600);
        assert_eq!(settings.window.title, "sdfmarch");
        assert!(settings.render.vsync);
        assert_eq!(settings.fps_cap(), None);
        assert!(settings.shader.fragment.is_none());
    }

    #[test]
    fn numeric_exit_after_is_seconds() {
        let settings = Settings::parse("[render]\nexit_after = 30\n").expect("numeric duration");
        assert_eq!(settings.render.exit_after, Some(Duration::from_secs(30)));
    }

    #[test]
    fn zero_fps_normalizes_to_uncapped() {
        let settings = Settings::parse("[render]\nfps = 0\n").expect("zero fps is valid");
        assert_eq!(settings.fps_cap(), None);
    }

    #[test]
    fn rejects_zero_window_dimensions() {
        let err = Settings::parse("[window]\nwidth = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_negative_fps() {
        let err = Settings::parse("[render]\nfps = -5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_duration() {
        let err = Settings::parse("[render]\nexit_after = \"soon\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
