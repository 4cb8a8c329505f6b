//! User display settings (theme and root font size).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    /// Root font size in pixels applied to the document root.
    pub fn root_px(self) -> u8 {
        match self {
            Self::Small => 14,
            Self::Medium => 16,
            Self::Large => 18,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Light => "light",
            Self::Dark => "dark",
        })
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        })
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme '{}'", other)),
        }
    }
}

impl FromStr for FontSize {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            other => Err(format!("unknown font size '{}'", other)),
        }
    }
}

/// Decode a stored value, replacing anything unrecognized with the default.
///
/// Used for persisted preferences, where one bad value must not discard the
/// rest of the stored session.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_else(|err| {
        warn!("ignoring invalid stored setting: {}", err);
        T::default()
    }))
}

/// Persisted display preferences.
///
/// Missing or unrecognized fields deserialize to their defaults so values
/// from older or newer clients still load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    #[serde(default, deserialize_with = "or_default")]
    pub theme: Theme,
    #[serde(default, deserialize_with = "or_default")]
    pub font_size: FontSize,
}

/// Partial update merged over the current settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub font_size: Option<FontSize>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.theme.is_none() && self.font_size.is_none()
    }
}

impl DisplaySettings {
    /// Return a copy with `patch` applied.
    pub fn merged(self, patch: SettingsPatch) -> Self {
        Self {
            theme: patch.theme.unwrap_or(self.theme),
            font_size: patch.font_size.unwrap_or(self.font_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DisplaySettings, FontSize, SettingsPatch, Theme};

    #[test]
    fn defaults_are_light_medium() {
        let settings = DisplaySettings::default();
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.font_size.root_px(), 16);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: DisplaySettings =
            serde_json::from_str(r#"{"theme":"dark"}"#).expect("settings");
        assert!(settings.theme.is_dark());
        assert_eq!(settings.font_size, FontSize::Medium);
        let encoded = serde_json::to_string(&settings).expect("encode");
        assert_eq!(encoded, r#"{"theme":"dark","fontSize":"medium"}"#);
    }

    #[test]
    fn unknown_values_fall_back_per_field() {
        let settings: DisplaySettings =
            serde_json::from_str(r#"{"theme":"purple","fontSize":"large"}"#).expect("settings");
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.font_size, FontSize::Large);
    }

    #[test]
    fn merge_only_touches_patched_fields() {
        let settings = DisplaySettings {
            theme: Theme::Dark,
            font_size: FontSize::Small,
        };
        let merged = settings.merged(SettingsPatch {
            theme: None,
            font_size: Some(FontSize::Large),
        });
        assert_eq!(merged.theme, Theme::Dark);
        assert_eq!(merged.font_size.root_px(), 18);
        assert!(SettingsPatch::default().is_empty());
    }

    #[test]
    fn parse_names_case_insensitively() {
        assert_eq!("DARK".parse::<Theme>(), Ok(Theme::Dark));
        assert_eq!(" large ".parse::<FontSize>(), Ok(FontSize::Large));
        assert!("huge".parse::<FontSize>().is_err());
    }
}
