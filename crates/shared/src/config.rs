use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::channel::ChannelOptions;
use crate::error::{FeedError, Result};

/// Environment variable naming the channel definition file
pub const CHANNEL_ENV: &str = "DROPCAST_CHANNEL";

/// File name looked up in the current and config directories
pub const CHANNEL_FILE: &str = "channel.yml";

const APP_DIR: &str = "dropcast";

/// Channel definition as written in `channel.yml`.
///
/// Known keys get a field; every other scalar is kept as text and passed
/// through to the template.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelConfig {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub enclosure_base: Option<String>,
    pub author: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl ChannelConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let invalid = |reason: String| FeedError::Config {
            path: path.to_path_buf(),
            reason,
        };

        let content = fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let config = Self::parse(&content).map_err(|e| invalid(e.to_string()))?;
        debug!("Loaded channel definition from {}", path.display());

        Ok(config)
    }

    pub fn parse(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Find and load the channel definition.
    ///
    /// An explicit path must exist. Without one, the first existing file of
    /// `$DROPCAST_CHANNEL`, `./channel.yml` and `<config dir>/dropcast/channel.yml`
    /// is used, and having none of them is fine.
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        Self::try_load_dotenv();

        match Self::candidates().into_iter().find(|path| path.is_file()) {
            Some(path) => Self::load(&path),
            None => {
                debug!("No channel definition found, using command line only");
                Ok(Self::default())
            }
        }
    }

    fn candidates() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(path) = env::var(CHANNEL_ENV) {
            paths.push(PathBuf::from(path));
        }

        paths.push(PathBuf::from(CHANNEL_FILE));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(APP_DIR).join(CHANNEL_FILE));
        }

        paths
    }

    fn try_load_dotenv() {
        // Current directory first (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        for env_file in Self::dotenv_fallbacks() {
            if env_file.is_file() && dotenvy::from_path(&env_file).is_ok() {
                debug!("Loaded environment from {}", env_file.display());
                return;
            }
        }
    }

    /// `<config dir>/dropcast/.env`, then `~/.env`
    fn dotenv_fallbacks() -> Vec<PathBuf> {
        [dirs::config_dir().map(|dir| dir.join(APP_DIR)), dirs::home_dir()]
            .into_iter()
            .flatten()
            .map(|dir| dir.join(".env"))
            .collect()
    }

    /// Values set in `overrides` replace ours; categories are appended
    pub fn merge(mut self, overrides: ChannelConfig) -> Self {
        let pick = |ours: &mut Option<String>, theirs: Option<String>| {
            if theirs.is_some() {
                *ours = theirs;
            }
        };

        pick(&mut self.title, overrides.title);
        pick(&mut self.url, overrides.url);
        pick(&mut self.description, overrides.description);
        pick(&mut self.enclosure_base, overrides.enclosure_base);
        pick(&mut self.author, overrides.author);
        pick(&mut self.image_url, overrides.image_url);
        self.categories.extend(overrides.categories);
        self.extra.extend(overrides.extra);

        self
    }

    /// Split into channel options and the category list
    pub fn into_options(self) -> (ChannelOptions, Vec<String>) {
        let mut options: ChannelOptions = self
            .extra
            .into_iter()
            .filter_map(|(name, value)| scalar_text(&value).map(|text| (name, text)))
            .collect();

        let typed = [
            ("title", self.title),
            ("url", self.url),
            ("description", self.description),
            ("enclosure_base", self.enclosure_base),
            ("author", self.author),
            ("image_url", self.image_url),
        ];
        for (name, value) in typed {
            if let Some(value) = value {
                options.insert(name, value);
            }
        }

        (options, self.categories)
    }
}

fn scalar_text(value: &serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value;

    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHANNEL_YML: &str = r#"
title: Weekly Noise
url: http://example.com/
description: Sounds, weekly.
enclosure_base: http://example.com/audio
author: Jo Host
categories:
  - Music
  - Arts
language: en-us
explicit: false
episode_count: 12
owner:
  name: nested values are skipped
"#;

    #[test]
    fn test_parse_known_and_extra_keys() {
        let config = ChannelConfig::parse(CHANNEL_YML).unwrap();

        assert_eq!(config.title.as_deref(), Some("Weekly Noise"));
        assert_eq!(config.categories, vec!["Music", "Arts"]);
        assert!(config.extra.contains_key("language"));
        assert!(config.image_url.is_none());
    }

    #[test]
    fn test_into_options_stringifies_scalars() {
        let (options, categories) = ChannelConfig::parse(CHANNEL_YML).unwrap().into_options();

        assert_eq!(options.get("enclosure_base"), Some("http://example.com/audio"));
        assert_eq!(options.get("language"), Some("en-us"));
        assert_eq!(options.get("explicit"), Some("false"));
        assert_eq!(options.get("episode_count"), Some("12"));
        assert_eq!(options.get("owner"), None);
        assert_eq!(options.get("image_url"), None);
        assert_eq!(categories, vec!["Music", "Arts"]);
    }

    #[test]
    fn test_merge_overrides_and_appends() {
        let base = ChannelConfig::parse(CHANNEL_YML).unwrap();
        let overrides = ChannelConfig {
            title: Some("Daily Noise".to_string()),
            categories: vec!["Comedy".to_string()],
            ..ChannelConfig::default()
        };

        let merged = base.merge(overrides);

        assert_eq!(merged.title.as_deref(), Some("Daily Noise"));
        assert_eq!(merged.author.as_deref(), Some("Jo Host"));
        assert_eq!(merged.categories, vec!["Music", "Arts", "Comedy"]);
    }

    #[test]
    fn test_empty_file_is_empty_config() {
        let config = ChannelConfig::parse("  \n").unwrap();
        assert!(config.title.is_none());
        assert!(config.extra.is_empty());
    }

    #[test]
    fn test_load_reports_bad_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CHANNEL_FILE);
        fs::write(&path, "title: [unclosed").unwrap();

        let err = ChannelConfig::load(&path).unwrap_err();

        assert!(matches!(err, FeedError::Config { path: p, .. } if p == path));
    }

    #[test]
    fn test_dotenv_fallbacks_prefer_app_config_dir() {
        let fallbacks = ChannelConfig::dotenv_fallbacks();

        assert!(fallbacks.iter().all(|path| path.ends_with(".env")));
        if let Some(config_dir) = dirs::config_dir() {
            assert_eq!(fallbacks[0], config_dir.join(APP_DIR).join(".env"));
        }
        if let Some(home_dir) = dirs::home_dir() {
            assert_eq!(fallbacks.last(), Some(&home_dir.join(".env")));
        }
    }

    #[test]
    fn test_locate_requires_explicit_file() {
        let err = ChannelConfig::locate(Some(Path::new("/nonexistent/channel.yml"))).unwrap_err();
        assert!(matches!(err, FeedError::Config { .. }));
    }
}
