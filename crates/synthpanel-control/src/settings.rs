//! Panel settings: registered synths, option catalog and logging
//!
//! Settings are read from TOML or JSON, chosen by file extension.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

use crate::error::{ControlError, Result};
use crate::notice::Notice;
use crate::propagate::DEFAULT_SYNTH;

/// Option labels per synth, keyed by option list name
pub type OptionLists = HashMap<String, HashMap<String, Vec<String>>>;

/// Channel per synth
pub type Channels = HashMap<String, u8>;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level name (trace, debug, info, warn, error)
    pub level: String,
    pub console_output: bool,
    pub file_output: bool,
    pub log_dir: PathBuf,
    pub file_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
            log_dir: PathBuf::from("logs"),
            file_name: "synthpanel.log".to_string(),
        }
    }
}

impl LogConfig {
    /// Configured level, falling back to INFO when unparseable
    pub fn parse_level(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::INFO)
    }

    pub fn ensure_log_directory(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.log_dir)
    }

    pub fn current_log_path(&self) -> PathBuf {
        self.log_dir.join(&self.file_name)
    }
}

/// A registered synth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthSettings {
    pub name: String,
    pub channel: u8,
    /// Patch parameter order used for snapshots
    #[serde(default)]
    pub nrpn_order: Option<Vec<u16>>,
}

/// Top-level settings document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSettings {
    /// Channel used when no synth is registered
    pub default_channel: u8,
    pub synths: Vec<SynthSettings>,
    pub options_lists: OptionLists,
    pub log: LogConfig,
}

impl PanelSettings {
    /// Parse from TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from a `.toml` or `.json` file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&text),
            Some("json") => Self::from_json(&text),
            other => Err(ControlError::InvalidSettings(format!(
                "unsupported settings format: {:?}",
                other
            ))),
        }
    }

    fn validate(&self) -> Result<()> {
        for channel in std::iter::once(self.default_channel)
            .chain(self.synths.iter().map(|s| s.channel))
        {
            if channel > 15 {
                return Err(ControlError::InvalidSettings(format!(
                    "MIDI channel {} out of range 0-15",
                    channel
                )));
            }
        }
        for (i, synth) in self.synths.iter().enumerate() {
            if self.synths[..i].iter().any(|s| s.name == synth.name) {
                return Err(ControlError::InvalidSettings(format!(
                    "synth {} registered twice",
                    synth.name
                )));
            }
        }
        Ok(())
    }

    /// Synth to channel map. Without registered synths, the default synth is
    /// mapped to `default_channel`.
    pub fn channels(&self) -> Channels {
        if self.synths.is_empty() {
            Notice::NoSynths(self.default_channel).report();
            return Channels::from([(DEFAULT_SYNTH.to_string(), self.default_channel)]);
        }
        self.synths
            .iter()
            .map(|s| (s.name.clone(), s.channel))
            .collect()
    }

    pub fn synth(&self, name: &str) -> Option<&SynthSettings> {
        self.synths.iter().find(|s| s.name == name)
    }

    /// Patch parameter order of `synth`, if its settings carry one
    pub fn nrpn_order(&self, synth: &str) -> Option<&[u16]> {
        let order = self.synth(synth).and_then(|s| s.nrpn_order.as_deref());
        if order.is_none() {
            Notice::NoPatchDetails(synth.to_string()).report();
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTINGS: &str = r#"
        default_channel = 2

        [[synths]]
        name = "lead"
        channel = 1
        nrpn_order = [5, 6, 7]

        [[synths]]
        name = "bass"
        channel = 3

        [options_lists.lead]
        waves = ["saw", "square"]

        [log]
        level = "debug"
    "#;

    #[test]
    fn test_parse_toml() {
        let settings = PanelSettings::from_toml(SETTINGS).unwrap();

        assert_eq!(settings.default_channel, 2);
        assert_eq!(settings.channels().get("bass"), Some(&3));
        assert_eq!(settings.nrpn_order("lead"), Some(&[5u16, 6, 7][..]));
        assert_eq!(settings.nrpn_order("bass"), None);
        assert_eq!(settings.options_lists["lead"]["waves"], vec!["saw", "square"]);
        assert_eq!(settings.log.parse_level(), LevelFilter::DEBUG);
        assert!(settings.log.console_output);
    }

    #[test]
    fn test_no_synths_uses_default_channel() {
        let settings = PanelSettings::from_toml("default_channel = 4").unwrap();
        let channels = settings.channels();
        assert_eq!(channels.len(), 1);
        assert_eq!(channels.get(DEFAULT_SYNTH), Some(&4));
    }

    #[test]
    fn test_rejects_bad_channel_and_duplicates() {
        let bad_channel = r#"
            [[synths]]
            name = "lead"
            channel = 16
        "#;
        assert!(matches!(
            PanelSettings::from_toml(bad_channel),
            Err(ControlError::InvalidSettings(_))
        ));

        let duplicate = r#"{"synths": [
            {"name": "lead", "channel": 1},
            {"name": "lead", "channel": 2}
        ]}"#;
        assert!(matches!(
            PanelSettings::from_json(duplicate),
            Err(ControlError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_unparseable_level_defaults_to_info() {
        let config = LogConfig {
            level: "loud".to_string(),
            ..Default::default()
        };
        assert_eq!(config.parse_level(), LevelFilter::INFO);
    }
}
