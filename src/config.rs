//! Engine configuration
//!
//! The engine reads two settings: the Java language level the oracle parses at and the
//! delimiter markers that introduce placeholders in template source. Both can be loaded
//! from a TOML file:
//!
//! ```toml
//! [language]
//! level = "1.8"
//!
//! [delimiters]
//! open = "<"
//! separator = ":"
//! close = ">"
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::template::DelimiterSyntax;

/// Errors that can occur when loading or parsing engine configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid delimiters: {0}")]
    InvalidDelimiters(String),
}

/// Java source level the oracle accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum LanguageLevel {
    Java5,
    Java6,
    Java7,
    Java8,
}

impl LanguageLevel {
    /// Level every generated unit is checked against unless configured otherwise
    pub const BASELINE: LanguageLevel = LanguageLevel::Java8;

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageLevel::Java5 => "1.5",
            LanguageLevel::Java6 => "1.6",
            LanguageLevel::Java7 => "1.7",
            LanguageLevel::Java8 => "1.8",
        }
    }
}

impl Default for LanguageLevel {
    fn default() -> Self {
        Self::BASELINE
    }
}

impl fmt::Display for LanguageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1.5" | "5" => Ok(LanguageLevel::Java5),
            "1.6" | "6" => Ok(LanguageLevel::Java6),
            "1.7" | "7" => Ok(LanguageLevel::Java7),
            "1.8" | "8" => Ok(LanguageLevel::Java8),
            other => Err(format!(
                "unsupported language level '{}' (expected 1.5 to 1.8)",
                other
            )),
        }
    }
}

impl TryFrom<String> for LanguageLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Settings shared by every engine operation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineConfig {
    /// Level used when parsing generated units
    pub level: LanguageLevel,
    /// Placeholder markers in template source
    pub delimiters: DelimiterSyntax,
}

/// TOML structure for deserializing engine configuration
#[derive(Deserialize)]
struct TomlConfig {
    language: Option<TomlLanguage>,
    delimiters: Option<TomlDelimiters>,
}

#[derive(Deserialize)]
struct TomlLanguage {
    level: Option<LanguageLevel>,
}

#[derive(Deserialize)]
struct TomlDelimiters {
    open: Option<String>,
    separator: Option<String>,
    close: Option<String>,
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string, falling back to defaults for missing keys
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let defaults = DelimiterSyntax::default();

        let level = parsed
            .language
            .and_then(|l| l.level)
            .unwrap_or_default();

        let delimiters = match parsed.delimiters {
            Some(d) => DelimiterSyntax::new(
                d.open.unwrap_or(defaults.open),
                d.separator.unwrap_or(defaults.separator),
                d.close.unwrap_or(defaults.close),
            )
            .map_err(ConfigError::InvalidDelimiters)?,
            None => defaults,
        };

        Ok(EngineConfig { level, delimiters })
    }

    pub fn with_level(mut self, level: LanguageLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_delimiters(mut self, delimiters: DelimiterSyntax) -> Self {
        self.delimiters = delimiters;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.level, LanguageLevel::Java8);
        assert_eq!(config.delimiters.open, "<");
        assert_eq!(config.delimiters.separator, ":");
        assert_eq!(config.delimiters.close, ">");
    }

    #[test]
    fn test_parse_full_toml() {
        let config = EngineConfig::from_str(
            r#"
[language]
level = "1.7"

[delimiters]
open = "${"
separator = "|"
close = "}"
"#,
        )
        .expect("Should parse");
        assert_eq!(config.level, LanguageLevel::Java7);
        assert_eq!(config.delimiters.open, "${");
        assert_eq!(config.delimiters.separator, "|");
        assert_eq!(config.delimiters.close, "}");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = EngineConfig::from_str("").expect("Should parse");
        assert_eq!(config, EngineConfig::default());

        let config = EngineConfig::from_str("[delimiters]\nopen = \"[\"\nclose = \"]\"\n")
            .expect("Should parse");
        assert_eq!(config.delimiters.open, "[");
        assert_eq!(config.delimiters.separator, ":");
        assert_eq!(config.level, LanguageLevel::BASELINE);
    }

    #[test]
    fn test_invalid_level() {
        let result = EngineConfig::from_str("[language]\nlevel = \"11\"\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_empty_delimiter_rejected() {
        let result = EngineConfig::from_str("[delimiters]\nopen = \"\"\n");
        assert!(matches!(result, Err(ConfigError::InvalidDelimiters(_))));
    }

    #[test]
    fn test_invalid_toml_error() {
        assert!(EngineConfig::from_str("this is not valid toml [[[").is_err());
    }

    #[test]
    fn test_level_ordering_and_parsing() {
        assert!(LanguageLevel::Java7 < LanguageLevel::Java8);
        assert_eq!("8".parse::<LanguageLevel>(), Ok(LanguageLevel::Java8));
        assert_eq!(LanguageLevel::Java6.to_string(), "1.6");
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::default().with_level(LanguageLevel::Java5);
        assert_eq!(config.level, LanguageLevel::Java5);
    }
}
