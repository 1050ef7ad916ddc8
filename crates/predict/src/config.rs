#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use catbot_core::DEFAULT_TEMPERATURE;
use catbot_sampler::{Sampling, DEFAULT_TOP_K};
use catbot_tokenize::DEFAULT_MAX_LENGTH;

use crate::filter::FilterRules;
use crate::words::WordClassSet;

/// Configuration loading and validation failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// file that failed
        path: PathBuf,
        /// underlying IO error
        source: std::io::Error,
    },
    /// The config file is not valid JSON of the expected shape.
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
    /// Temperature must be finite and positive.
    #[error("temperature must be finite and > 0, got {0}")]
    InvalidTemperature(f64),
    /// Top-k needs at least one candidate.
    #[error("top-k sampling needs k > 0")]
    InvalidTopK,
    /// A length field was zero.
    #[error("{0} must be > 0")]
    InvalidLength(&'static str),
}

/// Named decoding policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Policy {
    /// top-k 10, two joining words, eight words max
    #[default]
    Serving,
    /// full vocabulary, no joining words, six words max
    Offline,
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "serving" => Ok(Policy::Serving),
            "offline" => Ok(Policy::Offline),
            other => Err(format!("unknown policy {other:?}, expected serving or offline")),
        }
    }
}

/// Every knob of the decode pipeline.
///
/// Missing JSON fields take the serving defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// padded input length fed to the model
    pub max_length: usize,
    /// divisor applied to scores before softmax
    pub temperature: f64,
    /// per-position sampling policy
    pub sampling: Sampling,
    /// joining words admitted per reply
    pub joining_quota: usize,
    /// words after which a reply is cut
    pub max_words: usize,
    /// joining/filler lists in use
    pub word_classes: WordClassSet,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::serving()
    }
}

impl DecoderConfig {
    /// Interactive policy: top-k sampling, two joining words, eight words.
    pub fn serving() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            temperature: DEFAULT_TEMPERATURE,
            sampling: Sampling::TopK { k: DEFAULT_TOP_K },
            joining_quota: 2,
            max_words: 8,
            word_classes: WordClassSet::Serving,
        }
    }

    /// Offline policy: full-vocabulary sampling, joining words excluded, six words.
    pub fn offline() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            temperature: DEFAULT_TEMPERATURE,
            sampling: Sampling::Full,
            joining_quota: 0,
            max_words: 6,
            word_classes: WordClassSet::Offline,
        }
    }

    /// Preset for a named policy.
    pub fn for_policy(policy: Policy) -> Self {
        match policy {
            Policy::Serving => Self::serving(),
            Policy::Offline => Self::offline(),
        }
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Config file when given, otherwise the preset for `policy`.
    pub fn resolve(path: Option<&Path>, policy: Policy) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_json_file(p),
            None => Ok(Self::for_policy(policy)),
        }
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.temperature.is_finite() && self.temperature > 0.0) {
            return Err(ConfigError::InvalidTemperature(self.temperature));
        }
        if let Sampling::TopK { k: 0 } = self.sampling {
            return Err(ConfigError::InvalidTopK);
        }
        if self.max_length == 0 {
            return Err(ConfigError::InvalidLength("max_length"));
        }
        if self.max_words == 0 {
            return Err(ConfigError::InvalidLength("max_words"));
        }
        Ok(())
    }

    /// Limits handed to the word filter.
    pub fn filter_rules(&self) -> FilterRules {
        FilterRules {
            joining_quota: self.joining_quota,
            max_words: self.max_words,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_match_the_two_policies() {
        let s = DecoderConfig::serving();
        assert_eq!(s.sampling, Sampling::TopK { k: 10 });
        assert_eq!((s.joining_quota, s.max_words, s.max_length), (2, 8, 20));
        assert!((s.temperature - 0.8).abs() < f64::EPSILON);

        let o = DecoderConfig::offline();
        assert_eq!(o.sampling, Sampling::Full);
        assert_eq!((o.joining_quota, o.max_words), (0, 6));
        assert_eq!(o.word_classes, WordClassSet::Offline);
    }

    #[test]
    fn partial_json_takes_serving_defaults() {
        let cfg = DecoderConfig::from_json_str(r#"{"max_words": 5}"#).unwrap();
        assert_eq!(cfg.max_words, 5);
        assert_eq!(cfg.joining_quota, 2);
        assert_eq!(cfg.sampling, Sampling::TopK { k: 10 });
    }

    #[test]
    fn full_json_round_trips_through_presets() {
        let json = serde_json::to_string(&DecoderConfig::offline()).unwrap();
        assert_eq!(DecoderConfig::from_json_str(&json).unwrap(), DecoderConfig::offline());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            DecoderConfig::from_json_str(r#"{"temperature": 0.0}"#),
            Err(ConfigError::InvalidTemperature(_))
        ));
        assert!(matches!(
            DecoderConfig::from_json_str(r#"{"sampling": {"kind": "top_k", "k": 0}}"#),
            Err(ConfigError::InvalidTopK)
        ));
        assert!(matches!(
            DecoderConfig::from_json_str(r#"{"max_length": 0}"#),
            Err(ConfigError::InvalidLength("max_length"))
        ));
        assert!(matches!(
            DecoderConfig::from_json_str(r#"{"max_words": "eight"}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            DecoderConfig::from_json_file("/nonexistent/catbot.json"),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn resolve_prefers_the_file() {
        assert_eq!(
            DecoderConfig::resolve(None, Policy::Offline).unwrap(),
            DecoderConfig::offline()
        );
        let path = std::env::temp_dir().join(format!("catbot-cfg-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"max_words": 4}"#).unwrap();
        let cfg = DecoderConfig::resolve(Some(&path), Policy::Offline).unwrap();
        assert_eq!(cfg.max_words, 4);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("Offline".parse::<Policy>(), Ok(Policy::Offline));
        assert_eq!("serving".parse::<Policy>(), Ok(Policy::Serving));
        assert!("greedy".parse::<Policy>().is_err());
    }
}
