//! Digester configuration
//!
//! Holds the markup sentinels the stream parser recognises and how completed matches are
//! post-processed. Configurations can be written as YAML or JSON.

use serde::{Deserialize, Serialize};

use crate::error::{DigestError, Result};

/// Settings shared by the stream parser and the digester facade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DigesterConfig {
    /// Prefix of the token following `<` that opens a CDATA section
    pub cdata_open: String,
    /// Suffix of the token preceding `>` that closes a CDATA section
    pub cdata_close: String,
    /// Tag names starting with any of these are skipped (comments, directives, instructions)
    pub skip_prefixes: Vec<String>,
    /// Trim surrounding whitespace from every completed match
    pub trim_matches: bool,
}

impl Default for DigesterConfig {
    fn default() -> Self {
        DigesterConfig {
            cdata_open: "![CDATA[".to_string(),
            cdata_close: "]]".to_string(),
            skip_prefixes: vec!["!".to_string(), "?".to_string()],
            trim_matches: false,
        }
    }
}

impl DigesterConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let config: DigesterConfig = serde_yaml::from_str(source)
            .map_err(|e| DigestError::Configuration(format!("invalid YAML config: {}", e)))?;
        config.validate()
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        let config: DigesterConfig = serde_json::from_str(source)
            .map_err(|e| DigestError::Configuration(format!("invalid JSON config: {}", e)))?;
        config.validate()
    }

    /// Reject sentinels that would make CDATA detection match every token
    pub fn validate(self) -> Result<Self> {
        if self.cdata_open.is_empty() || self.cdata_close.is_empty() {
            return Err(DigestError::Configuration(
                "CDATA sentinels must not be empty".to_string(),
            ));
        }
        if self.skip_prefixes.iter().any(|prefix| prefix.is_empty()) {
            return Err(DigestError::Configuration(
                "skip prefixes must not be empty".to_string(),
            ));
        }
        Ok(self)
    }

    /// Whether a tag with this name is a comment, directive or processing instruction
    pub fn is_skipped(&self, name: &str) -> bool {
        self.skip_prefixes
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }
}
