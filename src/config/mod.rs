pub mod cli;

use crate::utils::error::{AdmError, Result};
use chrono::FixedOffset;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Association-wide settings threaded into parsing and formatting instead of
/// a global singleton: the current period anchors seniority prefixes, the
/// event name anchors the registration export's first section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationConfig {
    pub name: String,
    pub event_name: String,
    pub current_period: i32,
    /// Local offset from UTC in hours, used when exports carry naive
    /// timestamps.
    pub utc_offset_hours: i32,
}

impl Default for AssociationConfig {
    fn default() -> Self {
        Self {
            name: "TÅGEKAMMERET".to_string(),
            event_name: "TÅGEKAMMERETS 60 års jubilæumsfest".to_string(),
            current_period: 2015,
            utc_offset_hours: 1,
        }
    }
}

impl AssociationConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        let config: Self = toml::from_str(&processed).map_err(|e| AdmError::Config {
            message: format!("TOML parsing error: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.event_name.trim().is_empty() {
            return Err(AdmError::Config {
                message: "event_name cannot be empty".to_string(),
            });
        }
        if !(1900..=2100).contains(&self.current_period) {
            return Err(AdmError::Config {
                message: format!("current_period {} out of range", self.current_period),
            });
        }
        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(AdmError::Config {
                message: format!("utc_offset_hours {} out of range", self.utc_offset_hours),
            });
        }
        Ok(())
    }

    pub fn timezone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).expect("offset checked by validate")
    }
}

/// Replaces `${VAR}` references with environment values; unknown variables
/// are left as-is.
fn substitute_env_vars(content: &str) -> String {
    let re = Regex::new(r"\$\{([^}]+)\}").unwrap();
    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{var_name}}}"))
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AssociationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timezone().local_minus_utc(), 3600);
    }

    #[test]
    fn test_parse_toml_config() {
        let toml_content = r#"
name = "TÅGEKAMMERET"
event_name = "TÅGEKAMMERETS 60 års jubilæumsfest"
current_period = 2015
utc_offset_hours = 1
"#;
        let config = AssociationConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.current_period, 2015);
        assert_eq!(config.event_name, "TÅGEKAMMERETS 60 års jubilæumsfest");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("J60_TEST_EVENT", "Jubilæum");
        let toml_content = r#"
name = "TK"
event_name = "${J60_TEST_EVENT}"
current_period = 2015
utc_offset_hours = 1
"#;
        let config = AssociationConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.event_name, "Jubilæum");
        std::env::remove_var("J60_TEST_EVENT");
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let mut config = AssociationConfig::default();
        config.current_period = 15;
        assert!(config.validate().is_err());

        let mut config = AssociationConfig::default();
        config.utc_offset_hours = 30;
        assert!(config.validate().is_err());
    }
}
