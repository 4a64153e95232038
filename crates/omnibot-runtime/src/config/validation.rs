//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, LoggingConfig, OmnibotConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &OmnibotConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validates logging configuration.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File {
        match &logging.file_path {
            None => return Err(ConfigError::missing_field("logging.file_path")),
            Some(path) if path.file_name().is_none() => {
                return Err(ConfigError::validation(format!(
                    "Log file path has no file name: {}",
                    path.display()
                )));
            }
            Some(_) => {}
        }
    }

    for module in logging.filters.keys() {
        if module.trim().is_empty() {
            return Err(ConfigError::validation(
                "Log filter module names cannot be empty",
            ));
        }
        if module.contains(char::is_whitespace) || module.contains('=') {
            return Err(ConfigError::validation(format!(
                "Invalid log filter module name: {module:?}"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogLevel;
    use std::path::PathBuf;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&OmnibotConfig::default()).is_ok());
    }

    #[test]
    fn test_file_output_needs_path() {
        let mut config = OmnibotConfig::default();
        config.logging.output = LogOutput::File;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { .. })
        ));

        config.logging.file_path = Some(PathBuf::from("/"));
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));

        config.logging.file_path = Some(PathBuf::from("logs/omnibot.log"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_filter_module() {
        let mut config = OmnibotConfig::default();
        config.logging.filters.insert(" ".to_string(), LogLevel::Debug);
        assert!(validate_config(&config).is_err());

        let mut config = OmnibotConfig::default();
        config
            .logging
            .filters
            .insert("omnibot_router=trace".to_string(), LogLevel::Debug);
        assert!(validate_config(&config).is_err());
    }
}
