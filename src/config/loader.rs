//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::NavigatorConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<NavigatorConfig, ConfigError> {
    let config: NavigatorConfig = toml::from_str(content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<NavigatorConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyKind;

    #[test]
    fn test_empty_file_yields_demo_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.navigation.root, "root");
        assert!(config.navigation.animated);
        assert_eq!(config.flows.len(), 4);
        assert_eq!(config.table.entries.len(), 3);
    }

    #[test]
    fn test_full_file() {
        let config = parse_config(
            r#"
            [navigation]
            root = "home"
            animated = false
            strategy = "rebuild"

            [[flows]]
            identifier = "home"
            children = ["inbox"]

            [[flows]]
            identifier = "inbox"

            [table]
            dynamic_keys = ["latest"]

            [[table.entries]]
            key = "inbox"
            identifier = "inbox"
            context = { folder = "unread", page = 2 }

            [[table.paths]]
            name = "unread"
            segments = ["inbox"]

            [[table.paths]]
            name = "unread-latest"
            segments = ["inbox", "latest"]

            [presentation]
            animation_ms = 0
            jitter_ms = 0

            [observability]
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.navigation.strategy, StrategyKind::Rebuild);
        assert!(!config.navigation.animated);
        assert_eq!(config.flow("home").unwrap().children, vec!["inbox".to_string()]);
        let context = config.table.entries[0].context.as_ref().unwrap();
        assert_eq!(context["page"], serde_json::json!(2));
        assert_eq!(config.table.dynamic_keys, vec!["latest".to_string()]);
        assert_eq!(config.table.paths.len(), 2);
        assert_eq!(config.presentation.animation_ms, 0);
        assert_eq!(config.observability.log_level, "debug");
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_invalid_file_reports_every_error() {
        let err = parse_config(
            r#"
            [navigation]
            root = "nowhere"

            [[flows]]
            identifier = "home"
            children = ["ghost"]
            "#,
        )
        .unwrap_err();

        let ConfigError::Validation(errors) = &err else {
            panic!("expected validation error, got {err}");
        };
        assert_eq!(errors.len(), 2);
        assert!(err.to_string().starts_with("Validation failed: "));
    }

    #[test]
    fn test_syntax_error() {
        let err = parse_config("[navigation\nroot = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
