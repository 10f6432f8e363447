use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides.
///
/// Variables are prefixed with `TITLER_` and nest on `__`, e.g.
/// `TITLER_FETCH__MAX_ATTEMPTS=3`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("TITLER_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::Site;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.database.path, PathBuf::from("titler.db"));
        assert!(config.sites.is_empty());
        assert!(config.grouping.skip_tokens.contains(&"hdts".to_string()));
        assert!(!config.grouping.enrich_media);
        assert_eq!(config.fetch.max_attempts, 10);
        assert!(config.metrics.textfile.is_none());
    }

    #[test]
    fn test_load_sites() {
        let toml = r#"
[[sites]]
site = "1337x"
pages_dir = "1337x_files"

[[sites]]
site = "rarbg"
pages_dir = "rarbg_files"
enabled = false
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.sites.len(), 2);
        assert_eq!(config.sites[0].site, Site::LeetX);
        assert!(config.sites[0].enabled);
        let enabled: Vec<_> = config.enabled_sites().collect();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].pages_dir, PathBuf::from("1337x_files"));
    }

    #[test]
    fn test_unknown_site_fails() {
        let toml = r#"
[[sites]]
site = "piratebay"
pages_dir = "x"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[database]
path = "/tmp/titles.db"

[grouping]
skip_tokens = ["cam"]
enrich_media = true

[fetch]
max_attempts = 3
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.database.path, PathBuf::from("/tmp/titles.db"));
        assert_eq!(config.grouping.skip_tokens, vec!["cam".to_string()]);
        assert!(config.grouping.enrich_media);
        assert_eq!(config.fetch.max_attempts, 3);
        assert_eq!(config.fetch.timeout_secs, 30);
    }
}
