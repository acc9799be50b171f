use super::Config;
use anyhow::{Context, Result};
use std::path::Path;

/// Read and validate a configuration file
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or
/// fails validation
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
        .with_context(|| format!("Invalid config file: {}", path.display()))
}

/// Parse and validate configuration text
///
/// # Errors
///
/// Returns an error if the text is not valid TOML or fails validation
pub fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse TOML config")?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<()> {
    let name = config.core.ignore_file_name.as_str();
    if name.is_empty() {
        anyhow::bail!("core.ignore_file_name must not be empty");
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        anyhow::bail!("core.ignore_file_name must be a plain file name, got '{name}'");
    }

    if config.performance.parallel_threads > 1024 {
        anyhow::bail!("performance.parallel_threads cannot exceed 1024");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(parse_config_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = parse_config_str("[link]\nabsolute = true\n").unwrap();
        assert!(config.link.absolute);
        assert!(!config.link.hard);
        assert_eq!(config.core.ignore_file_name, ".nzmstow-local-ignore");
    }

    #[rstest]
    #[case("[core]\nignore_file_name = \"\"\n", "must not be empty")]
    #[case("[core]\nignore_file_name = \"a/b\"\n", "plain file name")]
    #[case("[performance]\nparallel_threads = 5000\n", "cannot exceed")]
    #[case("[link]\nhard = \"yes\"\n", "Failed to parse TOML")]
    fn test_invalid_config(#[case] content: &str, #[case] expected: &str) {
        let err = parse_config_str(content).unwrap_err();
        assert!(
            format!("{err:#}").contains(expected),
            "{err:#} should mention {expected}"
        );
    }
}
