pub mod commands;
pub mod ui;

use clap::ValueEnum;
use std::path::Path;

use crate::types::{Result, ReviewForAnalysis};

/// Output format of the analysis commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output format of `config show`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ConfigFormat {
    #[default]
    Toml,
    Json,
}

/// Load a JSON array of reviews (camelCase fields)
pub fn read_reviews(path: &Path) -> Result<Vec<ReviewForAnalysis>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_reviews_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "a", "content": "Lovely", "rating": 5, "createdAt": "2024-03-01T09:30:00Z"}}]"#
        )
        .unwrap();

        let reviews = read_reviews(file.path()).unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].id, "a");
        assert!(reviews[0].platform.is_none());
    }

    #[test]
    fn test_read_reviews_rejects_bad_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = read_reviews(file.path()).unwrap_err();
        assert_eq!(err.kind(), crate::types::ErrorKind::UnknownFailure);
    }

    #[test]
    fn test_config_format_rejects_unknown_values() {
        assert_eq!(ConfigFormat::from_str("json", true), Ok(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_str("TOML", true), Ok(ConfigFormat::Toml));
        assert!(ConfigFormat::from_str("yaml", true).is_err());
    }
}
