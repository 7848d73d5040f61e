use config::{Config, ConfigError, File as ConfigFile};
use serde::Deserialize;

/// What happens to files the classifier could not place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnclassifiedPolicy {
    /// Left out of the destination plan, listed for review.
    #[default]
    Exclude,
    /// Copied verbatim into `catch_all_folder`.
    CatchAll,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub root_path: String,
    pub ignore_patterns: Vec<String>,
    pub year_range: (i32, i32),
    pub unclassified: UnclassifiedPolicy,
    /// Root of the normalized tree; destinations are `<root>/<folder>/<file>`.
    pub destination_root: String,
    pub catch_all_folder: String,
    /// Planned rows below this confidence are flagged for review.
    pub review_threshold: f32,
    pub csv_output: Option<String>,
    pub json_output: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root_path: "./datos_originales".to_string(),
            ignore_patterns: Vec::new(),
            year_range: (1900, 2100),
            unclassified: UnclassifiedPolicy::Exclude,
            destination_root: "datos_tratados".to_string(),
            catch_all_folder: "otros".to_string(),
            review_threshold: 0.75,
            csv_output: Some("mapeo_archivos.csv".to_string()),
            json_output: Some("mapeo_archivos.json".to_string()),
        }
    }
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> AppConfig {
        Config::builder()
            .add_source(ConfigFile::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = from_toml("");
        assert_eq!(config.root_path, "./datos_originales");
        assert_eq!(config.year_range, (1900, 2100));
        assert_eq!(config.unclassified, UnclassifiedPolicy::Exclude);
        assert_eq!(config.catch_all_folder, "otros");
        assert_eq!(config.destination_root, "datos_tratados");
        assert_eq!(config.csv_output.as_deref(), Some("mapeo_archivos.csv"));
    }

    #[test]
    fn test_config_overrides() {
        let config = from_toml(
            r#"
            root_path = "/data/contabilidad"
            ignore_patterns = ["**/~$*"]
            year_range = [2000, 2099]
            unclassified = "catch_all"
            catch_all_folder = "varios"
            destination_root = "/data/tratados"
            review_threshold = 0.9
            "#,
        );
        assert_eq!(config.root_path, "/data/contabilidad");
        assert_eq!(config.ignore_patterns, vec!["**/~$*".to_string()]);
        assert_eq!(config.year_range, (2000, 2099));
        assert_eq!(config.unclassified, UnclassifiedPolicy::CatchAll);
        assert_eq!(config.catch_all_folder, "varios");
        assert_eq!(config.destination_root, "/data/tratados");
        assert_eq!(config.review_threshold, 0.9);
    }
}
