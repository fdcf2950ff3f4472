use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use zerve_chain::EvaluatorConfig;

use crate::error::{CoreError, CoreResult};

/// Engine configuration, read from TOML.
///
/// Every field is optional in the file; missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Root holding `blocks/`, `docs/` and `trash/`.
    pub data_dir: PathBuf,
    pub max_append_retries: u32,
    pub max_chain_depth: Option<usize>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            max_append_retries: 8,
            max_chain_depth: None,
        }
    }
}

impl CoreConfig {
    /// Environment variable that overrides `data_dir`.
    pub const DATA_DIR_ENV: &'static str = "ZERVE_DATA_DIR";

    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        toml::from_str(text).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Read a TOML config file, or start from defaults when `path` is `None`,
    /// then apply the environment override.
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    CoreError::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        Ok(config.with_data_dir(std::env::var_os(Self::DATA_DIR_ENV).map(PathBuf::from)))
    }

    /// Replace `data_dir` when an override is given.
    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(data_dir) = data_dir {
            self.data_dir = data_dir;
        }
        self
    }

    pub fn to_toml_string(&self) -> CoreResult<String> {
        toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))
    }

    pub fn layout(&self) -> DataLayout {
        DataLayout::new(&self.data_dir)
    }

    pub fn evaluator_config(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            max_append_retries: self.max_append_retries,
            max_chain_depth: self.max_chain_depth,
        }
    }
}

/// Directory layout under the data root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn blocks_dir(&self) -> PathBuf {
        self.root.join("blocks")
    }

    pub fn docs_dir(&self) -> PathBuf {
        self.root.join("docs")
    }

    pub fn trash_dir(&self) -> PathBuf {
        self.root.join("trash")
    }

    /// Create all three directories.
    pub async fn create(&self) -> CoreResult<()> {
        for dir in [self.blocks_dir(), self.docs_dir(), self.trash_dir()] {
            fs::create_dir_all(&dir).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = CoreConfig::default();
        assert_eq!(c.data_dir, PathBuf::from("./data"));
        assert_eq!(c.max_append_retries, 8);
        assert!(c.max_chain_depth.is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = CoreConfig::from_toml_str("max_chain_depth = 1000\n").unwrap();
        assert_eq!(c.max_chain_depth, Some(1000));
        assert_eq!(c.max_append_retries, 8);
        assert_eq!(c.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn bad_toml_is_config_error() {
        assert!(matches!(
            CoreConfig::from_toml_str("max_append_retries = \"many\""),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn toml_roundtrip() {
        let c = CoreConfig {
            data_dir: "/srv/zerve".into(),
            max_append_retries: 3,
            max_chain_depth: Some(50),
        };
        let text = c.to_toml_string().unwrap();
        assert_eq!(CoreConfig::from_toml_str(&text).unwrap(), c);
    }

    #[test]
    fn data_dir_override() {
        let c = CoreConfig::default().with_data_dir(Some("/elsewhere".into()));
        assert_eq!(c.data_dir, PathBuf::from("/elsewhere"));
        let c = c.with_data_dir(None);
        assert_eq!(c.data_dir, PathBuf::from("/elsewhere"));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zerve.toml");
        std::fs::write(&path, "data_dir = \"/from/file\"\nmax_append_retries = 2\n").unwrap();
        let c = CoreConfig::load(Some(&path)).unwrap();
        assert_eq!(c.max_append_retries, 2);
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            CoreConfig::load(Some(&dir.path().join("absent.toml"))),
            Err(CoreError::Config(_))
        ));
    }

    #[tokio::test]
    async fn layout_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path().join("data"));
        layout.create().await.unwrap();
        assert!(layout.blocks_dir().is_dir());
        assert!(layout.docs_dir().is_dir());
        assert!(layout.trash_dir().is_dir());
    }

    #[test]
    fn evaluator_config_follows_core_config() {
        let c = CoreConfig {
            max_chain_depth: Some(7),
            ..CoreConfig::default()
        };
        let e = c.evaluator_config();
        assert_eq!(e.max_append_retries, 8);
        assert_eq!(e.max_chain_depth, Some(7));
    }
}
