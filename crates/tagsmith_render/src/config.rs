//! Render configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::charrefs::CharrefTable;
use crate::error::{RenderError, RenderResult};

/// File name looked up in the root when no config path is given.
pub const CONFIG_FILE_NAME: &str = "tagsmith.yaml";

/// Settings shared by every render call of an engine.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
    /// Directory that top-level template paths resolve against
    pub root: PathBuf,
    /// Subdirectory of `root` used by `<include>` and `<extends>`
    pub templates_dir: String,
    /// Base template used by `<extends>` without a `base` attribute
    pub default_base: String,
    /// Template spliced in by `<header/>`
    pub header_include: String,
    /// Template spliced in by `<footer/>`
    pub footer_include: String,
    /// `href` of the `<favicon/>` link
    pub favicon_href: String,
    /// Script loaded by `<analytics/>`
    pub analytics_script: String,
    /// Optional charref table (YAML or JSON); built-in entities otherwise
    pub charrefs: Option<PathBuf>,
    /// Whether process environment variables seed the context
    pub include_env: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            templates_dir: "templates".to_string(),
            default_base: "base.html".to_string(),
            header_include: "/includes/header.shtml".to_string(),
            footer_include: "/includes/footer.shtml".to_string(),
            favicon_href: "/dashboard/images/favicon.png".to_string(),
            analytics_script: "/dashboard/javascripts/fb_insert.js".to_string(),
            charrefs: None,
            include_env: true,
        }
    }
}

impl RenderConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Load a config file. Relative `root` and `charrefs` paths resolve
    /// against the file's directory.
    pub fn load(path: &Path) -> RenderResult<Self> {
        debug!("Loading config from {:?}", path);
        let content = fs::read_to_string(path)?;
        let mut config: RenderConfig = serde_yaml::from_str(&content)?;
        let base = path.parent().unwrap_or(Path::new("."));
        if config.root.is_relative() {
            config.root = base.join(&config.root);
        }
        if let Some(charrefs) = config.charrefs.as_mut() {
            if charrefs.is_relative() {
                *charrefs = base.join(&*charrefs);
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Use `path` if given, else `tagsmith.yaml` in `root` if present, else
    /// defaults rooted at `root`.
    pub fn discover(path: Option<&Path>, root: &Path) -> RenderResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let candidate = root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            let mut config = Self::load(&candidate)?;
            config.root = root.to_path_buf();
            return Ok(config);
        }
        Ok(Self::new(root))
    }

    pub fn with_templates_dir(mut self, dir: impl Into<String>) -> Self {
        self.templates_dir = dir.into();
        self
    }

    pub fn with_charrefs(mut self, path: impl Into<PathBuf>) -> Self {
        self.charrefs = Some(path.into());
        self
    }

    pub fn include_env(mut self, include: bool) -> Self {
        self.include_env = include;
        self
    }

    /// Reject values that cannot name a template.
    pub fn validate(&self) -> RenderResult<()> {
        if self.default_base.trim().is_empty() {
            return Err(RenderError::InvalidConfig(
                "default_base must not be empty".to_string(),
            ));
        }
        if self.header_include.trim().is_empty() || self.footer_include.trim().is_empty() {
            return Err(RenderError::InvalidConfig(
                "header_include and footer_include must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Load the configured charref table, or the built-in one.
    pub fn load_charrefs(&self) -> RenderResult<CharrefTable> {
        match &self.charrefs {
            Some(path) => CharrefTable::load(path),
            None => Ok(CharrefTable::html_defaults()),
        }
    }

    /// Directory holding includable templates.
    pub fn templates_path(&self) -> PathBuf {
        self.root.join(&self.templates_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.templates_dir, "templates");
        assert_eq!(config.default_base, "base.html");
        assert!(config.include_env);
        assert_eq!(config.templates_path(), PathBuf::from("./templates"));
    }

    #[test]
    fn test_load_partial_file_resolves_paths() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            "root: site\ncharrefs: refs.yaml\ninclude_env: false\ndefault_base: layout.html\n",
        )
        .unwrap();

        let config = RenderConfig::load(&path).unwrap();
        assert_eq!(config.root, temp.path().join("site"));
        assert_eq!(config.charrefs, Some(temp.path().join("refs.yaml")));
        assert!(!config.include_env);
        assert_eq!(config.default_base, "layout.html");
        assert_eq!(config.templates_dir, "templates");
    }

    #[test]
    fn test_discover_falls_back_to_defaults() {
        let temp = tempdir().unwrap();
        let config = RenderConfig::discover(None, temp.path()).unwrap();
        assert_eq!(config.root, temp.path());
        assert_eq!(config.header_include, "/includes/header.shtml");
    }

    #[test]
    fn test_builder_overrides() {
        let temp = tempdir().unwrap();
        let refs = temp.path().join("refs.yaml");
        fs::write(&refs, "heart: \"&#9829;\"\n").unwrap();

        let config = RenderConfig::new(temp.path())
            .with_templates_dir("layouts")
            .with_charrefs(&refs);
        assert_eq!(config.templates_path(), temp.path().join("layouts"));

        let charrefs = config.load_charrefs().unwrap();
        assert_eq!(charrefs.len(), 1);
        assert_eq!(charrefs.get("heart"), Some("&#9829;"));
    }

    #[test]
    fn test_validate_rejects_empty_base() {
        let config = RenderConfig {
            default_base: " ".to_string(),
            ..RenderConfig::default()
        };
        assert!(matches!(config.validate(), Err(RenderError::InvalidConfig(_))));
    }
}
