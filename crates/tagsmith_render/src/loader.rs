//! Template source loading.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{RenderError, RenderResult};

/// Reads template files below a root directory.
#[derive(Debug, Clone)]
pub struct TemplateLoader {
    root: PathBuf,
    templates_dir: String,
}

impl TemplateLoader {
    /// Create a new template loader.
    pub fn new(root: impl Into<PathBuf>, templates_dir: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            templates_dir: templates_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join path segments under the root.
    pub fn resolve<S: AsRef<str>>(&self, segments: &[S]) -> PathBuf {
        let mut path = self.root.clone();
        for segment in segments {
            path.push(segment.as_ref());
        }
        path
    }

    /// Resolve a `/`-separated template reference, as written in an
    /// `src` or `base` attribute, under the templates directory.
    pub fn resolve_template(&self, reference: &str) -> PathBuf {
        let mut segments = vec![self.templates_dir.as_str()];
        segments.extend(reference.split('/').filter(|s| !s.is_empty()));
        self.resolve(&segments)
    }

    /// Read a template file.
    pub fn read(&self, path: &Path) -> RenderResult<String> {
        debug!("Reading template {:?}", path);
        fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => RenderError::TemplateNotFound {
                path: path.to_path_buf(),
            },
            _ => RenderError::Io(e),
        })
    }
}
