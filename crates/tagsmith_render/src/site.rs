//! Batch rendering of a directory of pages.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::context::Context;
use crate::engine::Engine;
use crate::error::RenderResult;

/// Extensions rendered as pages.
const PAGE_EXTENSIONS: &[&str] = &["html", "shtml"];

/// Outcome of a site build.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    /// Output files written, in walk order
    pub rendered: Vec<PathBuf>,
    /// One message per page that failed to render
    pub warnings: Vec<String>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Renders every page below a directory into a mirrored output tree.
pub struct SiteBuilder<'e> {
    engine: &'e Engine,
    seed: Context,
}

impl<'e> SiteBuilder<'e> {
    pub fn new(engine: &'e Engine) -> Self {
        Self {
            engine,
            seed: Context::new(),
        }
    }

    /// Context every page starts from; each page gets its own copy.
    pub fn with_seed(mut self, seed: Context) -> Self {
        self.seed = seed;
        self
    }

    /// Render all pages under `pages_dir` (relative to the engine root)
    /// into `out_dir`.
    ///
    /// The templates directory is skipped. A page that fails to render is
    /// reported as a warning and the build continues.
    pub fn build(&self, pages_dir: &Path, out_dir: &Path) -> RenderResult<BuildReport> {
        let root = self.engine.config().root.join(pages_dir);
        let templates = self.engine.config().templates_path();
        info!("Building pages from {:?} into {:?}", root, out_dir);

        let mut report = BuildReport::default();
        if !root.is_dir() {
            warn!("Pages directory does not exist: {:?}", root);
            report
                .warnings
                .push(format!("pages directory not found: {}", root.display()));
            return Ok(report);
        }

        // The output tree may sit below the pages; never walk into it.
        fs::create_dir_all(out_dir)?;
        let output = fs::canonicalize(out_dir)?;
        let skipped = |entry: &DirEntry| {
            entry.file_type().is_dir()
                && (entry.path() == templates.as_path()
                    || fs::canonicalize(entry.path()).is_ok_and(|p| p == output))
        };

        for entry in WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !skipped(e))
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() || !is_page(path) {
                continue;
            }
            let relative = match path.strip_prefix(&root) {
                Ok(relative) => relative,
                Err(_) => continue,
            };
            let target = out_dir.join(relative);
            match self.render_page(path, &target) {
                Ok(()) => {
                    debug!("Rendered {:?} -> {:?}", path, target);
                    report.rendered.push(target);
                }
                Err(e) => {
                    warn!("Failed to render {:?}: {}", path, e);
                    report.warnings.push(format!("{}: {}", relative.display(), e));
                }
            }
        }

        info!(
            "Built {} pages with {} warnings",
            report.rendered.len(),
            report.warnings.len()
        );
        Ok(report)
    }

    fn render_page(&self, source: &Path, target: &Path) -> RenderResult<()> {
        let text = self.engine.loader().read(source)?;
        let mut context = self.seed.clone();
        let mut buffer = Vec::new();
        self.engine.render_source(&text, &mut context, &mut buffer)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, buffer)?;
        Ok(())
    }
}

fn is_page(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| PAGE_EXTENSIONS.contains(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use tempfile::tempdir;

    #[test]
    fn test_is_page() {
        assert!(is_page(Path::new("a/index.html")));
        assert!(is_page(Path::new("b.shtml")));
        assert!(!is_page(Path::new("style.css")));
        assert!(!is_page(Path::new("README")));
    }

    #[test]
    fn test_build_mirrors_tree_and_collects_warnings() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("pages/docs")).unwrap();
        fs::create_dir_all(root.join("templates")).unwrap();
        fs::write(root.join("pages/index.html"), "<p>{{ site }}</p>").unwrap();
        fs::write(root.join("pages/docs/guide.shtml"), "<hero>guide</hero>").unwrap();
        fs::write(root.join("pages/broken.html"), "<include src=\"gone.html\" />").unwrap();
        fs::write(root.join("pages/notes.txt"), "skip").unwrap();

        let engine = Engine::new(RenderConfig::new(root).include_env(false)).unwrap();
        let out = root.join("out");
        let report = SiteBuilder::new(&engine)
            .with_seed(Context::from_pairs([("site", "Example")]))
            .build(Path::new("pages"), &out)
            .unwrap();

        assert_eq!(report.rendered.len(), 2);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("broken.html"));
        assert_eq!(
            fs::read_to_string(out.join("index.html")).unwrap(),
            "<p>\nExample\n</p>\n"
        );
        assert!(out.join("docs/guide.shtml").is_file());
        assert!(!out.join("notes.txt").exists());
    }

    #[test]
    fn test_report_serializes_as_json() {
        let report = BuildReport {
            rendered: vec![PathBuf::from("out/index.html")],
            warnings: vec!["broken.html: missing".to_string()],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rendered"][0], "out/index.html");
        assert_eq!(json["warnings"][0], "broken.html: missing");
    }

    #[test]
    fn test_build_skips_output_below_pages() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::write(root.join("index.html"), "<p>x</p>").unwrap();
        fs::create_dir_all(root.join("public")).unwrap();
        fs::write(root.join("public/stale.html"), "<p>old</p>").unwrap();

        let engine = Engine::new(RenderConfig::new(root).include_env(false)).unwrap();
        let report = SiteBuilder::new(&engine)
            .build(Path::new("."), &root.join("public"))
            .unwrap();

        assert_eq!(report.rendered, vec![root.join("public").join("index.html")]);
    }

    #[test]
    fn test_build_missing_pages_dir_is_warning() {
        let temp = tempdir().unwrap();
        let engine = Engine::new(RenderConfig::new(temp.path()).include_env(false)).unwrap();
        let report = SiteBuilder::new(&engine)
            .build(Path::new("nope"), &temp.path().join("out"))
            .unwrap();
        assert!(report.rendered.is_empty());
        assert!(!report.is_clean());
    }
}
