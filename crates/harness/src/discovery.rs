//! Spec-file discovery
//!
//! Walks the spec root and applies the run configuration's include and
//! exclude globs. Page-definition files live next to spec files in the
//! reference layout, which is what the exclude list is for.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::pattern::Pattern;

/// Compiled include/exclude filter for spec paths
#[derive(Debug, Clone)]
pub struct SpecFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl SpecFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            include: include
                .iter()
                .map(|g| Pattern::new(g))
                .collect::<Result<_>>()?,
            exclude: exclude
                .iter()
                .map(|g| Pattern::new(g))
                .collect::<Result<_>>()?,
        })
    }

    pub fn from_config(config: &RunConfig) -> Result<Self> {
        Self::new(&config.specs, &config.exclude)
    }

    /// Whether a `/`-separated path relative to the spec root is a spec
    /// file: matched by any include glob and by no exclude glob.
    pub fn matches(&self, relative: &str) -> bool {
        self.include.iter().any(|p| p.matches_path(relative))
            && !self.exclude.iter().any(|p| p.matches_path(relative))
    }
}

/// Discover spec files under `root`, sorted by path.
pub fn discover(root: &Path, filter: &SpecFilter) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::SpecRootNotFound(root.to_path_buf()));
    }

    let mut specs = Vec::new();
    for entry in WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let unixy = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if filter.matches(&unixy) {
            specs.push(entry.path().to_path_buf());
        }
    }

    specs.sort();
    Ok(specs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"// spec").unwrap();
    }

    #[test]
    fn discovers_specs_and_skips_page_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("test/home.spec.js"));
        touch(&root.join("test/auth/login.spec.js"));
        touch(&root.join("test/auth/login.page.js"));
        touch(&root.join("src/helper.spec.js"));

        let filter = SpecFilter::from_config(&RunConfig::default()).unwrap();
        let specs = discover(root, &filter).unwrap();

        let names: Vec<String> = specs
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["test/auth/login.spec.js", "test/home.spec.js"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let filter = SpecFilter::new(&["**/*.spec.js".to_string()], &[]).unwrap();
        let err = discover(Path::new("/nonexistent/spec/root"), &filter).unwrap_err();
        assert!(matches!(err, Error::SpecRootNotFound(_)));
    }

    #[test]
    fn exclude_wins_over_include() {
        let filter = SpecFilter::new(
            &["test/**/*.js".to_string()],
            &["test/**/*.page.js".to_string()],
        )
        .unwrap();
        assert!(filter.matches("test/a.spec.js"));
        assert!(!filter.matches("test/pages/a.page.js"));
    }
}
