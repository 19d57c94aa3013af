//! Collection-phase glue for external test runners.
//!
//! The runner parses its own command line; this module consumes the parsed
//! options. When generation is requested, the collection hook resolves the
//! effective source path, runs the generation pipeline, and clears the
//! collected test items for that run — generation replaces execution.

use std::path::{Path, PathBuf};

use crate::create::{create_tests, CreateError};
use crate::discover::ModuleRegistry;

/// Options a runner passes through from its `--create`/`--src` flags.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateOptions {
    /// `None`: generation not requested. `Some(None)`: requested with no
    /// inline path. `Some(Some(path))`: requested with `--create=<path>`.
    pub create: Option<Option<PathBuf>>,
    /// Explicit `--src` path; wins over an inline `--create` path.
    pub src: Option<PathBuf>,
}

impl CreateOptions {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn enabled() -> Self {
        Self {
            create: Some(None),
            src: None,
        }
    }

    pub fn with_create_path(path: impl Into<PathBuf>) -> Self {
        Self {
            create: Some(Some(path.into())),
            src: None,
        }
    }

    pub fn with_src(mut self, src: impl Into<PathBuf>) -> Self {
        self.src = Some(src.into());
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.create.is_some()
    }

    /// The source path generation should read from: explicit `--src`, else
    /// the inline `--create` path, else the conventional default.
    pub fn effective_src(&self, rootpath: &Path) -> PathBuf {
        if let Some(src) = &self.src {
            return src.clone();
        }
        if let Some(Some(inline)) = &self.create {
            return inline.clone();
        }
        default_src(rootpath)
    }
}

/// The conventional default source directory under a project root.
pub fn default_src(rootpath: &Path) -> PathBuf {
    rootpath.join("src")
}

/// The conventional default destination for generated unit tests, mirroring
/// the source layout under `tests/unit_tests/`.
pub fn default_dst(rootpath: &Path, src: &Path) -> PathBuf {
    let tests_dir = rootpath.join("tests").join("unit_tests");
    match src.strip_prefix(rootpath) {
        Ok(relative) => tests_dir.join(relative),
        Err(_) => tests_dir,
    }
}

/// Whether a path has a `tests` component.
pub fn is_in_tests_dir(path: &Path) -> bool {
    path.components()
        .any(|part| part.as_os_str().to_string_lossy().to_lowercase() == "tests")
}

/// Collection hook: when generation is requested, create test files under
/// the conventional destination for the root and clear the collected items
/// so the runner executes nothing this pass. Returns the created file paths
/// (empty when disabled).
pub fn collection_hook<T>(
    options: &CreateOptions,
    registry: &ModuleRegistry,
    rootpath: &Path,
    items: &mut Vec<T>,
) -> Result<Vec<PathBuf>, CreateError> {
    if !options.is_enabled() {
        return Ok(Vec::new());
    }
    let src = options.effective_src(rootpath);
    let dst = default_dst(rootpath, &src);
    let created = create_tests(registry, &src, &dst)?;
    items.clear();
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_src_precedence() {
        let root = PathBuf::from("/project");

        let opts = CreateOptions::enabled();
        assert_eq!(opts.effective_src(&root), PathBuf::from("/project/src"));

        let opts = CreateOptions::with_create_path("/elsewhere/src");
        assert_eq!(opts.effective_src(&root), PathBuf::from("/elsewhere/src"));

        let opts = CreateOptions::with_create_path("/elsewhere/src").with_src("/explicit/src");
        assert_eq!(opts.effective_src(&root), PathBuf::from("/explicit/src"));
    }

    #[test]
    fn test_disabled_options() {
        assert!(!CreateOptions::disabled().is_enabled());
        assert!(CreateOptions::enabled().is_enabled());
    }

    #[test]
    fn test_default_dst_mirrors_src_layout() {
        let root = PathBuf::from("/project");
        let src = PathBuf::from("/project/src/pkg");
        assert_eq!(
            default_dst(&root, &src),
            PathBuf::from("/project/tests/unit_tests/src/pkg")
        );
        // A source outside the root falls back to the tests dir itself.
        assert_eq!(
            default_dst(&root, Path::new("/elsewhere")),
            PathBuf::from("/project/tests/unit_tests")
        );
    }

    #[test]
    fn test_is_in_tests_dir() {
        assert!(is_in_tests_dir(Path::new("/project/tests/unit_tests")));
        assert!(is_in_tests_dir(Path::new("/project/Tests/x")));
        assert!(!is_in_tests_dir(Path::new("/project/src")));
    }

    #[test]
    fn test_disabled_hook_leaves_items_alone() {
        let registry = ModuleRegistry::new();
        let mut items = vec!["a", "b"];
        let created = collection_hook(
            &CreateOptions::disabled(),
            &registry,
            Path::new("/project"),
            &mut items,
        )
        .expect("disabled hook cannot fail");
        assert!(created.is_empty());
        assert_eq!(items.len(), 2);
    }
}
