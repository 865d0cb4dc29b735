//! Repository and documentation layout resolution.
//!
//! Everything here is computed from an explicit starting point and returned
//! by value; the caller owns the result for the duration of one run.

use std::path::{Component, Path, PathBuf};

use crate::config::Config;
use crate::error::Error;
use crate::types::Category;

/// Candidate documentation directory names under a repository root, in
/// order of preference.
const DOCS_DIR_NAMES: [&str; 3] = ["docs", "documentation", "doc"];

/// Files whose presence next to a docs directory marks a repository root.
const PROJECT_MANIFESTS: [&str; 3] = ["setup.py", "pyproject.toml", "Cargo.toml"];

/// The declared structural map of a documentation root, as absolute paths.
/// Directories are declared whether or not they exist on disk.
#[derive(Debug, Clone)]
pub struct DocStructure {
    /// AI-generated docs root.
    pub ai_docs: PathBuf,
    /// Auto-generated docs root.
    pub auto_docs: PathBuf,
    /// Extra auto-generated locations such as `autoapi/`.
    pub auto_roots: Vec<PathBuf>,
    /// The documentation root itself.
    pub root: PathBuf,
    /// Hand-written docs root.
    pub user_docs: PathBuf,
}

impl DocStructure {
    /// Category roots in discovery order.
    pub fn category_roots(&self) -> [(Category, &Path); 3] {
        return [
            (Category::User, self.user_docs.as_path()),
            (Category::Auto, self.auto_docs.as_path()),
            (Category::Ai, self.ai_docs.as_path()),
        ];
    }

    /// Whether the path lies inside any declared structural directory.
    /// Compares whole components, so `user_docs2/` is not inside `user_docs/`.
    pub fn contains(&self, path: &Path) -> bool {
        return self.declared_dirs().any(|dir| return path.starts_with(dir));
    }

    /// Category roots followed by the extra auto roots.
    pub fn declared_dirs(&self) -> impl Iterator<Item = &Path> {
        return [self.user_docs.as_path(), self.auto_docs.as_path(), self.ai_docs.as_path()]
            .into_iter()
            .chain(self.auto_roots.iter().map(PathBuf::as_path));
    }

    /// Whether any component below the docs root excludes this path.
    /// Components above the root are not considered.
    pub fn is_excluded(&self, path: &Path, config: &Config) -> bool {
        return self.relative(path).components().any(|c| {
            return match c {
                Component::Normal(name) => config.is_excluded_component(&name.to_string_lossy()),
                _ => false,
            };
        });
    }

    /// Path relative to the docs root; unchanged if it lies outside.
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        return path.strip_prefix(&self.root).unwrap_or(path);
    }

    /// Build the structure for a documentation root.
    ///
    /// # Errors
    ///
    /// Returns `Error::DocsDirNotFound` if `docs_dir` is not an existing
    /// directory.
    pub fn resolve(docs_dir: &Path, config: &Config) -> Result<Self, Error> {
        if !docs_dir.is_dir() {
            return Err(Error::DocsDirNotFound { path: docs_dir.to_path_buf() });
        }
        let root = std::fs::canonicalize(docs_dir)?;

        return Ok(Self {
            ai_docs: root.join(&config.ai_docs),
            auto_docs: root.join(&config.auto_docs),
            auto_roots: config.auto_roots.iter().map(|r| return root.join(r)).collect(),
            user_docs: root.join(&config.user_docs),
            root,
        });
    }

    /// Derived output URL: relative to the docs root, `/`-separated, with
    /// the extension swapped for the output suffix.
    pub fn url_for(&self, path: &Path, suffix: &str) -> String {
        let relative = self.relative(path).with_extension(suffix);
        return relative
            .components()
            .filter_map(|c| {
                return match c {
                    Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                    _ => None,
                };
            })
            .collect::<Vec<_>>()
            .join("/");
    }
}

/// Whether `dir` looks like the root of a project that keeps its docs in `docs/`.
fn is_repo_root(dir: &Path) -> bool {
    let has_docs = dir.join("docs").is_dir();
    let has_src = dir.join("src").is_dir();
    return (has_docs && has_src)
        || (dir.join(".git").is_dir() && has_src)
        || (has_docs && PROJECT_MANIFESTS.iter().any(|m| return dir.join(m).is_file()));
}

/// Collapse `.` and `..` components without touching the filesystem.
/// A `..` only pops a normal component; roots and leading `..` are kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        push_normalized_component(&mut components, component);
    }
    return components.iter().collect();
}

/// Handle a single component during normalization.
fn push_normalized_component<'a>(components: &mut Vec<Component<'a>>, component: Component<'a>) {
    match component {
        Component::CurDir => {},
        Component::ParentDir => {
            if matches!(components.last(), Some(Component::Normal(_))) {
                components.pop();
            } else if !matches!(components.last(), Some(Component::RootDir | Component::Prefix(_))) {
                components.push(component);
            }
        },
        other => components.push(other),
    }
    return;
}

/// Find the documentation directory when none was given: walk up from
/// `start` to the first repository root, then take the first conventional
/// docs directory under it.
///
/// # Errors
///
/// Returns `Error::DocsDirNotFound` when no ancestor holds a docs directory.
pub fn locate_docs_dir(start: &Path) -> Result<PathBuf, Error> {
    let repo_root = start.ancestors().find(|dir| return is_repo_root(dir));
    let search_from = repo_root.unwrap_or(start);
    if repo_root.is_none() {
        log::warn!("could not determine repository root, using {}", start.display());
    }

    for name in DOCS_DIR_NAMES {
        let candidate = search_from.join(name);
        if candidate.is_dir() {
            if name != "docs" {
                log::warn!("using non-standard docs directory {}", candidate.display());
            }
            return Ok(candidate);
        }
    }

    return Err(Error::DocsDirNotFound { path: search_from.join("docs") });
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    fn structure(root: &Path) -> DocStructure {
        return DocStructure::resolve(root, &Config::default()).unwrap();
    }

    #[test]
    fn missing_docs_dir_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = DocStructure::resolve(&tmp.path().join("nope"), &Config::default()).unwrap_err();
        assert!(matches!(err, Error::DocsDirNotFound { .. }));
    }

    #[test]
    fn url_swaps_extension_and_uses_forward_slashes() {
        let tmp = tempfile::tempdir().unwrap();
        let s = structure(tmp.path());
        let path = s.root.join("user_docs").join("guides").join("setup.md");
        assert_eq!(s.url_for(&path, "html"), "user_docs/guides/setup.html");
    }

    #[test]
    fn containment_is_component_wise() {
        let tmp = tempfile::tempdir().unwrap();
        let s = structure(tmp.path());
        assert!(s.contains(&s.root.join("user_docs/guides/a.md")));
        assert!(s.contains(&s.root.join("autoapi/pkg/index.rst")));
        assert!(!s.contains(&s.root.join("user_docs2/a.md")));
        assert!(!s.contains(&s.root.join("notes.md")));
    }

    #[test]
    fn exclusion_only_looks_below_root() {
        let tmp = tempfile::tempdir().unwrap();
        let s = structure(tmp.path());
        let config = Config::default();
        assert!(s.is_excluded(&s.root.join("_build/html/index.md"), &config));
        assert!(s.is_excluded(&s.root.join("user_docs/guides/_drafts/a.md"), &config));
        assert!(!s.is_excluded(&s.root.join("user_docs/guides/a.md"), &config));
    }

    #[test]
    fn normalization_collapses_parent_components() {
        assert_eq!(normalize_path(Path::new("/docs/a/../b/./c.md")), PathBuf::from("/docs/b/c.md"));
        assert_eq!(normalize_path(Path::new("/../x")), PathBuf::from("/x"));
        assert_eq!(normalize_path(Path::new("../../x")), PathBuf::from("../../x"));
    }

    #[test]
    fn locates_docs_from_nested_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = tmp.path();
        std::fs::create_dir_all(repo.join("docs")).unwrap();
        std::fs::create_dir_all(repo.join("src/pkg")).unwrap();

        let found = locate_docs_dir(&repo.join("src/pkg")).unwrap();
        assert_eq!(found, repo.join("docs"));
    }
}
