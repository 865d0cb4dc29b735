//! Discovery engine: walks the category roots, builds the corpus, and finds
//! documentation files that no declared structure or tracked URL covers.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::config::Config;
use crate::error::Error;
use crate::extract::{RecordSeed, build_record, read_source};
use crate::paths::{DocStructure, normalize_path};
use crate::types::{Category, Corpus, DocumentRecord, StructuralIssue};

/// Section names whose documents sort ahead of their category peers.
const IMPORTANT_SECTIONS: [&str; 5] = ["getting_started", "installation", "introduction", "overview", "quickstart"];

/// Priority bonus for an important section.
const IMPORTANT_SECTION_BONUS: i32 = 10;

/// Priority bonus for `index` and `README` files.
const INDEX_BONUS: i32 = 20;

/// Priority penalty per directory level below the section directory.
const DEPTH_PENALTY: i32 = 2;

/// One discovery run over a documentation root. Holds the per-run file
/// content cache; the structure and config are borrowed from the caller.
pub struct DocumentationDiscovery<'a> {
    /// Project configuration.
    config: &'a Config,
    /// File contents keyed by path; `None` records a failed read.
    contents: HashMap<PathBuf, Option<String>>,
    /// Declared layout of the documentation root.
    structure: &'a DocStructure,
}

impl<'a> DocumentationDiscovery<'a> {
    /// The configuration this run was created with.
    pub const fn config(&self) -> &'a Config {
        return self.config;
    }

    /// Content of a source file, read at most once per run.
    pub fn content(&mut self, path: &Path) -> Option<&str> {
        return self
            .contents
            .entry(path.to_path_buf())
            .or_insert_with(|| return read_source(path))
            .as_deref();
    }

    /// Walk every category root and return a fresh corpus. The content
    /// cache is cleared first; nothing carries over from earlier runs.
    ///
    /// # Errors
    ///
    /// Returns `Error::DocsDirNotFound` if the documentation root has gone
    /// missing. Missing category roots only log a warning.
    pub fn discover_all(&mut self) -> Result<Corpus, Error> {
        if !self.structure.root.is_dir() {
            return Err(Error::DocsDirNotFound { path: self.structure.root.clone() });
        }
        self.contents.clear();

        let mut corpus = Corpus::new();
        let mut seen = HashSet::new();
        let structure = self.structure;

        for (category, root) in structure.category_roots() {
            if !root.is_dir() {
                if category == Category::Ai {
                    log::debug!("AI documentation directory not found at {}", root.display());
                } else {
                    log::warn!("{} documentation directory not found at {}", category.as_str(), root.display());
                }
                continue;
            }
            self.discover_category_root(category, root, &mut corpus, &mut seen);
        }

        for root in &structure.auto_roots {
            if root.is_dir() {
                self.discover_auto_root(root, &mut corpus, &mut seen);
            }
        }

        for (category, docs) in corpus.iter() {
            log::info!("discovered {} {} documentation files", docs.len(), category.as_str());
        }
        return Ok(corpus);
    }

    /// Files under an extra auto root all belong to one section named
    /// after the directory.
    fn discover_auto_root(&mut self, root: &Path, corpus: &mut Corpus, seen: &mut HashSet<PathBuf>) {
        let section = root.file_name().map(|n| return n.to_string_lossy().into_owned()).unwrap_or_default();
        for path in walk_sources(root, self.config) {
            if !seen.insert(path.clone()) {
                continue;
            }
            let depth = dir_depth(root, &path);
            let record = self.record(Category::Auto, &section, &path, depth);
            corpus.push(record);
        }
    }

    /// Files under a category root. The first directory below the root
    /// names the section; files directly in the root get an empty section.
    fn discover_category_root(
        &mut self,
        category: Category,
        root: &Path,
        corpus: &mut Corpus,
        seen: &mut HashSet<PathBuf>,
    ) {
        for path in walk_sources(root, self.config) {
            if !seen.insert(path.clone()) {
                continue;
            }
            let relative = path.strip_prefix(root).unwrap_or(&path);
            let mut components = relative.components();
            let section = match (components.next(), components.next()) {
                (Some(first), Some(_)) => first.as_os_str().to_string_lossy().into_owned(),
                _ => String::new(),
            };
            let depth = dir_depth(root, &path).saturating_sub(1);
            let record = self.record(category, &section, &path, depth);
            corpus.push(record);
        }
    }

    /// Every documentation file under the root that lies outside all
    /// declared structural directories and whose URL is not tracked.
    /// Re-scans the whole root, not just the category roots.
    pub fn find_orphans(&self, tracked: &BTreeSet<String>) -> Vec<PathBuf> {
        let structure = self.structure;
        let suffix = &self.config.output_suffix;
        let orphans: Vec<PathBuf> = walk_sources(&structure.root, self.config)
            .filter(|path| {
                return !structure.contains(path) && !tracked.contains(&structure.url_for(path, suffix));
            })
            .collect();
        log::info!("found {} orphaned documentation files", orphans.len());
        return orphans;
    }

    /// Start a discovery run.
    pub fn new(structure: &'a DocStructure, config: &'a Config) -> Self {
        return Self { config, contents: HashMap::new(), structure };
    }

    /// Build one record, reading its content through the cache.
    fn record(&mut self, category: Category, section: &str, path: &Path, depth: usize) -> DocumentRecord {
        let url = self.structure.url_for(path, &self.config.output_suffix);
        let priority = compute_priority(category, section, path, depth);
        let content = self.content(path);
        return build_record(RecordSeed { category, path, priority, section, url }, content);
    }

    /// Resolve every record's references to documentation files under the
    /// root. A reference is relative to its record's directory, or to the
    /// docs root when it starts with `/`.
    ///
    /// A reference that names an existing non-source file (an included
    /// script, an image) is neither a link nor an issue.
    pub fn resolve_references(&self, corpus: &Corpus) -> ReferenceMap {
        let structure = self.structure;
        let suffix = &self.config.output_suffix;
        let documents: BTreeSet<String> = walk_sources(&structure.root, self.config)
            .map(|path| return structure.url_for(&path, suffix))
            .collect();

        let mut map = ReferenceMap::default();
        for record in corpus.records() {
            let base = record.path.parent().unwrap_or(&structure.root);
            let source = structure.relative(&record.path);
            for reference in &record.references {
                let candidate = match reference.strip_prefix('/') {
                    Some(rooted) => normalize_path(&structure.root.join(rooted)),
                    None => normalize_path(&base.join(reference)),
                };
                let url = reference_url(structure, &candidate, suffix);
                if documents.contains(&url) {
                    map.links.entry(source.to_path_buf()).or_default().insert(url);
                } else if exists_with_any_extension(&candidate) {
                    log::debug!("{}: `{reference}` is not a documentation source", source.display());
                } else {
                    log::warn!("{}: reference `{reference}` matches no document", source.display());
                    map.issues.push(StructuralIssue::UnresolvedReference {
                        source: source.to_path_buf(),
                        target: reference.clone(),
                    });
                }
            }
        }

        log::info!(
            "resolved links from {} documents, {} unresolved references",
            map.links.len(),
            map.issues.len()
        );
        return map;
    }

    /// The layout this run was created with.
    pub const fn structure(&self) -> &'a DocStructure {
        return self.structure;
    }
}

/// Outgoing links of a corpus, resolved to document URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceMap {
    /// References that match no file at all.
    pub issues: Vec<StructuralIssue>,
    /// Linking document, relative to the docs root, to the URLs of the
    /// documents it reaches. Documents without resolved links are absent.
    pub links: BTreeMap<PathBuf, BTreeSet<String>>,
}

/// Priority from category, section, file name and nesting depth below the
/// section directory, clamped to 0..=100.
pub fn compute_priority(category: Category, section: &str, path: &Path, depth: usize) -> u8 {
    let mut priority = i32::from(category.base_priority());

    if IMPORTANT_SECTIONS.contains(&section) {
        priority = priority.saturating_sub(IMPORTANT_SECTION_BONUS);
    }

    let stem = path.file_stem().map(|s| return s.to_string_lossy().to_lowercase()).unwrap_or_default();
    if stem == "index" || stem == "readme" {
        priority = priority.saturating_sub(INDEX_BONUS);
    }

    let depth = i32::try_from(depth).unwrap_or(i32::MAX);
    priority = priority.saturating_add(depth.saturating_mul(DEPTH_PENALTY));

    return u8::try_from(priority.clamp(0, 100)).unwrap_or(100);
}

/// Number of directories between `root` and the file.
fn dir_depth(root: &Path, path: &Path) -> usize {
    let relative = path.strip_prefix(root).unwrap_or(path);
    return relative.components().count().saturating_sub(1);
}

/// Whether a file exists at `candidate` as given or with any extension.
fn exists_with_any_extension(candidate: &Path) -> bool {
    if candidate.is_file() {
        return true;
    }
    let (Some(dir), Some(name)) = (candidate.parent(), candidate.file_name()) else {
        return false;
    };
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    return entries.filter_map(Result::ok).any(|entry| {
        let path = entry.path();
        return path.is_file() && path.file_stem() == Some(name);
    });
}

/// URL of the document a reference names. References have their extension
/// stripped already, so the suffix is appended rather than swapped in.
fn reference_url(structure: &DocStructure, candidate: &Path, suffix: &str) -> String {
    let mut name = OsString::from(candidate.as_os_str());
    name.push(".");
    name.push(suffix);
    return structure.url_for(Path::new(&name), suffix);
}

/// Supported source files below `dir` in file-name order. Excluded
/// directories are pruned, not just filtered.
pub fn walk_sources<'c>(dir: &Path, config: &'c Config) -> impl Iterator<Item = PathBuf> + 'c {
    return WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| {
            return e.depth() == 0 || !config.is_excluded_component(&e.file_name().to_string_lossy());
        })
        .filter_map(|entry| {
            return match entry {
                Err(e) => {
                    log::warn!("skipping unreadable entry: {e}");
                    None
                },
                Ok(e) => Some(e),
            };
        })
        .filter(move |e| return e.file_type().is_file() && config.is_supported(e.path()))
        .map(DirEntry::into_path);
}
