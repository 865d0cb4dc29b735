//! Existing toctree directives: which documents they already reference,
//! and which of their entries point at nothing.
//!
//! Both MyST fences (```` ```{toctree} ```` or `:::{toctree}`) and RST
//! `.. toctree::` blocks are read. Entries are resolved relative to the
//! file holding the directive; a leading `/` anchors them at the docs root.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::discovery::{DocumentationDiscovery, walk_sources};
use crate::extract::SourceFormat;
use crate::paths::normalize_path;
use crate::types::StructuralIssue;

/// Document URLs already placed by hand-written toctrees, plus the
/// problems found while reading them.
#[derive(Debug, Clone, Default)]
pub struct TocReferences {
    /// Entries pointing at documents that do not exist.
    pub issues: Vec<StructuralIssue>,
    /// Output URLs of every document some toctree reaches, including the
    /// master document.
    pub tracked_urls: BTreeSet<String>,
}

impl TocReferences {
    /// Keep the issues but forget the tracked URLs.
    pub fn issues_only(self) -> Self {
        return Self { issues: self.issues, tracked_urls: BTreeSet::new() };
    }
}

/// Find the file an entry refers to: the path itself when it already
/// carries a supported extension, else the path with each configured
/// extension appended in turn.
fn existing_source(candidate: &Path, config: &Config) -> Option<PathBuf> {
    if config.is_supported(candidate) && candidate.is_file() {
        return Some(candidate.to_path_buf());
    }
    return config.extensions.iter().find_map(|ext| {
        let mut name = OsString::from(candidate.as_os_str());
        name.push(".");
        name.push(ext);
        let path = PathBuf::from(name);
        return path.is_file().then_some(path);
    });
}

/// Reduce one raw directive line to a document target, or `None` for
/// options, `self`, globs and external links.
fn entry_target(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    // `Title <target>` form.
    let target = match (line.rfind('<'), line.strip_suffix('>')) {
        (Some(open), Some(body)) => body.get(open.saturating_add(1)..).unwrap_or("").trim(),
        _ => line,
    };
    if target.is_empty() || target == "self" || target.contains("://") || target.contains(['*', '?']) {
        return None;
    }
    return Some(target);
}

/// Read every toctree in the documentation root. File content comes
/// through the discovery cache.
pub fn load(discovery: &mut DocumentationDiscovery<'_>) -> TocReferences {
    let structure = discovery.structure();
    let config = discovery.config();
    let suffix = &config.output_suffix;

    let mut references = TocReferences::default();
    let master = structure.root.join(&config.master_doc);
    if let Some(path) = existing_source(&master, config) {
        references.tracked_urls.insert(structure.url_for(&path, suffix));
    }

    let mut entry_count = 0_usize;
    for path in walk_sources(&structure.root, config) {
        let entries = match discovery.content(&path) {
            Some(content) => toctree_entries(content, SourceFormat::for_path(&path)),
            None => continue,
        };
        let base = path.parent().unwrap_or(&structure.root);
        for entry in entries {
            entry_count = entry_count.saturating_add(1);
            let candidate = match entry.strip_prefix('/') {
                Some(rooted) => normalize_path(&structure.root.join(rooted)),
                None => normalize_path(&base.join(&entry)),
            };
            match existing_source(&candidate, config) {
                Some(target) => {
                    references.tracked_urls.insert(structure.url_for(&target, suffix));
                },
                None => {
                    log::warn!("{}: toctree entry `{entry}` has no matching document", structure.relative(&path).display());
                    references.issues.push(StructuralIssue::MissingTarget {
                        source: structure.relative(&path).to_path_buf(),
                        target: entry,
                    });
                },
            }
        }
    }

    log::info!(
        "read {entry_count} toctree entries, {} tracked documents, {} missing targets",
        references.tracked_urls.len(),
        references.issues.len()
    );
    return references;
}

/// Document targets of every toctree directive in the content, in order.
pub fn toctree_entries(content: &str, format: SourceFormat) -> Vec<String> {
    return match format {
        SourceFormat::Markdown => myst_entries(content),
        SourceFormat::Rst => rst_entries(content),
    };
}

/// Entries inside ```` ```{toctree} ```` and `:::{toctree}` fences.
/// A `---` delimited option block at the top of the fence is skipped.
fn myst_entries(content: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut fence: Option<String> = None;
    let mut in_options = false;

    for line in content.lines() {
        let trimmed = line.trim();
        match &fence {
            None => {
                let marker_len = trimmed.find("{toctree}").unwrap_or(0);
                let marker = trimmed.get(..marker_len).unwrap_or("");
                let is_fence = marker.len() >= 3 && (marker.chars().all(|c| return c == '`') || marker.chars().all(|c| return c == ':'));
                if is_fence {
                    fence = Some(marker.to_string());
                }
            },
            Some(marker) => {
                if trimmed == marker.as_str() {
                    fence = None;
                    in_options = false;
                } else if trimmed == "---" {
                    in_options = !in_options;
                } else if in_options {
                    continue;
                } else if let Some(target) = entry_target(trimmed) {
                    entries.push(target.to_string());
                }
            },
        }
    }
    return entries;
}

/// Entries in the indented body of `.. toctree::` blocks.
fn rst_entries(content: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut in_block = false;

    for line in content.lines() {
        if line.trim_start().starts_with(".. toctree::") {
            in_block = true;
            continue;
        }
        if !in_block {
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        if !line.starts_with([' ', '\t']) {
            in_block = false;
            continue;
        }
        if let Some(target) = entry_target(line) {
            entries.push(target.to_string());
        }
    }
    return entries;
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;
    use crate::paths::DocStructure;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn myst_fence_skips_options_and_self() {
        let content = "# Home\n\n```{toctree}\n:maxdepth: 2\n:caption: Guides\n\nself\ninstall\nGuide <guides/setup>\n```\n\nafter\n";
        assert_eq!(toctree_entries(content, SourceFormat::Markdown), ["install", "guides/setup"]);
    }

    #[test]
    fn myst_yaml_options_are_skipped() {
        let content = "```{toctree}\n---\nmaxdepth: 2\n---\ninstall\n```\n";
        assert_eq!(toctree_entries(content, SourceFormat::Markdown), ["install"]);
    }

    #[test]
    fn myst_colon_fence_is_read() {
        let content = ":::{toctree}\nnotes\n:::\n";
        assert_eq!(toctree_entries(content, SourceFormat::Markdown), ["notes"]);
    }

    #[test]
    fn rst_block_ends_at_dedent() {
        let content = "Home\n====\n\n.. toctree::\n   :maxdepth: 1\n\n   install\n   api/*\n   https://example.org\n\nParagraph\n   indented but after the block\n";
        assert_eq!(toctree_entries(content, SourceFormat::Rst), ["install"]);
    }

    #[test]
    fn load_tracks_targets_and_reports_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(root, "index.md", "# Home\n\n```{toctree}\nnotes\nguides/gone\n```\n");
        write(root, "notes.md", "# Notes\n");
        write(root, "guides/intro.rst", "Intro\n=====\n\n.. toctree::\n\n   ../notes\n   /index\n");

        let config = Config::default();
        let structure = DocStructure::resolve(root, &config).unwrap();
        let mut discovery = DocumentationDiscovery::new(&structure, &config);
        let references = load(&mut discovery);

        assert!(references.tracked_urls.contains("index.html"));
        assert!(references.tracked_urls.contains("notes.html"));
        assert_eq!(
            references.issues,
            [StructuralIssue::MissingTarget { source: PathBuf::from("index.md"), target: "guides/gone".to_string() }]
        );
    }

    #[test]
    fn issues_only_drops_tracking() {
        let references = TocReferences {
            issues: Vec::new(),
            tracked_urls: BTreeSet::from(["a.html".to_string()]),
        };
        assert!(references.issues_only().tracked_urls.is_empty());
    }
}
