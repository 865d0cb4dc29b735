//! Report output in JSON, YAML or plain text.
//!
//! JSON goes through `serde_json`, YAML through `serde_yaml`; both
//! serialize the same report types.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::discovery::ReferenceMap;
use crate::error::Error;
use crate::paths::DocStructure;
use crate::types::{Corpus, StructuralIssue, TocReport};

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    Json,
    /// Human-readable listing.
    Text,
    /// Block-style YAML.
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::UnknownFormat { format: s.to_string() }),
        };
    }
}

/// Discovery output: the corpus, its fingerprint, and resolved links.
#[derive(Serialize)]
struct DiscoveryReport<'a> {
    /// Records per category.
    documents: &'a Corpus,
    /// Digest of the corpus.
    fingerprint: &'a str,
    /// Source path to the URLs of the documents it links to.
    links: &'a BTreeMap<PathBuf, BTreeSet<String>>,
}

/// Render a discovered corpus with its resolved references.
///
/// # Errors
///
/// Returns `Error::Json` or `Error::Yaml` if serialization fails.
pub fn render_corpus(
    corpus: &Corpus,
    fingerprint: &str,
    references: &ReferenceMap,
    structure: &DocStructure,
    format: OutputFormat,
) -> Result<String, Error> {
    let report = DiscoveryReport { documents: corpus, fingerprint, links: &references.links };
    return match format {
        OutputFormat::Json => to_json(&report),
        OutputFormat::Text => Ok(corpus_text(corpus, fingerprint, references, structure)),
        OutputFormat::Yaml => to_yaml(&report),
    };
}

/// Render a reconciled TOC.
///
/// # Errors
///
/// Returns `Error::Json` or `Error::Yaml` if serialization fails.
pub fn render_toc(report: &TocReport, structure: &DocStructure, format: OutputFormat) -> Result<String, Error> {
    return match format {
        OutputFormat::Json => to_json(report),
        OutputFormat::Text => Ok(toc_text(report, structure)),
        OutputFormat::Yaml => to_yaml(report),
    };
}

/// One line describing a structural issue.
pub fn describe_issue(issue: &StructuralIssue) -> String {
    return match issue {
        StructuralIssue::MissingTarget { source, target } => {
            format!("{}: toctree entry `{target}` does not exist", source.display())
        },
        StructuralIssue::UnresolvedReference { source, target } => {
            format!("{}: reference `{target}` matches no document", source.display())
        },
    };
}

/// Records grouped under a heading per category, then link counts.
fn corpus_text(corpus: &Corpus, fingerprint: &str, references: &ReferenceMap, structure: &DocStructure) -> String {
    let mut out = String::new();
    for (category, docs) in corpus.iter() {
        let _ = writeln!(out, "=== {} ({}) ===", title_case(category.as_str()), docs.len());
        for doc in docs {
            let _ = writeln!(out, "[{:>3}] {} ({})", doc.priority, doc.title, structure.relative(&doc.path).display());
        }
        out.push('\n');
    }
    let resolved: usize = references.links.values().map(BTreeSet::len).sum();
    let _ = writeln!(out, "references: {resolved} resolved, {} unresolved", references.issues.len());
    let _ = writeln!(out, "fingerprint: {fingerprint}");
    return out;
}

/// Serialize as pretty JSON with a trailing newline.
fn to_json<T: Serialize>(value: &T) -> Result<String, Error> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    return Ok(out);
}

/// Serialize as block-style YAML.
fn to_yaml<T: Serialize>(value: &T) -> Result<String, Error> {
    return Ok(serde_yaml::to_string(value)?);
}

/// Non-empty sections with their items, then structural issues.
fn toc_text(report: &TocReport, structure: &DocStructure) -> String {
    let mut out = String::new();
    for (key, section) in report.sections.iter() {
        if section.items.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{} [{key}]", section.title);
        for item in &section.items {
            let _ = writeln!(out, "  [{:>3}] {} -> {} ({})", item.priority, item.title, item.url, item.category.as_str());
        }
        out.push('\n');
    }

    if !report.orphans.is_empty() {
        let _ = writeln!(out, "Orphans placed: {}", report.orphans.len());
        for path in &report.orphans {
            let _ = writeln!(out, "  {}", structure.relative(path).display());
        }
        out.push('\n');
    }

    if !report.issues.is_empty() {
        let _ = writeln!(out, "Structural issues: {}", report.issues.len());
        for issue in &report.issues {
            let _ = writeln!(out, "  {}", describe_issue(issue));
        }
    }
    return out;
}

/// `user` to `User`.
fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    return match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
}
