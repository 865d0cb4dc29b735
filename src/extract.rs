//! Best-effort metadata extraction from Markdown and reStructuredText sources.
//!
//! Nothing in here fails: unreadable files and unrecognised syntax degrade to
//! a filename-derived title and an empty reference set.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Category, DocumentRecord};

/// `[text](target)` and `[text](<target> "title")`.
#[allow(clippy::expect_used, reason = "hardcoded pattern is a compile-time invariant")]
static MD_LINK: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r#"\[[^\]]*\]\(\s*<?([^)\s>]+)>?(?:\s+"[^"]*")?\s*\)"#).expect("valid regex");
});

/// MyST ```` ```{include} target ```` fence.
#[allow(clippy::expect_used, reason = "hardcoded pattern is a compile-time invariant")]
static MYST_INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"(?m)^\s*(?:```|:::)\{include\}\s+(\S+)").expect("valid regex"));

/// `:doc:` role in RST and `{doc}` role in MyST.
#[allow(clippy::expect_used, reason = "hardcoded pattern is a compile-time invariant")]
static DOC_ROLE: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"(?::doc:|\{doc\})`([^`]+)`").expect("valid regex"));

/// `` `text <target>`_ `` and anonymous `` `text <target>`__ ``.
#[allow(clippy::expect_used, reason = "hardcoded pattern is a compile-time invariant")]
static RST_HYPERLINK: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"`[^`<]*<([^>`]+)>`__?").expect("valid regex"));

/// `.. include:: target` and `.. literalinclude:: target`.
#[allow(clippy::expect_used, reason = "hardcoded pattern is a compile-time invariant")]
static RST_INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"(?m)^\s*\.\.\s+(?:literal)?include::\s*(\S+)").expect("valid regex");
});

/// Jinja-style `{% include "target" %}` used in Sphinx templates.
#[allow(clippy::expect_used, reason = "hardcoded pattern is a compile-time invariant")]
static TEMPLATE_INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r#"\{%-?\s*include\s+["']([^"']+)["']"#).expect("valid regex");
});

/// Markup family, which decides the title and link syntax to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// `.md` / `.markdown`, including MyST.
    Markdown,
    /// `.rst`, and `.txt` which Sphinx projects use for RST sources.
    Rst,
}

impl SourceFormat {
    /// Format implied by the file extension.
    pub fn for_path(path: &Path) -> Self {
        let ext = path.extension().and_then(|e| return e.to_str()).unwrap_or("");
        if ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown") {
            return Self::Markdown;
        }
        return Self::Rst;
    }
}

/// Inputs for a record that come from discovery rather than content.
pub struct RecordSeed<'a> {
    /// Category root the file was found under.
    pub category: Category,
    /// Absolute path of the file.
    pub path: &'a Path,
    /// Priority computed at discovery time.
    pub priority: u8,
    /// Section directory name.
    pub section: &'a str,
    /// Derived output URL.
    pub url: String,
}

/// Build a record from discovery inputs and the file's content.
/// `None` content (unreadable file) yields the filename title and no references.
pub fn build_record(seed: RecordSeed<'_>, content: Option<&str>) -> DocumentRecord {
    let path = seed.path;
    let title = content
        .and_then(|c| return extract_title(c, SourceFormat::for_path(path)))
        .unwrap_or_else(|| return fallback_title(path));
    let references = content
        .map(|c| return extract_references(c, SourceFormat::for_path(path)))
        .unwrap_or_default();

    return DocumentRecord {
        category: seed.category,
        is_index: path.file_stem().is_some_and(|s| return s.eq_ignore_ascii_case("index")),
        path: path.to_path_buf(),
        priority: seed.priority,
        references,
        section: seed.section.to_string(),
        title,
        url: seed.url,
    };
}

/// Collect every capture-group-1 match of `pattern` into `refs`.
fn collect_targets(pattern: &Regex, content: &str, refs: &mut BTreeSet<String>) {
    for cap in pattern.captures_iter(content) {
        let Some(raw) = cap.get(1) else { continue };
        let raw = raw.as_str();
        // `Title <target>` form inside a role.
        let target = match (raw.rfind('<'), raw.strip_suffix('>')) {
            (Some(open), Some(inner)) => inner.get(open.saturating_add(1)..).unwrap_or(inner),
            _ => raw,
        };
        if is_external(target) {
            continue;
        }
        if let Some(normalized) = normalize_reference(target) {
            refs.insert(normalized);
        }
    }
}

/// Outgoing references of a document, normalized.
pub fn extract_references(content: &str, format: SourceFormat) -> BTreeSet<String> {
    let mut refs = BTreeSet::new();
    match format {
        SourceFormat::Markdown => {
            collect_targets(&MD_LINK, content, &mut refs);
            collect_targets(&MYST_INCLUDE, content, &mut refs);
        },
        SourceFormat::Rst => {
            collect_targets(&RST_HYPERLINK, content, &mut refs);
            collect_targets(&RST_INCLUDE, content, &mut refs);
        },
    }
    collect_targets(&DOC_ROLE, content, &mut refs);
    collect_targets(&TEMPLATE_INCLUDE, content, &mut refs);
    return refs;
}

/// Title from the first heading in the content, if one is recognised.
pub fn extract_title(content: &str, format: SourceFormat) -> Option<String> {
    return match format {
        SourceFormat::Markdown => markdown_title(content),
        SourceFormat::Rst => rst_title(content),
    };
}

/// Filename stem with underscores as spaces, each word capitalized.
pub fn fallback_title(path: &Path) -> String {
    let stem = path.file_stem().map(|s| return s.to_string_lossy()).unwrap_or_default();
    return title_from_stem(&stem);
}

/// URLs with a scheme, `mailto:` links and same-page anchors.
fn is_external(target: &str) -> bool {
    return target.starts_with('#') || target.starts_with("mailto:") || target.contains("://");
}

/// A line consisting only of `=` or only of `-`.
fn is_underline(line: &str) -> bool {
    let mut chars = line.chars();
    let Some(first) = chars.next() else { return false };
    return (first == '=' || first == '-') && chars.all(|c| return c == first);
}

/// First `# ` heading outside fenced code blocks and front matter.
fn markdown_title(content: &str) -> Option<String> {
    let mut in_fence = false;
    let mut in_front_matter = false;

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();
        if idx == 0 && line.trim_end() == "---" {
            in_front_matter = true;
            continue;
        }
        if in_front_matter {
            in_front_matter = line.trim_end() != "---";
            continue;
        }
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        let Some(rest) = line.strip_prefix('#') else { continue };
        if !rest.starts_with(char::is_whitespace) {
            continue;
        }
        let title = rest.trim();
        if !title.is_empty() {
            return Some(title.to_string());
        }
    }
    return None;
}

/// Strip the anchor and the file extension from a link target.
fn normalize_reference(target: &str) -> Option<String> {
    let without_anchor = target.split('#').next().unwrap_or("").trim();
    let (dir, file) = match without_anchor.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, without_anchor),
    };
    let stem = match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && stem != "." && !ext.is_empty() => stem,
        _ => file,
    };

    let normalized = match dir {
        Some(dir) => format!("{dir}/{stem}"),
        None => stem.to_string(),
    };
    if normalized.is_empty() {
        return None;
    }
    return Some(normalized);
}

/// Read a source file as UTF-8. Failures are logged, never raised.
pub fn read_source(path: &Path) -> Option<String> {
    let bytes = match std::fs::read(path) {
        Err(e) => {
            log::warn!("cannot read {}: {e}", path.display());
            return None;
        },
        Ok(b) => b,
    };
    return match String::from_utf8(bytes) {
        Err(e) => {
            log::warn!("{} is not valid UTF-8: {e}", path.display());
            None
        },
        Ok(s) => Some(s),
    };
}

/// First line followed by an `=` or `-` underline at least 80% as long.
fn rst_title(content: &str) -> Option<String> {
    let mut lines = content.lines().map(str::trim_end).peekable();
    while let Some(line) = lines.next() {
        let Some(next) = lines.peek() else { break };
        let title = line.trim();
        if title.is_empty() || is_underline(title) || !is_underline(next) {
            continue;
        }
        let title_len = title.chars().count();
        let underline_len = next.chars().count();
        if underline_len.saturating_mul(5) >= title_len.saturating_mul(4) {
            return Some(title.to_string());
        }
    }
    return None;
}

/// `getting_started` -> `Getting Started`. A letter is uppercased when it
/// does not follow another letter, lowercased otherwise.
pub fn title_from_stem(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    let mut after_letter = false;
    for ch in stem.chars() {
        if ch.is_alphabetic() {
            if after_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            after_letter = true;
        } else {
            out.push(if ch == '_' { ' ' } else { ch });
            after_letter = false;
        }
    }
    return out;
}
