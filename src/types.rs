/// Core domain types: discovered records, the corpus, and the TOC structure.
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;

use crate::extract::title_from_stem;

/// Provenance of a documentation file. Declaration order is the order
/// categories are discovered and reported in.
#[allow(clippy::arbitrary_source_item_ordering, reason = "variant order is the derived Ord")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Hand-written documentation under the user docs root.
    User,
    /// Generated API documentation.
    Auto,
    /// Machine-written prose under the AI docs root.
    Ai,
    /// Not reachable from any declared structure; placed heuristically.
    Orphan,
}

impl Category {
    /// Lowercase name used in reports and serialized output.
    pub const fn as_str(self) -> &'static str {
        return match self {
            Self::Ai => "ai",
            Self::Auto => "auto",
            Self::Orphan => "orphan",
            Self::User => "user",
        };
    }

    /// Starting priority before section, filename and depth adjustments.
    /// User content sorts ahead of generated content.
    pub const fn base_priority(self) -> u8 {
        return match self {
            Self::Ai => 60,
            Self::Auto => 70,
            Self::Orphan => ORPHAN_PRIORITY,
            Self::User => 50,
        };
    }
}

/// Every orphan sorts after discovered content within its section.
pub const ORPHAN_PRIORITY: u8 = 90;

/// All discovered records of one run, keyed by category.
/// The three discoverable categories are always present, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Corpus {
    /// Records per category in traversal order.
    documents: BTreeMap<Category, Vec<DocumentRecord>>,
}

impl Corpus {
    /// Records of one category; empty for categories with no files.
    pub fn get(&self, category: Category) -> &[DocumentRecord] {
        return self.documents.get(&category).map_or(&[], Vec::as_slice);
    }

    /// Iterate categories in discovery order with their records.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[DocumentRecord])> {
        return self.documents.iter().map(|(c, docs)| return (*c, docs.as_slice()));
    }

    /// Total number of records across all categories.
    pub fn len(&self) -> usize {
        return self.documents.values().map(Vec::len).sum();
    }

    /// Empty corpus with the user, auto and ai buckets in place.
    pub fn new() -> Self {
        let documents = [Category::User, Category::Auto, Category::Ai]
            .into_iter()
            .map(|c| return (c, Vec::new()))
            .collect();
        return Self { documents };
    }

    /// Append a record to its category bucket.
    pub fn push(&mut self, record: DocumentRecord) {
        self.documents.entry(record.category).or_default().push(record);
    }

    /// All records, category by category.
    pub fn records(&self) -> impl Iterator<Item = &DocumentRecord> {
        return self.documents.values().flatten();
    }
}

impl Default for Corpus {
    fn default() -> Self {
        return Self::new();
    }
}

/// One discovered documentation source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRecord {
    /// Which category root the file was found under.
    pub category: Category,
    /// True when the file stem is `index`.
    pub is_index: bool,
    /// Absolute location on disk. Unique within a discovery run.
    pub path: PathBuf,
    /// Sort key within a TOC section, 0..=100, lower sorts first.
    pub priority: u8,
    /// Outgoing link targets with anchors and extensions stripped.
    pub references: BTreeSet<String>,
    /// Name of the section directory the file lives in.
    pub section: String,
    /// First heading, or a title derived from the file name.
    pub title: String,
    /// Output path relative to the docs root with the output suffix.
    pub url: String,
}

/// A broken toctree entry or document link.
/// Recorded for a human or a repair step; never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StructuralIssue {
    /// A toctree entry names a document that does not exist.
    MissingTarget {
        /// File containing the toctree directive.
        source: PathBuf,
        /// The entry as written in the directive.
        target: String,
    },
    /// A document links to something that is no documentation file.
    UnresolvedReference {
        /// Linking document, relative to the docs root.
        source: PathBuf,
        /// The reference with its anchor and extension stripped.
        target: String,
    },
}

/// One entry in a TOC section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocItem {
    /// Provenance of the entry.
    pub category: Category,
    /// Sort key within the section.
    pub priority: u8,
    /// Display title.
    pub title: String,
    /// Output URL of the document.
    pub url: String,
}

/// Final output of TOC reconciliation.
#[derive(Debug, Clone, Serialize)]
pub struct TocReport {
    /// Broken toctree entries, then unresolved document links.
    pub issues: Vec<StructuralIssue>,
    /// Orphan paths in traversal order, before placement.
    pub orphans: Vec<PathBuf>,
    /// Section key to section, base sections first.
    pub sections: TocStructure,
}

/// A named bucket of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocSection {
    /// Entries, sorted by priority once placement is complete.
    pub items: Vec<TocItem>,
    /// Human-readable section heading.
    pub title: String,
}

impl TocSection {
    /// Empty section with the given heading.
    pub fn new(title: &str) -> Self {
        return Self { items: Vec::new(), title: title.to_string() };
    }
}

/// Section keys mapped to sections, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TocStructure {
    /// The sections, base set first, on-demand sections after.
    sections: IndexMap<String, TocSection>,
}

impl TocStructure {
    /// Look up a section by key.
    pub fn get(&self, key: &str) -> Option<&TocSection> {
        return self.sections.get(key);
    }

    /// Iterate sections in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TocSection)> {
        return self.sections.iter().map(|(k, s)| return (k.as_str(), s));
    }

    /// Fetch a section, creating it with a title-cased heading if absent.
    pub fn section_mut(&mut self, key: &str) -> &mut TocSection {
        return self
            .sections
            .entry(key.to_string())
            .or_insert_with(|| return TocSection::new(&title_from_stem(key)));
    }

    /// Stable sort of every section's items by ascending priority.
    pub fn sort_by_priority(&mut self) {
        for section in self.sections.values_mut() {
            section.items.sort_by_key(|item| return item.priority);
        }
    }

    /// Total number of items across all sections.
    pub fn total_items(&self) -> usize {
        return self.sections.values().map(|s| return s.items.len()).sum();
    }

    /// Structure holding the fixed base sections, all empty.
    pub fn with_base_sections() -> Self {
        let sections = BASE_SECTIONS
            .iter()
            .map(|(key, title)| return ((*key).to_string(), TocSection::new(title)))
            .collect();
        return Self { sections };
    }
}

/// Section keys every TOC starts with, and their headings.
pub const BASE_SECTIONS: [(&str, &str); 6] = [
    ("getting_started", "Getting Started"),
    ("user_guide", "User Guide"),
    ("concepts", "Concepts"),
    ("reference", "API Reference"),
    ("examples", "Examples"),
    ("advanced", "Advanced Topics"),
];

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    fn item(title: &str, priority: u8) -> TocItem {
        return TocItem {
            category: Category::User,
            priority,
            title: title.to_string(),
            url: format!("{title}.html"),
        };
    }

    #[test]
    fn base_sections_keep_declared_order() {
        let toc = TocStructure::with_base_sections();
        let keys: Vec<&str> = toc.iter().map(|(k, _)| return k).collect();
        assert_eq!(
            keys,
            ["getting_started", "user_guide", "concepts", "reference", "examples", "advanced"]
        );
        assert_eq!(toc.get("reference").unwrap().title, "API Reference");
    }

    #[test]
    fn unknown_section_is_created_with_title_case_heading() {
        let mut toc = TocStructure::with_base_sections();
        toc.section_mut("release_notes").items.push(item("v1", 50));
        let section = toc.get("release_notes").unwrap();
        assert_eq!(section.title, "Release Notes");
        assert_eq!(toc.iter().last().unwrap().0, "release_notes");
    }

    #[test]
    fn priority_sort_is_stable() {
        let mut toc = TocStructure::with_base_sections();
        let section = toc.section_mut("concepts");
        section.items.push(item("late", 90));
        section.items.push(item("first", 50));
        section.items.push(item("second", 50));
        section.items.push(item("top", 30));
        toc.sort_by_priority();

        let titles: Vec<&str> = toc
            .get("concepts")
            .unwrap()
            .items
            .iter()
            .map(|i| return i.title.as_str())
            .collect();
        assert_eq!(titles, ["top", "first", "second", "late"]);
    }

    #[test]
    fn corpus_always_has_three_categories() {
        let corpus = Corpus::new();
        let categories: Vec<Category> = corpus.iter().map(|(c, _)| return c).collect();
        assert_eq!(categories, [Category::User, Category::Auto, Category::Ai]);
        assert_eq!(corpus.len(), 0);
        let json = serde_json::to_string(&corpus).unwrap();
        assert_eq!(json, r#"{"user":[],"auto":[],"ai":[]}"#);
    }
}
