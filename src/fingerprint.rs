/// Content fingerprint of a discovered corpus.
use sha2::{Digest as _, Sha256};

use crate::paths::DocStructure;
use crate::types::{Corpus, DocumentRecord};

/// Separates fields within one record.
const FIELD_SEP: u8 = 0x1f;

/// Separates records.
const RECORD_SEP: u8 = 0x1e;

/// SHA-256 over every record in canonical order: categories in declaration
/// order, records by URL, then by path. Paths are hashed relative to the
/// docs root, so two corpora share a fingerprint exactly when they hold
/// the same records, wherever the docs root lives on disk.
pub fn corpus_fingerprint(corpus: &Corpus, structure: &DocStructure) -> String {
    let mut hasher = Sha256::new();
    for (category, docs) in corpus.iter() {
        hasher.update(category.as_str().as_bytes());
        hasher.update([RECORD_SEP]);

        let mut sorted: Vec<&DocumentRecord> = docs.iter().collect();
        sorted.sort_by(|a, b| return a.url.cmp(&b.url).then_with(|| return a.path.cmp(&b.path)));
        for record in sorted {
            hash_record(&mut hasher, record, structure);
        }
    }
    let hash = hasher.finalize();
    return format!("{hash:x}");
}

/// Feed one record's content-derived fields to the hasher.
fn hash_record(hasher: &mut Sha256, record: &DocumentRecord, structure: &DocStructure) {
    let priority = record.priority.to_string();
    let relative = structure.relative(&record.path).to_string_lossy();
    let fields = [
        &*relative,
        record.url.as_str(),
        record.title.as_str(),
        record.section.as_str(),
        priority.as_str(),
        if record.is_index { "index" } else { "" },
    ];
    for field in fields {
        hasher.update(field.as_bytes());
        hasher.update([FIELD_SEP]);
    }
    for reference in &record.references {
        hasher.update(reference.as_bytes());
        hasher.update([FIELD_SEP]);
    }
    hasher.update([RECORD_SEP]);
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use std::collections::BTreeSet;
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::types::Category;

    fn record(root: &Path, file: &str, title: &str) -> DocumentRecord {
        let path = root.join(file);
        let url = Path::new(file).with_extension("html").to_string_lossy().into_owned();
        return DocumentRecord {
            category: Category::User,
            is_index: false,
            path,
            priority: 50,
            references: BTreeSet::new(),
            section: "guides".to_string(),
            title: title.to_string(),
            url,
        };
    }

    /// Layout rooted at `root` without touching the filesystem.
    fn structure(root: &str) -> DocStructure {
        let root = PathBuf::from(root);
        return DocStructure {
            ai_docs: root.join("ai_docs"),
            auto_docs: root.join("auto_docs"),
            auto_roots: Vec::new(),
            user_docs: root.join("user_docs"),
            root,
        };
    }

    fn fingerprint(root: &str, files: &[(&str, &str)]) -> String {
        let structure = structure(root);
        let mut corpus = Corpus::new();
        for (file, title) in files {
            corpus.push(record(&structure.root, file, title));
        }
        return corpus_fingerprint(&corpus, &structure);
    }

    #[test]
    fn order_of_discovery_does_not_matter() {
        assert_eq!(
            fingerprint("/docs", &[("a.md", "A"), ("b.md", "B")]),
            fingerprint("/docs", &[("b.md", "B"), ("a.md", "A")])
        );
    }

    #[test]
    fn title_change_changes_fingerprint() {
        assert_ne!(fingerprint("/docs", &[("a.md", "A")]), fingerprint("/docs", &[("a.md", "Renamed")]));
    }

    #[test]
    fn sources_sharing_a_url_are_told_apart() {
        // `foo.md` and `foo.rst` both derive `foo.html`.
        assert_ne!(fingerprint("/docs", &[("foo.md", "Foo")]), fingerprint("/docs", &[("foo.rst", "Foo")]));
        assert_eq!(
            fingerprint("/docs", &[("foo.md", "Foo"), ("foo.rst", "Foo")]),
            fingerprint("/docs", &[("foo.rst", "Foo"), ("foo.md", "Foo")])
        );
    }

    #[test]
    fn location_of_the_root_does_not_matter() {
        assert_eq!(
            fingerprint("/docs", &[("a.md", "A")]),
            fingerprint("/srv/checkout/docs", &[("a.md", "A")])
        );
    }

    #[test]
    fn fingerprint_is_hex_sha256() {
        let digest = corpus_fingerprint(&Corpus::new(), &structure("/docs"));
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| return c.is_ascii_hexdigit()));
    }
}
