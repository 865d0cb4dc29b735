//! TOC reconciliation: every discovered record goes into the section its
//! directory maps to, then every orphan is classified and placed.

use std::collections::BTreeSet;

use crate::classify::place_orphan;
use crate::discovery::DocumentationDiscovery;
use crate::error::Error;
use crate::toctree::{self, TocReferences};
use crate::types::{Corpus, TocItem, TocReport, TocStructure};

/// Place the corpus and all orphans into a fresh TOC structure.
///
/// URLs in `references` count as already tracked, so documents reached by
/// an existing toctree are not treated as orphans. Sections are sorted by
/// priority once everything is placed.
pub fn build_toc(discovery: &mut DocumentationDiscovery<'_>, corpus: &Corpus, references: &TocReferences) -> TocReport {
    let config = discovery.config();
    let mut sections = TocStructure::with_base_sections();
    let mut tracked: BTreeSet<String> = references.tracked_urls.clone();

    for record in corpus.records() {
        let key = config.toc_section_for(&record.section);
        sections.section_mut(&key).items.push(TocItem {
            category: record.category,
            priority: record.priority,
            title: record.title.clone(),
            url: record.url.clone(),
        });
        tracked.insert(record.url.clone());
    }

    let orphans = discovery.find_orphans(&tracked);
    for path in &orphans {
        let placement = place_orphan(discovery, path);
        sections.section_mut(placement.section).items.push(placement.item);
    }

    sections.sort_by_priority();
    log::info!("placed {} items, {} of them orphans", sections.total_items(), orphans.len());

    return TocReport { issues: references.issues.clone(), orphans, sections };
}

/// Run a full discovery and reconcile it into a TOC.
///
/// Broken toctree entries and unresolved document links are always
/// reported. Documents reached by existing toctrees are only left out of
/// orphan placement when `respect_toctrees` is set; otherwise every file
/// lands in exactly one section.
///
/// # Errors
///
/// Returns `Error::DocsDirNotFound` if the documentation root vanished.
pub fn generate_toc_structure(discovery: &mut DocumentationDiscovery<'_>, respect_toctrees: bool) -> Result<TocReport, Error> {
    let corpus = discovery.discover_all()?;
    let links = discovery.resolve_references(&corpus);
    let mut references = toctree::load(discovery);
    if !respect_toctrees {
        references = references.issues_only();
    }
    let mut report = build_toc(discovery, &corpus, &references);
    report.issues.extend(links.issues);
    return Ok(report);
}
