//! Orphan placement: pick the TOC section an orphaned document most
//! plausibly belongs to, and give it a title.
//!
//! Scoring runs in two stages. A keyword in the file name settles the
//! section outright. Otherwise keyword occurrences in the content are
//! summed per section, with occurrences near the top of the document
//! weighted higher. The weights are heuristic tuning values.

use std::path::Path;

use crate::config::FALLBACK_SECTION;
use crate::discovery::DocumentationDiscovery;
use crate::extract::{SourceFormat, extract_title, fallback_title};
use crate::types::{Category, ORPHAN_PRIORITY, TocItem};

/// Score of a file-name keyword match. Content scoring is skipped at or
/// above this value.
const FILENAME_SCORE: usize = 2;

/// Occurrences starting within this many leading characters get the lead weight.
const LEAD_WINDOW_CHARS: usize = 500;

/// Weight of a keyword occurrence inside the lead window.
const LEAD_WEIGHT: usize = 3;

/// Keywords per TOC section. Iteration order breaks ties: the section
/// listed first wins.
const SECTION_KEYWORDS: [(&str, &[&str]); 6] = [
    ("getting_started", &["installation", "quickstart", "setup", "introduction", "overview", "begin"]),
    ("user_guide", &["guide", "how to", "usage", "tutorial"]),
    ("concepts", &["concept", "architecture", "design", "principles"]),
    ("reference", &["api", "reference", "class", "function"]),
    ("examples", &["example", "sample", "demo"]),
    ("advanced", &["advanced", "expert", "internals", "deep dive"]),
];

/// Where an orphan goes and the item that represents it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// The TOC entry for the orphan.
    pub item: TocItem,
    /// TOC section key the orphan is placed in.
    pub section: &'static str,
}

/// Section for a document given its file stem and (optional) content.
pub fn classify(stem: &str, content: Option<&str>) -> &'static str {
    let (mut best_section, mut best_score) = score_filename(stem).map_or((None, 0), |(s, n)| return (Some(s), n));

    if best_score < FILENAME_SCORE
        && let Some(content) = content
    {
        for (section, score) in score_content(content) {
            if score > best_score {
                best_section = Some(section);
                best_score = score;
            }
        }
    }

    return best_section.unwrap_or(FALLBACK_SECTION);
}

/// Classify an orphan and build its TOC item. Content is read through the
/// discovery cache, so title extraction and scoring share one read.
pub fn place_orphan(discovery: &mut DocumentationDiscovery<'_>, path: &Path) -> Placement {
    let structure = discovery.structure();
    let url = structure.url_for(path, &discovery.config().output_suffix);
    let stem = path.file_stem().map(|s| return s.to_string_lossy().to_lowercase()).unwrap_or_default();

    let content = discovery.content(path);
    let section = classify(&stem, content);
    let title = content
        .and_then(|c| return extract_title(c, SourceFormat::for_path(path)))
        .unwrap_or_else(|| return fallback_title(path));

    log::debug!("placing orphan {} in {section}", structure.relative(path).display());
    return Placement {
        item: TocItem { category: Category::Orphan, priority: ORPHAN_PRIORITY, title, url },
        section,
    };
}

/// Weighted keyword score per section, in table order.
pub fn score_content(content: &str) -> Vec<(&'static str, usize)> {
    let lowered = content.to_lowercase();
    let lead_end = lowered.char_indices().nth(LEAD_WINDOW_CHARS).map_or(lowered.len(), |(i, _)| return i);

    return SECTION_KEYWORDS
        .iter()
        .map(|(section, keywords)| {
            let score = keywords.iter().map(|k| return weighted_count(&lowered, k, lead_end)).sum();
            return (*section, score);
        })
        .collect();
}

/// First section with a keyword in the (lowercased) file stem.
pub fn score_filename(stem: &str) -> Option<(&'static str, usize)> {
    let mut best: Option<(&'static str, usize)> = None;
    for (section, keywords) in SECTION_KEYWORDS {
        if !keywords.iter().any(|k| return stem.contains(k)) {
            continue;
        }
        if best.is_none_or(|(_, score)| return FILENAME_SCORE > score) {
            best = Some((section, FILENAME_SCORE));
        }
    }
    return best;
}

/// Non-overlapping occurrences of `keyword`, weighted by position.
fn weighted_count(haystack: &str, keyword: &str, lead_end: usize) -> usize {
    return haystack
        .match_indices(keyword)
        .map(|(start, _)| return if start < lead_end { LEAD_WEIGHT } else { 1 })
        .sum();
}
