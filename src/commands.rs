//! Core CLI commands for docforge: discover, toc, check.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::classify::place_orphan;
use crate::config::Config;
use crate::discovery::DocumentationDiscovery;
use crate::error;
use crate::fingerprint::corpus_fingerprint;
use crate::paths::{DocStructure, locate_docs_dir};
use crate::render::{self, OutputFormat};
use crate::toc::generate_toc_structure;
use crate::toctree;
use crate::types::{Category, StructuralIssue};

/// Load existing toctrees and report orphans they miss, plus toctree
/// entries and document links pointing at nothing.
///
/// # Errors
///
/// Returns errors from layout resolution, config loading, or discovery.
pub fn check(docs_dir: Option<&Path>) -> Result<ExitCode, error::Error> {
    let (config, structure) = load_layout(docs_dir)?;
    let mut discovery = DocumentationDiscovery::new(&structure, &config);
    let corpus = discovery.discover_all()?;
    let links = discovery.resolve_references(&corpus);
    let references = toctree::load(&mut discovery);

    let orphans = discovery.find_orphans(&references.tracked_urls);
    for path in &orphans {
        let placement = place_orphan(&mut discovery, path);
        println!("ORPHAN  {} (would go in {})", structure.relative(path).display(), placement.section);
    }
    for issue in references.issues.iter().chain(&links.issues) {
        println!("{:<7} {}", issue_label(issue), render::describe_issue(issue));
    }

    let orphan_count = orphans.len();
    let issue_count = references.issues.len().saturating_add(links.issues.len());

    // Exit code priority: structural issues (2) > orphans (1) > clean (0).
    if issue_count > 0 {
        println!();
        println!("{issue_count} structural issues, {orphan_count} orphans");
        return Ok(ExitCode::from(2));
    } else if orphan_count > 0 {
        println!();
        println!("{orphan_count} orphans");
        return Ok(ExitCode::from(1));
    } else {
        let total = corpus.len();
        println!("All {total} documents placed, no orphans");
        return Ok(ExitCode::SUCCESS);
    }
}

/// Discover the corpus and write it in the requested format.
///
/// # Errors
///
/// Returns `Error::UnknownFormat` before any work is done, then errors
/// from layout resolution, discovery, rendering, or writing the output.
pub fn discover(docs_dir: Option<&Path>, output: Option<&Path>, format: &str) -> Result<(), error::Error> {
    let format: OutputFormat = format.parse()?;
    let (config, structure) = load_layout(docs_dir)?;
    let mut discovery = DocumentationDiscovery::new(&structure, &config);
    let corpus = discovery.discover_all()?;
    let references = discovery.resolve_references(&corpus);
    let fingerprint = corpus_fingerprint(&corpus, &structure);

    eprintln!(
        "Discovered {} documents in {} (user {}, auto {}, ai {})",
        corpus.len(),
        structure.root.display(),
        corpus.get(Category::User).len(),
        corpus.get(Category::Auto).len(),
        corpus.get(Category::Ai).len()
    );
    eprintln!("Fingerprint {fingerprint}");
    if !references.issues.is_empty() {
        eprintln!("{} unresolved references; run `docforge check` for details", references.issues.len());
    }

    let rendered = render::render_corpus(&corpus, &fingerprint, &references, &structure, format)?;
    return write_output(&rendered, output);
}

/// Line prefix for a structural issue in `check` output.
const fn issue_label(issue: &StructuralIssue) -> &'static str {
    return match issue {
        StructuralIssue::MissingTarget { .. } => "MISSING",
        StructuralIssue::UnresolvedReference { .. } => "UNRESOLVED",
    };
}

/// Resolve the documentation root (given, or located from the working
/// directory), load its config, and build the structure.
///
/// # Errors
///
/// Returns `Error::DocsDirNotFound` if no usable root exists, or
/// `Error::TomlDe` if its config is malformed.
pub fn load_layout(docs_dir: Option<&Path>) -> Result<(Config, DocStructure), error::Error> {
    let docs_dir: PathBuf = match docs_dir {
        Some(dir) => dir.to_path_buf(),
        None => locate_docs_dir(&std::env::current_dir()?)?,
    };
    if !docs_dir.is_dir() {
        return Err(error::Error::DocsDirNotFound { path: docs_dir });
    }
    let config = Config::load(&docs_dir)?;
    let structure = DocStructure::resolve(&docs_dir, &config)?;
    log::debug!("documentation root {}", structure.root.display());
    return Ok((config, structure));
}

/// Build the reconciled TOC and write it in the requested format.
///
/// # Errors
///
/// Returns `Error::UnknownFormat` before any work is done, then errors
/// from layout resolution, discovery, rendering, or writing the output.
pub fn toc(docs_dir: Option<&Path>, output: Option<&Path>, format: &str, respect_toctrees: bool) -> Result<(), error::Error> {
    let format: OutputFormat = format.parse()?;
    let (config, structure) = load_layout(docs_dir)?;
    let mut discovery = DocumentationDiscovery::new(&structure, &config);
    let report = generate_toc_structure(&mut discovery, respect_toctrees)?;

    eprintln!(
        "Placed {} items ({} orphans), {} structural issues",
        report.sections.total_items(),
        report.orphans.len(),
        report.issues.len()
    );

    let rendered = render::render_toc(&report, &structure, format)?;
    return write_output(&rendered, output);
}

/// Write rendered output to a file, or stdout when none is given.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be written.
fn write_output(rendered: &str, output: Option<&Path>) -> Result<(), error::Error> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            eprintln!("Wrote {}", path.display());
        },
        None => print!("{rendered}"),
    }
    return Ok(());
}
