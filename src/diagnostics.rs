use std::path::Path;

use crate::config::CONFIG_FILE;
use crate::error::Error;

/// ANSI bold, used for markdown headings on stderr.
const BOLD: &str = "\x1b[1m";

/// ANSI reset.
const RESET: &str = "\x1b[0m";

/// Render an error as markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic: what happened,
/// then how to fix it where there is a known fix.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::DocsDirNotFound { path } => render_docs_dir_not_found(path),
        Error::Io(err) => format!(
            "\
# Error: I/O

{err}
"
        ),
        Error::Json(err) => format!(
            "\
# Error: JSON Serialization

{err}
"
        ),
        Error::TomlDe(err) => format!(
            "\
# Error: Invalid Config

`{CONFIG_FILE}` could not be parsed:

{err}

## Fix

Correct the file, or delete it to use the defaults.
"
        ),
        Error::UnknownFormat { format } => format!(
            "\
# Error: Unknown Output Format

`{format}` is not a supported format.

## Fix

Use one of `json`, `yaml` or `text`:

    docforge discover --format json
"
        ),
        Error::Watch { reason } => format!(
            "\
# Error: Watch Failed

{reason}
"
        ),
        Error::Yaml(err) => format!(
            "\
# Error: YAML Serialization

{err}

## Fix

Use `--format json` to get the same report as JSON.
"
        ),
    };
}

/// Missing documentation root, with the invocation that names it explicitly.
fn render_docs_dir_not_found(path: &Path) -> String {
    return format!(
        "\
# Error: Documentation Directory Not Found

`{}` does not exist or is not a directory.

## Fix

Pass the documentation root explicitly:

    docforge discover path/to/docs
",
        path.display()
    );
}
