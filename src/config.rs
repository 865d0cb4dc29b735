use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Error;

/// Config file looked up in the documentation root.
pub const CONFIG_FILE: &str = ".docforge.toml";

/// Section directory name to TOC section key. Entries in the config's
/// `[sections]` table are consulted first.
const DEFAULT_SECTION_MAP: [(&str, &str); 16] = [
    ("advanced", "advanced"),
    ("api", "reference"),
    ("apidoc", "reference"),
    ("autoapi", "reference"),
    ("concepts", "concepts"),
    ("examples", "examples"),
    ("extracted", "reference"),
    ("faq", "user_guide"),
    ("getting_started", "getting_started"),
    ("guides", "user_guide"),
    ("installation", "getting_started"),
    ("introspected", "reference"),
    ("quickstart", "getting_started"),
    ("reference", "reference"),
    ("tutorials", "user_guide"),
    ("user_guide", "user_guide"),
];

/// TOC section used when a section name has no mapping.
pub const FALLBACK_SECTION: &str = "reference";

/// Project configuration loaded from `.docforge.toml`.
/// Every key is optional; missing keys take the conventional Sphinx layout.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory name of the AI-generated docs root.
    pub ai_docs: String,
    /// Directory name of the auto-generated docs root.
    pub auto_docs: String,
    /// Extra auto-generated locations relative to the docs root.
    pub auto_roots: Vec<String>,
    /// Supported source extensions, without the dot.
    pub extensions: Vec<String>,
    /// Directory names never descended into.
    pub ignore: Vec<String>,
    /// Stem of the root document every toctree hangs from.
    pub master_doc: String,
    /// Suffix of derived output URLs, without the dot.
    pub output_suffix: String,
    /// Section name to TOC section key, overriding the defaults.
    pub sections: BTreeMap<String, String>,
    /// Directory name of the user docs root.
    pub user_docs: String,
}

/// Raw TOML structure for `.docforge.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct DocforgeTomlConfig {
    /// See [`Config::ai_docs`].
    ai_docs: Option<String>,
    /// See [`Config::auto_docs`].
    auto_docs: Option<String>,
    /// See [`Config::auto_roots`].
    auto_roots: Option<Vec<String>>,
    /// See [`Config::extensions`].
    extensions: Option<Vec<String>>,
    /// See [`Config::ignore`].
    ignore: Option<Vec<String>>,
    /// See [`Config::master_doc`].
    master_doc: Option<String>,
    /// See [`Config::output_suffix`].
    output_suffix: Option<String>,
    /// See [`Config::sections`].
    #[serde(default)]
    sections: BTreeMap<String, String>,
    /// See [`Config::user_docs`].
    user_docs: Option<String>,
}

impl Config {
    /// Whether a single path component excludes everything below it:
    /// underscore-prefixed names (Sphinx `_build`, `_static`, `_templates`)
    /// and configured ignore entries.
    pub fn is_excluded_component(&self, name: &str) -> bool {
        return name.starts_with('_') || self.ignore.iter().any(|i| return i == name);
    }

    /// Whether the file extension is one of the supported source formats.
    pub fn is_supported(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| return e.to_str()) else {
            return false;
        };
        return self.extensions.iter().any(|e| return e.eq_ignore_ascii_case(ext));
    }

    /// Load config from `.docforge.toml` in the documentation root.
    /// Returns the defaults if the file doesn't exist. A file that exists
    /// but is malformed is an error, never a silent fallback.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(docs_dir: &Path) -> Result<Self, Error> {
        let path = docs_dir.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no {CONFIG_FILE} in {}, using defaults", docs_dir.display());
                return Ok(Self::default());
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };

        return Self::parse(&content);
    }

    /// Parse config from TOML text, filling unset keys with defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed or has unknown keys.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: DocforgeTomlConfig = toml::from_str(content)?;
        let defaults = Self::default();
        return Ok(Self {
            ai_docs: raw.ai_docs.unwrap_or(defaults.ai_docs),
            auto_docs: raw.auto_docs.unwrap_or(defaults.auto_docs),
            auto_roots: raw.auto_roots.unwrap_or(defaults.auto_roots),
            extensions: raw
                .extensions
                .map(|exts| {
                    return exts.into_iter().map(|e| return e.trim_start_matches('.').to_string()).collect();
                })
                .unwrap_or(defaults.extensions),
            ignore: raw.ignore.unwrap_or(defaults.ignore),
            master_doc: raw.master_doc.unwrap_or(defaults.master_doc),
            output_suffix: raw
                .output_suffix
                .map(|s| return s.trim_start_matches('.').to_string())
                .unwrap_or(defaults.output_suffix),
            sections: raw.sections,
            user_docs: raw.user_docs.unwrap_or(defaults.user_docs),
        });
    }

    /// TOC section key for a discovered section name.
    /// Unmapped names land in the fallback section.
    pub fn toc_section_for(&self, section: &str) -> String {
        if let Some(target) = self.sections.get(section) {
            return target.clone();
        }
        return DEFAULT_SECTION_MAP
            .iter()
            .find(|(name, _)| return *name == section)
            .map_or(FALLBACK_SECTION, |(_, target)| return *target)
            .to_string();
    }
}

impl Default for Config {
    fn default() -> Self {
        let strings = |items: &[&str]| -> Vec<String> {
            return items.iter().map(|s| return (*s).to_string()).collect();
        };
        return Self {
            ai_docs: "ai_docs".to_string(),
            auto_docs: "auto_docs".to_string(),
            auto_roots: strings(&["autoapi", "apidoc", "reference"]),
            extensions: strings(&["md", "rst", "txt"]),
            ignore: strings(&["build", ".venv", "venv", ".tox", ".git", "node_modules", "__pycache__"]),
            master_doc: "index".to_string(),
            output_suffix: "html".to_string(),
            sections: BTreeMap::new(),
            user_docs: "user_docs".to_string(),
        };
    }
}
