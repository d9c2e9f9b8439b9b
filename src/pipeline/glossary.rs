// glossary.rs
// Phase 1: Load the internal-term glossary for prompt context

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const DEFAULT_GLOSSARY_PATH: &str = "data_set.csv";

/// The domain-term reference table, rendered once as bullet text.
///
/// The file is read on the first `bullet_text` call and the result is
/// memoized for the process lifetime. A missing or unreadable file memoizes
/// the empty string, so the failure is warned about once and never retried.
pub struct Glossary {
    path: PathBuf,
    text: OnceLock<String>,
}

impl Glossary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            text: OnceLock::new(),
        }
    }

    /// Glossary path from GLOSSARY_PATH, defaulting to `data_set.csv`.
    pub fn from_env() -> Self {
        let path = std::env::var("GLOSSARY_PATH")
            .unwrap_or_else(|_| DEFAULT_GLOSSARY_PATH.to_string());
        Self::new(path)
    }

    /// The glossary as `- term: definition` lines, loaded on first use.
    pub fn bullet_text(&self) -> &str {
        self.text.get_or_init(|| match render_bullet_text(&self.path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    "failed to load glossary from '{}': {e}; proceeding without it",
                    self.path.display()
                );
                String::new()
            }
        })
    }
}

/// Read the two-column CSV (header row skipped) into bullet lines.
fn render_bullet_text(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let mut lines = Vec::new();
    for record in reader.records() {
        let record = record?;
        let term = record.get(0).unwrap_or("").trim();
        let definition = record.get(1).unwrap_or("").trim();
        if term.is_empty() {
            continue;
        }
        lines.push(format!("- {term}: {definition}"));
    }

    Ok(lines.join("\n"))
}
