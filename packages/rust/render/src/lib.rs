//! Rendering and export: normalized records out to a Markdown tree.
//!
//! Each record becomes a Markdown document with YAML frontmatter, placed
//! under `<out>/<category>/<rank>-rank/<path_name>.md`. This crate is a
//! pure consumer of the core's output model; it carries no parsing or
//! dedup logic of its own.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use jutsudex_shared::{ActivationInfo, JutsudexError, JutsuRecord, Result};
use jutsudex_store::IngestionStore;

// ---------------------------------------------------------------------------
// Options and results
// ---------------------------------------------------------------------------

/// Options for rendering and export.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Timestamp stamped into each document's frontmatter.
    pub exported_at: Option<DateTime<Utc>>,
}

/// Result of a full store export.
#[derive(Debug, Clone)]
pub struct ExportResult {
    /// Root of the written tree.
    pub out_dir: PathBuf,
    /// Number of record files written.
    pub files_written: usize,
}

// ---------------------------------------------------------------------------
// Frontmatter
// ---------------------------------------------------------------------------

/// YAML frontmatter schema for a rendered record.
#[derive(Debug, Serialize)]
struct Frontmatter<'a> {
    name: &'a str,
    rank: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    keywords: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    activation: Option<&'a ActivationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    img: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exported_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render one record as a Markdown document with YAML frontmatter.
pub fn render_markdown(record: &JutsuRecord, opts: &RenderOptions) -> Result<String> {
    let frontmatter = Frontmatter {
        name: &record.name,
        rank: record.rank.to_string(),
        category: record.category.as_deref(),
        keywords: record.keywords.iter().map(String::as_str).collect(),
        activation: record.activation.as_ref(),
        img: record.img.as_deref(),
        exported_at: opts.exported_at.map(|ts| ts.to_rfc3339()),
    };

    let yaml = serde_yml::to_string(&frontmatter)
        .map_err(|e| JutsudexError::render(format!("frontmatter for `{}`: {e}", record.name)))?;

    let mut doc = String::from("---\n");
    doc.push_str(&yaml);
    doc.push_str("---\n");
    doc.push('\n');
    doc.push_str(&format!("# {}\n", record.name));
    if !record.description.is_empty() {
        doc.push('\n');
        doc.push_str(&record.description);
        doc.push('\n');
    }
    Ok(doc)
}

/// Relative path for a record inside the export tree:
/// `<category|uncategorized>/<rank>-rank/<path_name>.md`, with the
/// directory segments lower-cased. `path_name` is already guaranteed safe
/// for a filesystem segment by the parser.
pub fn record_rel_path(record: &JutsuRecord) -> PathBuf {
    let category = record
        .category
        .as_deref()
        .unwrap_or("uncategorized")
        .to_lowercase();
    let rank_dir = format!("{}-rank", record.rank.to_string().to_lowercase());
    PathBuf::from(category)
        .join(rank_dir)
        .join(format!("{}.md", record.path_name))
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Write every live record in the store under `out_dir`, creating
/// directories as needed.
pub fn export_store(
    store: &IngestionStore,
    out_dir: &Path,
    opts: &RenderOptions,
) -> Result<ExportResult> {
    info!(path = %out_dir.display(), records = store.len(), "exporting record tree");

    let mut files_written = 0;
    for record in store.iter() {
        let path = out_dir.join(record_rel_path(record));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| JutsudexError::io(parent, e))?;
        }
        let doc = render_markdown(record, opts)?;
        std::fs::write(&path, doc).map_err(|e| JutsudexError::io(&path, e))?;
        debug!(path = %path.display(), "record written");
        files_written += 1;
    }

    info!(files_written, "export complete");

    Ok(ExportResult {
        out_dir: out_dir.to_path_buf(),
        files_written,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
