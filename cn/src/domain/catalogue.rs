//! Internal capability catalogue
//!
//! Read-only records describing the organization's own products and
//! modules, consumed by the recommendation matcher. The bundled
//! provider loads a YAML manifest and caches each item's document text
//! at load time.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from a catalogue provider
#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("catalogue manifest not readable: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalogue manifest invalid: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// One internal capability record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogueItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Extracted document text, cached at load; may be empty
    #[serde(default)]
    pub doc_text: String,
}

/// Read-only source of catalogue items
pub trait CatalogueProvider: Send + Sync {
    fn items(&self) -> Result<Vec<CatalogueItem>, CatalogueError>;
}

/// Fixed in-memory catalogue (tests, embedded deployments)
pub struct StaticCatalogue {
    items: Vec<CatalogueItem>,
}

impl StaticCatalogue {
    pub fn new(items: Vec<CatalogueItem>) -> Self {
        Self { items }
    }
}

impl CatalogueProvider for StaticCatalogue {
    fn items(&self) -> Result<Vec<CatalogueItem>, CatalogueError> {
        Ok(self.items.clone())
    }
}

/// Manifest entry as written in YAML
#[derive(Debug, Deserialize)]
struct ManifestEntry {
    name: String,
    #[serde(default)]
    description: String,
    /// Optional path to a document file, relative to the manifest
    #[serde(default)]
    doc_path: Option<PathBuf>,
}

/// Catalogue backed by a YAML manifest on disk
///
/// Items are loaded once at construction; document files that cannot be
/// read are logged and skipped rather than failing the whole catalogue.
pub struct YamlCatalogue {
    items: Vec<CatalogueItem>,
}

impl YamlCatalogue {
    /// Load the manifest and cache every item's document text
    pub fn load(manifest_path: impl AsRef<Path>) -> Result<Self, CatalogueError> {
        let manifest_path = manifest_path.as_ref();
        debug!(?manifest_path, "YamlCatalogue::load: called");

        let content = std::fs::read_to_string(manifest_path).map_err(|source| CatalogueError::Io {
            path: manifest_path.to_path_buf(),
            source,
        })?;
        let entries: Vec<ManifestEntry> = serde_yaml::from_str(&content)?;
        let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));

        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            let doc_text = match &entry.doc_path {
                Some(rel) => {
                    let doc_path = base_dir.join(rel);
                    match std::fs::read_to_string(&doc_path) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(?doc_path, error = %e, "YamlCatalogue::load: document not readable, skipping");
                            String::new()
                        }
                    }
                }
                None => String::new(),
            };
            items.push(CatalogueItem {
                name: entry.name,
                description: entry.description,
                doc_text,
            });
        }

        debug!(count = items.len(), "YamlCatalogue::load: loaded");
        Ok(Self { items })
    }
}

impl CatalogueProvider for YamlCatalogue {
    fn items(&self) -> Result<Vec<CatalogueItem>, CatalogueError> {
        Ok(self.items.clone())
    }
}
