use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::models::{CatalogEntry, PhoneModel};
use crate::{AppError, Result};

/// Local model catalog: part number -> descriptive attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: BTreeMap<String, CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Read and parse a catalog file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::catalog(format!("cannot read {}: {}", path.display(), e))
        })?;
        let entries: BTreeMap<String, CatalogEntry> =
            serde_json::from_str(&content).map_err(|e| {
                AppError::catalog(format!("malformed catalog {}: {}", path.display(), e))
            })?;

        tracing::debug!("Loaded {} catalog entries from {}", entries.len(), path.display());
        Ok(Self { entries })
    }

    /// Models of one family, sorted by color. Fails when nothing matches.
    pub fn models_for_family(&self, family: &str) -> Result<Vec<PhoneModel>> {
        let mut models: Vec<PhoneModel> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.name == family)
            .map(|(code, entry)| PhoneModel::from_entry(code.clone(), entry.clone()))
            .collect();

        if models.is_empty() {
            return Err(AppError::NoMatchingModels {
                family: family.to_string(),
            });
        }

        // Stable: equal colors keep part number order
        models.sort_by(|a, b| a.color().cmp(b.color()));
        Ok(models)
    }

    /// Distinct family names, sorted.
    pub fn families(&self) -> Vec<String> {
        self.entries
            .values()
            .map(|entry| entry.name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// New entries replace same codes; codes absent from `incoming` are kept.
    pub fn merge(&mut self, incoming: BTreeMap<String, CatalogEntry>) {
        self.entries.extend(incoming);
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(path, json)?;
        tracing::info!("Saved {} catalog entries to {}", self.entries.len(), path.display());
        Ok(())
    }

    pub fn get(&self, code: &str) -> Option<&CatalogEntry> {
        self.entries.get(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load `path` and return the color-sorted models of `family`.
pub fn load_family(path: impl AsRef<Path>, family: &str) -> Result<Vec<PhoneModel>> {
    let result = Catalog::load(path).and_then(|catalog| catalog.models_for_family(family));
    match &result {
        Ok(models) => tracing::info!("Loaded {} models for {}", models.len(), family),
        Err(e) => tracing::error!("Failed to load models for {}: {}", family, e),
    }
    result
}
