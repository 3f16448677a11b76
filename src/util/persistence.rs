use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde_json::Error as SerdeError;
use tracing::{debug, info, warn};

use crate::domain::rates::PricingTable;
use crate::domain::session::QuoteDraft;

const APP_QUALIFIER: &str = "br";
const APP_ORG: &str = "FreightQuote";
const APP_NAME: &str = "FreightQuote";

const PRICING_FILE: &str = "pricing.json";
const DRAFTS_DIR: &str = "drafts";
const CEP_CACHE_FILE: &str = "cep_cache.json";

/// Settings and saved drafts under one directory.
#[derive(Clone, Debug)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Store in the platform config directory.
    pub fn locate() -> Result<Self, PersistError> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
            .map(|dirs| Self::at(dirs.config_dir()))
            .ok_or(PersistError::StorageUnavailable)
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pricing_path(&self) -> PathBuf {
        self.root.join(PRICING_FILE)
    }

    /// Postal-code cache kept next to the settings.
    pub fn cep_cache_path(&self) -> PathBuf {
        self.root.join(CEP_CACHE_FILE)
    }

    fn draft_path(&self, draft: &QuoteDraft) -> PathBuf {
        self.root.join(DRAFTS_DIR).join(format!("{}.json", draft.id))
    }

    /// Saved pricing table, or the defaults when none is saved or the file
    /// cannot be read.
    pub fn load_pricing_table(&self) -> PricingTable {
        let path = self.pricing_path();
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no saved pricing table; using defaults");
                return PricingTable::default();
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read pricing table; using defaults");
                return PricingTable::default();
            }
        };

        serde_json::from_str(&data).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "invalid pricing table; using defaults");
            PricingTable::default()
        })
    }

    pub fn save_pricing_table(&self, table: &PricingTable) -> Result<PathBuf, PersistError> {
        let path = self.pricing_path();
        write_json(&path, table)?;
        info!(path = %path.display(), "saved pricing table");
        Ok(path)
    }

    /// Deletes the saved table so the defaults apply again.
    pub fn reset_pricing_table(&self) -> Result<(), PersistError> {
        match fs::remove_file(self.pricing_path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save_draft(&self, draft: &QuoteDraft) -> Result<PathBuf, PersistError> {
        let path = self.draft_path(draft);
        write_json(&path, draft)?;
        info!(id = %draft.id, path = %path.display(), "saved quote draft");
        Ok(path)
    }

    /// All readable drafts, oldest first. Unreadable files are skipped.
    pub fn load_drafts(&self) -> Result<Vec<QuoteDraft>, PersistError> {
        let dir = self.root.join(DRAFTS_DIR);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut drafts = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let parsed = fs::read_to_string(&path)
                .map_err(PersistError::from)
                .and_then(|data| serde_json::from_str::<QuoteDraft>(&data).map_err(Into::into));
            match parsed {
                Ok(draft) => drafts.push(draft),
                Err(err) => warn!(path = %path.display(), error = %err, "skipping unreadable draft"),
            }
        }

        drafts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(drafts)
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}
