//! Persistent on-disk cache of resolved postal codes with a TTL per entry.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::Address;

const CACHE_DIR: &str = "freight-quote";
const CACHE_FILENAME: &str = "cep_cache.json";

/// Cache TTL: 30 days. Street data for a CEP rarely changes.
pub const ADDRESS_CACHE_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// One resolved address and when it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedAddress {
    /// Unix timestamp (seconds) of the lookup.
    pub cached_at: u64,
    pub address: Address,
}

impl CachedAddress {
    pub fn new(address: Address) -> Self {
        Self {
            cached_at: unix_now(),
            address,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.age() > ADDRESS_CACHE_TTL
    }

    pub fn age(&self) -> Duration {
        Duration::from_secs(unix_now().saturating_sub(self.cached_at))
    }

    pub fn fetched_at(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.cached_at)
    }

    /// Human-readable age string.
    pub fn age_string(&self) -> String {
        let secs = self.age().as_secs();
        if secs < 60 {
            format!("{secs}s")
        } else if secs < 3600 {
            format!("{}m", secs / 60)
        } else if secs < 86400 {
            format!("{}h", secs / 3600)
        } else {
            format!("{}d", secs / 86400)
        }
    }
}

/// Addresses keyed by 8-digit CEP.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressCache {
    pub entries: HashMap<String, CachedAddress>,
}

impl AddressCache {
    pub fn get(&self, cep: &str) -> Option<&CachedAddress> {
        self.entries.get(cep)
    }

    pub fn insert(&mut self, address: Address) {
        self.entries
            .insert(address.cep.clone(), CachedAddress::new(address));
    }

    /// Drops entries past the TTL. Returns how many were removed.
    pub fn prune_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        before - self.entries.len()
    }
}

/// Cache file in the local data directory, if the platform has one.
pub fn default_cache_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|base| base.join(CACHE_DIR).join(CACHE_FILENAME))
}

/// Loads the cache, treating a missing or corrupt file as empty.
pub fn load_address_cache(path: &Path) -> AddressCache {
    if !path.exists() {
        debug!(path = %path.display(), "no address cache found");
        return AddressCache::default();
    }

    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AddressCache>(&content) {
            Ok(cache) => {
                debug!(
                    path = %path.display(),
                    entries = cache.entries.len(),
                    "loaded address cache"
                );
                cache
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to parse address cache");
                AddressCache::default()
            }
        },
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read address cache");
            AddressCache::default()
        }
    }
}

pub fn save_address_cache(path: &Path, cache: &AddressCache) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(cache)?;
    fs::write(path, content)?;
    debug!(
        path = %path.display(),
        entries = cache.entries.len(),
        "saved address cache"
    );
    Ok(())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
