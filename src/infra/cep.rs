//! Thin asynchronous client for the ViaCEP postal-code service.
//!
//! - Normalises CEP input and maps the wire format into [`Address`].
//! - Keeps an in-memory cache with a TTL, backed by the on-disk cache, and
//!   serves stale entries when the service cannot be reached.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::Arc,
    time::{Duration, SystemTime},
};

use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::Address;
use crate::infra::cache::{
    default_cache_path, load_address_cache, save_address_cache, CachedAddress,
};
use crate::util::version::user_agent;

const DEFAULT_BASE_URL: &str = "https://viacep.com.br/ws/";
const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum CepClientError {
    #[error("invalid CEP {0:?}; expected 8 digits")]
    InvalidCep(String),
    #[error("CEP {0} not found")]
    NotFound(String),
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Fresh,
    Cached,
    Stale,
}

#[derive(Clone, Debug)]
pub struct CachedPayload<T> {
    pub data: T,
    pub fetched_at: SystemTime,
    pub status: CacheStatus,
}

impl<T> CachedPayload<T> {
    fn new(data: T, fetched_at: SystemTime, status: CacheStatus) -> Self {
        Self {
            data,
            fetched_at,
            status,
        }
    }
}

/// Strips punctuation from a CEP and checks it has exactly 8 digits.
pub fn normalize_cep(raw: &str) -> Result<String, CepClientError> {
    let digits: String = raw
        .chars()
        .filter(|ch| !matches!(ch, '-' | '.' | ' '))
        .collect();
    if digits.len() == 8 && digits.chars().all(|ch| ch.is_ascii_digit()) {
        Ok(digits)
    } else {
        Err(CepClientError::InvalidCep(raw.to_string()))
    }
}

#[derive(Clone)]
pub struct CepClient {
    http: Client,
    base_url: Url,
    cache: Arc<Mutex<HashMap<String, Cached<Address>>>>,
    disk_cache: Option<PathBuf>,
    ttl: Duration,
}

impl CepClient {
    pub fn new() -> Result<Self, CepClientError> {
        Ok(Self::with_base_url(DEFAULT_BASE_URL)?.with_disk_cache(default_cache_path()))
    }

    /// Client without a disk cache.
    pub fn with_base_url(base: &str) -> Result<Self, CepClientError> {
        let base_url = Url::parse(base)?;
        let http = Client::builder()
            .user_agent(user_agent())
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url,
            cache: Arc::new(Mutex::new(HashMap::new())),
            disk_cache: None,
            ttl: DEFAULT_TTL,
        })
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_disk_cache(mut self, path: Option<PathBuf>) -> Self {
        self.disk_cache = path;
        self
    }

    /// Resolves a CEP to an address.
    ///
    /// Order: fresh memory entry, unexpired disk entry, network. A network
    /// failure falls back to any cached entry before returning the error.
    pub async fn lookup(&self, raw_cep: &str) -> Result<CachedPayload<Address>, CepClientError> {
        let cep = normalize_cep(raw_cep)?;

        if let Some(payload) = self.cached(&cep).await {
            debug!(%cep, "serving cached address");
            return Ok(payload);
        }

        if let Some(entry) = self.disk_entry(&cep).filter(|entry| !entry.is_expired()) {
            debug!(%cep, age = %entry.age_string(), "serving address from disk cache");
            let fetched_at = entry.fetched_at();
            self.cache
                .lock()
                .await
                .insert(cep, Cached::new(entry.address.clone(), fetched_at));
            return Ok(CachedPayload::new(
                entry.address,
                fetched_at,
                CacheStatus::Cached,
            ));
        }

        match self.fetch(&cep).await {
            Ok(address) => {
                info!(%cep, city = %address.city, state = %address.state, "resolved CEP");
                Ok(self.store(address).await)
            }
            Err(CepClientError::NotFound(cep)) => Err(CepClientError::NotFound(cep)),
            Err(error) => {
                if let Some(stale) = self.stale(&cep).await {
                    warn!(%cep, %error, "CEP lookup failed; serving stale address");
                    return Ok(stale);
                }
                Err(error)
            }
        }
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    async fn fetch(&self, cep: &str) -> Result<Address, CepClientError> {
        let url = self.base_url.join(&format!("{cep}/json/"))?;
        debug!(%url, "requesting address");
        let dto: ViaCepDto = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        dto.into_address(cep)
    }

    async fn cached(&self, cep: &str) -> Option<CachedPayload<Address>> {
        let cache = self.cache.lock().await;
        cache.get(cep).and_then(|entry| entry.if_fresh(self.ttl))
    }

    async fn stale(&self, cep: &str) -> Option<CachedPayload<Address>> {
        if let Some(entry) = self.cache.lock().await.get(cep) {
            return Some(entry.stale());
        }
        self.disk_entry(cep).map(|entry| {
            let fetched_at = entry.fetched_at();
            CachedPayload::new(entry.address, fetched_at, CacheStatus::Stale)
        })
    }

    async fn store(&self, address: Address) -> CachedPayload<Address> {
        let fetched_at = SystemTime::now();
        let payload = CachedPayload::new(address.clone(), fetched_at, CacheStatus::Fresh);

        if let Some(path) = &self.disk_cache {
            let mut disk = load_address_cache(path);
            let pruned = disk.prune_expired();
            if pruned > 0 {
                debug!(pruned, "dropped expired addresses from disk cache");
            }
            disk.insert(address.clone());
            if let Err(err) = save_address_cache(path, &disk) {
                warn!(path = %path.display(), error = %err, "failed to save address cache");
            }
        }

        self.cache
            .lock()
            .await
            .insert(address.cep.clone(), Cached::new(address, fetched_at));
        payload
    }

    fn disk_entry(&self, cep: &str) -> Option<CachedAddress> {
        let path = self.disk_cache.as_ref()?;
        load_address_cache(path).entries.remove(cep)
    }
}

struct Cached<T> {
    value: T,
    fetched_at: SystemTime,
}

impl<T: Clone> Cached<T> {
    fn new(value: T, fetched_at: SystemTime) -> Self {
        Self { value, fetched_at }
    }

    fn if_fresh(&self, ttl: Duration) -> Option<CachedPayload<T>> {
        if self
            .fetched_at
            .elapsed()
            .map(|elapsed| elapsed <= ttl)
            .unwrap_or(false)
        {
            Some(CachedPayload::new(
                self.value.clone(),
                self.fetched_at,
                CacheStatus::Cached,
            ))
        } else {
            None
        }
    }

    fn stale(&self) -> CachedPayload<T> {
        CachedPayload::new(self.value.clone(), self.fetched_at, CacheStatus::Stale)
    }
}

#[derive(Debug, Deserialize)]
struct ViaCepDto {
    #[serde(default)]
    cep: Option<String>,
    #[serde(default)]
    logradouro: Option<String>,
    #[serde(default)]
    bairro: Option<String>,
    #[serde(default)]
    localidade: Option<String>,
    #[serde(default)]
    uf: Option<String>,
    /// `true` or `"true"` depending on the API revision.
    #[serde(default)]
    erro: Option<serde_json::Value>,
}

impl ViaCepDto {
    fn into_address(self, requested: &str) -> Result<Address, CepClientError> {
        let flagged = match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(flag)) => flag == "true",
            _ => false,
        };
        let (Some(city), Some(state)) = (non_empty(self.localidade), non_empty(self.uf)) else {
            return Err(CepClientError::NotFound(requested.to_string()));
        };
        if flagged {
            return Err(CepClientError::NotFound(requested.to_string()));
        }

        let cep = self
            .cep
            .and_then(|raw| normalize_cep(&raw).ok())
            .unwrap_or_else(|| requested.to_string());

        Ok(Address {
            cep,
            street: non_empty(self.logradouro),
            district: non_empty(self.bairro),
            city,
            state: state.to_ascii_uppercase(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
