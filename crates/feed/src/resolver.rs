//! Cached identifier resolver backed by the upstream mapping dictionary.
//!
//! Resolves opaque feed identifiers to display names, fetching the
//! dictionary on demand. Bindings are monotonic: once an id maps to a name
//! it never changes for the lifetime of the process, and any refresh that
//! tries to re-bind a known id is rejected without merging anything.

use livematch_core::{is_canonical_uuid, TrackerError};
use reqwest::Client;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Response body of the mapping endpoint.
#[derive(Debug, Deserialize)]
struct MappingsResponse {
    #[serde(default)]
    mappings: Option<String>,
}

pub struct MappingResolver {
    http: Client,
    mapping_url: String,
    names: RwLock<HashMap<String, String>>,
    /// Serializes upstream refreshes so concurrent misses coalesce onto a
    /// single fetch.
    refresh: Mutex<()>,
}

impl MappingResolver {
    pub fn new(http: Client, mapping_url: impl Into<String>) -> Self {
        Self {
            http,
            mapping_url: mapping_url.into(),
            names: RwLock::new(HashMap::new()),
            refresh: Mutex::new(()),
        }
    }

    /// Resolves `id` to its display name, refreshing the dictionary once on
    /// a cache miss.
    ///
    /// # Errors
    ///
    /// `InvalidId` when `id` is not a canonical UUID; `NotFound` when the id
    /// stays unbound after a refresh; `InvalidResponse`, `InvalidEntry`,
    /// `InvalidId`, `NoEntries`, or `DuplicateBinding` when the refreshed
    /// dictionary is unusable; `FetchFailed`/`Timeout` on transport errors.
    pub async fn get(&self, id: &str) -> Result<String, TrackerError> {
        if !is_canonical_uuid(id) {
            return Err(TrackerError::InvalidId(id.to_string()));
        }

        if let Some(name) = self.names.read().await.get(id) {
            return Ok(name.clone());
        }

        let _guard = self.refresh.lock().await;

        // A refresh triggered by a concurrent miss may already have bound it.
        if let Some(name) = self.names.read().await.get(id) {
            return Ok(name.clone());
        }

        self.refresh_dictionary().await?;

        self.names
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| TrackerError::NotFound(id.to_string()))
    }

    /// Number of bindings currently held.
    pub async fn binding_count(&self) -> usize {
        self.names.read().await.len()
    }

    async fn refresh_dictionary(&self) -> Result<(), TrackerError> {
        let response = self
            .http
            .get(&self.mapping_url)
            .send()
            .await
            .map_err(crate::fetch_error)?;

        if !response.status().is_success() {
            return Err(TrackerError::FetchFailed(format!(
                "mapping endpoint returned {}",
                response.status()
            )));
        }

        let body: MappingsResponse = response
            .json()
            .await
            .map_err(|err| TrackerError::InvalidResponse(err.to_string()))?;

        let payload = match body.mappings {
            Some(payload) if !payload.is_empty() => payload,
            _ => {
                return Err(TrackerError::InvalidResponse(
                    "missing mappings payload".to_string(),
                ))
            }
        };

        // Validate the whole payload against the current bindings before
        // merging so a rejected refresh leaves the state untouched.
        let entries = {
            let names = self.names.read().await;
            parse_dictionary(&payload, &names)?
        };

        let merged = entries.len();
        let mut names = self.names.write().await;
        names.extend(entries);

        debug!(merged, total = names.len(), "mapping dictionary refreshed");
        Ok(())
    }
}

/// Parses the `id:name;id:name` dictionary payload.
fn parse_dictionary(
    payload: &str,
    existing: &HashMap<String, String>,
) -> Result<Vec<(String, String)>, TrackerError> {
    let mut entries = Vec::new();
    let mut batch: HashSet<String> = HashSet::new();

    for segment in payload.split(';') {
        if segment.is_empty() {
            continue;
        }

        let Some((id, name)) = segment.split_once(':') else {
            return Err(TrackerError::InvalidEntry(segment.to_string()));
        };

        let id = id.trim();
        let name = name.trim();
        if id.is_empty() || name.is_empty() {
            return Err(TrackerError::InvalidEntry(segment.to_string()));
        }
        if !is_canonical_uuid(id) {
            return Err(TrackerError::InvalidId(id.to_string()));
        }
        if existing.contains_key(id) || !batch.insert(id.to_string()) {
            return Err(TrackerError::DuplicateBinding(id.to_string()));
        }

        entries.push((id.to_string(), name.to_string()));
    }

    if entries.is_empty() {
        return Err(TrackerError::NoEntries);
    }

    Ok(entries)
}
