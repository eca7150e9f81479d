//! Server Catalog Types
//!
//! Data structures for the static server catalog the client renders and
//! connects against. The catalog is injected, read-only reference data;
//! nothing in the session core ever mutates it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single VPN server record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    /// Unique identifier (e.g. "usa-ny")
    pub id: String,

    /// Country display label (opaque to logic)
    pub country: String,

    /// City display label (opaque to logic)
    pub city: String,

    /// Flag emoji for the server list
    pub flag: String,

    /// Last measured round-trip time in milliseconds
    pub ping: u32,

    /// Current load in percent, 0..=100
    pub load: u8,

    /// Premium-tier marker, informational only — does not gate behavior
    #[serde(default)]
    pub premium: bool,
}

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate server id: {0}")]
    DuplicateId(String),

    #[error("load out of range for server {id}: {load}%")]
    LoadOutOfRange { id: String, load: u8 },
}

/// The fixed, ordered list of available servers.
///
/// Order is significant: it is the order the UI lists servers in, the
/// order favorite queries preserve, and `first()` is the fallback the
/// session assigns on a connect with no prior selection. May be empty;
/// callers must not assume otherwise.
///
/// Only constructible through [`Catalog::new`] so validation cannot be
/// bypassed.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    servers: Vec<Server>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids and out-of-range loads
    pub fn new(servers: Vec<Server>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for server in &servers {
            if !seen.insert(server.id.as_str()) {
                return Err(CatalogError::DuplicateId(server.id.clone()));
            }
            if server.load > 100 {
                return Err(CatalogError::LoadOutOfRange {
                    id: server.id.clone(),
                    load: server.load,
                });
            }
        }
        Ok(Self { servers })
    }

    /// All servers in catalog order
    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    /// Get a server by id
    pub fn get(&self, id: &str) -> Option<&Server> {
        self.servers.iter().find(|s| s.id == id)
    }

    /// Whether the catalog holds a server with this id
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// The default-connect fallback entry
    pub fn first(&self) -> Option<&Server> {
        self.servers.first()
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Search servers by country or city (case-insensitive substring)
    pub fn search(&self, query: &str) -> Vec<&Server> {
        let query_lower = query.to_lowercase();
        self.servers
            .iter()
            .filter(|s| {
                s.country.to_lowercase().contains(&query_lower)
                    || s.city.to_lowercase().contains(&query_lower)
            })
            .collect()
    }
}
