//! Catalog Resource Loading
//!
//! The catalog ships as a JSON resource so test builds and regional
//! builds can substitute their own server lists without code changes.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use super::types::{Catalog, CatalogError, Server};

/// Root structure of a catalog resource file
#[derive(Debug, Deserialize)]
struct CatalogFile {
    servers: Vec<Server>,
}

/// Parse a catalog from a JSON string
pub fn from_json_str(json: &str) -> Result<Catalog, CatalogError> {
    let file: CatalogFile = serde_json::from_str(json)?;
    Catalog::new(file.servers)
}

/// Load a catalog from a JSON file on disk
pub fn load_from_file(path: impl AsRef<Path>) -> Result<Catalog, CatalogError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let catalog = from_json_str(&json)?;
    info!(path = %path.display(), servers = catalog.len(), "loaded server catalog");
    Ok(catalog)
}

/// The catalog bundled with the reference build (8 servers)
pub fn reference_catalog() -> Result<Catalog, CatalogError> {
    from_json_str(include_str!("../../data/servers.json"))
}
