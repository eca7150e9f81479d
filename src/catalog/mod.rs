//! Server Catalog Module
//!
//! The static, ordered list of candidate VPN servers and its JSON
//! resource loading. Supplied to the session view-model as injected
//! read-only data.

pub mod storage;
pub mod types;

pub use storage::{from_json_str, load_from_file, reference_catalog};
pub use types::{Catalog, CatalogError, Server};
