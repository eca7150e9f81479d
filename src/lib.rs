//! SecureVPN client core
//!
//! The behavioral core of the SecureVPN desktop client: a session
//! view-model owning connection status, server selection, and favorites
//! over an injected read-only server catalog. Connection establishment
//! is simulated with a fixed delay; presentation belongs to the shell
//! embedding this crate.
//!
//! ```no_run
//! use std::sync::Arc;
//! use securevpn_core::{catalog, SessionConfig, SessionViewModel};
//!
//! # fn main() -> Result<(), securevpn_core::CatalogError> {
//! let catalog = Arc::new(catalog::reference_catalog()?);
//! let session = SessionViewModel::new(catalog, SessionConfig::reference());
//! session.toggle_connection(); // status is now Connecting
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod logging;
pub mod session;

pub use catalog::{Catalog, CatalogError, Server};
pub use session::{
    ConnectionStatus, SessionConfig, SessionError, SessionEvent, SessionViewModel, StatusSnapshot,
    TrafficStats,
};
