//! Session Events Module
//!
//! Events the view-model broadcasts after each state mutation so a
//! reactive shell can re-render without polling. Delivery is
//! fire-and-forget over a `tokio::sync::broadcast` channel; having no
//! subscribers is not an error.

use serde::{Deserialize, Serialize};

use super::state::ConnectionStatus;

/// Event names as constants
pub mod event_names {
    /// Connection status changed
    pub const STATUS_CHANGED: &str = "session:status_changed";
    /// A server was selected
    pub const SERVER_SELECTED: &str = "session:server_selected";
    /// A favorite was added or removed
    pub const FAVORITE_TOGGLED: &str = "session:favorite_toggled";
}

/// A state mutation notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    StatusChanged { status: ConnectionStatus },
    ServerSelected { id: String },
    FavoriteToggled { id: String, favorite: bool },
}

impl SessionEvent {
    /// The wire name a shell would emit this event under
    pub fn name(&self) -> &'static str {
        match self {
            Self::StatusChanged { .. } => event_names::STATUS_CHANGED,
            Self::ServerSelected { .. } => event_names::SERVER_SELECTED,
            Self::FavoriteToggled { .. } => event_names::FAVORITE_TOGGLED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let event = SessionEvent::StatusChanged {
            status: ConnectionStatus::Connecting,
        };
        assert_eq!(event.name(), "session:status_changed");

        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event":"status_changed","status":"connecting"}"#);
    }
}
