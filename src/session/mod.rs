//! Session Module
//!
//! Connection lifecycle state machine, the session view-model, mutation
//! events, and the display helpers for the status card.

pub mod events;
pub mod state;
pub mod stats;
pub mod view_model;

// Re-export commonly used items for convenience
pub use events::{event_names, SessionEvent};
pub use state::{ConnectionStateMachine, ConnectionStatus, StateTransitionError};
pub use stats::{format_connection_time, StatusSnapshot, TrafficStats};
pub use view_model::{SessionConfig, SessionError, SessionViewModel, DEFAULT_CONNECT_DELAY};
