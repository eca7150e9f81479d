//! Connection State Machine
//!
//! Defines the valid status transitions for the simulated VPN session:
//!
//! ```text
//! ┌──────────────┐    toggle (connect)    ┌──────────────┐
//! │ Disconnected │ ─────────────────────► │  Connecting  │
//! └──────────────┘                        └──────┬───────┘
//!        ▲  ▲                                    │
//!        │  │ toggle (cancel)                    │ timer fires
//!        │  └────────────────────────────────────┤
//!        │                                       ▼
//!        │         toggle (disconnect)   ┌──────────────┐
//!        └───────────────────────────────│  Connected   │
//!                                        └──────────────┘
//! ```
//!
//! There is no terminal state; the machine cycles indefinitely.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// Initial state, not connected
    #[default]
    Disconnected,
    /// Connect requested, waiting for the simulated handshake delay
    Connecting,
    /// "Tunnel" established
    Connected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

/// State machine for the session connection lifecycle
#[derive(Debug)]
pub struct ConnectionStateMachine {
    status: ConnectionStatus,
    status_changed_at: Instant,
    transition_count: u32,
}

impl Default for ConnectionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionStateMachine {
    /// Create a new state machine in Disconnected status
    pub fn new() -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            status_changed_at: Instant::now(),
            transition_count: 0,
        }
    }

    /// Get current status
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Get time elapsed since the last status change
    pub fn time_in_status(&self) -> std::time::Duration {
        self.status_changed_at.elapsed()
    }

    /// Get total number of status transitions
    pub fn transition_count(&self) -> u32 {
        self.transition_count
    }

    /// Whether the session is active (connecting or connected)
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            ConnectionStatus::Connecting | ConnectionStatus::Connected
        )
    }

    /// Attempt to transition to Connecting
    pub fn start_connecting(&mut self) -> Result<(), StateTransitionError> {
        match self.status {
            ConnectionStatus::Disconnected => {
                self.transition_to(ConnectionStatus::Connecting);
                Ok(())
            }
            _ => Err(StateTransitionError::InvalidTransition {
                from: self.status,
                to: ConnectionStatus::Connecting,
            }),
        }
    }

    /// Transition to Connected when the connect timer fires
    pub fn connect_success(&mut self) -> Result<(), StateTransitionError> {
        match self.status {
            ConnectionStatus::Connecting => {
                self.transition_to(ConnectionStatus::Connected);
                Ok(())
            }
            _ => Err(StateTransitionError::InvalidTransition {
                from: self.status,
                to: ConnectionStatus::Connected,
            }),
        }
    }

    /// Drop back to Disconnected, from Connecting (cancel) or Connected
    pub fn disconnect(&mut self) -> Result<(), StateTransitionError> {
        match self.status {
            ConnectionStatus::Connecting | ConnectionStatus::Connected => {
                self.transition_to(ConnectionStatus::Disconnected);
                Ok(())
            }
            _ => Err(StateTransitionError::InvalidTransition {
                from: self.status,
                to: ConnectionStatus::Disconnected,
            }),
        }
    }

    fn transition_to(&mut self, new_status: ConnectionStatus) {
        tracing::debug!(
            "Connection status transition: {} -> {} (count: {})",
            self.status,
            new_status,
            self.transition_count + 1
        );
        self.status = new_status;
        self.status_changed_at = Instant::now();
        self.transition_count += 1;
    }
}

/// Error type for invalid status transitions
#[derive(Debug, Clone, thiserror::Error)]
pub enum StateTransitionError {
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: ConnectionStatus,
        to: ConnectionStatus,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_cycle() {
        let mut sm = ConnectionStateMachine::new();
        assert_eq!(sm.status(), ConnectionStatus::Disconnected);
        assert!(!sm.is_active());

        sm.start_connecting().unwrap();
        assert_eq!(sm.status(), ConnectionStatus::Connecting);
        assert!(sm.is_active());

        sm.connect_success().unwrap();
        assert_eq!(sm.status(), ConnectionStatus::Connected);

        sm.disconnect().unwrap();
        assert_eq!(sm.status(), ConnectionStatus::Disconnected);
        assert_eq!(sm.transition_count(), 3);
    }

    #[test]
    fn test_cancel_while_connecting() {
        let mut sm = ConnectionStateMachine::new();
        sm.start_connecting().unwrap();
        sm.disconnect().unwrap();
        assert_eq!(sm.status(), ConnectionStatus::Disconnected);

        // A timer firing after the cancel must not be applicable
        assert!(sm.connect_success().is_err());
        assert_eq!(sm.status(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_invalid_transitions() {
        let mut sm = ConnectionStateMachine::new();
        // Cannot go directly to Connected
        assert!(sm.connect_success().is_err());
        // Cannot disconnect when already disconnected
        assert!(sm.disconnect().is_err());

        sm.start_connecting().unwrap();
        // Cannot start connecting twice
        assert!(sm.start_connecting().is_err());
    }
}
