//! Session View-Model
//!
//! The single behavior-bearing component of the client: owns connection
//! status, server selection, and the favorite set over an injected
//! read-only catalog, and exposes the four operations the shell drives
//! (connect/disconnect toggle, server selection, favorite toggle,
//! favorites query).
//!
//! Connection establishment is simulated: a `Disconnected -> Connecting`
//! transition spawns exactly one one-shot timer task that completes the
//! handshake after `connect_delay`. Disconnecting while still Connecting
//! cancels the pending completion — each connect attempt carries an id,
//! and a timer whose attempt id no longer matches is dropped.
//!
//! # Invariants
//! - `selected`, once set, always names an id present in the catalog
//! - favorites are a pure string set; ids are never validated
//! - locks are never held across an await or an event send

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::catalog::{Catalog, Server};

use super::events::SessionEvent;
use super::state::{ConnectionStateMachine, ConnectionStatus};
use super::stats::{StatusSnapshot, TrafficStats};

/// Simulated handshake delay of the reference build
pub const DEFAULT_CONNECT_DELAY: Duration = Duration::from_millis(2000);

/// Broadcast buffer; a stalled subscriber lags, it never blocks mutation
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Session errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("Unknown server id: {id}")]
    UnknownServer { id: String },
}

/// Tunables the shell injects at startup
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long the simulated handshake takes
    pub connect_delay: Duration,
    /// Favorites pre-seeded by the shell; may hold any ids
    pub seeded_favorites: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_delay: DEFAULT_CONNECT_DELAY,
            seeded_favorites: Vec::new(),
        }
    }
}

impl SessionConfig {
    /// The reference build's configuration (2 s delay, two seeded favorites)
    pub fn reference() -> Self {
        Self {
            connect_delay: DEFAULT_CONNECT_DELAY,
            seeded_favorites: vec!["usa-ny".to_string(), "uk-london".to_string()],
        }
    }
}

/// Mutable session state, guarded by one lock
struct SessionInner {
    machine: ConnectionStateMachine,
    selected: Option<String>,
    favorites: HashSet<String>,
    /// Bumped on every Disconnected -> Connecting transition; a pending
    /// timer only completes if its captured value still matches
    connect_attempt: u64,
    connected_at: Option<DateTime<Utc>>,
    traffic: TrafficStats,
}

/// The session view-model. One instance per application, created by the
/// shell at startup and discarded on shutdown; no state persists.
///
/// Cheap to clone via the internal `Arc`s; `toggle_connection` must be
/// called from within a Tokio runtime (it spawns the connect timer).
pub struct SessionViewModel {
    catalog: Arc<Catalog>,
    inner: Arc<RwLock<SessionInner>>,
    events: broadcast::Sender<SessionEvent>,
    connect_delay: Duration,
}

impl SessionViewModel {
    pub fn new(catalog: Arc<Catalog>, config: SessionConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            catalog,
            inner: Arc::new(RwLock::new(SessionInner {
                machine: ConnectionStateMachine::new(),
                selected: None,
                favorites: config.seeded_favorites.into_iter().collect(),
                connect_attempt: 0,
                connected_at: None,
                traffic: TrafficStats::default(),
            })),
            events,
            connect_delay: config.connect_delay,
        }
    }

    /// Connect/disconnect button handler.
    ///
    /// From `Disconnected`: moves to `Connecting` and schedules the
    /// simulated handshake. From `Connecting` or `Connected`: drops to
    /// `Disconnected` immediately, leaving the selection untouched; a
    /// handshake still in flight is cancelled.
    pub fn toggle_connection(&self) {
        let (status, pending_attempt) = {
            let mut inner = self.inner.write();
            match inner.machine.status() {
                ConnectionStatus::Disconnected => {
                    // Status was just checked, the transition cannot fail
                    let _ = inner.machine.start_connecting();
                    inner.connect_attempt += 1;
                    (inner.machine.status(), Some(inner.connect_attempt))
                }
                ConnectionStatus::Connecting | ConnectionStatus::Connected => {
                    let _ = inner.machine.disconnect();
                    inner.connected_at = None;
                    (inner.machine.status(), None)
                }
            }
        };

        self.emit(SessionEvent::StatusChanged { status });

        if let Some(attempt) = pending_attempt {
            self.spawn_connect_timer(attempt);
        }
    }

    /// Select a catalog server, in any connection status.
    ///
    /// Unknown ids are reported as `SessionError::UnknownServer` and
    /// leave the session unchanged.
    pub fn select_server(&self, id: &str) -> Result<(), SessionError> {
        if !self.catalog.contains(id) {
            warn!(id, "selection rejected: unknown server id");
            return Err(SessionError::UnknownServer { id: id.to_string() });
        }

        self.inner.write().selected = Some(id.to_string());
        self.emit(SessionEvent::ServerSelected { id: id.to_string() });
        Ok(())
    }

    /// Pure set-membership toggle; the id is not validated against the
    /// catalog. Returns whether the id is now a favorite.
    pub fn toggle_favorite(&self, id: &str) -> bool {
        let favorite = {
            let mut inner = self.inner.write();
            if inner.favorites.remove(id) {
                false
            } else {
                inner.favorites.insert(id.to_string());
                true
            }
        };

        self.emit(SessionEvent::FavoriteToggled {
            id: id.to_string(),
            favorite,
        });
        favorite
    }

    /// Catalog entries currently marked favorite, in catalog order
    pub fn favorite_servers(&self) -> Vec<Server> {
        let inner = self.inner.read();
        self.catalog
            .servers()
            .iter()
            .filter(|s| inner.favorites.contains(&s.id))
            .cloned()
            .collect()
    }

    /// Current connection status
    pub fn status(&self) -> ConnectionStatus {
        self.inner.read().machine.status()
    }

    /// The currently selected server, if any
    pub fn selected_server(&self) -> Option<Server> {
        let inner = self.inner.read();
        inner
            .selected
            .as_deref()
            .and_then(|id| self.catalog.get(id))
            .cloned()
    }

    /// Snapshot of the favorite id set
    pub fn favorites(&self) -> HashSet<String> {
        self.inner.read().favorites.clone()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.inner.read().favorites.contains(id)
    }

    /// The injected catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// When the current connection was established
    pub fn connected_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().connected_at
    }

    /// Seconds since the current connection was established (0 if not connected)
    pub fn uptime_secs(&self) -> u64 {
        self.inner
            .read()
            .connected_at
            .map(|t| (Utc::now() - t).num_seconds().max(0) as u64)
            .unwrap_or(0)
    }

    /// Everything the status card renders, in one read
    pub fn snapshot(&self) -> StatusSnapshot {
        let inner = self.inner.read();
        let server = inner
            .selected
            .as_deref()
            .and_then(|id| self.catalog.get(id));
        let uptime_secs = inner
            .connected_at
            .map(|t| (Utc::now() - t).num_seconds().max(0) as u64)
            .unwrap_or(0);
        StatusSnapshot::new(inner.machine.status(), server, inner.traffic, uptime_secs)
    }

    /// Subscribe to state mutation events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn spawn_connect_timer(&self, attempt: u64) {
        let catalog = Arc::clone(&self.catalog);
        let inner = Arc::clone(&self.inner);
        let events = self.events.clone();
        let delay = self.connect_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let applied = {
                let mut guard = inner.write();
                if guard.connect_attempt != attempt {
                    debug!(attempt, "dropping connect timer from a superseded attempt");
                    false
                } else if guard.machine.connect_success().is_err() {
                    // Disconnected (or already connected) in the meantime
                    debug!(
                        status = %guard.machine.status(),
                        "dropping connect timer, session left Connecting"
                    );
                    false
                } else {
                    if guard.selected.is_none() {
                        // Fallback so the connected view always has a server
                        // to display; stays None for an empty catalog
                        guard.selected = catalog.first().map(|s| s.id.clone());
                    }
                    guard.connected_at = Some(Utc::now());
                    true
                }
            };

            if applied {
                let _ = events.send(SessionEvent::StatusChanged {
                    status: ConnectionStatus::Connected,
                });
            }
        });
    }

    fn emit(&self, event: SessionEvent) {
        // Fire-and-forget; Err just means nobody is subscribed
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    fn reference_vm() -> SessionViewModel {
        let catalog = Arc::new(catalog::reference_catalog().unwrap());
        SessionViewModel::new(catalog, SessionConfig::default())
    }

    /// Let the paused clock run past the connect delay and give the
    /// spawned timer task a chance to complete
    async fn wait_past_delay() {
        tokio::time::sleep(DEFAULT_CONNECT_DELAY + Duration::from_millis(10)).await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn connecting_is_immediate() {
        let vm = reference_vm();
        assert_eq!(vm.status(), ConnectionStatus::Disconnected);

        vm.toggle_connection();
        assert_eq!(vm.status(), ConnectionStatus::Connecting);
        assert!(vm.selected_server().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn connect_reaches_connected_after_delay() {
        let vm = reference_vm();
        vm.toggle_connection();
        wait_past_delay().await;

        assert_eq!(vm.status(), ConnectionStatus::Connected);
        assert!(vm.connected_at().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn first_connect_assigns_default_server() {
        let vm = reference_vm();
        vm.toggle_connection();
        wait_past_delay().await;

        let selected = vm.selected_server().unwrap();
        assert_eq!(selected.id, vm.catalog().first().unwrap().id);
        assert_eq!(selected.id, "usa-ny");
    }

    #[tokio::test(start_paused = true)]
    async fn prior_selection_survives_connect() {
        let vm = reference_vm();
        vm.select_server("de-berlin").unwrap();

        vm.toggle_connection();
        wait_past_delay().await;

        assert_eq!(vm.status(), ConnectionStatus::Connected);
        assert_eq!(vm.selected_server().unwrap().id, "de-berlin");
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_from_connected_keeps_selection() {
        let vm = reference_vm();
        vm.toggle_connection();
        wait_past_delay().await;
        assert_eq!(vm.status(), ConnectionStatus::Connected);

        vm.toggle_connection();
        assert_eq!(vm.status(), ConnectionStatus::Disconnected);
        assert_eq!(vm.selected_server().unwrap().id, "usa-ny");
        assert!(vm.connected_at().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_during_connecting_cancels_pending_timer() {
        let vm = reference_vm();
        vm.toggle_connection();
        assert_eq!(vm.status(), ConnectionStatus::Connecting);

        vm.toggle_connection();
        assert_eq!(vm.status(), ConnectionStatus::Disconnected);

        // The scheduled handshake must not resurrect the connection
        wait_past_delay().await;
        assert_eq!(vm.status(), ConnectionStatus::Disconnected);
        assert!(vm.selected_server().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn reconnect_after_cancel_still_completes() {
        let vm = reference_vm();
        vm.toggle_connection();
        vm.toggle_connection();
        vm.toggle_connection();
        assert_eq!(vm.status(), ConnectionStatus::Connecting);

        wait_past_delay().await;
        assert_eq!(vm.status(), ConnectionStatus::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_catalog_connects_without_selection() {
        let catalog = Arc::new(crate::catalog::Catalog::new(Vec::new()).unwrap());
        let vm = SessionViewModel::new(catalog, SessionConfig::default());

        vm.toggle_connection();
        wait_past_delay().await;

        assert_eq!(vm.status(), ConnectionStatus::Connected);
        assert!(vm.selected_server().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn select_server_sets_selection_in_any_status() {
        let vm = reference_vm();

        vm.select_server("jp-tokyo").unwrap();
        assert_eq!(vm.selected_server().unwrap().id, "jp-tokyo");

        vm.toggle_connection();
        vm.select_server("fr-paris").unwrap();
        assert_eq!(vm.selected_server().unwrap().id, "fr-paris");
        assert_eq!(vm.status(), ConnectionStatus::Connecting);

        wait_past_delay().await;
        vm.select_server("ca-toronto").unwrap();
        assert_eq!(vm.selected_server().unwrap().id, "ca-toronto");
        assert_eq!(vm.status(), ConnectionStatus::Connected);
    }

    #[test]
    fn select_server_rejects_unknown_id() {
        let catalog = Arc::new(catalog::reference_catalog().unwrap());
        let vm = SessionViewModel::new(catalog, SessionConfig::default());

        let err = vm.select_server("atlantis").unwrap_err();
        assert!(matches!(err, SessionError::UnknownServer { id } if id == "atlantis"));
        assert!(vm.selected_server().is_none());
        assert_eq!(vm.status(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn double_toggle_restores_favorites() {
        let catalog = Arc::new(catalog::reference_catalog().unwrap());
        let vm = SessionViewModel::new(catalog, SessionConfig::default());
        assert!(vm.favorites().is_empty());

        assert!(vm.toggle_favorite("sg-singapore"));
        assert!(vm.is_favorite("sg-singapore"));

        assert!(!vm.toggle_favorite("sg-singapore"));
        assert!(vm.favorites().is_empty());
    }

    #[test]
    fn seeded_favorites_scenario() {
        let catalog = Arc::new(catalog::reference_catalog().unwrap());
        let vm = SessionViewModel::new(catalog, SessionConfig::reference());

        let expected: HashSet<String> =
            ["usa-ny", "uk-london"].iter().map(|s| s.to_string()).collect();
        assert_eq!(vm.favorites(), expected);

        vm.toggle_favorite("usa-ny");
        let remaining: HashSet<String> =
            ["uk-london"].iter().map(|s| s.to_string()).collect();
        assert_eq!(vm.favorites(), remaining);

        vm.toggle_favorite("usa-ny");
        assert_eq!(vm.favorites(), expected);
    }

    #[test]
    fn favorites_query_preserves_catalog_order() {
        let catalog = Arc::new(catalog::reference_catalog().unwrap());
        let vm = SessionViewModel::new(catalog, SessionConfig::default());

        // Toggled in reverse catalog order on purpose
        vm.toggle_favorite("de-berlin");
        vm.toggle_favorite("usa-ny");

        let ids: Vec<_> = vm
            .favorite_servers()
            .iter()
            .map(|s| s.id.clone())
            .collect();
        assert_eq!(ids, ["usa-ny", "de-berlin"]);
    }

    #[test]
    fn favorites_may_hold_ids_outside_the_catalog() {
        let catalog = Arc::new(catalog::reference_catalog().unwrap());
        let vm = SessionViewModel::new(catalog, SessionConfig::default());

        assert!(vm.toggle_favorite("retired-server"));
        assert!(vm.is_favorite("retired-server"));
        // Not in the catalog, so never surfaced by the query
        assert!(vm.favorite_servers().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn status_changes_are_broadcast() {
        let vm = reference_vm();
        let mut rx = vm.subscribe();

        vm.toggle_connection();
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::StatusChanged {
                status: ConnectionStatus::Connecting
            }
        );

        wait_past_delay().await;
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::StatusChanged {
                status: ConnectionStatus::Connected
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_reflects_connected_state() {
        let vm = reference_vm();
        vm.toggle_connection();
        wait_past_delay().await;

        let snap = vm.snapshot();
        assert_eq!(snap.status, ConnectionStatus::Connected);
        assert_eq!(snap.server_id.as_deref(), Some("usa-ny"));
        assert_eq!(snap.server_flag.as_deref(), Some("🇺🇸"));
        assert_eq!(snap.traffic, TrafficStats::default());
    }
}
