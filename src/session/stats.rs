//! Connection Display Helpers
//!
//! Traffic counters and the aggregated status snapshot the shell
//! renders on the status card. The simulated tunnel moves no packets,
//! so traffic values stay at their zeroed defaults.

use serde::{Deserialize, Serialize};

use crate::catalog::Server;

use super::state::ConnectionStatus;

/// Simulated throughput readouts, in Mbit/s
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficStats {
    pub down_mbps: u64,
    pub up_mbps: u64,
}

/// Format a connection duration as zero-padded `HH:MM:SS`
pub fn format_connection_time(secs: u64) -> String {
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let rem_secs = secs % 60;
    format!("{:02}:{:02}:{:02}", hours, mins, rem_secs)
}

/// Frontend-friendly aggregate of everything the status card shows
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub status: ConnectionStatus,
    pub server_id: Option<String>,
    pub server_country: Option<String>,
    pub server_flag: Option<String>,
    pub traffic: TrafficStats,
    pub uptime_secs: u64,
    pub uptime_formatted: String,
}

impl StatusSnapshot {
    pub fn new(
        status: ConnectionStatus,
        server: Option<&Server>,
        traffic: TrafficStats,
        uptime_secs: u64,
    ) -> Self {
        Self {
            status,
            server_id: server.map(|s| s.id.clone()),
            server_country: server.map(|s| s.country.clone()),
            server_flag: server.map(|s| s.flag.clone()),
            traffic,
            uptime_secs,
            uptime_formatted: format_connection_time(uptime_secs),
        }
    }
}
