//! Node configuration. Every field is a hard-coded default; loading from
//! CLI flags, environment variables, or config files is left to callers.

use std::net::SocketAddr;
use std::time::Duration;

/// The IP/port window a node sweeps to discover peers, and the per-probe
/// connect timeout.
///
/// Defaults are sized for a single-host demo mesh that differs only by
/// port, mirroring the reference node's scan window.
#[derive(Clone, Debug, PartialEq)]
pub struct PeerScanConfig {
    pub ip_start: u8,
    pub ip_end: u8,
    pub port_start: u16,
    pub port_end: u16,
    pub connect_timeout: Duration,
}

impl Default for PeerScanConfig {
    fn default() -> Self {
        Self {
            ip_start: 0,
            ip_end: 0,
            port_start: 5000,
            port_end: 5003,
            connect_timeout: Duration::from_secs(1),
        }
    }
}

/// Top-level configuration for a single node process.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeConfig {
    pub listen_addr: SocketAddr,
    pub difficulty: usize,
    pub mining_reward: f32,
    pub mining_reward_sender: &'static str,
    pub mining_period: Duration,
    pub peer_sync_period: Duration,
    pub peer_scan: PeerScanConfig,
    pub peer_request_timeout: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            difficulty: 3,
            mining_reward: 1.0,
            mining_reward_sender: "THE BLOCKCHAIN",
            mining_period: Duration::from_secs(20),
            peer_sync_period: Duration::from_secs(20),
            peer_scan: PeerScanConfig::default(),
            peer_request_timeout: Duration::from_secs(5),
        }
    }
}
