//! Peer discovery by TCP scan over an IPv4 `/24`-style address window.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::PeerScanConfig;

/// Discovers reachable peers. Implementations are expected to exclude the
/// caller's own address from the result.
///
/// Split out as a trait so [`crate::peers::PeerDirectory`] can be tested
/// without binding real sockets, the same "swap the concrete dependency
/// for a trait" move used elsewhere in this codebase for pluggable
/// collaborators.
#[async_trait::async_trait]
pub trait PeerScanner: Send + Sync {
    async fn scan(&self, self_addr: SocketAddr, window: &PeerScanConfig) -> Vec<String>;
}

/// Scans `self_addr`'s `/24`-style neighborhood by attempting a TCP
/// connect to each `(ip_offset, port)` pair in the configured window.
///
/// For each IPv4 address `a.b.c.d`, the scan holds `a.b.c` fixed and
/// varies the last octet by `ip_offset` in `[ip_start..=ip_end]`; for
/// every resulting host it tries every port in
/// `[port_start..=port_end]`. A candidate is included iff the connect
/// succeeds within `connect_timeout` and the resulting `host:port` is not
/// `self_addr` itself.
pub struct TcpPeerScanner;

#[async_trait::async_trait]
impl PeerScanner for TcpPeerScanner {
    async fn scan(&self, self_addr: SocketAddr, window: &PeerScanConfig) -> Vec<String> {
        let std::net::IpAddr::V4(self_ip) = self_addr.ip() else {
            tracing::warn!("peer scan only supports IPv4 self-addresses");
            return Vec::new();
        };
        let octets = self_ip.octets();
        let self_target = self_addr.to_string();

        let mut found = Vec::new();
        for ip_offset in window.ip_start..=window.ip_end {
            let last_octet = octets[3].wrapping_add(ip_offset);
            let host = format!("{}.{}.{}.{}", octets[0], octets[1], octets[2], last_octet);

            for port in window.port_start..=window.port_end {
                let target = format!("{host}:{port}");
                if target == self_target {
                    continue;
                }
                if is_reachable(&target, window.connect_timeout).await {
                    found.push(target);
                } else {
                    tracing::debug!(target = %target, "peer probe failed");
                }
            }
        }
        found
    }
}

async fn is_reachable(target: &str, connect_timeout: Duration) -> bool {
    matches!(
        timeout(connect_timeout, TcpStream::connect(target)).await,
        Ok(Ok(_))
    )
}
