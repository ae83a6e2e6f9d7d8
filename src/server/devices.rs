//! Tracking of client devices that have talked to the server.

use std::collections::BTreeSet;
use std::net::IpAddr;

use tokio::sync::RwLock;

/// Set of client addresses seen since startup.
///
/// Addresses are never removed, so the set only grows for the lifetime of
/// the process. The server's own address is never recorded.
#[derive(Debug)]
pub struct DeviceTracker {
    server_ip: IpAddr,
    devices: RwLock<BTreeSet<IpAddr>>,
}

impl DeviceTracker {
    /// Create an empty tracker that ignores `server_ip`.
    pub fn new(server_ip: IpAddr) -> Self {
        Self {
            server_ip,
            devices: RwLock::new(BTreeSet::new()),
        }
    }

    /// Record a client address. Returns `true` if it was not seen before.
    pub async fn record(&self, ip: IpAddr) -> bool {
        if ip == self.server_ip {
            return false;
        }
        // Fast path: most requests come from known devices
        if self.devices.read().await.contains(&ip) {
            return false;
        }
        self.devices.write().await.insert(ip)
    }

    /// All recorded addresses, sorted.
    pub async fn snapshot(&self) -> Vec<IpAddr> {
        self.devices.read().await.iter().copied().collect()
    }

    /// Number of recorded devices.
    pub async fn len(&self) -> usize {
        self.devices.read().await.len()
    }

    /// Whether no devices have been recorded.
    pub async fn is_empty(&self) -> bool {
        self.devices.read().await.is_empty()
    }
}
