//! LAN address discovery.

use std::io;
use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Public address used only to let the OS pick a source interface.
/// UDP `connect` sends nothing on the wire.
const PROBE_ADDR: (Ipv4Addr, u16) = (Ipv4Addr::new(8, 8, 8, 8), 80);

/// Discover the address other LAN devices can reach this machine on.
///
/// Falls back to loopback when there is no usable route (offline machines,
/// sandboxes).
pub fn lan_ip() -> IpAddr {
    match detect_lan_ip() {
        Ok(ip) if !ip.is_unspecified() => ip,
        Ok(ip) => {
            tracing::warn!(%ip, "LAN address lookup returned an unspecified address, using loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not determine LAN address, using loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

fn detect_lan_ip() -> io::Result<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.connect(PROBE_ADDR)?;
    Ok(socket.local_addr()?.ip())
}

/// Format the browser URL for a host and port.
pub fn server_url(ip: IpAddr, port: u16) -> String {
    match ip {
        IpAddr::V4(v4) => format!("http://{}:{}", v4, port),
        IpAddr::V6(v6) => format!("http://[{}]:{}", v6, port),
    }
}
