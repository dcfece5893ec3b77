// Network helpers for the startup banner.

use std::net::IpAddr;

use if_addrs::get_if_addrs;

pub fn local_ipv4_addrs() -> Vec<IpAddr> {
    let Ok(ifaces) = get_if_addrs() else {
        return Vec::new();
    };
    ifaces
        .into_iter()
        .filter_map(|iface| match iface.addr {
            if_addrs::IfAddr::V4(v4) if !v4.ip.is_loopback() => Some(IpAddr::V4(v4.ip)),
            _ => None,
        })
        .collect()
}
