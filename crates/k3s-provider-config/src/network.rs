//! Host network introspection
//!
//! The proxy deriver needs the node's own address so in-node traffic skips
//! the proxy. Enumeration is behind [`InterfaceSource`] so tests never touch
//! the host.

use std::net::{IpAddr, Ipv4Addr};

use tracing::{debug, warn};

#[cfg(test)]
use mockall::automock;

/// One address assigned to a network interface
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceAddr {
    /// Interface name (e.g., "eth0")
    pub name: String,
    /// Assigned address
    pub ip: IpAddr,
    /// Network prefix length
    pub prefix_len: u8,
}

impl InterfaceAddr {
    /// IPv4 address with its prefix length
    pub fn v4(name: impl Into<String>, ip: Ipv4Addr, prefix_len: u8) -> Self {
        Self {
            name: name.into(),
            ip: IpAddr::V4(ip),
            prefix_len,
        }
    }

    /// Address in `ip/prefix` form
    pub fn cidr(&self) -> String {
        format!("{}/{}", self.ip, self.prefix_len)
    }
}

/// Source of the host's interface addresses.
///
/// Implementations return addresses in the order the operating system
/// reports them.
#[cfg_attr(test, automock)]
pub trait InterfaceSource {
    /// Enumerate every address on every interface
    fn interface_addrs(&self) -> std::io::Result<Vec<InterfaceAddr>>;
}

/// Interface enumeration backed by the host's network stack
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemInterfaces;

impl InterfaceSource for SystemInterfaces {
    fn interface_addrs(&self) -> std::io::Result<Vec<InterfaceAddr>> {
        let addrs = if_addrs::get_if_addrs()?
            .into_iter()
            .map(|iface| {
                let (ip, prefix_len) = match &iface.addr {
                    if_addrs::IfAddr::V4(v4) => {
                        (IpAddr::V4(v4.ip), mask_bits(u32::from(v4.netmask)))
                    }
                    if_addrs::IfAddr::V6(v6) => {
                        (IpAddr::V6(v6.ip), mask_bits(u128::from(v6.netmask)))
                    }
                };
                InterfaceAddr {
                    name: iface.name,
                    ip,
                    prefix_len,
                }
            })
            .collect();
        Ok(addrs)
    }
}

fn mask_bits(mask: impl Into<u128>) -> u8 {
    mask.into().count_ones() as u8
}

/// First non-loopback IPv4 address in `ip/prefix` form.
///
/// Enumeration failure is not fatal: it is logged and treated as "no usable
/// interface".
pub fn first_node_address(source: &dyn InterfaceSource) -> Option<String> {
    let addrs = match source.interface_addrs() {
        Ok(addrs) => addrs,
        Err(e) => {
            warn!(error = %e, "failed to enumerate network interfaces");
            return None;
        }
    };

    let found = addrs
        .iter()
        .find(|a| matches!(a.ip, IpAddr::V4(v4) if !v4.is_loopback()));

    match found {
        Some(addr) => {
            debug!(interface = %addr.name, address = %addr.cidr(), "selected node address");
            Some(addr.cidr())
        }
        None => {
            warn!("no non-loopback IPv4 interface address found");
            None
        }
    }
}
