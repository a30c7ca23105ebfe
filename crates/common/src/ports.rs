//! Port/protocol table driving per-domain fan-out

use crate::types::{ProbeTarget, Protocol};

/// Ports probed when none are configured.
pub const DEFAULT_PORTS: [u16; 2] = [80, 443];

/// Ordered list of (port, protocol) pairs probed for every domain.
///
/// 80 maps to http and 443 to https. Any other port is probed with both
/// protocols, http first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortTable {
    entries: Vec<(u16, Protocol)>,
}

impl PortTable {
    pub fn from_ports(ports: &[u16]) -> Self {
        let mut entries = Vec::with_capacity(ports.len() * 2);
        for &port in ports {
            match port {
                80 => entries.push((port, Protocol::Http)),
                443 => entries.push((port, Protocol::Https)),
                _ => {
                    entries.push((port, Protocol::Http));
                    entries.push((port, Protocol::Https));
                }
            }
        }
        Self { entries }
    }

    #[inline]
    pub fn entries(&self) -> &[(u16, Protocol)] {
        &self.entries
    }

    /// Number of probers spawned per domain.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every probe target for `domain`, in table order.
    pub fn targets_for<'a>(&'a self, domain: &'a str) -> impl Iterator<Item = ProbeTarget> + 'a {
        self.entries
            .iter()
            .map(move |&(port, protocol)| ProbeTarget::new(domain, port, protocol))
    }
}

impl Default for PortTable {
    fn default() -> Self {
        Self::from_ports(&DEFAULT_PORTS)
    }
}
