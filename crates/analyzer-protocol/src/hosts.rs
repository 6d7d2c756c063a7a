//! Unique remote hosts contacted by a report's connections.
//!
//! Records are grouped by the host part of `remote_address` (text before the
//! first `:`). Records without a real remote peer are skipped. Summaries come
//! out in the order their address was first seen.

use std::collections::HashMap;

use crate::constants::{
    DIRECTION_INCOMING, DIRECTION_OUTGOING, EXCLUDED_HOSTS, EXCLUDED_REMOTE_ADDRESSES,
};
use crate::types::ConnectionRecord;

/// All connections of one report that reached the same remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSummary<'a> {
    pub address: String,
    /// Matching records, in input order.
    pub connections: Vec<&'a ConnectionRecord>,
    /// Uppercased protocol names, first-seen order, no duplicates.
    pub protocols: Vec<String>,
    /// Raw `type` values, first-seen order, no duplicates.
    pub connection_types: Vec<String>,
}

impl<'a> HostSummary<'a> {
    fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            connections: Vec::new(),
            protocols: Vec::new(),
            connection_types: Vec::new(),
        }
    }

    fn record(&mut self, conn: &'a ConnectionRecord) {
        self.connections.push(conn);
        if let Some(protocol) = conn.protocol.as_deref() {
            insert_unique(&mut self.protocols, protocol.to_uppercase());
        }
        if let Some(kind) = conn.kind.as_deref() {
            insert_unique(&mut self.connection_types, kind.to_string());
        }
    }

    pub fn has_type(&self, kind: &str) -> bool {
        self.connection_types.iter().any(|k| k == kind)
    }

    pub fn has_incoming(&self) -> bool {
        self.has_type(DIRECTION_INCOMING)
    }

    pub fn has_outgoing(&self) -> bool {
        self.has_type(DIRECTION_OUTGOING)
    }
}

fn insert_unique(set: &mut Vec<String>, value: String) {
    if !set.contains(&value) {
        set.push(value);
    }
}

/// Host key of a remote address, or `None` when it names no real peer.
pub fn remote_host(remote_address: Option<&str>) -> Option<&str> {
    let remote = remote_address?;
    if EXCLUDED_REMOTE_ADDRESSES.contains(&remote) {
        return None;
    }
    let address = match remote.split_once(':') {
        Some((host, _)) => host,
        None => remote,
    };
    if address.is_empty() || EXCLUDED_HOSTS.contains(&address) {
        return None;
    }
    Some(address)
}

/// Group connections by remote host. Pure; the input is only borrowed.
pub fn aggregate_hosts(connections: &[ConnectionRecord]) -> Vec<HostSummary<'_>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut hosts: Vec<HostSummary<'_>> = Vec::new();

    for conn in connections {
        let Some(address) = remote_host(conn.remote_address.as_deref()) else {
            continue;
        };
        let slot = *index.entry(address).or_insert_with(|| {
            hosts.push(HostSummary::new(address));
            hosts.len() - 1
        });
        hosts[slot].record(conn);
    }

    hosts
}

/// Counters over a set of host summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostStats {
    pub unique_hosts: usize,
    pub with_incoming: usize,
    pub with_outgoing: usize,
}

impl HostStats {
    pub fn from_hosts(hosts: &[HostSummary<'_>]) -> Self {
        Self {
            unique_hosts: hosts.len(),
            with_incoming: hosts.iter().filter(|h| h.has_incoming()).count(),
            with_outgoing: hosts.iter().filter(|h| h.has_outgoing()).count(),
        }
    }
}
