use analyzer_protocol::{aggregate_hosts, remote_host, ConnectionRecord, HostStats};

fn conn(remote: Option<&str>, protocol: Option<&str>, kind: Option<&str>) -> ConnectionRecord {
    ConnectionRecord {
        remote_address: remote.map(str::to_string),
        protocol: protocol.map(str::to_string),
        kind: kind.map(str::to_string),
        ..Default::default()
    }
}

#[test]
fn test_same_host_different_ports_grouped() {
    let input = vec![
        conn(Some("10.0.0.5:443"), Some("tcp"), Some("outgoing")),
        conn(Some("10.0.0.5:80"), Some("tcp"), Some("outgoing")),
    ];
    let hosts = aggregate_hosts(&input);
    assert_eq!(hosts.len(), 1);
    assert_eq!(hosts[0].address, "10.0.0.5");
    assert_eq!(hosts[0].connections.len(), 2);
    assert_eq!(hosts[0].protocols, vec!["TCP"]);
    assert_eq!(hosts[0].connection_types, vec!["outgoing"]);
}

#[test]
fn test_loopback_only_is_empty() {
    let input = vec![conn(Some("127.0.0.1:22"), Some("tcp"), None)];
    assert!(aggregate_hosts(&input).is_empty());
}

#[test]
fn test_protocol_and_type_sets_accumulate() {
    let input = vec![
        conn(Some("8.8.8.8"), Some("udp"), Some("incoming")),
        conn(Some("8.8.8.8"), Some("icmp"), Some("outgoing")),
    ];
    let hosts = aggregate_hosts(&input);
    assert_eq!(hosts.len(), 1);
    assert_eq!(hosts[0].protocols, vec!["UDP", "ICMP"]);
    assert_eq!(hosts[0].connection_types, vec!["incoming", "outgoing"]);
}

#[test]
fn test_mixed_input_keeps_first_seen_order() {
    let input = vec![
        conn(Some("N/A"), Some("tcp"), Some("outgoing")),
        conn(Some("203.0.113.9:443"), Some("tcp"), Some("outgoing")),
        conn(Some("0.0.0.0:0"), Some("tcp"), Some("incoming")),
        conn(Some("198.51.100.2:53"), Some("udp"), Some("outgoing")),
        conn(None, Some("tcp"), None),
        conn(Some("-"), None, None),
        conn(Some("203.0.113.9:8443"), Some("TCP"), Some("incoming")),
        conn(Some("*:*"), Some("udp"), None),
    ];
    let hosts = aggregate_hosts(&input);
    let addresses: Vec<&str> = hosts.iter().map(|h| h.address.as_str()).collect();
    assert_eq!(addresses, vec!["203.0.113.9", "198.51.100.2"]);
    assert_eq!(hosts[0].connections.len(), 2);
    assert_eq!(hosts[0].protocols, vec!["TCP"], "protocol case must collapse");
    assert!(hosts[0].has_incoming() && hosts[0].has_outgoing());
}

#[test]
fn test_stats_from_single_bidirectional_host() {
    let input = vec![
        conn(Some("8.8.8.8"), Some("udp"), Some("incoming")),
        conn(Some("8.8.8.8"), Some("icmp"), Some("outgoing")),
    ];
    let stats = HostStats::from_hosts(&aggregate_hosts(&input));
    assert_eq!(stats.unique_hosts, 1);
    assert_eq!(stats.with_incoming, 1);
    assert_eq!(stats.with_outgoing, 1);
}

#[test]
fn test_connections_borrow_input_records() {
    let input = vec![conn(Some("192.0.2.1:1"), Some("tcp"), Some("outgoing"))];
    let hosts = aggregate_hosts(&input);
    assert!(std::ptr::eq(hosts[0].connections[0], &input[0]));
}

#[test]
fn test_missing_protocol_and_type_leave_sets_empty() {
    let input = vec![conn(Some("192.0.2.7"), None, None)];
    let hosts = aggregate_hosts(&input);
    assert_eq!(hosts.len(), 1);
    assert!(hosts[0].protocols.is_empty());
    assert!(hosts[0].connection_types.is_empty());
}

// Deterministic generator for the property checks below.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next() as usize) % items.len()]
    }
}

const REMOTES: [&str; 12] = [
    "N/A",
    "-",
    "*:*",
    "0.0.0.0:0",
    "127.0.0.1:631",
    "10.0.0.1:443",
    "10.0.0.1:80",
    "10.0.0.2",
    "172.16.4.4:53",
    "example.net:22",
    ":9000",
    "",
];
const PROTOCOLS: [&str; 4] = ["tcp", "UDP", "icmp", ""];
const KINDS: [&str; 3] = ["incoming", "outgoing", ""];

fn generated(seed: u64, len: usize) -> Vec<ConnectionRecord> {
    let mut rng = Lcg(seed);
    (0..len)
        .map(|_| {
            let remote = rng.pick(&REMOTES);
            let protocol = rng.pick(&PROTOCOLS);
            let kind = rng.pick(&KINDS);
            conn(
                (rng.next() % 10 != 0).then_some(remote),
                (!protocol.is_empty()).then_some(protocol),
                (!kind.is_empty()).then_some(kind),
            )
        })
        .collect()
}

#[test]
fn test_property_distinct_hosts_bounded_by_valid_records() {
    for seed in 0..200 {
        let input = generated(seed, (seed % 40) as usize);
        let valid = input
            .iter()
            .filter(|c| remote_host(c.remote_address.as_deref()).is_some())
            .count();
        let hosts = aggregate_hosts(&input);
        assert!(hosts.len() <= valid, "seed {seed}: {} > {valid}", hosts.len());
        let grouped: usize = hosts.iter().map(|h| h.connections.len()).sum();
        assert_eq!(grouped, valid, "seed {seed}: every valid record counted once");
    }
}

#[test]
fn test_property_idempotent() {
    for seed in 0..100 {
        let input = generated(seed, 30);
        assert_eq!(aggregate_hosts(&input), aggregate_hosts(&input), "seed {seed}");
    }
}

#[test]
fn test_property_first_summary_matches_first_valid_record() {
    for seed in 0..200 {
        let input = generated(seed, 25);
        let first_valid = input
            .iter()
            .find_map(|c| remote_host(c.remote_address.as_deref()));
        let hosts = aggregate_hosts(&input);
        assert_eq!(
            hosts.first().map(|h| h.address.as_str()),
            first_valid,
            "seed {seed}"
        );
    }
}

#[test]
fn test_property_sentinels_only_is_empty() {
    let sentinels = [None, Some("N/A"), Some("-"), Some("*"), Some("0.0.0.0"), Some("127.0.0.1")];
    let mut rng = Lcg(7);
    let input: Vec<ConnectionRecord> = (0..64)
        .map(|_| {
            let remote = sentinels[(rng.next() as usize) % sentinels.len()];
            conn(remote, Some("tcp"), Some("incoming"))
        })
        .collect();
    assert!(aggregate_hosts(&input).is_empty());
}
