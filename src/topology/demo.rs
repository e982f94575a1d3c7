// Built-in demo networks
//
// A small seven-node office network: perimeter router and firewall, an IDS,
// two servers and two workstations. The degraded variant takes the user
// workstation offline and is used to exercise full scene rebuilds.

use super::{NetworkNode, NodeCategory, NodeStatus};

/// The reference seven-node network
pub fn demo_network() -> Vec<NetworkNode> {
    vec![
        NetworkNode::new(
            "router-1",
            "Main Router",
            NodeCategory::Router,
            NodeStatus::Secure,
            [0.0, 0.0, 0.0],
        )
        .with_connections(["firewall-1", "ids-1"])
        .with_ip("192.168.1.1")
        .with_services(["DHCP", "DNS", "NAT"]),
        NetworkNode::new(
            "firewall-1",
            "Perimeter Firewall",
            NodeCategory::Firewall,
            NodeStatus::Secure,
            [-3.0, 2.0, 0.0],
        )
        .with_connections(["router-1", "server-1", "server-2"])
        .with_ip("192.168.1.10")
        .with_services(["IPS", "VPN", "Load Balancer"]),
        NetworkNode::new(
            "ids-1",
            "Intrusion Detection",
            NodeCategory::Ids,
            NodeStatus::Warning,
            [3.0, 2.0, 0.0],
        )
        .with_connections(["router-1", "server-1"])
        .with_ip("192.168.1.20")
        .with_services(["IDS", "Log Analysis"])
        .with_threats(3),
        NetworkNode::new(
            "server-1",
            "Web Server",
            NodeCategory::Server,
            NodeStatus::Secure,
            [-2.0, -2.0, 0.0],
        )
        .with_connections(["firewall-1", "ids-1", "workstation-1"])
        .with_ip("192.168.1.100")
        .with_services(["HTTP", "HTTPS", "SSH"]),
        NetworkNode::new(
            "server-2",
            "Database Server",
            NodeCategory::Server,
            NodeStatus::Compromised,
            [2.0, -2.0, 0.0],
        )
        .with_connections(["firewall-1", "workstation-2"])
        .with_ip("192.168.1.101")
        .with_services(["MySQL", "PostgreSQL"])
        .with_threats(5),
        NetworkNode::new(
            "workstation-1",
            "Admin Workstation",
            NodeCategory::Workstation,
            NodeStatus::Secure,
            [-4.0, -4.0, 0.0],
        )
        .with_connections(["server-1"])
        .with_ip("192.168.1.200")
        .with_services(["RDP", "SSH"]),
        NetworkNode::new(
            "workstation-2",
            "User Workstation",
            NodeCategory::Workstation,
            NodeStatus::Warning,
            [4.0, -4.0, 0.0],
        )
        .with_connections(["server-2"])
        .with_ip("192.168.1.201")
        .with_services(["RDP", "Browser"])
        .with_threats(2),
    ]
}

/// Same network with the user workstation taken offline
pub fn demo_network_degraded() -> Vec<NetworkNode> {
    demo_network()
        .into_iter()
        .map(|node| {
            if node.id.as_str() == "workstation-2" {
                NetworkNode {
                    status: NodeStatus::Offline,
                    services: vec!["RDP".to_string()],
                    threat_count: 0,
                    ..node
                }
            } else {
                node
            }
        })
        .collect()
}
