use super::IdName;
use serde::{Deserialize, Serialize};

/// Enumerated field Netris returns as a value and a display label
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub label: String,
}

/// NAT rule
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nat {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub comment: String,
    /// enabled or disabled
    #[serde(default)]
    pub state: Choice,
    #[serde(default)]
    pub site: IdName,
    /// SNAT, DNAT, MASQUERADE or ACCEPT
    #[serde(default)]
    pub action: Choice,
    /// all, tcp, udp or icmp
    #[serde(default)]
    pub protocol: Choice,
    #[serde(default)]
    pub source_address: String,
    #[serde(default)]
    pub source_port: String,
    #[serde(default)]
    pub destination_address: String,
    #[serde(default)]
    pub destination_port: String,
    #[serde(default)]
    pub snat_to_ip: String,
    #[serde(default)]
    pub snat_to_pool: String,
    #[serde(default)]
    pub dnat_to_ip: String,
    #[serde(default)]
    pub dnat_to_port: u16,
}

impl Nat {
    /// Action as written on create. Netris reports `ACCEPT_SNAT` as `ACCEPT`.
    pub fn action_name(&self) -> &str {
        match self.action.label.as_str() {
            "ACCEPT" => "ACCEPT_SNAT",
            label => label,
        }
    }

    /// Ports only matter for TCP and UDP rules
    pub fn has_ports(&self) -> bool {
        matches!(self.protocol.value.as_str(), "tcp" | "udp")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nat_from_list_reply() {
        let nat: Nat = serde_json::from_value(json!({
            "id": 8,
            "name": "web-dnat",
            "state": {"value": "enabled", "label": "Enabled"},
            "site": {"id": 1, "name": "santa-clara"},
            "action": {"value": "accept", "label": "ACCEPT"},
            "protocol": {"value": "tcp", "label": "TCP"},
            "destinationAddress": "203.0.113.10",
            "destinationPort": "443",
            "dnatToPort": 8443
        }))
        .unwrap();

        assert_eq!(nat.action_name(), "ACCEPT_SNAT");
        assert!(nat.has_ports());
        assert_eq!(nat.destination_port, "443");
        assert_eq!(nat.dnat_to_port, 8443);
        assert_eq!(nat.source_address, "");
    }
}
