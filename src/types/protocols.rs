//! Protocol definitions
//!
//! Static lookup of protocol -> standard destination port and application
//! layer label, used by the flow generator for port assignment.

use serde::{Deserialize, Serialize};

/// Protocols a simulated flow can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
    Icmp,
    Http,
    Https,
    Dns,
    Ssh,
    Rdp,
    Ftp,
    Smtp,
    Modbus,
    Dnp3,
}

impl Protocol {
    /// All known protocols, in table order
    pub const ALL: [Protocol; 12] = [
        Protocol::Tcp,
        Protocol::Udp,
        Protocol::Icmp,
        Protocol::Http,
        Protocol::Https,
        Protocol::Dns,
        Protocol::Ssh,
        Protocol::Rdp,
        Protocol::Ftp,
        Protocol::Smtp,
        Protocol::Modbus,
        Protocol::Dnp3,
    ];

    /// Standard destination port for this protocol
    pub fn standard_port(self) -> u16 {
        match self {
            Protocol::Tcp => 443,
            Protocol::Udp => 53,
            Protocol::Icmp => 0,
            Protocol::Http => 80,
            Protocol::Https => 443,
            Protocol::Dns => 53,
            Protocol::Ssh => 22,
            Protocol::Rdp => 3389,
            Protocol::Ftp => 21,
            Protocol::Smtp => 25,
            Protocol::Modbus => 502,
            Protocol::Dnp3 => 20000,
        }
    }

    /// Human-readable application layer label
    pub fn application_layer(self) -> &'static str {
        match self {
            Protocol::Tcp => "Generic TCP",
            Protocol::Udp => "Generic UDP",
            Protocol::Icmp => "ICMP Echo",
            Protocol::Http => "Web Traffic",
            Protocol::Https => "Encrypted Web",
            Protocol::Dns => "Domain Resolution",
            Protocol::Ssh => "Secure Shell",
            Protocol::Rdp => "Remote Desktop",
            Protocol::Ftp => "File Transfer",
            Protocol::Smtp => "Email",
            Protocol::Modbus => "Industrial Control",
            Protocol::Dnp3 => "SCADA Protocol",
        }
    }

    /// Application-layer protocols draw their source port from the
    /// ephemeral range; everything else uses the full 16-bit space.
    pub fn uses_ephemeral_source_port(self) -> bool {
        matches!(
            self,
            Protocol::Http
                | Protocol::Https
                | Protocol::Dns
                | Protocol::Ssh
                | Protocol::Ftp
                | Protocol::Smtp
        )
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "TCP"),
            Protocol::Udp => write!(f, "UDP"),
            Protocol::Icmp => write!(f, "ICMP"),
            Protocol::Http => write!(f, "HTTP"),
            Protocol::Https => write!(f, "HTTPS"),
            Protocol::Dns => write!(f, "DNS"),
            Protocol::Ssh => write!(f, "SSH"),
            Protocol::Rdp => write!(f, "RDP"),
            Protocol::Ftp => write!(f, "FTP"),
            Protocol::Smtp => write!(f, "SMTP"),
            Protocol::Modbus => write!(f, "MODBUS"),
            Protocol::Dnp3 => write!(f, "DNP3"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_ports() {
        assert_eq!(Protocol::Https.standard_port(), 443);
        assert_eq!(Protocol::Dns.standard_port(), 53);
        assert_eq!(Protocol::Modbus.standard_port(), 502);
        assert_eq!(Protocol::Dnp3.standard_port(), 20000);
    }

    #[test]
    fn test_ephemeral_port_rule() {
        assert!(Protocol::Https.uses_ephemeral_source_port());
        assert!(Protocol::Smtp.uses_ephemeral_source_port());
        assert!(!Protocol::Rdp.uses_ephemeral_source_port());
        assert!(!Protocol::Modbus.uses_ephemeral_source_port());
    }

    #[test]
    fn test_display_roundtrip() {
        for proto in Protocol::ALL {
            let json = serde_json::to_string(&proto).unwrap();
            assert_eq!(json, format!("\"{}\"", proto));
        }
    }
}
