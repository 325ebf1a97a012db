use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PING_COUNT: u32 = 4;

/// Loss figure NX-OS prints when no echo reply came back.
pub const TOTAL_LOSS: &str = "100.00%";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl Protocol {
    pub fn scheme(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            other => Err(format!("unknown protocol '{}' (expected http or https)", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialRef {
    pub name: String,
}

impl Default for CredentialRef {
    fn default() -> Self {
        Self {
            name: "default".into(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Credential {
    UserPassword { username: String, password: String },
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::UserPassword { username, .. } => f
                .debug_struct("UserPassword")
                .field("username", username)
                .field("password", &"******")
                .finish(),
        }
    }
}

/// A switch with NX-API enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    pub mgmt_address: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default)]
    pub credential: Option<CredentialRef>,
}

impl Device {
    pub fn nxapi_url(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{}/ins", self.protocol, self.mgmt_address, port),
            None => format!("{}://{}/ins", self.protocol, self.mgmt_address),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PingRequest {
    pub dest: String,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub vrf: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

fn default_count() -> u32 {
    DEFAULT_PING_COUNT
}

impl PingRequest {
    pub fn new(dest: impl Into<String>) -> Self {
        Self {
            dest: dest.into(),
            count: DEFAULT_PING_COUNT,
            vrf: None,
            source: None,
        }
    }

    /// `ping <dest> [vrf <v>] [count <n>] [source <s>]`
    pub fn command(&self) -> String {
        let mut command = format!("ping {}", self.dest);
        let count = self.count.to_string();
        let options = [
            ("vrf", self.vrf.as_deref()),
            ("count", Some(count.as_str())),
            ("source", self.source.as_deref()),
        ];
        for (keyword, value) in options {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                command.push_str(&format!(" {} {}", keyword, value));
            }
        }
        command
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PingSummary {
    #[serde(rename = "packets_tx")]
    pub packets_transmitted: String,
    #[serde(rename = "packets_rx")]
    pub packets_received: String,
    #[serde(rename = "packet_loss")]
    pub packet_loss_percent: String,
}

impl PingSummary {
    pub fn is_total_loss(&self) -> bool {
        self.packet_loss_percent == TOTAL_LOSS
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RttStats {
    pub min: Option<String>,
    pub avg: Option<String>,
    pub max: Option<String>,
}

impl RttStats {
    pub fn unavailable() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PingResult {
    pub lines: Vec<String>,
    pub summary: PingSummary,
    pub rtt: RttStats,
}

impl PingResult {
    /// First line of the device transcript, e.g. `PING 8.8.8.8 (8.8.8.8): 56 data bytes`.
    pub fn action(&self) -> &str {
        self.lines.first().map(String::as_str).unwrap_or_default()
    }
}

/// Task output: what a caller renders after one ping.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PingReport {
    pub command: String,
    pub action: String,
    pub dest: String,
    #[serde_as(as = "DisplayFromStr")]
    pub count: u32,
    #[serde(flatten)]
    pub summary: PingSummary,
    pub rtt: RttStats,
}

impl PingReport {
    pub fn new(request: &PingRequest, command: String, result: PingResult) -> Self {
        Self {
            command,
            action: result.action().to_string(),
            dest: request.dest.clone(),
            count: request.count,
            summary: result.summary,
            rtt: result.rtt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_includes_only_set_options() {
        let mut request = PingRequest::new("8.8.8.8");
        assert_eq!(request.command(), "ping 8.8.8.8 count 4");

        request.count = 8;
        request.vrf = Some("management".into());
        assert_eq!(request.command(), "ping 8.8.8.8 vrf management count 8");

        request.source = Some("10.1.1.1".into());
        assert_eq!(
            request.command(),
            "ping 8.8.8.8 vrf management count 8 source 10.1.1.1"
        );
    }

    #[test]
    fn nxapi_url_uses_protocol_and_port() {
        let mut device = Device {
            name: "n9k-1".into(),
            mgmt_address: "10.0.0.5".into(),
            port: None,
            protocol: Protocol::Http,
            credential: None,
        };
        assert_eq!(device.nxapi_url(), "http://10.0.0.5/ins");

        device.protocol = Protocol::Https;
        device.port = Some(8443);
        assert_eq!(device.nxapi_url(), "https://10.0.0.5:8443/ins");
    }

    #[test]
    fn protocol_parses_case_insensitively() {
        assert_eq!("HTTPS".parse::<Protocol>().unwrap(), Protocol::Https);
        assert!("telnet".parse::<Protocol>().is_err());
    }
}
