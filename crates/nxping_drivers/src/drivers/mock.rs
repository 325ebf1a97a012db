use crate::CliDriver;
use anyhow::{bail, Result};
use async_trait::async_trait;
use nxping_model::Device;
use nxping_security::Login;
use tracing::info;

// Per-packet lines in a transcript; the summary still reports the full count.
const MAX_ECHO_LINES: u32 = 100;

/// Answers `ping` with canned NX-OS transcripts. The destination picks the outcome:
/// `fail` errors, `unreachable` loses every packet, `garbled` has no statistics block.
#[derive(Clone)]
pub struct MockDriver {
    label: &'static str,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self {
            label: "Mock Driver",
        }
    }
}

#[async_trait]
impl CliDriver for MockDriver {
    fn name(&self) -> &'static str {
        self.label
    }

    async fn run_cli(&self, device: &Device, _login: &Login, command: &str) -> Result<String> {
        info!(target: "drivers::mock", "[mock] device={} command={}", device.name, command);
        let mut words = command.split_whitespace();
        if words.next() != Some("ping") {
            bail!("% Invalid command at '^' marker.");
        }
        let dest = words.next().unwrap_or_default();
        let count = option_value(command, "count")
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(nxping_model::DEFAULT_PING_COUNT);

        match dest {
            "fail" => bail!("% Invalid host/interface {}", dest),
            "unreachable" => Ok(unreachable_transcript(dest, count)),
            "garbled" => Ok(format!("PING {dest} ({dest}): 56 data bytes\nRequest 0 timed out\n")),
            _ => Ok(reachable_transcript(dest, count)),
        }
    }
}

fn option_value<'a>(command: &'a str, keyword: &str) -> Option<&'a str> {
    let mut words = command.split_whitespace();
    words.find(|word| *word == keyword)?;
    words.next()
}

fn reachable_transcript(dest: &str, count: u32) -> String {
    let mut out = format!("PING {dest} ({dest}): 56 data bytes\n");
    for seq in 0..count.min(MAX_ECHO_LINES) {
        out.push_str(&format!(
            "64 bytes from {dest}: icmp_seq={seq} ttl=52 time=6.264 ms\n"
        ));
    }
    out.push_str(&format!("\n--- {dest} ping statistics ---\n"));
    out.push_str(&format!(
        "{count} packets transmitted, {count} packets received, 0.00% packet loss\n"
    ));
    out.push_str("round-trip min/avg/max = 5.978/6.264/6.564 ms\n");
    out
}

fn unreachable_transcript(dest: &str, count: u32) -> String {
    let mut out = format!("PING {dest} ({dest}): 56 data bytes\n");
    for seq in 0..count.min(MAX_ECHO_LINES) {
        out.push_str(&format!("Request {seq} timed out\n"));
    }
    out.push_str(&format!("\n--- {dest} ping statistics ---\n"));
    out.push_str(&format!(
        "{count} packets transmitted, 0 packets received, 100.00% packet loss\n"
    ));
    out
}
