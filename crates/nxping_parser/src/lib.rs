//! Parser for the text transcript NX-OS returns for `ping`.
//!
//! ```text
//! PING 8.8.8.8 (8.8.8.8): 56 data bytes
//! 64 bytes from 8.8.8.8: icmp_seq=0 ttl=52 time=6.564 ms
//!
//! --- 8.8.8.8 ping statistics ---
//! 8 packets transmitted, 8 packets received, 0.00% packet loss
//! round-trip min/avg/max = 5.978/6.264/6.564 ms
//! ```

use nxping_model::{PingResult, PingSummary, RttStats, TOTAL_LOSS};
use thiserror::Error;

const STATISTICS_MARKER: &str = "---";
const RTT_UNIT_SUFFIX_LEN: usize = 3;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no ping statistics marker ('---') in device output")]
    MarkerNotFound,
    #[error("malformed ping summary line ({reason}): '{line}'")]
    MalformedSummary { line: String, reason: &'static str },
    #[error("malformed round-trip line ({reason}): '{line}'")]
    MalformedRtt { line: String, reason: &'static str },
}

pub fn parse(raw: &str) -> Result<PingResult, ParseError> {
    let lines: Vec<&str> = raw.split('\n').collect();
    let marker = find_statistics_marker_index(&lines)?;
    let summary = parse_summary(&lines, marker)?;
    let rtt = parse_rtt(&lines, &summary.packet_loss_percent, marker + 2)?;
    Ok(PingResult {
        lines: lines.into_iter().map(str::to_string).collect(),
        summary,
        rtt,
    })
}

/// Index of the statistics separator. When several lines carry `---` the last one wins.
pub fn find_statistics_marker_index(lines: &[&str]) -> Result<usize, ParseError> {
    lines
        .iter()
        .rposition(|line| line.contains(STATISTICS_MARKER))
        .ok_or(ParseError::MarkerNotFound)
}

pub fn parse_summary(lines: &[&str], marker: usize) -> Result<PingSummary, ParseError> {
    let line = lines
        .get(marker + 1)
        .copied()
        .ok_or_else(|| malformed_summary("", "missing after statistics marker"))?;

    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < 3 {
        return Err(malformed_summary(line, "expected three comma separated fields"));
    }

    let packets_transmitted = leading_token(fields[0], "packets");
    let packets_received = leading_token(fields[1], "packets");
    let packet_loss_percent = leading_token(fields[2], "packet");
    if packets_transmitted.is_empty() || packets_received.is_empty() || packet_loss_percent.is_empty()
    {
        return Err(malformed_summary(line, "empty field"));
    }

    Ok(PingSummary {
        packets_transmitted: packets_transmitted.to_string(),
        packets_received: packets_received.to_string(),
        packet_loss_percent: packet_loss_percent.to_string(),
    })
}

pub fn parse_rtt(
    lines: &[&str],
    packet_loss: &str,
    rtt_line: usize,
) -> Result<RttStats, ParseError> {
    if packet_loss == TOTAL_LOSS {
        return Ok(RttStats::unavailable());
    }

    let line = lines
        .get(rtt_line)
        .copied()
        .ok_or_else(|| malformed_rtt("", "missing"))?;
    let (_, values) = line
        .split_once('=')
        .ok_or_else(|| malformed_rtt(line, "no '=' separator"))?;

    let tokens: Vec<&str> = values.split('/').collect();
    let [min, avg, max] = tokens[..] else {
        return Err(malformed_rtt(line, "expected min/avg/max"));
    };

    Ok(RttStats {
        min: Some(min.trim_start().to_string()),
        avg: Some(avg.to_string()),
        max: Some(strip_unit(max).to_string()),
    })
}

fn leading_token<'a>(field: &'a str, suffix: &str) -> &'a str {
    field
        .split_once(suffix)
        .map_or(field, |(head, _)| head)
        .trim()
}

// "6.564 ms" -> "6.564"
fn strip_unit(value: &str) -> &str {
    match value.char_indices().rev().nth(RTT_UNIT_SUFFIX_LEN - 1) {
        Some((idx, _)) => &value[..idx],
        None => "",
    }
}

fn malformed_summary(line: &str, reason: &'static str) -> ParseError {
    ParseError::MalformedSummary {
        line: line.to_string(),
        reason,
    }
}

fn malformed_rtt(line: &str, reason: &'static str) -> ParseError {
    ParseError::MalformedRtt {
        line: line.to_string(),
        reason,
    }
}
