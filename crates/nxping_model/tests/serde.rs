use nxping_model::*;
use serde_json::json;

#[test]
fn report_matches_output_contract() {
    let request = PingRequest {
        dest: "8.8.8.8".into(),
        count: 8,
        vrf: Some("management".into()),
        source: None,
    };
    let result = PingResult {
        lines: vec!["PING 8.8.8.8 (8.8.8.8): 56 data bytes".into()],
        summary: PingSummary {
            packets_transmitted: "8".into(),
            packets_received: "8".into(),
            packet_loss_percent: "0.00%".into(),
        },
        rtt: RttStats {
            min: Some("5.978".into()),
            avg: Some("6.264".into()),
            max: Some("6.564".into()),
        },
    };

    let report = PingReport::new(&request, request.command(), result);
    let value = serde_json::to_value(&report).expect("serialize report");
    assert_eq!(
        value,
        json!({
            "command": "ping 8.8.8.8 vrf management count 8",
            "action": "PING 8.8.8.8 (8.8.8.8): 56 data bytes",
            "dest": "8.8.8.8",
            "count": "8",
            "packets_tx": "8",
            "packets_rx": "8",
            "packet_loss": "0.00%",
            "rtt": {"min": "5.978", "avg": "6.264", "max": "6.564"}
        })
    );

    let restored: PingReport = serde_json::from_value(value).expect("deserialize report");
    assert_eq!(restored, report);
}

#[test]
fn total_loss_renders_null_rtt() {
    let summary = PingSummary {
        packets_transmitted: "4".into(),
        packets_received: "0".into(),
        packet_loss_percent: TOTAL_LOSS.into(),
    };
    assert!(summary.is_total_loss());

    let value = serde_json::to_value(RttStats::unavailable()).expect("serialize rtt");
    assert_eq!(value, json!({"min": null, "avg": null, "max": null}));
}

#[test]
fn device_defaults_from_yaml() {
    let yaml = r#"
name: "n9k-core-1"
mgmt_address: "10.0.0.5"
"#;
    let device: Device = serde_yaml::from_str(yaml).expect("deserialize device");
    assert_eq!(device.protocol, Protocol::Http);
    assert!(device.port.is_none());
    assert!(device.credential.is_none());

    let yaml = r#"
name: "n9k-core-2"
mgmt_address: "10.0.0.6"
port: 8443
protocol: https
credential:
  name: "lab"
"#;
    let device: Device = serde_yaml::from_str(yaml).expect("deserialize device");
    assert_eq!(device.protocol, Protocol::Https);
    assert_eq!(device.port, Some(8443));
    assert_eq!(device.credential, Some(CredentialRef { name: "lab".into() }));
}

#[test]
fn credential_debug_redacts_password() {
    let credential = Credential::UserPassword {
        username: "admin".into(),
        password: "hunter2".into(),
    };
    let rendered = format!("{:?}", credential);
    assert!(rendered.contains("admin"));
    assert!(!rendered.contains("hunter2"));
}
