use crate::{config, CliDriver};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use nxping_model::Device;
use nxping_security::Login;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

#[derive(Clone)]
pub struct NxapiDriver {
    client: Client,
}

impl NxapiDriver {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(config::http_timeout())
            .danger_accept_invalid_certs(config::accept_invalid_certs())
            .build()
            .context("building nxapi client")?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn post(&self, device: &Device, payload: Value, login: &Login) -> Result<NxapiEnvelope> {
        let url = device.nxapi_url();
        debug!(target: "drivers::nxos", "POST {} for {}", url, device.name);
        let resp = self
            .client
            .post(&url)
            .basic_auth(&login.username, Some(&login.password))
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("nxapi request {} ({})", device.name, url))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("nxapi response {}", device.name))?;
        if !status.is_success() {
            bail!("NX-OS responded {}: {}", status, body.trim());
        }
        serde_json::from_str(&body).with_context(|| "parse nxapi json")
    }
}

#[async_trait]
impl CliDriver for NxapiDriver {
    fn name(&self) -> &'static str {
        "Cisco NX-OS API"
    }

    async fn run_cli(&self, device: &Device, login: &Login, command: &str) -> Result<String> {
        let reply = self.post(device, show_ascii_payload(command), login).await?;
        let body = reply.into_body()?;
        info!(
            target: "drivers::nxos",
            "[{}] '{}' returned {} lines",
            device.name,
            command,
            body.lines().count()
        );
        Ok(body)
    }
}

fn show_ascii_payload(command: &str) -> Value {
    json!({
        "ins_api": {
            "version": "1.0",
            "type": "cli_show_ascii",
            "chunk": "0",
            "sid": "1",
            "input": command,
            "output_format": "json"
        }
    })
}

#[derive(Debug, Deserialize)]
struct NxapiEnvelope {
    #[serde(rename = "ins_api")]
    ins_api: NxapiInner,
}

impl NxapiEnvelope {
    fn into_body(self) -> Result<String> {
        let outputs = self.ins_api.outputs.output.into_vec();
        let Some(output) = outputs.into_iter().next() else {
            bail!("NX-OS returned no output");
        };
        if !output.is_success() {
            bail!("NX-OS error: {}", output.describe());
        }
        match output.body {
            Some(Value::String(text)) => Ok(text),
            Some(other) => bail!("NX-OS returned structured body, expected text: {}", other),
            None => bail!("NX-OS returned no body: {}", output.describe()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NxapiInner {
    outputs: NxapiOutputs,
}

#[derive(Debug, Deserialize)]
struct NxapiOutputs {
    output: OneOrMany<NxapiOutput>,
}

// A single command answers with an object, a batch with a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NxapiOutput {
    code: Option<String>,
    msg: Option<String>,
    clierror: Option<String>,
    body: Option<Value>,
}

impl NxapiOutput {
    fn is_success(&self) -> bool {
        self.code
            .as_deref()
            .map(|code| code == "200")
            .unwrap_or(true)
    }

    fn describe(&self) -> String {
        let code = self.code.as_deref().unwrap_or("200");
        let msg = self.msg.as_deref().unwrap_or("ok");
        match self.clierror.as_deref().map(str::trim) {
            Some(detail) if !detail.is_empty() => format!("code={} msg={} ({})", code, msg, detail),
            _ => format!("code={} msg={}", code, msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nxping_model::Protocol;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn envelope(value: Value) -> NxapiEnvelope {
        serde_json::from_value(value).expect("envelope")
    }

    #[test]
    fn payload_requests_ascii_output() {
        let payload = show_ascii_payload("ping 8.8.8.8 count 4");
        assert_eq!(payload["ins_api"]["type"], "cli_show_ascii");
        assert_eq!(payload["ins_api"]["input"], "ping 8.8.8.8 count 4");
    }

    #[test]
    fn single_output_body_is_returned() {
        let reply = envelope(json!({
            "ins_api": {
                "type": "cli_show_ascii",
                "version": "1.0",
                "sid": "eoc",
                "outputs": {
                    "output": {
                        "input": "ping 8.8.8.8",
                        "msg": "Success",
                        "code": "200",
                        "body": "PING 8.8.8.8 (8.8.8.8): 56 data bytes\n"
                    }
                }
            }
        }));
        assert_eq!(
            reply.into_body().unwrap(),
            "PING 8.8.8.8 (8.8.8.8): 56 data bytes\n"
        );
    }

    #[test]
    fn list_output_uses_first_entry() {
        let reply = envelope(json!({
            "ins_api": {
                "outputs": {
                    "output": [
                        {"code": "200", "msg": "Success", "body": "first"},
                        {"code": "200", "msg": "Success", "body": "second"}
                    ]
                }
            }
        }));
        assert_eq!(reply.into_body().unwrap(), "first");
    }

    #[test]
    fn cli_error_is_reported() {
        let reply = envelope(json!({
            "ins_api": {
                "outputs": {
                    "output": {
                        "input": "ping bogus",
                        "code": "400",
                        "msg": "Input CLI command error",
                        "clierror": "% Invalid host/interface bogus\n"
                    }
                }
            }
        }));
        let err = reply.into_body().unwrap_err().to_string();
        assert!(err.contains("code=400"));
        assert!(err.contains("Invalid host/interface bogus"));
    }

    #[tokio::test]
    async fn run_cli_posts_to_ins_endpoint() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let body = json!({
                "ins_api": {
                    "outputs": {
                        "output": {"code": "200", "msg": "Success", "body": "PING ok\n"}
                    }
                }
            })
            .to_string();
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });

        let device = Device {
            name: "n9k-lab".into(),
            mgmt_address: "127.0.0.1".into(),
            port: Some(port),
            protocol: Protocol::Http,
            credential: None,
        };
        let login = Login {
            username: "admin".into(),
            password: "secret".into(),
        };
        let driver = NxapiDriver::with_client(Client::builder().no_proxy().build().unwrap());
        let output = driver
            .run_cli(&device, &login, "ping 8.8.8.8 count 4")
            .await
            .unwrap();
        assert_eq!(output, "PING ok\n");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /ins HTTP/1.1"));
        assert!(request.to_lowercase().contains("authorization: basic"));
        assert!(request.contains("ping 8.8.8.8 count 4"));
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(split) = text.find("\r\n\r\n") {
                let content_length = text[..split]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= split + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }
}
