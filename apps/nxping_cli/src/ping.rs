use anyhow::{anyhow, Context, Result};
use clap::Args;
use nxping_drivers::{ping, PingError};
use nxping_model::{CredentialRef, Device, PingReport, PingRequest, Protocol, DEFAULT_PING_COUNT};
use nxping_security::{resolve_login, KeyringStore};
use serde::Deserialize;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

#[derive(Args)]
pub struct PingCmd {
    /// IP address or hostname (resolvable by the switch) of the remote node
    #[arg(long)]
    pub dest: String,
    /// Number of packets to send
    #[arg(long, default_value_t = DEFAULT_PING_COUNT)]
    pub count: u32,
    /// Outgoing VRF
    #[arg(long)]
    pub vrf: Option<String>,
    /// Source IP address
    #[arg(long)]
    pub source: Option<String>,
    /// NX-API enabled switch to ping from
    #[arg(long, required_unless_present = "device", conflicts_with = "device")]
    pub host: Option<String>,
    #[arg(long, conflicts_with = "device")]
    pub port: Option<u16>,
    #[arg(long, default_value_t = Protocol::Http, conflicts_with = "device")]
    pub protocol: Protocol,
    /// Inventory entry to ping from instead of --host
    #[arg(long, requires = "inventory")]
    pub device: Option<String>,
    #[arg(long)]
    pub inventory: Option<PathBuf>,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    /// Keychain entry used when --username/--password are not given
    #[arg(long)]
    pub credential: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InventoryFile {
    devices: Vec<Device>,
}

pub async fn run(cmd: PingCmd) -> Result<ExitCode> {
    match execute(cmd).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            println!("{}", serde_json::to_string_pretty(&failure.to_json())?);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn execute(cmd: PingCmd) -> Result<PingReport, TaskFailure> {
    let device = target_device(&cmd)?;
    let reference = cmd
        .credential
        .clone()
        .map(|name| CredentialRef { name })
        .or_else(|| device.credential.clone())
        .unwrap_or_default();
    let store = KeyringStore::default();
    let login = resolve_login(&store, cmd.username, cmd.password, &reference).await?;

    let request = PingRequest {
        dest: cmd.dest,
        count: cmd.count,
        vrf: cmd.vrf,
        source: cmd.source,
    };
    let driver = nxping_drivers::default_driver()?;
    info!("Pinging {} from {} via {}", request.dest, device.name, driver.name());

    Ok(ping::run(driver.as_ref(), &device, &login, &request).await?)
}

/// Anything that stops the task, reported as `{failed, msg, error}` on stdout.
enum TaskFailure {
    Setup(anyhow::Error),
    Ping(PingError),
}

impl From<anyhow::Error> for TaskFailure {
    fn from(err: anyhow::Error) -> Self {
        TaskFailure::Setup(err)
    }
}

impl From<PingError> for TaskFailure {
    fn from(err: PingError) -> Self {
        TaskFailure::Ping(err)
    }
}

impl TaskFailure {
    fn to_json(&self) -> serde_json::Value {
        let (msg, error) = match self {
            TaskFailure::Setup(err) => (err.to_string(), format!("{:#}", err)),
            TaskFailure::Ping(err) => (err.to_string(), err.detail()),
        };
        json!({
            "failed": true,
            "msg": msg,
            "error": error,
        })
    }
}

fn target_device(cmd: &PingCmd) -> Result<Device> {
    if let Some(host) = &cmd.host {
        return Ok(Device {
            name: host.clone(),
            mgmt_address: host.clone(),
            port: cmd.port,
            protocol: cmd.protocol,
            credential: None,
        });
    }
    let name = cmd
        .device
        .as_deref()
        .ok_or_else(|| anyhow!("either --host or --device is required"))?;
    let path = cmd
        .inventory
        .as_deref()
        .ok_or_else(|| anyhow!("--device needs --inventory"))?;
    let inventory = load_inventory(path)
        .with_context(|| format!("failed to load inventory {}", path.display()))?;
    inventory
        .devices
        .into_iter()
        .find(|device| device.name == name)
        .ok_or_else(|| anyhow!("device {} not found in {}", name, path.display()))
}

fn load_inventory(path: &Path) -> Result<InventoryFile> {
    let data = fs::read_to_string(path)?;
    let inventory = serde_yaml::from_str(&data)?;
    Ok(inventory)
}
