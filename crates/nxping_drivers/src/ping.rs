use crate::CliDriver;
use nxping_model::{Device, PingReport, PingRequest};
use nxping_parser::ParseError;
use nxping_security::Login;
use thiserror::Error;
use tracing::{error, info, instrument};

#[derive(Debug, Error)]
pub enum PingError {
    #[error("Error sending {command}")]
    CommandExecution { command: String, detail: String },
    #[error("unexpected ping output from device")]
    Parse {
        #[source]
        source: ParseError,
        raw: String,
    },
}

impl PingError {
    /// Extra context for the operator: the device error or the raw transcript.
    pub fn detail(&self) -> String {
        match self {
            PingError::CommandExecution { detail, .. } => detail.clone(),
            PingError::Parse { source, raw } => format!("{}\n{}", source, raw),
        }
    }
}

/// Issue one `ping` on the switch and shape the reply. No retries.
#[instrument(skip_all, fields(device = %device.name, dest = %request.dest))]
pub async fn run(
    driver: &dyn CliDriver,
    device: &Device,
    login: &Login,
    request: &PingRequest,
) -> Result<PingReport, PingError> {
    let command = request.command();
    info!(target: "ping", "sending '{}' via {}", command, driver.name());

    let raw = driver
        .run_cli(device, login, &command)
        .await
        .map_err(|err| {
            error!(target: "ping", "{} rejected '{}': {:#}", device.name, command, err);
            PingError::CommandExecution {
                command: command.clone(),
                detail: format!("{:#}", err),
            }
        })?;

    let result = nxping_parser::parse(&raw).map_err(|source| PingError::Parse {
        source,
        raw: raw.clone(),
    })?;
    info!(
        target: "ping",
        "{}: {} tx, {} rx, {} loss",
        request.dest,
        result.summary.packets_transmitted,
        result.summary.packets_received,
        result.summary.packet_loss_percent
    );

    Ok(PingReport::new(request, command, result))
}
