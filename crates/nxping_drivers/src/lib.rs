pub mod config;
pub mod drivers;
pub mod ping;

use anyhow::Result;
use async_trait::async_trait;
use nxping_model::Device;
use nxping_security::Login;
use std::sync::Arc;

pub use ping::PingError;

/// Runs one CLI command on a switch and hands back its text output.
#[async_trait]
pub trait CliDriver: Send + Sync {
    fn name(&self) -> &'static str;
    async fn run_cli(&self, device: &Device, login: &Login, command: &str) -> Result<String>;
}

pub type DynCliDriver = Arc<dyn CliDriver>;

/// NX-API unless `NXPING_USE_MOCK_DRIVERS` is set.
pub fn default_driver() -> Result<DynCliDriver> {
    if config::use_mock_drivers() {
        return Ok(Arc::new(drivers::MockDriver::default()));
    }
    Ok(Arc::new(drivers::NxapiDriver::new()?))
}
