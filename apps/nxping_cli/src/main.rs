mod ping;

use anyhow::Result;
use clap::{Parser, Subcommand};
use nxping_model::{Credential, CredentialRef};
use nxping_security::{CredentialStore, KeyringStore};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nxping", about = "Ping from a Cisco Nexus switch over NX-API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run ping on the switch and print the parsed result as JSON
    Ping(ping::PingCmd),
    /// Store credentials securely using the OS keychain
    Creds {
        #[arg(long, default_value = "default")]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Ping(cmd) => ping::run(cmd).await,
        Commands::Creds {
            name,
            username,
            password,
        } => {
            store_credentials(name, username, password).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn store_credentials(name: String, username: String, password: String) -> Result<()> {
    let store = KeyringStore::default();
    let reference = CredentialRef { name };
    let credential = Credential::UserPassword { username, password };
    store.store(&reference, &credential).await?;
    println!("Stored credential {}", reference.name);
    Ok(())
}
