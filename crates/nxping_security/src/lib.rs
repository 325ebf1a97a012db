use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use keyring::Entry;
use nxping_model::{Credential, CredentialRef};
use tokio::task;
use tracing::debug;

pub const KEYRING_SERVICE: &str = "nxping";

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn store(&self, reference: &CredentialRef, credential: &Credential) -> Result<()>;
    async fn resolve(&self, reference: &CredentialRef) -> Result<Credential>;
}

#[derive(Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, reference: &CredentialRef) -> Result<Entry> {
        Entry::new(&self.service, &reference.name)
            .with_context(|| format!("keyring entry {}", reference.name))
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new(KEYRING_SERVICE)
    }
}

#[async_trait]
impl CredentialStore for KeyringStore {
    async fn store(&self, reference: &CredentialRef, credential: &Credential) -> Result<()> {
        let entry = self.entry(reference)?;
        let json = serde_json::to_string(credential)?;
        task::spawn_blocking(move || entry.set_password(&json).map_err(anyhow::Error::from))
            .await??;
        Ok(())
    }

    async fn resolve(&self, reference: &CredentialRef) -> Result<Credential> {
        let entry = self.entry(reference)?;
        let secret = task::spawn_blocking(move || entry.get_password().map_err(anyhow::Error::from))
            .await??;
        let credential = serde_json::from_str(&secret)
            .with_context(|| format!("decoding keyring entry {}", reference.name))?;
        Ok(credential)
    }
}

/// Username and password used for NX-API basic auth.
#[derive(Clone, PartialEq, Eq)]
pub struct Login {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Login {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Login")
            .field("username", &self.username)
            .field("password", &"******")
            .finish()
    }
}

impl From<Credential> for Login {
    fn from(credential: Credential) -> Self {
        match credential {
            Credential::UserPassword { username, password } => Login { username, password },
        }
    }
}

/// Explicit values win; whatever is missing or empty comes from the stored credential.
pub async fn resolve_login<S: CredentialStore + ?Sized>(
    store: &S,
    username: Option<String>,
    password: Option<String>,
    reference: &CredentialRef,
) -> Result<Login> {
    let username = username.filter(|value| !value.is_empty());
    let password = password.filter(|value| !value.is_empty());
    if let (Some(username), Some(password)) = (&username, &password) {
        return Ok(Login {
            username: username.clone(),
            password: password.clone(),
        });
    }

    debug!(
        target: "security",
        "falling back to stored credential {}",
        reference.name
    );
    let stored = match store.resolve(reference).await {
        Ok(credential) => Some(Login::from(credential)),
        Err(err) => {
            if username.is_none() && password.is_none() {
                return Err(err).with_context(|| {
                    format!(
                        "no username/password given and credential {} is unavailable",
                        reference.name
                    )
                });
            }
            None
        }
    };

    match (username, password, stored) {
        (Some(username), None, Some(stored)) => Ok(Login {
            username,
            password: stored.password,
        }),
        (None, Some(password), Some(stored)) => Ok(Login {
            username: stored.username,
            password,
        }),
        (None, None, Some(stored)) => Ok(stored),
        (Some(_), None, None) => bail!(
            "password missing and credential {} is unavailable",
            reference.name
        ),
        (None, Some(_), None) => bail!(
            "username missing and credential {} is unavailable",
            reference.name
        ),
        (Some(username), Some(password), _) => Ok(Login { username, password }),
        (None, None, None) => bail!("no credentials available for {}", reference.name),
    }
}
