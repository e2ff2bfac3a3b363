// ABOUTME: Credential types and the authentication step of an SSH handshake.
// ABOUTME: Supports password, private key (file or in-memory PEM), and SSH agent.

use super::error::{Error, Result};
use super::host_key::SshHandler;
use russh::client::Handle;
use russh::keys::agent::client::AgentClient;
use russh::keys::{PrivateKeyWithHashAlg, decode_secret_key, load_secret_key, ssh_key};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// How to prove identity to the server.
#[derive(Clone)]
pub enum AuthMethod {
    Password(String),
    PrivateKey(Arc<ssh_key::PrivateKey>),
    /// Identities offered by the agent at `SSH_AUTH_SOCK`.
    Agent,
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::Password(_) => f.write_str("Password(<redacted>)"),
            AuthMethod::PrivateKey(key) => f
                .debug_tuple("PrivateKey")
                .field(&key.algorithm().as_str())
                .finish(),
            AuthMethod::Agent => f.write_str("Agent"),
        }
    }
}

impl AuthMethod {
    pub fn password(password: impl Into<String>) -> Self {
        AuthMethod::Password(password.into())
    }

    pub fn agent() -> Self {
        AuthMethod::Agent
    }

    /// Private key material held in memory, e.g. read from an environment variable.
    pub fn from_pem(material: &str, passphrase: Option<&str>) -> Result<Self> {
        let key = decode_secret_key(material, passphrase)?;
        Ok(AuthMethod::PrivateKey(Arc::new(key)))
    }
}

/// Load an unencrypted private key file.
pub fn key_auth(path: impl AsRef<Path>) -> Result<AuthMethod> {
    key_auth_with_passphrase(path, None)
}

/// Load a private key file, decrypting it with `passphrase` if given.
pub fn key_auth_with_passphrase(
    path: impl AsRef<Path>,
    passphrase: Option<&str>,
) -> Result<AuthMethod> {
    let path = path.as_ref();
    let key = load_secret_key(path, passphrase).map_err(|e| Error::KeyLoadFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(AuthMethod::PrivateKey(Arc::new(key)))
}

/// Pick credentials when none were configured: the agent if one is
/// advertised, else the first loadable key in `~/.ssh`.
pub fn default_auth_method() -> Result<AuthMethod> {
    if std::env::var_os("SSH_AUTH_SOCK").is_some() {
        return Ok(AuthMethod::Agent);
    }

    let home = std::env::var("HOME").map_err(|_| {
        Error::AgentUnavailable("SSH agent not available and HOME not set".to_string())
    })?;

    let ssh_dir = PathBuf::from(home).join(".ssh");
    for name in ["id_ed25519", "id_rsa", "id_ecdsa"] {
        if let Ok(method) = key_auth(ssh_dir.join(name)) {
            tracing::debug!("using default key ~/.ssh/{}", name);
            return Ok(method);
        }
    }

    Err(Error::AgentUnavailable(
        "SSH agent not available and no default keys found".to_string(),
    ))
}

/// Run the user-auth exchange. Returns `AuthenticationFailed` if the server
/// rejects every offered credential.
pub(crate) async fn authenticate(
    session: &mut Handle<SshHandler>,
    user: &str,
    method: AuthMethod,
) -> Result<()> {
    let accepted = match method {
        AuthMethod::Password(password) => {
            tracing::debug!(user, "authenticating with password");
            session
                .authenticate_password(user, password)
                .await
                .map_err(Error::Protocol)?
                .success()
        }
        AuthMethod::PrivateKey(key) => {
            tracing::debug!(user, "authenticating with private key");
            let hash_alg = session
                .best_supported_rsa_hash()
                .await
                .map_err(Error::Protocol)?
                .flatten();

            session
                .authenticate_publickey(user, PrivateKeyWithHashAlg::new(key, hash_alg))
                .await
                .map_err(Error::Protocol)?
                .success()
        }
        AuthMethod::Agent => {
            tracing::debug!(user, "authenticating with SSH agent");
            let mut agent = AgentClient::connect_env()
                .await
                .map_err(|e| Error::AgentUnavailable(e.to_string()))?;
            let keys = agent.request_identities().await.map_err(|e| {
                Error::AgentUnavailable(format!("failed to list agent keys: {}", e))
            })?;

            if keys.is_empty() {
                return Err(Error::AgentUnavailable("no keys in SSH agent".to_string()));
            }

            let mut accepted = false;
            for key in &keys {
                match session
                    .authenticate_publickey_with(user, key.clone(), None, &mut agent)
                    .await
                {
                    Ok(result) if result.success() => {
                        accepted = true;
                        break;
                    }
                    _ => continue,
                }
            }
            accepted
        }
    };

    if accepted {
        Ok(())
    } else {
        Err(Error::AuthenticationFailed)
    }
}
