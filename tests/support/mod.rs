// ABOUTME: Test support utilities.
// ABOUTME: Tracing setup, the shared SSH container, and live-server credentials.

use sshclient::config::EnvCredentials;
use std::sync::Once;

#[allow(dead_code)]
pub mod ssh_container;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("sshclient=debug".parse().unwrap())
            .add_directive("russh=info".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Credentials for an external SSH server, or None (test should return
/// early) when SSH_HOST / SSH_USERNAME are not exported.
#[allow(dead_code)]
pub fn live_server() -> Option<EnvCredentials> {
    init_tracing();
    match EnvCredentials::from_env() {
        Ok(creds) => Some(creds),
        Err(e) => {
            eprintln!("skipping live SSH test: {e}");
            None
        }
    }
}
