use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

const USER_AGENT: &str = concat!("fctracker_terminal/", env!("CARGO_PKG_VERSION"));

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared client; the first caller decides the timeout.
pub fn shared_client(timeout_secs: u64) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build http client")
    })
}
