use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

const USER_AGENT: &str = concat!("props-terminal/", env!("CARGO_PKG_VERSION"));

// The scrape server is expected on the local network; a stuck request should
// never hold the poll loop for long.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client for every scrape-server call.
pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building the scrape-server http client")
    })
}
