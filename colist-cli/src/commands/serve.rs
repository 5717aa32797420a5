//! `colist serve`: run the relay in the foreground.

use anyhow::{Context, Result};
use clap::Args;

use colist_core::config;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind; overrides config and COLIST_HOST.
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind; overrides config and COLIST_PORT.
    #[arg(long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    pub fn run(self) -> Result<()> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let mut settings =
            config::load_at(&home).context("failed to load ~/.colist/config.yaml")?;
        if let Some(host) = self.host {
            settings.server.host = host;
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        colist_relay::start_blocking(settings, &home).context("relay exited with error")
    }
}
