//! Command-line flags.

use clap::Parser;
use sieve_core::AppConfig;

/// Extract elements from web pages by CSS selector, served as JSON.
#[derive(Debug, Parser)]
#[command(name = "sieve", version)]
pub struct Args {
    /// Host to listen on
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,
}

impl Args {
    /// Override loaded configuration with any flags that were given.
    pub fn apply(self, config: &mut AppConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
    }
}
