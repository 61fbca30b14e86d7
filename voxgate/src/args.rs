use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

/// Voxgate text-to-speech gateway
#[derive(Debug, Parser)]
#[command(name = "voxgate", about = "Text-to-speech gateway with multi-account failover")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "voxgate.toml", env = "VOXGATE_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "VOXGATE_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Override the listen port, keeping the configured host
    #[arg(long, env = "PORT", conflicts_with = "listen")]
    pub port: Option<u16>,
}

impl Args {
    /// Listen address after applying command-line overrides
    pub fn listen_address(&self, configured: SocketAddr) -> SocketAddr {
        match (self.listen, self.port) {
            (Some(listen), _) => listen,
            (None, Some(port)) => SocketAddr::new(configured.ip(), port),
            (None, None) => configured,
        }
    }
}
