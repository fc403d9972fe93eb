mod net;

use net::server::Server;
use rustyshake::config::{self, ServerConfig};
use tracing_subscriber::EnvFilter;

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = match std::env::args().nth(1) {
        Some(path) => ServerConfig::from_file(path),
        None => ServerConfig::default(),
    };
    config::set_config(cfg);

    async_std::task::block_on(Server.run())
}
