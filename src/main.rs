use rudis::server::RedisServer;
use tracing_subscriber::{EnvFilter, fmt};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let server = match RedisServer::new(std::env::args()) {
        Ok(server) => server,
        Err(e) => e.exit(),
    };

    server.run().await
}
