//! Server configuration and the TCP accept loop.

use std::{
    future::Future,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use clap::Parser;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info};

use crate::{commands::CommandDispatcher, connection::handle_client_connection};

const MAX_ACCEPT_BACKOFF_SECONDS: u64 = 64;

/// Command line configuration of the server.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(author, version, about = "An in-memory key-value server speaking RESP")]
pub struct RedisServer {
    /// Address to listen on.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub bind: IpAddr,

    /// Port to listen on.
    #[arg(long, default_value_t = 6379, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,
}

impl RedisServer {
    /// Builds the configuration from command line arguments. The first item is
    /// the program name.
    pub fn new<I, T>(command_line_args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(command_line_args)
    }

    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Binds the configured address and serves clients until Ctrl-C.
    pub async fn run(&self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.address()).await?;

        serve(listener, tokio::signal::ctrl_c()).await
    }
}

/// Accepts clients on `listener` until `shutdown` completes.
///
/// Every client runs on its own task and all of them share one keyspace.
pub async fn serve(listener: TcpListener, shutdown: impl Future) -> anyhow::Result<()> {
    let dispatcher = CommandDispatcher::new();

    info!(address = %listener.local_addr()?, "listening");

    tokio::select! {
        result = accept_loop(&listener, &dispatcher) => result,
        _ = shutdown => {
            info!("shutting down");
            Ok(())
        }
    }
}

async fn accept_loop(
    listener: &TcpListener,
    dispatcher: &CommandDispatcher,
) -> anyhow::Result<()> {
    loop {
        let (stream, client_address) = accept(listener).await?;

        tokio::spawn(handle_client_connection(
            stream,
            client_address.to_string(),
            dispatcher.clone(),
        ));
    }
}

/// Accepts one connection, retrying failed accepts with exponential backoff.
async fn accept(listener: &TcpListener) -> anyhow::Result<(TcpStream, SocketAddr)> {
    let mut backoff = 1;

    loop {
        match listener.accept().await {
            Ok(accepted) => return Ok(accepted),
            Err(err) => {
                error!(cause = %err, backoff, "failed to accept connection");

                if backoff > MAX_ACCEPT_BACKOFF_SECONDS {
                    return Err(err.into());
                }
            }
        }

        tokio::time::sleep(Duration::from_secs(backoff)).await;
        backoff *= 2;
    }
}
