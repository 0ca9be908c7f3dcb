//! Transports.
//!
//! A [`Server`] binds the configured transport, writes `server_start` and
//! `server_stop` lines to the request log, and feeds every request through
//! one shared [`RequestHandler`].

mod http;
mod udp;

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::Level;
use tokio::net::{TcpListener, UdpSocket};

use crate::config::{Config, Protocol};
use crate::initialization::init_request_handler;
use crate::protocol::{FileLogSink, LogSink, RequestHandler};

pub use http::{router, serve_http};
pub use udp::serve_udp;

enum Listener {
    Udp(UdpSocket),
    Http(TcpListener),
}

/// A bound, not yet running server.
pub struct Server {
    listener: Listener,
    handler: RequestHandler,
    host: String,
    log_file: PathBuf,
    max_in_flight: usize,
}

impl Server {
    /// Binds the transport selected by `config.protocol`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn bind(config: &Config, handler: RequestHandler) -> Result<Self> {
        let address = config.bind_address();
        let listener = match config.protocol {
            Protocol::Udp => Listener::Udp(
                UdpSocket::bind(&address)
                    .await
                    .with_context(|| format!("Failed to bind UDP socket to {address}"))?,
            ),
            Protocol::Http => Listener::Http(
                TcpListener::bind(&address)
                    .await
                    .with_context(|| format!("Failed to bind HTTP listener to {address}"))?,
            ),
        };
        Ok(Self {
            listener,
            handler,
            host: config.host.clone(),
            log_file: config.log_file.clone(),
            max_in_flight: config.max_in_flight,
        })
    }

    /// Address actually bound (useful with port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        match &self.listener {
            Listener::Udp(socket) => socket.local_addr(),
            Listener::Http(listener) => listener.local_addr(),
        }
    }

    /// Serves until `shutdown` completes.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let protocol = self.handler.protocol();
        let port = self.local_addr()?.port();
        let sink = Arc::clone(self.handler.sink());
        sink.write(
            Level::Info,
            &format!(
                "server_start protocol={protocol} host={} port={port} log_file={}",
                self.host,
                self.log_file.display()
            ),
        );

        let result = match self.listener {
            Listener::Udp(socket) => {
                serve_udp(socket, self.handler, self.max_in_flight, shutdown).await
            }
            Listener::Http(listener) => {
                serve_http(listener, self.handler, self.max_in_flight, shutdown).await
            }
        };

        let reason = if result.is_ok() { "shutdown" } else { "error" };
        sink.write(Level::Info, &format!("server_stop reason={reason}"));
        result
    }
}

/// Runs the configured server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the log file, the HTTP client or the listener cannot
/// be set up, or if the transport fails.
pub async fn run_server(config: &Config) -> Result<()> {
    let sink: Arc<dyn LogSink> = Arc::new(FileLogSink::open(&config.log_file)?);
    let handler = init_request_handler(config, sink)?;
    let server = Server::bind(config, handler).await?;

    log::info!(
        "IP lookup {} server listening on {}",
        config.protocol,
        server.local_addr()?
    );

    server.run(shutdown_signal()).await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Ctrl-C received, shutting down"),
        Err(e) => {
            // Without a signal handler the server runs until killed.
            log::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    }
}
