//! Server lifecycle: setup, route registration, accept loop, shutdown.
//!
//! A server moves through `Unconfigured → Bound → Listening → ShuttingDown
//! → Stopped`. [`Server::new`] and [`Server::register`] cover setup,
//! [`Server::bind`] claims the socket, and [`BoundServer::serve`] runs the
//! accept loop until the shutdown channel fires, then drains the worker
//! pool. Shutdown is an explicit `watch` channel rather than a signal
//! handler so it is independently testable; the binary wires Ctrl-C to it.

pub mod pool;
pub mod router;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpSocket;
use tokio::sync::watch;
use tracing::{error, info};

use crate::config::Config;
use crate::http::connection::Connection;
use crate::http::status::StatusTable;
use crate::server::pool::WorkerPool;
use crate::server::router::{Handler, RouteError, Router};

const BACKLOG: u32 = 5;

/// An embeddable HTTP/1.1 server. Register routes, then bind and serve.
///
/// Each server owns its own routing table and status table; multiple
/// instances coexist freely (there is no process-wide state).
pub struct Server {
    config: Config,
    router: Router,
    statuses: StatusTable,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            router: Router::new(),
            statuses: StatusTable::default(),
        }
    }

    /// Registers a handler for a method+path pair. Must be called before
    /// serving begins; there is no runtime unregistration.
    pub fn register(
        &mut self,
        method: &str,
        path: &str,
        handler: impl Handler + 'static,
    ) -> Result<(), RouteError> {
        self.router.register(method, path, handler)
    }

    /// The status table used for reason-phrase lookup, extensible until
    /// the server is bound.
    pub fn status_table_mut(&mut self) -> &mut StatusTable {
        &mut self.statuses
    }

    /// Claims the listening socket: all local interfaces, reuse-address
    /// set, the configured port. Any failure here is fatal to startup.
    pub fn bind(self) -> anyhow::Result<BoundServer> {
        let socket = TcpSocket::new_v4()?;
        socket.set_reuseaddr(true)?;
        socket.bind(self.config.bind_addr().parse()?)?;

        Ok(BoundServer {
            socket,
            config: self.config,
            router: self.router,
            statuses: self.statuses,
        })
    }

    /// Binds and serves in one call.
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        self.bind()?.serve(shutdown).await
    }
}

/// A server holding its listening socket, not yet accepting.
pub struct BoundServer {
    socket: TcpSocket,
    config: Config,
    router: Router,
    statuses: StatusTable,
}

impl BoundServer {
    /// The bound address; useful when the configured port is 0.
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Accepts connections until the shutdown channel fires (or its sender
    /// is dropped), then drains in-flight connections and stops.
    ///
    /// Each accepted connection becomes one task on the worker pool; the
    /// accept loop blocks only on accept and queue submission, never on
    /// request processing. Accept errors are per-connection-recoverable:
    /// logged, loop continues.
    pub async fn serve(self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        let listener = self.socket.listen(BACKLOG)?;
        info!("Listening for new connections at {}", listener.local_addr()?);

        let router = Arc::new(self.router);
        let statuses = Arc::new(self.statuses);
        let pool = WorkerPool::new(self.config.workers);

        loop {
            tokio::select! {
                res = listener.accept() => {
                    match res {
                        Ok((stream, peer)) => {
                            let conn = Connection::new(
                                stream,
                                Arc::clone(&router),
                                Arc::clone(&statuses),
                            );
                            pool.submit(async move {
                                if let Err(e) = conn.run().await {
                                    error!("Connection error from {}: {}", peer, e);
                                }
                            })
                            .await;
                        }
                        Err(e) => {
                            error!("Error accepting new connection: {}", e);
                        }
                    }
                }

                _ = shutdown.changed() => {
                    info!("Shutdown requested, draining in-flight connections");
                    break;
                }
            }
        }

        drop(listener);
        pool.shutdown().await;
        info!("Closing server...");

        Ok(())
    }
}
