//! Loopback asset server
//!
//! Serves files under a root directory to the host UI over
//! `http://127.0.0.1:<port>/`. The port is picked by the OS at bind time.
//!
//! # Lifecycle
//!
//! 1. [`LocalAssetServer::new`] records the root; nothing is bound yet.
//! 2. [`LocalAssetServer::listen`] binds and returns a [`ServerHandle`],
//!    which is the only place the port can be read from.
//! 3. [`ServerHandle::shutdown`] (or dropping the handle) stops accepting
//!    connections.
//!
//! Every request is a read-only lookup of `<root>/<request path>`; there is
//! no routing and the method is ignored.

mod files;


use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use gameshelf_shared::LOOPBACK_HOST;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub use files::content_type_for;

/// Pause after a failed `accept()` (e.g. out of file descriptors) before retrying.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Errors starting the asset server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("asset root {} is not usable: {source}", .path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to bind loopback listener: {0}")]
    Bind(#[source] std::io::Error),
}

/// Where a listening server can be reached.
///
/// Only exists once the listener is bound, and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerBinding {
    pub host: IpAddr,
    pub port: u16,
    /// Canonical form of the directory being served.
    pub root: PathBuf,
}

impl ServerBinding {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Absolute URL for a root-relative path. `relative` is inserted as-is,
    /// without percent-encoding.
    pub fn href(&self, relative: &str) -> String {
        format!("http://{}:{}/{}", LOOPBACK_HOST, self.port, relative)
    }
}

/// An asset server that has not started listening.
#[derive(Debug, Clone)]
pub struct LocalAssetServer {
    root: PathBuf,
}

impl LocalAssetServer {
    /// Serve files under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Serve files under the process working directory.
    pub fn in_working_dir() -> Self {
        Self::new(".")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Bind `127.0.0.1` on an OS-assigned port and start serving.
    ///
    /// The root is canonicalized here; requests resolving outside it get 404.
    pub async fn listen(self) -> Result<ServerHandle, ServerError> {
        let root = tokio::fs::canonicalize(&self.root)
            .await
            .map_err(|source| ServerError::Root {
                path: self.root.clone(),
                source,
            })?;

        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .map_err(ServerError::Bind)?;
        let addr = listener.local_addr().map_err(ServerError::Bind)?;

        let binding = ServerBinding {
            host: addr.ip(),
            port: addr.port(),
            root: root.clone(),
        };
        tracing::info!(
            "Serving {} at {}",
            binding.root.display(),
            binding.href("")
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(accept_loop(listener, Arc::new(root), shutdown_rx));

        Ok(ServerHandle {
            binding,
            shutdown_tx,
            task,
        })
    }
}

/// A listening asset server.
///
/// Dropping the handle stops the accept loop as well; [`shutdown`] also
/// waits for it to finish.
///
/// [`shutdown`]: ServerHandle::shutdown
#[derive(Debug)]
pub struct ServerHandle {
    binding: ServerBinding,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    pub fn binding(&self) -> &ServerBinding {
        &self.binding
    }

    pub fn port(&self) -> u16 {
        self.binding.port
    }

    pub fn addr(&self) -> SocketAddr {
        self.binding.addr()
    }

    pub fn root(&self) -> &Path {
        &self.binding.root
    }

    /// See [`ServerBinding::href`].
    pub fn href(&self, relative: &str) -> String {
        self.binding.href(relative)
    }

    /// Stop accepting connections and wait for the listener to close.
    ///
    /// Requests already in flight on open connections are allowed to finish.
    pub async fn shutdown(self) {
        let Self {
            binding,
            shutdown_tx,
            task,
        } = self;
        // No receiver means the loop already exited
        let _ = shutdown_tx.send(true);
        if let Err(e) = task.await {
            tracing::warn!("Asset server task on port {} failed: {}", binding.port, e);
        }
    }
}

async fn accept_loop(
    listener: TcpListener,
    root: Arc<PathBuf>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {}", e);
                        if wait_or_shutdown(ACCEPT_BACKOFF, &mut shutdown).await {
                            break;
                        }
                        continue;
                    }
                };
                let root = Arc::clone(&root);
                tokio::spawn(async move {
                    let service = service_fn(move |request: hyper::Request<hyper::body::Incoming>| {
                        let root = Arc::clone(&root);
                        let path = request.uri().path().to_string();
                        async move { Ok::<_, Infallible>(files::respond(&root, &path).await) }
                    });
                    if let Err(e) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        tracing::debug!("Connection from {} closed with error: {}", peer, e);
                    }
                });
            }
            // Fires on shutdown() and when the handle is dropped
            _ = shutdown.changed() => break,
        }
    }
    tracing::info!("Asset server stopped");
}

/// Sleep for `delay`, returning `true` early if shutdown was requested.
async fn wait_or_shutdown(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => false,
        _ = shutdown.changed() => true,
    }
}
