//! Async TCP server using Tokio.
//!
//! Accepts TCP connections and serves exactly one request per connection: the
//! request is read with [`read_request`], handed to a [`Handler`], and the
//! connection is closed once the response has been written. Connections are
//! served concurrently, one task each; they share only the handler, the
//! configuration, and the listener's "closed" flag.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use crate::config::{ConfigError, ServerConfig};
use crate::http::{ParseError, ResponseWriter, default_headers, read_request};

pub mod handler;

pub use handler::{Buffered, Handler, HandlerError, buffered};

/// Most bytes discarded from a rejected client before its socket is dropped.
const LINGER_BYTES: u64 = 64 * 1024;
/// Longest wait for a rejected client to stop sending.
const LINGER_TIMEOUT: Duration = Duration::from_secs(1);

/// Errors produced by the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("accept loop terminated abnormally: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A bound, not yet serving, HTTP/1.1 listener.
///
/// # Examples
///
/// ```rust,no_run
/// use wirehttp::server::{HandlerError, Server, buffered};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let server = Server::bind("127.0.0.1:42069").await?;
///     let handle = server.serve(buffered(|_req, body| {
///         body.extend_from_slice(b"Hello!\n");
///         Ok::<_, HandlerError>(())
///     }));
///     tokio::signal::ctrl_c().await?;
///     handle.close().await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: ServerConfig,
}

impl Server {
    /// Binds the server to the given TCP address.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound
    /// (e.g. port already in use, insufficient permissions).
    pub async fn bind(addr: impl AsRef<str>) -> Result<Self, ServerError> {
        let addr = addr.as_ref();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.to_owned(),
                source: e,
            })?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
            config: ServerConfig::default(),
        })
    }

    /// Replaces the default configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] if [`ServerConfig::validate`] rejects `config`.
    pub fn with_config(mut self, config: ServerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Spawns the accept loop and returns a handle that can stop it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn serve<H: Handler>(self, handler: H) -> ServerHandle {
        let closed = Arc::new(AtomicBool::new(false));
        let shutdown = Arc::new(Notify::new());
        info!(address = %self.local_addr, "listening");

        let task = tokio::spawn(accept_loop(
            self.listener,
            Arc::new(handler),
            Arc::new(self.config),
            Arc::clone(&closed),
            Arc::clone(&shutdown),
        ));

        ServerHandle {
            local_addr: self.local_addr,
            closed,
            shutdown,
            task,
        }
    }
}

/// Controls a running accept loop.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    closed: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Stops accepting connections and closes the listening socket.
    ///
    /// Connections that were already accepted keep running until their response
    /// is written or their transport fails.
    ///
    /// # Errors
    ///
    /// [`ServerError::Join`] if the accept loop panicked.
    pub async fn close(self) -> Result<(), ServerError> {
        self.closed.store(true, Ordering::Release);
        self.shutdown.notify_one();
        self.task.await?;
        info!(address = %self.local_addr, "listener closed");
        Ok(())
    }
}

async fn accept_loop<H: Handler>(
    listener: TcpListener,
    handler: Arc<H>,
    config: Arc<ServerConfig>,
    closed: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
) {
    loop {
        let accepted = tokio::select! {
            accepted = listener.accept() => accepted,
            () = shutdown.notified() => break,
        };

        let (stream, peer_addr) = match accepted {
            Ok(pair) => pair,
            Err(e) => {
                if closed.load(Ordering::Acquire) {
                    break;
                }
                error!(error = %e, "failed to accept connection");
                continue;
            }
        };

        debug!(peer = %peer_addr, "connection accepted");
        let handler = Arc::clone(&handler);
        let config = Arc::clone(&config);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, handler, config).await {
                warn!(peer = %peer_addr, error = %e, "connection closed with error");
            }
        });
    }
}

/// Serves a single request on `stream`, then closes it.
///
/// A request that cannot be parsed is answered with the status from
/// [`ParseError::status`] and the error text as the body. The client may still be
/// sending at that point, so the connection lingers (see [`linger`]) instead of
/// closing with unread input, which would reset it and could discard the response.
async fn handle_connection<H: Handler>(
    mut stream: TcpStream,
    peer_addr: SocketAddr,
    handler: Arc<H>,
    config: Arc<ServerConfig>,
) -> Result<(), io::Error> {
    match read_request(&mut stream, &config).await {
        Ok(request) => {
            debug!(
                peer = %peer_addr,
                method = %request.method(),
                target = %request.target(),
                "dispatching request"
            );
            let mut writer = ResponseWriter::new(&mut stream);
            handler.handle(&request, &mut writer).await?;
            writer.flush().await?;
            stream.shutdown().await
        }
        Err(e) => {
            warn!(peer = %peer_addr, error = %e, "bad request");
            write_error(&mut stream, &e).await?;
            linger(&mut stream).await
        }
    }
}

/// Half-closes `stream`, then discards input until the peer closes its side,
/// [`LINGER_BYTES`] have been read, or [`LINGER_TIMEOUT`] passes.
async fn linger<S>(stream: &mut S) -> Result<(), io::Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.shutdown().await?;
    let mut unread = (&mut *stream).take(LINGER_BYTES);
    let mut sink = tokio::io::sink();
    let drain = tokio::io::copy(&mut unread, &mut sink);
    match tokio::time::timeout(LINGER_TIMEOUT, drain).await {
        Ok(Ok(discarded)) => trace!(discarded, "drained rejected request"),
        Ok(Err(e)) => debug!(error = %e, "drain failed"),
        Err(_) => debug!("peer still sending after linger timeout"),
    }
    Ok(())
}

async fn write_error<W>(stream: &mut W, err: &ParseError) -> Result<(), io::Error>
where
    W: AsyncWrite + Unpin,
{
    let status = err.status();
    let body = format!("{}: {err}\n", status.canonical_reason());

    let mut writer = ResponseWriter::new(stream);
    writer.write_status_line(status).await?;
    writer.write_headers(&default_headers(body.len())).await?;
    writer.write_body(body.as_bytes()).await?;
    writer.flush().await
}
