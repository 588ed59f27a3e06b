//! # wirehttp
//!
//! HTTP/1.1 request parsing and response serialization directly over byte streams.
//!
//! - [`http::RequestParser`] consumes a request in fragments of any size and
//!   reports how many bytes it used, so the caller can compact its read buffer.
//! - [`http::Headers`] parses and stores header fields, merging repeated names.
//! - [`http::ResponseWriter`] writes status lines, header blocks, fixed bodies, and
//!   chunked bodies with trailers.
//! - [`server`] ties them to a Tokio TCP listener, one request per connection.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wirehttp::server::{HandlerError, Server, buffered};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::bind("127.0.0.1:42069").await?;
//!     let handle = server.serve(buffered(|req, body| {
//!         body.extend_from_slice(format!("Hello from {}\n", req.target()).as_bytes());
//!         Ok::<_, HandlerError>(())
//!     }));
//!     tokio::signal::ctrl_c().await?;
//!     handle.close().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod http;
pub mod server;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use config::ServerConfig;
pub use http::{
    Headers, Method, ParseError, Request, RequestParser, ResponseWriter, StatusCode,
};
pub use server::{Handler, Server, ServerError, ServerHandle};
