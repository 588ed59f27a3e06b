//! Demo server on port 42069.
//!
//! ```text
//! cargo run --example httpserver
//! curl -v localhost:42069/
//! curl -v localhost:42069/yourproblem
//! curl -v --raw localhost:42069/stream/20
//! ```
//!
//! Set `WIREHTTP_CONFIG` to a JSON file to override [`ServerConfig`] fields.

use std::io;

use sha2::{Digest, Sha256};
use tokio::io::AsyncWrite;
use tracing_subscriber::EnvFilter;
use wirehttp::http::{Headers, Request, ResponseWriter, StatusCode, UnboundedBody, default_headers};
use wirehttp::server::{Handler, Server};
use wirehttp::ServerConfig;

const ADDR: &str = "127.0.0.1:42069";
const STREAM_CHUNK: usize = 32;

struct App;

impl Handler for App {
    async fn handle<W>(&self, req: &Request, w: &mut ResponseWriter<W>) -> io::Result<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        if let Some(lines) = req.target().strip_prefix("/stream/") {
            return match lines.parse() {
                Ok(lines) => stream(lines, w).await,
                Err(_) => html(w, StatusCode::BadRequest, PAGE_400).await,
            };
        }

        match req.target() {
            "/yourproblem" => html(w, StatusCode::BadRequest, PAGE_400).await,
            "/myproblem" => html(w, StatusCode::InternalServerError, PAGE_500).await,
            _ => html(w, StatusCode::Ok, PAGE_200).await,
        }
    }
}

async fn html<W>(w: &mut ResponseWriter<W>, status: StatusCode, page: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut headers = default_headers(page.len());
    headers.replace("Content-Type", "text/html")?;
    w.write_status_line(status).await?;
    w.write_headers(&headers).await?;
    w.write_body(page.as_bytes()).await
}

/// Sends `lines` generated lines as a chunked body, followed by a digest trailer.
async fn stream<W>(lines: usize, w: &mut ResponseWriter<W>) -> io::Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let body: String = (0..lines)
        .map(|i| format!("{i}: the quick brown fox jumps over the lazy dog\n"))
        .collect();

    let mut headers = default_headers(0);
    headers.remove("Content-Length");
    headers.set("Transfer-Encoding", "chunked")?;
    headers.set("Trailer", "X-Content-SHA256")?;
    headers.set("Trailer", "X-Content-Length")?;

    w.write_status_line(StatusCode::Ok).await?;
    w.write_headers(&headers).await?;
    for chunk in body.as_bytes().chunks(STREAM_CHUNK) {
        w.write_chunked_body(chunk).await?;
    }
    w.write_last_chunk().await?;

    let mut trailers = Headers::new();
    trailers.set("X-Content-SHA256", format!("{:x}", Sha256::digest(body.as_bytes())))?;
    trailers.set("X-Content-Length", body.len().to_string())?;
    w.write_trailers(&trailers).await
}

async fn load_config() -> Result<ServerConfig, Box<dyn std::error::Error>> {
    match std::env::var("WIREHTTP_CONFIG") {
        Ok(path) => Ok(ServerConfig::from_json_str(&tokio::fs::read_to_string(path).await?)?),
        // curl sends GET without Content-Length and waits for the reply.
        Err(_) => Ok(ServerConfig::default().with_unbounded_body(UnboundedBody::Empty)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config().await?;
    let handle = Server::bind(ADDR).await?.with_config(config)?.serve(App);

    tokio::signal::ctrl_c().await?;
    handle.close().await?;
    tracing::info!("server gracefully stopped");
    Ok(())
}

const PAGE_200: &str = "<html>
  <head>
    <title>200 OK</title>
  </head>
  <body>
    <h1>Success!</h1>
    <p>Your request was an absolute banger.</p>
  </body>
</html>";

const PAGE_400: &str = "<html>
  <head>
    <title>400 Bad Request</title>
  </head>
  <body>
    <h1>Bad Request</h1>
    <p>Your request honestly kinda sucked.</p>
  </body>
</html>";

const PAGE_500: &str = "<html>
  <head>
    <title>500 Internal Server Error</title>
  </head>
  <body>
    <h1>Internal Server Error</h1>
    <p>Okay, you know what? This one is on me.</p>
  </body>
</html>";
