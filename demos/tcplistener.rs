//! Prints every request received on port 42069, then closes the connection
//! without answering.
//!
//! ```text
//! cargo run --example tcplistener
//! curl -X POST -H "Content-Type: application/json" -d '{"flavor":"dark mode"}' localhost:42069/coffee
//! ```

use std::fmt::Write as _;

use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wirehttp::ServerConfig;
use wirehttp::http::{Request, UnboundedBody, read_request};

const ADDR: &str = "127.0.0.1:42069";

fn render(req: &Request) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Request line:");
    let _ = writeln!(out, "- Method: {}", req.method());
    let _ = writeln!(out, "- Target: {}", req.target());
    let _ = writeln!(out, "- Version: {}", req.version());
    let _ = writeln!(out, "Headers:");
    for (name, value) in req.headers() {
        let _ = writeln!(out, "- {name}: {value}");
    }
    let _ = writeln!(out, "Body:");
    out.push_str(&String::from_utf8_lossy(req.body()));
    out
}

async fn dump(mut stream: TcpStream, config: &ServerConfig) {
    match read_request(&mut stream, config).await {
        Ok(req) => println!("{}", render(&req)),
        Err(e) => warn!(error = %e, "could not parse request"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // curl sends GET without Content-Length and waits for the reply.
    let config = ServerConfig::default().with_unbounded_body(UnboundedBody::Empty);
    let listener = TcpListener::bind(ADDR).await?;
    info!(address = ADDR, "listening");

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "could not accept connection");
                continue;
            }
        };
        info!(%peer, "connection accepted");
        let config = config.clone();
        tokio::spawn(async move {
            dump(stream, &config).await;
            info!(%peer, "connection closed");
        });
    }
}
