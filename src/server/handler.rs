//! The application boundary: what a server calls once a request has been parsed.

use std::future::Future;
use std::io;

use thiserror::Error;
use tokio::io::AsyncWrite;

use crate::http::{Request, ResponseWriter, StatusCode, default_headers};

/// Produces exactly one response per request by driving a [`ResponseWriter`].
///
/// The writer is bound to the connection's transport. An implementation must write
/// the status line, the header block, and the body before its future resolves;
/// the connection is closed right after.
///
/// # Examples
///
/// ```
/// use std::io;
///
/// use tokio::io::AsyncWrite;
/// use wirehttp::http::{Request, ResponseWriter, StatusCode, default_headers};
/// use wirehttp::server::Handler;
///
/// struct Echo;
///
/// impl Handler for Echo {
///     async fn handle<W>(&self, req: &Request, w: &mut ResponseWriter<W>) -> io::Result<()>
///     where
///         W: AsyncWrite + Unpin + Send,
///     {
///         w.write_status_line(StatusCode::Ok).await?;
///         w.write_headers(&default_headers(req.body().len())).await?;
///         w.write_body(req.body()).await
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    fn handle<W>(
        &self,
        req: &Request,
        w: &mut ResponseWriter<W>,
    ) -> impl Future<Output = io::Result<()>> + Send
    where
        W: AsyncWrite + Unpin + Send;
}

/// A failure reported by a [`Buffered`] handler function, sent to the client as
/// `<status>` with `message` as the body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {message}")]
pub struct HandlerError {
    pub status: StatusCode,
    pub message: String,
}

impl HandlerError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BadRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::InternalServerError, message)
    }
}

/// Adapts a function that writes a body into a buffer into a [`Handler`].
///
/// On `Ok` the buffer is sent as a `200 OK` body; on `Err` the error's status and
/// message are sent instead. Either way the response carries
/// [`default_headers`] with the matching `Content-Length`.
#[derive(Debug, Clone)]
pub struct Buffered<F> {
    f: F,
}

/// Wraps `f` in a [`Buffered`] handler.
///
/// ```
/// use wirehttp::server::{HandlerError, buffered};
///
/// let handler = buffered(|req, body| match req.target() {
///     "/yourproblem" => Err(HandlerError::bad_request("Your problem is not my problem\n")),
///     _ => {
///         body.extend_from_slice(b"All good\n");
///         Ok(())
///     }
/// });
/// # let _ = handler;
/// ```
pub fn buffered<F>(f: F) -> Buffered<F>
where
    F: Fn(&Request, &mut Vec<u8>) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    Buffered { f }
}

impl<F> Handler for Buffered<F>
where
    F: Fn(&Request, &mut Vec<u8>) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    async fn handle<W>(&self, req: &Request, w: &mut ResponseWriter<W>) -> io::Result<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut body = Vec::new();
        let (status, body) = match (self.f)(req, &mut body) {
            Ok(()) => (StatusCode::Ok, body),
            Err(e) => (e.status, e.message.into_bytes()),
        };

        w.write_status_line(status).await?;
        w.write_headers(&default_headers(body.len())).await?;
        w.write_body(&body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> impl Handler {
        buffered(|req, body| match req.target() {
            "/yourproblem" => Err(HandlerError::bad_request("Your problem is not my problem\n")),
            "/myproblem" => Err(HandlerError::internal("Woopsie, my bad\n")),
            _ => {
                body.extend_from_slice(b"All good, frfr\n");
                Ok(())
            }
        })
    }

    async fn respond(target: &str) -> String {
        let raw = format!("GET {target} HTTP/1.1\r\nContent-Length: 0\r\n\r\n");
        let req = Request::parse(raw.as_bytes()).unwrap();
        let mut w = ResponseWriter::new(Vec::new());
        handler().handle(&req, &mut w).await.unwrap();
        String::from_utf8(w.into_inner()).unwrap()
    }

    #[tokio::test]
    async fn ok_body_is_buffered_with_length() {
        assert_eq!(
            respond("/").await,
            "HTTP/1.1 200 OK\r\n\
             content-length: 15\r\n\
             connection: close\r\n\
             content-type: text/plain\r\n\
             \r\n\
             All good, frfr\n"
        );
    }

    #[tokio::test]
    async fn errors_become_status_and_message() {
        let wire = respond("/yourproblem").await;
        assert!(wire.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(wire.contains("content-length: 31\r\n"));
        assert!(wire.ends_with("\r\n\r\nYour problem is not my problem\n"));

        let wire = respond("/myproblem").await;
        assert!(wire.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(wire.ends_with("Woopsie, my bad\n"));
    }

    #[test]
    fn handler_error_display() {
        assert_eq!(
            HandlerError::internal("boom").to_string(),
            "500 Internal Server Error: boom"
        );
    }
}
