//! A minimal interface necessary for sending requests over HTTP.
//!
//! The bundled implementation uses a blocking `reqwest` client behind the
//! `reqwest-blocking-client` feature; users on other stacks bring their own.

use std::fmt::Debug;

use http::{Request, Response};

/// Opaque transport error produced by an [`HttpClient`].
pub type HttpError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Synchronous HTTP transport used for delivering payloads to the collector.
///
/// Implementations must apply their own request timeouts: nothing above this
/// trait cancels an in-flight send, and the tracer relies on the transport
/// returning within the configured bound.
pub trait HttpClient: Debug + Send + Sync {
    /// Send the specified HTTP request with `Vec<u8>` payload.
    ///
    /// Returns the HTTP response including the status code and body, or an
    /// error if the request could not be completed, e.g. because of a
    /// timeout or a loss of connection. Non-success statuses are returned as
    /// responses, not errors.
    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpError>;
}

#[cfg(feature = "reqwest-blocking-client")]
mod reqwest {
    use super::{HttpClient, HttpError, Request, Response};

    impl HttpClient for ::reqwest::blocking::Client {
        fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpError> {
            let request = request.try_into()?;
            let mut response = self.execute(request)?;
            let status = response.status();
            let mut body = Vec::new();
            response.copy_to(&mut body)?;
            Ok(Response::builder().status(status).body(body)?)
        }
    }
}
