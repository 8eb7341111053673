//! Intake-v2 delivery transport for the `apm-agent` tracer.
//!
//! Buffers finished records, serializes them as newline-delimited JSON with
//! a leading metadata record, gzip-compresses the payload and POSTs it to
//! `{server_url}/intake/v2/events`, protected by short timeouts and a
//! process-wide circuit breaker so a down collector never degrades the
//! monitored application. Delivery is at-most-once: a failed batch is
//! dropped, never retried.
//!
//! ```no_run
//! use apm_agent::{ApmTracer, Config, Tracer};
//! use apm_agent_intake::IntakeSender;
//!
//! # fn main() -> Result<(), apm_agent_intake::Error> {
//! let config = Config::from_env().with_service_name("billing");
//! let sender = IntakeSender::builder(config.clone()).build()?;
//! let mut tracer = ApmTracer::new(config, sender);
//!
//! tracer.start_transaction("GET /orders", "request");
//! tracer.stop_transaction(Some(200));
//! # Ok(())
//! # }
//! ```

use std::io::Write;

use apm_agent::{Config, Record, SendError, SendResult, Sender};
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::{debug, error};

mod breaker;
mod client;
mod model;
pub mod testing;
mod uploader;

pub use breaker::CircuitBreaker;
pub use client::{HttpClient, HttpError};

use model::{Envelope, Metadata};
use uploader::Uploader;

/// Failures while constructing an [`IntakeSender`].
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// No HTTP client implementation available.
    #[error("http client must be set; enable the reqwest-blocking-client feature or provide one with with_http_client")]
    NoHttpClient,

    /// The configured collector URL does not parse.
    #[error("invalid collector endpoint: {0}")]
    InvalidEndpoint(#[from] http::uri::InvalidUri),

    /// The bundled HTTP client could not be constructed.
    #[error("failed to construct http client: {0}")]
    Client(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// [`Sender`] shipping records to a collector over HTTP.
#[derive(Debug)]
pub struct IntakeSender {
    enabled: bool,
    metadata: Metadata,
    queue: Vec<Record>,
    breaker: CircuitBreaker,
    uploader: Uploader,
}

impl IntakeSender {
    /// Start building a sender for the given configuration.
    pub fn builder(config: Config) -> IntakeSenderBuilder {
        IntakeSenderBuilder {
            config,
            client: None,
            breaker: None,
        }
    }

    /// The circuit breaker handle this sender records into.
    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }
}

/// Builder for [`IntakeSender`].
#[derive(Debug)]
pub struct IntakeSenderBuilder {
    config: Config,
    client: Option<Box<dyn HttpClient>>,
    breaker: Option<CircuitBreaker>,
}

impl IntakeSenderBuilder {
    /// Provide the HTTP client implementation.
    pub fn with_http_client<C: HttpClient + 'static>(mut self, client: C) -> Self {
        self.client = Some(Box::new(client));
        self
    }

    /// Share an explicit circuit breaker instead of the process-wide default.
    pub fn with_circuit_breaker(mut self, breaker: CircuitBreaker) -> Self {
        self.breaker = Some(breaker);
        self
    }

    /// Build the sender.
    pub fn build(self) -> Result<IntakeSender, Error> {
        let client = match self.client {
            Some(client) => client,
            None => default_client(&self.config)?,
        };
        let endpoint = uploader::build_endpoint(self.config.server_url())?;
        let authorization = uploader::authorization_for(&self.config);

        Ok(IntakeSender {
            enabled: self.config.enabled(),
            metadata: Metadata::new(&self.config),
            queue: Vec::new(),
            breaker: self.breaker.unwrap_or_else(CircuitBreaker::global),
            uploader: Uploader::new(client, endpoint, authorization),
        })
    }
}

#[cfg(feature = "reqwest-blocking-client")]
fn default_client(config: &Config) -> Result<Box<dyn HttpClient>, Error> {
    let client = reqwest::blocking::Client::builder()
        .timeout(config.server_timeout())
        .connect_timeout(config.connect_timeout())
        .build()
        .map_err(|err| Error::Client(Box::new(err)))?;
    Ok(Box::new(client))
}

#[cfg(not(feature = "reqwest-blocking-client"))]
fn default_client(_config: &Config) -> Result<Box<dyn HttpClient>, Error> {
    Err(Error::NoHttpClient)
}

impl Sender for IntakeSender {
    fn enqueue(&mut self, record: Record) {
        self.queue.push(record);
    }

    fn queued(&self) -> usize {
        self.queue.len()
    }

    fn flush(&mut self) -> SendResult {
        if self.queue.is_empty() {
            return Ok(());
        }
        if !self.enabled {
            debug!("agent disabled, skipping send");
            return Ok(());
        }
        if self.breaker.is_open() {
            debug!("circuit breaker open, skipping send");
            return Ok(());
        }

        // At-most-once: the batch is consumed whether or not delivery works.
        let records = std::mem::take(&mut self.queue);
        let payload = build_payload(&self.metadata, &records)?;

        match self.uploader.upload(payload) {
            Ok(()) => {
                self.breaker.record_success();
                debug!(records = records.len(), "sent");
                Ok(())
            }
            Err(err) => {
                self.breaker.record_failure();
                error!(%err, records = records.len(), "send failed, dropping batch");
                Err(err)
            }
        }
    }
}

fn build_payload(metadata: &Metadata, records: &[Record]) -> Result<Vec<u8>, SendError> {
    let mut ndjson = serde_json::to_vec(&Envelope::Metadata(metadata.clone()))
        .map_err(serialization_error)?;
    for record in records {
        ndjson.push(b'\n');
        let line = serde_json::to_vec(&Envelope::from(record)).map_err(serialization_error)?;
        ndjson.extend_from_slice(&line);
    }

    let mut encoder = GzEncoder::new(Vec::with_capacity(ndjson.len() / 2), Compression::default());
    encoder.write_all(&ndjson).map_err(serialization_error)?;
    encoder.finish().map_err(serialization_error)
}

fn serialization_error(err: impl std::fmt::Display) -> SendError {
    SendError::Serialization(err.to_string())
}
