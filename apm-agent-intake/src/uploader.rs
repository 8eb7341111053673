//! Builds and sends the intake POST request.

use apm_agent::{Config, SendError, SendResult};
use http::header::{AUTHORIZATION, CONTENT_ENCODING, CONTENT_TYPE};
use http::{Method, Request, Uri};

use crate::client::HttpClient;

pub(crate) const INTAKE_PATH: &str = "/intake/v2/events";

#[derive(Debug)]
pub(crate) struct Uploader {
    client: Box<dyn HttpClient>,
    endpoint: Uri,
    authorization: Option<String>,
}

impl Uploader {
    pub(crate) fn new(
        client: Box<dyn HttpClient>,
        endpoint: Uri,
        authorization: Option<String>,
    ) -> Self {
        Uploader {
            client,
            endpoint,
            authorization,
        }
    }

    /// POST a gzip-compressed ndjson payload to the collector.
    pub(crate) fn upload(&self, payload: Vec<u8>) -> SendResult {
        let mut request = Request::builder()
            .method(Method::POST)
            .uri(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/x-ndjson")
            .header(CONTENT_ENCODING, "gzip");
        if let Some(authorization) = &self.authorization {
            request = request.header(AUTHORIZATION, authorization.as_str());
        }
        let request = request
            .body(payload)
            .map_err(|err| SendError::Transport(Box::new(err)))?;

        let response = self.client.send(request).map_err(SendError::Transport)?;
        let status = response.status().as_u16();
        if status >= 400 {
            return Err(SendError::Http { status });
        }
        Ok(())
    }
}

/// Join the configured base URL with the intake path.
pub(crate) fn build_endpoint(server_url: &str) -> Result<Uri, http::uri::InvalidUri> {
    let base = server_url.strip_suffix('/').unwrap_or(server_url);
    format!("{base}{INTAKE_PATH}").parse()
}

/// The `Authorization` header value for the configured credential, secret
/// token preferred over API key.
pub(crate) fn authorization_for(config: &Config) -> Option<String> {
    if let Some(token) = config.secret_token() {
        return Some(format!("Bearer {token}"));
    }
    config.api_key().map(|key| format!("ApiKey {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_join_handles_trailing_slashes() {
        assert_eq!(
            build_endpoint("http://localhost:8200").unwrap().to_string(),
            "http://localhost:8200/intake/v2/events"
        );
        assert_eq!(
            build_endpoint("http://localhost:8200/").unwrap().to_string(),
            "http://localhost:8200/intake/v2/events"
        );
    }

    #[test]
    fn secret_token_wins_over_api_key() {
        let both = Config::new()
            .with_secret_token("tok")
            .with_api_key("key");
        assert_eq!(authorization_for(&both).as_deref(), Some("Bearer tok"));

        let key_only = Config::new().with_api_key("key");
        assert_eq!(authorization_for(&key_only).as_deref(), Some("ApiKey key"));

        assert_eq!(authorization_for(&Config::new()), None);
    }
}
