//! Production [`ApiTransport`] implementation using `reqwest`.

use url::Url;

use crate::{ApiRequest, ApiResponse, ApiTransport, Method, TransportError};

/// An HTTP transport bound to one backend base URL.
///
/// Cheap to clone (`reqwest::Client` is an `Arc` internally), so one
/// transport is shared by every component of a client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
}

impl HttpTransport {
    /// Creates a transport for the given base URL, e.g.
    /// `https://api.sho.rt` or `http://localhost:8080/api`.
    ///
    /// # Errors
    /// Returns [`TransportError::InvalidUrl`] if the base doesn't parse
    /// as an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let base = Url::parse(base_url.trim().trim_end_matches('/'))
            .map_err(TransportError::InvalidUrl)?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(TransportError::Http)?;
        tracing::debug!(base = %base, "http transport ready");
        Ok(Self { client, base })
    }

    /// The base URL this transport talks to.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn request_url(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        // Concatenate rather than Url::join: join("/urls") against a base
        // of "https://host/api" would discard the "/api" prefix.
        let mut url = Url::parse(&format!(
            "{}{}",
            self.base.as_str().trim_end_matches('/'),
            request.path
        ))
        .map_err(TransportError::InvalidUrl)?;

        for (key, value) in &request.query {
            url.query_pairs_mut().append_pair(key, value);
        }
        Ok(url)
    }
}

impl ApiTransport for HttpTransport {
    async fn execute(
        &self,
        request: ApiRequest,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.request_url(&request)?;
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(TransportError::Http)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(TransportError::Http)?;

        // Log the path only: query strings can carry a refresh token.
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status,
            "api exchange"
        );

        Ok(ApiResponse {
            status,
            body: body.to_vec(),
        })
    }
}
