//! The network reached through a plain reqwest client.

use async_trait::async_trait;
use bytes::Bytes;
use http::Response;
use swcache_core::{Fetch, FetchError, FetchRequest, FetchResult, Origin};

/// [`Fetch`] implementation backed by a [`reqwest::Client`].
///
/// Relative requests are resolved against the configured origin; without
/// one they are rejected with [`FetchError::InvalidRequest`]. Connection,
/// timeout and body errors are transport failures. Any response, 4xx and
/// 5xx included, is returned as is.
#[derive(Debug, Clone, Default)]
pub struct ReqwestNetwork {
    client: reqwest::Client,
    origin: Option<Origin>,
}

impl ReqwestNetwork {
    /// Creates a network using `client`.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            origin: None,
        }
    }

    /// Resolves relative requests against `origin`.
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// The underlying client.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl Fetch for ReqwestNetwork {
    async fn fetch(&self, request: FetchRequest) -> FetchResult {
        let request = match &self.origin {
            Some(origin) => request.resolve(origin),
            None => request,
        };
        if request.origin().is_none() {
            return Err(FetchError::InvalidRequest(format!(
                "cannot send relative request {} without an origin",
                request.uri()
            )));
        }

        let url = request.uri().to_string();
        let request = reqwest::Request::try_from(request.into_http::<Bytes>())
            .map_err(|error| FetchError::InvalidRequest(error.to_string()))?;
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|error| {
                tracing::debug!(%url, %error, "network request failed");
                FetchError::transport(url.clone(), error)
            })?;
        tracing::trace!(%url, status = %response.status(), "network answered");
        into_response(url, response).await
    }
}

/// Buffers a reqwest response into an `http::Response<Bytes>`.
pub(crate) async fn into_response(url: String, response: reqwest::Response) -> FetchResult {
    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .bytes()
        .await
        .map_err(|error| FetchError::transport(url, error))?;

    let mut http_response = Response::new(body);
    *http_response.status_mut() = status;
    *http_response.headers_mut() = headers;
    Ok(http_response)
}
