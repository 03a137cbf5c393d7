//! JSON request plumbing shared by the HTTP clients.

use std::time::Duration;

use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{RemoteCallError, RemoteResult};

/// Shared request plumbing for one remote service.
#[derive(Debug, Clone)]
pub(crate) struct JsonTransport {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl JsonTransport {
    pub(crate) fn new(
        base_url: &str,
        api_key: Option<String>,
        request_timeout: Duration,
    ) -> RemoteResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|error| RemoteCallError::InvalidEndpoint(format!("{base_url}: {error}")))?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteCallError::InvalidEndpoint(base_url.to_string()));
        }

        let client = Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> RemoteResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteCallError::InvalidEndpoint(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) async fn get<T>(&self, segments: &[&str]) -> RemoteResult<T>
    where
        T: DeserializeOwned,
    {
        self.send::<(), T>(Method::GET, segments, None).await
    }

    pub(crate) async fn post<B, T>(&self, segments: &[&str], body: &B) -> RemoteResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, segments, Some(body)).await
    }

    pub(crate) async fn put<B, T>(&self, segments: &[&str], body: &B) -> RemoteResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, segments, Some(body)).await
    }

    async fn send<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> RemoteResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        debug!(%method, path = url.path(), "calling remote service");

        let mut request = self.client.request(method, url);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(RemoteCallError::Rejected {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        // Some endpoints reply 204 with no body.
        let payload: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        Ok(serde_json::from_slice(payload)?)
    }
}
