//! Live transport adapter using `reqwest`.

use bytes::Bytes;
use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::error::VcrError;
use crate::ports::transport::{HttpRequest, HttpResponse, Transport, TransportFuture};

/// Sends requests over the network with a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Creates a transport around a preconfigured client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: HttpRequest, cancel: CancellationToken) -> TransportFuture<'_> {
        Box::pin(async move {
            let request = reqwest::Request::try_from(request).map_err(VcrError::transport)?;
            let call = async {
                let response = self.client.execute(request).await?;
                let status = response.status();
                let version = response.version();
                let headers = response.headers().clone();
                let body: Bytes = response.bytes().await?;

                let mut live = http::Response::new(body);
                *live.status_mut() = status;
                *live.version_mut() = version;
                *live.headers_mut() = headers;
                Ok::<HttpResponse, reqwest::Error>(live)
            };

            tokio::select! {
                biased;
                () = cancel.cancelled() => Err(VcrError::Cancelled),
                result = call => result.map_err(VcrError::transport),
            }
        })
    }
}
