use std::time::Duration;

use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use url::Url;

use super::{DockerConnection, DockerRequest, DockerResponse, RequestBody};
use crate::error::{DockerError, DockerResult};

/// Daemon reachable over TCP, plain or TLS.
#[derive(Debug, Clone)]
pub struct HttpConnection {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpConnection {
    pub fn new(base_url: Url, connect_timeout: Duration) -> DockerResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self { client, base_url })
    }

    fn url_for(&self, request: &DockerRequest) -> String {
        format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            request.path_and_query()
        )
    }
}

#[async_trait]
impl DockerConnection for HttpConnection {
    async fn execute(&self, request: DockerRequest) -> DockerResult<DockerResponse> {
        let url = self.url_for(&request);
        tracing::debug!(method = %request.method, %url, "docker request");

        let mut builder = self.client.request(request.method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Bytes { content_type, data } => builder
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(data),
            RequestBody::Stream {
                content_type,
                stream,
            } => builder
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(reqwest::Body::wrap_stream(stream)),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response
            .bytes_stream()
            .map_err(DockerError::from)
            .boxed();

        Ok(DockerResponse { status, body })
    }
}
