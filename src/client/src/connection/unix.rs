use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{StreamExt, TryStreamExt};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use hyper::body::Frame;
use hyper::{Request, Uri};
use hyper_util::client::legacy::Client;
use hyperlocal::{UnixClientExt, UnixConnector, Uri as UnixUri};

use super::{DockerConnection, DockerRequest, DockerResponse, RequestBody};
use crate::error::{DockerError, DockerResult};

type UnixBody = UnsyncBoxBody<Bytes, DockerError>;

/// Daemon listening on a local unix socket.
#[derive(Clone)]
pub struct UnixConnection {
    socket_path: PathBuf,
    client: Client<UnixConnector, UnixBody>,
}

impl UnixConnection {
    pub fn new(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            client: Client::unix(),
        }
    }
}

impl std::fmt::Debug for UnixConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnixConnection")
            .field("socket_path", &self.socket_path)
            .finish()
    }
}

fn into_body(body: RequestBody) -> UnixBody {
    match body {
        RequestBody::Empty => Full::new(Bytes::new())
            .map_err(|never| match never {})
            .boxed_unsync(),
        RequestBody::Bytes { data, .. } => Full::new(data)
            .map_err(|never| match never {})
            .boxed_unsync(),
        RequestBody::Stream { stream, .. } => {
            StreamBody::new(stream.map_ok(Frame::data)).boxed_unsync()
        }
    }
}

#[async_trait]
impl DockerConnection for UnixConnection {
    async fn execute(&self, request: DockerRequest) -> DockerResult<DockerResponse> {
        let path = request.path_and_query();
        let uri: Uri = UnixUri::new(&self.socket_path, &path).into();
        tracing::debug!(method = %request.method, %path, socket = %self.socket_path.display(), "docker request");

        let mut builder = Request::builder()
            .method(request.method)
            .uri(uri)
            .header(hyper::header::HOST, "docker");
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(content_type) = request.body.content_type() {
            builder = builder.header(hyper::header::CONTENT_TYPE, content_type);
        }

        let http_request = builder
            .body(into_body(request.body))
            .map_err(|e| DockerError::Transport(e.to_string()))?;

        let response = self.client.request(http_request).await?;
        let status = response.status().as_u16();
        let body = response
            .into_body()
            .into_data_stream()
            .map_err(DockerError::from)
            .boxed();

        Ok(DockerResponse { status, body })
    }
}
