//! Raw request/response plumbing between the connector and a Docker daemon.
//!
//! The connector only speaks [`DockerConnection`]; which socket the bytes
//! travel over is decided once, from the configured endpoint.

mod http;
mod unix;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use hyper::Method;
use url::Url;

use crate::error::{DockerError, DockerResult};

pub use self::http::HttpConnection;
pub use self::unix::UnixConnection;

/// Response or request body delivered chunk by chunk.
pub type BodyStream = BoxStream<'static, DockerResult<Bytes>>;

pub enum RequestBody {
    Empty,
    Bytes {
        content_type: &'static str,
        data: Bytes,
    },
    Stream {
        content_type: &'static str,
        stream: BodyStream,
    },
}

impl RequestBody {
    pub fn json(data: Vec<u8>) -> Self {
        RequestBody::Bytes {
            content_type: "application/json",
            data: Bytes::from(data),
        }
    }

    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Bytes { content_type, .. } | RequestBody::Stream { content_type, .. } => {
                Some(*content_type)
            }
        }
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Empty => write!(f, "Empty"),
            RequestBody::Bytes { content_type, data } => {
                write!(f, "Bytes({}, {} bytes)", content_type, data.len())
            }
            RequestBody::Stream { content_type, .. } => write!(f, "Stream({})", content_type),
        }
    }
}

/// One HTTP request against the Docker Engine API.
#[derive(Debug)]
pub struct DockerRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl DockerRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// Adds the query parameter only when `value` is set.
    pub fn query_opt<T: ToString>(self, name: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.query(name, value),
            None => self,
        }
    }

    /// Adds `name=1` or `name=0` when `value` is set.
    pub fn flag_opt(self, name: &str, value: Option<bool>) -> Self {
        self.query_opt(name, value.map(|v| if v { 1 } else { 0 }))
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Path with the url-encoded query string appended.
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{}", self.path, query)
    }
}

/// Status plus the unread body. Dropping the body releases the connection.
pub struct DockerResponse {
    pub status: u16,
    pub body: BodyStream,
}

impl DockerResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Reads the whole body. Only for bodies known to be small.
    pub async fn bytes(mut self) -> DockerResult<Vec<u8>> {
        let mut collected = Vec::new();
        while let Some(chunk) = self.body.next().await {
            collected.extend_from_slice(&chunk?);
        }
        Ok(collected)
    }
}

impl fmt::Debug for DockerResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DockerResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait DockerConnection: Send + Sync {
    async fn execute(&self, request: DockerRequest) -> DockerResult<DockerResponse>;
}

/// Where the daemon listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DockerEndpoint {
    Unix(PathBuf),
    Http(Url),
}

impl DockerEndpoint {
    /// Accepts `unix://<path>`, `tcp://<host>:<port>`, `http://...` and
    /// `https://...`.
    pub fn parse(endpoint: &str) -> DockerResult<Self> {
        if let Some(path) = endpoint.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(DockerError::invalid_argument(format!(
                    "unix endpoint without socket path: {endpoint}"
                )));
            }
            return Ok(DockerEndpoint::Unix(PathBuf::from(path)));
        }

        let normalized = match endpoint.strip_prefix("tcp://") {
            Some(rest) => format!("http://{rest}"),
            None => endpoint.to_string(),
        };
        let url = Url::parse(&normalized).map_err(|e| {
            DockerError::invalid_argument(format!("invalid docker endpoint {endpoint}: {e}"))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(DockerEndpoint::Http(url)),
            other => Err(DockerError::invalid_argument(format!(
                "unsupported docker endpoint scheme {other}: {endpoint}"
            ))),
        }
    }

    pub fn connect(&self, connect_timeout: Duration) -> DockerResult<Arc<dyn DockerConnection>> {
        match self {
            DockerEndpoint::Unix(path) => Ok(Arc::new(UnixConnection::new(path.clone()))),
            DockerEndpoint::Http(url) => {
                Ok(Arc::new(HttpConnection::new(url.clone(), connect_timeout)?))
            }
        }
    }
}

impl fmt::Display for DockerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DockerEndpoint::Unix(path) => write!(f, "unix://{}", path.display()),
            DockerEndpoint::Http(url) => write!(f, "{}", url),
        }
    }
}
